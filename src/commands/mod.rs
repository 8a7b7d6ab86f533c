//! Command implementations for the auric CLI
//!
//! - **search**: package search, with local filtering of anchored queries
//! - **info**: RPC record of one package, with suggestions on a miss
//! - **deps**: dependency trees read from PKGBUILDs
//! - **pkgbuild**: metadata extracted from a remote or local PKGBUILD
//! - **completions**: shell completion scripts

pub mod completions;
pub mod deps;
pub mod info;
pub mod pkgbuild;
pub mod search;

pub use completions::completions;
pub use deps::deps;
pub use info::info;
pub use pkgbuild::pkgbuild;
pub use search::search;
