//! Library interface for auric, an Arch User Repository client
//!
//! - **pkgbuild**: metadata extraction from PKGBUILD text and dependency specs
//! - **rpc**: streaming mapping of AUR RPC responses into records
//! - **api**: the client tying both to HTTP retrieval
//! - **config**: client settings and their environment overrides

pub mod api;
pub mod config;
pub mod error;
pub mod pkgbuild;
pub mod rpc;

// Re-export commonly used types
pub use api::{AurApi, Fetch, HttpFetcher, Package};
pub use config::ClientConfig;
pub use error::{AurError, Result};
pub use pkgbuild::{DependencySpec, MetadataRecord, Recipe, extract_fields, parse_dependency};
pub use rpc::{RpcRecord, RpcResultSet, SearchQuery};
