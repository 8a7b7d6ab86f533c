//! PKGBUILD metadata extraction.
//!
//! - **unquote**: shell quote and array removal for a single value
//! - **fields**: assignment scanning into a [`MetadataRecord`]
//! - **depends**: the `name<op>version` dependency grammar
//!
//! [`Recipe`] ties them together: it holds the PKGBUILD text for a package and
//! parses it on first access.

pub mod depends;
pub mod fields;
pub mod unquote;

pub use depends::{Comparator, DependencySpec, parse_dependency};
pub use fields::{MetadataRecord, RECOGNIZED_FIELDS, extract_fields};
pub use unquote::{FieldValue, unquote};

use crate::error::{AurError, Result};
use once_cell::sync::OnceCell;
use std::path::Path;

/// A package's PKGBUILD.
///
/// The name is known up front; the metadata is extracted from the text the
/// first time it is asked for and never recomputed.
#[derive(Debug)]
pub struct Recipe {
    name: String,
    text: String,
    metadata: OnceCell<MetadataRecord>,
}

impl Recipe {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            metadata: OnceCell::new(),
        }
    }

    /// Read a PKGBUILD from disk. The recipe is named after the parent
    /// directory, as makepkg expects the file to live in `<pkgbase>/PKGBUILD`.
    ///
    /// A missing or blank file is [`AurError::EmptyOrMissingInput`], the same
    /// as a PKGBUILD the AUR does not have.
    pub fn read(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AurError::EmptyOrMissingInput(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Err(AurError::EmptyOrMissingInput(path.display().to_string()));
        }

        let name = path
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self::new(name, text))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parsed metadata, extracted on first call.
    ///
    /// A failed extraction is not cached; the error is returned again on the
    /// next call.
    pub fn metadata(&self) -> Result<&MetadataRecord> {
        self.metadata.get_or_try_init(|| extract_fields(&self.text))
    }

    pub fn is_parsed(&self) -> bool {
        self.metadata.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_parses_lazily_once() {
        let recipe = Recipe::new("foo", "pkgname=foo\npkgver=1.0\npkgrel=1\n");
        assert_eq!(recipe.name(), "foo");
        assert!(!recipe.is_parsed());

        let first = recipe.metadata().unwrap();
        assert!(recipe.is_parsed());
        assert_eq!(first.version().as_deref(), Some("1.0-1"));

        let second = recipe.metadata().unwrap();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_recipe_parse_error_is_not_cached() {
        let recipe = Recipe::new("foo", "depends=('bar'\n");
        assert!(recipe.metadata().is_err());
        assert!(!recipe.is_parsed());
        assert!(recipe.metadata().is_err());
    }
}
