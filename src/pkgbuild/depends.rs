//! Dependency token parsing.
//!
//! Entries of `depends`, `makedepends` and `conflicts` are either a bare
//! package name (`glibc`) or a name, a comparator and a version
//! (`zlib>=1.2.13`).

use crate::error::{AurError, Result};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

static BARE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_-]+$").expect("bare name pattern is valid"));

static VERSIONED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9_-]+)(<=|>=|=|<|>)([a-z0-9._-]+)$")
        .expect("versioned dependency pattern is valid")
});

/// Version comparison operator in a dependency token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Comparator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
}

impl Comparator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparator::Eq => "=",
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
        }
    }

    fn from_operator(op: &str) -> Option<Self> {
        match op {
            "=" => Some(Comparator::Eq),
            "<" => Some(Comparator::Lt),
            "<=" => Some(Comparator::Le),
            ">" => Some(Comparator::Gt),
            ">=" => Some(Comparator::Ge),
            _ => None,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed dependency token.
///
/// `comparator` and `version` are either both set or both `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencySpec {
    pub package: String,
    pub comparator: Option<Comparator>,
    pub version: Option<String>,
    pub raw: String,
}

impl DependencySpec {
    pub fn is_versioned(&self) -> bool {
        self.comparator.is_some()
    }
}

impl fmt::Display for DependencySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.package)?;
        if let (Some(comparator), Some(version)) = (self.comparator, &self.version) {
            write!(f, "{}{}", comparator, version)?;
        }
        Ok(())
    }
}

/// Parse one dependency token.
///
/// # Errors
///
/// Returns [`AurError::MalformedDependency`] when the token is neither a bare
/// name nor `NAME COMPARATOR VERSION`.
///
/// # Examples
///
/// ```
/// use auric::pkgbuild::{parse_dependency, Comparator};
///
/// let spec = parse_dependency("foo>=1.2.3").unwrap();
/// assert_eq!(spec.package, "foo");
/// assert_eq!(spec.comparator, Some(Comparator::Ge));
/// assert_eq!(spec.version.as_deref(), Some("1.2.3"));
/// ```
pub fn parse_dependency(token: &str) -> Result<DependencySpec> {
    if BARE_NAME.is_match(token) {
        return Ok(DependencySpec {
            package: token.to_string(),
            comparator: None,
            version: None,
            raw: token.to_string(),
        });
    }

    let malformed = || AurError::MalformedDependency(token.to_string());
    let caps = VERSIONED.captures(token).ok_or_else(malformed)?;
    let comparator = Comparator::from_operator(&caps[2]).ok_or_else(malformed)?;

    Ok(DependencySpec {
        package: caps[1].to_string(),
        comparator: Some(comparator),
        version: Some(caps[3].to_string()),
        raw: token.to_string(),
    })
}
