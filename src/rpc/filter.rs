//! Anchored search queries.
//!
//! The RPC endpoint only does substring matching. A query written as `^foo`,
//! `foo$` or `^foo$` is sent without its anchors, and the results are then
//! filtered locally against the anchored expression. Everything between the
//! anchors is matched literally.

use super::record::RpcResultSet;
use crate::error::Result;
use regex::Regex;

#[derive(Debug, Clone)]
pub struct SearchQuery {
    remote: String,
    pattern: Option<Regex>,
}

impl SearchQuery {
    /// Parse a user query.
    ///
    /// ```
    /// use auric::rpc::SearchQuery;
    ///
    /// let query = SearchQuery::new("^foo$").unwrap();
    /// assert_eq!(query.remote_term(), "foo");
    /// assert!(query.matches("foo"));
    /// assert!(!query.matches("foobar"));
    /// ```
    pub fn new(query: &str) -> Result<Self> {
        let (leading, rest) = match query.strip_prefix('^') {
            Some(rest) => (true, rest),
            None => (false, query),
        };
        let (trailing, literal) = match rest.strip_suffix('$') {
            Some(literal) => (true, literal),
            None => (false, rest),
        };

        if !leading && !trailing {
            return Ok(Self {
                remote: query.to_string(),
                pattern: None,
            });
        }

        let pattern = format!(
            "{}{}{}",
            if leading { "^" } else { "" },
            regex::escape(literal),
            if trailing { "$" } else { "" }
        );

        Ok(Self {
            remote: literal.to_string(),
            pattern: Some(Regex::new(&pattern)?),
        })
    }

    /// The term sent to the RPC endpoint.
    pub fn remote_term(&self) -> &str {
        &self.remote
    }

    /// The local filter expression, if the query was anchored.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_ref().map(Regex::as_str)
    }

    pub fn is_anchored(&self) -> bool {
        self.pattern.is_some()
    }

    pub fn matches(&self, name: &str) -> bool {
        self.pattern.as_ref().is_none_or(|re| re.is_match(name))
    }

    /// Drop results whose name does not match an anchored query.
    pub fn filter(&self, mut results: RpcResultSet) -> RpcResultSet {
        if let Some(re) = &self.pattern {
            results.retain(|name| re.is_match(name));
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unanchored_query_passes_through() {
        let query = SearchQuery::new("foo.bar").unwrap();
        assert_eq!(query.remote_term(), "foo.bar");
        assert!(!query.is_anchored());
        assert_eq!(query.pattern(), None);
        assert!(query.matches("anything"));
    }

    #[test]
    fn test_fully_anchored() {
        let query = SearchQuery::new("^foo$").unwrap();
        assert_eq!(query.remote_term(), "foo");
        assert_eq!(query.pattern(), Some("^foo$"));
        assert!(query.matches("foo"));
        assert!(!query.matches("foo-git"));
        assert!(!query.matches("libfoo"));
    }

    #[test]
    fn test_leading_anchor_only() {
        let query = SearchQuery::new("^python-").unwrap();
        assert_eq!(query.remote_term(), "python-");
        assert!(query.matches("python-requests"));
        assert!(!query.matches("mingw-python-requests"));
    }

    #[test]
    fn test_trailing_anchor_only() {
        let query = SearchQuery::new("-git$").unwrap();
        assert_eq!(query.remote_term(), "-git");
        assert!(query.matches("yay-git"));
        assert!(!query.matches("git-lfs"));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let query = SearchQuery::new("^gtk+.x$").unwrap();
        assert_eq!(query.remote_term(), "gtk+.x");
        assert_eq!(query.pattern(), Some(r"^gtk\+\.x$"));
        assert!(query.matches("gtk+.x"));
        assert!(!query.matches("gtkk-ax"));
    }
}
