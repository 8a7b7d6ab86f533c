//! AUR client.
//!
//! This module provides an [`AurApi`] client for the AUR RPC interface and for
//! PKGBUILD retrieval. Retrieval itself goes through the [`Fetch`] trait, so
//! the client can be driven by [`HttpFetcher`] in production and by an
//! in-memory fetcher in tests.
//!
//! # Architecture
//!
//! The client does no parsing of its own:
//! - RPC responses are streamed through [`feed_json`] into a
//!   [`SearchMapper`] or [`InfoMapper`], never materializing a JSON tree
//! - PKGBUILD text is wrapped in a [`Recipe`], which parses it on first use
//!
//! # Examples
//!
//! ```no_run
//! use auric::{AurApi, ClientConfig, SearchQuery};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let api = AurApi::new(ClientConfig::from_env())?;
//!
//!     let results = api.search(&SearchQuery::new("^yay")?).await?;
//!     println!("Found {} packages", results.len());
//!
//!     if let Some(record) = api.info("yay").await? {
//!         println!("Latest version: {}", record.version().unwrap_or_default());
//!     }
//!
//!     Ok(())
//! }
//! ```

use crate::config::ClientConfig;
use crate::error::{AurError, Result};
use crate::pkgbuild::Recipe;
use crate::rpc::{
    InfoMapper, RpcRecord, RpcResultSet, SearchMapper, SearchQuery, feed_json,
};
use std::time::Duration;

/// AUR search requires at least this many characters.
const MIN_SEARCH_TERM: usize = 2;

/// Similarity needed for a name to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Retrieval of raw response bodies.
///
/// Implementations return [`AurError::EmptyOrMissingInput`] when nothing
/// could be retrieved (a 404 or an empty body), and other errors for
/// transport failures.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// [`Fetch`] over HTTP.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AurError::EmptyOrMissingInput(url.to_string()));
        }

        let body = response.error_for_status()?.bytes().await?;
        if body.is_empty() {
            return Err(AurError::EmptyOrMissingInput(url.to_string()));
        }

        Ok(body.to_vec())
    }
}

/// A package: its RPC record, known up front, and its PKGBUILD, parsed on
/// demand.
#[derive(Debug)]
pub struct Package {
    pub info: RpcRecord,
    pub recipe: Recipe,
}

/// AUR client.
pub struct AurApi<F = HttpFetcher> {
    config: ClientConfig,
    fetcher: F,
}

impl AurApi<HttpFetcher> {
    /// Create a client that talks HTTP to the configured AUR instance.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use auric::{AurApi, ClientConfig};
    ///
    /// let config = ClientConfig::from_env().with_user_agent("my-helper/0.1");
    /// let api = AurApi::new(config)?;
    /// # Ok::<(), auric::AurError>(())
    /// ```
    pub fn new(config: ClientConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self { config, fetcher })
    }
}

impl<F: Fetch> AurApi<F> {
    pub fn with_fetcher(config: ClientConfig, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn search_url(&self, term: &str) -> Result<String> {
        self.rpc_url(&[("type", "search"), ("arg", term)])
    }

    pub fn info_url(&self, name: &str) -> Result<String> {
        self.rpc_url(&[("type", "info"), ("arg[]", name)])
    }

    pub fn pkgbuild_url(&self, name: &str) -> Result<String> {
        let endpoint = self.config.pkgbuild_endpoint();
        let url = reqwest::Url::parse_with_params(&endpoint, &[("h", name)])
            .map_err(|e| anyhow::anyhow!("Invalid AUR URL {}: {}", endpoint, e))?;
        Ok(url.into())
    }

    fn rpc_url(&self, params: &[(&str, &str)]) -> Result<String> {
        let endpoint = self.config.rpc_endpoint();
        let version = self.config.rpc_version.to_string();
        let params = std::iter::once(("v", version.as_str())).chain(params.iter().copied());
        let url = reqwest::Url::parse_with_params(&endpoint, params)
            .map_err(|e| anyhow::anyhow!("Invalid AUR URL {}: {}", endpoint, e))?;
        Ok(url.into())
    }

    /// Search package names and descriptions.
    ///
    /// Anchored queries (`^foo`, `foo$`) are sent without their anchors and
    /// filtered locally.
    ///
    /// # Errors
    ///
    /// Returns [`AurError::RemoteError`] when the AUR rejects the query, for
    /// example because it matches too many packages.
    pub async fn search(&self, query: &SearchQuery) -> Result<RpcResultSet> {
        let url = self.search_url(query.remote_term())?;
        let body = self.fetcher.fetch(&url).await?;

        let mut mapper = SearchMapper::new();
        feed_json(&body, &mut mapper)?;
        let results = mapper.finish(query)?;

        tracing::debug!(
            "Search for {:?} returned {} results",
            query.remote_term(),
            results.len()
        );
        Ok(results)
    }

    /// Fetch the RPC record for one package.
    ///
    /// Returns `Ok(None)` when the package does not exist. A response that
    /// cannot be mapped to a record counts as "does not exist" as well; only
    /// transport failures are errors.
    pub async fn info(&self, name: &str) -> Result<Option<RpcRecord>> {
        let url = self.info_url(name)?;
        let body = match self.fetcher.fetch(&url).await {
            Ok(body) => body,
            Err(AurError::EmptyOrMissingInput(_)) => return Ok(None),
            Err(err) => return Err(err),
        };

        let mut mapper = InfoMapper::new();
        match feed_json(&body, &mut mapper).and_then(|()| mapper.finish()) {
            Ok(record) => Ok(Some(record)),
            Err(err) if err.is_parse_failure() => {
                tracing::debug!("No info record for {}: {}", name, err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Fetch a package's PKGBUILD.
    pub async fn recipe(&self, name: &str) -> Result<Recipe> {
        let url = self.pkgbuild_url(name)?;
        let body = self.fetcher.fetch(&url).await?;
        let text = String::from_utf8_lossy(&body).into_owned();

        if text.trim().is_empty() {
            return Err(AurError::EmptyOrMissingInput(url));
        }

        Ok(Recipe::new(name, text))
    }

    /// Fetch a package's RPC record and PKGBUILD together.
    ///
    /// Returns `Ok(None)` when the package does not exist.
    pub async fn package(&self, name: &str) -> Result<Option<Package>> {
        let Some(info) = self.info(name).await? else {
            return Ok(None);
        };
        let pkgbase = info.text("packagebase").unwrap_or(name).to_string();
        let recipe = self.recipe(&pkgbase).await?;
        Ok(Some(Package { info, recipe }))
    }

    /// Package names similar to `name`, closest first.
    ///
    /// Used after a failed lookup; errors from the underlying search are
    /// treated as "no suggestions".
    pub async fn suggest(&self, name: &str, limit: usize) -> Vec<String> {
        let term: String = name.chars().take(MIN_SEARCH_TERM.max(name.len() / 2)).collect();
        if term.chars().count() < MIN_SEARCH_TERM {
            return Vec::new();
        }

        let query = match SearchQuery::new(&term) {
            Ok(query) => query,
            Err(_) => return Vec::new(),
        };
        let results = match self.search(&query).await {
            Ok(results) => results,
            Err(err) => {
                tracing::debug!("Suggestion search for {:?} failed: {}", term, err);
                return Vec::new();
            }
        };

        rank_suggestions(name, results.names(), limit)
    }
}

/// Candidates at least [`SUGGESTION_THRESHOLD`] similar to `name`, closest
/// first.
fn rank_suggestions<'a>(
    name: &str,
    candidates: impl Iterator<Item = &'a str>,
    limit: usize,
) -> Vec<String> {
    let mut scored: Vec<(f64, &str)> = candidates
        .filter(|candidate| *candidate != name)
        .map(|candidate| (strsim::jaro_winkler(name, candidate), candidate))
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}
