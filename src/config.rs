//! Client configuration.
//!
//! Defaults target the public AUR. Each setting can be overridden from the
//! environment:
//!
//! | Variable | Setting |
//! |---|---|
//! | `AURIC_URL` | base URL of the AUR instance |
//! | `AURIC_RPC_VERSION` | RPC interface version |
//! | `AURIC_USER_AGENT` | `User-Agent` header |
//! | `AURIC_TIMEOUT` | request timeout in seconds |

use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://aur.archlinux.org";
const DEFAULT_RPC_VERSION: u8 = 5;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub rpc_version: u8,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            rpc_version: DEFAULT_RPC_VERSION,
            user_agent: format!("auric/{}", env!("CARGO_PKG_VERSION")),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `AURIC_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `AURIC_*`
    /// variable. Unparseable numbers are ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("AURIC_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(agent) = lookup("AURIC_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(raw) = lookup("AURIC_RPC_VERSION") {
            match raw.parse() {
                Ok(version) => config.rpc_version = version,
                Err(_) => tracing::warn!("Ignoring invalid AURIC_RPC_VERSION: {:?}", raw),
            }
        }
        if let Some(raw) = lookup("AURIC_TIMEOUT") {
            match raw.parse() {
                Ok(secs) => config.timeout = Duration::from_secs(secs),
                Err(_) => tracing::warn!("Ignoring invalid AURIC_TIMEOUT: {:?}", raw),
            }
        }

        config
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn rpc_endpoint(&self) -> String {
        format!("{}/rpc/", self.base_url)
    }

    pub fn pkgbuild_endpoint(&self) -> String {
        format!("{}/cgit/aur.git/plain/PKGBUILD", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.rpc_endpoint(), "https://aur.archlinux.org/rpc/");
        assert!(config.user_agent.starts_with("auric/"));
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("AURIC_URL", "http://localhost:8080/"),
            ("AURIC_USER_AGENT", "test-agent"),
            ("AURIC_RPC_VERSION", "6"),
            ("AURIC_TIMEOUT", "3"),
        ]));
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.rpc_version, 6);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(
            config.pkgbuild_endpoint(),
            "http://localhost:8080/cgit/aur.git/plain/PKGBUILD"
        );
    }

    #[test]
    fn test_invalid_numbers_keep_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("AURIC_RPC_VERSION", "five"),
            ("AURIC_TIMEOUT", "-1"),
        ]));
        assert_eq!(config.rpc_version, DEFAULT_RPC_VERSION);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_with_user_agent() {
        let config = ClientConfig::default().with_user_agent("custom/1.0");
        assert_eq!(config.user_agent, "custom/1.0");
    }
}
