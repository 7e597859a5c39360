use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{BrelloError, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:8001";
pub const DEFAULT_DEV_ADDR: &str = "127.0.0.1:8001";
pub const DEFAULT_LOG_FILE: &str = "brello.log";

/// Settings for the API client and the terminal front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    /// `None` keeps the HTTP client's default, which never times out.
    pub request_timeout: Option<Duration>,
    pub log_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { api_url: DEFAULT_API_URL.to_string(), request_timeout: None, log_file: PathBuf::from(DEFAULT_LOG_FILE) }
    }
}

impl ClientConfig {
    /// Reads `BRELLO_*` variables from the process environment. Call
    /// `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(url) = lookup("BRELLO_API_URL") {
            let url = url.trim().trim_end_matches('/');
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(BrelloError::ConfigError(format!("BRELLO_API_URL must be an http(s) URL, got {url:?}")));
            }
            config.api_url = url.to_string();
        }
        if let Some(secs) = lookup("BRELLO_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| BrelloError::ConfigError(format!("BRELLO_REQUEST_TIMEOUT_SECS is not a number: {secs:?}")))?;
            config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(path) = lookup("BRELLO_LOG_FILE") {
            config.log_file = PathBuf::from(path);
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevApiConfig {
    pub addr: SocketAddr,
}

impl DevApiConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let raw = lookup("BRELLO_DEV_ADDR").unwrap_or_else(|| DEFAULT_DEV_ADDR.to_string());
        let addr = raw
            .parse()
            .map_err(|_| BrelloError::ConfigError(format!("BRELLO_DEV_ADDR is not a socket address: {raw:?}")))?;
        Ok(Self { addr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.api_url, "http://localhost:8001");
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn reads_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("BRELLO_API_URL", "https://api.brello.dev/"),
            ("BRELLO_REQUEST_TIMEOUT_SECS", "15"),
            ("BRELLO_LOG_FILE", "/tmp/brello.log"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://api.brello.dev");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.log_file, PathBuf::from("/tmp/brello.log"));
    }

    #[test]
    fn zero_timeout_means_none() {
        let config = ClientConfig::from_lookup(lookup(&[("BRELLO_REQUEST_TIMEOUT_SECS", "0")])).unwrap();
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("BRELLO_API_URL", "localhost:8001")])),
            Err(BrelloError::ConfigError(_))
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("BRELLO_REQUEST_TIMEOUT_SECS", "soon")])),
            Err(BrelloError::ConfigError(_))
        ));
        assert!(matches!(
            DevApiConfig::from_lookup(lookup(&[("BRELLO_DEV_ADDR", "nowhere")])),
            Err(BrelloError::ConfigError(_))
        ));
    }

    #[test]
    fn dev_api_defaults_to_port_8001() {
        let config = DevApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.addr.port(), 8001);
    }
}
