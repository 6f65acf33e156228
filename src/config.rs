//!
//! Client configuration: backend location and session timing.
//!
//! Values come from the environment; absent or empty variables fall back to the
//! localhost defaults below.

use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const BASE_URL_ENV: &str = "LEAVE_API_BASE_URL";
pub const POLL_INTERVAL_ENV: &str = "LEAVE_TOKEN_POLL_MS";
pub const CONNECT_TIMEOUT_ENV: &str = "LEAVE_CONNECT_TIMEOUT_MS";

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_SOCKET_PATH: &str = "/ws";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// HTTP(S) or WS(S) base URL of the backend.
    pub base_url: String,
    /// Path of the push endpoint, joined onto `base_url`.
    pub socket_path: String,
    /// How often the session token is re-read.
    pub poll_interval_ms: u64,
    pub connect_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            socket_path: DEFAULT_SOCKET_PATH.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }
}

impl ClientConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Empty values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = ClientConfig::default();

        if let Some(base) = get(BASE_URL_ENV) {
            config.base_url = base;
        }
        if let Some(raw) = get(POLL_INTERVAL_ENV) {
            config.poll_interval_ms = parse_millis(POLL_INTERVAL_ENV, &raw)?;
        }
        if let Some(raw) = get(CONNECT_TIMEOUT_ENV) {
            config.connect_timeout_ms = parse_millis(CONNECT_TIMEOUT_ENV, &raw)?;
        }
        // Fail early on a base URL the session binding could never use.
        config.socket_base()?;
        tracing::debug!(?config, "client configuration loaded");
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms.max(1))
    }

    /// `base_url` with its scheme mapped onto the WebSocket equivalent.
    fn socket_base(&self) -> Result<Url, ConfigError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::InvalidBaseUrl(format!("{}: {}", self.base_url, e)))?;
        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => {
                return Err(ConfigError::InvalidBaseUrl(format!("unsupported scheme {}", other)));
            }
        };
        url.set_scheme(scheme)
            .map_err(|_| ConfigError::InvalidBaseUrl(self.base_url.clone()))?;
        Ok(url)
    }

    /// The push endpoint for `token`: `ws(s)://host[:port]{socket_path}?token=...`.
    pub fn socket_url(&self, token: &str) -> Result<Url, ConfigError> {
        let base = self.socket_base()?;
        let mut url = base
            .join(&self.socket_path)
            .map_err(|e| ConfigError::InvalidBaseUrl(format!("{}: {}", self.socket_path, e)))?;
        url.query_pairs_mut().append_pair("token", token);
        Ok(url)
    }
}

fn parse_millis(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(ms),
        _ => Err(ConfigError::InvalidDuration { name, value: raw.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset_or_empty() {
        assert_eq!(ClientConfig::from_lookup(lookup(&[])).unwrap(), ClientConfig::default());
        let cfg = ClientConfig::from_lookup(lookup(&[(BASE_URL_ENV, "  ")])).unwrap();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_overrides() {
        let cfg = ClientConfig::from_lookup(lookup(&[
            (BASE_URL_ENV, "https://hr.example.com"),
            (POLL_INTERVAL_ENV, "250"),
            (CONNECT_TIMEOUT_ENV, "3000"),
        ]))
        .unwrap();
        assert_eq!(cfg.base_url, "https://hr.example.com");
        assert_eq!(cfg.poll_interval(), Duration::from_millis(250));
        assert_eq!(cfg.connect_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[(POLL_INTERVAL_ENV, "0")])),
            Err(ConfigError::InvalidDuration { name: POLL_INTERVAL_ENV, .. })
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[(CONNECT_TIMEOUT_ENV, "soon")])),
            Err(ConfigError::InvalidDuration { .. })
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[(BASE_URL_ENV, "ftp://files")])),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_socket_url_maps_scheme_and_carries_token() {
        let cfg = ClientConfig::default();
        assert_eq!(
            cfg.socket_url("abc").unwrap().as_str(),
            "ws://localhost:5000/ws?token=abc"
        );

        let cfg = ClientConfig { base_url: "https://hr.example.com/api/".into(), ..Default::default() };
        assert_eq!(
            cfg.socket_url("a b&c").unwrap().as_str(),
            "wss://hr.example.com/ws?token=a+b%26c"
        );
    }
}
