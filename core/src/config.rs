//! Client configuration.
//!
//! A `ClientConfig` is assembled once and handed to `transport::Client::new`.
//! Only `api_key` is required; everything else has a default.

use std::time::Duration;

use crate::error::ConfigError;

/// Default API base URL.
pub const API_URL: &str = "https://api.synthient.com/api/v2";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Proxy port used when a proxy host is given without one.
pub const DEFAULT_PROXY_PORT: u16 = 8000;

pub const ENV_API_KEY: &str = "SYNTHIENT_API_KEY";
pub const ENV_API_URL: &str = "SYNTHIENT_API_URL";
pub const ENV_TIMEOUT_MS: &str = "SYNTHIENT_TIMEOUT_MS";
pub const ENV_PROXY: &str = "SYNTHIENT_PROXY";
pub const ENV_PROXY_PORT: &str = "SYNTHIENT_PROXY_PORT";

/// HTTP proxy every request is routed through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
}

impl ProxyConfig {
    pub fn uri(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Sent verbatim as the `Authorization` header.
    pub api_key: String,
    pub base_url: String,
    pub default_timeout: Duration,
    pub proxy: Option<ProxyConfig>,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: API_URL.to_string(),
            default_timeout: DEFAULT_TIMEOUT,
            proxy: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Route requests through `host`. An empty host clears the proxy.
    pub fn with_proxy(mut self, host: impl Into<String>, port: Option<u16>) -> Self {
        let host = host.into();
        self.proxy = if host.is_empty() {
            None
        } else {
            Some(ProxyConfig {
                host,
                port: port.unwrap_or(DEFAULT_PROXY_PORT),
            })
        };
        self
    }

    /// Read the configuration from `SYNTHIENT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = get(ENV_API_KEY)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing(ENV_API_KEY))?;
        let mut config = ClientConfig::new(api_key);

        if let Some(url) = get(ENV_API_URL).filter(|v| !v.is_empty()) {
            config = config.with_base_url(url);
        }

        if let Some(raw) = get(ENV_TIMEOUT_MS) {
            let millis: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: ENV_TIMEOUT_MS,
                value: raw.clone(),
            })?;
            config = config.with_timeout(Duration::from_millis(millis));
        }

        if let Some(host) = get(ENV_PROXY) {
            let port = match get(ENV_PROXY_PORT) {
                Some(raw) => Some(raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                    name: ENV_PROXY_PORT,
                    value: raw.clone(),
                })?),
                None => None,
            };
            config = config.with_proxy(host, port);
        }

        Ok(config)
    }
}
