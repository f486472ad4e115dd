//! Blocking executor that runs `SynthientClient` requests over the network.
//!
//! # Design
//! `Client` pairs the stateless builder/parser with a `ureq` agent configured
//! once at construction: global timeout, optional HTTP proxy, and
//! `http_status_as_error(false)` so every status comes back as data and the
//! parser alone decides what it means. Each operation is exactly one round
//! trip. The agent's connection pool is the only shared state, so a `Client`
//! can be cloned and used from several threads at once.

use std::time::Duration;

use tracing::debug;

use crate::client::SynthientClient;
use crate::config::ClientConfig;
use crate::error::{ApiError, ConfigError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{DeleteResponse, LookupResponse, VisitResponse};

#[derive(Clone)]
pub struct Client {
    inner: SynthientClient,
    agent: ureq::Agent,
    default_timeout: Duration,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("inner", &self.inner)
            .field("default_timeout", &self.default_timeout)
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        // An unset proxy means a direct connection, never one picked up from
        // the process environment.
        let proxy = match &config.proxy {
            Some(proxy) => Some(
                ureq::Proxy::new(&proxy.uri())
                    .map_err(|e| ConfigError::Proxy(format!("{}: {e}", proxy.uri())))?,
            ),
            None => None,
        };

        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.default_timeout))
            .proxy(proxy)
            .build()
            .new_agent();

        Ok(Self {
            inner: SynthientClient::new(&config.base_url, &config.api_key),
            agent,
            default_timeout: config.default_timeout,
        })
    }

    /// Shorthand for `Client::new(ClientConfig::from_env()?)`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Look up a token.
    ///
    /// Fails with `ErrorResponse` on 401, 404 and 409 and with
    /// `InternalServerError` on any other non-200 status.
    pub fn lookup(&self, token: &str) -> Result<LookupResponse, ApiError> {
        let response = self.execute(self.inner.build_lookup(token))?;
        self.inner.parse_lookup(response)
    }

    /// Fetch one page of a session's visits.
    ///
    /// Fails with `ErrorResponse` on 401 and 409 and with
    /// `InternalServerError` on any other non-200 status.
    pub fn visits(&self, session: &str) -> Result<VisitResponse, ApiError> {
        let response = self.execute(self.inner.build_visits(session))?;
        self.inner.parse_visits(response)
    }

    /// Delete a token. Only a 500 is an error; every other status carries the
    /// server's message back as a `DeleteResponse`.
    pub fn delete(&self, token: &str) -> Result<DeleteResponse, ApiError> {
        let response = self.execute(self.inner.build_delete(token))?;
        self.inner.parse_delete(response)
    }

    /// Run a prepared request and return the raw response, whatever its status.
    pub fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = req.method.as_str(), path = %req.path, "dispatching request");

        let mut builder = match req.method {
            HttpMethod::Get => self.agent.get(&req.path),
            HttpMethod::Delete => self.agent.delete(&req.path),
        };
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = builder
            .call()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        debug!(status, path = %req.path, "received response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
