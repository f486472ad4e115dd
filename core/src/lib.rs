//! Synchronous client SDK for the Synthient bot-detection API.
//!
//! # Overview
//! Three calls: `lookup` a token, list the `visits` of a session, and
//! `delete` a token. Each maps the HTTP status to either a typed response or
//! an `ApiError`. `verify_token` and `determine_action` turn a lookup into a
//! pass/fail verdict and an enforcement action.
//!
//! # Design
//! - `SynthientClient` is stateless and never touches the network: `build_*`
//!   produces an `HttpRequest`, `parse_*` consumes an `HttpResponse`.
//! - `Client` executes those requests with a configured `ureq` agent.
//! - Response types are immutable snapshots of a single reply.
//!
//! ```no_run
//! use synthient_core::{determine_action, Client, ClientConfig, TokenType};
//!
//! let client = Client::new(ClientConfig::new("api-key"))?;
//! let lookup = client.lookup("visitor-token")?;
//! let action = determine_action(&lookup, TokenType::Sign);
//! println!("{action}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod client;
pub mod config;
pub mod decision;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::SynthientClient;
pub use config::{ClientConfig, ProxyConfig, API_URL, DEFAULT_TIMEOUT};
pub use decision::{determine_action, verify_token};
pub use error::{ApiError, ConfigError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::Client;
pub use types::{
    ActionType, Browser, DeleteResponse, Device, IpData, Location, LookupResponse, RiskLevel,
    TokenType, VisitResponse,
};
