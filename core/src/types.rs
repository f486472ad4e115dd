//! Response and decision model for the Synthient API.
//!
//! # Design
//! Every response is built fresh from one HTTP reply and never mutated
//! afterwards. Nested blocks (`Device`, `Browser`, `IpData`, `Location`) are
//! owned by the `LookupResponse` that embeds them. Optional JSON fields map to
//! `Option` and stay `None` when absent or null.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of token the server issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Used for gathering data.
    Metrics,
    /// Used for verifying the challenge.
    Sign,
    /// Used for strict verification.
    Strict,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Metrics => "metrics",
            TokenType::Sign => "sign",
            TokenType::Strict => "strict",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "metrics" => Ok(TokenType::Metrics),
            "sign" => Ok(TokenType::Sign),
            "strict" => Ok(TokenType::Strict),
            other => Err(format!("unknown token type: {other}")),
        }
    }
}

/// Three-bucket simplification of the risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Bucket a raw score: `[..20)` low, `[20, 50)` medium, `[50, ..)` high.
    pub fn from_score(score: f64) -> Self {
        if score < 20.0 {
            RiskLevel::Low
        } else if score < 50.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

/// Enforcement decision for a visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    /// Let the visitor continue.
    Allow,
    /// Send the visitor elsewhere or ask for another form of verification.
    Redirect,
    /// Deny access.
    Block,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActionType::Allow => "allow",
            ActionType::Redirect => "redirect",
            ActionType::Block => "block",
        })
    }
}

impl From<RiskLevel> for ActionType {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Low => ActionType::Allow,
            RiskLevel::Medium => ActionType::Redirect,
            RiskLevel::High => ActionType::Block,
        }
    }
}

/// Visitor device.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Device {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub os: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Browser {
    pub name: String,
    pub version: String,
}

/// Reputation flags for the visitor's IP address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IpData {
    pub is_vpn: bool,
    pub is_proxy: bool,
    pub is_tor: bool,
    pub is_relay: bool,
    pub asn: String,
}

/// Geolocation of the visitor's IP address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub city: String,
    pub region: String,
    pub country: String,
    pub region_code: String,
    pub country_code: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Snapshot of a token's evaluation at lookup time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LookupResponse {
    pub token: String,
    pub token_type: TokenType,
    /// Stable per-visitor id; identical across that visitor's tokens.
    pub session: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<Browser>,
    pub ip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_data: Option<IpData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    pub risk_score: f64,
    pub is_incognito: bool,
    pub is_bot: bool,
    pub is_vm: bool,
    /// Present only when a challenge applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solved: Option<bool>,
    /// True once the token has been used for a decision.
    pub consumed: bool,
}

impl LookupResponse {
    /// Derived from `risk_score` on every call.
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_score(self.risk_score)
    }
}

/// One page of a session's lookup history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisitResponse {
    pub session: String,
    pub visits: Vec<LookupResponse>,
    pub has_next: bool,
}

/// Acknowledgement returned by the delete endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteResponse {
    pub message: String,
}

/// A `{message}` body, as sent with delete replies and 401/404/409 errors.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MessageBody {
    #[serde(default)]
    pub message: Option<String>,
}

impl MessageBody {
    /// The `message` field of `body`, or an empty string when the body is
    /// empty, not JSON, or has no string `message`.
    pub fn extract(body: &str) -> String {
        serde_json::from_str::<MessageBody>(body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_default()
    }
}
