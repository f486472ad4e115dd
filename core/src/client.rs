//! Stateless HTTP request builder and response parser for the Synthient API.
//!
//! # Design
//! `SynthientClient` holds only the base URL and API key and carries no
//! mutable state between calls. Each operation is split into a `build_*`
//! method that produces an `HttpRequest` and a `parse_*` method that consumes
//! an `HttpResponse`. The status tables differ per operation:
//!
//! | operation | success | relayed as `ErrorResponse` | otherwise |
//! |-----------|---------|----------------------------|-----------|
//! | lookup    | 200     | 401, 404, 409              | internal error |
//! | visits    | 200     | 401, 409                   | internal error |
//! | delete    | any but 500 | none                   | internal error on 500 |
//!
//! Delete deliberately does not special-case 401/404/409: any non-500 reply
//! is read as a `DeleteResponse` carrying the server's message.
//!
//! `{message}` bodies (delete replies and relayed errors) are read leniently:
//! an empty, non-JSON, or message-less body yields an empty message.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;

use crate::error::{ApiError, DELETE_FAILED, LOOKUP_FAILED};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{DeleteResponse, LookupResponse, MessageBody, VisitResponse};

/// Characters left untouched inside a path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const LOOKUP_ERRORS: &[u16] = &[401, 404, 409];
const VISITS_ERRORS: &[u16] = &[401, 409];

/// Synchronous, stateless client for the Synthient API.
#[derive(Clone)]
pub struct SynthientClient {
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for SynthientClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthientClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl SynthientClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_lookup(&self, token: &str) -> HttpRequest {
        self.request(HttpMethod::Get, "lookup", token)
    }

    pub fn build_visits(&self, session: &str) -> HttpRequest {
        self.request(HttpMethod::Get, "visits", session)
    }

    pub fn build_delete(&self, token: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, "delete", token)
    }

    pub fn parse_lookup(&self, response: HttpResponse) -> Result<LookupResponse, ApiError> {
        check_status(&response, LOOKUP_ERRORS)?;
        decode(&response.body)
    }

    pub fn parse_visits(&self, response: HttpResponse) -> Result<VisitResponse, ApiError> {
        check_status(&response, VISITS_ERRORS)?;
        decode(&response.body)
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<DeleteResponse, ApiError> {
        if response.status == 500 {
            return Err(ApiError::InternalServerError(DELETE_FAILED.to_string()));
        }
        Ok(DeleteResponse {
            message: MessageBody::extract(&response.body),
        })
    }

    fn request(&self, method: HttpMethod, endpoint: &str, id: &str) -> HttpRequest {
        let id = utf8_percent_encode(id, SEGMENT);
        HttpRequest {
            method,
            path: format!("{}/{endpoint}/{id}", self.base_url),
            headers: vec![("authorization".to_string(), self.api_key.clone())],
            body: None,
        }
    }
}

/// Map lookup/visits statuses: 200 passes, `relayed` statuses become
/// `ErrorResponse` with the server's message, anything else is internal.
fn check_status(response: &HttpResponse, relayed: &[u16]) -> Result<(), ApiError> {
    if response.status == 200 {
        return Ok(());
    }
    if relayed.contains(&response.status) {
        return Err(ApiError::ErrorResponse {
            status: response.status,
            message: MessageBody::extract(&response.body),
        });
    }
    Err(ApiError::InternalServerError(LOOKUP_FAILED.to_string()))
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
