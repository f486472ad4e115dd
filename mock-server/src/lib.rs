use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

/// Visits returned per page by `/visits/{session}`.
pub const PAGE_SIZE: usize = 50;

/// A stored token evaluation, serialized exactly as the lookup endpoint
/// returns it. Nested blocks are kept as raw JSON.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Visit {
    pub token: String,
    pub token_type: String,
    pub session: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<Value>,
    pub ip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    pub risk_score: f64,
    pub is_incognito: bool,
    pub is_bot: bool,
    pub is_vm: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solved: Option<bool>,
    pub consumed: bool,
}

impl Visit {
    /// A low-risk, unconsumed `sign` token with every optional block filled.
    pub fn sample(token: &str, session: &str) -> Self {
        Self {
            token: token.to_string(),
            token_type: "sign".to_string(),
            session: session.to_string(),
            device: Some(json!({"model": "Pixel 8", "brand": "Google", "os": "Android", "version": "14"})),
            browser: Some(json!({"name": "Chrome", "version": "126.0"})),
            ip: "203.0.113.7".to_string(),
            ip_data: Some(json!({
                "is_vpn": false, "is_proxy": false, "is_tor": false, "is_relay": false,
                "asn": "AS15169"
            })),
            location: Some(json!({
                "city": "Austin", "region": "Texas", "country": "United States",
                "region_code": "TX", "country_code": "US",
                "latitude": 30.27, "longitude": -97.74
            })),
            page: Some("/".to_string()),
            risk_score: 10.0,
            is_incognito: false,
            is_bot: false,
            is_vm: false,
            solved: None,
            consumed: false,
        }
    }
}

pub type Db = Arc<RwLock<BTreeMap<String, Visit>>>;

/// In-memory stand-in for the remote API.
///
/// Faults map a token or session id to a status every route answers with
/// for that id, before any lookup happens.
#[derive(Clone)]
pub struct MockApi {
    api_key: Arc<str>,
    db: Db,
    faults: Arc<HashMap<String, u16>>,
}

impl MockApi {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: Arc::from(api_key),
            db: Arc::new(RwLock::new(BTreeMap::new())),
            faults: Arc::new(HashMap::new()),
        }
    }

    pub fn with_visits(self, visits: impl IntoIterator<Item = Visit>) -> Self {
        let db: BTreeMap<String, Visit> =
            visits.into_iter().map(|v| (v.token.clone(), v)).collect();
        Self {
            db: Arc::new(RwLock::new(db)),
            ..self
        }
    }

    pub fn with_fault(self, id: &str, status: u16) -> Self {
        let mut faults = (*self.faults).clone();
        faults.insert(id.to_string(), status);
        Self {
            faults: Arc::new(faults),
            ..self
        }
    }

    pub fn db(&self) -> Db {
        self.db.clone()
    }

    pub fn router(self) -> Router {
        Router::new()
            .route("/lookup/{token}", get(lookup))
            .route("/visits/{session}", get(visits))
            .route("/delete/{token}", delete(delete_token))
            .with_state(self)
    }
}

/// Router with an empty store that accepts `api_key`.
pub fn app(api_key: &str) -> Router {
    MockApi::new(api_key).router()
}

pub async fn run(listener: TcpListener, api: MockApi) -> Result<(), std::io::Error> {
    axum::serve(listener, api.router()).await
}

type Reply = (StatusCode, Json<Value>);

fn message(status: StatusCode, text: &str) -> Reply {
    (status, Json(json!({ "message": text })))
}

/// Auth and fault injection shared by every route.
fn precheck(api: &MockApi, headers: &HeaderMap, id: &str) -> Result<(), Reply> {
    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == &*api.api_key);
    if !authorized {
        return Err(message(StatusCode::UNAUTHORIZED, "Invalid API key."));
    }
    if let Some(&code) = api.faults.get(id) {
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        debug!(id, %status, "injecting fault");
        return Err(message(status, &format!("Injected fault {code}.")));
    }
    Ok(())
}

async fn lookup(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Path(token): Path<String>,
) -> Result<Json<Visit>, Reply> {
    precheck(&api, &headers, &token)?;
    let mut db = api.db.write().await;
    let visit = db
        .get_mut(&token)
        .ok_or_else(|| message(StatusCode::NOT_FOUND, "Token not found."))?;
    let snapshot = visit.clone();
    visit.consumed = true;
    Ok(Json(snapshot))
}

async fn visits(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Path(session): Path<String>,
) -> Result<Json<Value>, Reply> {
    precheck(&api, &headers, &session)?;
    let db = api.db.read().await;
    let matching: Vec<&Visit> = db.values().filter(|v| v.session == session).collect();
    let has_next = matching.len() > PAGE_SIZE;
    let page: Vec<&Visit> = matching.into_iter().take(PAGE_SIZE).collect();
    Ok(Json(json!({
        "session": session,
        "visits": page,
        "has_next": has_next,
    })))
}

async fn delete_token(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Path(token): Path<String>,
) -> Result<Reply, Reply> {
    precheck(&api, &headers, &token)?;
    let mut db = api.db.write().await;
    match db.remove(&token) {
        Some(_) => Ok(message(StatusCode::OK, "Token deleted.")),
        None => Err(message(StatusCode::NOT_FOUND, "Token not found.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visit_serializes_without_absent_fields() {
        let visit = Visit {
            device: None,
            solved: None,
            page: None,
            ..Visit::sample("t1", "s1")
        };
        let json = serde_json::to_value(&visit).unwrap();
        assert_eq!(json["token"], "t1");
        assert_eq!(json["token_type"], "sign");
        assert!(json.get("device").is_none());
        assert!(json.get("solved").is_none());
        assert!(json.get("page").is_none());
        assert!(json.get("browser").is_some());
    }

    #[test]
    fn with_visits_indexes_by_token() {
        let api = MockApi::new("k").with_visits([Visit::sample("b", "s"), Visit::sample("a", "s")]);
        let db = api.db();
        let db = db.try_read().unwrap();
        let tokens: Vec<&String> = db.keys().collect();
        assert_eq!(tokens, ["a", "b"]);
    }

    #[test]
    fn faults_accumulate() {
        let api = MockApi::new("k").with_fault("x", 409).with_fault("y", 500);
        assert_eq!(api.faults.get("x"), Some(&409));
        assert_eq!(api.faults.get("y"), Some(&500));
    }
}
