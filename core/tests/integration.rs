//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every `Client`
//! operation over real HTTP through the configured `ureq` agent.

use std::net::SocketAddr;

use mock_server::{MockApi, Visit};
use synthient_core::{
    determine_action, verify_token, ActionType, ApiError, Client, ClientConfig, TokenType,
};

const KEY: &str = "test-key";

/// Serve `api` on a random local port from a background thread.
fn start(api: MockApi) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, api).await
        })
        .unwrap();
    });

    addr
}

fn client(addr: SocketAddr, key: &str) -> Client {
    Client::new(ClientConfig::new(key).with_base_url(format!("http://{addr}/"))).unwrap()
}

#[test]
fn lookup_verify_delete_lifecycle() {
    let risky = Visit {
        risk_score: 35.0,
        solved: Some(true),
        ..Visit::sample("tok_risky", "sess_1")
    };
    let addr = start(MockApi::new(KEY).with_visits([Visit::sample("tok_ok", "sess_1"), risky]));
    let client = client(addr, KEY);

    // Step 1: first lookup of a fresh token is allowed.
    let lookup = client.lookup("tok_ok").unwrap();
    assert_eq!(lookup.token, "tok_ok");
    assert_eq!(lookup.token_type, TokenType::Sign);
    assert_eq!(lookup.device.as_ref().unwrap().brand.as_deref(), Some("Google"));
    assert_eq!(lookup.location.as_ref().unwrap().region_code, "TX");
    assert!(verify_token(&lookup, TokenType::Sign));
    assert_eq!(determine_action(&lookup, TokenType::Sign), ActionType::Allow);

    // Step 2: the same token is now consumed and blocked.
    let again = client.lookup("tok_ok").unwrap();
    assert!(again.consumed);
    assert_eq!(determine_action(&again, TokenType::Sign), ActionType::Block);

    // Step 3: a medium-risk token is redirected.
    let risky = client.lookup("tok_risky").unwrap();
    assert_eq!(determine_action(&risky, TokenType::Sign), ActionType::Redirect);

    // Step 4: visits lists both tokens of the session.
    let visits = client.visits("sess_1").unwrap();
    assert_eq!(visits.session, "sess_1");
    assert_eq!(visits.visits.len(), 2);
    assert!(!visits.has_next);
    assert!(visits.visits.iter().all(|v| v.consumed));

    // Step 5: delete, then lookup fails with the server's 404 message.
    let deleted = client.delete("tok_ok").unwrap();
    assert_eq!(deleted.message, "Token deleted.");
    let err = client.lookup("tok_ok").unwrap_err();
    match err {
        ApiError::ErrorResponse { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Token not found.");
        }
        other => panic!("expected ErrorResponse, got {other:?}"),
    }

    // Step 6: deleting again is not an error; the 404 message comes back.
    let deleted = client.delete("tok_ok").unwrap();
    assert_eq!(deleted.message, "Token not found.");
}

#[test]
fn wrong_api_key_is_client_error() {
    let addr = start(MockApi::new(KEY).with_visits([Visit::sample("tok", "sess")]));
    let client = client(addr, "wrong-key");

    let err = client.lookup("tok").unwrap_err();
    assert!(matches!(err, ApiError::ErrorResponse { status: 401, .. }));
    assert_eq!(err.message(), Some("Invalid API key."));

    let err = client.visits("sess").unwrap_err();
    assert!(matches!(err, ApiError::ErrorResponse { status: 401, .. }));
}

#[test]
fn server_failures_use_fixed_messages() {
    let addr = start(
        MockApi::new(KEY)
            .with_visits([Visit::sample("tok", "sess")])
            .with_fault("tok", 500)
            .with_fault("sess", 503),
    );
    let client = client(addr, KEY);

    let err = client.lookup("tok").unwrap_err();
    assert!(matches!(err, ApiError::InternalServerError(_)));
    assert_eq!(err.to_string(), "Server failed to lookup token.");

    let err = client.visits("sess").unwrap_err();
    assert_eq!(err.to_string(), "Server failed to lookup token.");

    let err = client.delete("tok").unwrap_err();
    assert_eq!(err.to_string(), "Server failed to delete token.");
}

#[test]
fn conflict_is_relayed_for_lookup_but_not_delete() {
    let addr = start(
        MockApi::new(KEY)
            .with_visits([Visit::sample("tok", "sess")])
            .with_fault("tok", 409),
    );
    let client = client(addr, KEY);

    let err = client.lookup("tok").unwrap_err();
    assert!(matches!(err, ApiError::ErrorResponse { status: 409, .. }));

    let deleted = client.delete("tok").unwrap();
    assert_eq!(deleted.message, "Injected fault 409.");
}

#[test]
fn concurrent_calls_share_one_client() {
    let visits: Vec<Visit> = (0..8)
        .map(|i| Visit::sample(&format!("tok_{i}"), "sess"))
        .collect();
    let addr = start(MockApi::new(KEY).with_visits(visits));
    let client = client(addr, KEY);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let client = client.clone();
            std::thread::spawn(move || client.lookup(&format!("tok_{i}")).unwrap())
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let lookup = handle.join().unwrap();
        assert_eq!(lookup.token, format!("tok_{i}"));
        assert!(!lookup.consumed);
    }
}
