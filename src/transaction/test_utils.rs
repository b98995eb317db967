//! Helpers shared by the transaction endpoint tests.

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;

use crate::{
    currency::ConversionGateway,
    models::LogInResponse,
    routing::build_router,
    state::AppState,
    stores::{MemoryDatabase, MemoryTransactionStore, MemoryUserStore},
};

/// An app state backed by the in-memory stores.
///
/// The conversion gateway points at a closed port; the transaction tests
/// never call it.
pub fn test_state() -> AppState<MemoryUserStore, MemoryTransactionStore> {
    let db = MemoryDatabase::new();

    AppState::new(
        "42",
        MemoryUserStore::new(db.clone()),
        MemoryTransactionStore::new(db),
        ConversionGateway::new("http://127.0.0.1:1", "test-key")
            .expect("Could not create conversion gateway."),
    )
}

/// A test server running the full router over in-memory stores.
pub fn test_server() -> TestServer {
    TestServer::new(build_router(test_state())).expect("Could not create test server.")
}

/// Register `username` and log them in, returning their profile and token.
pub async fn sign_up(server: &TestServer, username: &str, password: &str) -> LogInResponse {
    server
        .post("/registrar")
        .content_type("application/json")
        .json(&json!({ "username": username, "password": password }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/login")
        .content_type("application/json")
        .json(&json!({ "username": username, "password": password }))
        .await;

    response.assert_status_ok();

    response.json::<LogInResponse>()
}
