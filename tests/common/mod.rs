#![allow(dead_code)]

use anyhow::Result;
use portal_admin_api::app::{app, AppState};
use portal_admin_api::auth::{generate_jwt, Claims};
use portal_admin_api::scope::Role;
use serde_json::Value;
use uuid::Uuid;

/// A live server over the in-memory store, bound to an ephemeral port.
/// Each test spawns its own instance so state never leaks between tests.
pub struct TestServer {
    pub base_url: String,
    pub root_id: Uuid,
}

pub async fn spawn_server() -> Result<TestServer> {
    let state = AppState::in_memory();
    let root = state.node_service().ensure_root().await?;
    let server = spawn_with_state(state).await?;

    Ok(TestServer {
        root_id: root.id,
        ..server
    })
}

/// Spawn the router over an arbitrary state, for tests that need a
/// non-default store. `root_id` is nil since no root is bootstrapped.
pub async fn spawn_with_state(state: AppState) -> Result<TestServer> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app(state)).await {
            eprintln!("test server error: {}", e);
        }
    });

    Ok(TestServer {
        base_url: format!("http://{}", addr),
        root_id: Uuid::nil(),
    })
}

pub fn superadmin_token() -> String {
    generate_jwt(Claims::new("test-superadmin".into(), Role::Superadmin, None))
        .expect("token generation")
}

pub fn admin_token(home_node_id: Uuid) -> String {
    generate_jwt(Claims::new(
        "test-admin".into(),
        Role::Admin,
        Some(home_node_id),
    ))
    .expect("token generation")
}

pub fn user_token() -> String {
    generate_jwt(Claims::new("test-user".into(), Role::User, None)).expect("token generation")
}

/// POST /api/nodes and return the created node's id, asserting success.
pub async fn create_node(
    server: &TestServer,
    token: &str,
    parent_id: Uuid,
    name: &str,
    category: &str,
) -> Result<Uuid> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/api/nodes", server.base_url))
        .bearer_auth(token)
        .json(&serde_json::json!({
            "parent_id": parent_id,
            "name": name,
            "category": category
        }))
        .send()
        .await?;

    anyhow::ensure!(
        res.status() == reqwest::StatusCode::CREATED,
        "node create failed: {}",
        res.text().await?
    );
    let body: Value = res.json().await?;
    let id = body["data"]["id"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("missing id in response"))?;
    Ok(Uuid::parse_str(id)?)
}

/// Build the canonical test chain root -> KUNDE -> STANDORT -> BEREICH.
pub async fn seed_chain(server: &TestServer, token: &str) -> Result<(Uuid, Uuid, Uuid, Uuid)> {
    let root = server.root_id;
    let kunde = create_node(server, token, root, "Acme", "KUNDE").await?;
    let standort = create_node(server, token, kunde, "Berlin", "STANDORT").await?;
    let bereich = create_node(server, token, standort, "Lobby", "BEREICH").await?;
    Ok((root, kunde, standort, bereich))
}
