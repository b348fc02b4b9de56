use anyhow::Context;
use reqwest::Client;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::Claims;
use crate::cli::config;
use crate::scope::Role;
use crate::tree::Category;

fn client_and_base() -> anyhow::Result<(Client, String, Option<String>)> {
    let cfg = config::load()?;
    Ok((Client::new(), cfg.server_url, cfg.token))
}

async fn api_get(path: &str) -> anyhow::Result<Value> {
    let (client, base, token) = client_and_base()?;
    let mut req = client.get(format!("{}{}", base, path));
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }
    let res = req.send().await.context("request failed")?;
    parse_envelope(res).await
}

async fn api_post(path: &str, body: Value) -> anyhow::Result<Value> {
    let (client, base, token) = client_and_base()?;
    let mut req = client.post(format!("{}{}", base, path)).json(&body);
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }
    let res = req.send().await.context("request failed")?;
    parse_envelope(res).await
}

async fn api_delete(path: &str) -> anyhow::Result<Value> {
    let (client, base, token) = client_and_base()?;
    let mut req = client.delete(format!("{}{}", base, path));
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }
    let res = req.send().await.context("request failed")?;
    if res.status() == reqwest::StatusCode::NO_CONTENT {
        return Ok(json!({"deleted": true}));
    }
    parse_envelope(res).await
}

async fn parse_envelope(res: reqwest::Response) -> anyhow::Result<Value> {
    let status = res.status();
    let body: Value = res.json().await.context("response was not JSON")?;
    if !status.is_success() {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        let code = body.get("code").and_then(Value::as_str).unwrap_or("");
        anyhow::bail!("server error {} [{}]: {}", status, code, message);
    }
    Ok(body.get("data").cloned().unwrap_or(body))
}

fn print_result(json_output: bool, data: &Value, text: impl FnOnce(&Value) -> String) {
    if json_output {
        println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
    } else {
        println!("{}", text(data));
    }
}

pub async fn nodes_list(json_output: bool) -> anyhow::Result<()> {
    let data = api_get("/api/nodes").await?;
    print_result(json_output, &data, |data| {
        let mut out = String::new();
        if let Some(nodes) = data.as_array() {
            for n in nodes {
                out.push_str(&format!(
                    "{}  {:<10} {}  (parent: {})\n",
                    n["id"].as_str().unwrap_or("?"),
                    n["category"].as_str().unwrap_or("?"),
                    n["name"].as_str().unwrap_or("?"),
                    n["parent_id"].as_str().unwrap_or("-"),
                ));
            }
            out.push_str(&format!("{} node(s)", nodes.len()));
        }
        out
    });
    Ok(())
}

pub async fn nodes_create(
    json_output: bool,
    parent_id: Uuid,
    name: String,
    category: Category,
) -> anyhow::Result<()> {
    let data = api_post(
        "/api/nodes",
        json!({"parent_id": parent_id, "name": name, "category": category}),
    )
    .await?;
    print_result(json_output, &data, |data| {
        format!("created node {}", data["id"].as_str().unwrap_or("?"))
    });
    Ok(())
}

pub async fn nodes_delete(json_output: bool, id: Uuid) -> anyhow::Result<()> {
    let data = api_delete(&format!("/api/nodes/{}", id)).await?;
    print_result(json_output, &data, |_| format!("deleted node {}", id));
    Ok(())
}

pub async fn portal_show(json_output: bool, node_id: Uuid) -> anyhow::Result<()> {
    let data = api_get(&format!("/api/captive-portal?node_id={}", node_id)).await?;
    print_result(json_output, &data, |data| {
        let count = data.as_array().map(Vec::len).unwrap_or(0);
        format!(
            "{} config(s) on the ancestor chain (last one is effective):\n{}",
            count,
            serde_json::to_string_pretty(data).unwrap_or_default()
        )
    });
    Ok(())
}

pub async fn portal_effective(json_output: bool, node_id: Uuid) -> anyhow::Result<()> {
    let data = api_get(&format!("/api/captive-portal/effective?node_id={}", node_id)).await?;
    print_result(json_output, &data, |data| {
        if data.is_null() {
            "no config on the ancestor chain, system defaults apply".to_string()
        } else {
            serde_json::to_string_pretty(data).unwrap_or_default()
        }
    });
    Ok(())
}

pub fn config_show(json_output: bool) -> anyhow::Result<()> {
    let cfg = config::load()?;
    if json_output {
        println!("{}", serde_json::to_string_pretty(&cfg)?);
    } else {
        println!("server: {}", cfg.server_url);
        println!(
            "token:  {}",
            if cfg.token.is_some() { "(set)" } else { "(not set)" }
        );
    }
    Ok(())
}

pub fn config_set(server: Option<String>, token: Option<String>) -> anyhow::Result<()> {
    if server.is_none() && token.is_none() {
        anyhow::bail!("nothing to set, pass --server and/or --token");
    }
    let cfg = config::set(server, token)?;
    println!("saved, server is {}", cfg.server_url);
    Ok(())
}

/// Mint a signed token locally. Meant for development and operations
/// against a server sharing the same JWT_SECRET.
pub fn mint_token(role: Role, home_node_id: Option<Uuid>, subject: String) -> anyhow::Result<()> {
    let claims = Claims::new(subject, role, home_node_id);
    let token = crate::auth::generate_jwt(claims)?;
    println!("{}", token);
    Ok(())
}
