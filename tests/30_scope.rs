mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn superadmin_sees_all_admin_sees_subtree_user_sees_nothing() -> Result<()> {
    let server = common::spawn_server().await?;
    let super_token = common::superadmin_token();
    let (root, kunde, _standort, _bereich) = common::seed_chain(&server, &super_token).await?;
    // Second branch the admin must not see
    let other = common::create_node(&server, &super_token, root, "Globex", "KUNDE").await?;

    let client = reqwest::Client::new();

    let fetch = |token: String| {
        let client = client.clone();
        let url = format!("{}/api/nodes", server.base_url);
        async move {
            let res = client.get(url).bearer_auth(token).send().await?;
            anyhow::ensure!(res.status() == StatusCode::OK, "list failed");
            let body: Value = res.json().await?;
            Ok::<Vec<String>, anyhow::Error>(
                body["data"]
                    .as_array()
                    .map(|nodes| {
                        nodes
                            .iter()
                            .filter_map(|n| n["id"].as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default(),
            )
        }
    };

    let all = fetch(super_token.clone()).await?;
    assert_eq!(all.len(), 5);

    let admin_view = fetch(common::admin_token(kunde)).await?;
    assert_eq!(admin_view.len(), 3); // kunde + standort + bereich
    assert!(!admin_view.contains(&other.to_string()));
    assert!(!admin_view.contains(&root.to_string()));
    // Monotonicity: everything the admin sees, the superadmin sees
    assert!(admin_view.iter().all(|id| all.contains(id)));

    let user_view = fetch(common::user_token()).await?;
    assert!(user_view.is_empty());
    Ok(())
}

#[tokio::test]
async fn admin_cannot_touch_nodes_outside_home_subtree() -> Result<()> {
    let server = common::spawn_server().await?;
    let super_token = common::superadmin_token();
    let (root, kunde, ..) = common::seed_chain(&server, &super_token).await?;
    let other = common::create_node(&server, &super_token, root, "Globex", "KUNDE").await?;

    let admin_token = common::admin_token(kunde);
    let client = reqwest::Client::new();

    // Read of a foreign node
    let res = client
        .get(format!("{}/api/nodes/{}", server.base_url, other))
        .bearer_auth(&admin_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Create under a foreign parent
    let res = client
        .post(format!("{}/api/nodes", server.base_url))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({
            "parent_id": other,
            "name": "intruder",
            "category": "STANDORT"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Within the home subtree everything works
    let res = client
        .post(format!("{}/api/nodes", server.base_url))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({
            "parent_id": kunde,
            "name": "Hamburg",
            "category": "STANDORT"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    Ok(())
}

#[tokio::test]
async fn config_access_fails_closed() -> Result<()> {
    let server = common::spawn_server().await?;
    let super_token = common::superadmin_token();
    let (root, kunde, standort, _bereich) = common::seed_chain(&server, &super_token).await?;
    let other = common::create_node(&server, &super_token, root, "Globex", "KUNDE").await?;

    let client = reqwest::Client::new();
    let admin_token = common::admin_token(kunde);

    // Admin configures inside the home subtree
    let res = client
        .post(format!("{}/api/captive-portal", server.base_url))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({"node_id": standort, "headline": "Welcome"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    // ... but not outside it
    let res = client
        .post(format!("{}/api/captive-portal", server.base_url))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({"node_id": other, "headline": "Intrusion"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Users cannot read configs at all
    let res = client
        .get(format!(
            "{}/api/captive-portal?node_id={}",
            server.base_url, standort
        ))
        .bearer_auth(common::user_token())
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn user_mutations_are_forbidden() -> Result<()> {
    let server = common::spawn_server().await?;
    let super_token = common::superadmin_token();
    let (_root, kunde, ..) = common::seed_chain(&server, &super_token).await?;

    let client = reqwest::Client::new();
    let user_token = common::user_token();

    let res = client
        .post(format!("{}/api/nodes", server.base_url))
        .bearer_auth(&user_token)
        .json(&serde_json::json!({
            "parent_id": kunde,
            "name": "nope",
            "category": "STANDORT"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .delete(format!("{}/api/nodes/{}", server.base_url, kunde))
        .bearer_auth(&user_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}
