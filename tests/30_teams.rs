mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

async fn register_team(
    client: &reqwest::Client,
    base_url: &str,
    team_name: &str,
    telegram: &str,
) -> Result<i64> {
    let res = client
        .post(format!("{base_url}/teams"))
        .json(&json!({
            "teamName": team_name,
            "captainNick": "cap",
            "captainTelegram": telegram,
            "password": "pw",
            "topNick": "t", "topTelegram": "@t",
            "jungleNick": "j", "jungleTelegram": "@j",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    Ok(body["teamId"].as_i64().expect("teamId"))
}

#[tokio::test]
async fn captain_edit_demotes_team_to_pending_review() -> Result<()> {
    if !common::database_configured() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let suffix = common::unique_suffix();

    let team_name = format!("team-{suffix}");
    let telegram = format!("@cap-{suffix}");
    let team_id = register_team(&client, &server.base_url, &team_name, &telegram).await?;

    let login = client
        .post(format!("{}/user-auth/login", server.base_url))
        .json(&json!({ "telegram": telegram, "password": "pw" }))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    let token = login["token"].as_str().expect("token");

    // Roster edit through the owner gate returns the updated record with
    // the re-review markers set
    let res = client
        .put(format!("{}/teams/{team_id}", server.base_url))
        .header("X-Session-Token", token)
        .json(&json!({ "topNick": "newtop", "topTelegram": "@newtop" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["team"]["status"], "pending");
    assert_eq!(body["team"]["isEdited"], true);
    assert_eq!(body["team"]["topNick"], "newtop");

    // A different captain's session must not pass the owner gate
    let other_suffix = common::unique_suffix();
    let other_telegram = format!("@cap-{other_suffix}");
    register_team(
        &client,
        &server.base_url,
        &format!("team-{other_suffix}"),
        &other_telegram,
    )
    .await?;
    let other_login = client
        .post(format!("{}/user-auth/login", server.base_url))
        .json(&json!({ "telegram": other_telegram, "password": "pw" }))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    let other_token = other_login["token"].as_str().expect("token");

    let res = client
        .put(format!("{}/teams/{team_id}", server.base_url))
        .header("X-Session-Token", other_token)
        .json(&json!({ "topNick": "hijack" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn team_login_returns_profile_without_session() -> Result<()> {
    if !common::database_configured() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let suffix = common::unique_suffix();

    let team_name = format!("team-{suffix}");
    register_team(&client, &server.base_url, &team_name, &format!("@cap-{suffix}")).await?;

    let res = client
        .post(format!("{}/teams/login", server.base_url))
        .json(&json!({ "teamName": team_name, "password": "pw" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["team"]["teamName"], team_name);
    assert!(body.get("token").is_none());

    let res = client
        .post(format!("{}/teams/login", server.base_url))
        .json(&json!({ "teamName": team_name, "password": "wrong" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn delete_requires_the_team_password() -> Result<()> {
    if !common::database_configured() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let suffix = common::unique_suffix();

    let team_name = format!("team-{suffix}");
    let team_id =
        register_team(&client, &server.base_url, &team_name, &format!("@cap-{suffix}")).await?;

    // Mismatched password is rejected
    let res = client
        .delete(format!("{}/teams/{team_id}", server.base_url))
        .json(&json!({ "password": "wrong" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], "Invalid password");

    // Matching password deletes the team
    let res = client
        .delete(format!("{}/teams/{team_id}", server.base_url))
        .json(&json!({ "password": "pw" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // The team no longer appears under any status filter
    for status in ["pending", "approved", "rejected"] {
        let body = client
            .get(format!("{}/teams?status={status}", server.base_url))
            .send()
            .await?
            .json::<serde_json::Value>()
            .await?;
        let names: Vec<&str> = body["teams"]
            .as_array()
            .expect("teams array")
            .iter()
            .filter_map(|t| t["teamName"].as_str())
            .collect();
        assert!(!names.contains(&team_name.as_str()));
    }

    // And fetching it directly is a 404
    let res = client
        .get(format!("{}/teams/{team_id}", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn player_registration_roundtrip() -> Result<()> {
    if !common::database_configured() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let suffix = common::unique_suffix();

    let res = client
        .post(format!("{}/players", server.base_url))
        .json(&json!({
            "nickname": format!("solo-{suffix}"),
            "telegram": format!("@solo-{suffix}"),
            "preferredRoles": ["mid", "jungle"],
            "hasFriends": true,
            "friend1Nickname": "buddy",
            "friend1Telegram": "@buddy",
            "friend1Roles": ["support"],
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    let player_id = body["playerId"].as_i64().expect("playerId");

    let body = client
        .get(format!("{}/players", server.base_url))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    let player = body["players"]
        .as_array()
        .expect("players array")
        .iter()
        .find(|p| p["id"].as_i64() == Some(player_id))
        .expect("registered player listed")
        .clone();
    assert_eq!(player["status"], "pending");
    assert_eq!(player["preferredRoles"], json!(["mid", "jungle"]));
    assert_eq!(player["friend1Nickname"], "buddy");

    // Registered without a password, so deletion accepts any password
    let res = client
        .delete(format!("{}/players/{player_id}", server.base_url))
        .json(&json!({ "password": "whatever" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}
