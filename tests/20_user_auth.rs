mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

// End-to-end session lifecycle against a real database: register a team,
// log in with the captain's credentials, verify, log out.
#[tokio::test]
async fn captain_login_verify_logout_roundtrip() -> Result<()> {
    if !common::database_configured() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let suffix = common::unique_suffix();

    let team_name = format!("team-{suffix}");
    let telegram = format!("@cap-{suffix}");

    let res = client
        .post(format!("{}/teams", server.base_url))
        .json(&json!({
            "teamName": team_name,
            "captainNick": "cap",
            "captainTelegram": telegram,
            "password": "pw",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    assert!(body["teamId"].is_i64());

    // Login resolves the captain through the team table
    let res = client
        .post(format!("{}/user-auth/login", server.base_url))
        .json(&json!({ "telegram": telegram, "password": "pw" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["userType"], "team_captain");
    assert_eq!(body["teamName"], team_name);
    assert_eq!(body["teamStatus"], "pending");
    let token = body["token"].as_str().expect("token").to_string();
    assert!(token.len() >= 43);

    // Verify returns the same identity, fresh from the team table
    let res = client
        .post(format!("{}/user-auth/verify", server.base_url))
        .json(&json!({ "token": token }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["valid"], true);
    assert_eq!(body["teamName"], team_name);
    assert_eq!(body["teamStatus"], "pending");

    // Logout, then the token is unusable
    let res = client
        .post(format!("{}/user-auth/logout", server.base_url))
        .json(&json!({ "token": token }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/user-auth/verify", server.base_url))
        .json(&json!({ "token": token }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "INVALID_TOKEN");
    Ok(())
}

// Wrong password and unknown identifier must be indistinguishable.
#[tokio::test]
async fn login_failures_are_indistinguishable() -> Result<()> {
    if !common::database_configured() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let suffix = common::unique_suffix();

    let telegram = format!("@cap-{suffix}");
    client
        .post(format!("{}/teams", server.base_url))
        .json(&json!({
            "teamName": format!("team-{suffix}"),
            "captainNick": "cap",
            "captainTelegram": telegram,
            "password": "pw",
        }))
        .send()
        .await?;

    let wrong_password = client
        .post(format!("{}/user-auth/login", server.base_url))
        .json(&json!({ "telegram": telegram, "password": "nope" }))
        .send()
        .await?;
    let unknown_user = client
        .post(format!("{}/user-auth/login", server.base_url))
        .json(&json!({ "telegram": format!("@ghost-{suffix}"), "password": "pw" }))
        .send()
        .await?;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

    let a = wrong_password.json::<serde_json::Value>().await?;
    let b = unknown_user.json::<serde_json::Value>().await?;
    assert_eq!(a, b);
    Ok(())
}

#[tokio::test]
async fn missing_and_invalid_tokens_are_distinct_failures() -> Result<()> {
    if !common::database_configured() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // No token at all: 401 Unauthorized
    let res = client
        .put(format!("{}/teams/1/status", server.base_url))
        .json(&json!({ "status": "approved" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "UNAUTHORIZED");

    // A token that resolves to nothing: 401 InvalidToken
    let res = client
        .put(format!("{}/teams/1/status", server.base_url))
        .header("X-Auth-Token", "no-such-token")
        .json(&json!({ "status": "approved" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "INVALID_TOKEN");

    // A captain session on an admin-gated route: 403 Forbidden
    let suffix = common::unique_suffix();
    let telegram = format!("@cap-{suffix}");
    client
        .post(format!("{}/teams", server.base_url))
        .json(&json!({
            "teamName": format!("team-{suffix}"),
            "captainNick": "cap",
            "captainTelegram": telegram,
            "password": "pw",
        }))
        .send()
        .await?;
    let login = client
        .post(format!("{}/user-auth/login", server.base_url))
        .json(&json!({ "telegram": telegram, "password": "pw" }))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    let captain_token = login["token"].as_str().expect("token");

    let res = client
        .put(format!("{}/teams/1/status", server.base_url))
        .header("X-Auth-Token", captain_token)
        .json(&json!({ "status": "approved" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "FORBIDDEN");
    Ok(())
}
