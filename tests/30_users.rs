mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{expect_error, expect_json, sorted_keys, TestServer};
use noteful_api::services::UserService;

#[tokio::test]
async fn register_never_returns_the_password() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server
        .post(
            "/api/users",
            &json!({ "name": "Example User", "username": "exampleuser", "password": "password123" }),
        )
        .await?;
    let location = res.headers().get("location").and_then(|v| v.to_str().ok()).map(str::to_string);
    let user = expect_json(res, StatusCode::CREATED).await?;

    assert_eq!(sorted_keys(&user), vec!["createdAt", "id", "name", "updatedAt", "username"]);
    assert_eq!(user["username"], "exampleuser");
    assert_eq!(location, Some(format!("/api/users/{}", user["id"].as_str().unwrap())));

    // The stored hash verifies against the original password
    let service = UserService::from_state(&server.state);
    let verified = service.verify_credentials("exampleuser", "password123").await?;
    assert_eq!(verified.map(|u| u.id.to_hex()).as_deref(), user["id"].as_str());
    Ok(())
}

#[tokio::test]
async fn location_resolves_to_the_user() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server
        .post("/api/users", &json!({ "username": "findme", "password": "password123" }))
        .await?;
    let location = res
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("location header");
    let created = expect_json(res, StatusCode::CREATED).await?;

    let fetched = expect_json(server.get(&location).await?, StatusCode::OK).await?;
    assert_eq!(fetched, created);
    assert!(fetched.get("password").is_none());

    let message = expect_error(server.get("/api/users/NOT-A-VALID-ID").await?, StatusCode::BAD_REQUEST).await?;
    assert_eq!(message, "The `id` is not valid");
    expect_error(server.get("/api/users/999999999999999999999999").await?, StatusCode::NOT_FOUND).await?;
    Ok(())
}

#[tokio::test]
async fn name_is_optional() -> Result<()> {
    let server = TestServer::start().await?;

    let user = expect_json(
        server.post("/api/users", &json!({ "username": "anon", "password": "password123" })).await?,
        StatusCode::CREATED,
    )
    .await?;
    assert!(user["name"].is_null());
    Ok(())
}

#[tokio::test]
async fn registration_errors() -> Result<()> {
    let server = TestServer::start().await?;
    let valid = json!({ "username": "exampleuser", "password": "password123" });
    expect_json(server.post("/api/users", &valid).await?, StatusCode::CREATED).await?;

    let message = expect_error(server.post("/api/users", &valid).await?, StatusCode::BAD_REQUEST).await?;
    assert_eq!(message, "The username already exists");

    let message = expect_error(
        server.post("/api/users", &json!({ "password": "password123" })).await?,
        StatusCode::BAD_REQUEST,
    )
    .await?;
    assert_eq!(message, "Missing `username` in request body");

    let message = expect_error(
        server.post("/api/users", &json!({ "username": "someone" })).await?,
        StatusCode::BAD_REQUEST,
    )
    .await?;
    assert_eq!(message, "Missing `password` in request body");

    let message = expect_error(
        server.post("/api/users", &json!({ "username": "someone", "password": "short" })).await?,
        StatusCode::BAD_REQUEST,
    )
    .await?;
    assert_eq!(message, "The `password` must be between 8 and 72 characters long");

    let message = expect_error(
        server.post("/api/users", &json!({ "username": "someone", "password": " password123" })).await?,
        StatusCode::BAD_REQUEST,
    )
    .await?;
    assert_eq!(message, "The `password` cannot start or end with whitespace");
    Ok(())
}
