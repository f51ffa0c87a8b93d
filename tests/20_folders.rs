mod common;

use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{expect_error, expect_json, sorted_keys, TestServer, ARCHIVE_FOLDER};

fn timestamp(value: &Value) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value.as_str().unwrap_or_default())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|e| panic!("bad timestamp {}: {}", value, e))
}

#[tokio::test]
async fn list_is_sorted_by_name_with_expected_fields() -> Result<()> {
    let server = TestServer::start().await?;

    let body = expect_json(server.get("/api/folders").await?, StatusCode::OK).await?;
    let folders = body.as_array().expect("array body");
    assert_eq!(folders.len(), 4);

    let names: Vec<&str> = folders.iter().filter_map(|f| f["name"].as_str()).collect();
    assert_eq!(names, vec!["Archive", "Drafts", "Personal", "Work"]);

    for folder in folders {
        assert_eq!(sorted_keys(folder), vec!["createdAt", "id", "name", "updatedAt"]);
    }
    Ok(())
}

#[tokio::test]
async fn search_term_is_a_case_sensitive_substring() -> Result<()> {
    let server = TestServer::start().await?;

    let body = expect_json(server.get("/api/folders?searchTerm=r").await?, StatusCode::OK).await?;
    let names: Vec<&str> = body.as_array().unwrap().iter().filter_map(|f| f["name"].as_str()).collect();
    assert_eq!(names, vec!["Archive", "Drafts", "Personal", "Work"]);

    let body = expect_json(server.get("/api/folders?searchTerm=a").await?, StatusCode::OK).await?;
    let names: Vec<&str> = body.as_array().unwrap().iter().filter_map(|f| f["name"].as_str()).collect();
    assert_eq!(names, vec!["Drafts", "Personal"]);

    // Regex metacharacters are literal
    let body = expect_json(server.get("/api/folders?searchTerm=.*").await?, StatusCode::OK).await?;
    assert_eq!(body, json!([]));

    // Empty term is no filter
    let body = expect_json(server.get("/api/folders?searchTerm=").await?, StatusCode::OK).await?;
    assert_eq!(body.as_array().unwrap().len(), 4);
    Ok(())
}

#[tokio::test]
async fn get_by_id() -> Result<()> {
    let server = TestServer::start().await?;

    let body = expect_json(server.get(&format!("/api/folders/{}", ARCHIVE_FOLDER)).await?, StatusCode::OK).await?;
    assert_eq!(body["id"], ARCHIVE_FOLDER);
    assert_eq!(body["name"], "Archive");

    // Hex ids are case-insensitive
    let upper = ARCHIVE_FOLDER.to_uppercase();
    let body = expect_json(server.get(&format!("/api/folders/{}", upper)).await?, StatusCode::OK).await?;
    assert_eq!(body["id"], ARCHIVE_FOLDER);
    Ok(())
}

#[tokio::test]
async fn get_rejects_invalid_ids_and_404s_unknown_ones() -> Result<()> {
    let server = TestServer::start().await?;

    let message = expect_error(server.get("/api/folders/NOT-A-VALID-ID").await?, StatusCode::BAD_REQUEST).await?;
    assert_eq!(message, "The `id` is not valid");

    // Twelve characters is a valid raw id that matches nothing
    let message = expect_error(server.get("/api/folders/DOESNOTEXIST").await?, StatusCode::NOT_FOUND).await?;
    assert_eq!(message, "Not Found");

    expect_error(server.get("/api/folders/999999999999999999999999").await?, StatusCode::NOT_FOUND).await?;
    Ok(())
}

#[tokio::test]
async fn create_returns_201_with_location() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server.post("/api/folders", &json!({ "name": "Recipes", "ignored": 42 })).await?;
    let location = res
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = expect_json(res, StatusCode::CREATED).await?;

    assert_eq!(sorted_keys(&body), vec!["createdAt", "id", "name", "updatedAt"]);
    assert_eq!(body["name"], "Recipes");
    assert_eq!(body["createdAt"], body["updatedAt"]);
    let id = body["id"].as_str().unwrap();
    assert_eq!(id.len(), 24);
    assert_eq!(location, Some(format!("/api/folders/{}", id)));
    Ok(())
}

#[tokio::test]
async fn create_requires_name() -> Result<()> {
    let server = TestServer::start().await?;

    for body in [json!({}), json!({ "name": null }), json!({ "name": "" }), json!({ "foo": "bar" })] {
        let message = expect_error(server.post("/api/folders", &body).await?, StatusCode::BAD_REQUEST).await?;
        assert_eq!(message, "Missing `name` in request body");
    }
    Ok(())
}

#[tokio::test]
async fn create_rejects_duplicate_names() -> Result<()> {
    let server = TestServer::start().await?;

    let message = expect_error(
        server.post("/api/folders", &json!({ "name": "Archive" })).await?,
        StatusCode::BAD_REQUEST,
    )
    .await?;
    assert_eq!(message, "The folder name already exists");

    // Uniqueness is case-sensitive
    expect_json(server.post("/api/folders", &json!({ "name": "archive" })).await?, StatusCode::CREATED).await?;
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_a_400() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server
        .client
        .post(server.url("/api/folders"))
        .header("content-type", "application/json")
        .body("{ \"name\": ")
        .send()
        .await?;
    let body = expect_json(res, StatusCode::BAD_REQUEST).await?;
    assert_eq!(body["code"], "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn update_renames_and_bumps_updated_at() -> Result<()> {
    let server = TestServer::start().await?;
    let path = format!("/api/folders/{}", ARCHIVE_FOLDER);
    let before = expect_json(server.get(&path).await?, StatusCode::OK).await?;

    let after = expect_json(server.put(&path, &json!({ "name": "Old stuff" })).await?, StatusCode::OK).await?;
    assert_eq!(after["id"], ARCHIVE_FOLDER);
    assert_eq!(after["name"], "Old stuff");
    assert_eq!(after["createdAt"], before["createdAt"]);
    assert!(timestamp(&after["updatedAt"]) > timestamp(&before["updatedAt"]));

    // Keeping its own name is not a duplicate
    expect_json(server.put(&path, &json!({ "name": "Old stuff" })).await?, StatusCode::OK).await?;
    Ok(())
}

#[tokio::test]
async fn update_validation_errors() -> Result<()> {
    let server = TestServer::start().await?;
    let path = format!("/api/folders/{}", ARCHIVE_FOLDER);

    let message = expect_error(
        server.put("/api/folders/NOT-A-VALID-ID", &json!({ "name": "x" })).await?,
        StatusCode::BAD_REQUEST,
    )
    .await?;
    assert_eq!(message, "The `id` is not valid");

    // A bad id wins even when the body is missing
    let res = server.client.put(server.url("/api/folders/NOT-A-VALID-ID")).send().await?;
    assert_eq!(expect_error(res, StatusCode::BAD_REQUEST).await?, "The `id` is not valid");

    let message = expect_error(server.put(&path, &json!({})).await?, StatusCode::BAD_REQUEST).await?;
    assert_eq!(message, "Missing `name` in request body");

    let message = expect_error(server.put(&path, &json!({ "name": "Work" })).await?, StatusCode::BAD_REQUEST).await?;
    assert_eq!(message, "The folder name already exists");

    expect_error(
        server.put("/api/folders/DOESNOTEXIST", &json!({ "name": "Nowhere" })).await?,
        StatusCode::NOT_FOUND,
    )
    .await?;
    Ok(())
}

#[tokio::test]
async fn delete_is_idempotent() -> Result<()> {
    let server = TestServer::start().await?;
    let path = format!("/api/folders/{}", ARCHIVE_FOLDER);

    let res = server.delete(&path).await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(res.text().await?.is_empty());

    assert_eq!(server.delete(&path).await?.status(), StatusCode::NO_CONTENT);
    assert_eq!(server.delete("/api/folders/DOESNOTEXIST").await?.status(), StatusCode::NO_CONTENT);

    let message = expect_error(server.delete("/api/folders/NOT-A-VALID-ID").await?, StatusCode::BAD_REQUEST).await?;
    assert_eq!(message, "The `id` is not valid");
    Ok(())
}

#[tokio::test]
async fn folder_lifecycle_end_to_end() -> Result<()> {
    let server = TestServer::start().await?;

    let created = expect_json(server.post("/api/folders", &json!({ "name": "X" })).await?, StatusCode::CREATED).await?;
    let path = format!("/api/folders/{}", created["id"].as_str().unwrap());

    let fetched = expect_json(server.get(&path).await?, StatusCode::OK).await?;
    assert_eq!(fetched, created);

    let updated = expect_json(server.put(&path, &json!({ "name": "Y" })).await?, StatusCode::OK).await?;
    assert_eq!(updated["name"], "Y");
    assert!(timestamp(&updated["updatedAt"]) > timestamp(&created["updatedAt"]));

    assert_eq!(server.delete(&path).await?.status(), StatusCode::NO_CONTENT);
    expect_error(server.get(&path).await?, StatusCode::NOT_FOUND).await?;
    Ok(())
}

#[tokio::test]
async fn deleting_a_folder_leaves_its_notes() -> Result<()> {
    let server = TestServer::start().await?;

    server.delete(&format!("/api/folders/{}", ARCHIVE_FOLDER)).await?;

    let note = expect_json(server.get(&format!("/api/notes/{}", common::FIRST_NOTE)).await?, StatusCode::OK).await?;
    assert_eq!(note["folderId"], ARCHIVE_FOLDER);
    Ok(())
}

#[tokio::test]
async fn update_of_missing_folder_is_404_even_with_a_taken_name() -> Result<()> {
    let server = TestServer::start().await?;

    for name in ["Work", "Brand new"] {
        let message = expect_error(
            server.put("/api/folders/999999999999999999999999", &json!({ "name": name })).await?,
            StatusCode::NOT_FOUND,
        )
        .await?;
        assert_eq!(message, "Not Found");
    }
    Ok(())
}

#[tokio::test]
async fn rejected_writes_leave_folders_untouched() -> Result<()> {
    let server = TestServer::start().await?;
    let path = format!("/api/folders/{}", ARCHIVE_FOLDER);
    let list_before = expect_json(server.get("/api/folders").await?, StatusCode::OK).await?;
    let before = expect_json(server.get(&path).await?, StatusCode::OK).await?;

    for body in [json!({}), json!({ "name": "Work" }), json!({ "name": "bad\u{0}name" })] {
        server.post("/api/folders", &body).await?;
        let res = server.put(&path, &body).await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "PUT {} was accepted", body);
    }

    let after = expect_json(server.get(&path).await?, StatusCode::OK).await?;
    assert_eq!(after, before);
    let list_after = expect_json(server.get("/api/folders").await?, StatusCode::OK).await?;
    assert_eq!(list_after, list_before);
    Ok(())
}

#[tokio::test]
async fn nul_characters_are_rejected() -> Result<()> {
    let server = TestServer::start().await?;

    let message = expect_error(
        server.post("/api/folders", &json!({ "name": "a\u{0}b" })).await?,
        StatusCode::BAD_REQUEST,
    )
    .await?;
    assert_eq!(message, "The `name` cannot contain NUL characters");

    let message = expect_error(server.get("/api/folders?searchTerm=%00").await?, StatusCode::BAD_REQUEST).await?;
    assert_eq!(message, "The `searchTerm` cannot contain NUL characters");
    Ok(())
}
