#![allow(dead_code)]

use anyhow::{Context, Result};
use reqwest::{Response, StatusCode};
use serde_json::Value;
use tokio::task::JoinHandle;

use noteful_api::config::AppConfig;
use noteful_api::database::SeedData;
use noteful_api::server;
use noteful_api::state::AppState;

// Fixed ids from seed/*.json
pub const ARCHIVE_FOLDER: &str = "111111111111111111111100";
pub const DRAFTS_FOLDER: &str = "111111111111111111111101";
pub const BREED_TAG: &str = "222222222222222222222200";
pub const HYBRID_TAG: &str = "222222222222222222222201";
pub const FIRST_NOTE: &str = "000000000000000000000000";

/// The router served on a free local port, torn down on drop.
///
/// Each test gets its own server and its own in-memory store, so tests can
/// run in parallel without sharing state.
pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    pub client: reqwest::Client,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// In-memory store loaded with the bundled seed set
    pub async fn start() -> Result<Self> {
        let state = AppState::in_memory();
        SeedData::bundled()?.load(&state).await?;
        Self::with_state(state, AppConfig::development()).await
    }

    pub async fn with_state(state: AppState, config: AppConfig) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;

        let app = server::app(state.clone(), &config);
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
            client: reqwest::Client::new(),
            handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Response> {
        Ok(self.client.post(self.url(path)).json(body).send().await?)
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Response> {
        Ok(self.client.put(self.url(path)).json(body).send().await?)
    }

    pub async fn delete(&self, path: &str) -> Result<Response> {
        Ok(self.client.delete(self.url(path)).send().await?)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Assert the status and return the JSON body
pub async fn expect_json(res: Response, status: StatusCode) -> Result<Value> {
    let actual = res.status();
    let body = res.text().await?;
    assert_eq!(actual, status, "unexpected status, body: {}", body);
    serde_json::from_str(&body).with_context(|| format!("body is not JSON: {}", body))
}

/// Assert an error response and return its message
pub async fn expect_error(res: Response, status: StatusCode) -> Result<String> {
    let body = expect_json(res, status).await?;
    assert_eq!(body["error"], true, "not an error body: {}", body);
    Ok(body["message"].as_str().unwrap_or_default().to_string())
}

pub fn sorted_keys(value: &Value) -> Vec<String> {
    let mut keys: Vec<String> = value
        .as_object()
        .map(|obj| obj.keys().cloned().collect())
        .unwrap_or_default();
    keys.sort();
    keys
}
