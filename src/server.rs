use std::time::Duration;

use anyhow::Context;
use axum::{
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::{AppConfig, Environment, SecurityConfig};
use crate::database::Database;
use crate::handlers::{resource, system, users};
use crate::middleware::handle_timeout_error;
use crate::models::{Folder, Note, Tag};
use crate::resource::Resource;
use crate::state::AppState;

/// Full application router with its middleware stack
pub fn app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        // Public
        .route("/", get(system::root))
        .route("/health", get(system::health))
        // Collections
        .merge(resource_routes::<Note>())
        .merge(resource_routes::<Folder>())
        .merge(resource_routes::<Tag>())
        .route("/api/users", post(users::create))
        .route("/api/users/:id", get(users::get))
        .fallback(system::not_found)
        // Global middleware
        .layer(DefaultBodyLimit::max(config.server.max_request_size_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout_error))
                .timeout(Duration::from_secs(config.server.request_timeout_secs)),
        )
        .layer(cors_layer(&config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `/api/<collection>` and `/api/<collection>/:id` for one resource
fn resource_routes<R: Resource>() -> Router<AppState> {
    let collection = format!("/api/{}", R::COLLECTION);
    let member = format!("{}/:id", collection);

    Router::new()
        .route(&collection, get(resource::list::<R>).post(resource::create::<R>))
        .route(
            &member,
            get(resource::get::<R>)
                .put(resource::update::<R>)
                .delete(resource::delete::<R>),
        )
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::LOCATION])
}

/// Pick the store: PostgreSQL when a URL is configured, memory otherwise
pub async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    match &config.database.url {
        Some(_) => {
            let database = Database::connect(&config.database)
                .await
                .context("failed to connect to the database")?;
            if config.database.run_migrations {
                database.migrate().await?;
            }
            Ok(AppState::postgres(database))
        }
        None if config.environment == Environment::Production => {
            anyhow::bail!("DATABASE_URL must be set in production")
        }
        None => {
            warn!("DATABASE_URL is not set; data lives in memory and is lost on exit");
            Ok(AppState::in_memory())
        }
    }
}

/// Run the HTTP server until Ctrl-C or SIGTERM
pub async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    let state = build_state(config).await?;
    let app = app(state.clone(), config);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Noteful API listening on http://{} ({} store)", bind_addr, state.store_name());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(database) = &state.database {
        database.close().await;
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
