use noteful_api::{config, logging, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, PORT, etc.
    let _ = dotenvy::dotenv();

    logging::init_tracing();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting Noteful API in {:?} mode", config.environment);

    server::serve(config).await
}
