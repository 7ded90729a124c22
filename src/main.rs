use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tutorlink::core::{AppState, Config};
use tutorlink::monitoring::{ResourceMonitorConfig, start_resource_monitoring};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging strutturato, livello via RUST_LOG (default info)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Configurazione da variabili d'ambiente (.env incluso)
    let config = Config::from_env()?;
    config.print_info();

    // Pool SQLite; il file viene creato al primo avvio
    let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .max_lifetime(Duration::from_secs(config.connection_lifetime_secs))
        .connect_with(options)
        .await?;

    // Migrations embedded nel binario
    sqlx::migrate!().run(&pool).await?;

    let state = Arc::new(AppState::new(pool, &config));

    // Monitor di processo in background
    tokio::spawn(start_resource_monitoring(ResourceMonitorConfig::default()));

    let app = tutorlink::create_router(state).layer(CorsLayer::permissive());

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
