use anyhow::anyhow;
use tokio::net::TcpListener;

use parksense::{AppState, ServerConfig, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = ServerConfig::from_env().map_err(|e| anyhow!(e.to_string()))?;
    let address = config.address();

    // Create application state (providers are built once and shared)
    let app_state = AppState::new(config)?;

    let app = routes::api::create_api_router(
        app_state.config.max_audio_bytes,
        &app_state.config.allowed_origins,
    )
    .with_state(app_state);

    // Create listener
    let listener = TcpListener::bind(&address).await?;

    tracing::info!("parksense listening on {address}");

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}
