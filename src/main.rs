use anyhow::{Context, Result};
use restaurant_menu::{api, config::Config, state::AppState};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("restaurant_menu=info".parse()?),
        )
        .init();

    info!("Starting restaurant menu API");

    // Load configuration from environment
    let config = Config::from_env()?;

    info!("Opening database at {}", config.database_url);
    let state = AppState::from_config(config).await?;

    let languages = state.registry.list().await?;
    info!("Language registry holds {} languages", languages.len());

    let address = format!("0.0.0.0:{}", state.config.port);
    let listener = TcpListener::bind(&address)
        .await
        .context(format!("Failed to bind {}", address))?;
    info!("Server running on {}", address);

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
