use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};
use server::config::Config;
use server::http::{app, AppState};
use server::registry::GameRegistry;
use server::session::SessionKeys;
use tokio::net::TcpListener;

/// Main-method of the application.
/// Parses configuration, builds the game registry and serves the HTTP API until Ctrl+C.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    let settings = match config.game_settings() {
        Ok(settings) => settings,
        Err(reason) => {
            error!("Invalid configuration: {}", reason);
            return Err(reason.into());
        }
    };

    let sessions = match &config.session_secret {
        Some(secret) => SessionKeys::new(secret.as_bytes()),
        None => {
            warn!("No session secret configured, sessions will not survive a restart");
            SessionKeys::random()
        }
    };

    info!(
        "Starting game with admin '{}' and {} words",
        settings.admin_username,
        settings.words.len()
    );
    let state = AppState::new(GameRegistry::new(settings)?, sessions);

    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Server listening on {}", address);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down gracefully..."),
        Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
    }
}
