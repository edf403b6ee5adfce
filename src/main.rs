mod config;
mod identity;
mod page;
mod poll;
mod routes;
mod session;
mod state;
mod watch;
mod ws;

use std::net::SocketAddr;
use std::path::PathBuf;

use tokio::net::TcpListener;

use config::{generate_config_template, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load config with layered precedence: defaults < TOML < env < CLI
    let config = Config::load()?;

    // Handle --generate-config: print template and exit
    if config.generate_config {
        print!("{}", generate_config_template());
        return Ok(());
    }

    // Initialize tracing/logging
    if config.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "vibecheck_server=info".parse().unwrap()),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "vibecheck_server=info".parse().unwrap()),
            )
            .init();
    }

    tracing::info!(
        "Vibecheck server v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let policy = config.vote_policy()?;
    tracing::info!(policy = %config.policy, "Vote policy selected");

    let page_path = PathBuf::from(&config.page);
    if !page_path.is_file() {
        tracing::warn!(
            page = %page_path.display(),
            "Page file not found; / will return 404 until it appears"
        );
    }

    // Build application state
    let app_state = state::AppState::new(policy, page_path);

    // Start the file watcher; it feeds reload signals into the hub.
    // Keep the handle alive for the lifetime of the server.
    let _watcher = watch::spawn(&app_state.page_path, app_state.hub.clone())?;

    // Build router
    let app = routes::build_router(app_state);

    // Bind and serve
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("==========================================================");
    tracing::info!("  Server running at http://{}:{}/", config.bind_address, config.port);
    tracing::info!("  Local access:      http://localhost:{}/", config.port);
    tracing::info!("  Open the page on any device on this network to join");
    tracing::info!("  the vibe check. Edits to the page reload all clients.");
    tracing::info!("==========================================================");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
