//! Loyalty bot entry point
//!
//! Run with:
//! ```bash
//! cargo run -p loyalty-gateway --bin loyalty-bot
//! ```
//!
//! Configuration is loaded from environment variables and an optional `.env`.

use loyalty_common::{try_init_tracing_with_config, BotConfig, Environment, TracingConfig};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let environment = std::env::var("APP_ENV")
        .ok()
        .and_then(|value| value.parse::<Environment>().ok())
        .unwrap_or_default();
    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(environment)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(code) = run().await {
        std::process::exit(code);
    }
}

async fn run() -> Result<(), i32> {
    info!("Starting loyalty bot...");

    let config = BotConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        1
    })?;

    info!(
        env = ?config.app.env,
        gateway_url = %config.discord.gateway_url,
        "Configuration loaded"
    );

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    loyalty_gateway::run(config, shutdown).await.map_err(|e| {
        error!(error = %e, code = e.error_code(), "Bot stopped with an error");
        e.exit_code()
    })
}

/// Cancel `shutdown` on Ctrl-C or SIGTERM
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
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
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    info!("Shutdown signal received");
    shutdown.cancel();
}
