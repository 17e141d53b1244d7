use clap::Parser;
use tracing::info;

use transjson::{Orchestrator, TranslatorConfig};
use transjson_web::{AppState, app};

#[derive(Parser, Debug)]
#[command(name = "transjson-web", version, about = "HTTP endpoint for multi-language JSON translation")]
struct Args {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, short, env = "PORT", default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse()?),
        )
        .init();

    let args = Args::parse();

    let config = TranslatorConfig::from_env()
        .map_err(|e| format!("Failed to load configuration: {}", e))?;
    let orchestrator = Orchestrator::from_config(config)
        .map_err(|e| format!("Failed to initialize translators: {}", e))?;
    let state = AppState::new(orchestrator);

    info!(
        "Starting transjson-web with backends {:?}",
        state.orchestrator.available_modules()
    );

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
}
