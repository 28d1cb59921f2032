use anyhow::Context;
use clap::Parser;
use ncs_api::{AppConfig, create_app};
use std::path::PathBuf;

/// Command line arguments for the gridpass-ncs server
#[derive(Parser, Debug)]
#[command(name = "gridpass-ncs")]
#[command(about = "GridPass Charging Negotiation Service")]
struct Args {
    /// Path to the service configuration JSON file
    #[arg(short, long)]
    config: PathBuf,

    /// Port to bind the server to
    #[arg(short, long, default_value = "3000")]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt().pretty().init();

    // Load service configuration from JSON file
    let config_content = tokio::fs::read_to_string(&args.config)
        .await
        .with_context(|| format!("Failed to read config file '{}'", args.config.display()))?;

    let config: AppConfig = serde_json::from_str(&config_content)
        .with_context(|| format!("Failed to parse config file '{}'", args.config.display()))?;

    tracing::info!(
        "Loaded {} stations from {}; selector: {}",
        config.stations.len(),
        args.config.display(),
        if config.oracle.is_some() {
            "oracle"
        } else {
            "baseline"
        }
    );

    // Create application state and wire the configured selector
    let state = config
        .into_state()
        .context("Failed to initialize the decision oracle client")?;

    // Build our application with routes
    let app = create_app(state);

    // Run our app with hyper
    let bind_addr = format!("0.0.0.0:{}", args.port);
    tracing::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {bind_addr}"))?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
