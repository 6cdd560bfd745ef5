use clap::Parser;
use tracing::info;

use leave_ledger::api::{AppState, create_router};
use leave_ledger::config::ConfigLoader;

/// Leave ledger HTTP server.
#[derive(Parser, Debug)]
#[command(name = "leave-ledger", about = "Leave ledger HTTP server")]
struct Cli {
    /// Directory holding server.yaml and seed.yaml.
    #[arg(short = 'c', long = "config", default_value = "./config/demo")]
    config: String,

    /// Bind address (overrides server.yaml).
    #[arg(long = "bind")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let loader = ConfigLoader::load(&cli.config)?;

    // RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| loader.server().log_level.as_str().into()),
        )
        .init();

    info!("Loaded configuration from {}", cli.config);
    let state = AppState::from_config(&loader)?;
    let app = create_router(state);

    let bind = cli
        .bind
        .unwrap_or_else(|| loader.server().bind_address.clone());
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("Leave ledger listening on {}", bind);
    axum::serve(listener, app).await?;

    Ok(())
}
