//! Portfolio gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────┐
//!                 │                  GATEWAY                     │
//!   Client        │  ┌────────┐   ┌──────────┐   ┌────────────┐  │
//!   ──────────────┼─▶│ layers │──▶│ routing  │──▶│  handler   │──┼──▶ admin/          (upstream)
//!                 │  │ req-id │   │  table   │   │   group    │──┼──▶ api/analytics/  (upstream)
//!                 │  │ trace  │   │ strip    │   │ local|http │──┼──▶ api/ai/         (upstream)
//!                 │  └────────┘   └──────────┘   └────────────┘  │
//!                 │        no match → 404 / append-slash 301     │
//!                 └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use portfolio_gateway::config::{load_config, GatewayConfig};
use portfolio_gateway::lifecycle::{signals, Shutdown};
use portfolio_gateway::observability::{logging, metrics};
use portfolio_gateway::routing::inspect::{resolution, route_listing, route_table};
use portfolio_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "portfolio-gateway", version)]
#[command(about = "URL gateway delegating prefixes to handler groups", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "GATEWAY_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve HTTP (default)
    Serve {
        /// Override listener.bind_address
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// List routes in match order
    Routes,
    /// Show which handler group a path reaches
    Resolve { path: String },
    /// Load and validate the configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    match cli.command.unwrap_or(Commands::Serve { bind: None }) {
        Commands::Serve { bind } => {
            serve(config, bind).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Routes => {
            for line in route_listing(&config)? {
                println!("{line}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Resolve { path } => match resolution(&route_table(&config)?, &path) {
            Some(line) => {
                println!("{line}");
                Ok(ExitCode::SUCCESS)
            }
            None => {
                println!("no route");
                Ok(ExitCode::FAILURE)
            }
        },
        Commands::Check => {
            println!(
                "configuration ok: {} routes, {} groups",
                config.effective_routes().len(),
                config.groups.len()
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn serve(
    mut config: GatewayConfig,
    bind: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(bind) = bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);
    tracing::info!("portfolio-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        append_slash = config.routing.append_slash,
        cors = config.cors.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let server = HttpServer::new(config.clone())?;
    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    tokio::spawn(signals::listen(shutdown.clone()));

    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
