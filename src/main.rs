//! WHOOP token refresh relay entry point.

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use whoop_refresh::api::{create_router, AppState};
use whoop_refresh::config::{mask_secret, Config};
use whoop_refresh::metrics;
use whoop_refresh::refresh::RefreshWorkflow;
use whoop_refresh::store::{TOKEN_TABLE, USER_ID};
use whoop_refresh::utils::shutdown_signal;

/// WHOOP OAuth token refresh relay.
#[derive(Parser, Debug)]
#[command(name = "whoop-refresh")]
#[command(about = "Refreshes the stored WHOOP OAuth token pair on demand")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Run a single refresh and exit.
    Refresh,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("whoop_refresh=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    metrics::init_metrics();

    match args.command {
        Some(Command::Serve { port }) => cmd_serve(port.or(args.port)).await,
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::Refresh) => cmd_refresh().await,
        None => cmd_serve(args.port).await,
    }
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("WHOOP REFRESH - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(problems) => {
            println!("FAILED");
            for problem in &problems {
                println!("  Error: {}", problem);
            }
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Store URL: {}", config.store_base_url());
    println!("  Store Key: {}", mask_secret(&config.supabase_key));
    println!("  Table: {} (user_id = {})", TOKEN_TABLE, USER_ID);
    println!("  Token URL: {}", config.whoop_token_url);
    println!("  Client ID: {}", config.whoop_client_id);
    println!("  Client Secret: {}", mask_secret(&config.whoop_client_secret));
    println!("  HTTP Timeout: {}ms", config.http_timeout_ms);
    println!("  Port: {}", config.port);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Run a single refresh from the command line.
async fn cmd_refresh() -> anyhow::Result<()> {
    let config = Config::load()?;
    if let Err(problems) = config.validate() {
        return Err(anyhow::anyhow!(
            "Invalid configuration: {}",
            problems.join("; ")
        ));
    }

    let workflow = RefreshWorkflow::from_config(&config)?;
    let outcome = workflow.run().await?;

    println!("Tokens refreshed successfully, expires at {}", outcome.expires_at);
    Ok(())
}

/// Run the HTTP server.
async fn cmd_serve(port_override: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    // The health route must stay up even when refresh settings are incomplete.
    if let Err(problems) = config.validate() {
        for problem in &problems {
            warn!("Configuration problem: {}", problem);
        }
        warn!("Refresh requests will fail until configuration is fixed");
    }

    let port = port_override.unwrap_or(config.port);
    let state = AppState::new(RefreshWorkflow::from_config(&config)?);
    let router = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("Server running on port {}", port);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
