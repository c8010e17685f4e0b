//! Task runner API server.
//!
//! Thin HTTP collaborator around the synchronous core: `POST /run` drives the
//! synthesize–execute–repair loop, `GET /read` serves confined reads from the
//! data directory.

mod routes;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use taskforge::io::config::load_config;

use crate::state::AppState;

#[derive(Parser)]
#[command(name = "taskforge-api")]
#[command(about = "HTTP interface for the generative task runner")]
struct Args {
    /// Address to bind the server to
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Port to listen on
    #[arg(long, default_value = "7000")]
    port: u16,

    /// Path to the configuration file
    #[arg(long, default_value = "taskforge.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("taskforge_api=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args.config)?;
    info!(model = %config.model, data_root = %config.data_root.display(), "starting taskforge-api");

    let state = AppState::from_config(config)?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::api_router().layer(cors).with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
