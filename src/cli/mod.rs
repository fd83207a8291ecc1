//! Command-line interface for modgraphweb.
//!
//! Provides commands for serving the render cache over HTTP, rendering a
//! single graph locally, and checking that the external tools are installed.

use std::io::{self, Read, Write};
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::{self, RenderSettings};
use crate::core::{ArtifactStore, RenderPipeline};
use crate::server::{self, AppState};

/// modgraphweb - render `go mod graph` output to SVG and serve it
#[derive(Parser, Debug)]
#[command(name = "modgraphweb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (YAML)
    #[arg(long, global = true, env = "MODGRAPHWEB_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP service
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Address to bind to
        #[arg(short, long, env = "MODGRAPHWEB_BIND", default_value = "0.0.0.0")]
        bind: IpAddr,
    },

    /// Render a graph once and write the SVG
    Render {
        /// Input file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (writes to stdout if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that the stage programs can be started
    Check,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let settings = RenderSettings::load(self.config.as_deref())?;

        match self.command {
            Commands::Serve { port, bind } => serve(settings, bind, port).await,
            Commands::Render { input, output } => render(settings, input, output).await,
            Commands::Check => check(settings).await,
        }
    }
}

async fn serve(settings: RenderSettings, bind: IpAddr, port: Option<u16>) -> Result<()> {
    let addr = config::listen_addr(bind, port);
    let store = Arc::new(ArtifactStore::new());
    let pipeline = Arc::new(RenderPipeline::from_settings(&settings, store));
    let state = AppState::new(pipeline, settings.cache_control());
    let router = server::router(state, settings.max_upload_bytes);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    server::serve(listener, router, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C; shutting down");
        return;
    }
    info!("Shutting down");
}

async fn render(
    settings: RenderSettings,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let input = read_input(input)?;
    let pipeline = RenderPipeline::from_settings(&settings, Arc::new(ArtifactStore::new()));
    let svg = pipeline.transform(&input).await?;

    match output {
        Some(path) => tokio::fs::write(&path, &svg)
            .await
            .with_context(|| format!("Failed to write output: {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&svg).context("Failed to write to stdout")?;
            stdout.flush().context("Failed to flush stdout")?;
        }
    }

    Ok(())
}

async fn check(settings: RenderSettings) -> Result<()> {
    let pipeline = RenderPipeline::from_settings(&settings, Arc::new(ArtifactStore::new()));

    let mut missing = 0;
    for stage in pipeline.stages() {
        match stage.probe().await {
            Ok(()) => println!("ok       {}", stage.name()),
            Err(e) => {
                println!("missing  {}: {:#}", stage.name(), e);
                missing += 1;
            }
        }
    }

    if missing > 0 {
        anyhow::bail!("{} stage(s) unavailable", missing);
    }
    Ok(())
}

/// Read input from a file or stdin
fn read_input(input: Option<PathBuf>) -> Result<Vec<u8>> {
    match input {
        Some(path) => std::fs::read(&path)
            .with_context(|| format!("Failed to read input file: {}", path.display())),
        None => {
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .context("Failed to read from stdin")?;
            Ok(buffer)
        }
    }
}
