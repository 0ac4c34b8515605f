use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::config::SourceConfig;
use crate::message::{Message, RecordEmitter};
use crate::observability;
use crate::source::Source;
use crate::streams::ConnectorVariant;

#[derive(Parser)]
#[command(about = "Adaptive Insights source connector")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the connection specification
    Spec,
    /// Verify the credentials and request against the API
    Check {
        #[arg(long)]
        config: PathBuf,
    },
    /// Print the catalog with the stream and its schema
    Discover {
        #[arg(long)]
        config: PathBuf,
    },
    /// Extract records and write them to stdout
    Read {
        #[arg(long)]
        config: PathBuf,
    },
}

fn load_source(variant: ConnectorVariant, path: &Path) -> anyhow::Result<Source> {
    let config = SourceConfig::load(path)
        .with_context(|| format!("loading config from {}", path.display()))?;
    Source::from_config(variant, config).context("building source")
}

/// Entry point shared by the connector binaries.
pub async fn run(variant: ConnectorVariant) -> anyhow::Result<()> {
    observability::init_logging();
    let cli = Cli::parse();

    let stdout = io::stdout();
    let mut emitter = RecordEmitter::new(stdout.lock());

    match cli.command {
        Commands::Spec => {
            emitter.emit(&Source::spec())?;
        }
        Commands::Check { config } => {
            let source = load_source(variant, &config)?;
            emitter.emit(&source.check().await)?;
        }
        Commands::Discover { config } => {
            let source = load_source(variant, &config)?;
            emitter.emit(&source.discover())?;
        }
        Commands::Read { config } => {
            let source = load_source(variant, &config)?;
            info!("Running {}", variant.connector_name());
            if let Err(e) = source.read(&mut emitter).await {
                error!("Sync failed: {}", e);
                emitter.emit(&Message::log("ERROR", format!("Sync failed: {e}")))?;
                emitter.flush()?;
                return Err(e).context("sync failed");
            }
        }
    }

    emitter.flush()?;
    io::stderr().flush()?;
    Ok(())
}
