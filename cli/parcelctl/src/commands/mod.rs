//! CLI commands.

mod parcels;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::client::ParcelClient;
use crate::config::Config;
use crate::output::OutputFormat;

/// parcelctl - Track parcels from the command line.
#[derive(Debug, Parser)]
#[command(name = "parcelctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Base URL of the parcel API.
    #[arg(long, global = true, env = "PARCEL_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List all parcels, newest first.
    List,

    /// Show one parcel.
    Get(parcels::GetArgs),

    /// Register a new parcel.
    Create(parcels::CreateArgs),

    /// Change some fields of a parcel.
    Update(parcels::UpdateArgs),

    /// Delete a parcel.
    Remove(parcels::RemoveArgs),

    /// Download the printable label.
    Label(parcels::LabelArgs),

    /// Show CLI version.
    Version,
}

impl Cli {
    /// Run the CLI command.
    pub async fn run(self) -> Result<()> {
        if let Commands::Version = self.command {
            println!("parcelctl {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }

        let config = Config::load()?.with_api_url(self.api_url);

        let ctx = CommandContext {
            config,
            format: self.format,
        };

        match self.command {
            Commands::List => parcels::list(ctx).await,
            Commands::Get(args) => parcels::get(ctx, args).await,
            Commands::Create(args) => parcels::create(ctx, args).await,
            Commands::Update(args) => parcels::update(ctx, args).await,
            Commands::Remove(args) => parcels::remove(ctx, args).await,
            Commands::Label(args) => parcels::label(ctx, args).await,
            Commands::Version => Ok(()),
        }
    }
}

/// Shared command context.
pub struct CommandContext {
    pub config: Config,
    pub format: OutputFormat,
}

impl CommandContext {
    /// Get an API client.
    pub fn client(&self) -> Result<ParcelClient> {
        Ok(ParcelClient::new(&self.config)?)
    }
}
