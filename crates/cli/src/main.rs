//! Hardware sizing CLI
//!
//! Estimates hardware for a workload, validates explicit builds, recommends
//! catalog servers and scores revenue leak risk. Requests go to a sizing API
//! when one is configured and are evaluated in-process otherwise.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{
    catalog, estimate::EstimateArgs, leak::LeakArgs, recommend::RecommendArgs,
    validate::ValidateArgs,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Hardware sizing CLI
#[derive(Parser)]
#[command(name = "sizer")]
#[command(author, version, about = "CLI for the hardware sizing engine", long_about = None)]
pub struct Cli {
    /// Sizing API URL; evaluates locally when unset (can also be set via SIZER_API_URL)
    #[arg(long, env = "SIZER_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, value_enum, global = true)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate hardware for a workload
    Estimate(EstimateArgs),

    /// Validate an explicit server build
    Validate(ValidateArgs),

    /// Recommend catalog servers for an application
    Recommend(RecommendArgs),

    /// Score revenue leak risk from funnel metrics
    Leak(LeakArgs),

    /// List the server catalog
    Catalog,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();

    let file_config = config::Config::load()?;
    let api_url = cli.api_url.clone().or(file_config.api_url.clone());
    let format = match cli.format {
        Some(format) => format,
        None => file_config.format()?.unwrap_or_default(),
    };

    let backend = client::Backend::from_api_url(api_url.as_deref())?;

    match &cli.command {
        Commands::Estimate(args) => commands::estimate::run(&backend, args, format).await?,
        Commands::Validate(args) => commands::validate::run(&backend, args, format).await?,
        Commands::Recommend(args) => commands::recommend::run(&backend, args, format).await?,
        Commands::Leak(args) => commands::leak::run(&backend, args, format).await?,
        Commands::Catalog => catalog::run(&backend, format).await?,
    }

    Ok(())
}
