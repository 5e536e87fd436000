//! CI step entry point: `run` writes the Maven settings file, `cleanup` removes it afterward.

// std
use std::io;
// crates.io
use clap::Parser;
use color_eyre::Result;
use tracing_subscriber::EnvFilter;
// self
use maven_oauth_settings::{cli::Cli, runner::WorkflowCommands};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with_writer(io::stderr)
		.with_target(false)
		.init();

	Cli::parse().execute(&WorkflowCommands::from_env()).await?;

	Ok(())
}
