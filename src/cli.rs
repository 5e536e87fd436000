//! Command-line surface of the step binary.
//!
//! Inputs come from flags or from the runner's `INPUT_*` and `STATE_*` variables. `run` fails the
//! job with an `::error::` annotation; `cleanup` only ever warns.

// std
use std::io::Write;
// crates.io
use clap::{Parser, Subcommand};
// self
use crate::{
	_prelude::*,
	cleanup::CleanupOutcome,
	oauth::ReqwestTokenAcquirer,
	runner::{self, CleanupInputs, Inputs, WorkflowCommands},
};

/// Top-level arguments.
#[derive(Debug, Parser)]
#[command(name = "maven-oauth-settings", version, about)]
pub struct Cli {
	/// Step to execute.
	#[command(subcommand)]
	pub command: Command,
}
impl Cli {
	/// Executes the parsed step, reporting through `commands`.
	///
	/// Only a failed `run` returns an error; the caller turns it into a non-zero exit.
	pub async fn execute<W>(self, commands: &WorkflowCommands<W>) -> Result<()>
	where
		W: Write,
	{
		match self.command {
			Command::Run(inputs) => {
				let outcome = match ReqwestTokenAcquirer::new() {
					Ok(acquirer) => runner::run(&inputs, &acquirer, commands).await,
					Err(e) => Err(e),
				};

				if let Err(e) = &outcome {
					let _ = commands.error(&e.to_string());
				}

				outcome.map(|_| ())
			},
			Command::Cleanup(inputs) => {
				if let CleanupOutcome::Failed(reason) = runner::cleanup(&inputs) {
					let _ = commands.warning(&format!("Failed to cleanup settings file: {reason}"));
				}

				Ok(())
			},
		}
	}
}

/// Steps exposed by the binary.
#[derive(Debug, Subcommand)]
pub enum Command {
	/// Fetch a client-credentials token and write it into a Maven settings file.
	Run(Inputs),
	/// Remove the settings file written by `run`. Never fails the job.
	Cleanup(CleanupInputs),
}
