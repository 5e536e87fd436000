//! Sinks for secrets, outputs and state exposed to the invoking environment.
//!
//! [`WorkflowCommands`] speaks the CI runner protocol: secrets are masked with `::add-mask::`,
//! outputs and state are appended to the files named by `GITHUB_OUTPUT` and `GITHUB_STATE`.
//! [`MemorySink`] records everything in memory for tests and embedding.

// std
use std::{
	env,
	fs::OpenOptions,
	io::{self, Stdout, Write},
};
// self
use crate::{_prelude::*, obs::obs_event};

const OUTPUT_FILE_VAR: &str = "GITHUB_OUTPUT";
const STATE_FILE_VAR: &str = "GITHUB_STATE";
const MULTILINE_DELIMITER: &str = "__MAVEN_OAUTH_SETTINGS_EOF__";

/// Redaction-aware channel for sensitive values.
///
/// Every secret that passes through a run must be registered here before it could possibly
/// appear in any transcript.
pub trait SecretSink {
	/// Registers `secret` for redaction.
	fn register_secret(&self, secret: &str) -> Result<()>;
}

/// Channel for step outputs and state shared with the post step.
pub trait OutputSink {
	/// Publishes a step output.
	fn set_output(&self, name: &str, value: &str) -> Result<()>;

	/// Saves a value for the post step.
	fn save_state(&self, name: &str, value: &str) -> Result<()>;
}

/// Runner workflow-command implementation of [`SecretSink`] and [`OutputSink`].
#[derive(Debug)]
pub struct WorkflowCommands<W = Stdout> {
	out: Mutex<W>,
	output_file: Option<PathBuf>,
	state_file: Option<PathBuf>,
}
impl WorkflowCommands {
	/// Builds a sink writing commands to stdout and env files named by the environment.
	pub fn from_env() -> Self {
		Self::with_writer(io::stdout(), env_path(OUTPUT_FILE_VAR), env_path(STATE_FILE_VAR))
	}
}
impl<W> WorkflowCommands<W>
where
	W: Write,
{
	/// Builds a sink around an arbitrary command writer and optional env files.
	pub fn with_writer(out: W, output_file: Option<PathBuf>, state_file: Option<PathBuf>) -> Self {
		Self { out: Mutex::new(out), output_file, state_file }
	}

	/// Emits an `::error::` annotation for a fatal run failure.
	pub fn error(&self, message: &str) -> Result<()> {
		self.command("error", message)
	}

	/// Emits a `::warning::` annotation.
	pub fn warning(&self, message: &str) -> Result<()> {
		self.command("warning", message)
	}

	/// Consumes the sink and returns the command writer.
	pub fn into_writer(self) -> W {
		self.out.into_inner()
	}

	fn command(&self, name: &str, data: &str) -> Result<()> {
		let mut out = self.out.lock();

		writeln!(out, "::{name}::{}", escape_data(data))
			.and_then(|()| out.flush())
			.map_err(|e| Error::filesystem("emit workflow command to", "<stdout>", e))
	}

	fn append(&self, file: Option<&Path>, kind: &str, name: &str, value: &str) -> Result<()> {
		let Some(file) = file else {
			obs_event!(warn, kind, entry = name, "Runner file is not configured; skipping.");

			return Ok(());
		};
		let mut handle = OpenOptions::new()
			.create(true)
			.append(true)
			.open(file)
			.map_err(|e| Error::filesystem("open", file, e))?;

		handle
			.write_all(env_file_entry(name, value).as_bytes())
			.map_err(|e| Error::filesystem("append to", file, e))
	}
}
impl<W> SecretSink for WorkflowCommands<W>
where
	W: Write,
{
	fn register_secret(&self, secret: &str) -> Result<()> {
		for line in secret.lines().map(str::trim).filter(|line| !line.is_empty()) {
			self.command("add-mask", line)?;
		}

		Ok(())
	}
}
impl<W> OutputSink for WorkflowCommands<W>
where
	W: Write,
{
	fn set_output(&self, name: &str, value: &str) -> Result<()> {
		self.append(self.output_file.as_deref(), "output", name, value)
	}

	fn save_state(&self, name: &str, value: &str) -> Result<()> {
		self.append(self.state_file.as_deref(), "state", name, value)
	}
}

/// In-memory sink recording registered secrets, outputs and state.
#[derive(Debug, Default)]
pub struct MemorySink {
	secrets: Mutex<Vec<String>>,
	outputs: Mutex<Vec<(String, String)>>,
	state: Mutex<Vec<(String, String)>>,
}
impl MemorySink {
	/// Secrets registered so far.
	pub fn secrets(&self) -> Vec<String> {
		self.secrets.lock().clone()
	}

	/// Outputs published so far, in order.
	pub fn outputs(&self) -> Vec<(String, String)> {
		self.outputs.lock().clone()
	}

	/// State entries saved so far, in order.
	pub fn state(&self) -> Vec<(String, String)> {
		self.state.lock().clone()
	}

	/// Returns the last output published under `name`.
	pub fn output(&self, name: &str) -> Option<String> {
		self.outputs.lock().iter().rev().find(|(key, _)| key == name).map(|(_, v)| v.clone())
	}
}
impl SecretSink for MemorySink {
	fn register_secret(&self, secret: &str) -> Result<()> {
		self.secrets.lock().push(secret.to_owned());

		Ok(())
	}
}
impl OutputSink for MemorySink {
	fn set_output(&self, name: &str, value: &str) -> Result<()> {
		self.outputs.lock().push((name.to_owned(), value.to_owned()));

		Ok(())
	}

	fn save_state(&self, name: &str, value: &str) -> Result<()> {
		self.state.lock().push((name.to_owned(), value.to_owned()));

		Ok(())
	}
}

fn env_path(var: &str) -> Option<PathBuf> {
	env::var_os(var).filter(|value| !value.is_empty()).map(PathBuf::from)
}

fn env_file_entry(name: &str, value: &str) -> String {
	if value.contains(['\n', '\r']) {
		format!("{name}<<{MULTILINE_DELIMITER}\n{value}\n{MULTILINE_DELIMITER}\n")
	} else {
		format!("{name}={value}\n")
	}
}

fn escape_data(data: &str) -> String {
	data.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}
