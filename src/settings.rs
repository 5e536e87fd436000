//! Settings document synthesis and safe placement on disk.

pub mod document;

pub use document::*;

// std
use std::{
	fs::{self, OpenOptions},
	io::Write,
};
// self
use crate::{
	_prelude::*,
	auth::Credential,
	obs::{Step, StepScope, obs_event},
};

/// Writes a single-server settings document embedding a bearer token.
///
/// The parent directory is created on demand. The document is written to a sibling temp file,
/// synced, then renamed over the target, so a concurrent reader sees either the previous file or
/// the complete new one. An existing file at the target is replaced.
#[derive(Clone, Copy, Debug, Default)]
pub struct SettingsSynthesizer;
impl SettingsSynthesizer {
	/// Creates a synthesizer.
	pub fn new() -> Self {
		Self
	}

	/// Renders the settings document for `server_id` and persists it at `target`.
	///
	/// Returns `target` unchanged on success.
	pub fn write(
		&self,
		token: &Credential,
		server_id: &str,
		target: impl Into<PathBuf>,
	) -> Result<PathBuf> {
		self.write_document(&SettingsDocument::new(server_id, token.clone()), target)
	}

	/// Persists an already-built document at `target`.
	pub fn write_document(
		&self,
		document: &SettingsDocument,
		target: impl Into<PathBuf>,
	) -> Result<PathBuf> {
		let target = target.into();

		StepScope::open(Step::SettingsWrite, "write").run(|| {
			// Rendering validates the document, so nothing touches the filesystem before it passes.
			let rendered = document.render()?;

			ensure_parent_exists(&target)?;
			persist(&target, rendered.as_bytes())?;

			obs_event!(
				info,
				path = %target.display(),
				server_id = document.server_id(),
				"Wrote Maven settings file."
			);

			Ok(target)
		})
	}
}

fn ensure_parent_exists(path: &Path) -> Result<()> {
	let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
		return Ok(());
	};

	if parent.is_dir() {
		return Ok(());
	}

	fs::create_dir_all(parent).map_err(|e| Error::filesystem("create directory", parent, e))?;

	obs_event!(debug, path = %parent.display(), "Created settings directory.");

	Ok(())
}

fn persist(path: &Path, contents: &[u8]) -> Result<()> {
	let tmp_path = temp_sibling(path);
	let written = write_synced(&tmp_path, contents).and_then(|()| {
		fs::rename(&tmp_path, path).map_err(|e| Error::filesystem("replace", path, e))
	});

	if written.is_err() {
		let _ = fs::remove_file(&tmp_path);
	}

	written
}

fn write_synced(path: &Path, contents: &[u8]) -> Result<()> {
	let mut options = OpenOptions::new();

	options.write(true).create(true).truncate(true);

	#[cfg(unix)]
	{
		use std::os::unix::fs::OpenOptionsExt;

		options.mode(0o600);
	}

	let mut file = options.open(path).map_err(|e| Error::filesystem("create", path, e))?;

	file.write_all(contents).map_err(|e| Error::filesystem("write", path, e))?;
	file.sync_all().map_err(|e| Error::filesystem("sync", path, e))
}

fn temp_sibling(path: &Path) -> PathBuf {
	let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_else(|| "settings.xml".into());

	name.push(".tmp");

	path.with_file_name(name)
}
