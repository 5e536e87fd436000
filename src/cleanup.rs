//! Best-effort removal of the generated settings file.

// std
use std::{fs, io::ErrorKind};
// self
use crate::{
	_prelude::*,
	obs::{Step, StepOutcome, StepScope, obs_event},
};

/// Result of a cleanup attempt. Failures are reported, never raised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CleanupOutcome {
	/// The file existed and was removed.
	Removed,
	/// Nothing existed at the path.
	Absent,
	/// No path was recorded, so nothing was attempted.
	Skipped,
	/// Removal failed; the reason was logged as a warning.
	Failed(String),
}

/// Removes `path` if it exists, downgrading any failure to a warning.
pub fn remove_settings_file(path: &Path) -> CleanupOutcome {
	StepScope::open(Step::Cleanup, "remove").observe(
		|| remove(path),
		|outcome| match outcome {
			CleanupOutcome::Failed(_) => StepOutcome::Failure,
			_ => StepOutcome::Success,
		},
	)
}

fn remove(path: &Path) -> CleanupOutcome {
	if !path.exists() {
		return CleanupOutcome::Absent;
	}

	obs_event!(info, path = %path.display(), "Cleaning up settings file.");

	match fs::remove_file(path) {
		Ok(()) => {
			obs_event!(info, "Settings file cleaned up successfully.");

			CleanupOutcome::Removed
		},
		// Raced with another remover.
		Err(e) if e.kind() == ErrorKind::NotFound => CleanupOutcome::Absent,
		Err(e) => {
			obs_event!(warn, error = %e, "Failed to cleanup settings file.");

			CleanupOutcome::Failed(e.to_string())
		},
	}
}
