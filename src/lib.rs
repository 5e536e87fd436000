//! Fetch an OAuth 2.0 client-credentials token and materialize it as a Maven `settings.xml`
//! bearer header, so CI builds can reach private artifact repositories without committing
//! secrets.
//!
//! The crate is split along the two operations that carry real contracts:
//!
//! - [`oauth::TokenAcquirer`] performs the single-shot token exchange and classifies every failure
//!   into [`error::Error`].
//! - [`settings::SettingsSynthesizer`] renders the settings document and places it on disk
//!   atomically.
//!
//! [`runner`] wires both together for the CI step surface, and [`cleanup`] removes the generated
//! file once the job is done. With the `cli` feature, `cli` exposes the same steps as the
//! `maven-oauth-settings` binary.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cleanup;
#[cfg(feature = "cli")] pub mod cli;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod runner;
pub mod settings;

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		path::{Path, PathBuf},
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(feature = "cli")] use {color_eyre as _, tokio as _, tracing_subscriber as _};
#[cfg(test)] use {httpmock as _, tempfile as _, tokio as _, tracing_subscriber as _};
