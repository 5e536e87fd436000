//! Fetches a client-credentials token from a mock endpoint and writes it into a throwaway Maven
//! settings file, then cleans it up the way the post step does.

// std
use std::fs;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use maven_oauth_settings::{
	auth::TokenRequest,
	cleanup::{self, CleanupOutcome},
	oauth::ReqwestTokenAcquirer,
	settings::SettingsSynthesizer,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.header("content-type", "application/x-www-form-urlencoded")
				.body_includes("grant_type=client_credentials");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":900}",
			);
		})
		.await;
	let acquirer = ReqwestTokenAcquirer::new()?;
	let request = TokenRequest::new(server.url("/token"), "demo-client", "demo-secret")
		.with_scope("packages:read");
	let token = acquirer.fetch(&request).await?;
	let scratch = tempfile::tempdir()?;
	let path = SettingsSynthesizer::new().write(
		&token,
		"demo-repository",
		scratch.path().join(".m2").join("settings.xml"),
	)?;

	println!("Wrote {}:\n{}", path.display(), fs::read_to_string(&path)?);

	token_mock.assert_async().await;

	match cleanup::remove_settings_file(&path) {
		CleanupOutcome::Removed => println!("Removed {}.", path.display()),
		other => println!("Cleanup finished with {other:?}."),
	}

	Ok(())
}
