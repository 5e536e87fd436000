//! Credential material and the client-credentials request model.

pub mod request;
pub mod secret;

pub use request::*;
pub use secret::*;
