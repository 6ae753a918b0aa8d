//! # dynform-client
//!
//! Session bootstrap against the form service: register the user with
//! `POST /create-user`, then fetch their form with `GET /get-form`.
//!
//! ```rust,ignore
//! use dynform::Credentials;
//! use dynform_client::{BootstrapClient, ClientConfig};
//!
//! let client = BootstrapClient::new(ClientConfig::default())?;
//! let schema = client.bootstrap(&Credentials::new("21CS001", "Ada")).await?;
//! ```

mod bootstrap;
mod error;

pub use bootstrap::{BootstrapClient, ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::BootstrapError;
