//! # portal-api
//!
//! A template-driven client for envelope-style JSON portal APIs.
//!
//! The client logs in once, renders JSON request bodies from mustache-style
//! template files, walks paginated searches, performs insert/update calls,
//! and keeps an append-only error log of everything that went wrong.
//!
//! ## Security
//!
//! - Session tokens and login values are redacted in Debug output
//! - Request dumps in the error log redact the `x-auth` header and login bodies
//! - Tracing skips credential parameters
//!
//! ## Crates
//!
//! - **portal-api-client** - Transport, configuration, envelope decoding, error taxonomy
//! - **portal-api-auth** - Login credentials and session-token acquisition
//! - **portal-api-records** - Templates, paginated search, insert/update, company endpoints
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use portal_api::{logging, ClientConfig, LoginCredentials, PortalClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     logging::init(&logging::LogConfig::default())?;
//!
//!     let credentials = LoginCredentials::from_env()?;
//!     let client = PortalClient::connect(&credentials, ClientConfig::from_env()?).await?;
//!
//!     for company in client.list_companies().await? {
//!         println!("{}", company["Name"]);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod logging;

// Re-export all crates for convenient access
pub use portal_api_auth as auth;
pub use portal_api_client as client;
pub use portal_api_records as records;

pub use portal_api_auth::LoginCredentials;
pub use portal_api_client::{ClientConfig, Error, ErrorKind, FileId, Result, ERROR_LOG_TARGET};
pub use portal_api_records::PortalClient;
