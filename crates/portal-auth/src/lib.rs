//! # portal-auth
//!
//! Session authentication for portal APIs.
//!
//! The portal issues one session token per login: the client posts an
//! opaque JSON login object to `Authenticate/Token` and reads the token
//! from `ResultData.Token`. Tokens are never refreshed.
//!
//! ## Security
//!
//! - Credential values and tokens are redacted in Debug output
//! - Tracing skips credential parameters
//! - Error messages never carry credential values
//!
//! ## Example
//!
//! ```rust,ignore
//! use portal_api_auth::{authenticate, LoginCredentials};
//! use portal_api_client::PortalHttpClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), portal_api_auth::Error> {
//!     let http = PortalHttpClient::default_client()?;
//!     let creds = LoginCredentials::from_env()?;
//!     let token = authenticate(&http, &creds).await?;
//!     Ok(())
//! }
//! ```

mod credentials;
mod error;
mod token;

pub use credentials::{LoginCredentials, LOGIN_ENV, LOGIN_FILE_ENV};
pub use error::{Error, ErrorKind, Result};
pub use token::{authenticate, SessionToken, TOKEN_PATH};
