//! # portal-records
//!
//! Template-driven calls against an envelope-style portal API.
//!
//! ## Features
//!
//! - **Session** - One authentication at construction, token sent as `x-auth`
//! - **Templates** - JSON request bodies rendered from mustache-style files
//! - **Paginated search** - Pages fetched until one comes back short
//! - **Insert/update** - One call, chosen by the presence of an identifier
//!
//! ## Example
//!
//! ```rust,ignore
//! use portal_api_records::{ClientConfig, LoginCredentials, PortalClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), portal_api_records::Error> {
//!     let credentials = LoginCredentials::new(serde_json::json!({
//!         "login": "ops",
//!         "password": "secret",
//!     }))?;
//!     let client = PortalClient::connect(&credentials, ClientConfig::from_env()?).await?;
//!
//!     // Search, 50 rows per page
//!     let companies = client.list_companies().await?;
//!
//!     // Insert, then update the same company
//!     let id = client
//!         .upsert_company(&serde_json::json!({"name": "Acme"}), None)
//!         .await?;
//!     client
//!         .upsert_company(&serde_json::json!({"name": "Acme Ltd"}), Some(id.as_str()))
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
pub mod template;

pub use client::{
    PortalClient, UpsertOperation, COMPANIES_SEARCH_PATH, COMPANY_PATH, DEFAULT_PAGE_SIZE,
    DEFAULT_TEMPLATE_DIR, OPERATION_MARKER,
};
pub use error::{Error, ErrorKind, Result};
pub use template::{MustacheRenderer, SnippetPolicy, TemplateContext, TemplateRenderer};

pub use portal_api_auth::{LoginCredentials, SessionToken};
pub use portal_api_client::{ClientConfig, FileId, RequestMethod};
