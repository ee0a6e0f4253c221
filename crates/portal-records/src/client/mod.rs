//! Authenticated portal client.
//!
//! This client wraps `PortalHttpClient` from `portal-client`, holds the
//! session token obtained at construction, and renders request bodies from
//! template files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use portal_api_auth::{authenticate, LoginCredentials, SessionToken};
use portal_api_client::{
    ApiFailure, ClientConfig, PortalHttpClient, RequestBuilder, RequestMethod, ERROR_LOG_TARGET,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{Error, ErrorKind, Result};
use crate::template::{MustacheRenderer, TemplateRenderer};

mod companies;
mod search;
mod upsert;

pub use companies::{COMPANIES_SEARCH_PATH, COMPANY_PATH};
pub use search::DEFAULT_PAGE_SIZE;
pub use upsert::{UpsertOperation, OPERATION_MARKER};

/// Directory holding the bundled request templates.
pub const DEFAULT_TEMPLATE_DIR: &str = "./data/json";

/// Portal API client.
///
/// Authenticates exactly once, in [`connect`](Self::connect). If that
/// fails the client is still built, holds no token, and every later call
/// fails with an `Authentication` error.
///
/// # Example
///
/// ```rust,ignore
/// use portal_api_records::PortalClient;
///
/// let client = PortalClient::connect(&credentials, ClientConfig::from_env()?).await?;
///
/// let companies = client.list_companies().await?;
/// let id = client.upsert_company(&json!({"Name": "Acme"}), None).await?;
/// client.upsert_company(&json!({"Name": "Acme Ltd"}), Some(id.as_str())).await?;
/// ```
#[derive(Clone)]
pub struct PortalClient {
    http: PortalHttpClient,
    token: Option<SessionToken>,
    renderer: Arc<dyn TemplateRenderer>,
    template_dir: PathBuf,
}

impl std::fmt::Debug for PortalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalClient")
            .field("http", &self.http)
            .field("token", &self.token)
            .field("template_dir", &self.template_dir)
            .finish_non_exhaustive()
    }
}

impl PortalClient {
    /// Build the transport and obtain a session token.
    ///
    /// Authentication failures are written to the error log and leave the
    /// client without a token; only transport construction errors are
    /// returned.
    pub async fn connect(credentials: &LoginCredentials, config: ClientConfig) -> Result<Self> {
        Self::connect_with_renderer(credentials, config, Arc::new(MustacheRenderer)).await
    }

    /// Like [`connect`](Self::connect), with a custom template renderer.
    #[instrument(skip_all, fields(base_url = %config.base_url))]
    pub async fn connect_with_renderer(
        credentials: &LoginCredentials,
        config: ClientConfig,
        renderer: Arc<dyn TemplateRenderer>,
    ) -> Result<Self> {
        let http = PortalHttpClient::new(config)?;

        let token = match authenticate(&http, credentials).await {
            Ok(token) => {
                info!("Authenticated");
                Some(token)
            }
            Err(e) => {
                debug!(target: ERROR_LOG_TARGET, "AUTH: {}", e);
                warn!(error = %e, "Authentication failed");
                None
            }
        };

        Ok(Self {
            http,
            token,
            renderer,
            template_dir: PathBuf::from(DEFAULT_TEMPLATE_DIR),
        })
    }

    /// Build a client around an existing transport and token.
    pub fn from_session(http: PortalHttpClient, token: Option<SessionToken>) -> Self {
        Self {
            http,
            token,
            renderer: Arc::new(MustacheRenderer),
            template_dir: PathBuf::from(DEFAULT_TEMPLATE_DIR),
        }
    }

    /// Set the directory the domain endpoints load templates from.
    pub fn with_template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_dir = dir.into();
        self
    }

    /// Replace the template renderer.
    pub fn with_renderer(mut self, renderer: Arc<dyn TemplateRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Returns true if a session token was obtained.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// The session token, if any.
    pub fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    /// The directory the domain endpoints load templates from.
    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    /// Get the underlying transport.
    pub fn inner(&self) -> &PortalHttpClient {
        &self.http
    }

    pub(crate) fn template_path(&self, file: &str) -> PathBuf {
        self.template_dir.join(file)
    }

    pub(crate) fn renderer(&self) -> &dyn TemplateRenderer {
        self.renderer.as_ref()
    }

    /// A request carrying the session token and the JSON content type.
    pub(crate) fn authorized(&self, method: RequestMethod, path: &str) -> Result<RequestBuilder> {
        let Some(token) = &self.token else {
            debug!(target: ERROR_LOG_TARGET, "AUTH: no session token, {} {} not sent", method, path);
            return Err(Error::new(ErrorKind::Authentication(
                "no session token; authentication failed when the client was built".to_string(),
            )));
        };

        Ok(self
            .http
            .request(method, path)
            .auth_token(token.as_str())
            .header("Content-Type", "application/json"))
    }
}

fn log_api_failure(failure: &ApiFailure) {
    debug!(target: ERROR_LOG_TARGET, "API: {}", failure);
}
