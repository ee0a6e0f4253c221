//! Client configuration.

use std::time::Duration;

use crate::error::{Error, ErrorKind, Result};

/// Default base address when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost/";

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base address every relative call path is joined onto.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// User-Agent header value.
    pub user_agent: String,
    /// Whether to enable request/response tracing.
    pub enable_tracing: bool,
    /// Log the elapsed time of every request.
    pub debug: bool,
    /// Persist cookies across calls on one client.
    pub cookie_store: bool,
    /// Upper bound on pages fetched by one paginated call.
    pub max_pages: Option<u32>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: crate::USER_AGENT.to_string(),
            enable_tracing: true,
            debug: false,
            cookie_store: true,
            max_pages: None,
        }
    }
}

impl ClientConfig {
    /// Create a new client config builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Load configuration from environment variables.
    ///
    /// - `PORTAL_API_URL` (default: `http://localhost/`)
    /// - `PORTAL_DEBUG` (`1`/`true` enables request timing)
    /// - `PORTAL_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();

        if let Ok(url) = std::env::var("PORTAL_API_URL") {
            builder = builder.with_base_url(url);
        }

        if let Ok(flag) = std::env::var("PORTAL_DEBUG") {
            builder = builder.with_debug(matches!(flag.as_str(), "1" | "true" | "TRUE" | "yes"));
        }

        if let Ok(secs) = std::env::var("PORTAL_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                Error::new(ErrorKind::Config(format!(
                    "PORTAL_TIMEOUT_SECS must be a whole number of seconds, got '{secs}'"
                )))
            })?;
            builder = builder.with_timeout(Duration::from_secs(secs));
        }

        Ok(builder.build())
    }
}

/// Builder for ClientConfig.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the base address.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set custom User-Agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Enable or disable request/response tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.config.enable_tracing = enabled;
        self
    }

    /// Enable or disable per-request timing.
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.config.debug = enabled;
        self
    }

    /// Enable or disable the cookie jar.
    pub fn with_cookie_store(mut self, enabled: bool) -> Self {
        self.config.cookie_store = enabled;
        self
    }

    /// Bound the number of pages one paginated call may request.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.config.max_pages = Some(max_pages);
        self
    }

    /// Build the client configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
