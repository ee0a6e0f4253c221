//! Error types for portal-client.
//!
//! Every failure a portal call can hit lands in one [`ErrorKind`]: template
//! problems, API-reported failures from the response envelope, and
//! transport-level failures. Callers match on the kind to decide whether a
//! condition is recoverable.

/// Result type alias for portal-client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for portal-client operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Returns true if the request never produced a usable HTTP exchange,
    /// or the server answered with a non-success status.
    pub fn is_transport(&self) -> bool {
        self.kind.is_transport()
    }

    /// Returns true if the response envelope reported `Success=false`.
    pub fn is_api_reported(&self) -> bool {
        matches!(self.kind, ErrorKind::ApiReported { .. })
    }

    /// Returns true if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Authentication(_))
    }

    /// Returns true if the request body could not be produced from its template.
    pub fn is_template_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::TemplateMissing { .. } | ErrorKind::MalformedBody { .. }
        )
    }

    /// The API error number and message, if the envelope reported a failure.
    pub fn api_failure(&self) -> Option<(&str, &str)> {
        match &self.kind {
            ErrorKind::ApiReported {
                error_number,
                error_message,
            } => Some((error_number.as_str(), error_message.as_str())),
            _ => None,
        }
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// No session token, or the authentication call was rejected.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The request template file does not exist.
    #[error("Template not found: {path}")]
    TemplateMissing { path: String },

    /// The rendered request body is not valid JSON.
    #[error("Rendered body is not valid JSON: {snippet}")]
    MalformedBody { snippet: String },

    /// The response envelope reported `Success=false`.
    #[error("API error: {error_number} : {error_message}")]
    ApiReported {
        error_number: String,
        error_message: String,
    },

    /// The server answered with a non-success HTTP status.
    #[error("HTTP error: {status} {message}")]
    Http { status: u16, message: String },

    /// Request timeout.
    #[error("Request timeout")]
    Timeout,

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The response body is not a decodable envelope.
    #[error("JSON error: {0}")]
    Json(String),

    /// Invalid input provided by the caller.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl ErrorKind {
    /// Returns true for transport-level kinds.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ErrorKind::Http { .. } | ErrorKind::Timeout | ErrorKind::Connection(_)
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if let Some(status) = err.status() {
            ErrorKind::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_builder() {
            ErrorKind::Config(err.to_string())
        } else {
            // Refused, dropped, or reset connections and unreadable bodies.
            ErrorKind::Connection(err.to_string())
        };

        Error::with_source(kind, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::Config(format!("Invalid URL: {}", err)), err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::with_source(ErrorKind::Io(err.to_string()), err)
    }
}
