//! Error types for portal-auth.
//!
//! Error messages never include credential or token values.

/// Result type alias for portal-auth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for portal-auth operations.
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

    /// Returns true if the portal answered but refused to issue a token.
    pub fn is_rejected(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Rejected { .. } | ErrorKind::MissingToken
        )
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// The authentication envelope reported `Success=false`.
    #[error("Authentication rejected: {error_number} : {error_message}")]
    Rejected {
        error_number: String,
        error_message: String,
    },

    /// The authentication envelope succeeded but carried no token.
    #[error("Authentication response carried no token")]
    MissingToken,

    /// Invalid credentials configuration.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Environment variable not set.
    #[error("Environment variable not set: {0}")]
    EnvVar(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Transport or envelope error from portal-client.
    #[error("Client error: {0}")]
    Client(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::with_source(ErrorKind::Io(err.to_string()), err)
    }
}

impl From<std::env::VarError> for Error {
    fn from(err: std::env::VarError) -> Self {
        Error::with_source(ErrorKind::EnvVar(err.to_string()), err)
    }
}

impl From<portal_api_client::Error> for Error {
    fn from(err: portal_api_client::Error) -> Self {
        // The response dump is already in the error log; keep the status only.
        let message = match &err.kind {
            portal_api_client::ErrorKind::Http { status, .. } => format!("HTTP status {status}"),
            other => other.to_string(),
        };
        Error::with_source(ErrorKind::Client(message), err)
    }
}

impl From<Error> for portal_api_client::Error {
    fn from(err: Error) -> Self {
        portal_api_client::Error::with_source(
            portal_api_client::ErrorKind::Authentication(err.kind.to_string()),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_display() {
        let err = Error::new(ErrorKind::Rejected {
            error_number: "401".into(),
            error_message: "Bad login".into(),
        });
        assert!(err.is_rejected());
        assert_eq!(err.to_string(), "Authentication rejected: 401 : Bad login");
    }

    #[test]
    fn test_into_client_error() {
        let err: portal_api_client::Error = Error::new(ErrorKind::MissingToken).into();
        assert!(err.is_auth_error());
        assert!(err.to_string().contains("carried no token"));
    }

    #[test]
    fn test_from_client_error() {
        let client_err = portal_api_client::Error::new(portal_api_client::ErrorKind::Timeout);
        let err: Error = client_err.into();
        assert!(!err.is_rejected());
        assert!(matches!(err.kind, ErrorKind::Client(ref msg) if msg == "Request timeout"));
    }
}
