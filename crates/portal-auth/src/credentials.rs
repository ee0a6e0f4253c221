//! Login credentials for the token endpoint.
//!
//! The portal accepts an arbitrary JSON object as the login body, so the
//! credentials are kept opaque. Debug output is redacted.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, ErrorKind, Result};

/// Environment variable holding the login object as inline JSON.
pub const LOGIN_ENV: &str = "PORTAL_LOGIN";

/// Environment variable holding a path to a JSON file with the login object.
pub const LOGIN_FILE_ENV: &str = "PORTAL_LOGIN_FILE";

/// The JSON body sent to `Authenticate/Token`.
#[derive(Clone)]
pub struct LoginCredentials {
    body: Value,
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self
            .body
            .as_object()
            .map(|map| map.keys().map(String::as_str).collect())
            .unwrap_or_default();
        f.debug_struct("LoginCredentials")
            .field("fields", &fields)
            .field("values", &"[REDACTED]")
            .finish()
    }
}

impl LoginCredentials {
    /// Create credentials from a JSON object.
    pub fn new(body: Value) -> Result<Self> {
        if !body.is_object() {
            return Err(Error::new(ErrorKind::InvalidCredentials(
                "login body must be a JSON object".to_string(),
            )));
        }
        Ok(Self { body })
    }

    /// Create credentials from any value serializing to a JSON object.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self> {
        Self::new(serde_json::to_value(value)?)
    }

    /// Parse credentials from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let body: Value = serde_json::from_str(text).map_err(|e| {
            Error::with_source(
                ErrorKind::InvalidCredentials(format!("login body is not valid JSON: {e}")),
                e,
            )
        })?;
        Self::new(body)
    }

    /// Load credentials from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    /// Load credentials from the environment.
    ///
    /// `PORTAL_LOGIN` (inline JSON) takes precedence over
    /// `PORTAL_LOGIN_FILE`.
    pub fn from_env() -> Result<Self> {
        if let Ok(inline) = std::env::var(LOGIN_ENV) {
            return Self::from_json(&inline);
        }

        match std::env::var(LOGIN_FILE_ENV) {
            Ok(path) => Self::from_file(path),
            Err(_) => Err(Error::new(ErrorKind::EnvVar(format!(
                "{LOGIN_ENV} or {LOGIN_FILE_ENV}"
            )))),
        }
    }

    /// The login body.
    pub fn body(&self) -> &Value {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_debug_redacts_values() {
        let creds = LoginCredentials::new(json!({"login": "ops", "password": "hunter2"})).unwrap();
        let debug = format!("{creds:?}");
        assert!(debug.contains("password"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("ops\""));
    }

    #[test]
    fn test_rejects_non_objects() {
        let err = LoginCredentials::new(json!(["ops", "hunter2"])).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidCredentials(_)));

        let err = LoginCredentials::from_json("login=ops").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidCredentials(_)));
    }

    #[test]
    fn test_from_serialize() {
        #[derive(Serialize)]
        struct Login<'a> {
            login: &'a str,
            password: &'a str,
        }

        let creds = LoginCredentials::from_serialize(&Login {
            login: "ops",
            password: "pw",
        })
        .unwrap();
        assert_eq!(creds.body()["login"], "ops");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"login": "ops", "password": "pw"}}"#).unwrap();

        let creds = LoginCredentials::from_file(file.path()).unwrap();
        assert_eq!(creds.body()["password"], "pw");
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = LoginCredentials::from_file(dir.path().join("login.json")).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Io(_)));
    }
}
