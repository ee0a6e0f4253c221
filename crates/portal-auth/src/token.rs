//! Session-token acquisition.

use portal_api_client::{Envelope, PortalHttpClient, TokenData};
use tracing::{debug, instrument};

use crate::credentials::LoginCredentials;
use crate::error::{Error, ErrorKind, Result};

/// Path of the token endpoint, relative to the base address.
pub const TOKEN_PATH: &str = "Authenticate/Token";

/// A session token, sent as the `x-auth` header on every call.
///
/// The value is redacted in Debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SessionToken").field(&"[REDACTED]").finish()
    }
}

impl SessionToken {
    /// Wrap an already-issued token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Exchange login credentials for a session token.
///
/// Sends one `POST Authenticate/Token` request with the credentials as the
/// JSON body. A transport failure, a `Success=false` envelope, or a
/// successful envelope without `ResultData.Token` is an error.
#[instrument(skip_all)]
pub async fn authenticate(
    http: &PortalHttpClient,
    credentials: &LoginCredentials,
) -> Result<SessionToken> {
    let request = http
        .post(TOKEN_PATH)
        .json_value(credentials.body().clone())
        .redact_body();
    let response = http.execute(request).await?;

    let envelope: Envelope<TokenData> = Envelope::decode(response.text())?;
    if let Some(failure) = envelope.failure() {
        return Err(Error::new(ErrorKind::Rejected {
            error_number: failure.error_number,
            error_message: failure.error_message,
        }));
    }

    match envelope.result_data.token {
        Some(token) if !token.is_empty() => {
            debug!("Session token obtained");
            Ok(SessionToken(token))
        }
        _ => Err(Error::new(ErrorKind::MissingToken)),
    }
}
