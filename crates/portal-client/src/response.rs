//! HTTP response handling.
//!
//! Bodies are read eagerly: every portal call decodes the whole envelope,
//! and failed exchanges need the body for the error log.

use serde::de::DeserializeOwned;

use crate::error::{Error, ErrorKind, Result};

/// A fully-read HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    reason: Option<&'static str>,
    headers: Vec<(String, String)>,
    body: String,
}

impl Response {
    /// Read a reqwest response to completion.
    pub(crate) async fn read(inner: reqwest::Response) -> Result<Self> {
        let status = inner.status();
        let headers = inner
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = inner.text().await?;

        Ok(Self {
            status: status.as_u16(),
            reason: status.canonical_reason(),
            headers,
            body,
        })
    }

    /// Build a response from parts.
    pub fn from_parts(status: u16, headers: Vec<(String, String)>, body: impl Into<String>) -> Self {
        Self {
            status,
            reason: reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason()),
            headers,
            body: body.into(),
        }
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns true if the response status is successful (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get a header value (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// The response body as text.
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Deserialize the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(Into::into)
    }

    /// Serialize the response for the error log, with secrets redacted.
    pub fn dump(&self) -> String {
        let mut out = format!(
            "HTTP/1.1 {} {}\r\n",
            self.status,
            self.reason.unwrap_or_default()
        );
        for (name, value) in &self.headers {
            let value = if name.eq_ignore_ascii_case("set-cookie") {
                "[REDACTED]"
            } else {
                value.as_str()
            };
            out.push_str(&format!("{name}: {value}\r\n"));
        }
        out.push_str("\r\n");
        out.push_str(&self.body);
        sanitize_dump(&out)
    }

    /// Turn a non-success status into an `Http` error carrying the dump.
    pub(crate) fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }

        Err(Error::new(ErrorKind::Http {
            status: self.status,
            message: self.dump(),
        }))
    }
}

/// Redact session tokens and bound the size of logged exchanges.
fn sanitize_dump(message: &str) -> String {
    const MAX_LENGTH: usize = 4000;

    let token_pattern = regex_lite::Regex::new(r#""Token"\s*:\s*"[^"]*""#)
        .expect("static token pattern is valid");
    let mut sanitized = token_pattern
        .replace_all(message, r#""Token":"[REDACTED]""#)
        .to_string();

    let header_pattern =
        regex_lite::Regex::new(r"(?im)^(x-auth):[ \t]*[^\r\n]*").expect("static header pattern is valid");
    sanitized = header_pattern
        .replace_all(&sanitized, "$1: [REDACTED]")
        .to_string();

    if sanitized.len() > MAX_LENGTH {
        let mut cut = MAX_LENGTH;
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized.truncate(cut);
        sanitized.push_str("...[truncated]");
    }

    sanitized
}
