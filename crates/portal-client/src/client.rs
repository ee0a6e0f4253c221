//! Core HTTP transport bound to the portal base address.

use std::time::Instant;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::request::{RequestBody, RequestBuilder, RequestMethod};
use crate::response::Response;
use crate::ERROR_LOG_TARGET;

/// HTTP client for portal APIs.
///
/// Every request carries `Accept: application/json` and
/// `Content-Type: application/json` by default, and cookies persist across
/// calls made through one client (and its clones).
#[derive(Debug, Clone)]
pub struct PortalHttpClient {
    inner: reqwest::Client,
    base_url: Url,
    config: ClientConfig,
}

impl PortalHttpClient {
    /// Create a new HTTP client.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = parse_base_url(&config.base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let inner = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(config.cookie_store)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self {
            inner,
            base_url,
            config,
        })
    }

    /// Create a new HTTP client with default configuration.
    pub fn default_client() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The base address, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a call path against the base address.
    ///
    /// Leading slashes are ignored so that paths always stay under the base
    /// address rather than replacing its path.
    pub fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Create a request builder for the given method and path.
    pub fn request(&self, method: RequestMethod, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(method, path)
    }

    /// Create a POST request builder.
    pub fn post(&self, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Post, path)
    }

    /// Execute one request.
    ///
    /// Transport failures (connection errors, timeouts, non-2xx statuses)
    /// are written to the error log with the outgoing request and, when the
    /// server answered, the response.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let started = Instant::now();
        let result = self.execute_once(&request).await;

        if self.config.debug {
            info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Total request time ({}): {:?}",
                request.path,
                started.elapsed()
            );
        }

        if let Err(ref err) = result {
            if err.is_transport() {
                log_transport_failure(&request, err);
            }
        }

        result
    }

    async fn execute_once(&self, request: &RequestBuilder) -> Result<Response> {
        let url = self.url(&request.path)?;
        let mut req = self.inner.request(request.method.to_reqwest(), url);

        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        if let Some(ref body) = request.body {
            req = match body {
                RequestBody::Json(value) => req.json(value),
                RequestBody::Text(text) => req.body(text.clone()),
            };
        }

        if self.config.enable_tracing {
            debug!(method = %request.method, path = %request.path, "Sending request");
        }

        let response = Response::read(req.send().await?).await?;

        if self.config.enable_tracing {
            let status = response.status();
            if response.is_success() {
                debug!(status, "Response received");
            } else {
                info!(status, "Non-success response");
            }
        }

        response.error_for_status()
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(Error::new(ErrorKind::Config(format!(
            "base address '{raw}' cannot carry relative paths"
        ))));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn log_transport_failure(request: &RequestBuilder, err: &Error) {
    debug!(target: ERROR_LOG_TARGET, "REQUEST: {}", request.dump());
    if let ErrorKind::Http { message, .. } = &err.kind {
        debug!(target: ERROR_LOG_TARGET, "RESPONSE: {}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> PortalHttpClient {
        PortalHttpClient::new(ClientConfig::builder().with_base_url(server.uri()).build()).unwrap()
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = PortalHttpClient::new(
            ClientConfig::builder()
                .with_base_url("https://api.example.com/v2")
                .build(),
        )
        .unwrap();

        assert_eq!(client.base_url().as_str(), "https://api.example.com/v2/");
        assert_eq!(
            client.url("Search/Companies").unwrap().as_str(),
            "https://api.example.com/v2/Search/Companies"
        );
        assert_eq!(
            client.url("/CUD/Company/42").unwrap().as_str(),
            "https://api.example.com/v2/CUD/Company/42"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = PortalHttpClient::new(ClientConfig::builder().with_base_url("API_URL").build())
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Config(_)));
    }

    #[tokio::test]
    async fn test_default_headers_are_sent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/Search/Companies"))
            .and(header("Accept", "application/json"))
            .and(header("Content-Type", "application/json"))
            .and(header("x-auth", "tok"))
            .and(body_string(r#"{"num_page":1}"#))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let response = client
            .execute(
                client
                    .post("Search/Companies")
                    .auth_token("tok")
                    .json_text(r#"{"num_page":1}"#),
            )
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.text(), "{}");
    }

    #[tokio::test]
    async fn test_cookies_persist_across_calls() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/Authenticate/Token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Set-Cookie", "SESSIONID=abc123; Path=/")
                    .set_body_string("{}"),
            )
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/Search/Companies"))
            .and(header("Cookie", "SESSIONID=abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        client.execute(client.post("Authenticate/Token")).await.unwrap();
        client.execute(client.post("Search/Companies")).await.unwrap();
    }

    #[tokio::test]
    async fn test_server_error_is_transport_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/CUD/Company"))
            .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let err = client
            .execute(client.post("CUD/Company").json_text("{}"))
            .await
            .unwrap_err();

        assert!(err.is_transport());
        match err.kind {
            ErrorKind::Http { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("database unavailable"));
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let client = PortalHttpClient::new(
            ClientConfig::builder()
                .with_base_url("http://127.0.0.1:1/")
                .build(),
        )
        .unwrap();

        let err = client.execute(client.post("Search/Companies")).await.unwrap_err();
        assert!(err.is_transport());
    }
}
