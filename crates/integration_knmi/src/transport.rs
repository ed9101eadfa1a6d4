//! HTTP transport seam
//!
//! The client only needs "issue a GET, hand back JSON". [`JsonTransport`]
//! captures that contract so callers can inject their own implementation;
//! [`ReqwestTransport`] is the default one.
//!
//! Session ownership is explicit: a caller-supplied [`reqwest::Client`] is
//! reused for every request and never torn down here, otherwise a one-shot
//! client is built for a single request and dropped when it completes.

use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, trace};
use url::{Url, form_urlencoded};

/// A single JSON GET request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonRequest {
    /// Endpoint URL without query string
    pub endpoint: String,
    /// Query parameters, in order
    pub query: Vec<(String, String)>,
    /// Bounded total timeout for the request
    pub timeout: Duration,
}

impl JsonRequest {
    /// Create a request for an endpoint with the given timeout
    #[must_use]
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            query: Vec::new(),
            timeout,
        }
    }

    /// Append a query parameter
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }
}

/// Failures reported by a transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request did not complete within its timeout
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-success status
    #[error("HTTP {0}")]
    Status(u16),

    /// Connection or protocol failure
    #[error("connection failed: {0}")]
    Connection(String),

    /// The body was not valid JSON
    #[error("invalid JSON body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        // The URL carries the API key in its query string
        let err = err.without_url();
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Connection(err.to_string())
        }
    }
}

/// Build the full request URL
///
/// Values are form-encoded except for commas, which the provider expects
/// literally (`locatie=52.1,5.18`).
pub(crate) fn request_url(request: &JsonRequest) -> Result<Url, TransportError> {
    let mut url = Url::parse(&request.endpoint)
        .map_err(|e| TransportError::Connection(format!("invalid endpoint URL: {e}")))?;

    if !request.query.is_empty() {
        let query = request
            .query
            .iter()
            .map(|(name, value)| format!("{}={}", encode(name), encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        url.set_query(Some(&query));
    }

    Ok(url)
}

fn encode(component: &str) -> String {
    component
        .split(',')
        .map(|part| form_urlencoded::byte_serialize(part.as_bytes()).collect::<String>())
        .collect::<Vec<_>>()
        .join(",")
}

/// Issue a GET request and decode the body as JSON
#[cfg_attr(test, automock)]
#[async_trait]
pub trait JsonTransport: Send + Sync {
    /// Perform the request and return the decoded JSON body
    async fn get_json(&self, request: JsonRequest) -> Result<serde_json::Value, TransportError>;
}

#[derive(Debug, Clone)]
enum Session {
    /// Caller-owned client, reused and never closed here
    Shared(Client),
    /// A fresh client per request
    PerRequest,
}

/// [`JsonTransport`] backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    session: Session,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::per_request()
    }
}

impl ReqwestTransport {
    /// Build a one-shot client for every request
    #[must_use]
    pub const fn per_request() -> Self {
        Self {
            session: Session::PerRequest,
        }
    }

    /// Reuse a long-lived, caller-owned client
    #[must_use]
    pub const fn shared(client: Client) -> Self {
        Self {
            session: Session::Shared(client),
        }
    }

    /// Whether requests go through a caller-owned client
    #[must_use]
    pub const fn is_shared(&self) -> bool {
        matches!(self.session, Session::Shared(_))
    }

    fn one_shot_client(timeout: Duration) -> Result<Client, TransportError> {
        Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Connection(e.without_url().to_string()))
    }

    async fn send(
        client: &Client,
        request: &JsonRequest,
    ) -> Result<serde_json::Value, TransportError> {
        let response = client
            .get(request_url(request)?)
            .timeout(request.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        Ok(response.json::<serde_json::Value>().await?)
    }
}

#[async_trait]
impl JsonTransport for ReqwestTransport {
    async fn get_json(&self, request: JsonRequest) -> Result<serde_json::Value, TransportError> {
        debug!(endpoint = %request.endpoint, shared = self.is_shared(), "Sending GET request");

        match &self.session {
            Session::Shared(client) => Self::send(client, &request).await,
            Session::PerRequest => {
                let one_shot = Self::one_shot_client(request.timeout)?;
                let result = Self::send(&one_shot, &request).await;
                drop(one_shot);
                trace!(endpoint = %request.endpoint, "Released one-shot HTTP client");
                result
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder_keeps_param_order() {
        let request = JsonRequest::new("https://example.test/api", Duration::from_secs(10))
            .param("key", "abc")
            .param("locatie", "52.1,5.18");

        assert_eq!(request.endpoint, "https://example.test/api");
        assert_eq!(
            request.query,
            vec![
                ("key".to_string(), "abc".to_string()),
                ("locatie".to_string(), "52.1,5.18".to_string()),
            ]
        );
        assert_eq!(request.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_request_url_keeps_location_comma() {
        let request = JsonRequest::new("https://example.test/api", Duration::from_secs(10))
            .param("key", "a&b c")
            .param("locatie", "52.1,5.18");

        let url = request_url(&request).unwrap();

        assert_eq!(url.query(), Some("key=a%26b+c&locatie=52.1,5.18"));
        assert_eq!(url.path(), "/api");
    }

    #[test]
    fn test_request_url_without_params() {
        let request = JsonRequest::new("https://example.test/api", Duration::from_secs(10));
        assert_eq!(request_url(&request).unwrap().query(), None);
    }

    #[test]
    fn test_request_url_rejects_invalid_endpoint() {
        let request = JsonRequest::new("not a url", Duration::from_secs(10)).param("key", "secret");

        match request_url(&request) {
            Err(TransportError::Connection(message)) => assert!(!message.contains("secret")),
            other => panic!("Expected Connection error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_connection_error_omits_query_string() {
        let request = JsonRequest::new("http://127.0.0.1:1/api/fc.php", Duration::from_secs(2))
            .param("key", "SECRET-KEY-123")
            .param("locatie", "52.1,5.18");

        let err = ReqwestTransport::per_request()
            .get_json(request)
            .await
            .unwrap_err();

        assert!(
            matches!(err, TransportError::Connection(_) | TransportError::Timeout),
            "got: {err:?}"
        );
        assert!(!err.to_string().contains("SECRET-KEY-123"), "got: {err}");
    }

    #[test]
    fn test_session_modes() {
        assert!(!ReqwestTransport::per_request().is_shared());
        assert!(!ReqwestTransport::default().is_shared());
        assert!(ReqwestTransport::shared(Client::new()).is_shared());
    }

    #[test]
    fn test_transport_error_display() {
        assert_eq!(TransportError::Timeout.to_string(), "request timed out");
        assert_eq!(TransportError::Status(403).to_string(), "HTTP 403");
        assert!(
            TransportError::Connection("refused".to_string())
                .to_string()
                .contains("refused")
        );
    }

    #[tokio::test]
    async fn test_mock_transport_returns_body() {
        let mut transport = MockJsonTransport::new();
        transport
            .expect_get_json()
            .withf(|request| request.endpoint == "https://example.test/api")
            .times(1)
            .returning(|_| Ok(serde_json::json!({"data": []})));

        let body = transport
            .get_json(JsonRequest::new(
                "https://example.test/api",
                Duration::from_secs(1),
            ))
            .await
            .unwrap();
        assert_eq!(body, serde_json::json!({"data": []}));
    }
}
