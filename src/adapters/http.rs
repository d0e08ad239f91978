use crate::domain::Message;
use crate::error::{SendError, TransportError};
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// A single outbound POST, fully prepared.
#[derive(Debug, Clone)]
pub struct PostRequest {
    pub url: Url,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// The HTTP capability the client sends through.
///
/// Implementations own connection pooling, TLS and per-request timeouts.
#[async_trait]
pub trait HttpTransport: Send + Sync + std::fmt::Debug {
    /// Issues one POST and returns the status and body as received.
    ///
    /// # Errors
    /// Returns an error for any failure below HTTP (DNS, connect, read timeout).
    async fn post(&self, request: PostRequest) -> Result<RawResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a transport with the given per-request timeout.
    ///
    /// # Errors
    /// Returns an error if the underlying client cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    #[must_use]
    pub const fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[tracing::instrument(level = "debug", skip_all, fields(url = %request.url))]
    async fn post(&self, request: PostRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self.client.post(request.url);
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.body(request.body).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::debug!(status, bytes = body.len(), "FCM responded");
        Ok(RawResponse { status, body })
    }
}

/// Serializes `message` and posts it to `endpoint` with FCM's legacy key auth.
///
/// # Errors
/// Returns [`SendError::Encode`] if the message cannot be serialized and
/// [`SendError::Connection`] for any transport failure. The HTTP status is
/// not inspected here.
pub async fn transmit(
    transport: &dyn HttpTransport,
    endpoint: &Url,
    api_key: &str,
    message: &Message,
) -> Result<RawResponse, SendError> {
    let body = serde_json::to_vec(message).map_err(SendError::Encode)?;
    let request = PostRequest {
        url: endpoint.clone(),
        headers: vec![
            ("Authorization", format!("key={api_key}")),
            ("Content-Type", "application/json".to_string()),
        ],
        body,
    };

    transport.post(request).await.map_err(|e| {
        tracing::debug!(error = %e, timeout = e.is_timeout(), "Transport failure");
        SendError::Connection(e)
    })
}
