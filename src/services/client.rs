use crate::adapters::http::{self, HttpTransport, ReqwestTransport};
use crate::domain::{Message, Response};
use crate::error::{ConfigError, SendError};
use crate::services::parser::parse_response;
use crate::services::retry::RetryPolicy;
use backon::Retryable;
use opentelemetry::{KeyValue, global, metrics::Counter};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://fcm.googleapis.com/fcm/send";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
struct Metrics {
    attempts: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("fcm-push");
        Self {
            attempts: meter
                .u64_counter("push_attempts_total")
                .with_description("Total number of HTTP send attempts made against FCM")
                .build(),
        }
    }
}

/// Construction options. Unset fields fall back to defaults.
#[derive(Clone, Debug, Default)]
pub struct ClientOptions {
    pub endpoint: Option<String>,
    /// Per-request timeout for the default transport. Ignored when `transport` is set.
    pub timeout: Option<Duration>,
    pub transport: Option<Arc<dyn HttpTransport>>,
    pub retry: Option<RetryPolicy>,
}

/// A parsed reply together with the body it was decoded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub response: Response,
    pub raw_body: String,
}

/// FCM client. Cheap to clone and safe to share between tasks; holds no
/// mutable state after construction.
#[derive(Clone)]
pub struct FcmClient {
    api_key: Arc<str>,
    endpoint: Url,
    transport: Arc<dyn HttpTransport>,
    retry: RetryPolicy,
    metrics: Metrics,
}

impl fmt::Debug for FcmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FcmClient")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint.as_str())
            .field("transport", &self.transport)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl FcmClient {
    /// Creates a new client.
    ///
    /// # Errors
    /// Returns an error if the API key is empty, the endpoint is not an absolute
    /// http(s) URL, or the default transport cannot be built.
    pub fn new(api_key: impl Into<String>, options: ClientOptions) -> Result<Self, ConfigError> {
        let api_key: String = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        let endpoint = parse_endpoint(options.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT))?;

        let transport: Arc<dyn HttpTransport> = match options.transport {
            Some(transport) => {
                if options.timeout.is_some() {
                    tracing::debug!("Timeout option ignored for injected transport");
                }
                transport
            }
            None => Arc::new(ReqwestTransport::new(options.timeout.unwrap_or(DEFAULT_TIMEOUT))?),
        };

        Ok(Self {
            api_key: api_key.into(),
            endpoint,
            transport,
            retry: options.retry.unwrap_or_default(),
            metrics: Metrics::new(),
        })
    }

    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Makes exactly one delivery attempt: validate, post, parse.
    ///
    /// # Errors
    /// Returns the first failing stage's error. No request is made for an
    /// invalid message.
    #[tracing::instrument(level = "debug", skip_all, err(level = "debug"))]
    pub async fn send(&self, message: &Message) -> Result<SendOutcome, SendError> {
        message.validate()?;

        let raw = http::transmit(self.transport.as_ref(), &self.endpoint, &self.api_key, message).await;
        self.record_attempt(&raw);
        let raw = raw?;

        let response = parse_response(raw.status, &raw.body)?;
        tracing::debug!(success = response.success, failure = response.failure, "Push send completed");

        Ok(SendOutcome { response, raw_body: raw.body })
    }

    /// Sends with up to `max_attempts` attempts, backing off between them.
    ///
    /// Stops at the first success or the first non-retryable failure.
    /// A `max_attempts` of zero is treated as one.
    ///
    /// # Errors
    /// Returns the last attempt's error unchanged.
    #[tracing::instrument(level = "debug", skip_all, fields(max_attempts), err(level = "debug"))]
    pub async fn send_with_retry(&self, message: &Message, max_attempts: usize) -> Result<SendOutcome, SendError> {
        let max_attempts = max_attempts.max(1);
        tracing::Span::current().record("max_attempts", max_attempts);

        (|| self.send(message))
            .retry(self.retry.schedule(max_attempts))
            .when(SendError::is_retryable)
            .notify(|err, delay| {
                tracing::warn!(error = %err, ?delay, "Push send failed, retrying");
            })
            .await
    }

    fn record_attempt(&self, raw: &Result<http::RawResponse, SendError>) {
        let outcome = match raw {
            Ok(raw) if raw.is_success() => "ok",
            Ok(_) => "http_error",
            Err(_) => "transport_error",
        };
        self.metrics.attempts.add(1, &[KeyValue::new("outcome", outcome)]);
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(endpoint)
        .map_err(|source| ConfigError::InvalidEndpoint { endpoint: endpoint.to_string(), source })?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        scheme => Err(ConfigError::UnsupportedScheme(scheme.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::{PostRequest, RawResponse};
    use crate::error::TransportError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SUCCESS_BODY: &str = r#"{"multicast_id": 1, "success": 1, "failure": 0, "canonical_ids": 0,
        "results": [{"message_id": "q1w2e3r4", "registration_id": "", "error": ""}]}"#;

    #[derive(Debug, Clone, Copy)]
    enum Failure {
        Unreachable,
        Status(u16),
    }

    /// Fails the first `failures` calls, then answers 200 with `SUCCESS_BODY`.
    #[derive(Debug)]
    struct ScriptedTransport {
        calls: AtomicUsize,
        failures: usize,
        failure: Failure,
    }

    impl ScriptedTransport {
        fn new(failures: usize, failure: Failure) -> Arc<Self> {
            Arc::new(Self { calls: AtomicUsize::new(0), failures, failure })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn post(&self, _request: PostRequest) -> Result<RawResponse, TransportError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return match self.failure {
                    Failure::Unreachable => Err(TransportError::Connection("connection refused".into())),
                    Failure::Status(status) => Ok(RawResponse { status, body: String::new() }),
                };
            }
            Ok(RawResponse { status: 200, body: SUCCESS_BODY.into() })
        }
    }

    fn client_with(transport: Arc<ScriptedTransport>) -> FcmClient {
        let policy = RetryPolicy {
            min_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
            factor: 2.0,
            jitter: false,
        };
        FcmClient::new(
            "test",
            ClientOptions { transport: Some(transport), retry: Some(policy), ..ClientOptions::default() },
        )
        .expect("client")
    }

    fn message() -> Message {
        Message::to_token("test").with_data("foo", "bar")
    }

    #[test]
    fn test_new_rejects_bad_endpoints() {
        for endpoint in ["", "test", "127.0.0.1:80", "ftp://fcm.example.com/send", "http://"] {
            let options = ClientOptions { endpoint: Some(endpoint.into()), ..ClientOptions::default() };
            assert!(FcmClient::new("test", options).is_err(), "endpoint {endpoint:?} should be rejected");
        }
    }

    #[test]
    fn test_new_rejects_empty_api_key() {
        let res = FcmClient::new(" ", ClientOptions::default());
        assert!(matches!(res, Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn test_new_uses_default_endpoint() {
        let client = FcmClient::new("test", ClientOptions::default()).unwrap();
        assert_eq!(client.endpoint().as_str(), DEFAULT_ENDPOINT);
        assert_eq!(client.retry_policy(), &RetryPolicy::default());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let client = FcmClient::new("super-secret", ClientOptions::default()).unwrap();
        assert!(!format!("{client:?}").contains("super-secret"));
    }

    #[tokio::test]
    async fn test_send_success() {
        let transport = ScriptedTransport::new(0, Failure::Unreachable);
        let client = client_with(Arc::clone(&transport));

        let outcome = client.send(&message()).await.unwrap();
        assert_eq!(outcome.response.success, 1);
        assert_eq!(outcome.response.failure, 0);
        assert_eq!(outcome.raw_body, SUCCESS_BODY);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_send_invalid_message_makes_no_request() {
        let transport = ScriptedTransport::new(0, Failure::Unreachable);
        let client = client_with(Arc::clone(&transport));

        let err = client.send(&Message::default()).await.unwrap_err();
        assert!(matches!(err, SendError::InvalidMessage(_)));
        assert_eq!(transport.calls(), 0);

        let err = client.send_with_retry(&Message::default(), 5).await.unwrap_err();
        assert!(matches!(err, SendError::InvalidMessage(_)));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_succeeds_on_third_attempt() {
        let transport = ScriptedTransport::new(2, Failure::Status(500));
        let client = client_with(Arc::clone(&transport));

        let outcome = client.send_with_retry(&message(), 4).await.unwrap();
        assert_eq!(outcome.response.success, 1);
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhausts_attempts_with_backoff() {
        let transport = ScriptedTransport::new(usize::MAX, Failure::Unreachable);
        let client = client_with(Arc::clone(&transport));

        let start = tokio::time::Instant::now();
        let err = client.send_with_retry(&message(), 4).await.unwrap_err();
        let elapsed = start.elapsed();

        assert!(matches!(err, SendError::Connection(_)));
        assert_eq!(transport.calls(), 4);
        // 10ms + 20ms + 40ms between the four attempts
        assert!(elapsed >= Duration::from_millis(69), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(150), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_does_not_sleep() {
        let transport = ScriptedTransport::new(usize::MAX, Failure::Status(503));
        let client = client_with(Arc::clone(&transport));

        let start = tokio::time::Instant::now();
        let err = client.send_with_retry(&message(), 1).await.unwrap_err();

        assert!(matches!(err, SendError::Status { status: 503 }));
        assert_eq!(transport.calls(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_sends_once() {
        let transport = ScriptedTransport::new(0, Failure::Unreachable);
        let client = client_with(Arc::clone(&transport));

        assert!(client.send_with_retry(&message(), 0).await.is_ok());
        assert_eq!(transport.calls(), 1);
    }

    #[derive(Debug, Default)]
    struct MalformedTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl HttpTransport for MalformedTransport {
        async fn post(&self, _request: PostRequest) -> Result<RawResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RawResponse { status: 200, body: r#"{"success": 1, "results": {"message_id": "x"}}"#.into() })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_parse_failure_is_not_retried() {
        let transport = Arc::new(MalformedTransport::default());
        let client = FcmClient::new(
            "test",
            ClientOptions { transport: Some(Arc::clone(&transport) as Arc<dyn HttpTransport>), ..ClientOptions::default() },
        )
        .unwrap();

        let err = client.send_with_retry(&message(), 3).await.unwrap_err();
        assert!(matches!(err, SendError::Parse { .. }));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }
}
