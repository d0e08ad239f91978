use super::{PushError, PushProvider};
use crate::domain::{DeliveryResult, ErrorKind, Message};
use crate::services::FcmClient;
use async_trait::async_trait;
use opentelemetry::{KeyValue, global, metrics::Counter};

#[derive(Clone, Debug)]
struct Metrics {
    sent: Counter<u64>,
    errors: Counter<u64>,
    invalidated_tokens: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("fcm-push");
        Self {
            sent: meter
                .u64_counter("push_sent_total")
                .with_description("Total number of push notifications successfully sent")
                .build(),
            errors: meter
                .u64_counter("push_errors_total")
                .with_description("Total number of push notification delivery errors")
                .build(),
            invalidated_tokens: meter
                .u64_counter("push_invalidated_tokens_total")
                .with_description("Total number of push tokens reported as unregistered")
                .build(),
        }
    }
}

/// [`PushProvider`] that delivers a fixed template message to one token at a time.
#[derive(Debug, Clone)]
pub struct FcmPushProvider {
    client: FcmClient,
    template: Message,
    max_attempts: usize,
    metrics: Metrics,
}

impl FcmPushProvider {
    /// `template` supplies the payload; its target fields are replaced per send.
    #[must_use]
    pub fn new(client: FcmClient, template: Message, max_attempts: usize) -> Self {
        Self { client, template, max_attempts, metrics: Metrics::new() }
    }

    fn message_for(&self, token: &str) -> Message {
        Message {
            to: Some(token.to_string()),
            registration_ids: Vec::new(),
            condition: None,
            ..self.template.clone()
        }
    }

    fn classify(&self, kind: ErrorKind) -> PushError {
        if kind.is_unregistered() {
            self.metrics.invalidated_tokens.add(1, &[]);
            PushError::Unregistered
        } else if kind.is_rate_limited() {
            self.metrics.errors.add(1, &[KeyValue::new("reason", "quota_exceeded")]);
            PushError::QuotaExceeded
        } else {
            self.metrics.errors.add(1, &[KeyValue::new("reason", kind.code())]);
            PushError::Other(anyhow::anyhow!("FCM rejected message: {kind}"))
        }
    }
}

#[async_trait]
impl PushProvider for FcmPushProvider {
    #[tracing::instrument(level = "debug", skip(self, token))]
    async fn send_push(&self, token: &str) -> Result<(), PushError> {
        let message = self.message_for(token);
        let outcome = match self.client.send_with_retry(&message, self.max_attempts).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.metrics.errors.add(1, &[KeyValue::new("reason", "send_failed")]);
                return Err(PushError::Other(e.into()));
            }
        };

        let kind = outcome
            .response
            .results
            .first()
            .and_then(DeliveryResult::error_kind)
            .or_else(|| outcome.response.topic_error_kind());

        match kind {
            None => {
                tracing::debug!("Push notification accepted by FCM");
                self.metrics.sent.add(1, &[]);
                Ok(())
            }
            Some(kind) => {
                tracing::info!(error = %kind, code = kind.code(), "FCM reported delivery failure");
                Err(self.classify(kind))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::{HttpTransport, PostRequest, RawResponse};
    use crate::error::TransportError;
    use crate::services::ClientOptions;
    use std::sync::{Arc, Mutex};

    #[derive(Debug)]
    struct FixedTransport {
        body: &'static str,
        last_body: Mutex<Option<serde_json::Value>>,
    }

    #[async_trait]
    impl HttpTransport for FixedTransport {
        async fn post(&self, request: PostRequest) -> Result<RawResponse, TransportError> {
            *self.last_body.lock().unwrap() = serde_json::from_slice(&request.body).ok();
            Ok(RawResponse { status: 200, body: self.body.into() })
        }
    }

    fn provider(body: &'static str) -> (FcmPushProvider, Arc<FixedTransport>) {
        let transport = Arc::new(FixedTransport { body, last_body: Mutex::new(None) });
        let client = FcmClient::new(
            "test",
            ClientOptions { transport: Some(Arc::clone(&transport) as Arc<dyn HttpTransport>), ..ClientOptions::default() },
        )
        .unwrap();
        let template = Message::to_tokens(["ignored"]).with_data("kind", "new_message");
        (FcmPushProvider::new(client, template, 1), transport)
    }

    #[tokio::test]
    async fn test_send_push_success_targets_token() {
        let (provider, transport) = provider(r#"{"success": 1, "results": [{"message_id": "m1"}]}"#);
        provider.send_push("device-1").await.unwrap();

        let body = transport.last_body.lock().unwrap().take().unwrap();
        assert_eq!(body, serde_json::json!({ "to": "device-1", "data": { "kind": "new_message" } }));
    }

    #[tokio::test]
    async fn test_send_push_unregistered() {
        let (provider, _) = provider(r#"{"failure": 1, "results": [{"error": "NotRegistered"}]}"#);
        assert!(matches!(provider.send_push("gone").await, Err(PushError::Unregistered)));
    }

    #[tokio::test]
    async fn test_send_push_rate_limited() {
        let (provider, _) = provider(r#"{"failure": 1, "results": [{"error": "DeviceMessageRateExceeded"}]}"#);
        assert!(matches!(provider.send_push("busy").await, Err(PushError::QuotaExceeded)));
    }

    #[tokio::test]
    async fn test_send_push_other_failure() {
        let (provider, _) = provider(r#"{"failure": 1, "results": [{"error": "MessageTooBig"}]}"#);
        assert!(matches!(provider.send_push("device").await, Err(PushError::Other(_))));
    }
}
