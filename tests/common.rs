use fcm_push::{ClientOptions, FcmClient, Message, RetryPolicy};
use std::time::Duration;

#[allow(dead_code)]
pub const SUCCESS_BODY: &str = r#"{
    "success": 1,
    "failure": 0,
    "results": [{
        "message_id": "q1w2e3r4",
        "registration_id": "t5y6u7i8o9",
        "error": ""
    }]
}"#;

pub fn setup_tracing() {
    fcm_push::telemetry::init_test_telemetry();
}

#[allow(dead_code)]
pub fn fast_retry(min_ms: u64) -> RetryPolicy {
    RetryPolicy {
        min_delay: Duration::from_millis(min_ms),
        max_delay: Duration::from_secs(1),
        factor: 2.0,
        jitter: false,
    }
}

pub fn client_for(endpoint: &str) -> FcmClient {
    setup_tracing();
    FcmClient::new(
        "test",
        ClientOptions {
            endpoint: Some(endpoint.to_string()),
            timeout: Some(Duration::from_secs(10)),
            retry: Some(fast_retry(5)),
            ..ClientOptions::default()
        },
    )
    .expect("Failed to build client")
}

#[allow(dead_code)]
pub fn test_message() -> Message {
    Message::to_token("test").with_data("foo", "bar")
}
