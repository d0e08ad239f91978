#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

use fcm_push::config::Config;
use fcm_push::{FcmClient, telemetry};
use tracing::Instrument;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    let telemetry_guard = telemetry::init_telemetry(&config.telemetry)?;

    let client = FcmClient::new(config.fcm.api_key.clone(), config.client_options())?;
    let message = config.message.to_message();

    let span = tracing::info_span!("send_push", max_attempts = config.retry.max_attempts);
    let result = client.send_with_retry(&message, config.retry.max_attempts).instrument(span).await;

    let exit: anyhow::Result<()> = match result {
        Ok(outcome) => {
            let response = &outcome.response;
            tracing::info!(
                shape = ?response.shape(),
                multicast_id = response.multicast_id,
                success = response.success,
                failure = response.failure,
                canonical_ids = response.canonical_ids,
                body = %outcome.raw_body,
                "Push request accepted"
            );

            for token in response.unregistered_tokens(&message.registration_ids) {
                tracing::warn!(token = %token, "Token is unregistered and should be removed");
            }
            for (old, new) in response.canonical_replacements(&message.registration_ids) {
                tracing::info!(old = %old, new = %new, "Token was replaced by a canonical id");
            }
            for (index, delivery) in response.results.iter().enumerate() {
                if let Some(kind) = delivery.error_kind() {
                    tracing::warn!(index, code = kind.code(), error = %kind, "Delivery failed for recipient");
                }
            }
            if let Some(kind) = response.topic_error_kind() {
                tracing::warn!(code = kind.code(), error = %kind, "Topic delivery failed");
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, kind = ?e.kind(), "Push request failed");
            Err(e.into())
        }
    };

    telemetry_guard.shutdown();
    exit
}
