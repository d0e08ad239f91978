use crate::domain::Response;
use crate::error::SendError;

/// Decodes a reply from FCM.
///
/// Non-2xx replies are reported as [`SendError::Status`] without looking at
/// the body. A 2xx body is decoded as-is: counts and per-result error codes
/// are passed through for the caller to classify.
///
/// # Errors
/// Returns [`SendError::Status`] for a non-2xx status and [`SendError::Parse`]
/// when the body does not match the response model, including a `results`
/// field that is not an array.
pub fn parse_response(status: u16, body: &str) -> Result<Response, SendError> {
    if !(200..300).contains(&status) {
        return Err(SendError::Status { status });
    }

    serde_json::from_str(body).map_err(|source| SendError::Parse { source, body: body.to_string() })
}
