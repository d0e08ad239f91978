use crate::domain::ErrorKind;
use thiserror::Error;

/// Pre-flight failures. A message that fails validation never reaches the network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("message has no target: set `to`, `registration_ids` or `condition`")]
    InvalidTarget,
    #[error("too many registration ids: {0} (max 1000)")]
    TooManyRegistrationIds(usize),
    #[error("invalid time to live: {0}s (max 2419200s)")]
    InvalidTimeToLive(u32),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("API key cannot be empty")]
    MissingApiKey,
    #[error("Invalid endpoint {endpoint:?}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Unsupported endpoint scheme: {0}")]
    UnsupportedScheme(String),
    #[error("Failed to build HTTP transport: {0}")]
    Transport(#[from] TransportError),
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Connection failed: {0}")]
    Connection(String),
}

impl TransportError {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout(),
            Self::Connection(_) => false,
        }
    }
}

/// Failure of a single send attempt.
#[derive(Error, Debug)]
pub enum SendError {
    #[error("Invalid message: {0}")]
    InvalidMessage(#[from] ValidationError),
    #[error("Failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("FCM unavailable: {0}")]
    Connection(#[source] TransportError),
    #[error("Unexpected HTTP status {status}")]
    Status { status: u16 },
    #[error("Failed to parse response: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
        body: String,
    },
}

impl SendError {
    /// The taxonomy kind this failure maps to, if any.
    ///
    /// Transport failures map to [`ErrorKind::Unavailable`] and 5xx statuses to
    /// [`ErrorKind::InternalServerError`]. Other statuses stay unclassified.
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::InvalidMessage(_) => Some(ErrorKind::InvalidParameters),
            Self::Connection(_) => Some(ErrorKind::Unavailable),
            Self::Status { status } if *status >= 500 => Some(ErrorKind::InternalServerError),
            Self::Status { .. } | Self::Encode(_) | Self::Parse { .. } => None,
        }
    }

    /// Whether another attempt could succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Status { .. } => true,
            Self::InvalidMessage(_) | Self::Encode(_) | Self::Parse { .. } => false,
            Self::Connection(_) => ErrorKind::Unavailable.is_retryable(),
        }
    }

    /// Raw response body, when one was received.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Parse { body, .. } => Some(body),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_error() -> SendError {
        let source = serde_json::from_str::<Vec<u8>>("{}").unwrap_err();
        SendError::Parse { source, body: "{}".into() }
    }

    #[test]
    fn test_kind_mapping() {
        let conn = SendError::Connection(TransportError::Connection("refused".into()));
        assert_eq!(conn.kind(), Some(ErrorKind::Unavailable));
        assert_eq!(SendError::Status { status: 503 }.kind(), Some(ErrorKind::InternalServerError));
        assert_eq!(SendError::Status { status: 400 }.kind(), None);
        assert_eq!(SendError::from(ValidationError::InvalidTarget).kind(), Some(ErrorKind::InvalidParameters));
        assert_eq!(parse_error().kind(), None);
    }

    #[test]
    fn test_retryable() {
        assert!(SendError::Connection(TransportError::Connection("reset".into())).is_retryable());
        assert!(SendError::Status { status: 500 }.is_retryable());
        assert!(SendError::Status { status: 401 }.is_retryable());
        assert!(!SendError::from(ValidationError::InvalidTarget).is_retryable());
        assert!(!parse_error().is_retryable());
    }

    #[test]
    fn test_parse_error_keeps_body() {
        assert_eq!(parse_error().body(), Some("{}"));
        assert_eq!(SendError::Status { status: 400 }.body(), None);
    }

    #[test]
    fn test_connection_error_display() {
        let err = SendError::Connection(TransportError::Connection("refused".into()));
        assert_eq!(err.to_string(), "FCM unavailable: Connection failed: refused");
    }
}
