use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Named failure reasons reported by FCM, plus the locally synthesized
/// connection and server-error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingRegistration,
    InvalidRegistration,
    NotRegistered,
    InvalidPackageName,
    MismatchSenderId,
    MessageTooBig,
    InvalidDataKey,
    InvalidTtl,
    /// Connection or timeout failure. Synthesized from the transport outcome.
    Unavailable,
    /// 5xx from FCM. Synthesized from the HTTP status.
    InternalServerError,
    DeviceMessageRateExceeded,
    TopicsMessageRateExceeded,
    InvalidParameters,
    Unknown,
}

static CODES: LazyLock<HashMap<&'static str, ErrorKind>> =
    LazyLock::new(|| ErrorKind::CATALOGUE.iter().map(|kind| (kind.code(), *kind)).collect());

impl ErrorKind {
    /// Every kind FCM can name in a response body.
    pub const CATALOGUE: [Self; 13] = [
        Self::MissingRegistration,
        Self::InvalidRegistration,
        Self::NotRegistered,
        Self::InvalidPackageName,
        Self::MismatchSenderId,
        Self::MessageTooBig,
        Self::InvalidDataKey,
        Self::InvalidTtl,
        Self::Unavailable,
        Self::InternalServerError,
        Self::DeviceMessageRateExceeded,
        Self::TopicsMessageRateExceeded,
        Self::InvalidParameters,
    ];

    /// Maps an FCM error code to its kind. Unrecognized codes map to [`ErrorKind::Unknown`].
    #[must_use]
    pub fn classify(code: &str) -> Self {
        CODES.get(code).copied().unwrap_or(Self::Unknown)
    }

    /// The code FCM uses for this kind on the wire.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::MissingRegistration => "MissingRegistration",
            Self::InvalidRegistration => "InvalidRegistration",
            Self::NotRegistered => "NotRegistered",
            Self::InvalidPackageName => "InvalidPackageName",
            Self::MismatchSenderId => "MismatchSenderId",
            Self::MessageTooBig => "MessageTooBig",
            Self::InvalidDataKey => "InvalidDataKey",
            Self::InvalidTtl => "InvalidTtl",
            Self::Unavailable => "Unavailable",
            Self::InternalServerError => "InternalServerError",
            Self::DeviceMessageRateExceeded => "DeviceMessageRateExceeded",
            Self::TopicsMessageRateExceeded => "TopicsMessageRateExceeded",
            Self::InvalidParameters => "InvalidParameters",
            Self::Unknown => "Unknown",
        }
    }

    /// True when the target token is permanently invalid.
    /// The caller must drop the token from its registry and must not retry.
    #[must_use]
    pub const fn is_unregistered(self) -> bool {
        matches!(
            self,
            Self::MissingRegistration | Self::InvalidRegistration | Self::NotRegistered | Self::MismatchSenderId
        )
    }

    #[must_use]
    pub const fn is_temporary(self) -> bool {
        matches!(
            self,
            Self::Unavailable
                | Self::InternalServerError
                | Self::DeviceMessageRateExceeded
                | Self::TopicsMessageRateExceeded
        )
    }

    #[must_use]
    pub const fn is_timeout(self) -> bool {
        matches!(self, Self::Unavailable)
    }

    /// Transient service-side conditions worth another attempt.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        self.is_temporary() || self.is_timeout()
    }

    #[must_use]
    pub const fn is_rate_limited(self) -> bool {
        matches!(self, Self::DeviceMessageRateExceeded | Self::TopicsMessageRateExceeded)
    }

    const fn description(self) -> &'static str {
        match self {
            Self::MissingRegistration => "missing registration token",
            Self::InvalidRegistration => "invalid registration token",
            Self::NotRegistered => "unregistered device",
            Self::InvalidPackageName => "invalid package name",
            Self::MismatchSenderId => "mismatched sender id",
            Self::MessageTooBig => "message is too big",
            Self::InvalidDataKey => "invalid data key",
            Self::InvalidTtl => "invalid time to live",
            Self::Unavailable => "timeout",
            Self::InternalServerError => "internal server error",
            Self::DeviceMessageRateExceeded => "device message rate exceeded",
            Self::TopicsMessageRateExceeded => "topics message rate exceeded",
            Self::InvalidParameters => "check that the provided parameters have the right name and type",
            Self::Unknown => "unknown error type",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl FromStr for ErrorKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::classify(s))
    }
}

/// Shorthand for `ErrorKind::classify(code).is_unregistered()`.
#[must_use]
pub fn is_unregistered_code(code: &str) -> bool {
    ErrorKind::classify(code).is_unregistered()
}
