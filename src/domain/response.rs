use super::ErrorKind;
use serde::{Deserialize, Deserializer, Serialize};

/// Reads a JSON `null` as the field's zero value, the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// FCM's reply to a single send request.
///
/// Only one shape is populated per reply: `results` for multicast sends,
/// `failed_registration_ids` for device groups, `message_id`/`error` for topics.
/// Use [`Response::shape`] before reading shape-specific fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Response {
    #[serde(deserialize_with = "null_as_default")]
    pub multicast_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub success: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub failure: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub canonical_ids: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub results: Vec<DeliveryResult>,

    // Device group
    #[serde(deserialize_with = "null_as_default")]
    pub failed_registration_ids: Vec<String>,

    // Topic
    #[serde(deserialize_with = "null_as_default")]
    pub message_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub error: String,
}

/// Outcome for one recipient of a multicast send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryResult {
    #[serde(deserialize_with = "null_as_default")]
    pub message_id: String,
    /// Canonical replacement token. The caller must update its registry.
    #[serde(deserialize_with = "null_as_default")]
    pub registration_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    Multicast,
    DeviceGroup,
    Topic,
}

impl DeliveryResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_empty()
    }

    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        (!self.error.is_empty()).then(|| ErrorKind::classify(&self.error))
    }

    #[must_use]
    pub fn canonical_id(&self) -> Option<&str> {
        (!self.registration_id.is_empty()).then_some(self.registration_id.as_str())
    }
}

impl Response {
    #[must_use]
    pub fn shape(&self) -> ResponseShape {
        if !self.results.is_empty() || self.multicast_id != 0 {
            ResponseShape::Multicast
        } else if self.message_id != 0 || !self.error.is_empty() {
            ResponseShape::Topic
        } else {
            ResponseShape::DeviceGroup
        }
    }

    /// Error reported for a topic send.
    #[must_use]
    pub fn topic_error_kind(&self) -> Option<ErrorKind> {
        (!self.error.is_empty()).then(|| ErrorKind::classify(&self.error))
    }

    /// Tokens FCM reported as permanently invalid, paired by position with the
    /// tokens that were sent.
    #[must_use]
    pub fn unregistered_tokens<'a>(&self, sent: &'a [String]) -> Vec<&'a str> {
        sent.iter()
            .zip(&self.results)
            .filter(|(_, result)| result.error_kind().is_some_and(ErrorKind::is_unregistered))
            .map(|(token, _)| token.as_str())
            .collect()
    }

    /// `(old, new)` token pairs for every recipient that was issued a canonical id.
    #[must_use]
    pub fn canonical_replacements<'a>(&'a self, sent: &'a [String]) -> Vec<(&'a str, &'a str)> {
        sent.iter()
            .zip(&self.results)
            .filter_map(|(token, result)| result.canonical_id().map(|new| (token.as_str(), new)))
            .collect()
    }
}
