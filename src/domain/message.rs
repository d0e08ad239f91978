use crate::error::ValidationError;
use serde::Serialize;
use serde_json::{Map, Value};

/// FCM rejects multicast sends above this many tokens.
pub const MAX_REGISTRATION_IDS: usize = 1000;
/// Four weeks, in seconds.
pub const MAX_TIME_TO_LIVE: u32 = 2_419_200;
/// A condition may combine at most three topics.
const MAX_CONDITION_OPERATORS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Normal,
    High,
}

/// Display payload shown by the device. Opaque to the send pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Notification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_action: Option<String>,
}

/// An outbound notification in FCM's legacy HTTP wire form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Message {
    /// A single registration token or `/topics/<name>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub registration_ids: Vec<String>,
    /// Topic condition expression, e.g. `'dogs' in topics || 'cats' in topics`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapse_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub content_available: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub mutable_content: bool,
    /// Seconds the message is kept if the device is offline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_live: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restricted_package_name: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
}

impl Message {
    #[must_use]
    pub fn to_token(token: impl Into<String>) -> Self {
        Self { to: Some(token.into()), ..Self::default() }
    }

    #[must_use]
    pub fn to_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { registration_ids: tokens.into_iter().map(Into::into).collect(), ..Self::default() }
    }

    #[must_use]
    pub fn to_topic(topic: &str) -> Self {
        Self::to_token(format!("/topics/{}", topic.trim_start_matches("/topics/")))
    }

    #[must_use]
    pub fn to_condition(condition: impl Into<String>) -> Self {
        Self { condition: Some(condition.into()), ..Self::default() }
    }

    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_notification(mut self, notification: Notification) -> Self {
        self.notification = Some(notification);
        self
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub const fn with_time_to_live(mut self, seconds: u32) -> Self {
        self.time_to_live = Some(seconds);
        self
    }

    /// Validates the message before it is sent.
    ///
    /// # Errors
    /// Returns an error if no target is set, the multicast list is too long,
    /// or the time-to-live exceeds four weeks.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_target() {
            return Err(ValidationError::InvalidTarget);
        }
        if self.registration_ids.len() > MAX_REGISTRATION_IDS {
            return Err(ValidationError::TooManyRegistrationIds(self.registration_ids.len()));
        }
        if let Some(ttl) = self.time_to_live
            && ttl > MAX_TIME_TO_LIVE
        {
            return Err(ValidationError::InvalidTimeToLive(ttl));
        }
        Ok(())
    }

    fn has_target(&self) -> bool {
        let to = self.to.as_deref().is_some_and(|to| !to.trim().is_empty());
        let condition = self.condition.as_deref().is_some_and(|c| {
            let operators = c.matches("&&").count() + c.matches("||").count();
            !c.trim().is_empty() && operators <= MAX_CONDITION_OPERATORS
        });
        to || condition || !self.registration_ids.is_empty()
    }
}
