use crate::domain::{Message, Notification, Priority};
use crate::services::client::{ClientOptions, DEFAULT_ENDPOINT};
use crate::services::retry::RetryPolicy;
use clap::{Args, Parser, ValueEnum};
use std::time::Duration;

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub fcm: FcmConfig,

    #[command(flatten)]
    pub retry: RetryConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,

    #[command(flatten)]
    pub message: MessageArgs,
}

#[derive(Clone, Debug, Args)]
pub struct FcmConfig {
    /// Server key used for `Authorization: key=<API_KEY>`
    #[arg(long, env = "FCM_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// FCM send endpoint
    #[arg(long, env = "FCM_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Per-request HTTP timeout in seconds
    #[arg(long, env = "FCM_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct RetryConfig {
    /// Total send attempts, including the first
    #[arg(long, env = "FCM_MAX_ATTEMPTS", default_value_t = 3)]
    pub max_attempts: usize,

    /// Delay before the first retry
    #[arg(long, env = "FCM_MIN_BACKOFF_MS", default_value_t = 100)]
    pub min_backoff_ms: u64,

    /// Upper bound for any single retry delay
    #[arg(long, env = "FCM_MAX_BACKOFF_MS", default_value_t = 10_000)]
    pub max_backoff_ms: u64,

    /// Disable random jitter on retry delays
    #[arg(long, env = "FCM_NO_JITTER", default_value_t = false)]
    pub no_jitter: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Default, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "FCM_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP collector base URL (traces and metrics are exported when set)
    #[arg(long, env = "FCM_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PriorityArg {
    Normal,
    High,
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Normal => Self::Normal,
            PriorityArg::High => Self::High,
        }
    }
}

#[derive(Clone, Debug, Args)]
pub struct MessageArgs {
    /// Single registration token or `/topics/<name>`
    #[arg(long)]
    pub to: Option<String>,

    /// Comma-separated registration tokens for a multicast send
    #[arg(long, value_delimiter = ',')]
    pub registration_ids: Vec<String>,

    /// Topic name (shorthand for `--to /topics/<name>`)
    #[arg(long, conflicts_with = "to")]
    pub topic: Option<String>,

    /// Topic condition expression
    #[arg(long)]
    pub condition: Option<String>,

    /// Data payload entry as key=value (repeatable)
    #[arg(long = "data", value_parser = parse_key_val)]
    pub data: Vec<(String, String)>,

    /// Notification title
    #[arg(long)]
    pub title: Option<String>,

    /// Notification body
    #[arg(long)]
    pub body: Option<String>,

    /// Delivery priority
    #[arg(long, value_enum)]
    pub priority: Option<PriorityArg>,

    /// Time to live in seconds
    #[arg(long)]
    pub ttl: Option<u32>,

    /// Validate the request with FCM without delivering it
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s.split_once('=').ok_or_else(|| format!("invalid KEY=value: no `=` found in `{s}`"))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=value: empty key in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

impl Config {
    pub fn load() -> Self {
        Self::parse()
    }

    #[must_use]
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            endpoint: Some(self.fcm.endpoint.clone()),
            timeout: Some(Duration::from_secs(self.fcm.timeout_secs)),
            transport: None,
            retry: Some(self.retry.policy()),
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            min_delay: Duration::from_millis(self.min_backoff_ms),
            max_delay: Duration::from_millis(self.max_backoff_ms),
            factor: 2.0,
            jitter: !self.no_jitter,
        }
    }
}

impl MessageArgs {
    #[must_use]
    pub fn to_message(&self) -> Message {
        let to = self.topic.as_deref().map_or_else(|| self.to.clone(), |topic| Message::to_topic(topic).to);
        let notification = (self.title.is_some() || self.body.is_some())
            .then(|| Notification { title: self.title.clone(), body: self.body.clone(), ..Notification::default() });

        Message {
            to,
            registration_ids: self.registration_ids.clone(),
            condition: self.condition.clone(),
            priority: self.priority.map(Priority::from),
            time_to_live: self.ttl,
            dry_run: self.dry_run,
            data: self.data.iter().map(|(k, v)| (k.clone(), v.clone().into())).collect(),
            notification,
            ..Message::default()
        }
    }
}
