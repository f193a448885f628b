use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StateConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "goaltrackd.db".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SchedulerConfig {
    /// When the reminder job runs. Accepts the shortcuts understood by
    /// `cron_utils::parse_schedule` or a raw 5-field cron expression.
    #[serde(default = "default_reminder_schedule")]
    pub reminder_schedule: String,
    /// When the personal-goal purge runs.
    #[serde(default = "default_cleanup_schedule")]
    pub personal_cleanup_schedule: String,
    /// When the team-goal purge runs.
    #[serde(default = "default_cleanup_schedule")]
    pub team_cleanup_schedule: String,
    /// Sleep used by the reminder job when its next run cannot be computed.
    #[serde(default = "default_reminder_fallback_secs")]
    pub reminder_fallback_secs: u64,
    /// Sleep used by the purge jobs when their next run cannot be computed.
    #[serde(default = "default_cleanup_fallback_secs")]
    pub cleanup_fallback_secs: u64,
    /// Capacity of the on-demand notification queue.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            reminder_schedule: default_reminder_schedule(),
            personal_cleanup_schedule: default_cleanup_schedule(),
            team_cleanup_schedule: default_cleanup_schedule(),
            reminder_fallback_secs: default_reminder_fallback_secs(),
            cleanup_fallback_secs: default_cleanup_fallback_secs(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_reminder_schedule() -> String {
    // Daily at midnight.
    "daily".to_string()
}

fn default_cleanup_schedule() -> String {
    "weekly on sunday".to_string()
}

fn default_reminder_fallback_secs() -> u64 {
    // One day.
    86_400
}

fn default_cleanup_fallback_secs() -> u64 {
    // One week.
    604_800
}

fn default_queue_capacity() -> usize {
    64
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotifierConfig {
    /// Bearer token attached to outbound activity posts, if the conversation
    /// service requires one.
    #[serde(default)]
    pub bearer_token: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            bearer_token: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
