use crate::error::MonitorError;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SCHEDULE_URL: &str =
    "https://system.gotsport.com/org_event/events/46853/schedules?team=3577069";
pub const DEFAULT_TEAM_NAME: &str = "Ambassadors FC";
pub const DEFAULT_NTFY_SERVER: &str = "https://ntfy.sh";
pub const DEFAULT_NTFY_TOPIC: &str = "afc-schedule-updates";
pub const DEFAULT_STATE_FILE: &str = "schedule_state.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// What to do when there is no stored snapshot to compare against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstRunPolicy {
    /// Send one "monitoring started" notification listing the initial schedule
    Announce,
    /// Store the snapshot without notifying
    Silent,
}

impl FromStr for FirstRunPolicy {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "announce" => Ok(FirstRunPolicy::Announce),
            "silent" => Ok(FirstRunPolicy::Silent),
            other => Err(MonitorError::Config(format!(
                "unknown first run policy `{}` (expected announce or silent)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub schedule_url: String,
    /// Name used to tell the monitored team apart from its opponents
    pub team_name: String,
    pub ntfy_server: String,
    pub ntfy_topic: String,
    pub state_file: PathBuf,
    pub timeout: Duration,
    pub first_run_policy: FirstRunPolicy,
    pub notify_on_error: bool,
    pub dry_run: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            schedule_url: DEFAULT_SCHEDULE_URL.to_string(),
            team_name: DEFAULT_TEAM_NAME.to_string(),
            ntfy_server: DEFAULT_NTFY_SERVER.to_string(),
            ntfy_topic: DEFAULT_NTFY_TOPIC.to_string(),
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            first_run_policy: FirstRunPolicy::Announce,
            notify_on_error: true,
            dry_run: false,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from the process environment (and `.env`, if present)
    pub fn from_env() -> Result<Self, MonitorError> {
        dotenv::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build a config from any variable lookup, falling back to defaults
    pub fn from_vars<F>(lookup: F) -> Result<Self, MonitorError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout = match var("FETCH_TIMEOUT_SECS") {
            Some(raw) => parse_timeout(&raw)?,
            None => defaults.timeout,
        };

        let first_run_policy = match var("FIRST_RUN_POLICY") {
            Some(raw) => raw.parse()?,
            None => defaults.first_run_policy,
        };

        let notify_on_error = match var("NOTIFY_ON_ERROR") {
            Some(raw) => parse_flag("NOTIFY_ON_ERROR", &raw)?,
            None => defaults.notify_on_error,
        };

        Ok(Self {
            schedule_url: var("SCHEDULE_URL").unwrap_or(defaults.schedule_url),
            team_name: var("TEAM_NAME").unwrap_or(defaults.team_name),
            ntfy_server: var("NTFY_SERVER").unwrap_or(defaults.ntfy_server),
            ntfy_topic: var("NTFY_TOPIC").unwrap_or(defaults.ntfy_topic),
            state_file: var("STATE_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.state_file),
            timeout,
            first_run_policy,
            notify_on_error,
            dry_run: false,
        })
    }
}

pub fn parse_timeout(raw: &str) -> Result<Duration, MonitorError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(MonitorError::Config(format!(
            "timeout must be a positive number of seconds, got `{}`",
            raw
        ))),
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, MonitorError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(MonitorError::Config(format!(
            "{} must be a boolean, got `{}`",
            key, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = MonitorConfig::from_vars(lookup(&[])).unwrap();
        assert_eq!(config.schedule_url, DEFAULT_SCHEDULE_URL);
        assert_eq!(config.ntfy_topic, "afc-schedule-updates");
        assert_eq!(config.state_file, PathBuf::from("schedule_state.json"));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.first_run_policy, FirstRunPolicy::Announce);
        assert!(config.notify_on_error);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_overrides_from_vars() {
        let config = MonitorConfig::from_vars(lookup(&[
            ("NTFY_TOPIC", "my-topic"),
            ("FETCH_TIMEOUT_SECS", "10"),
            ("FIRST_RUN_POLICY", "Silent"),
            ("NOTIFY_ON_ERROR", "false"),
            ("STATE_FILE", "/tmp/state.json"),
        ]))
        .unwrap();
        assert_eq!(config.ntfy_topic, "my-topic");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.first_run_policy, FirstRunPolicy::Silent);
        assert!(!config.notify_on_error);
        assert_eq!(config.state_file, PathBuf::from("/tmp/state.json"));
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = MonitorConfig::from_vars(lookup(&[("NTFY_TOPIC", "  ")])).unwrap();
        assert_eq!(config.ntfy_topic, DEFAULT_NTFY_TOPIC);
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        for pairs in [
            [("FETCH_TIMEOUT_SECS", "soon")],
            [("FETCH_TIMEOUT_SECS", "0")],
            [("FIRST_RUN_POLICY", "loud")],
            [("NOTIFY_ON_ERROR", "maybe")],
        ] {
            let err = MonitorConfig::from_vars(lookup(&pairs)).unwrap_err();
            assert!(matches!(err, MonitorError::Config(_)), "{:?}", pairs);
        }
    }
}
