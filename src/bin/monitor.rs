use afc_schedule_monitor::api::ntfy_api::NtfyClient;
use afc_schedule_monitor::config::{parse_timeout, FirstRunPolicy, MonitorConfig};
use afc_schedule_monitor::error::MonitorError;
use afc_schedule_monitor::monitor::{notify_failure, run_once, RunReport};
use afc_schedule_monitor::scrapers::gotsport::GotSportScraper;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Check the team schedule once and push a notification if it changed.
/// Meant to be run from cron or a CI schedule.
#[derive(Parser)]
#[command(name = "monitor")]
#[command(about = "AFC schedule change monitor")]
struct Cli {
    /// Schedule page to watch (overrides SCHEDULE_URL)
    #[arg(long)]
    url: Option<String>,

    /// ntfy topic to publish to (overrides NTFY_TOPIC)
    #[arg(long)]
    topic: Option<String>,

    /// Where the previous snapshot is kept (overrides STATE_FILE)
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// HTTP timeout in seconds (overrides FETCH_TIMEOUT_SECS)
    #[arg(long)]
    timeout: Option<String>,

    /// First run behaviour: announce or silent (overrides FIRST_RUN_POLICY)
    #[arg(long)]
    first_run: Option<String>,

    /// Log the notification instead of sending it and leave the state file alone
    #[arg(long)]
    dry_run: bool,

    /// Don't push a notification when the check itself fails
    #[arg(long)]
    no_error_notify: bool,
}

impl Cli {
    fn into_config(self) -> Result<MonitorConfig, MonitorError> {
        let mut config = MonitorConfig::from_env()?;

        if let Some(url) = self.url {
            config.schedule_url = url;
        }
        if let Some(topic) = self.topic {
            config.ntfy_topic = topic;
        }
        if let Some(state_file) = self.state_file {
            config.state_file = state_file;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = parse_timeout(&timeout)?;
        }
        if let Some(policy) = self.first_run {
            config.first_run_policy = policy.parse::<FirstRunPolicy>()?;
        }
        config.dry_run = self.dry_run;
        if self.no_error_notify {
            config.notify_on_error = false;
        }

        Ok(config)
    }
}

async fn check(config: &MonitorConfig, notifier: &NtfyClient) -> Result<RunReport> {
    let scraper = GotSportScraper::new(&config.schedule_url, config.timeout)?;

    let report = run_once(config, &scraper, notifier)
        .await
        .context("Schedule check failed")?;

    Ok(report)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    let notifier = match NtfyClient::new(&config.ntfy_server, &config.ntfy_topic, config.timeout) {
        Ok(notifier) => notifier,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    match check(&config, &notifier).await {
        Ok(report) => {
            info!("{}", report.summary());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            match e.downcast_ref::<MonitorError>() {
                Some(cause) => {
                    notify_failure(&config, &notifier, cause).await;
                    ExitCode::from(cause.exit_code())
                }
                None => ExitCode::FAILURE,
            }
        }
    }
}
