use crate::api::Notifier;
use crate::config::{FirstRunPolicy, MonitorConfig};
use crate::error::MonitorError;
use crate::scrapers::schedule_parser::parse_schedule_html;
use crate::scrapers::ScheduleSource;
use crate::utils::data::{load_state, save_state, StoredState};
use crate::utils::diff::{compare, Comparison, DiffResult};
use crate::utils::report::{build_change_message, build_error_message, build_first_run_message};
use chrono::{Local, Utc};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    FirstRun,
    Unchanged,
    Changed,
}

/// What happened to the notification for this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    NotNeeded,
    Sent,
    Failed(String),
    /// Dry run: built and logged, not sent
    Suppressed,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub diff: Option<DiffResult>,
    pub notification: Delivery,
    pub match_count: usize,
    pub standings_count: usize,
    pub persisted: bool,
}

impl RunReport {
    pub fn summary(&self) -> String {
        let outcome = match self.outcome {
            RunOutcome::FirstRun => "first run, baseline recorded",
            RunOutcome::Unchanged => "no changes detected",
            RunOutcome::Changed => "schedule has changed",
        };
        let notification = match &self.notification {
            Delivery::NotNeeded => "no notification needed".to_string(),
            Delivery::Sent => "notification sent".to_string(),
            Delivery::Failed(reason) => format!("notification FAILED ({})", reason),
            Delivery::Suppressed => "notification suppressed (dry run)".to_string(),
        };
        format!(
            "{}: {} match(es), {} standings row(s); {}; state {}",
            outcome,
            self.match_count,
            self.standings_count,
            notification,
            if self.persisted { "saved" } else { "not saved" }
        )
    }
}

/// Fetch, parse, compare, notify and persist, once.
///
/// Fetch and parse failures return before the stored snapshot is touched.
/// A failed notification is reported in the [`RunReport`] and the new snapshot
/// is still saved, so the same change is not alerted twice.
pub async fn run_once<S, N>(
    config: &MonitorConfig,
    source: &S,
    notifier: &N,
) -> Result<RunReport, MonitorError>
where
    S: ScheduleSource,
    N: Notifier,
{
    info!(url = %config.schedule_url, "checking schedule");

    let html = source.fetch_page().await?;
    let current = parse_schedule_html(&html, &config.team_name)?;
    info!(
        matches = current.matches.len(),
        standings = current.standings.len(),
        "parsed schedule"
    );

    let previous = load_state(&config.state_file)?;
    let checked_at = Local::now();

    let (outcome, diff, message) = match compare(previous.as_ref().map(|s| &s.snapshot), &current)
    {
        Comparison::FirstRun => {
            info!(policy = ?config.first_run_policy, "no previous snapshot, recording baseline");
            let message = match config.first_run_policy {
                FirstRunPolicy::Announce => {
                    Some(build_first_run_message(&current, config, &checked_at))
                }
                FirstRunPolicy::Silent => None,
            };
            (RunOutcome::FirstRun, None, message)
        }
        Comparison::Diff(diff) if diff.is_empty() => {
            info!("no changes detected");
            (RunOutcome::Unchanged, Some(diff), None)
        }
        Comparison::Diff(diff) => {
            info!(
                added = diff.matches.added.len(),
                removed = diff.matches.removed.len(),
                changed = diff.matches.changed.len(),
                "schedule has changed"
            );
            let message = build_change_message(&diff, config, &checked_at);
            (RunOutcome::Changed, Some(diff), Some(message))
        }
    };

    let notification = match message {
        None => Delivery::NotNeeded,
        Some(message) if config.dry_run => {
            info!(title = %message.title, body = %message.body, "dry run, not sending");
            Delivery::Suppressed
        }
        Some(message) => match notifier.send(&message).await {
            Ok(()) => Delivery::Sent,
            Err(err) => {
                warn!(error = %err, "notification delivery failed, saving snapshot anyway");
                Delivery::Failed(err.to_string())
            }
        },
    };

    let match_count = current.matches.len();
    let standings_count = current.standings.len();

    let persisted = if config.dry_run {
        false
    } else {
        let state = StoredState {
            checked_at: Utc::now(),
            source_url: config.schedule_url.clone(),
            snapshot: current,
        };
        save_state(&config.state_file, &state)?;
        true
    };

    Ok(RunReport {
        outcome,
        diff,
        notification,
        match_count,
        standings_count,
        persisted,
    })
}

/// Best-effort alert that a run aborted. Its own failure is only logged.
pub async fn notify_failure<N: Notifier>(
    config: &MonitorConfig,
    notifier: &N,
    error: &MonitorError,
) {
    if !config.notify_on_error || config.dry_run {
        return;
    }

    let message = build_error_message(error, config, &Local::now());
    if let Err(err) = notifier.send(&message).await {
        warn!(error = %err, "could not send error notification");
    }
}
