use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::models::{NotificationMessage, Priority, ScheduleSnapshot};
use crate::utils::diff::DiffResult;
use chrono::{DateTime, Local};

fn timestamp(checked_at: &DateTime<Local>) -> String {
    checked_at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Summarize a non-empty diff as a single push notification
pub fn build_change_message(
    diff: &DiffResult,
    config: &MonitorConfig,
    checked_at: &DateTime<Local>,
) -> NotificationMessage {
    let matches = &diff.matches;
    let mut lines = vec![
        format!("The {} schedule has been updated.", config.team_name),
        String::new(),
        format!("Added matches: {}", matches.added.len()),
        format!("Removed matches: {}", matches.removed.len()),
        format!("Changed matches: {}", matches.changed.len()),
    ];

    let standings = &diff.standings;
    if !standings.is_empty() {
        let count = standings.added.len() + standings.removed.len() + standings.changed.len();
        lines.push(format!("Standings changes: {}", count));
    }

    lines.push(String::new());
    for record in &matches.added {
        lines.push(format!("✅ NEW MATCH: {}", record.format()));
    }
    for record in &matches.removed {
        lines.push(format!("❌ REMOVED: {}", record.format()));
    }
    for change in &matches.changed {
        lines.push(format!("🔄 UPDATED: {}", change.after.format()));
        for field in &change.fields {
            lines.push(format!("    - {}", field.format()));
        }
    }
    for change in &standings.changed {
        let fields: Vec<String> = change.fields.iter().map(|f| f.format()).collect();
        lines.push(format!("📊 {}: {}", change.after.team, fields.join(", ")));
    }
    for record in &standings.added {
        lines.push(format!("📊 NEW IN STANDINGS: {}", record.format()));
    }
    for record in &standings.removed {
        lines.push(format!("📊 LEFT STANDINGS: {}", record.team));
    }

    lines.push(String::new());
    lines.push(format!("View schedule: {}", config.schedule_url));
    lines.push(String::new());
    lines.push(format!("Last checked: {}", timestamp(checked_at)));

    NotificationMessage {
        title: format!("⚽ {} Schedule Updated!", config.team_name),
        body: lines.join("\n"),
        priority: Priority::High,
        tags: vec!["soccer".to_string(), "warning".to_string()],
        click: Some(config.schedule_url.clone()),
    }
}

/// Sent once when there is no stored snapshot yet
pub fn build_first_run_message(
    snapshot: &ScheduleSnapshot,
    config: &MonitorConfig,
    checked_at: &DateTime<Local>,
) -> NotificationMessage {
    let mut lines = vec![
        format!("Monitoring started for the {} schedule.", config.team_name),
        format!(
            "Initial schedule loaded with {} match(es).",
            snapshot.matches.len()
        ),
    ];
    lines.extend(
        snapshot
            .matches
            .iter()
            .map(|record| format!("  • {}", record.format())),
    );
    lines.push(String::new());
    lines.push(format!("View schedule: {}", config.schedule_url));
    lines.push(String::new());
    lines.push(format!("Last checked: {}", timestamp(checked_at)));

    NotificationMessage {
        title: format!("⚽ {} Schedule Monitor Started", config.team_name),
        body: lines.join("\n"),
        priority: Priority::Default,
        tags: vec!["soccer".to_string()],
        click: Some(config.schedule_url.clone()),
    }
}

/// Low priority heads-up that a run aborted
pub fn build_error_message(
    error: &MonitorError,
    config: &MonitorConfig,
    checked_at: &DateTime<Local>,
) -> NotificationMessage {
    NotificationMessage {
        title: format!("❌ {} Monitor Error", config.team_name),
        body: format!(
            "Failed to check schedule: {}\n\nLast checked: {}",
            error,
            timestamp(checked_at)
        ),
        priority: Priority::Low,
        tags: vec!["warning".to_string(), "error".to_string()],
        click: None,
    }
}
