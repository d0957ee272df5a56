use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which side of the fixture the monitored team is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
    Unknown,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Home => "Home",
            Side::Away => "Away",
            Side::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    Scheduled,
    Completed,
    Cancelled,
    Postponed,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "Scheduled",
            MatchStatus::Completed => "Completed",
            MatchStatus::Cancelled => "Cancelled",
            MatchStatus::Postponed => "Postponed",
        }
    }
}

/// A single fixture as listed on the schedule page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub date: NaiveDate,
    pub time: Option<String>, // e.g. "2:00 PM EST"
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub opponent: String,
    pub side: Side,
    pub venue: Option<String>,
    pub score: Option<String>, // e.g. "2 - 2"
    pub status: MatchStatus,
}

impl MatchRecord {
    /// Natural key used to line records up across snapshots
    pub fn natural_key(&self) -> (NaiveDate, String) {
        (self.date, self.opponent.clone())
    }

    /// One-line human readable summary
    pub fn format(&self) -> String {
        let mut parts = vec![
            format!("vs {}", self.opponent),
            format!("on {}", self.date.format("%b %d, %Y")),
        ];
        if let Some(time) = &self.time {
            parts.push(format!("at {}", time));
        }
        if self.side != Side::Unknown {
            parts.push(format!("({})", self.side.as_str()));
        }
        if let Some(venue) = &self.venue {
            parts.push(format!("@ {}", venue));
        }
        if let Some(score) = &self.score {
            parts.push(format!("[Score: {}]", score));
        }
        if matches!(self.status, MatchStatus::Cancelled | MatchStatus::Postponed) {
            parts.push(format!("- {}", self.status.as_str().to_uppercase()));
        }
        parts.join(" ")
    }
}

/// One row of a standings table. Columns the page does not publish stay `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StandingsRecord {
    pub team: String,
    pub position: Option<u32>,
    pub played: Option<u32>,
    pub wins: Option<u32>,
    pub draws: Option<u32>,
    pub losses: Option<u32>,
    pub goals_for: Option<u32>,
    pub goals_against: Option<u32>,
    pub points: Option<u32>,
}

impl StandingsRecord {
    pub fn format(&self) -> String {
        let position = self
            .position
            .map(|p| format!("{}. ", p))
            .unwrap_or_default();
        let points = self
            .points
            .map(|p| format!(" - {} pts", p))
            .unwrap_or_default();
        format!("{}{}{}", position, self.team, points)
    }
}

/// Everything observed on the schedule page during one run
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScheduleSnapshot {
    pub matches: Vec<MatchRecord>,
    #[serde(default)]
    pub standings: Vec<StandingsRecord>,
}

impl ScheduleSnapshot {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty() && self.standings.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Min,
    Low,
    Default,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Min => "min",
            Priority::Low => "low",
            Priority::Default => "default",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

/// A push notification, built per send and never stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub title: String,
    pub body: String,
    pub priority: Priority,
    pub tags: Vec<String>,
    pub click: Option<String>,
}
