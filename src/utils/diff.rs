use crate::models::{MatchRecord, ScheduleSnapshot, StandingsRecord};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::hash::Hash;

/// A record that can be matched up across snapshots by a natural key
pub trait Keyed {
    type Key: Ord + Hash + Clone;

    fn key(&self) -> Self::Key;

    /// Non-key fields that differ between `self` (older) and `newer`
    fn field_changes(&self, newer: &Self) -> Vec<FieldChange>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: &'static str,
    pub before: String,
    pub after: String,
}

impl FieldChange {
    pub fn format(&self) -> String {
        format!("{}: {} → {}", self.field, self.before, self.after)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordChange<T> {
    pub before: T,
    pub after: T,
    pub fields: Vec<FieldChange>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDiff<T> {
    pub added: Vec<T>,
    pub removed: Vec<T>,
    pub changed: Vec<RecordChange<T>>,
    pub unchanged: Vec<T>,
}

impl<T> Default for RecordDiff<T> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
            changed: Vec::new(),
            unchanged: Vec::new(),
        }
    }
}

impl<T> RecordDiff<T> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiffResult {
    pub matches: RecordDiff<MatchRecord>,
    pub standings: RecordDiff<StandingsRecord>,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty() && self.standings.is_empty()
    }
}

/// Outcome of comparing the stored snapshot (if any) with the fresh one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    /// Nothing stored yet, so there is nothing to diff against
    FirstRun,
    Diff(DiffResult),
}

pub fn compare(previous: Option<&ScheduleSnapshot>, current: &ScheduleSnapshot) -> Comparison {
    match previous {
        Some(previous) => Comparison::Diff(diff_snapshots(previous, current)),
        None => Comparison::FirstRun,
    }
}

pub fn diff_snapshots(previous: &ScheduleSnapshot, current: &ScheduleSnapshot) -> DiffResult {
    DiffResult {
        matches: diff_records(&previous.matches, &current.matches),
        standings: diff_records(&previous.standings, &current.standings),
    }
}

/// Classify records by natural key. Output follows page order: current order for
/// added/changed/unchanged, previous order for removed.
///
/// Records sharing a key (double headers, duplicate rows) are paired identical
/// first, then in page order. Whatever is left over on either side is added or removed.
pub fn diff_records<T: Keyed + Clone>(previous: &[T], current: &[T]) -> RecordDiff<T> {
    let mut old_by_key: BTreeMap<T::Key, Vec<usize>> = BTreeMap::new();
    for (index, record) in previous.iter().enumerate() {
        old_by_key.entry(record.key()).or_default().push(index);
    }

    let mut used = vec![false; previous.len()];
    let mut pairs: Vec<Option<usize>> = vec![None; current.len()];

    for (slot, record) in pairs.iter_mut().zip(current) {
        let candidates = old_by_key.get(&record.key()).map(Vec::as_slice).unwrap_or(&[]);
        *slot = candidates
            .iter()
            .copied()
            .find(|&i| !used[i] && previous[i].field_changes(record).is_empty());
        if let Some(i) = *slot {
            used[i] = true;
        }
    }

    for (slot, record) in pairs.iter_mut().zip(current) {
        if slot.is_some() {
            continue;
        }
        let candidates = old_by_key.get(&record.key()).map(Vec::as_slice).unwrap_or(&[]);
        *slot = candidates.iter().copied().find(|&i| !used[i]);
        if let Some(i) = *slot {
            used[i] = true;
        }
    }

    let mut diff = RecordDiff::default();

    for (record, pair) in current.iter().zip(&pairs) {
        match pair {
            None => diff.added.push(record.clone()),
            Some(i) => {
                let old = &previous[*i];
                let fields = old.field_changes(record);
                if fields.is_empty() {
                    diff.unchanged.push(record.clone());
                } else {
                    diff.changed.push(RecordChange {
                        before: old.clone(),
                        after: record.clone(),
                        fields,
                    });
                }
            }
        }
    }

    diff.removed = previous
        .iter()
        .zip(&used)
        .filter(|(_, used)| !**used)
        .map(|(record, _)| record.clone())
        .collect();

    diff
}

fn text_or_tbd(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "TBD".to_string())
}

fn number_or_dash(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

impl Keyed for MatchRecord {
    type Key = (NaiveDate, String);

    fn key(&self) -> Self::Key {
        self.natural_key()
    }

    fn field_changes(&self, newer: &Self) -> Vec<FieldChange> {
        let mut changes = Vec::new();
        let mut text = |field, before: &Option<String>, after: &Option<String>| {
            if before != after {
                changes.push(FieldChange {
                    field,
                    before: text_or_tbd(before),
                    after: text_or_tbd(after),
                });
            }
        };
        text("Time", &self.time, &newer.time);
        text("Score", &self.score, &newer.score);
        text("Venue", &self.venue, &newer.venue);

        if self.status != newer.status {
            changes.push(FieldChange {
                field: "Status",
                before: self.status.as_str().to_string(),
                after: newer.status.as_str().to_string(),
            });
        }
        if self.side != newer.side {
            changes.push(FieldChange {
                field: "Side",
                before: self.side.as_str().to_string(),
                after: newer.side.as_str().to_string(),
            });
        }
        changes
    }
}

impl Keyed for StandingsRecord {
    type Key = String;

    fn key(&self) -> Self::Key {
        self.team.clone()
    }

    fn field_changes(&self, newer: &Self) -> Vec<FieldChange> {
        [
            ("Position", self.position, newer.position),
            ("Played", self.played, newer.played),
            ("Wins", self.wins, newer.wins),
            ("Draws", self.draws, newer.draws),
            ("Losses", self.losses, newer.losses),
            ("Goals for", self.goals_for, newer.goals_for),
            ("Goals against", self.goals_against, newer.goals_against),
            ("Points", self.points, newer.points),
        ]
        .into_iter()
        .filter(|(_, before, after)| before != after)
        .map(|(field, before, after)| FieldChange {
            field,
            before: number_or_dash(before),
            after: number_or_dash(after),
        })
        .collect()
    }
}
