use crate::error::MonitorError;
use crate::models::ScheduleSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What gets written to the state file between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredState {
    pub checked_at: DateTime<Utc>,
    pub source_url: String,
    pub snapshot: ScheduleSnapshot,
}

/// Load the previous run's state. A missing file means this is the first run.
pub fn load_state(path: &Path) -> Result<Option<StoredState>, MonitorError> {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no stored snapshot");
            return Ok(None);
        }
        Err(source) => {
            return Err(MonitorError::Storage {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let state = serde_json::from_str(&json).map_err(|source| MonitorError::CorruptState {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(state))
}

/// Replace the state file. The JSON goes to a sibling temp file first and is
/// renamed into place, so readers never see a half-written snapshot.
pub fn save_state(path: &Path, state: &StoredState) -> Result<(), MonitorError> {
    let storage_err = |source| MonitorError::Storage {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_string_pretty(state).map_err(|source| MonitorError::CorruptState {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(storage_err)?;
    }

    let tmp = temp_path(path);
    std::fs::write(&tmp, json).map_err(storage_err)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(storage_err(e));
    }

    debug!(path = %path.display(), matches = state.snapshot.matches.len(), "saved snapshot");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
