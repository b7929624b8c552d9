//! Persistent capture index and project registry

use crate::{atomic_write, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Index entry for one captured `(project, session)` pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedSession {
    /// Source log modification time seen at capture (seconds since epoch)
    pub mtime: f64,
    /// Rendered summary written for this capture
    pub file: PathBuf,
    pub captured_at: DateTime<Utc>,
}

/// Registered project: display name plus resolved absolute path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    pub path: PathBuf,
}

/// The whole state document (`.state.json`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub captured_sessions: BTreeMap<String, CapturedSession>,
    #[serde(default)]
    pub project_map: BTreeMap<String, ProjectEntry>,
}

impl State {
    pub fn capture_key(project: &str, session_id: &str) -> String {
        format!("{}:{}", project, session_id)
    }

    pub fn recorded_mtime(&self, project: &str, session_id: &str) -> Option<f64> {
        self.captured_sessions
            .get(&Self::capture_key(project, session_id))
            .map(|entry| entry.mtime)
    }

    /// True when the log has not changed since it was last captured
    pub fn is_current(&self, project: &str, session_id: &str, mtime: f64) -> bool {
        self.recorded_mtime(project, session_id) == Some(mtime)
    }

    /// Upsert the index entry for a capture
    pub fn record_capture(&mut self, project: &str, session_id: &str, entry: CapturedSession) {
        self.captured_sessions
            .insert(Self::capture_key(project, session_id), entry);
    }

    /// Drop index entries pointing at any of `files`; returns how many went
    pub fn forget_files(&mut self, files: &HashSet<PathBuf>) -> usize {
        let before = self.captured_sessions.len();
        self.captured_sessions
            .retain(|_, entry| !files.contains(&entry.file));
        before - self.captured_sessions.len()
    }

    /// Read a state document; a missing file is an empty state
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content).map_err(|source| StoreError::CorruptState {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self)?;
        atomic_write(path, json.as_bytes())?;
        Ok(())
    }
}
