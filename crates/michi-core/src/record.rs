//! Reconstructed view of one session

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Error excerpts are cut to this many characters
pub const ERROR_EXCERPT_CHARS: usize = 200;

const SHORT_ID_CHARS: usize = 8;

/// File operation kinds recognized from tool invocations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOp {
    Read,
    Write,
    Edit,
}

impl FileOp {
    pub fn from_tool_name(name: &str) -> Option<Self> {
        match name {
            "Read" => Some(FileOp::Read),
            "Write" => Some(FileOp::Write),
            "Edit" => Some(FileOp::Edit),
            _ => None,
        }
    }

    /// Verb used in the rendered "Actions Taken" section
    pub fn label(self) -> &'static str {
        match self {
            FileOp::Read => "Read",
            FileOp::Edit => "Edited",
            FileOp::Write => "Created",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    #[serde(default)]
    pub git_branch: Option<String>,
    #[serde(default)]
    pub working_directory: Option<String>,
    #[serde(default)]
    pub first_timestamp: Option<String>,
    #[serde(default)]
    pub last_timestamp: Option<String>,
    #[serde(default)]
    pub user_prompts: Vec<String>,
    #[serde(default)]
    pub files_read: BTreeSet<String>,
    #[serde(default)]
    pub files_written: BTreeSet<String>,
    #[serde(default)]
    pub files_edited: BTreeSet<String>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl SessionRecord {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            ..Default::default()
        }
    }

    pub fn short_id(&self) -> &str {
        short_id(&self.session_id)
    }

    pub fn has_prompts(&self) -> bool {
        !self.user_prompts.is_empty()
    }

    pub fn files_for(&self, op: FileOp) -> &BTreeSet<String> {
        match op {
            FileOp::Read => &self.files_read,
            FileOp::Write => &self.files_written,
            FileOp::Edit => &self.files_edited,
        }
    }

    pub fn add_file(&mut self, op: FileOp, path: String) {
        let target = match op {
            FileOp::Read => &mut self.files_read,
            FileOp::Write => &mut self.files_written,
            FileOp::Edit => &mut self.files_edited,
        };
        target.insert(path);
    }

    /// Written and edited paths, sorted and deduplicated
    pub fn files_modified(&self) -> Vec<&str> {
        self.files_written
            .union(&self.files_edited)
            .map(String::as_str)
            .collect()
    }

    /// Project name derived from the working directory
    pub fn project_name(&self) -> String {
        self.working_directory
            .as_deref()
            .and_then(|cwd| Path::new(cwd).file_name())
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// `<date>_<short id>_session.md`, dated by the first event or `now`
    ///
    /// A first timestamp that does not start with a `YYYY-MM-DD` date is
    /// treated as absent.
    pub fn summary_file_name(&self, now: DateTime<Utc>) -> String {
        let date = self
            .first_timestamp
            .as_deref()
            .and_then(|ts| NaiveDate::parse_from_str(truncate_chars(ts, 10), "%Y-%m-%d").ok())
            .unwrap_or_else(|| now.date_naive());
        format!("{}_{}_session.md", date.format("%Y-%m-%d"), self.short_id())
    }
}

/// First eight characters of a session id
pub fn short_id(session_id: &str) -> &str {
    truncate_chars(session_id, SHORT_ID_CHARS)
}

/// Prefix of `text` holding at most `max` characters
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
