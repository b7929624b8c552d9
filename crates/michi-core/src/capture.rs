//! Idempotent capture of a session log into a persisted summary

use crate::{render_summary, SessionParser};
use anyhow::Context;
use chrono::Utc;
use michi_store::{atomic_write, modified_secs, sidecar_path, CapturedSession, Store};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result of one capture attempt
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// Summary written (or rewritten) at this path
    Captured(PathBuf),
    /// The log holds no user-authored prompts
    NoPrompts,
    /// The log has not changed since its last capture
    Unchanged,
}

impl CaptureOutcome {
    pub fn path(&self) -> Option<&Path> {
        match self {
            CaptureOutcome::Captured(path) => Some(path),
            _ => None,
        }
    }
}

/// Turns session logs into summaries under a store
pub struct Capturer<'a> {
    store: &'a Store,
    parser: SessionParser,
}

impl<'a> Capturer<'a> {
    pub fn new(store: &'a Store, parser: SessionParser) -> Self {
        Self { store, parser }
    }

    /// Capture `log_path` for `project` unless there is nothing new in it
    pub fn capture(&self, log_path: &Path, project: &str) -> anyhow::Result<CaptureOutcome> {
        // Read before parsing so appends during the parse trigger a recapture
        let mtime = modified_secs(log_path)
            .with_context(|| format!("reading mtime of {}", log_path.display()))?;

        let record = self
            .parser
            .parse_file(log_path)
            .with_context(|| format!("parsing {}", log_path.display()))?;
        if !record.has_prompts() {
            debug!("No user prompts in {}", log_path.display());
            return Ok(CaptureOutcome::NoPrompts);
        }

        let state = self.store.load_state()?;
        if state.is_current(project, &record.session_id, mtime) {
            debug!("Session {} unchanged since last capture", record.session_id);
            return Ok(CaptureOutcome::Unchanged);
        }

        let now = Utc::now();
        let out_path = self
            .store
            .sessions_dir(project)?
            .join(record.summary_file_name(now));

        let sidecar = serde_json::to_string_pretty(&record)?;
        atomic_write(&sidecar_path(&out_path), sidecar.as_bytes())
            .with_context(|| format!("writing {}", sidecar_path(&out_path).display()))?;
        atomic_write(&out_path, render_summary(&record).as_bytes())
            .with_context(|| format!("writing {}", out_path.display()))?;

        let entry = CapturedSession {
            mtime,
            file: out_path.clone(),
            captured_at: now,
        };
        self.store
            .update_state(|state| state.record_capture(project, &record.session_id, entry))?;

        info!(
            "Captured session {} for {} -> {}",
            record.short_id(),
            project,
            out_path.display()
        );
        Ok(CaptureOutcome::Captured(out_path))
    }
}
