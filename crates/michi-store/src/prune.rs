//! Age-based removal of rendered summaries and their index entries

use crate::{sidecar_path, Store, StoreError, SUMMARY_SUFFIX};
use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

static DATE_PREFIX_RE: OnceLock<Regex> = OnceLock::new();

/// Prune summaries dated more than `max_age_days` before now (local time)
pub fn prune_old_sessions(store: &Store, max_age_days: u32) -> Result<Vec<PathBuf>, StoreError> {
    let now = Local::now().naive_local();
    let cutoff = Duration::try_days(i64::from(max_age_days)).and_then(|age| now.checked_sub_signed(age));
    match cutoff {
        Some(cutoff) => prune_before(store, cutoff),
        None => {
            // Older than any representable date: nothing can qualify
            debug!("Max age of {} days reaches past the calendar, nothing to prune", max_age_days);
            Ok(Vec::new())
        }
    }
}

/// Delete every summary whose filename date falls before `cutoff`
///
/// Index entries for deleted summaries are dropped and project directories
/// left empty are removed. A failed deletion does not stop the pass; the
/// first failure is returned once the index reflects what was deleted.
pub fn prune_before(store: &Store, cutoff: NaiveDateTime) -> Result<Vec<PathBuf>, StoreError> {
    let sessions_root = store.paths().sessions_root();
    if !sessions_root.exists() {
        return Ok(Vec::new());
    }

    let mut pruned = Vec::new();
    let mut first_error: Option<std::io::Error> = None;
    for summary in summary_files(&sessions_root)? {
        let Some(date) = summary_date(&summary) else {
            continue;
        };
        if date.and_time(NaiveTime::MIN) >= cutoff {
            continue;
        }

        if let Err(e) = std::fs::remove_file(&summary) {
            warn!("Could not prune {}: {}", summary.display(), e);
            first_error.get_or_insert(e);
            continue;
        }
        let sidecar = sidecar_path(&summary);
        if sidecar.exists() {
            if let Err(e) = std::fs::remove_file(&sidecar) {
                warn!("Could not remove {}: {}", sidecar.display(), e);
                first_error.get_or_insert(e);
            }
        }
        debug!("Pruned {}", summary.display());
        pruned.push(summary);
    }

    if !pruned.is_empty() {
        let gone: HashSet<PathBuf> = pruned.iter().cloned().collect();
        let forgotten = store.update_state(|state| state.forget_files(&gone))?;
        info!(
            "Pruned {} summaries, dropped {} index entries",
            pruned.len(),
            forgotten
        );

        for entry in std::fs::read_dir(&sessions_root)?.flatten() {
            let dir = entry.path();
            if dir.is_dir() && is_empty_dir(&dir) {
                if let Err(e) = std::fs::remove_dir(&dir) {
                    warn!("Could not remove {}: {}", dir.display(), e);
                    first_error.get_or_insert(e);
                }
            }
        }
    }

    match first_error {
        Some(e) => Err(e.into()),
        None => Ok(pruned),
    }
}

fn summary_files(sessions_root: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let mut files = Vec::new();
    for project in std::fs::read_dir(sessions_root)?.flatten() {
        let dir = project.path();
        if !dir.is_dir() {
            continue;
        }
        for entry in std::fs::read_dir(&dir)?.flatten() {
            let path = entry.path();
            let is_summary = path
                .file_name()
                .map(|n| n.to_string_lossy().ends_with(SUMMARY_SUFFIX))
                .unwrap_or(false);
            if is_summary && path.is_file() {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

fn summary_date(path: &Path) -> Option<NaiveDate> {
    let name = path.file_name()?.to_string_lossy();
    let date_re = DATE_PREFIX_RE.get_or_init(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})_").unwrap());
    let captures = date_re.captures(&name)?;
    NaiveDate::parse_from_str(&captures[1], "%Y-%m-%d").ok()
}

fn is_empty_dir(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}
