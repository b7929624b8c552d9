use michi_store::{Store, SUMMARY_SUFFIX};
use std::path::Path;
use std::process::ExitCode;

/// Counts reported by `status`
#[derive(Debug, Default, PartialEq)]
pub(crate) struct StatusReport {
    pub projects: usize,
    pub summaries: usize,
    pub learnings: usize,
    pub tracked: usize,
    pub summary_bytes: u64,
}

pub fn run() -> anyhow::Result<ExitCode> {
    let (store, _config) = super::open_store()?;
    let report = collect(&store)?;

    println!("michi-context status");
    println!("  Base dir: {}", store.paths().base_dir.display());
    println!("  Projects: {}", report.projects);
    println!("  Sessions captured: {}", report.summaries);
    println!("  Learnings files: {}", report.learnings);
    println!("  Tracked sessions: {}", report.tracked);
    println!("  Disk usage: {:.1} KB", report.summary_bytes as f64 / 1024.0);
    Ok(ExitCode::SUCCESS)
}

pub(crate) fn collect(store: &Store) -> anyhow::Result<StatusReport> {
    let mut report = StatusReport {
        tracked: store.load_state()?.captured_sessions.len(),
        ..StatusReport::default()
    };

    for project_dir in subdirs(&store.paths().sessions_root()) {
        report.projects += 1;
        for entry in std::fs::read_dir(&project_dir)?.flatten() {
            let path = entry.path();
            let is_summary = path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().ends_with(SUMMARY_SUFFIX));
            if is_summary {
                report.summaries += 1;
                report.summary_bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
            }
        }
    }

    if let Ok(entries) = std::fs::read_dir(store.paths().learnings_dir()) {
        report.learnings = entries
            .flatten()
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("md"))
            .count();
    }
    Ok(report)
}

fn subdirs(dir: &Path) -> Vec<std::path::PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect(),
        Err(_) => Vec::new(),
    }
}
