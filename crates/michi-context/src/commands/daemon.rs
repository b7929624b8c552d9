use michi_core::{CaptureOutcome, Capturer, SessionParser};
use michi_learn::{extract_learnings, write_learnings};
use michi_store::{list_session_logs, modified_secs, prune_old_sessions, Config, Store};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info, warn};

/// What one daemon cycle did
#[derive(Debug, Default)]
pub(crate) struct TickSummary {
    pub captured: Vec<PathBuf>,
    pub learned: Vec<String>,
    pub pruned: usize,
}

pub fn run(interval: Option<u64>) -> anyhow::Result<ExitCode> {
    let (store, config) = super::open_store()?;
    let interval = Duration::from_secs(interval.unwrap_or(config.daemon_interval_secs));
    let parser = SessionParser::from_home_dir();

    println!(
        "michi-context daemon started (interval={}s)",
        interval.as_secs()
    );
    info!("Daemon started with interval {:?}", interval);

    loop {
        match tick(&store, &config, &parser, SystemTime::now()) {
            Ok(summary) => {
                for path in &summary.captured {
                    println!("Auto-captured: {}", path.display());
                }
                for project in &summary.learned {
                    println!("Updated learnings: {}", project);
                }
                if summary.pruned > 0 {
                    println!("Pruned {} old session(s)", summary.pruned);
                }
            }
            Err(e) => error!("Daemon cycle failed: {:#}", e),
        }
        std::thread::sleep(interval);
    }
}

/// One capture, learn and prune cycle over every registered project
pub(crate) fn tick(
    store: &Store,
    config: &Config,
    parser: &SessionParser,
    now: SystemTime,
) -> anyhow::Result<TickSummary> {
    let mut summary = TickSummary::default();
    let projects_dir = store.paths().claude_projects_dir();
    let state = store.load_state()?;
    let capturer = Capturer::new(store, parser.clone());
    let now_secs = now.duration_since(UNIX_EPOCH)?.as_secs_f64();

    let mut touched = BTreeSet::new();
    for log_dir in log_dirs(&projects_dir) {
        let Some(key) = log_dir.file_name().map(|n| n.to_string_lossy().to_string()) else {
            continue;
        };
        let Some(entry) = state.project_map.get(&key) else {
            debug!("Skipping unregistered log directory {}", key);
            continue;
        };

        for log in list_session_logs(&log_dir) {
            let mtime = match modified_secs(&log) {
                Ok(m) => m,
                Err(e) => {
                    warn!("Cannot stat {}: {}", log.display(), e);
                    continue;
                }
            };
            if now_secs - mtime < config.settle_secs as f64 {
                debug!("{} is still being written", log.display());
                continue;
            }
            let session_id = log
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            if state.is_current(&entry.name, &session_id, mtime) {
                continue;
            }

            match capturer.capture(&log, &entry.name) {
                Ok(CaptureOutcome::Captured(path)) => {
                    info!("Auto-captured {}", path.display());
                    touched.insert(entry.name.clone());
                    summary.captured.push(path);
                }
                Ok(_) => {}
                Err(e) => warn!("Capture of {} failed: {:#}", log.display(), e),
            }
        }
    }

    for project in touched {
        let result = extract_learnings(store, &project, config)
            .and_then(|learnings| write_learnings(store, &project, &learnings, config));
        match result {
            Ok(_) => summary.learned.push(project),
            Err(e) => error!("Learn failed for {}: {:#}", project, e),
        }
    }

    summary.pruned = prune_old_sessions(store, config.max_age_days)?.len();
    Ok(summary)
}

fn log_dirs(projects_dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(projects_dir) {
        Ok(entries) => {
            let mut dirs: Vec<PathBuf> = entries
                .flatten()
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .collect();
            dirs.sort();
            dirs
        }
        Err(_) => Vec::new(),
    }
}
