use michi_core::{CaptureOutcome, Capturer, SessionParser};
use michi_store::Store;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::warn;

/// What a capture run over one project found
#[derive(Debug, PartialEq)]
pub(crate) enum CaptureRun {
    /// The assistant has no logs for the project
    NoLogs,
    /// Logs exist but none matches the requested id
    NoMatch,
    /// Summaries written during this run
    Captured(Vec<PathBuf>),
}

pub fn run(session_id: Option<&str>, project: Option<&Path>) -> anyhow::Result<ExitCode> {
    let (store, _config) = super::open_store()?;
    let cwd = super::project_path(project)?;

    match capture_project(&store, SessionParser::from_home_dir(), &cwd, session_id)? {
        CaptureRun::NoLogs => {
            eprintln!("No session files found for {}", cwd.display());
            Ok(ExitCode::FAILURE)
        }
        CaptureRun::NoMatch => {
            eprintln!("No session matching {}", session_id.unwrap_or_default());
            Ok(ExitCode::FAILURE)
        }
        CaptureRun::Captured(paths) if paths.is_empty() => {
            eprintln!("No new sessions to capture");
            Ok(ExitCode::SUCCESS)
        }
        CaptureRun::Captured(paths) => {
            for path in &paths {
                println!("Captured: {}", path.display());
            }
            println!("\nCaptured {} session(s)", paths.len());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Capture every log of the project at `cwd`, optionally narrowed to ids containing `session_id`
pub(crate) fn capture_project(
    store: &Store,
    parser: SessionParser,
    cwd: &Path,
    session_id: Option<&str>,
) -> anyhow::Result<CaptureRun> {
    let project = store.register_project(cwd)?;

    let mut logs = store.paths().find_session_logs(cwd);
    if logs.is_empty() {
        return Ok(CaptureRun::NoLogs);
    }
    if let Some(id) = session_id {
        logs.retain(|log| {
            log.file_stem()
                .is_some_and(|stem| stem.to_string_lossy().contains(id))
        });
        if logs.is_empty() {
            return Ok(CaptureRun::NoMatch);
        }
    }

    let capturer = Capturer::new(store, parser);
    let mut captured = Vec::new();
    for log in &logs {
        match capturer.capture(log, &project.name) {
            Ok(CaptureOutcome::Captured(path)) => captured.push(path),
            Ok(_) => {}
            Err(e) => warn!("Skipping {}: {:#}", log.display(), e),
        }
    }
    Ok(CaptureRun::Captured(captured))
}
