//! Context payload handed to a new session: recent summaries plus learnings

use anyhow::Context;
use michi_store::{Store, SUMMARY_SUFFIX};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct HookPayload {
    #[serde(rename = "hookSpecificOutput")]
    hook_specific_output: HookOutput,
}

#[derive(Debug, Serialize)]
struct HookOutput {
    #[serde(rename = "additionalContext")]
    additional_context: String,
}

/// Contents of the `limit` newest summaries of `project`, newest first
pub fn recent_summaries(store: &Store, project: &str, limit: usize) -> anyhow::Result<Vec<String>> {
    let dir = store.paths().sessions_dir(project);
    let mut files: Vec<PathBuf> = match std::fs::read_dir(&dir) {
        Ok(entries) => entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy().ends_with(SUMMARY_SUFFIX))
                    .unwrap_or(false)
            })
            .collect(),
        Err(_) => return Ok(Vec::new()),
    };
    files.sort_by(|a, b| b.file_name().cmp(&a.file_name()));

    files
        .iter()
        .take(limit)
        .map(|path| {
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        })
        .collect()
}

/// Recent summaries followed by the learnings digest, as one text block
pub fn build_context(store: &Store, project: &str, limit: usize) -> anyhow::Result<String> {
    let mut parts = Vec::new();

    let sessions = recent_summaries(store, project, limit)?;
    if !sessions.is_empty() {
        parts.push(format!("# Recent Sessions ({})\n", sessions.len()));
        for (i, session) in sessions.iter().enumerate() {
            parts.push(format!("### Session {}", i + 1));
            parts.push(session.clone());
            parts.push(String::new());
        }
    }

    let learnings_file = store.paths().learnings_file(project);
    if learnings_file.exists() {
        parts.push("# Project Learnings\n".to_string());
        parts.push(
            std::fs::read_to_string(&learnings_file)
                .with_context(|| format!("reading {}", learnings_file.display()))?,
        );
    }

    Ok(parts.join("\n"))
}

/// Hook payload JSON, or `None` when there is no context to inject
pub fn format_for_hook(store: &Store, project: &str, limit: usize) -> anyhow::Result<Option<String>> {
    let context = build_context(store, project, limit)?;
    if context.trim().is_empty() {
        return Ok(None);
    }

    let payload = HookPayload {
        hook_specific_output: HookOutput {
            additional_context: context,
        },
    };
    Ok(Some(serde_json::to_string(&payload)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use michi_store::Paths;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Store) {
        let temp = TempDir::new().unwrap();
        let store = Store::open(Paths::with_roots(
            temp.path().join("base"),
            temp.path().join("claude"),
        ))
        .unwrap();
        (temp, store)
    }

    #[test]
    fn test_no_context_no_payload() {
        let (_temp, store) = setup();
        assert_eq!(format_for_hook(&store, "api", 5).unwrap(), None);
    }

    #[test]
    fn test_recent_summaries_newest_first_and_limited() {
        let (_temp, store) = setup();
        let dir = store.sessions_dir("api").unwrap();
        for day in 1..=7 {
            std::fs::write(
                dir.join(format!("2025-01-0{}_abcdefgh_session.md", day)),
                format!("day {}", day),
            )
            .unwrap();
        }
        std::fs::write(dir.join("2025-01-09_abcdefgh_session.json"), "{}").unwrap();

        let sessions = recent_summaries(&store, "api", 5).unwrap();
        assert_eq!(sessions, vec!["day 7", "day 6", "day 5", "day 4", "day 3"]);
    }

    #[test]
    fn test_payload_contains_sessions_and_learnings() {
        let (_temp, store) = setup();
        let dir = store.sessions_dir("api").unwrap();
        std::fs::write(dir.join("2025-01-01_abcdefgh_session.md"), "summary body").unwrap();
        store.learnings_dir().unwrap();
        std::fs::write(store.paths().learnings_file("api"), "# Learnings: api\n").unwrap();

        let payload = format_for_hook(&store, "api", 5).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        let context = value["hookSpecificOutput"]["additionalContext"]
            .as_str()
            .unwrap();

        assert!(context.starts_with("# Recent Sessions (1)\n\n### Session 1\nsummary body\n"));
        assert!(context.contains("# Project Learnings\n\n# Learnings: api\n"));
    }

    #[test]
    fn test_learnings_only() {
        let (_temp, store) = setup();
        store.learnings_dir().unwrap();
        std::fs::write(store.paths().learnings_file("api"), "digest").unwrap();

        let context = build_context(&store, "api", 5).unwrap();
        assert_eq!(context, "# Project Learnings\n\ndigest");
    }
}
