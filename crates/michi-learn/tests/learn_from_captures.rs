use michi_core::{Capturer, SessionParser};
use michi_learn::{extract_learnings, write_learnings};
use michi_store::{sidecar_path, Config, Paths, Store};
use serde_json::json;
use std::path::{Path, PathBuf};
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

fn write_session(dir: &Path, session_id: &str, day: u32, edits: &[&str], error: Option<&str>) -> PathBuf {
    let mut lines = vec![
        json!({
            "type": "user",
            "sessionId": session_id,
            "timestamp": format!("2025-02-{:02}T09:00:00Z", day),
            "cwd": "/home/u/proj",
            "message": {"content": format!("task for day {}", day)}
        }),
        json!({
            "type": "assistant",
            "sessionId": session_id,
            "message": {"content": edits
                .iter()
                .map(|p| json!({"type": "tool_use", "name": "Edit", "input": {"file_path": p}}))
                .collect::<Vec<_>>()}
        }),
    ];
    if let Some(error) = error {
        lines.push(json!({
            "type": "user",
            "sessionId": session_id,
            "message": {"content": [{"type": "tool_result", "is_error": true, "content": error}]}
        }));
    }

    let path = dir.join(format!("{}.jsonl", session_id));
    let content: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
    std::fs::write(&path, content.join("\n")).unwrap();
    path
}

#[test]
fn test_file_counts_sum_to_session_count() {
    let (temp, store) = setup();
    let capturer = Capturer::new(&store, SessionParser::new(Some(PathBuf::from("/home/u"))));

    let n = 4;
    for day in 1..=n {
        let log = write_session(
            temp.path(),
            &format!("s{:02}-uuid", day),
            day,
            &["/home/u/proj/a.rs", "/home/u/proj/b.rs"],
            None,
        );
        capturer.capture(&log, "proj").unwrap();
    }

    let learnings = extract_learnings(&store, "proj", &Config::new()).unwrap();
    assert_eq!(learnings.session_count, n as usize);
    assert_eq!(
        learnings.frequently_modified_files,
        vec![
            ("~/proj/a.rs".to_string(), n as usize),
            ("~/proj/b.rs".to_string(), n as usize)
        ]
    );
    assert_eq!(learnings.recent_prompts.last().unwrap(), "task for day 4");
}

#[test]
fn test_legacy_summaries_without_sidecar() {
    let (temp, store) = setup();
    let capturer = Capturer::new(&store, SessionParser::new(Some(PathBuf::from("/home/u"))));

    for day in 1..=3 {
        let log = write_session(
            temp.path(),
            &format!("l{:02}-uuid", day),
            day,
            &["/home/u/proj/a.rs"],
            Some("permission denied"),
        );
        let captured = capturer.capture(&log, "proj").unwrap();
        std::fs::remove_file(sidecar_path(captured.path().unwrap())).unwrap();
    }

    let learnings = extract_learnings(&store, "proj", &Config::new()).unwrap();
    assert_eq!(learnings.session_count, 3);
    assert_eq!(
        learnings.frequently_modified_files,
        vec![("~/proj/a.rs".to_string(), 3)]
    );
    assert_eq!(
        learnings.error_patterns,
        vec![("permission denied".to_string(), 3)]
    );
}

#[test]
fn test_write_learnings_document() {
    let (temp, store) = setup();
    let capturer = Capturer::new(&store, SessionParser::new(None));
    let log = write_session(temp.path(), "only-one", 5, &["/srv/x.rs"], Some("boom"));
    capturer.capture(&log, "proj").unwrap();

    let config = Config::new();
    let learnings = extract_learnings(&store, "proj", &config).unwrap();
    let out = write_learnings(&store, "proj", &learnings, &config).unwrap();

    assert_eq!(out, store.paths().learnings_file("proj"));
    let doc = std::fs::read_to_string(out).unwrap();
    assert!(doc.contains("Sessions analyzed: 1"));
    assert!(doc.contains("- /srv/x.rs (1x)"));
    assert!(doc.contains("- [1x] boom"));
    assert!(doc.contains("## Recent Work\n- task for day 5"));
}
