//! Streaming reconstruction of a session from its event log

use crate::{
    truncate_chars, Content, ContentBlock, Event, EventKind, FileOp, SessionRecord,
    ERROR_EXCERPT_CHARS,
};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Parses session logs, shortening paths under the caller's home directory
#[derive(Debug, Clone, Default)]
pub struct SessionParser {
    home: Option<String>,
}

impl SessionParser {
    pub fn new(home: Option<PathBuf>) -> Self {
        Self {
            home: home
                .map(|h| h.to_string_lossy().trim_end_matches('/').to_string())
                .filter(|h| !h.is_empty()),
        }
    }

    /// Parser for the current user's home directory
    pub fn from_home_dir() -> Self {
        Self::new(dirs::home_dir())
    }

    /// Parse a log whose file stem is the session id
    pub fn parse_file(&self, path: &Path) -> std::io::Result<SessionRecord> {
        let session_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        self.parse(path, &session_id)
    }

    /// Parse a log, keeping only events that belong to `session_id`
    pub fn parse(&self, path: &Path, session_id: &str) -> std::io::Result<SessionRecord> {
        let file = File::open(path)?;
        self.parse_reader(BufReader::new(file), session_id)
    }

    pub fn parse_reader<R: BufRead>(
        &self,
        reader: R,
        session_id: &str,
    ) -> std::io::Result<SessionRecord> {
        let mut record = SessionRecord::new(session_id);
        let mut skipped = 0usize;

        for line in reader.split(b'\n') {
            let line = line?;
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            let Some(event) = Event::parse_line(&line) else {
                skipped += 1;
                continue;
            };
            if event
                .session_id
                .as_deref()
                .is_some_and(|id| id != session_id)
            {
                continue;
            }
            self.absorb(&mut record, event);
        }

        if skipped > 0 {
            debug!("Skipped {} malformed lines in session {}", skipped, session_id);
        }
        Ok(record)
    }

    /// Replace a leading home directory with `~`
    pub fn shorten_path(&self, path: &str) -> String {
        if let Some(home) = &self.home {
            if let Some(rest) = path.strip_prefix(home.as_str()) {
                if rest.is_empty() || rest.starts_with('/') {
                    return format!("~{}", rest);
                }
            }
        }
        path.to_string()
    }

    fn absorb(&self, record: &mut SessionRecord, event: Event) {
        if let Some(ts) = event.timestamp {
            if record.first_timestamp.is_none() {
                record.first_timestamp = Some(ts.clone());
            }
            record.last_timestamp = Some(ts);
        }
        if record.git_branch.is_none() {
            record.git_branch = event.git_branch;
        }
        if record.working_directory.is_none() {
            record.working_directory = event.cwd;
        }

        match event.kind {
            EventKind::User { content } => self.absorb_user(record, content),
            EventKind::Assistant { content } => self.absorb_assistant(record, content),
            EventKind::Other => {}
        }
    }

    fn absorb_user(&self, record: &mut SessionRecord, content: Content) {
        let blocks = match content {
            Content::Text(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    record.user_prompts.push(text.to_string());
                }
                return;
            }
            Content::Blocks(blocks) => blocks,
        };

        for block in blocks {
            match block {
                ContentBlock::Text(block) => {
                    let text = block.text.trim();
                    // Bracketed text is injected by the assistant, not typed
                    if !text.is_empty() && !text.starts_with('[') {
                        record.user_prompts.push(text.to_string());
                    }
                }
                ContentBlock::ToolResult(result) if result.is_error() => {
                    for text in result.texts() {
                        let excerpt = truncate_chars(text, ERROR_EXCERPT_CHARS);
                        if !excerpt.is_empty() {
                            record.errors.push(excerpt.to_string());
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn absorb_assistant(&self, record: &mut SessionRecord, content: Content) {
        let Content::Blocks(blocks) = content else {
            return;
        };

        for block in blocks {
            let ContentBlock::ToolUse(tool) = block else {
                continue;
            };
            let Some(op) = FileOp::from_tool_name(&tool.name) else {
                continue;
            };
            if let Some(path) = tool.input.file_path.filter(|p| !p.is_empty()) {
                record.add_file(op, self.shorten_path(&path));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parser() -> SessionParser {
        SessionParser::new(Some(PathBuf::from("/home/u")))
    }

    fn log(lines: &[serde_json::Value]) -> String {
        lines
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn parse(lines: &[serde_json::Value]) -> SessionRecord {
        parser()
            .parse_reader(log(lines).as_bytes(), "abc123")
            .unwrap()
    }

    #[test]
    fn test_string_prompt_trimmed() {
        let record = parse(&[
            json!({"type": "user", "sessionId": "abc123", "message": {"content": "  fix the bug \n"}}),
            json!({"type": "user", "sessionId": "abc123", "message": {"content": "   "}}),
        ]);
        assert_eq!(record.user_prompts, vec!["fix the bug"]);
    }

    #[test]
    fn test_text_blocks_skip_bracketed_markers() {
        let record = parse(&[json!({
            "type": "user",
            "sessionId": "abc123",
            "message": {"content": [
                {"type": "text", "text": "[Request interrupted by user]"},
                {"type": "text", "text": " add tests "},
                {"type": "text", "text": ""}
            ]}
        })]);
        assert_eq!(record.user_prompts, vec!["add tests"]);
    }

    #[test]
    fn test_string_prompt_keeps_bracket_prefix() {
        let record = parse(&[
            json!({"type": "user", "sessionId": "abc123", "message": {"content": "[draft] rename it"}}),
        ]);
        assert_eq!(record.user_prompts, vec!["[draft] rename it"]);
    }

    #[test]
    fn test_errors_from_failed_tool_results() {
        let long = "x".repeat(250);
        let record = parse(&[json!({
            "type": "user",
            "sessionId": "abc123",
            "message": {"content": [
                {"type": "tool_result", "is_error": true, "content": long},
                {"type": "tool_result", "is_error": false, "content": "fine"},
                {"type": "tool_result", "content": "also fine"},
                {"type": "tool_result", "is_error": true, "content": [
                    {"type": "text", "text": "No such file"},
                    {"type": "text", "text": "exit 1"}
                ]}
            ]}
        })]);
        assert_eq!(record.errors.len(), 3);
        assert_eq!(record.errors[0].chars().count(), ERROR_EXCERPT_CHARS);
        assert_eq!(record.errors[1], "No such file");
        assert_eq!(record.errors[2], "exit 1");
        assert!(record.user_prompts.is_empty());
    }

    #[test]
    fn test_assistant_file_operations() {
        let record = parse(&[json!({
            "type": "assistant",
            "sessionId": "abc123",
            "message": {"content": [
                {"type": "tool_use", "name": "Read", "input": {"file_path": "/home/u/proj/a.py"}},
                {"type": "tool_use", "name": "Read", "input": {"file_path": "/home/u/proj/a.py"}},
                {"type": "tool_use", "name": "Write", "input": {"file_path": "/tmp/new.txt", "content": "x"}},
                {"type": "tool_use", "name": "Edit", "input": {"file_path": "/home/u/proj/a.py"}},
                {"type": "tool_use", "name": "Bash", "input": {"command": "ls"}},
                {"type": "tool_use", "name": "Grep", "input": {"file_path": "/home/u/ignored"}}
            ]}
        })]);
        assert_eq!(record.files_read.iter().collect::<Vec<_>>(), vec!["~/proj/a.py"]);
        assert_eq!(record.files_written.iter().collect::<Vec<_>>(), vec!["/tmp/new.txt"]);
        assert_eq!(record.files_edited.iter().collect::<Vec<_>>(), vec!["~/proj/a.py"]);
    }

    #[test]
    fn test_malformed_block_does_not_drop_message() {
        let record = parse(&[
            json!({"type": "user", "sessionId": "abc123", "message": {"content": [
                {"text": "no type field"},
                {"type": "text", "text": "real prompt"}
            ]}}),
            json!({"type": "assistant", "sessionId": "abc123", "message": {"content": [
                {"type": "tool_use", "name": "Bash", "input": null},
                {"type": "tool_use", "name": "Read", "input": {"file_path": "/a.py"}}
            ]}}),
            json!({"type": "user", "sessionId": "abc123", "message": {"content": [
                {"type": "tool_result", "is_error": true, "content": [
                    {"type": "text", "text": {"nested": true}},
                    {"type": "text", "text": "permission denied"}
                ]},
                {"type": "text", "text": 42}
            ]}}),
        ]);
        assert_eq!(record.user_prompts, vec!["real prompt"]);
        assert_eq!(record.files_read.iter().collect::<Vec<_>>(), vec!["/a.py"]);
        assert_eq!(record.errors, vec!["permission denied"]);
    }

    #[test]
    fn test_filters_other_sessions_keeps_unlabelled() {
        let record = parse(&[
            json!({"type": "user", "sessionId": "other", "message": {"content": "not mine"}}),
            json!({"type": "user", "message": {"content": "mine, unlabelled"}}),
            json!({"type": "user", "sessionId": "abc123", "message": {"content": "mine"}}),
        ]);
        assert_eq!(record.user_prompts, vec!["mine, unlabelled", "mine"]);
    }

    #[test]
    fn test_metadata_first_wins_last_timestamp_overwrites() {
        let record = parse(&[
            json!({"type": "system", "sessionId": "abc123", "timestamp": "2025-01-01T10:00:00Z"}),
            json!({"type": "user", "sessionId": "abc123", "timestamp": "2025-01-01T10:05:00Z",
                   "gitBranch": "main", "cwd": "/home/u/proj", "message": {"content": "go"}}),
            json!({"type": "user", "sessionId": "abc123", "timestamp": "2025-01-01T11:00:00Z",
                   "gitBranch": "feature", "cwd": "/elsewhere", "message": {"content": "more"}}),
            json!({"type": "user", "sessionId": "other", "timestamp": "2030-01-01T00:00:00Z"}),
        ]);
        assert_eq!(record.first_timestamp.as_deref(), Some("2025-01-01T10:00:00Z"));
        assert_eq!(record.last_timestamp.as_deref(), Some("2025-01-01T11:00:00Z"));
        assert_eq!(record.git_branch.as_deref(), Some("main"));
        assert_eq!(record.working_directory.as_deref(), Some("/home/u/proj"));
    }

    #[test]
    fn test_missing_metadata_is_none() {
        let record = parse(&[json!({"type": "user", "message": {"content": "hi"}})]);
        assert!(record.first_timestamp.is_none());
        assert!(record.git_branch.is_none());
        assert!(record.working_directory.is_none());
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let content = format!(
            "{}\nnot json at all\n{{\"type\": \"user\", \"message\": \n\n{}\n",
            json!({"type": "user", "sessionId": "abc123", "message": {"content": "first"}}),
            json!({"type": "user", "sessionId": "abc123", "message": {"content": "second"}}),
        );
        let record = parser()
            .parse_reader(content.as_bytes(), "abc123")
            .unwrap();
        assert_eq!(record.user_prompts, vec!["first", "second"]);
    }

    #[test]
    fn test_invalid_utf8_line_is_skipped() {
        let mut content = Vec::new();
        content.extend_from_slice(b"{\"type\":\"user\",\"message\":{\"content\":\"\xff\xfe\"}}\n");
        content.extend_from_slice(
            json!({"type": "user", "message": {"content": "ok"}})
                .to_string()
                .as_bytes(),
        );
        let record = parser().parse_reader(content.as_slice(), "abc123").unwrap();
        assert_eq!(record.user_prompts, vec!["ok"]);
    }

    #[test]
    fn test_shorten_path() {
        let parser = parser();
        assert_eq!(parser.shorten_path("/home/u/proj/a.py"), "~/proj/a.py");
        assert_eq!(parser.shorten_path("/home/u"), "~");
        assert_eq!(parser.shorten_path("/home/user2/a.py"), "/home/user2/a.py");
        assert_eq!(parser.shorten_path("/etc/hosts"), "/etc/hosts");

        let no_home = SessionParser::new(None);
        assert_eq!(no_home.shorten_path("/home/u/a.py"), "/home/u/a.py");
    }

    #[test]
    fn test_parse_file_uses_stem_as_session_id() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("abc123.jsonl");
        std::fs::write(
            &path,
            log(&[
                json!({"type": "user", "sessionId": "abc123", "message": {"content": "mine"}}),
                json!({"type": "user", "sessionId": "zzz", "message": {"content": "theirs"}}),
            ]),
        )
        .unwrap();

        let record = parser().parse_file(&path).unwrap();
        assert_eq!(record.session_id, "abc123");
        assert_eq!(record.user_prompts, vec!["mine"]);
    }
}
