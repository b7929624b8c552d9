//! Per-session input to the learnings aggregation
//!
//! Captures store a structured sidecar next to each summary; summaries
//! written before sidecars existed are re-read from their markdown.

use michi_core::{flatten_error, flatten_prompt, SessionRecord};
use regex::Regex;
use std::sync::OnceLock;

/// Error texts are grouped by their first this-many characters
pub const ERROR_KEY_CHARS: usize = 100;

static FRONTMATTER_RE: OnceLock<Regex> = OnceLock::new();
static FILES_MODIFIED_RE: OnceLock<Regex> = OnceLock::new();
static ORDINAL_RE: OnceLock<Regex> = OnceLock::new();

/// What one session contributes to the learnings digest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionDigest {
    pub modified_files: Vec<String>,
    pub errors: Vec<String>,
    pub prompts: Vec<String>,
}

impl SessionDigest {
    pub fn from_record(record: &SessionRecord) -> Self {
        Self {
            modified_files: record
                .files_modified()
                .into_iter()
                .map(str::to_string)
                .collect(),
            errors: record.errors.iter().map(|e| error_key(e)).collect(),
            prompts: record
                .user_prompts
                .iter()
                .map(|p| flatten_prompt(p).trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }
}

/// Grouping key for an error excerpt: flattened to one line, trimmed and shortened
pub fn error_key(error: &str) -> String {
    let flat = flatten_error(error);
    michi_core::truncate_chars(flat.trim(), ERROR_KEY_CHARS).to_string()
}

/// Recover a digest from a rendered summary document
pub fn parse_summary(doc: &str) -> SessionDigest {
    let mut digest = SessionDigest::default();

    let frontmatter_re =
        FRONTMATTER_RE.get_or_init(|| Regex::new(r"(?s)\A---\n(.*?)\n---").unwrap());
    let files_re =
        FILES_MODIFIED_RE.get_or_init(|| Regex::new(r"files_modified:\s*\[(.+?)\]").unwrap());
    let ordinal_re = ORDINAL_RE.get_or_init(|| Regex::new(r"^\d+\.\s").unwrap());

    if let Some(frontmatter) = frontmatter_re.captures(doc) {
        if let Some(files) = files_re.captures(&frontmatter[1]) {
            digest.modified_files = files[1]
                .split(',')
                .map(|f| f.trim().to_string())
                .collect();
        }
    }

    let mut section: Option<&str> = None;
    for line in doc.split('\n') {
        if let Some(header) = line.strip_prefix("## ") {
            section = Some(header.trim());
            continue;
        }

        match section {
            Some("Errors") => {
                if let Some(error) = line.strip_prefix("- ") {
                    if error.trim() != "(none)" {
                        digest.errors.push(error_key(error));
                    }
                }
            }
            Some("User Prompts") => {
                if ordinal_re.is_match(line) {
                    let prompt = ordinal_re.replace(line, "").trim().to_string();
                    if !prompt.is_empty() {
                        digest.prompts.push(prompt);
                    }
                }
            }
            _ => {}
        }
    }

    digest
}
