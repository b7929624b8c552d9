//! Markdown summary document for a captured session

use crate::{truncate_chars, FileOp, SessionRecord, ERROR_EXCERPT_CHARS};

/// Agent label written into every summary's metadata block
pub const AGENT_LABEL: &str = "claude-code";

/// Prompts are flattened to one line and cut to this many characters
pub const PROMPT_EXCERPT_CHARS: usize = 200;

/// Render a session as a metadata block followed by fixed body sections
pub fn render_summary(record: &SessionRecord) -> String {
    let mut lines = vec!["---".to_string()];

    lines.push(format!("id: {}", record.short_id()));
    lines.push(format!("agent: {}", AGENT_LABEL));
    lines.push(format!("project: {}", record.project_name()));
    lines.push(format!(
        "directory: {}",
        record.working_directory.as_deref().unwrap_or("")
    ));
    lines.push(format!(
        "timestamp: {}",
        record.first_timestamp.as_deref().unwrap_or("unknown")
    ));
    lines.push(format!(
        "git_branch: {}",
        record.git_branch.as_deref().unwrap_or("unknown")
    ));

    let modified = record.files_modified();
    if !modified.is_empty() {
        lines.push(format!("files_modified: [{}]", modified.join(", ")));
    }

    lines.push("---".to_string());
    lines.push(String::new());

    if record.has_prompts() {
        lines.push("## User Prompts".to_string());
        for (i, prompt) in record.user_prompts.iter().enumerate() {
            lines.push(format!("{}. {}", i + 1, flatten_prompt(prompt)));
        }
        lines.push(String::new());
    }

    let actions: Vec<String> = [FileOp::Read, FileOp::Edit, FileOp::Write]
        .into_iter()
        .flat_map(|op| {
            record
                .files_for(op)
                .iter()
                .map(move |path| format!("- {} {}", op.label(), path))
        })
        .collect();
    if !actions.is_empty() {
        lines.push("## Actions Taken".to_string());
        lines.extend(actions);
        lines.push(String::new());
    }

    lines.push("## Errors".to_string());
    if record.errors.is_empty() {
        lines.push("- (none)".to_string());
    } else {
        for error in &record.errors {
            lines.push(format!("- {}", flatten_error(error)));
        }
    }
    lines.push(String::new());

    lines.join("\n")
}

/// One-line prompt excerpt as it appears in the "User Prompts" list
pub fn flatten_prompt(prompt: &str) -> String {
    truncate_chars(prompt, PROMPT_EXCERPT_CHARS).replace('\n', " ")
}

/// One-line error excerpt as it appears in the "Errors" list
pub fn flatten_error(error: &str) -> String {
    truncate_chars(error, ERROR_EXCERPT_CHARS).replace(['\r', '\n'], " ")
}
