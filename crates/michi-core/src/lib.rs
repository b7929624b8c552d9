//! Session capture: log parsing, summary rendering and idempotent capture

mod capture;
mod event;
mod parser;
mod record;
mod render;

pub use capture::{CaptureOutcome, Capturer};
pub use event::{
    Content, ContentBlock, Event, EventKind, TextBlock, ToolInput, ToolResultBlock,
    ToolResultContent, ToolResultItem, ToolUseBlock,
};
pub use parser::SessionParser;
pub use record::{short_id, truncate_chars, FileOp, SessionRecord, ERROR_EXCERPT_CHARS};
pub use render::{flatten_error, flatten_prompt, render_summary, AGENT_LABEL, PROMPT_EXCERPT_CHARS};
