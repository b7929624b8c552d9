//! Typed view of one line of a session log
//!
//! Lines are decoded in two steps: a loose envelope carrying the shared
//! header fields, then the `message` payload according to the event type.
//! A payload with an unexpected shape degrades to empty content instead of
//! discarding the header fields of its line, and a malformed block degrades
//! to `ContentBlock::Other` without taking its siblings with it.

use serde::{Deserialize, Deserializer};
use tracing::debug;

/// One event from a session log
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub session_id: Option<String>,
    pub timestamp: Option<String>,
    pub git_branch: Option<String>,
    pub cwd: Option<String>,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    User { content: Content },
    Assistant { content: Content },
    Other,
}

/// `message.content`: plain text or a sequence of typed blocks
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Blocks(#[serde(deserialize_with = "lenient_blocks")] Vec<ContentBlock>),
}

impl Default for Content {
    fn default() -> Self {
        Content::Blocks(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text(TextBlock),
    #[serde(rename = "tool_use")]
    ToolUse(ToolUseBlock),
    #[serde(rename = "tool_result")]
    ToolResult(ToolResultBlock),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolUseBlock {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub input: ToolInput,
}

/// The part of a tool invocation's input the capture cares about
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ToolInput {
    #[serde(default)]
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolResultBlock {
    #[serde(default)]
    pub is_error: Option<bool>,
    #[serde(default)]
    pub content: Option<ToolResultContent>,
}

impl ToolResultBlock {
    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    /// Text of the result: the string itself, or each item's text
    pub fn texts(&self) -> Vec<&str> {
        match &self.content {
            Some(ToolResultContent::Text(text)) => vec![text.as_str()],
            Some(ToolResultContent::Items(items)) => items
                .iter()
                .filter_map(|item| item.text.as_deref())
                .collect(),
            None => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ToolResultContent {
    Text(String),
    Items(#[serde(deserialize_with = "lenient_items")] Vec<ToolResultItem>),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolResultItem {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    git_branch: Option<String>,
    #[serde(default)]
    cwd: Option<String>,
    #[serde(default, rename = "type")]
    event_type: Option<String>,
    #[serde(default)]
    message: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct RawMessage {
    #[serde(default)]
    content: Option<Content>,
}

impl Event {
    /// Decode one log line; `None` when the line is not a JSON object
    pub fn parse_line(line: &[u8]) -> Option<Self> {
        let raw: RawEvent = serde_json::from_slice(line).ok()?;

        let kind = match raw.event_type.as_deref() {
            Some("user") => EventKind::User {
                content: decode_content(raw.message),
            },
            Some("assistant") => EventKind::Assistant {
                content: decode_content(raw.message),
            },
            _ => EventKind::Other,
        };

        Some(Self {
            session_id: raw.session_id,
            timestamp: non_empty(raw.timestamp),
            git_branch: non_empty(raw.git_branch),
            cwd: non_empty(raw.cwd),
            kind,
        })
    }
}

fn decode_content(message: Option<serde_json::Value>) -> Content {
    let Some(message) = message else {
        return Content::default();
    };
    match serde_json::from_value::<RawMessage>(message) {
        Ok(m) => m.content.unwrap_or_default(),
        Err(e) => {
            debug!("Unrecognized message shape: {}", e);
            Content::default()
        }
    }
}

fn lenient_blocks<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<ContentBlock>, D::Error> {
    let values = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .map(|value| {
            serde_json::from_value(value).unwrap_or_else(|e| {
                debug!("Unrecognized content block: {}", e);
                ContentBlock::Other
            })
        })
        .collect())
}

fn lenient_items<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<ToolResultItem>, D::Error> {
    let values = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(e) => {
                debug!("Unrecognized tool result item: {}", e);
                None
            }
        })
        .collect())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
