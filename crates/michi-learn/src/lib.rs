//! Project learnings aggregated from captured sessions, and context injection

mod digest;
mod inject;
mod learnings;

pub use digest::{error_key, parse_summary, SessionDigest, ERROR_KEY_CHARS};
pub use inject::{build_context, format_for_hook, recent_summaries};
pub use learnings::{
    aggregate, extract_learnings, load_session_digests, write_learnings, Learnings,
};
