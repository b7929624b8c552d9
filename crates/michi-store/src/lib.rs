//! Durable storage for captured session summaries, learnings and capture state

mod config;
mod error;
mod io;
mod lock;
mod paths;
mod prune;
mod state;
mod store;

pub use config::Config;
pub use error::StoreError;
pub use io::{atomic_write, modified_secs};
pub use lock::StateLock;
pub use paths::{
    list_session_logs, project_key, project_name, resolve_project_path, sidecar_path, Paths,
    BASE_DIR_ENV, CLAUDE_DIR_ENV, SUMMARY_SUFFIX,
};
pub use prune::{prune_before, prune_old_sessions};
pub use state::{CapturedSession, ProjectEntry, State};
pub use store::Store;
