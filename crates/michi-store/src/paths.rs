//! Path resolution for the capture store and the assistant's session logs

use crate::StoreError;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Overrides the store root (default `~/.michi-context`)
pub const BASE_DIR_ENV: &str = "MICHI_CONTEXT_HOME";
/// Overrides the assistant data root (default `~/.claude`)
pub const CLAUDE_DIR_ENV: &str = "MICHI_CLAUDE_HOME";

/// Filename suffix shared by every rendered session summary
pub const SUMMARY_SUFFIX: &str = "_session.md";

/// Resolves standard paths for the store and the session logs it reads
#[derive(Debug, Clone)]
pub struct Paths {
    pub base_dir: PathBuf,
    pub claude_dir: PathBuf,
}

impl Paths {
    /// Resolve from the home directory, honoring the environment overrides
    pub fn new() -> Result<Self, StoreError> {
        let home = dirs::home_dir().ok_or(StoreError::HomeNotFound)?;

        let base_dir = std::env::var_os(BASE_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".michi-context"));
        let claude_dir = std::env::var_os(CLAUDE_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".claude"));

        Ok(Self {
            base_dir,
            claude_dir,
        })
    }

    pub fn with_roots(base_dir: impl Into<PathBuf>, claude_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            claude_dir: claude_dir.into(),
        }
    }

    pub fn sessions_root(&self) -> PathBuf {
        self.base_dir.join("sessions")
    }

    pub fn sessions_dir(&self, project: &str) -> PathBuf {
        self.sessions_root().join(project)
    }

    pub fn learnings_dir(&self) -> PathBuf {
        self.base_dir.join("learnings")
    }

    pub fn learnings_file(&self, project: &str) -> PathBuf {
        self.learnings_dir().join(format!("{}.md", project))
    }

    pub fn state_file(&self) -> PathBuf {
        self.base_dir.join(".state.json")
    }

    pub fn lock_file(&self) -> PathBuf {
        self.base_dir.join(".state.lock")
    }

    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn claude_projects_dir(&self) -> PathBuf {
        self.claude_dir.join("projects")
    }

    /// Directory holding the session logs recorded while working in `cwd`
    pub fn claude_project_dir(&self, cwd: &Path) -> PathBuf {
        self.claude_projects_dir().join(project_key(cwd))
    }

    /// Session logs for `cwd`, newest modification first
    pub fn find_session_logs(&self, cwd: &Path) -> Vec<PathBuf> {
        list_session_logs(&self.claude_project_dir(cwd))
    }
}

/// `*.jsonl` files directly inside `dir`, newest modification first
pub fn list_session_logs(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return Vec::new(),
    };

    let mut logs: Vec<(SystemTime, PathBuf)> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("jsonl"))
        .filter_map(|path| {
            let modified = std::fs::metadata(&path).ok()?.modified().ok()?;
            path.is_file().then_some((modified, path))
        })
        .collect();

    logs.sort_by(|a, b| b.0.cmp(&a.0));
    logs.into_iter().map(|(_, path)| path).collect()
}

/// Absolute form of a project path; canonical when it exists on disk
pub fn resolve_project_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = std::fs::canonicalize(path) {
        return canonical;
    }
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

/// Filesystem-safe key the assistant uses for a project's log directory
pub fn project_key(path: &Path) -> String {
    resolve_project_path(path)
        .to_string_lossy()
        .replace(['/', '.'], "-")
}

/// Human-readable project name: the last component of the resolved path
pub fn project_name(path: &Path) -> String {
    resolve_project_path(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Structured sidecar stored next to a rendered summary
pub fn sidecar_path(summary: &Path) -> PathBuf {
    summary.with_extension("json")
}
