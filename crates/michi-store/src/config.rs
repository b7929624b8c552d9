//! Tunables for capture, learning, injection and the daemon loop

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Summaries older than this many days are pruned
    pub max_age_days: u32,

    /// Seconds between daemon cycles
    pub daemon_interval_secs: u64,

    /// Daemon skips logs modified less than this many seconds ago
    pub settle_secs: u64,

    /// Recent summaries included in the injected context
    pub inject_session_limit: usize,

    /// Entries kept per frequency table in the learnings digest
    pub top_n: usize,

    /// Prompts retained project-wide by the digest
    pub recent_prompt_limit: usize,

    /// Prompts shown under "Recent Work"
    pub recent_work_limit: usize,
}

impl Config {
    pub fn new() -> Self {
        Self {
            max_age_days: 30,
            daemon_interval_secs: 1800,
            settle_secs: 300,
            inject_session_limit: 5,
            top_n: 10,
            recent_prompt_limit: 20,
            recent_work_limit: 10,
        }
    }

    /// Load `config.json`; missing or unreadable files fall back to defaults
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Self::new(),
        };

        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring invalid config {}: {}", path.display(), e);
                Self::new()
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_defaults() {
        let config = Config::new();
        assert_eq!(config.max_age_days, 30);
        assert_eq!(config.daemon_interval_secs, 1800);
        assert_eq!(config.settle_secs, 300);
        assert_eq!(config.inject_session_limit, 5);
    }

    #[test]
    fn test_load_partial_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, r#"{"max_age_days": 7, "top_n": 3}"#).unwrap();

        let config = Config::load(&path);
        assert_eq!(config.max_age_days, 7);
        assert_eq!(config.top_n, 3);
        assert_eq!(config.daemon_interval_secs, 1800);
    }

    #[test]
    fn test_load_missing_or_invalid_config() {
        let temp = TempDir::new().unwrap();
        assert_eq!(Config::load(&temp.path().join("absent.json")), Config::new());

        let path = temp.path().join("config.json");
        std::fs::write(&path, "max_age_days = 7").unwrap();
        assert_eq!(Config::load(&path), Config::new());
    }
}
