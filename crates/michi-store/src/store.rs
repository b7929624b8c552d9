//! Store handle owning the base directory and the state document

use crate::{
    project_key, project_name, resolve_project_path, Paths, ProjectEntry, State, StateLock,
    StoreError,
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Owns every persisted artifact under the base directory
#[derive(Debug, Clone)]
pub struct Store {
    paths: Paths,
}

impl Store {
    /// Open the store, creating the base directory when needed
    pub fn open(paths: Paths) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&paths.base_dir)?;
        Ok(Self { paths })
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    /// Per-project summary directory, created on demand
    pub fn sessions_dir(&self, project: &str) -> Result<PathBuf, StoreError> {
        let dir = self.paths.sessions_dir(project);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Learnings directory, created on demand
    pub fn learnings_dir(&self) -> Result<PathBuf, StoreError> {
        let dir = self.paths.learnings_dir();
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Snapshot of the state document
    pub fn load_state(&self) -> Result<State, StoreError> {
        State::load(&self.paths.state_file())
    }

    /// Read-modify-write the state document under the exclusive state lock
    pub fn update_state<T>(&self, f: impl FnOnce(&mut State) -> T) -> Result<T, StoreError> {
        let _lock = StateLock::acquire(&self.paths.lock_file())?;
        let mut state = self.load_state()?;
        let result = f(&mut state);
        state.save(&self.paths.state_file())?;
        Ok(result)
    }

    /// Record (or refresh) the name and resolved path of a project
    pub fn register_project(&self, cwd: &Path) -> Result<ProjectEntry, StoreError> {
        let key = project_key(cwd);
        let entry = ProjectEntry {
            name: project_name(cwd),
            path: resolve_project_path(cwd),
        };
        debug!("Registering project {} as {}", entry.name, key);

        let stored = entry.clone();
        self.update_state(move |state| {
            state.project_map.insert(key, stored);
        })?;
        Ok(entry)
    }

    /// Project name registered for a log directory key
    pub fn project_name_for_key(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .load_state()?
            .project_map
            .get(key)
            .map(|entry| entry.name.clone()))
    }
}
