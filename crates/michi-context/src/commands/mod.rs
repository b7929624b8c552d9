pub mod capture;
pub mod daemon;
pub mod inject;
pub mod learn;
pub mod prune;
pub mod status;

use michi_store::{Config, Paths, Store};
use std::path::{Path, PathBuf};

/// Open the store at its standard location along with its configuration
pub fn open_store() -> anyhow::Result<(Store, Config)> {
    let paths = Paths::new()?;
    let config = Config::load(&paths.config_file());
    Ok((Store::open(paths)?, config))
}

/// Explicit `--project` path, or the current directory
pub fn project_path(project: Option<&Path>) -> anyhow::Result<PathBuf> {
    match project {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(std::env::current_dir()?),
    }
}
