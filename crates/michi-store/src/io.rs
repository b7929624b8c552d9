//! Atomic file operations

use std::io::Write;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Write data atomically using a temp sibling + rename
///
/// The temporary file lives in the target's directory so the final rename
/// never crosses a filesystem. It is removed if any step fails.
pub fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut temp = tempfile::Builder::new()
        .prefix(".michi-")
        .suffix(".tmp")
        .tempfile_in(parent)?;
    temp.write_all(data)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Modification time as fractional seconds since the Unix epoch
pub fn modified_secs(path: &Path) -> std::io::Result<f64> {
    let modified = std::fs::metadata(path)?.modified()?;
    let since_epoch = modified
        .duration_since(UNIX_EPOCH)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    Ok(since_epoch.as_secs_f64())
}
