//! Write-to-temp + rename file replacement.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::errors::{TimerError, TimerResult};

/// Atomically replace `path` with `contents`.
///
/// The temporary file is created in the destination directory so the final
/// rename stays on one filesystem. Readers observe either the old file or
/// the new one, never a partial write.
pub fn atomic_write(path: &Path, contents: &[u8]) -> TimerResult<()> {
    let write_err = |reason: String| TimerError::FileWriteError {
        path: path.display().to_string(),
        reason,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| write_err(e.to_string()))?;
    tmp.write_all(contents)
        .map_err(|e| write_err(e.to_string()))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| write_err(e.to_string()))?;
    tmp.persist(path).map_err(|e| write_err(e.error.to_string()))?;

    Ok(())
}
