//! Script output.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{ArrayError, ArrayResult};
use crate::template::RenderedScript;

/// Owner read, write and execute. Nothing for group or other.
pub const SCRIPT_MODE: u32 = 0o700;

/// Write `script` to `path` and make it executable by its owner.
///
/// The script is staged in a temporary file next to `path` and renamed into
/// place once it is complete and executable, so a failed run never leaves a
/// partial or non-executable file at `path`.
pub fn write_script(path: &Path, script: &RenderedScript) -> ArrayResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(dir).map_err(|e| ArrayError::io(dir, e))?;
    staged
        .write_all(script.as_bytes())
        .map_err(|e| ArrayError::io(staged.path(), e))?;
    staged
        .flush()
        .map_err(|e| ArrayError::io(staged.path(), e))?;

    make_executable(staged.as_file(), staged.path())?;

    staged
        .persist(path)
        .map_err(|e| ArrayError::io(path, e.error))?;

    debug!(
        path = %path.display(),
        bytes = script.as_bytes().len(),
        "wrote array script"
    );
    Ok(())
}

#[cfg(unix)]
fn make_executable(file: &std::fs::File, path: &Path) -> ArrayResult<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(std::fs::Permissions::from_mode(SCRIPT_MODE))
        .map_err(|e| ArrayError::io(path, e))
}

#[cfg(not(unix))]
fn make_executable(_file: &std::fs::File, _path: &Path) -> ArrayResult<()> {
    Ok(())
}
