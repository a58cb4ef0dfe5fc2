use std::fs;
use std::path::Path;

use yamss_core::CoreError;

/// Wraps an I/O failure as a `TransportError` -- the core's error taxonomy
/// has no dedicated I/O variant, since writing observer output is the one
/// place outside the co-sim transport that touches the filesystem.
pub fn io_err(e: impl std::fmt::Display) -> CoreError {
    CoreError::TransportError(e.to_string())
}

pub fn ensure_parent_dir(path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    Ok(())
}
