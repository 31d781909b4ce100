use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Writes a raw response body to `<dir>/debug_response_<timestamp>.html`.
///
/// Best effort: failures are logged and swallowed, the check carries on.
pub fn dump_response(dir: &Path, body: &str, at: DateTime<Local>) -> Option<PathBuf> {
    let filename = format!("debug_response_{}.html", at.format("%Y%m%d_%H%M%S"));
    let path = dir.join(filename);

    if let Err(e) = std::fs::create_dir_all(dir) {
        tracing::warn!("Failed to create debug directory {}: {}", dir.display(), e);
        return None;
    }

    match std::fs::write(&path, body) {
        Ok(()) => {
            tracing::info!("Saved raw response to {}", path.display());
            Some(path)
        }
        Err(e) => {
            tracing::warn!("Failed to write debug response {}: {}", path.display(), e);
            None
        }
    }
}
