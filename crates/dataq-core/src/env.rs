//! Environment File Loader
//!
//! Loads environment variables from the canonical location
//! `/etc/dataq/environment`, falling back to a local `.env` for development.
//! Call `load_environment()` early in main(), before reading any settings.
//! Variables already present in the process environment are never overridden.

use std::path::Path;
use tracing::{debug, info, warn};

/// Paths to check, in order of priority
pub const ENV_FILE_PATHS: &[&str] = &["/etc/dataq/environment", "/etc/dataq.env", ".env"];

/// Load environment variables from the first environment file found.
///
/// `DATAQ_ENV_FILE` names a custom path and takes priority over the
/// defaults. Returns the path that was loaded, or None if no file exists.
pub fn load_environment() -> Option<String> {
    if let Ok(custom_path) = std::env::var("DATAQ_ENV_FILE") {
        if let Some(path) = try_load_env_file(&custom_path) {
            return Some(path);
        }
        warn!(path = %custom_path, "DATAQ_ENV_FILE set but file not loadable");
    }

    for path in ENV_FILE_PATHS {
        if let Some(loaded) = try_load_env_file(path) {
            return Some(loaded);
        }
    }

    debug!("No environment file found, using existing environment");
    None
}

fn try_load_env_file(path: &str) -> Option<String> {
    if !Path::new(path).is_file() {
        return None;
    }
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path, error = %e, "Failed to read environment file");
            return None;
        }
    };

    let mut loaded = 0usize;
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim().trim_matches('"').trim_matches('\'');
        if std::env::var_os(key).is_none() {
            std::env::set_var(key, value);
            loaded += 1;
        }
    }

    info!(path = %path, loaded, "Loaded environment file");
    Some(path.to_string())
}
