//! CLI argument validation functions
//!
//! Custom value parsers for arguments that clap cannot validate on its own.

use std::fs;
use std::path::PathBuf;

/// Largest accepted `--timeout`, one hour
const MAX_TIMEOUT_SECS: u64 = 3600;

/// Validate that a file path is accessible (exists and is readable)
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("Configuration file does not exist: '{}'", path_str));
    }

    if !path.is_file() {
        return Err(format!("Configuration path is not a file: '{}'", path_str));
    }

    match fs::File::open(&path) {
        Ok(_) => Ok(path),
        Err(e) => Err(format!("Cannot read configuration file '{}': {}", path_str, e)),
    }
}

/// Validate the overall deadline is a positive number of seconds
pub fn validate_timeout(secs_str: &str) -> Result<u64, String> {
    let secs: u64 = secs_str
        .parse()
        .map_err(|_| format!("Timeout must be a positive number of seconds, got: '{}'", secs_str))?;

    if secs == 0 {
        return Err("Timeout must be greater than 0".to_string());
    }

    if secs > MAX_TIMEOUT_SECS {
        return Err(format!("Timeout cannot exceed {} seconds", MAX_TIMEOUT_SECS));
    }

    Ok(secs)
}

/// Validate the notification body is not blank
pub fn validate_message(message: &str) -> Result<String, String> {
    if message.trim().is_empty() {
        return Err("Message cannot be empty".to_string());
    }
    Ok(message.to_string())
}
