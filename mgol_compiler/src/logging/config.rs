//! Logging settings
//!
//! Buffer sizes come from the build profile. Everything else comes from the
//! `[logging]` preferences installed once at startup, or from their defaults
//! when nothing was installed.

use super::events::LogLevel;
use crate::config::compile_time::logging::{
    LOG_BUFFER_SIZE, MAX_LOG_EVENTS_PER_FILE, SECURITY_MIN_LOG_LEVEL,
};
use crate::config::runtime::LoggingPreferences;
use std::sync::OnceLock;

static PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// First call wins
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime preferences already initialized".to_string())
}

fn read<R>(f: impl FnOnce(&LoggingPreferences) -> R) -> R {
    match PREFERENCES.get() {
        Some(preferences) => f(preferences),
        None => f(&LoggingPreferences::default()),
    }
}

/// Least detailed level the build profile allows
pub fn get_floor_log_level() -> LogLevel {
    match SECURITY_MIN_LOG_LEVEL {
        0 => LogLevel::Error,
        1 => LogLevel::Warning,
        _ => LogLevel::Info,
    }
}

/// The requested level, raised to the build floor when it asks for less
pub fn get_min_log_level() -> LogLevel {
    let requested = read(|p| p.min_log_level.to_events_log_level());
    requested.max(get_floor_log_level())
}

pub fn use_structured_logging() -> bool {
    read(|p| p.use_structured_logging)
}

pub fn use_console_logging() -> bool {
    read(|p| p.enable_console_logging)
}

pub fn use_cargo_style_output() -> bool {
    read(|p| p.enable_cargo_style_output)
}

pub fn log_file() -> Option<String> {
    read(|p| p.log_file.clone())
}

pub fn get_error_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

pub fn validate_config() -> Result<(), String> {
    match LOG_BUFFER_SIZE {
        size if size < 100 => Err(format!("Log buffer size too small: {}", size)),
        size if size > 100_000 => Err(format!("Log buffer size too large: {}", size)),
        size if MAX_LOG_EVENTS_PER_FILE > size => Err(format!(
            "Per-file event limit {} exceeds the log buffer size {}",
            MAX_LOG_EVENTS_PER_FILE, size
        )),
        _ => Ok(()),
    }
}

pub fn get_config_summary() -> String {
    let (structured, console, cargo_style, file) = read(|p| {
        (
            p.use_structured_logging,
            p.enable_console_logging,
            p.enable_cargo_style_output,
            p.log_file.clone().unwrap_or_else(|| "none".to_string()),
        )
    });

    [
        "Logging Configuration:".to_string(),
        format!(" - Log buffer size: {}", LOG_BUFFER_SIZE),
        format!(" - Max events per file: {}", MAX_LOG_EVENTS_PER_FILE),
        format!(" - Level floor: {}", get_floor_log_level()),
        format!(" - Min log level: {}", get_min_log_level()),
        format!(" - Structured logging: {}", structured),
        format!(" - Console logging: {}", console),
        format!(" - Cargo-style output: {}", cargo_style),
        format!(" - Log file: {}", file),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_limits_are_consistent() {
        assert!(validate_config().is_ok());
        assert_eq!(get_error_buffer_size(), LOG_BUFFER_SIZE);
    }

    #[test]
    fn test_min_level_never_below_floor() {
        assert!(get_min_log_level() >= get_floor_log_level());
    }

    #[test]
    fn test_summary_lists_limits() {
        let summary = get_config_summary();
        assert!(summary.starts_with("Logging Configuration:"));
        assert!(summary.contains(&format!("Log buffer size: {}", LOG_BUFFER_SIZE)));
        assert!(summary.contains("Level floor"));
    }
}
