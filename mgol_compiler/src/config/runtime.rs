//! Runtime preferences
//!
//! Every field defaults from an `MGOL_*` environment variable, and a TOML
//! preferences file overrides any subset of them.

use crate::config::compile_time::syntax::MAX_STACK_DEPTH;
use crate::logging::events::LogLevel as EventLevel;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

/// Parsed value of `name`, or `default` when unset or unparsable
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProcessorPreferences {
    /// Whether to reject inputs without the .mgol extension
    pub require_mgol_extension: bool,

    /// Whether to log file size and line statistics
    pub enable_performance_logging: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_mgol_extension: env_or(env_vars::REQUIRE_MGOL_EXTENSION, false),
            enable_performance_logging: env_or(env_vars::ENABLE_PERFORMANCE_LOGGING, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalPreferences {
    /// Whether to count tokens per class
    pub collect_detailed_metrics: bool,

    /// Whether to include the offending lexeme in error messages
    pub include_lexeme_in_errors: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            collect_detailed_metrics: env_or(env_vars::LEXICAL_DETAILED_METRICS, true),
            include_lexeme_in_errors: env_or(env_vars::LEXICAL_INCLUDE_LEXEME, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntaxPreferences {
    /// Parser state stack capacity, capped by the compile-time limit
    pub stack_capacity: usize,

    /// Whether to trace every shift and reduce at debug level
    pub trace_actions: bool,
}

impl Default for SyntaxPreferences {
    fn default() -> Self {
        Self {
            stack_capacity: env_or(env_vars::SYNTAX_STACK_CAPACITY, MAX_STACK_DEPTH),
            trace_actions: env_or(env_vars::SYNTAX_TRACE_ACTIONS, false),
        }
    }
}

impl SyntaxPreferences {
    /// Stack capacity clamped to `1..=MAX_STACK_DEPTH`
    pub fn effective_stack_capacity(&self) -> usize {
        self.stack_capacity.clamp(1, MAX_STACK_DEPTH)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenPreferences {
    /// Default path for generated C code when none is given
    pub default_output: String,

    /// Whether to write output even when only lexical errors were reported
    pub emit_on_lexical_errors: bool,
}

impl Default for CodegenPreferences {
    fn default() -> Self {
        Self {
            default_output: env::var(env_vars::CODEGEN_DEFAULT_OUTPUT)
                .unwrap_or_else(|_| "output.c".to_string()),
            emit_on_lexical_errors: env_or(env_vars::CODEGEN_EMIT_ON_LEXICAL_ERRORS, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Minimum level that reaches the configured sink
    pub min_log_level: LogLevel,

    /// Whether to print cargo-style diagnostics at the end of a run
    pub enable_cargo_style_output: bool,

    /// Append log events to this file as well
    pub log_file: Option<String>,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_or(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_or(env_vars::LOGGING_ENABLE_CONSOLE, false),
            min_log_level: env_or(env_vars::LOGGING_MIN_LEVEL, LogLevel::Info),
            enable_cargo_style_output: env_or(env_vars::LOGGING_CARGO_STYLE, true),
            log_file: env::var(env_vars::LOGGING_FILE).ok().filter(|v| !v.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn to_events_log_level(self) -> EventLevel {
        match self {
            LogLevel::Error => EventLevel::Error,
            LogLevel::Warning => EventLevel::Warning,
            LogLevel::Info => EventLevel::Info,
            LogLevel::Debug => EventLevel::Debug,
        }
    }
}

/// Accepts names case-insensitively, `warn`, or the numeric rank
impl FromStr for LogLevel {
    type Err = String;

    fn from_str(level: &str) -> Result<Self, Self::Err> {
        match level.to_ascii_lowercase().as_str() {
            "error" | "0" => Ok(LogLevel::Error),
            "warning" | "warn" | "1" => Ok(LogLevel::Warning),
            "info" | "2" => Ok(LogLevel::Info),
            "debug" | "3" => Ok(LogLevel::Debug),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub lexical: LexicalPreferences,
    pub syntax: SyntaxPreferences,
    pub codegen: CodegenPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse preferences from TOML text; absent keys fall back to environment defaults
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content, &path.display().to_string())
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // File Processor
    pub const REQUIRE_MGOL_EXTENSION: &str = "MGOL_REQUIRE_MGOL_EXTENSION";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "MGOL_ENABLE_PERFORMANCE_LOGGING";

    // Lexical
    pub const LEXICAL_DETAILED_METRICS: &str = "MGOL_LEXICAL_DETAILED_METRICS";
    pub const LEXICAL_INCLUDE_LEXEME: &str = "MGOL_LEXICAL_INCLUDE_LEXEME";

    // Syntax
    pub const SYNTAX_STACK_CAPACITY: &str = "MGOL_SYNTAX_STACK_CAPACITY";
    pub const SYNTAX_TRACE_ACTIONS: &str = "MGOL_SYNTAX_TRACE_ACTIONS";

    // Codegen
    pub const CODEGEN_DEFAULT_OUTPUT: &str = "MGOL_CODEGEN_DEFAULT_OUTPUT";
    pub const CODEGEN_EMIT_ON_LEXICAL_ERRORS: &str = "MGOL_CODEGEN_EMIT_ON_LEXICAL_ERRORS";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "MGOL_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "MGOL_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "MGOL_LOGGING_MIN_LEVEL";
    pub const LOGGING_CARGO_STYLE: &str = "MGOL_LOGGING_CARGO_STYLE";
    pub const LOGGING_FILE: &str = "MGOL_LOGGING_FILE";
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("error".parse::<LogLevel>(), Ok(LogLevel::Error));
        assert_eq!("ERROR".parse::<LogLevel>(), Ok(LogLevel::Error));
        assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("1".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("info".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!("3".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = RuntimeConfig::from_toml_str(
            "[syntax]\nstack_capacity = 64\n\n[logging]\nmin_log_level = \"debug\"\n",
            "inline",
        )
        .unwrap();

        assert_eq!(config.syntax.stack_capacity, 64);
        assert_eq!(config.syntax.effective_stack_capacity(), 64);
        assert_eq!(config.logging.min_log_level, LogLevel::Debug);
    }

    #[test]
    fn test_log_file_from_toml() {
        let config = RuntimeConfig::from_toml_str(
            "[logging]\nlog_file = \"build/mgolc.log\"\n",
            "inline",
        )
        .unwrap();
        assert_eq!(config.logging.log_file.as_deref(), Some("build/mgolc.log"));
    }

    #[test]
    fn test_stack_capacity_is_clamped() {
        let prefs = SyntaxPreferences {
            stack_capacity: 0,
            trace_actions: false,
        };
        assert_eq!(prefs.effective_stack_capacity(), 1);
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let result = RuntimeConfig::from_toml_str("[syntax]\nstack_capacity = \"big\"", "inline");
        assert_matches!(result, Err(ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[codegen]\ndefault_output = \"prog.c\"").unwrap();

        let config = RuntimeConfig::load(file.path()).unwrap();
        assert_eq!(config.codegen.default_output, "prog.c");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = RuntimeConfig::load("/definitely/not/here.toml");
        assert_matches!(result, Err(ConfigError::Io { .. }));
    }
}
