//! Log events
//!
//! An event stores only what belongs to one occurrence: time, level, code,
//! message, optional source span and free-form context. Category, severity and
//! advice are looked up from the code registry when the event is rendered.

use super::codes::{self, Code, ErrorMetadata};
use crate::utils::Span;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

const UNCODED_WARNING: Code = Code::new("W000");
const UNCODED_INFO: Code = Code::new("I000");
const UNCODED_DEBUG: Code = Code::new("D000");

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    pub span: Option<Span>,
    pub context: BTreeMap<String, String>,
}

impl LogEvent {
    fn new(level: LogLevel, code: Code, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            code,
            message: message.to_owned(),
            span: None,
            context: BTreeMap::new(),
        }
    }

    pub fn error(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Error, code, message)
    }

    pub fn warning(message: &str) -> Self {
        Self::new(LogLevel::Warning, UNCODED_WARNING, message)
    }

    pub fn info(message: &str) -> Self {
        Self::new(LogLevel::Info, UNCODED_INFO, message)
    }

    /// Info-level milestone identified by one of the `codes::success` codes
    pub fn success(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Info, code, message)
    }

    pub fn debug(message: &str) -> Self {
        Self::new(LogLevel::Debug, UNCODED_DEBUG, message)
    }

    pub fn with_span(self, span: Span) -> Self {
        Self {
            span: Some(span),
            ..self
        }
    }

    pub fn with_context(mut self, key: &str, value: impl Into<String>) -> Self {
        self.context.insert(key.to_owned(), value.into());
        self
    }

    pub fn with_file_path(self, path: impl Into<String>) -> Self {
        self.with_context("file_path", path)
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    /// Registry entry for the code; uncoded events have none
    pub fn metadata(&self) -> Option<&'static ErrorMetadata> {
        codes::get_error_metadata(self.code.as_str())
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.code.as_str())
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.code.as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.code.as_str())
    }

    /// `[LEVEL] CODE - message`, plus ` at line:col` when located
    pub fn format(&self) -> String {
        self.to_string()
    }

    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&JsonEvent::from(self))
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} - {}", self.level, self.code, self.message)?;
        match &self.span {
            Some(span) => write!(f, " at {}:{}", span.start().line, span.start().column),
            None => Ok(()),
        }
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    timestamp: String,
    level: &'static str,
    code: &'static str,
    message: &'a str,
    category: &'static str,
    severity: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_metadata: Option<JsonMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    span: Option<JsonSpan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a BTreeMap<String, String>>,
}

#[derive(Serialize)]
struct JsonMetadata {
    recoverable: bool,
    requires_halt: bool,
    description: &'static str,
    recommended_action: &'static str,
}

#[derive(Serialize)]
struct JsonSpan {
    start_line: u32,
    start_column: u32,
    end_line: u32,
    end_column: u32,
}

impl<'a> From<&'a LogEvent> for JsonEvent<'a> {
    fn from(event: &'a LogEvent) -> Self {
        let code = event.code.as_str();
        let error_metadata = event.is_error().then(|| JsonMetadata {
            recoverable: codes::is_recoverable(code),
            requires_halt: codes::requires_halt(code),
            description: codes::get_description(code),
            recommended_action: codes::get_action(code),
        });
        let span = event.span.as_ref().map(|span| JsonSpan {
            start_line: span.start().line,
            start_column: span.start().column,
            end_line: span.end().line,
            end_column: span.end().column,
        });

        Self {
            timestamp: event.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            level: event.level.as_str(),
            code,
            message: &event.message,
            category: codes::get_category(code),
            severity: codes::get_severity(code).as_str(),
            error_metadata,
            span,
            context: (!event.context.is_empty()).then_some(&event.context),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;

    #[test]
    fn test_error_event_metadata() {
        let event = LogEvent::error(codes::lexical::INVALID_NUMBER, "Invalid number '1.'");

        assert!(event.is_error());
        assert_eq!(event.code.as_str(), "E020");
        assert_eq!(event.category(), "Lexical");
        assert!(event.metadata().unwrap().recoverable);
    }

    #[test]
    fn test_success_is_info_level() {
        let event = LogEvent::success(codes::success::PARSE_ACCEPTED, "Accepted");

        assert_eq!(event.level, LogLevel::Info);
        assert_eq!(event.code.as_str(), "I040");
        assert!(!event.requires_halt());
    }

    #[test]
    fn test_uncoded_events_have_no_metadata() {
        assert!(LogEvent::warning("odd").metadata().is_none());
        assert_eq!(LogEvent::debug("shift 4").category(), "Unknown");
    }

    #[test]
    fn test_plain_format_with_span() {
        let event = LogEvent::error(codes::syntax::MISSING_SEMICOLON, "Missing ';'")
            .with_span(Span::single(Position::new(12, 3, 7)));

        assert_eq!(event.format(), "[ERROR] E048 - Missing ';' at 3:7");
    }

    #[test]
    fn test_json_format() {
        let event = LogEvent::error(codes::file_processing::PERMISSION_DENIED, "Access denied")
            .with_context("file", "prog.mgol");

        let json: serde_json::Value =
            serde_json::from_str(&event.format_json().unwrap()).unwrap();
        assert_eq!(json["level"], "ERROR");
        assert_eq!(json["code"], "E009");
        assert_eq!(json["context"]["file"], "prog.mgol");
        assert_eq!(json["error_metadata"]["requires_halt"], true);
        assert!(json.get("span").is_none());
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_json_omits_error_metadata_for_info() {
        let event = LogEvent::info("Compiling");
        let json: serde_json::Value =
            serde_json::from_str(&event.format_json().unwrap()).unwrap();

        assert!(json.get("error_metadata").is_none());
        assert!(json.get("context").is_none());
    }
}
