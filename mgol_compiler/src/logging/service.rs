//! Logging service and its sinks
//!
//! Console output is either one human-readable line or one JSON object per
//! event. A log file, when configured, receives the same rendering in append
//! mode. Sinks never fail the compilation: write errors are dropped.

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

fn render(event: &LogEvent, structured: bool) -> String {
    if structured {
        event.format_json().unwrap_or_else(|_| event.format())
    } else {
        event.format()
    }
}

/// Level-filtered front door to a sink
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { logger, min_level }
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.logger.log(&event);
        }
    }

    pub fn log_success(&self, code: Code, message: &str) {
        self.log_event(LogEvent::success(code, message));
    }
}

/// Errors go to stderr, everything else to stdout
pub struct ConsoleLogger {
    structured: bool,
}

impl ConsoleLogger {
    pub fn new(structured: bool) -> Self {
        Self { structured }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        let line = render(event, self.structured);
        if event.is_error() {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

/// Appends every event to one file
pub struct FileLogger {
    file: Mutex<File>,
    structured: bool,
}

impl FileLogger {
    pub fn open<P: AsRef<Path>>(path: P, structured: bool) -> std::io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
            structured,
        })
    }
}

impl Logger for FileLogger {
    fn log(&self, event: &LogEvent) {
        let line = render(event, self.structured);
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(file, "{}", line);
    }
}

/// Keeps the most recent events, up to the log buffer size
#[derive(Default)]
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    fn events(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_events(&self) -> Vec<LogEvent> {
        self.events().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events().len()
    }

    pub fn has_code(&self, code: Code) -> bool {
        self.events().iter().any(|e| e.code == code)
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = self.events();
        let capacity = config::get_error_buffer_size();
        if events.len() >= capacity {
            let excess = events.len() + 1 - capacity;
            events.drain(..excess);
        }
        events.push(event.clone());
    }
}

/// Fans events out to several sinks
#[derive(Default)]
pub struct MultiLogger {
    loggers: Vec<Arc<dyn Logger>>,
}

impl MultiLogger {
    pub fn add_logger(&mut self, logger: Arc<dyn Logger>) {
        self.loggers.push(logger);
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }
}

impl Logger for MultiLogger {
    fn log(&self, event: &LogEvent) {
        for logger in &self.loggers {
            logger.log(event);
        }
    }
}

/// Sinks selected by the runtime preferences
pub fn create_configured_multi_logger() -> Result<MultiLogger, String> {
    let structured = config::use_structured_logging();
    let mut multi_logger = MultiLogger::default();

    if config::use_console_logging() {
        multi_logger.add_logger(Arc::new(ConsoleLogger::new(structured)));
    }

    if let Some(path) = config::log_file() {
        let file_logger = FileLogger::open(&path, structured)
            .map_err(|e| format!("Cannot open log file {}: {}", path, e))?;
        multi_logger.add_logger(Arc::new(file_logger));
    }

    Ok(multi_logger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_service_filters_by_level() {
        let memory = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(memory.clone(), LogLevel::Warning);

        service.log_event(LogEvent::debug("reduce 19"));
        service.log_success(codes::success::PARSE_ACCEPTED, "accepted");
        service.log_event(LogEvent::error(codes::syntax::MISSING_SEMICOLON, "Missing ';'"));

        assert_eq!(memory.event_count(), 1);
        assert!(memory.has_code(codes::syntax::MISSING_SEMICOLON));
        assert!(!memory.has_code(codes::success::PARSE_ACCEPTED));
    }

    #[test]
    fn test_multi_logger_fans_out() {
        let first = Arc::new(MemoryLogger::new());
        let second = Arc::new(MemoryLogger::new());
        let mut multi = MultiLogger::default();
        multi.add_logger(first.clone());
        multi.add_logger(second.clone());

        multi.log(&LogEvent::info("Compiling soma.mgol"));

        assert_eq!(first.event_count(), 1);
        assert_eq!(second.get_events()[0].message, "Compiling soma.mgol");
    }

    #[test]
    fn test_file_logger_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("mgolc.log");

        let logger = FileLogger::open(&path, true).unwrap();
        logger.log(&LogEvent::success(codes::success::PARSE_ACCEPTED, "accepted"));
        logger.log(&LogEvent::error(codes::semantic::UNDECLARED_IDENTIFIER, "X"));

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"code\":\"I040\""));
        assert!(lines[1].contains("\"category\":\"Semantic\""));
    }

    #[test]
    fn test_plain_rendering() {
        let event = LogEvent::error(codes::lexical::INVALID_WORD, "Invalid word '@'");
        assert_eq!(render(&event, false), "[ERROR] E023 - Invalid word '@'");
    }
}
