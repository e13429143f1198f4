//! Global logging for the compiler
//!
//! `init_global_logging` installs one process-wide `LoggingService` and an
//! `ErrorCollector`. Before that call every macro is a no-op, so library users
//! and unit tests can compile MGol without any logging setup. Events logged
//! while a file is being compiled carry its path and, when they are errors or
//! warnings, are collected for the cargo-style report.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use collector::{ErrorCollector, FileProcessingContext, ProcessingSummary};
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, FileLogger, Logger, LoggingService, MemoryLogger, MultiLogger};

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();
static GLOBAL_ERROR_COLLECTOR: OnceLock<ErrorCollector> = OnceLock::new();

thread_local! {
    static FILE_CONTEXT: RefCell<Option<FileProcessingContext>> = const { RefCell::new(None) };
}

/// Codes whose metadata the reports depend on
const REQUIRED_CODES: [Code; 5] = [
    codes::system::INTERNAL_ERROR,
    codes::lexical::INVALID_WORD,
    codes::syntax::UNEXPECTED_TOKEN,
    codes::semantic::UNDECLARED_IDENTIFIER,
    codes::file_processing::FILE_NOT_FOUND,
];

/// Install the logger described by the runtime preferences
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    if let Some(code) = REQUIRED_CODES
        .iter()
        .find(|code| codes::get_error_metadata(code.as_str()).is_none())
    {
        return Err(format!("Missing metadata for error code: {}", code));
    }

    let sinks = service::create_configured_multi_logger()?;
    let service = Arc::new(LoggingService::new(Arc::new(sinks), config::get_min_log_level()));
    init_global_logging_with_service(service.clone())?;

    service.log_success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    );
    Ok(())
}

/// Install a caller-built service, e.g. one writing to a `MemoryLogger`
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())?;
    GLOBAL_ERROR_COLLECTOR
        .set(ErrorCollector::new())
        .map_err(|_| "Global error collector already initialized".to_string())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(Arc::as_ref)
}

pub fn try_get_global_error_collector() -> Option<&'static ErrorCollector> {
    GLOBAL_ERROR_COLLECTOR.get()
}

/// Would an event at `level` reach a sink right now
pub fn enabled(level: LogLevel) -> bool {
    try_get_global_logger().is_some_and(|logger| logger.should_log(level))
}

pub fn set_file_context(file_path: PathBuf) {
    FILE_CONTEXT.with(|ctx| *ctx.borrow_mut() = Some(FileProcessingContext::new(file_path)));
}

pub fn clear_file_context() {
    FILE_CONTEXT.with(|ctx| *ctx.borrow_mut() = None);
}

/// Run `f` with `file_path` as this thread's file context
pub fn with_file_context<F, R>(file_path: PathBuf, f: F) -> R
where
    F: FnOnce() -> R,
{
    set_file_context(file_path);
    let result = f();
    clear_file_context();
    result
}

pub fn get_current_file_context() -> Option<FileProcessingContext> {
    FILE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// Backs the logging macros
pub fn emit(mut event: LogEvent, context: Vec<(&str, String)>) {
    for (key, value) in context {
        event = event.with_context(key, value);
    }

    let file = get_current_file_context().map(|ctx| ctx.file_path);
    if let Some(path) = &file {
        event = event.with_file_path(path.display().to_string());
    }

    if let (Some(path), Some(collector)) = (&file, try_get_global_error_collector()) {
        if event.is_error() || event.is_warning() {
            collector.record_event(path, event.clone());
        }
    }

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

/// Print the collected diagnostics cargo-style, if that output is enabled
pub fn print_cargo_style_summary() {
    if !config::use_cargo_style_output() {
        return;
    }

    if let Some(collector) = try_get_global_error_collector() {
        let report = collector.render_report();
        if !report.is_empty() {
            eprint!("{}", report);
        }
    }
}

pub fn get_system_diagnostics() -> String {
    let mut lines = vec![
        "=== Logging System Diagnostics ===".to_string(),
        format!("Initialized: {}", is_initialized()),
    ];

    if let Some(collector) = try_get_global_error_collector() {
        let summary = collector.get_summary();
        lines.push(format!(
            "Collected events: {}/{}",
            collector.total_event_count(),
            crate::config::compile_time::logging::LOG_BUFFER_SIZE
        ));
        lines.push(format!("Files with events: {}", summary.total_files));
        lines.push(format!("Total errors: {}", summary.total_errors));
        lines.push(format!("Total warnings: {}", summary.total_warnings));
    }

    lines.push(String::new());
    lines.push(config::get_config_summary());
    lines.join("\n")
}
