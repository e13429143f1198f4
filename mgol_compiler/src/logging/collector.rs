//! Errors and warnings grouped by source file, for the end-of-run report

use super::events::LogEvent;
use crate::config::compile_time::logging::MAX_LOG_EVENTS_PER_FILE;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The file this thread is compiling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProcessingContext {
    pub file_path: PathBuf,
}

impl FileProcessingContext {
    pub fn new(file_path: PathBuf) -> Self {
        Self { file_path }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingSummary {
    pub total_files: usize,
    pub failed_files: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
}

#[derive(Debug, Default)]
struct FileLog {
    events: Vec<LogEvent>,
    /// Events past `MAX_LOG_EVENTS_PER_FILE`
    dropped: usize,
}

impl FileLog {
    fn errors(&self) -> usize {
        self.events.iter().filter(|e| e.is_error()).count()
    }

    fn warnings(&self) -> usize {
        self.events.iter().filter(|e| e.is_warning()).count()
    }
}

#[derive(Debug, Default)]
pub struct ErrorCollector {
    files: Mutex<BTreeMap<PathBuf, FileLog>>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn files(&self) -> MutexGuard<'_, BTreeMap<PathBuf, FileLog>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Keeps at most `MAX_LOG_EVENTS_PER_FILE` per file and counts the rest
    pub fn record_event(&self, file_path: &Path, event: LogEvent) {
        let mut files = self.files();
        let log = files.entry(file_path.to_path_buf()).or_default();
        if log.events.len() < MAX_LOG_EVENTS_PER_FILE {
            log.events.push(event);
        } else {
            log.dropped += 1;
        }
    }

    pub fn get_file_events(&self, file_path: &Path) -> Vec<LogEvent> {
        self.files()
            .get(file_path)
            .map(|log| log.events.clone())
            .unwrap_or_default()
    }

    pub fn total_event_count(&self) -> usize {
        self.files().values().map(|log| log.events.len()).sum()
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        self.files()
            .values()
            .fold(ProcessingSummary::default(), |mut summary, log| {
                let errors = log.errors();
                summary.total_files += 1;
                summary.failed_files += usize::from(errors > 0);
                summary.total_errors += errors;
                summary.total_warnings += log.warnings();
                summary
            })
    }

    /// Cargo-like `error[CODE]: message` blocks per file, then totals
    pub fn render_report(&self) -> String {
        let mut out = String::new();

        for (path, log) in self.files().iter() {
            let reported: Vec<&LogEvent> = log
                .events
                .iter()
                .filter(|e| e.is_error() || e.is_warning())
                .collect();
            if reported.is_empty() {
                continue;
            }

            let _ = writeln!(out, "Checking {}...", path.display());
            for event in reported {
                write_event(&mut out, path, event);
            }
            if log.dropped > 0 {
                let _ = writeln!(out, "note: {} more events not shown", log.dropped);
            }
            out.push('\n');
        }

        let summary = self.get_summary();
        if summary.total_errors > 0 {
            let _ = writeln!(out, "Total errors: {}", summary.total_errors);
        }
        if summary.total_warnings > 0 {
            let _ = writeln!(out, "Total warnings: {}", summary.total_warnings);
        }
        out
    }
}

fn write_event(out: &mut String, path: &Path, event: &LogEvent) {
    let kind = if event.is_error() { "error" } else { "warning" };
    let _ = writeln!(out, "{}[{}]: {}", kind, event.code, event.message);

    if let Some(span) = &event.span {
        let _ = writeln!(out, "  --> {}:{}", path.display(), span.start());
    }

    for (key, value) in event.context.iter().filter(|(key, _)| *key != "file_path") {
        let _ = writeln!(out, "  = {}: {}", key, value);
    }

    if let Some(metadata) = event.metadata().filter(|_| event.is_error()) {
        let _ = writeln!(out, "  = help: {}", metadata.recommended_action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use crate::utils::{Position, Span};

    #[test]
    fn test_events_are_grouped_by_file() {
        let collector = ErrorCollector::new();
        let path = PathBuf::from("prog.mgol");

        collector.record_event(
            &path,
            LogEvent::error(codes::semantic::UNDECLARED_IDENTIFIER, "Variable 'X' not declared"),
        );

        assert_eq!(collector.get_file_events(&path).len(), 1);
        assert!(collector.get_file_events(Path::new("other.mgol")).is_empty());
        assert_eq!(collector.total_event_count(), 1);
    }

    #[test]
    fn test_summary_counts() {
        let collector = ErrorCollector::new();

        collector.record_event(
            Path::new("a.mgol"),
            LogEvent::error(codes::lexical::INVALID_WORD, "Invalid word"),
        );
        collector.record_event(Path::new("b.mgol"), LogEvent::warning("Odd input"));

        assert_eq!(
            collector.get_summary(),
            ProcessingSummary {
                total_files: 2,
                failed_files: 1,
                total_errors: 1,
                total_warnings: 1,
            }
        );
    }

    #[test]
    fn test_per_file_limit_counts_dropped_events() {
        let collector = ErrorCollector::new();
        let path = PathBuf::from("big.mgol");

        for _ in 0..MAX_LOG_EVENTS_PER_FILE + 5 {
            collector.record_event(
                &path,
                LogEvent::error(codes::syntax::UNEXPECTED_TOKEN, "Unexpected"),
            );
        }

        assert_eq!(collector.get_file_events(&path).len(), MAX_LOG_EVENTS_PER_FILE);
        assert!(collector.render_report().contains("note: 5 more events not shown"));
    }

    #[test]
    fn test_report_layout() {
        let collector = ErrorCollector::new();

        collector.record_event(
            Path::new("prog.mgol"),
            LogEvent::error(codes::syntax::MISSING_SEMICOLON, "Missing ';' before 'fim'")
                .with_span(Span::single(Position::new(20, 4, 9)))
                .with_context("found", "fim")
                .with_file_path("prog.mgol"),
        );

        let report = collector.render_report();
        assert!(report.starts_with("Checking prog.mgol...\n"));
        assert!(report.contains("error[E048]: Missing ';' before 'fim'"));
        assert!(report.contains("--> prog.mgol:4:9"));
        assert!(report.contains("= found: fim"));
        assert!(!report.contains("= file_path"));
        assert!(report.contains("= help: Terminate the statement with ';'"));
        assert!(report.ends_with("Total errors: 1\n"));
    }
}
