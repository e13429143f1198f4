//! Source file validation and loading

use crate::config::compile_time::file_processing::{MAX_FILE_SIZE, MAX_LINE_COUNT};
use crate::config::runtime::FileProcessorPreferences;
use crate::lexical::ByteSource;
use crate::logging::codes::{self, Code};
use crate::{log_debug, log_error, log_success};
use std::fs;
use std::io::{self, Cursor, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

pub const MGOL_EXTENSION: &str = "mgol";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file extension: expected .mgol, found {extension:?}")]
    InvalidExtension { extension: Option<String> },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("File is empty")]
    EmptyFile,

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("I/O error reading file: {message}")]
    IoError { message: String },

    #[error("Not a regular file: {path}")]
    InvalidPath { path: String },

    #[error("File has {lines} lines (max: {max_lines})")]
    TooManyLines { lines: usize, max_lines: usize },
}

impl FileProcessorError {
    pub fn error_code(&self) -> Code {
        use codes::file_processing::*;
        match self {
            Self::FileNotFound { .. } => FILE_NOT_FOUND,
            Self::InvalidExtension { .. } => INVALID_EXTENSION,
            Self::FileTooLarge { .. } => FILE_TOO_LARGE,
            Self::EmptyFile => EMPTY_FILE,
            Self::PermissionDenied { .. } => PERMISSION_DENIED,
            Self::IoError { .. } => IO_ERROR,
            Self::InvalidPath { .. } => INVALID_PATH,
            Self::TooManyLines { .. } => TOO_MANY_LINES,
        }
    }

    fn io(error: io::Error, path: &Path) -> Self {
        let path = path.display().to_string();
        match error.kind() {
            ErrorKind::NotFound => Self::FileNotFound { path },
            ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::IoError {
                message: format!("{}: {}", path, error),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// Canonical path
    pub path: PathBuf,
    pub size: u64,
    /// Lowercased
    pub extension: Option<String>,
    pub line_count: usize,
    pub is_mgol_file: bool,
    pub modified: Option<SystemTime>,
}

/// A validated source file, read fully into memory
#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    pub contents: Vec<u8>,
    pub metadata: FileMetadata,
    pub processing_duration: Duration,
}

impl FileProcessingResult {
    pub fn into_source(self) -> ByteSource<Cursor<Vec<u8>>> {
        ByteSource::new(Cursor::new(self.contents))
    }
}

/// Extension and logging switches on top of the compile-time size and line limits
#[derive(Debug, Clone)]
pub struct FileProcessor {
    pub require_mgol_extension: bool,
    pub enable_performance_logging: bool,
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl FileProcessor {
    pub fn new() -> Self {
        Self {
            require_mgol_extension: false,
            enable_performance_logging: true,
        }
    }

    pub fn from_preferences(prefs: &FileProcessorPreferences) -> Self {
        Self {
            require_mgol_extension: prefs.require_mgol_extension,
            enable_performance_logging: prefs.enable_performance_logging,
        }
    }

    pub fn with_mgol_extension_required(self, required: bool) -> Self {
        Self {
            require_mgol_extension: required,
            ..self
        }
    }

    pub fn with_performance_logging(self, enabled: bool) -> Self {
        Self {
            enable_performance_logging: enabled,
            ..self
        }
    }

    /// Checks run cheapest first: path, then size and extension, then line count
    pub fn process_file<P: AsRef<Path>>(
        &self,
        file_path: P,
    ) -> Result<FileProcessingResult, FileProcessorError> {
        let started = Instant::now();
        let file_path = file_path.as_ref();
        let shown = file_path.display().to_string();
        log_debug!("Loading source file", "file" => &shown);

        let path = resolve(file_path).map_err(|e| reject(e, &shown))?;
        let mut metadata = read_metadata(&path).map_err(|e| reject(e, &shown))?;
        self.check_metadata(&metadata).map_err(|e| reject(e, &shown))?;

        let contents = fs::read(&path).map_err(|e| reject(FileProcessorError::io(e, &path), &shown))?;
        metadata.line_count = count_lines(&contents);
        if metadata.line_count > MAX_LINE_COUNT {
            return Err(reject(
                FileProcessorError::TooManyLines {
                    lines: metadata.line_count,
                    max_lines: MAX_LINE_COUNT,
                },
                &shown,
            ));
        }

        let result = FileProcessingResult {
            contents,
            metadata,
            processing_duration: started.elapsed(),
        };

        if self.enable_performance_logging {
            log_success!(codes::success::FILE_PROCESSING_SUCCESS, "Source file loaded",
                "file" => &shown,
                "bytes" => result.metadata.size,
                "lines" => result.metadata.line_count,
                "duration_ms" => format!("{:.2}", result.processing_duration.as_secs_f64() * 1000.0)
            );
        } else {
            log_success!(codes::success::FILE_PROCESSING_SUCCESS, "Source file loaded", "file" => &shown);
        }

        Ok(result)
    }

    fn check_metadata(&self, metadata: &FileMetadata) -> Result<(), FileProcessorError> {
        if metadata.size > MAX_FILE_SIZE {
            return Err(FileProcessorError::FileTooLarge {
                size: metadata.size,
                max_size: MAX_FILE_SIZE,
            });
        }
        if metadata.size == 0 {
            return Err(FileProcessorError::EmptyFile);
        }
        if self.require_mgol_extension && !metadata.is_mgol_file {
            return Err(FileProcessorError::InvalidExtension {
                extension: metadata.extension.clone(),
            });
        }
        Ok(())
    }
}

fn reject(error: FileProcessorError, file: &str) -> FileProcessorError {
    log_error!(error.error_code(), &error.to_string(), "file" => file);
    error
}

fn resolve(file_path: &Path) -> Result<PathBuf, FileProcessorError> {
    let shown = || file_path.display().to_string();

    if file_path.as_os_str().is_empty() {
        return Err(FileProcessorError::InvalidPath { path: shown() });
    }
    if !file_path.exists() {
        return Err(FileProcessorError::FileNotFound { path: shown() });
    }
    if !file_path.is_file() {
        return Err(FileProcessorError::InvalidPath { path: shown() });
    }
    file_path
        .canonicalize()
        .map_err(|e| FileProcessorError::io(e, file_path))
}

fn read_metadata(path: &Path) -> Result<FileMetadata, FileProcessorError> {
    let stat = fs::metadata(path).map_err(|e| FileProcessorError::io(e, path))?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    Ok(FileMetadata {
        path: path.to_path_buf(),
        size: stat.len(),
        is_mgol_file: extension.as_deref() == Some(MGOL_EXTENSION),
        extension,
        line_count: 0,
        modified: stat.modified().ok(),
    })
}

/// Lines as the scanner counts them; a last line without `\n` still counts
fn count_lines(contents: &[u8]) -> usize {
    let newlines = contents.iter().filter(|&&byte| byte == b'\n').count();
    match contents.last() {
        Some(b'\n') | None => newlines,
        Some(_) => newlines + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::CharSource;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn test_process_valid_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("prog.mgol");
        fs::write(&file_path, "inicio\nvarinicio varfim;\nfim").unwrap();

        let result = FileProcessor::new()
            .with_performance_logging(false)
            .process_file(&file_path)
            .unwrap();

        assert_eq!(result.metadata.line_count, 3);
        assert!(result.metadata.is_mgol_file);
        assert_eq!(result.metadata.size, 28);
        assert!(result.metadata.modified.is_some());

        let mut source = result.into_source();
        assert_eq!(source.read_byte().unwrap(), Some(b'i'));
    }

    #[test]
    fn test_file_not_found() {
        let dir = tempdir().unwrap();
        let result = FileProcessor::new().process_file(dir.path().join("missing.mgol"));
        assert_matches!(result, Err(FileProcessorError::FileNotFound { .. }));
    }

    #[test]
    fn test_empty_path_and_directory_are_rejected() {
        let dir = tempdir().unwrap();
        assert_matches!(
            FileProcessor::new().process_file(dir.path()),
            Err(FileProcessorError::InvalidPath { .. })
        );
        assert_matches!(
            FileProcessor::new().process_file(""),
            Err(FileProcessorError::InvalidPath { .. })
        );
    }

    #[test]
    fn test_empty_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("empty.mgol");
        fs::write(&file_path, "").unwrap();

        let result = FileProcessor::new().process_file(&file_path);
        assert_matches!(result, Err(FileProcessorError::EmptyFile));
    }

    #[test]
    fn test_extension_requirement() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("prog.TXT");
        fs::write(&file_path, "inicio varinicio varfim; fim").unwrap();

        let lenient = FileProcessor::new().process_file(&file_path).unwrap();
        assert!(!lenient.metadata.is_mgol_file);

        let strict = FileProcessor::new()
            .with_mgol_extension_required(true)
            .process_file(&file_path);
        assert_matches!(
            strict,
            Err(FileProcessorError::InvalidExtension { extension: Some(ref ext) }) if ext == "txt"
        );
    }

    #[test]
    fn test_compile_time_file_size_limit() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("large.mgol");
        fs::write(&file_path, vec![b' '; (MAX_FILE_SIZE + 1) as usize]).unwrap();

        let result = FileProcessor::new().process_file(&file_path);
        assert_matches!(
            result,
            Err(FileProcessorError::FileTooLarge { size, max_size })
                if size == MAX_FILE_SIZE + 1 && max_size == MAX_FILE_SIZE
        );
    }

    #[test]
    fn test_line_counting() {
        assert_eq!(count_lines(b""), 0);
        assert_eq!(count_lines(b"fim"), 1);
        assert_eq!(count_lines(b"fim\n"), 1);
        assert_eq!(count_lines(b"a\n\nb"), 3);
    }

    #[test]
    fn test_io_errors_map_to_variants() {
        let path = Path::new("prog.mgol");
        assert_matches!(
            FileProcessorError::io(io::Error::from(ErrorKind::PermissionDenied), path),
            FileProcessorError::PermissionDenied { .. }
        );
        assert_eq!(
            FileProcessorError::io(io::Error::from(ErrorKind::Interrupted), path).error_code(),
            codes::file_processing::IO_ERROR
        );
    }
}
