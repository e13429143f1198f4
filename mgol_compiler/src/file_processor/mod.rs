//! Loads MGol source files under the compile-time size and line limits

mod processor;

use crate::logging::codes;
use std::path::Path;

pub use processor::{
    FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError, MGOL_EXTENSION,
};

/// Load `file_path` with the default processor
pub fn process_file<P: AsRef<Path>>(file_path: P) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::new().process_file(file_path)
}

/// Every error this module can return must have registry metadata
pub fn validate_file_processor_config() -> Result<(), String> {
    use codes::file_processing::*;

    let missing = [
        FILE_NOT_FOUND,
        INVALID_EXTENSION,
        FILE_TOO_LARGE,
        EMPTY_FILE,
        PERMISSION_DENIED,
        IO_ERROR,
        INVALID_PATH,
        TOO_MANY_LINES,
    ]
    .into_iter()
    .find(|code| codes::get_error_metadata(code.as_str()).is_none());

    match missing {
        Some(code) => Err(format!("File processing code {} has no metadata", code)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_registered() {
        assert!(validate_file_processor_config().is_ok());
    }
}
