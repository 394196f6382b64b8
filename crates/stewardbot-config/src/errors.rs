//! Error handling for stewardbot-config
//!
//! Wraps the core `ErrorRecord` with configuration-specific helpers

use stewardbot_core::errors::{ErrorKind, ErrorRecord, StewardError};

/// Result type alias using ErrorRecord
pub type Result<T> = std::result::Result<T, ErrorRecord>;

/// Create a configuration validation error
pub fn config_validation(reason: &str) -> ErrorRecord {
    ErrorRecord::new(ErrorKind::InvalidInput)
        .with_op("config_parse")
        .with_message(reason.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ErrorRecord {
    ErrorRecord::new(ErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Re-label a core construction error as a configuration error
pub fn from_core(err: StewardError) -> ErrorRecord {
    match err {
        StewardError::Config { message } => config_validation(&message),
        other => ErrorRecord::from(other).with_op("config_parse"),
    }
}
