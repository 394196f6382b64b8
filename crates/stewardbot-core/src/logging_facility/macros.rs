//! Canonical logging macros
//!
//! These macros provide a structured, consistent way to log operations.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use stewardbot_core::log_op_start;
/// log_op_start!("dispatch");
/// log_op_start!("dispatch", command = "lock");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::stewardbot_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::stewardbot_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use stewardbot_core::log_op_end;
/// log_op_end!("dispatch", duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::stewardbot_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::stewardbot_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// Accepts anything convertible into an `ErrorRecord` and records its kind
/// and stable code.
///
/// # Example
///
/// ```
/// # use stewardbot_core::{log_op_error, errors::StewardError};
/// let err = StewardError::UnknownCommand { command: "lokc".to_string() };
/// log_op_error!("dispatch", err, duration_ms = 1);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let record: $crate::errors::ErrorRecord = $err.into();
        tracing::warn!(
            component = module_path!(),
            op = $op,
            event = $crate::stewardbot_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?record.kind(),
            err.code = record.code(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let record: $crate::errors::ErrorRecord = $err.into();
        tracing::warn!(
            component = module_path!(),
            op = $op,
            event = $crate::stewardbot_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?record.kind(),
            err.code = record.code(),
            $($field)*
        );
    }};
}
