use stewardbot_types::RequestId;
use thiserror::Error;

use crate::access::Tier;

/// Result type alias using StewardError
pub type Result<T> = std::result::Result<T, StewardError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code used in structured log events and
/// in tests that assert on classification rather than on reply wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    // Authorization
    Unauthorized,
    CannotCommitDirectly,
    OwnershipViolation,

    // Routing
    UnknownCommand,

    // Queue
    NotFound,
    InvalidIdSpec,
    InvalidOption,

    // Execution
    ExecutorFailure,
    MalformedArguments,

    // Configuration
    InvalidInput,
    Io,

    // Internal
    Internal,
}

impl ErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "ERR_UNAUTHORIZED",
            ErrorKind::CannotCommitDirectly => "ERR_CANNOT_COMMIT_DIRECTLY",
            ErrorKind::OwnershipViolation => "ERR_OWNERSHIP_VIOLATION",
            ErrorKind::UnknownCommand => "ERR_UNKNOWN_COMMAND",
            ErrorKind::NotFound => "ERR_NOT_FOUND",
            ErrorKind::InvalidIdSpec => "ERR_INVALID_ID_SPEC",
            ErrorKind::InvalidOption => "ERR_INVALID_OPTION",
            ErrorKind::ExecutorFailure => "ERR_EXECUTOR_FAILURE",
            ErrorKind::MalformedArguments => "ERR_MALFORMED_ARGUMENTS",
            ErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ErrorKind::Io => "ERR_IO",
            ErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error record
///
/// Carries the classification plus whatever dispatch context was known when
/// the error surfaced. Used for logging and by the configuration loader.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    kind: ErrorKind,
    op: Option<String>,
    command: Option<String>,
    commit_id: Option<u64>,
    request_id: Option<RequestId>,
    message: String,
    source: Option<Box<ErrorRecord>>,
}

impl ErrorRecord {
    /// Create a new record with the specified kind
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            op: None,
            command: None,
            commit_id: None,
            request_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add command name context
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Add commit id context
    pub fn with_commit_id(mut self, commit_id: u64) -> Self {
        self.commit_id = Some(commit_id);
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source record
    pub fn with_source(mut self, source: ErrorRecord) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    pub fn commit_id(&self) -> Option<u64> {
        self.commit_id
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_record(&self) -> Option<&ErrorRecord> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(command) = &self.command {
            write!(f, " (command: {})", command)?;
        }
        if let Some(commit_id) = self.commit_id {
            write!(f, " (commit_id: {})", commit_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorRecord {}

// ========== End Error Facility ==========

/// Error taxonomy of the dispatcher
///
/// Every variant renders (via `Display`) to the text sent back to the sender,
/// so each carries exactly the context its reply needs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StewardError {
    /// Sender tier is below the command's minimum tier
    #[error("'{command}' requires {required} access")]
    Unauthorized { command: String, required: Tier },

    /// Sender tried to commit or cancel without the tier to do so
    #[error(
        "'{command}' requires {required} access; restricted commands wait in the queue until \
         someone with that access commits them, and you can only cancel your own queued commands"
    )]
    CannotCommitDirectly { command: String, required: Tier },

    /// No registry entry or no handler for the command
    #[error("no command handler for {command}")]
    UnknownCommand { command: String },

    /// Requested commit ids that are not queued
    #[error("skipped non-queued commands [{}]", join_ids(.ids))]
    NotFound { ids: Vec<u64> },

    /// Non-operator acting on an entry queued by someone else
    #[error("commit id {commit_id} was queued by {owner}; you can only {action} your own commands")]
    OwnershipViolation {
        commit_id: u64,
        owner: String,
        action: String,
    },

    /// Executor reported a domain failure
    #[error("{message}")]
    ExecutorFailure { command: String, message: String },

    /// Executor rejected the argument list
    #[error("{reason} for '{command}'")]
    MalformedArguments { command: String, reason: String },

    /// Commit id specification could not be parsed
    #[error("'{token}' is not a valid commit id")]
    InvalidIdSpec { token: String },

    /// Unknown commit/cancel mode option
    #[error("\"{option}\" is not a valid option, must be one of [quiet, verbose]")]
    InvalidOption { option: String },

    /// Invalid configuration value
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Render ids the way replies list them: `1, 2, 3`
pub fn join_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl StewardError {
    /// Get the canonical kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            StewardError::Unauthorized { .. } => ErrorKind::Unauthorized,
            StewardError::CannotCommitDirectly { .. } => ErrorKind::CannotCommitDirectly,
            StewardError::UnknownCommand { .. } => ErrorKind::UnknownCommand,
            StewardError::NotFound { .. } => ErrorKind::NotFound,
            StewardError::OwnershipViolation { .. } => ErrorKind::OwnershipViolation,
            StewardError::ExecutorFailure { .. } => ErrorKind::ExecutorFailure,
            StewardError::MalformedArguments { .. } => ErrorKind::MalformedArguments,
            StewardError::InvalidIdSpec { .. } => ErrorKind::InvalidIdSpec,
            StewardError::InvalidOption { .. } => ErrorKind::InvalidOption,
            StewardError::Config { .. } => ErrorKind::InvalidInput,
            StewardError::Internal { .. } => ErrorKind::Internal,
        }
    }
}

/// Conversion from StewardError to ErrorRecord
impl From<StewardError> for ErrorRecord {
    fn from(err: StewardError) -> Self {
        let message = err.to_string();
        let record = ErrorRecord::new(err.kind()).with_message(message);
        match err {
            StewardError::Unauthorized { command, .. }
            | StewardError::CannotCommitDirectly { command, .. }
            | StewardError::UnknownCommand { command }
            | StewardError::ExecutorFailure { command, .. }
            | StewardError::MalformedArguments { command, .. } => record.with_command(command),
            StewardError::OwnershipViolation { commit_id, .. } => {
                record.with_op("review").with_commit_id(commit_id)
            }
            StewardError::NotFound { .. }
            | StewardError::InvalidIdSpec { .. }
            | StewardError::InvalidOption { .. } => record.with_op("review"),
            StewardError::Config { .. } => record.with_op("config_parse"),
            StewardError::Internal { .. } => record,
        }
    }
}
