//! Parsed commands and the sender metadata travelling with them

use crate::errors::{Result, StewardError};
use crate::parser::ParserConfig;

/// Who sent a line and where replies to it go.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sender {
    /// Stable key for privilege and ownership lookups
    pub identity: String,
    /// Transport routing for replies (channel, room, ...), opaque to the core
    pub origin: String,
}

impl Sender {
    pub fn new(identity: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            origin: origin.into(),
        }
    }
}

/// Why a command was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorFlag {
    Unknown,
    NotAllowed,
    CannotCommit,
}

impl ErrorFlag {
    /// Flag for a rejection error, if the error is one that rejects a command
    pub fn for_error(err: &StewardError) -> Option<Self> {
        match err {
            StewardError::UnknownCommand { .. } => Some(ErrorFlag::Unknown),
            StewardError::Unauthorized { .. } | StewardError::OwnershipViolation { .. } => {
                Some(ErrorFlag::NotAllowed)
            }
            StewardError::CannotCommitDirectly { .. } => Some(ErrorFlag::CannotCommit),
            _ => None,
        }
    }
}

/// A parsed request: name plus raw string arguments.
///
/// Commands are values. Code that needs a different argument list builds a
/// new command with `with_args`/`with_default_arg` instead of editing one
/// that may already sit in the queue.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub sender: Sender,
    pub name: String,
    pub args: Vec<String>,
    /// Set once the command has been queued
    pub commit_id: Option<u64>,
    /// Set only when the command is rejected
    pub error_flag: Option<ErrorFlag>,
}

impl Command {
    pub fn new(sender: Sender, name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            sender,
            name: name.into(),
            args,
            commit_id: None,
            error_flag: None,
        }
    }

    pub fn identity(&self) -> &str {
        &self.sender.identity
    }

    pub fn origin(&self) -> &str {
        &self.sender.origin
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Same sender, different name and arguments; never carries a commit id.
    pub fn derive(&self, name: impl Into<String>, args: Vec<String>) -> Self {
        Self::new(self.sender.clone(), name, args)
    }

    /// Copy of this command with a replaced argument list.
    pub fn with_args(&self, args: Vec<String>) -> Self {
        Self {
            args,
            ..self.clone()
        }
    }

    /// Copy of this command with `value` filled in at `index` if absent.
    ///
    /// # Errors
    ///
    /// Returns `StewardError::MalformedArguments` when fewer than `index`
    /// arguments are present, since the default would land in the wrong slot.
    pub fn with_default_arg(&self, index: usize, value: impl Into<String>) -> Result<Self> {
        if self.args.len() > index {
            return Ok(self.clone());
        }
        if self.args.len() < index {
            return Err(StewardError::MalformedArguments {
                command: self.name.clone(),
                reason: format!("insufficient arguments to default at index {}", index),
            });
        }
        let mut args = self.args.clone();
        args.push(value.into());
        Ok(self.with_args(args))
    }

    /// Canonical line form, e.g. `!lock > Example > spam`.
    pub fn render(&self, config: &ParserConfig) -> String {
        let mut line = format!("{}{}", config.prefix, self.name);
        for arg in &self.args {
            line.push(' ');
            line.push_str(&config.delimiter);
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}
