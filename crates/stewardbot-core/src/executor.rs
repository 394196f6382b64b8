//! Executor seam: the handlers that actually perform commands.
//!
//! The dispatcher never knows what a handler does. It looks one up by
//! command name, hands it the command and an `ExecContext`, and relays the
//! replies and the outcome.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::command::{Command, Sender};
use crate::errors::StewardError;
use crate::response::Response;

/// Failure reported by an executor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// Domain failure, relayed verbatim
    #[error("{0}")]
    Failure(String),
    /// Argument list failed validation
    #[error("{reason}")]
    Syntax { reason: String },
}

impl ExecError {
    pub fn failure(message: impl Into<String>) -> Self {
        ExecError::Failure(message.into())
    }

    pub fn syntax(reason: impl Into<String>) -> Self {
        ExecError::Syntax {
            reason: reason.into(),
        }
    }

    /// Classify for the dispatcher boundary.
    pub fn into_steward(self, command: &str) -> StewardError {
        match self {
            ExecError::Failure(message) => StewardError::ExecutorFailure {
                command: command.to_string(),
                message,
            },
            ExecError::Syntax { reason } => StewardError::MalformedArguments {
                command: command.to_string(),
                reason,
            },
        }
    }
}

/// Check the argument count of `command` against `min..=max`.
///
/// # Errors
///
/// Returns `ExecError::Syntax` with `need more arguments` or
/// `too many arguments`.
pub fn expect_args(command: &Command, min: usize, max: usize) -> Result<(), ExecError> {
    let count = command.args.len();
    if count < min {
        return Err(ExecError::syntax("need more arguments"));
    }
    if count > max {
        return Err(ExecError::syntax("too many arguments"));
    }
    Ok(())
}

/// Reply sink and side channel for one executor call.
#[derive(Debug)]
pub struct ExecContext {
    sender: Sender,
    replies: Vec<Response>,
    derived: Vec<Command>,
}

impl ExecContext {
    pub fn new(sender: &Sender) -> Self {
        Self {
            sender: sender.clone(),
            replies: Vec::new(),
            derived: Vec::new(),
        }
    }

    /// Reply to the command's sender in its origin.
    pub fn reply(&mut self, text: impl Into<String>) {
        self.replies.push(Response::to(
            self.sender.origin.clone(),
            self.sender.identity.clone(),
            text,
        ));
    }

    /// Reply to the command's sender only.
    pub fn reply_private(&mut self, text: impl Into<String>) {
        self.replies
            .push(Response::private(self.sender.identity.clone(), text));
    }

    /// Unaddressed message in the command's origin.
    pub fn broadcast(&mut self, text: impl Into<String>) {
        self.replies
            .push(Response::broadcast(self.sender.origin.clone(), text));
    }

    /// Hand a new command back for queuing once this call returns.
    ///
    /// Derived commands are queued in the order given, owned by the sender
    /// of the command being executed.
    pub fn enqueue(&mut self, command: Command) {
        self.derived.push(command);
    }

    pub fn into_parts(self) -> (Vec<Response>, Vec<Command>) {
        (self.replies, self.derived)
    }
}

/// A handler for one or more command names.
pub trait Executor: Send + Sync {
    /// Perform `command`.
    ///
    /// # Errors
    ///
    /// Returns `ExecError::Failure` for domain errors and `ExecError::Syntax`
    /// for unusable arguments.
    fn execute(&self, command: &Command, ctx: &mut ExecContext) -> Result<(), ExecError>;
}

impl<F> Executor for F
where
    F: Fn(&Command, &mut ExecContext) -> Result<(), ExecError> + Send + Sync,
{
    fn execute(&self, command: &Command, ctx: &mut ExecContext) -> Result<(), ExecError> {
        self(command, ctx)
    }
}

/// Executors keyed by command name.
#[derive(Clone, Default)]
pub struct ExecutorSet {
    executors: HashMap<String, Arc<dyn Executor>>,
}

impl ExecutorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, executor: Arc<dyn Executor>) {
        self.executors.insert(name.into(), executor);
    }

    /// Builder form of `register`.
    pub fn with(mut self, name: impl Into<String>, executor: impl Executor + 'static) -> Self {
        self.register(name, Arc::new(executor));
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Executor>> {
        self.executors.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.executors.contains_key(name)
    }
}

impl fmt::Debug for ExecutorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.executors.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ExecutorSet").field("names", &names).finish()
    }
}
