//! Dispatcher: authorizes each parsed command and routes it to execution,
//! the queue, or a rejection.
//!
//! The dispatcher owns the queue outright. Lines are handled one at a time;
//! a slow executor blocks the next line.

mod builtins;
mod review;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use stewardbot_types::LineContext;

use crate::access::{AccessTable, Tier};
use crate::command::{Command, ErrorFlag, Sender};
use crate::errors::StewardError;
use crate::executor::{ExecContext, ExecutorSet};
use crate::parser::Parser;
use crate::queue::Queue;
use crate::registry::{CommandRegistry, Gate, CANCEL, COMMIT, QUEUE};
use crate::response::Response;
use crate::{log_op_end, log_op_error, log_op_start};

pub use review::{ReviewAction, ReviewMode, ReviewSummary};

/// A command turned away before reaching an executor.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    /// The command with its `error_flag` set
    pub command: Command,
    pub error: StewardError,
}

/// What happened to one dispatched command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Banned sender; nothing was sent back
    Ignored,
    /// Refused by authorization or lookup
    Rejected(Rejection),
    /// Ran synchronously
    Executed,
    /// Ran, but the executor or argument checks failed
    Failed(StewardError),
    /// Stored under the given commit id
    Queued(u64),
    /// A commit or cancel batch completed
    Reviewed(ReviewSummary),
}

/// Outcome plus every reply produced while handling the command.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched {
    pub outcome: Outcome,
    pub responses: Vec<Response>,
}

impl Dispatched {
    fn ignored() -> Self {
        Self {
            outcome: Outcome::Ignored,
            responses: Vec::new(),
        }
    }

    fn new(outcome: Outcome, responses: Vec<Response>) -> Self {
        Self { outcome, responses }
    }
}

pub struct Dispatcher {
    parser: Parser,
    access: Arc<AccessTable>,
    registry: Arc<CommandRegistry>,
    executors: ExecutorSet,
    queue: Queue,
}

impl Dispatcher {
    pub fn new(
        parser: Parser,
        access: Arc<AccessTable>,
        registry: Arc<CommandRegistry>,
        executors: ExecutorSet,
    ) -> Self {
        Self {
            parser,
            access,
            registry,
            executors,
            queue: Queue::new(),
        }
    }

    /// Read-only view of the pending commands.
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Parse and dispatch one inbound line. Lines that are not commands
    /// produce no replies.
    pub fn handle_line(&mut self, line: &str, sender: &Sender) -> Vec<Response> {
        let ctx = LineContext::new(sender.identity.clone());
        self.handle_line_in(&ctx, line, sender)
    }

    /// `handle_line`, but a panic anywhere below is logged and answered
    /// with a generic failure notice instead of unwinding into the caller.
    pub fn handle_line_guarded(&mut self, line: &str, sender: &Sender) -> Vec<Response> {
        let ctx = LineContext::new(sender.identity.clone());
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.handle_line_in(&ctx, line, sender)));

        match result {
            Ok(responses) => responses,
            Err(payload) => {
                let summary = panic_summary(payload.as_ref());
                tracing::error!(
                    component = module_path!(),
                    op = "dispatch",
                    request_id = %ctx.request_id,
                    sender = %sender.identity,
                    origin = %sender.origin,
                    line = %line,
                    panic = %summary,
                    "unhandled panic while dispatching line"
                );
                vec![
                    Response::to(
                        sender.origin.clone(),
                        sender.identity.clone(),
                        format!("An unhandled exception has occurred: {}.", summary),
                    ),
                    Response::broadcast(
                        sender.origin.clone(),
                        "Exception details have been sent to the log",
                    ),
                ]
            }
        }
    }

    /// Authorize and route an already parsed command.
    pub fn dispatch(&mut self, command: Command) -> Dispatched {
        let ctx = LineContext::new(command.sender.identity.clone());
        self.dispatch_in(&ctx, command)
    }

    fn handle_line_in(&mut self, ctx: &LineContext, line: &str, sender: &Sender) -> Vec<Response> {
        match self.parser.parse(line, sender) {
            Some(command) => self.dispatch_in(ctx, command).responses,
            None => Vec::new(),
        }
    }

    fn dispatch_in(&mut self, ctx: &LineContext, command: Command) -> Dispatched {
        if self.access.is_banned(command.identity()) {
            tracing::debug!(
                component = module_path!(),
                request_id = %ctx.request_id,
                sender = %command.sender.identity,
                "dropping line from banned identity"
            );
            return Dispatched::ignored();
        }

        let start = Instant::now();
        let name = command.name.clone();
        log_op_start!(
            "dispatch",
            request_id = %ctx.request_id,
            sender = %ctx.sender,
            command = %name
        );

        let dispatched = self.route(command);

        match &dispatched.outcome {
            Outcome::Rejected(rejection) => {
                log_op_error!(
                    "dispatch",
                    rejection.error.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    request_id = %ctx.request_id,
                    command = %name,
                    flag = ?rejection.command.error_flag
                );
            }
            Outcome::Failed(err) => {
                log_op_error!(
                    "dispatch",
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    request_id = %ctx.request_id,
                    command = %name
                );
            }
            outcome => {
                log_op_end!(
                    "dispatch",
                    duration_ms = start.elapsed().as_millis() as u64,
                    request_id = %ctx.request_id,
                    command = %name,
                    outcome = ?outcome,
                    queue_len = self.queue.len() as u64
                );
            }
        }

        dispatched
    }

    fn route(&mut self, command: Command) -> Dispatched {
        let tier = self.access.tier_of(command.identity());

        let Some(spec) = self.registry.get(&command.name).copied() else {
            let err = StewardError::UnknownCommand {
                command: command.name.clone(),
            };
            return self.reject(command, err);
        };

        let name = command.name.clone();
        match spec.gate(tier) {
            Gate::Denied { required } => self.deny(command, tier, required),
            Gate::Queue => self.enqueue(command),
            Gate::Execute => match name.as_str() {
                COMMIT | CANCEL => self.review(command, tier),
                QUEUE => self.show_queue(command),
                _ => self.execute(command),
            },
        }
    }

    /// Below the command's minimum tier. While anything is queued, `cancel`
    /// still runs restricted to the sender's own entries.
    fn deny(&mut self, command: Command, tier: Tier, required: Tier) -> Dispatched {
        let is_review = command.name == COMMIT || command.name == CANCEL;
        if command.name == CANCEL && !self.queue.is_empty() {
            return self.review(command, tier);
        }

        let err = if is_review {
            StewardError::CannotCommitDirectly {
                command: command.name.clone(),
                required,
            }
        } else {
            StewardError::Unauthorized {
                command: command.name.clone(),
                required,
            }
        };
        self.reject(command, err)
    }

    fn reject(&self, mut command: Command, error: StewardError) -> Dispatched {
        command.error_flag = ErrorFlag::for_error(&error);
        let reply = reply_to(&command, error.to_string());
        Dispatched::new(
            Outcome::Rejected(Rejection { command, error }),
            vec![reply],
        )
    }

    fn fail(&self, command: &Command, error: StewardError) -> Dispatched {
        let reply = reply_to(command, error.to_string());
        Dispatched::new(Outcome::Failed(error), vec![reply])
    }

    fn enqueue(&mut self, command: Command) -> Dispatched {
        let owner = command.identity().to_string();
        let reply_origin = command.origin().to_string();
        let name = command.name.clone();
        let id = self.queue.allocate(command, owner.clone());

        tracing::info!(
            component = module_path!(),
            op = "enqueue",
            commit_id = id,
            command = %name,
            owner = %owner,
            queue_len = self.queue.len() as u64,
        );

        let prefix = &self.parser.config().prefix;
        let text = format!(
            "commit id {} (restricted command, see '{}help {}' or '{}help {}')",
            id, prefix, COMMIT, prefix, CANCEL
        );
        Dispatched::new(
            Outcome::Queued(id),
            vec![Response::to(reply_origin, owner, text)],
        )
    }

    fn execute(&mut self, command: Command) -> Dispatched {
        let (responses, result) = self.run_executor(&command);
        match result {
            Ok(()) => Dispatched::new(Outcome::Executed, responses),
            Err(err @ StewardError::UnknownCommand { .. }) => self.reject(command, err),
            Err(err) => {
                let mut responses = responses;
                responses.push(reply_to(&command, err.to_string()));
                Dispatched::new(Outcome::Failed(err), responses)
            }
        }
    }

    /// Run the bound executor and queue whatever it derived. Failure text is
    /// left to the caller since direct and committed runs reply differently.
    fn run_executor(&mut self, command: &Command) -> (Vec<Response>, Result<(), StewardError>) {
        let Some(executor) = self.executors.get(&command.name) else {
            return (
                Vec::new(),
                Err(StewardError::UnknownCommand {
                    command: command.name.clone(),
                }),
            );
        };

        let mut ctx = ExecContext::new(&command.sender);
        let result = executor.execute(command, &mut ctx);
        let (mut responses, derived) = ctx.into_parts();

        if let Err(err) = result {
            return (responses, Err(err.into_steward(&command.name)));
        }
        if !derived.is_empty() {
            responses.extend(self.enqueue_derived(&command.sender, derived));
        }
        (responses, Ok(()))
    }

    /// Queue commands an executor handed back, owned by `sender`.
    fn enqueue_derived(&mut self, sender: &Sender, derived: Vec<Command>) -> Vec<Response> {
        let mut responses = Vec::new();
        let mut ids = Vec::new();

        for command in derived {
            if !self.registry.contains(&command.name) {
                responses.push(Response::to(
                    sender.origin.clone(),
                    sender.identity.clone(),
                    format!("\"{}\" is not a recognized command", command.name),
                ));
                continue;
            }
            let mut command = command;
            command.sender = sender.clone();
            ids.push(self.queue.allocate(command, sender.identity.clone()));
        }

        if !ids.is_empty() {
            tracing::info!(
                component = module_path!(),
                op = "enqueue",
                derived = ids.len() as u64,
                queue_len = self.queue.len() as u64,
            );
            let config = self.parser.config();
            responses.push(Response::to(
                sender.origin.clone(),
                sender.identity.clone(),
                format!(
                    "Acknowledged, queued commands; need \"{}{} {} all\"; commit ids [{}]",
                    config.prefix,
                    COMMIT,
                    config.delimiter,
                    summarize_ids(&ids)
                ),
            ));
        }
        responses
    }
}

/// Public reply to the command's sender in its origin.
fn reply_to(command: &Command, text: impl Into<String>) -> Response {
    Response::to(command.origin(), command.identity(), text)
}

/// `1,2,3` for short lists, `1 through 12` for long ones.
fn summarize_ids(ids: &[u64]) -> String {
    match (ids.first(), ids.last()) {
        (Some(first), Some(last)) if ids.len() >= 10 => format!("{} through {}", first, last),
        _ => compact_ids(ids),
    }
}

/// Ids joined without spaces, as the queue listing shows them.
fn compact_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn panic_summary(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
