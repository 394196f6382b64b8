//! Commit and cancel: re-entry into the queue.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::access::Tier;
use crate::command::Command;
use crate::errors::StewardError;
use crate::executor::expect_args;
use crate::queue::IdSpec;
use crate::registry::COMMIT;
use crate::response::Response;

use super::{compact_ids, panic_summary, reply_to, Dispatched, Dispatcher, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Commit,
    Cancel,
}

impl ReviewAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewAction::Commit => "commit",
            ReviewAction::Cancel => "cancel",
        }
    }
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-id reporting style of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewMode {
    #[default]
    Normal,
    /// No per-id replies, one `done` at the end
    Quiet,
    /// Echo each command's full text
    Verbose,
}

impl ReviewMode {
    /// # Errors
    ///
    /// Returns `StewardError::InvalidOption` for anything but `quiet` or
    /// `verbose` (case-insensitive).
    pub fn parse(raw: &str) -> Result<Self, StewardError> {
        match raw.trim().to_lowercase().as_str() {
            "quiet" => Ok(ReviewMode::Quiet),
            "verbose" => Ok(ReviewMode::Verbose),
            _ => Err(StewardError::InvalidOption {
                option: raw.trim().to_string(),
            }),
        }
    }
}

/// What a commit or cancel batch did, id by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSummary {
    pub action: ReviewAction,
    /// Committed (successfully) or cancelled
    pub processed: Vec<u64>,
    pub not_found: Vec<u64>,
    /// Left queued because the requester does not own them
    pub refused: Vec<u64>,
    /// Committed but the executor failed or panicked; no longer queued
    pub failed: Vec<u64>,
}

impl ReviewSummary {
    fn new(action: ReviewAction) -> Self {
        Self {
            action,
            processed: Vec::new(),
            not_found: Vec::new(),
            refused: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// The single reply of a quiet batch: `done`, plus any ids that were not
    /// carried out.
    fn quiet_text(&self) -> String {
        let mut text = "done".to_string();
        if !self.failed.is_empty() {
            text.push_str(&format!("; failed [{}]", compact_ids(&self.failed)));
        }
        if !self.refused.is_empty() {
            text.push_str(&format!("; refused [{}]", compact_ids(&self.refused)));
        }
        text
    }
}

impl Dispatcher {
    /// Handle `commit`/`cancel`. Requesters below operator only touch
    /// entries they own.
    pub(super) fn review(&mut self, command: Command, tier: Tier) -> Dispatched {
        let action = if command.name == COMMIT {
            ReviewAction::Commit
        } else {
            ReviewAction::Cancel
        };
        let mut summary = ReviewSummary::new(action);

        if let Err(err) = expect_args(&command, 1, 2) {
            return self.fail(&command, err.into_steward(&command.name));
        }
        let mode = match command.arg(1).map(ReviewMode::parse).transpose() {
            Ok(mode) => mode.unwrap_or_default(),
            Err(err) => return self.fail(&command, err),
        };

        if self.queue.is_empty() {
            return Dispatched::new(
                Outcome::Reviewed(summary),
                vec![reply_to(&command, "there are no queued commands")],
            );
        }

        let spec = match IdSpec::parse(command.arg(0).unwrap_or_default()) {
            Ok(spec) => spec,
            Err(err) => return self.fail(&command, err),
        };

        let restricted = tier < Tier::Operator;
        let requester = command.identity().to_string();
        let resolution = self
            .queue
            .resolve(&spec, restricted.then_some(requester.as_str()));

        let mut responses = Vec::new();
        if resolution.found.is_empty() {
            let text = if restricted && spec == IdSpec::All {
                "you have no queued commands"
            } else {
                "there are no queued commands with the given commit ids"
            };
            summary.not_found = resolution.not_found;
            return Dispatched::new(Outcome::Reviewed(summary), vec![reply_to(&command, text)]);
        }
        if !resolution.not_found.is_empty() {
            let notice = StewardError::NotFound {
                ids: resolution.not_found.clone(),
            };
            responses.push(reply_to(&command, notice.to_string()));
        }
        summary.not_found = resolution.not_found;

        for id in resolution.found {
            let owner = match self.queue.peek(id) {
                Ok(entry) => entry.owner.clone(),
                Err(_) => {
                    summary.not_found.push(id);
                    continue;
                }
            };

            if restricted && owner != requester {
                let err = StewardError::OwnershipViolation {
                    commit_id: id,
                    owner,
                    action: action.to_string(),
                };
                tracing::info!(
                    component = module_path!(),
                    op = "review",
                    action = %action,
                    commit_id = id,
                    err.code = err.kind().code(),
                    "refused foreign entry"
                );
                responses.push(reply_to(&command, err.to_string()));
                summary.refused.push(id);
                continue;
            }

            let entry = match self.queue.remove(id) {
                Ok(entry) => entry,
                Err(_) => {
                    summary.not_found.push(id);
                    continue;
                }
            };
            let stored = entry.command;
            let rendered = stored.render(self.parser.config());

            match action {
                ReviewAction::Commit => {
                    let (replies, result) = self.run_committed(id, &stored);
                    responses.extend(replies);
                    match result {
                        Ok(()) => {
                            summary.processed.push(id);
                            if mode == ReviewMode::Verbose {
                                responses.push(Response::broadcast(
                                    stored.origin(),
                                    format!("committed #{}: {}", id, rendered),
                                ));
                            }
                            tracing::info!(
                                component = module_path!(),
                                op = "review",
                                action = %action,
                                commit_id = id,
                                command = %stored.name,
                                "committed"
                            );
                        }
                        Err(err) => {
                            summary.failed.push(id);
                            tracing::warn!(
                                component = module_path!(),
                                op = "review",
                                action = %action,
                                commit_id = id,
                                command = %stored.name,
                                err.code = err.kind().code(),
                                "committed command failed"
                            );
                            responses.push(Response::to(
                                stored.origin(),
                                entry.owner.as_str(),
                                err.to_string(),
                            ));
                        }
                    }
                }
                ReviewAction::Cancel => {
                    summary.processed.push(id);
                    tracing::info!(
                        component = module_path!(),
                        op = "review",
                        action = %action,
                        commit_id = id,
                        command = %stored.name,
                        "cancelled"
                    );
                    let text = match mode {
                        ReviewMode::Quiet => None,
                        ReviewMode::Verbose => Some(format!("cancelled #{}: {}", id, rendered)),
                        ReviewMode::Normal => {
                            Some(format!("your \"{}\" command was cancelled", stored.name))
                        }
                    };
                    if let Some(text) = text {
                        responses.push(Response::to(stored.origin(), entry.owner.as_str(), text));
                    }
                }
            }
        }

        if mode == ReviewMode::Quiet {
            responses.push(reply_to(&command, summary.quiet_text()));
        }
        Dispatched::new(Outcome::Reviewed(summary), responses)
    }

    /// Run one committed entry. A panic is contained to this id so the rest
    /// of the batch still runs.
    fn run_committed(
        &mut self,
        id: u64,
        stored: &Command,
    ) -> (Vec<Response>, Result<(), StewardError>) {
        match panic::catch_unwind(AssertUnwindSafe(|| self.run_executor(stored))) {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_summary(payload.as_ref());
                tracing::error!(
                    component = module_path!(),
                    op = "review",
                    commit_id = id,
                    command = %stored.name,
                    panic = %message,
                    "executor panicked during commit"
                );
                (
                    Vec::new(),
                    Err(StewardError::Internal {
                        message: format!("commit id {} raised an unhandled exception: {}", id, message),
                    }),
                )
            }
        }
    }
}
