//! In-memory queue of commands awaiting commit
//!
//! Ids come from a counter that only ever increases, so an id names at most
//! one command for the lifetime of the process. Removing an entry deletes it
//! outright. Nothing here survives a restart.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::command::Command;
use crate::errors::{Result, StewardError};

/// A command waiting for review.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedEntry {
    pub id: u64,
    pub command: Command,
    /// Identity that queued the command, captured at enqueue time
    pub owner: String,
    pub queued_at: DateTime<Utc>,
}

/// Which ids a commit/cancel request targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdSpec {
    /// Every id in scope for the requester
    All,
    /// Explicit ids, sorted and deduplicated
    Ids(Vec<u64>),
}

impl IdSpec {
    /// Parse `all`, `7` or `2,5,9`.
    ///
    /// # Errors
    ///
    /// Returns `StewardError::InvalidIdSpec` naming the first token that is
    /// not an unsigned integer, or when no id is given at all.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("all") {
            return Ok(IdSpec::All);
        }

        let mut ids = Vec::new();
        for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let id = token
                .parse::<u64>()
                .map_err(|_| StewardError::InvalidIdSpec {
                    token: token.to_string(),
                })?;
            ids.push(id);
        }
        if ids.is_empty() {
            return Err(StewardError::InvalidIdSpec {
                token: raw.to_string(),
            });
        }

        ids.sort_unstable();
        ids.dedup();
        Ok(IdSpec::Ids(ids))
    }
}

/// Result of matching an `IdSpec` against the queue. Both lists ascend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub found: Vec<u64>,
    pub not_found: Vec<u64>,
}

#[derive(Debug)]
pub struct Queue {
    entries: BTreeMap<u64, QueuedEntry>,
    next_id: u64,
}

impl Default for Queue {
    fn default() -> Self {
        Self::new()
    }
}

impl Queue {
    pub fn new() -> Self {
        tracing::warn!(
            component = module_path!(),
            "command queue is held in memory only; queued commands are lost on restart"
        );
        Self {
            entries: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Store a command and return its fresh commit id.
    pub fn allocate(&mut self, mut command: Command, owner: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        command.commit_id = Some(id);
        self.entries.insert(
            id,
            QueuedEntry {
                id,
                command,
                owner: owner.into(),
                queued_at: Utc::now(),
            },
        );
        id
    }

    /// # Errors
    ///
    /// Returns `StewardError::NotFound` if `id` is not queued.
    pub fn peek(&self, id: u64) -> Result<&QueuedEntry> {
        self.entries
            .get(&id)
            .ok_or(StewardError::NotFound { ids: vec![id] })
    }

    /// # Errors
    ///
    /// Returns `StewardError::NotFound` if `id` is not queued.
    pub fn remove(&mut self, id: u64) -> Result<QueuedEntry> {
        self.entries
            .remove(&id)
            .ok_or(StewardError::NotFound { ids: vec![id] })
    }

    pub fn contains(&self, id: u64) -> bool {
        self.entries.contains_key(&id)
    }

    /// Currently queued ids, ascending.
    pub fn list_ids(&self) -> Vec<u64> {
        self.entries.keys().copied().collect()
    }

    /// Queued ids owned by `owner`, ascending.
    pub fn ids_owned_by(&self, owner: &str) -> Vec<u64> {
        self.entries
            .values()
            .filter(|entry| entry.owner == owner)
            .map(|entry| entry.id)
            .collect()
    }

    /// Split a spec into queued and missing ids.
    ///
    /// With `owner` set, `All` means the owner's entries only. Explicit ids
    /// are not filtered here; ownership of those is checked per id by the
    /// caller so each refusal can be reported.
    pub fn resolve(&self, spec: &IdSpec, owner: Option<&str>) -> Resolution {
        match spec {
            IdSpec::All => Resolution {
                found: match owner {
                    Some(owner) => self.ids_owned_by(owner),
                    None => self.list_ids(),
                },
                not_found: Vec::new(),
            },
            IdSpec::Ids(ids) => {
                let (found, not_found) = ids.iter().partition(|id| self.contains(**id));
                Resolution { found, not_found }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
