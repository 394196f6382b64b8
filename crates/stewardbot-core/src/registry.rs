//! Command registry: what each command name requires

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::access::Tier;
use crate::errors::{Result, StewardError};

/// Approve and run queued commands.
pub const COMMIT: &str = "commit";
/// Discard queued commands.
pub const CANCEL: &str = "cancel";
/// Inspect the queue.
pub const QUEUE: &str = "queue";

/// Names the dispatcher handles itself instead of handing to an executor.
pub const BUILTINS: [&str; 3] = [COMMIT, CANCEL, QUEUE];

/// Requirements for one command name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub min_tier: Tier,
    #[serde(default)]
    pub commit_gated: bool,
    /// Minimum tier that skips the queue. Ignored unless `commit_gated`.
    #[serde(default)]
    pub bypass_tier: Option<Tier>,
}

/// What the registry says should happen to a command from a given tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Denied { required: Tier },
    Execute,
    Queue,
}

impl CommandSpec {
    /// Ungated command runnable from `min_tier` upwards.
    pub fn open(min_tier: Tier) -> Self {
        Self {
            min_tier,
            commit_gated: false,
            bypass_tier: None,
        }
    }

    /// Commit-gated command; `bypass_tier` of `None` queues every sender.
    pub fn gated(min_tier: Tier, bypass_tier: Option<Tier>) -> Self {
        Self {
            min_tier,
            commit_gated: true,
            bypass_tier,
        }
    }

    pub fn gate(&self, tier: Tier) -> Gate {
        if tier < self.min_tier {
            return Gate::Denied {
                required: self.min_tier,
            };
        }
        if !self.commit_gated {
            return Gate::Execute;
        }
        match self.bypass_tier {
            Some(bypass) if tier >= bypass => Gate::Execute,
            _ => Gate::Queue,
        }
    }
}

/// Immutable name → requirements table, built at startup.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, CommandSpec>,
}

impl CommandRegistry {
    /// Empty registry; `commit`, `cancel` and `queue` must be registered
    /// explicitly (see `with_builtins`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in review commands at their default tiers.
    pub fn with_builtins() -> Self {
        let mut commands = BTreeMap::new();
        commands.insert(COMMIT.to_string(), CommandSpec::open(Tier::Operator));
        commands.insert(CANCEL.to_string(), CommandSpec::open(Tier::Operator));
        commands.insert(QUEUE.to_string(), CommandSpec::open(Tier::Whitelisted));
        Self { commands }
    }

    /// Add or replace a command.
    ///
    /// # Errors
    ///
    /// Returns `StewardError::Config` when the name is empty or not
    /// lowercase, the minimum tier is `ignored`, the bypass tier is below the
    /// minimum tier, or a built-in is marked commit-gated.
    pub fn register(&mut self, name: &str, spec: CommandSpec) -> Result<()> {
        let invalid = |message: String| Err(StewardError::Config { message });

        if name.trim().is_empty() || name != name.trim() {
            return invalid(format!("invalid command name '{}'", name));
        }
        if name != name.to_lowercase() {
            return invalid(format!("command name '{}' must be lowercase", name));
        }
        if spec.min_tier == Tier::Ignored {
            return invalid(format!("command '{}' cannot require the ignored tier", name));
        }
        if spec.commit_gated {
            if BUILTINS.contains(&name) {
                return invalid(format!("built-in command '{}' cannot be commit-gated", name));
            }
            if let Some(bypass) = spec.bypass_tier {
                if bypass < spec.min_tier {
                    return invalid(format!(
                        "command '{}' has bypass tier {} below its minimum tier {}",
                        name, bypass, spec.min_tier
                    ));
                }
            }
        }

        self.commands.insert(name.to_string(), spec);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Registered names with their specs, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CommandSpec)> {
        self.commands.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
