//! Configuration format v0
//!
//! Defines the YAML structure of a stewardbot configuration file

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use stewardbot_core::access::Tier;
use stewardbot_core::registry::CommandSpec;

/// Top-level configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigV0 {
    /// Schema version (must be 0 for this format)
    pub schema_version: u32,

    /// Marks a line as a command
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Separates the command name and its arguments
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    #[serde(default)]
    pub access: AccessV0,

    /// Command name → requirements
    #[serde(default)]
    pub commands: BTreeMap<String, CommandEntryV0>,
}

/// Identity lists per tier. Anyone not listed is public.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessV0 {
    #[serde(default)]
    pub banned: Vec<String>,
    #[serde(default)]
    pub whitelisted: Vec<String>,
    #[serde(default)]
    pub operators: Vec<String>,
}

/// Requirements for one command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandEntryV0 {
    /// Tier name, case-insensitive
    #[serde(deserialize_with = "deserialize_tier")]
    pub min_tier: Tier,

    #[serde(default)]
    pub commit_gated: bool,

    /// Tier name, or `none` (or omitted) to queue every sender
    #[serde(default, deserialize_with = "deserialize_bypass")]
    pub bypass_tier: Option<Tier>,
}

impl From<CommandEntryV0> for CommandSpec {
    fn from(entry: CommandEntryV0) -> Self {
        CommandSpec {
            min_tier: entry.min_tier,
            commit_gated: entry.commit_gated,
            bypass_tier: entry.bypass_tier,
        }
    }
}

fn default_prefix() -> String {
    "!".to_string()
}

fn default_delimiter() -> String {
    ">".to_string()
}

fn deserialize_tier<'de, D>(deserializer: D) -> Result<Tier, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse::<Tier>().map_err(serde::de::Error::custom)
}

/// Accept a tier name or the literal `none`
fn deserialize_bypass<'de, D>(deserializer: D) -> Result<Option<Tier>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(value) if value.trim().eq_ignore_ascii_case("none") => Ok(None),
        Some(value) => value
            .parse::<Tier>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
