//! Configuration parser with validation
//!
//! Parses YAML, validates it, and builds the access table, command registry
//! and parser settings the dispatcher needs.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Instant;

use stewardbot_core::access::{AccessTable, Tier};
use stewardbot_core::parser::ParserConfig;
use stewardbot_core::registry::{CommandRegistry, CommandSpec, BUILTINS, CANCEL, COMMIT, QUEUE};
use stewardbot_core::{log_op_end, log_op_error, log_op_start};

use crate::errors::{config_validation, from_core, io_error, Result};
use crate::format_v0::{AccessV0, ConfigV0};

/// Everything the dispatcher is built from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub parser: ParserConfig,
    pub access: AccessTable,
    pub registry: CommandRegistry,
}

/// Parse a configuration file from a path
pub fn parse_config_file(path: &Path) -> Result<LoadedConfig> {
    let start = Instant::now();
    log_op_start!("config_load", path = %path.display());

    let result = fs::read_to_string(path)
        .map_err(|e| io_error("config_read", e))
        .and_then(|content| parse_config_str(&content));

    match &result {
        Ok(config) => {
            log_op_end!(
                "config_load",
                duration_ms = start.elapsed().as_millis() as u64,
                commands = config.registry.len() as u64
            );
        }
        Err(err) => {
            log_op_error!(
                "config_load",
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
        }
    }
    result
}

/// Parse a configuration from a string
pub fn parse_config_str(content: &str) -> Result<LoadedConfig> {
    let config: ConfigV0 = serde_yaml::from_str(content)
        .map_err(|e| config_validation(&format!("YAML parse error: {}", e)))?;

    validate_config(&config)?;
    build(config)
}

/// Validate a parsed configuration
fn validate_config(config: &ConfigV0) -> Result<()> {
    if config.schema_version != 0 {
        return Err(config_validation(&format!(
            "Unsupported schema_version: {}. Expected 0",
            config.schema_version
        )));
    }

    if config.prefix.trim().is_empty() {
        return Err(config_validation("prefix must not be empty"));
    }
    if config.delimiter.trim().is_empty() {
        return Err(config_validation("delimiter must not be empty"));
    }
    if config.prefix == config.delimiter {
        return Err(config_validation(&format!(
            "prefix and delimiter must differ (both '{}')",
            config.prefix
        )));
    }

    validate_access(&config.access)?;

    for name in config.commands.keys() {
        if name.contains(config.delimiter.as_str()) {
            return Err(config_validation(&format!(
                "command name '{}' contains the delimiter '{}'",
                name, config.delimiter
            )));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(config_validation(&format!(
                "command name '{}' contains whitespace",
                name
            )));
        }
    }

    Ok(())
}

/// No identity may appear twice, within a list or across lists
fn validate_access(access: &AccessV0) -> Result<()> {
    let lists = [
        ("banned", &access.banned),
        ("whitelisted", &access.whitelisted),
        ("operators", &access.operators),
    ];

    let mut seen: HashSet<&str> = HashSet::new();
    for (list, identities) in lists {
        for identity in identities {
            if identity.trim().is_empty() {
                return Err(config_validation(&format!("empty identity in {}", list)));
            }
            if !seen.insert(identity.as_str()) {
                return Err(config_validation(&format!(
                    "identity '{}' is listed more than once (last seen in {})",
                    identity, list
                )));
            }
        }
    }
    Ok(())
}

fn build(config: ConfigV0) -> Result<LoadedConfig> {
    let members = config
        .access
        .whitelisted
        .iter()
        .map(|identity| (identity.clone(), Tier::Whitelisted))
        .chain(
            config
                .access
                .operators
                .iter()
                .map(|identity| (identity.clone(), Tier::Operator)),
        );
    let access = AccessTable::new(config.access.banned.iter().cloned(), members).map_err(from_core)?;

    let mut registry = CommandRegistry::new();
    for (name, entry) in &config.commands {
        registry.register(name, (*entry).into()).map_err(from_core)?;
    }
    for name in BUILTINS {
        if !registry.contains(name) {
            registry
                .register(name, default_builtin(name))
                .map_err(from_core)?;
        }
    }

    tracing::debug!(
        component = module_path!(),
        commands = registry.len() as u64,
        banned = config.access.banned.len() as u64,
        "configuration validated"
    );

    Ok(LoadedConfig {
        parser: ParserConfig {
            prefix: config.prefix,
            delimiter: config.delimiter,
        },
        access,
        registry,
    })
}

fn default_builtin(name: &str) -> CommandSpec {
    match name {
        COMMIT | CANCEL => CommandSpec::open(Tier::Operator),
        QUEUE => CommandSpec::open(Tier::Whitelisted),
        _ => CommandSpec::open(Tier::Operator),
    }
}
