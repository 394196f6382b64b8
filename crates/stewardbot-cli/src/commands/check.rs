//! Configuration check command
//!
//! Usage: stewardbot check --config <PATH> [--json]

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use stewardbot_config::{parse_config_file, LoadedConfig};
use stewardbot_core::access::Tier;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Path to the configuration YAML file
    #[arg(long)]
    pub config: PathBuf,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ConfigSummary<'a> {
    prefix: &'a str,
    delimiter: &'a str,
    banned: Vec<&'a str>,
    whitelisted: Vec<&'a str>,
    operators: Vec<&'a str>,
    commands: Vec<CommandSummary<'a>>,
}

#[derive(Debug, Serialize)]
struct CommandSummary<'a> {
    name: &'a str,
    min_tier: Tier,
    commit_gated: bool,
    bypass_tier: Option<Tier>,
}

impl<'a> ConfigSummary<'a> {
    fn new(config: &'a LoadedConfig) -> Self {
        Self {
            prefix: &config.parser.prefix,
            delimiter: &config.parser.delimiter,
            banned: config.access.members_of(Tier::Ignored),
            whitelisted: config.access.members_of(Tier::Whitelisted),
            operators: config.access.members_of(Tier::Operator),
            commands: config
                .registry
                .iter()
                .map(|(name, spec)| CommandSummary {
                    name,
                    min_tier: spec.min_tier,
                    commit_gated: spec.commit_gated,
                    bypass_tier: spec.bypass_tier,
                })
                .collect(),
        }
    }
}

/// Execute check command
pub fn execute(args: CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = parse_config_file(&args.config)?;
    let summary = ConfigSummary::new(&config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("✓ {} is valid", args.config.display());
    println!("prefix: {:?}, delimiter: {:?}", summary.prefix, summary.delimiter);
    println!("banned: [{}]", summary.banned.join(", "));
    println!("whitelisted: [{}]", summary.whitelisted.join(", "));
    println!("operators: [{}]", summary.operators.join(", "));
    println!("commands:");
    for command in &summary.commands {
        let gate = match (command.commit_gated, command.bypass_tier) {
            (false, _) => "direct".to_string(),
            (true, Some(bypass)) => format!("queued below {}", bypass),
            (true, None) => "always queued".to_string(),
        };
        println!("  {} (min {}, {})", command.name, command.min_tier, gate);
    }
    Ok(())
}
