//! Console transport
//!
//! Usage: stewardbot run --config <PATH> [--log-profile dev|prod]
//!
//! Reads `<identity> <origin> <text>` lines from stdin, dispatches each one
//! and prints the replies to stdout. Logs go to stderr.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use stewardbot_config::parse_config_file;
use stewardbot_core::executor::{ExecContext, ExecError, Executor, ExecutorSet};
use stewardbot_core::logging_facility::{self, Profile};
use stewardbot_core::registry::BUILTINS;
use stewardbot_core::{Command, Dispatcher, Parser, ParserConfig, Sender};

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Path to the configuration YAML file
    #[arg(long)]
    pub config: PathBuf,

    /// Logging profile (dev or prod)
    #[arg(long, default_value = "dev")]
    pub log_profile: Profile,
}

/// Stand-in executor: acknowledges every command it is handed.
struct ConsoleExecutor {
    grammar: ParserConfig,
}

impl Executor for ConsoleExecutor {
    fn execute(&self, command: &Command, ctx: &mut ExecContext) -> Result<(), ExecError> {
        tracing::info!(
            component = module_path!(),
            command = %command.name,
            commit_id = ?command.commit_id,
            "console executor invoked"
        );
        ctx.reply(format!("ok: {}", command.render(&self.grammar)));
        Ok(())
    }
}

/// Split `<identity> <origin> <text>`
fn split_line(line: &str) -> Option<(Sender, &str)> {
    let mut parts = line.splitn(3, char::is_whitespace);
    let identity = parts.next().filter(|s| !s.is_empty())?;
    let origin = parts.next().filter(|s| !s.is_empty())?;
    let text = parts.next().unwrap_or("");
    Some((Sender::new(identity, origin), text))
}

/// Execute run command
pub fn execute(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    logging_facility::init(args.log_profile);

    let config = parse_config_file(&args.config)?;

    let console: Arc<dyn Executor> = Arc::new(ConsoleExecutor {
        grammar: config.parser.clone(),
    });
    let mut executors = ExecutorSet::new();
    for (name, _) in config.registry.iter() {
        if !BUILTINS.contains(&name) {
            executors.register(name, console.clone());
        }
    }

    let mut dispatcher = Dispatcher::new(
        Parser::new(config.parser),
        Arc::new(config.access),
        Arc::new(config.registry),
        executors,
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let Some((sender, text)) = split_line(&line) else {
            tracing::warn!(
                component = module_path!(),
                line = %line,
                "expected '<identity> <origin> <text>', skipping line"
            );
            continue;
        };

        for response in dispatcher.handle_line_guarded(text, &sender) {
            writeln!(out, "{}", response)?;
        }
        out.flush()?;
    }

    tracing::info!(
        component = module_path!(),
        queue_len = dispatcher.queue().len() as u64,
        "input closed; discarding uncommitted commands"
    );
    Ok(())
}
