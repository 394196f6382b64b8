//! Stewardbot CLI
//!
//! Command-line front end: validate a configuration or run the dispatcher
//! over a console line transport

use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "stewardbot")]
#[command(about = "Stewardbot - authorization-gated command dispatcher", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate a configuration file and summarize it
    Check(commands::check::CheckArgs),
    /// Dispatch lines read from stdin
    Run(commands::run::RunArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check(args) => commands::check::execute(args),
        Commands::Run(args) => commands::run::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
