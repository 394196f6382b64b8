//! Line parser: `<prefix><name><delimiter><arg1><delimiter><arg2>...`
//!
//! The parser only splits text. Argument counts are the executor's business.

use crate::command::{Command, Sender};

/// Prefix and delimiter of the command grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    pub prefix: String,
    pub delimiter: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            prefix: "!".to_string(),
            delimiter: ">".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse one line, or `None` when the line is not addressed to the bot.
    ///
    /// The name is lowercased so registry lookups are case-insensitive.
    /// Arguments are trimmed. Empty arguments between delimiters are kept so
    /// positions stay stable; one empty argument left by a trailing delimiter
    /// is dropped, so `!lock > ` has no args and `!lock > a > ` has `["a"]`.
    pub fn parse(&self, line: &str, sender: &Sender) -> Option<Command> {
        let line = line.trim_end_matches(['\r', '\n']);
        let body = line.strip_prefix(self.config.prefix.as_str())?;
        let delimiter = self.config.delimiter.as_str();

        let (name, rest) = match body.split_once(delimiter) {
            Some((name, rest)) => (name, Some(rest)),
            None => (body, None),
        };

        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return None;
        }

        let mut args: Vec<String> = match rest {
            Some(rest) => rest
                .split(delimiter)
                .map(|arg| arg.trim().to_string())
                .collect(),
            None => Vec::new(),
        };
        if args.last().is_some_and(String::is_empty) {
            args.pop();
        }

        Some(Command::new(sender.clone(), name, args))
    }
}
