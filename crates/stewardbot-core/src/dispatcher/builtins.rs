//! The `queue` built-in: list or inspect pending commands.

use crate::command::Command;
use crate::executor::expect_args;
use crate::response::Response;

use super::{compact_ids, reply_to, Dispatched, Dispatcher, Outcome};

impl Dispatcher {
    pub(super) fn show_queue(&mut self, command: Command) -> Dispatched {
        if let Err(err) = expect_args(&command, 0, 1) {
            return self.fail(&command, err.into_steward(&command.name));
        }

        let reply = match command.arg(0) {
            None => {
                let ids = self.queue.list_ids();
                let text = if ids.is_empty() {
                    "no uncommitted commands".to_string()
                } else {
                    format!("uncommitted command ids: [{}]", compact_ids(&ids))
                };
                reply_to(&command, text)
            }
            Some(arg) if arg.eq_ignore_ascii_case("mine") => {
                let ids = self.queue.ids_owned_by(command.identity());
                let text = if ids.is_empty() {
                    "you have no uncommitted commands".to_string()
                } else {
                    format!("your uncommitted command ids: [{}]", compact_ids(&ids))
                };
                Response::private(command.identity(), text)
            }
            Some(arg) => reply_to(&command, self.describe_entry(arg)),
        };

        Dispatched::new(Outcome::Executed, vec![reply])
    }

    fn describe_entry(&self, raw: &str) -> String {
        let Ok(id) = raw.parse::<u64>() else {
            return "queue ID must be numeric".to_string();
        };
        match self.queue.peek(id) {
            Ok(entry) => format!(
                "queue item #{} by [{} > {}], command \"{}\" with args [{}], queued at {}",
                id,
                entry.command.origin(),
                entry.owner,
                entry.command.name,
                entry.command.args.join(" > "),
                entry.queued_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            Err(_) => format!("no commit id {}", id),
        }
    }
}
