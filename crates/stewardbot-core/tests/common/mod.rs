use std::sync::{Arc, Mutex};

use stewardbot_core::executor::{ExecContext, ExecError, ExecutorSet};
use stewardbot_core::registry::{CommandRegistry, CommandSpec};
use stewardbot_core::{AccessTable, Command, Dispatcher, Parser, Sender, Tier};

pub const CHANNEL: &str = "#stewards";
pub const OPERATOR: &str = "steward.example";
pub const HELPER: &str = "helper.example";
pub const OTHER_HELPER: &str = "other.example";
pub const BANNED: &str = "spam.example";

/// Commands executors have been called with, in call order
pub type CallLog = Arc<Mutex<Vec<Command>>>;

#[allow(dead_code)]
pub fn sender(identity: &str) -> Sender {
    Sender::new(identity, CHANNEL)
}

/// Banned spam.example, helper/other at whitelisted, steward at operator
pub fn access_table() -> AccessTable {
    AccessTable::new(
        [BANNED],
        [
            (HELPER.to_string(), Tier::Whitelisted),
            (OTHER_HELPER.to_string(), Tier::Whitelisted),
            (OPERATOR.to_string(), Tier::Operator),
        ],
    )
    .unwrap()
}

/// Built-ins plus:
/// - `lock`: whitelisted, gated, operators bypass
/// - `hide`: whitelisted, gated for everyone
/// - `lookup`: public, ungated
/// - `fail`: public, ungated, executor always fails
/// - `wipe`: whitelisted, gated, operators bypass, executor always fails
/// - `massblock`: whitelisted, ungated, derives one `lock` per argument
/// - `purge`: whitelisted, gated, operators bypass, executor panics on `B`
/// - `reset`: operator only
/// - `orphan`: public, registered without an executor
pub fn registry() -> CommandRegistry {
    let mut registry = CommandRegistry::with_builtins();
    registry
        .register("lock", CommandSpec::gated(Tier::Whitelisted, Some(Tier::Operator)))
        .unwrap();
    registry
        .register("hide", CommandSpec::gated(Tier::Whitelisted, None))
        .unwrap();
    registry.register("lookup", CommandSpec::open(Tier::Public)).unwrap();
    registry.register("fail", CommandSpec::open(Tier::Public)).unwrap();
    registry
        .register("wipe", CommandSpec::gated(Tier::Whitelisted, Some(Tier::Operator)))
        .unwrap();
    registry
        .register("massblock", CommandSpec::open(Tier::Whitelisted))
        .unwrap();
    registry
        .register("purge", CommandSpec::gated(Tier::Whitelisted, Some(Tier::Operator)))
        .unwrap();
    registry.register("reset", CommandSpec::open(Tier::Operator)).unwrap();
    registry.register("orphan", CommandSpec::open(Tier::Public)).unwrap();
    registry
}

/// Executors that record every call into the returned log
pub fn executors(calls: &CallLog) -> ExecutorSet {
    let recording = |calls: &CallLog| {
        let calls = calls.clone();
        move |command: &Command, ctx: &mut ExecContext| -> Result<(), ExecError> {
            calls.lock().unwrap().push(command.clone());
            ctx.reply(format!("{} done", command.name));
            Ok(())
        }
    };

    let failing = |calls: &CallLog| {
        let calls = calls.clone();
        move |command: &Command, _: &mut ExecContext| -> Result<(), ExecError> {
            calls.lock().unwrap().push(command.clone());
            Err(ExecError::failure("user does not exist"))
        }
    };

    let derive_calls = calls.clone();
    let purge_calls = calls.clone();
    ExecutorSet::new()
        .with("lock", recording(calls))
        .with("hide", recording(calls))
        .with("lookup", recording(calls))
        .with("reset", recording(calls))
        .with("fail", failing(calls))
        .with("wipe", failing(calls))
        .with("purge", move |command: &Command, ctx: &mut ExecContext| -> Result<(), ExecError> {
            purge_calls.lock().unwrap().push(command.clone());
            if command.arg(0) == Some("B") {
                panic!("boom");
            }
            ctx.reply(format!("purged {}", command.args.join(" ")));
            Ok(())
        })
        .with("massblock", move |command: &Command, ctx: &mut ExecContext| -> Result<(), ExecError> {
            derive_calls.lock().unwrap().push(command.clone());
            for user in &command.args {
                ctx.enqueue(command.derive("lock", vec![user.clone()]));
            }
            Ok(())
        })
}

/// Dispatcher over the standard fixtures and a fresh call log
pub fn dispatcher() -> (Dispatcher, CallLog) {
    let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = Dispatcher::new(
        Parser::default(),
        Arc::new(access_table()),
        Arc::new(registry()),
        executors(&calls),
    );
    (dispatcher, calls)
}

/// Parse `text` as sent by `identity` in the fixture channel
#[allow(dead_code)]
pub fn parse(identity: &str, text: &str) -> Command {
    Parser::default().parse(text, &sender(identity)).unwrap()
}

/// Names of recorded executor calls
#[allow(dead_code)]
pub fn called(calls: &CallLog) -> Vec<String> {
    calls
        .lock()
        .unwrap()
        .iter()
        .map(|command| command.name.clone())
        .collect()
}

/// Reply texts only
#[allow(dead_code)]
pub fn texts(responses: &[stewardbot_core::Response]) -> Vec<String> {
    responses.iter().map(|r| r.text.clone()).collect()
}
