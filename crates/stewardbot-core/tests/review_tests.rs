#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{called, dispatcher, texts, CHANNEL, HELPER, OPERATOR, OTHER_HELPER};
use stewardbot_core::dispatcher::{Outcome, ReviewAction, ReviewSummary};
use stewardbot_core::{Dispatched, Dispatcher, Response, StewardError};

fn line(d: &mut Dispatcher, identity: &str, text: &str) -> Dispatched {
    d.dispatch(common::parse(identity, text))
}

fn summary(result: &Dispatched) -> &ReviewSummary {
    match &result.outcome {
        Outcome::Reviewed(summary) => summary,
        other => panic!("expected review outcome, got {:?}", other),
    }
}

/// Queue `lock` for each user as `identity`
fn queue_locks(d: &mut Dispatcher, identity: &str, users: &[&str]) {
    for user in users {
        let result = line(d, identity, &format!("!lock > {}", user));
        assert!(matches!(result.outcome, Outcome::Queued(_)));
    }
}

#[test]
fn test_commit_executes_and_removes() {
    let (mut d, calls) = dispatcher();
    queue_locks(&mut d, HELPER, &["Example"]);

    let result = line(&mut d, OPERATOR, "!commit > 1");

    assert_eq!(summary(&result).processed, vec![1]);
    assert_eq!(called(&calls), vec!["lock"]);
    assert!(d.queue().is_empty());
    // executor replies go to the queued command's sender
    assert_eq!(result.responses, vec![Response::to(CHANNEL, HELPER, "lock done")]);
}

#[test]
fn test_commit_partial_ids_reports_not_found() {
    let (mut d, calls) = dispatcher();
    queue_locks(&mut d, HELPER, &["A", "B", "C"]);
    line(&mut d, OPERATOR, "!cancel > 1,3 > quiet");

    let result = line(&mut d, OPERATOR, "!commit > 2,5");

    let summary = summary(&result);
    assert_eq!(summary.processed, vec![2]);
    assert_eq!(summary.not_found, vec![5]);
    assert_eq!(result.responses[0].text, "skipped non-queued commands [5]");
    let recorded = calls.lock().unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].args, vec!["B"]);
}

#[test]
fn test_commit_all_processes_ascending() {
    let (mut d, calls) = dispatcher();
    queue_locks(&mut d, HELPER, &["A"]);
    queue_locks(&mut d, OTHER_HELPER, &["B"]);
    queue_locks(&mut d, HELPER, &["C"]);

    let result = line(&mut d, OPERATOR, "!commit > all");

    assert_eq!(summary(&result).processed, vec![1, 2, 3]);
    let args: Vec<String> = calls
        .lock()
        .unwrap()
        .iter()
        .map(|c| c.args[0].clone())
        .collect();
    assert_eq!(args, vec!["A", "B", "C"]);
}

#[test]
fn test_owner_may_cancel_own_entry() {
    let (mut d, _) = dispatcher();
    queue_locks(&mut d, HELPER, &["A"]);

    let result = line(&mut d, HELPER, "!cancel > 1");

    assert_eq!(summary(&result).processed, vec![1]);
    assert_eq!(
        result.responses,
        vec![Response::to(CHANNEL, HELPER, "your \"lock\" command was cancelled")]
    );
    assert!(d.queue().is_empty());
}

#[test]
fn test_non_owner_cancel_is_refused_and_entry_stays() {
    let (mut d, calls) = dispatcher();
    queue_locks(&mut d, HELPER, &["A"]);

    let result = line(&mut d, OTHER_HELPER, "!cancel > 1");

    let summary = summary(&result);
    assert_eq!(summary.refused, vec![1]);
    assert!(summary.processed.is_empty());
    assert_eq!(
        texts(&result.responses),
        vec![StewardError::OwnershipViolation {
            commit_id: 1,
            owner: HELPER.to_string(),
            action: "cancel".to_string()
        }
        .to_string()]
    );
    assert!(d.queue().contains(1));
    assert!(called(&calls).is_empty());
}

#[test]
fn test_ownership_checked_per_id() {
    let (mut d, _) = dispatcher();
    queue_locks(&mut d, HELPER, &["A"]);
    queue_locks(&mut d, OTHER_HELPER, &["B"]);

    let result = line(&mut d, HELPER, "!cancel > 1,2");

    let summary = summary(&result);
    assert_eq!(summary.processed, vec![1]);
    assert_eq!(summary.refused, vec![2]);
    assert_eq!(d.queue().list_ids(), vec![2]);
}

#[test]
fn test_non_operator_cancel_all_is_owner_scoped() {
    let (mut d, _) = dispatcher();
    queue_locks(&mut d, HELPER, &["A"]);
    queue_locks(&mut d, OTHER_HELPER, &["B"]);
    queue_locks(&mut d, HELPER, &["C"]);

    let result = line(&mut d, HELPER, "!cancel > all > quiet");

    let summary = summary(&result);
    assert_eq!(summary.processed, vec![1, 3]);
    assert!(summary.refused.is_empty());
    assert_eq!(d.queue().list_ids(), vec![2]);
}

#[test]
fn test_non_operator_cancel_all_without_entries() {
    let (mut d, _) = dispatcher();
    queue_locks(&mut d, HELPER, &["A"]);

    let result = line(&mut d, OTHER_HELPER, "!cancel > all");

    assert_eq!(texts(&result.responses), vec!["you have no queued commands"]);
    assert!(d.queue().contains(1));
}

#[test]
fn test_public_sender_cannot_cancel_foreign_entry() {
    let (mut d, _) = dispatcher();
    // hide is gated for everyone, so even the operator queues
    line(&mut d, OPERATOR, "!hide > A");
    let queued = line(&mut d, OPERATOR, "!hide > B");
    assert_eq!(queued.outcome, Outcome::Queued(2));

    let foreign = line(&mut d, "nobody.example", "!cancel > 2");
    assert_eq!(summary(&foreign).refused, vec![2]);

    let own = line(&mut d, OPERATOR, "!cancel > 2");
    assert_eq!(summary(&own).processed, vec![2]);
}

#[test]
fn test_operator_may_act_on_any_entry() {
    let (mut d, calls) = dispatcher();
    queue_locks(&mut d, HELPER, &["A"]);
    queue_locks(&mut d, OTHER_HELPER, &["B"]);

    let cancelled = line(&mut d, OPERATOR, "!cancel > 1");
    let committed = line(&mut d, OPERATOR, "!commit > 2");

    assert_eq!(summary(&cancelled).processed, vec![1]);
    assert_eq!(summary(&committed).processed, vec![2]);
    assert_eq!(called(&calls), vec!["lock"]);
    assert!(d.queue().is_empty());
}

#[test]
fn test_cancel_notifies_owner_in_queued_origin() {
    let (mut d, _) = dispatcher();
    let from_elsewhere = stewardbot_core::Sender::new(HELPER, "#other-channel");
    let command = stewardbot_core::Parser::default()
        .parse("!lock > A", &from_elsewhere)
        .unwrap();
    d.dispatch(command);

    let result = line(&mut d, OPERATOR, "!cancel > 1");

    assert_eq!(
        result.responses,
        vec![Response::to("#other-channel", HELPER, "your \"lock\" command was cancelled")]
    );
}

#[test]
fn test_quiet_multi_cancel_single_summary() {
    let (mut d, _) = dispatcher();
    queue_locks(&mut d, HELPER, &["A", "B", "C"]);

    let result = line(&mut d, OPERATOR, "!cancel > 1,2,3 > quiet");

    assert_eq!(result.responses, vec![Response::to(CHANNEL, OPERATOR, "done")]);
    assert_eq!(summary(&result).processed, vec![1, 2, 3]);
}

#[test]
fn test_verbose_commit_echoes_each_command() {
    let (mut d, _) = dispatcher();
    queue_locks(&mut d, HELPER, &["A", "B"]);

    let result = line(&mut d, OPERATOR, "!commit > all > verbose");

    let echoes: Vec<String> = texts(&result.responses)
        .into_iter()
        .filter(|t| t.starts_with("committed #"))
        .collect();
    assert_eq!(echoes, vec!["committed #1: !lock > A", "committed #2: !lock > B"]);
}

#[test]
fn test_verbose_cancel_echoes_each_command() {
    let (mut d, _) = dispatcher();
    queue_locks(&mut d, HELPER, &["A"]);

    let result = line(&mut d, OPERATOR, "!cancel > 1 > VERBOSE");

    assert_eq!(texts(&result.responses), vec!["cancelled #1: !lock > A"]);
}

#[test]
fn test_empty_queue_reply_precedes_id_parsing() {
    let (mut d, _) = dispatcher();

    let result = line(&mut d, OPERATOR, "!commit > not-a-number");

    assert_eq!(texts(&result.responses), vec!["there are no queued commands"]);
    assert_eq!(summary(&result).action, ReviewAction::Commit);
}

#[test]
fn test_no_matching_ids() {
    let (mut d, _) = dispatcher();
    queue_locks(&mut d, HELPER, &["A"]);

    let result = line(&mut d, OPERATOR, "!commit > 7,8");

    assert_eq!(
        texts(&result.responses),
        vec!["there are no queued commands with the given commit ids"]
    );
    assert!(d.queue().contains(1));
}

#[test]
fn test_invalid_id_spec() {
    let (mut d, _) = dispatcher();
    queue_locks(&mut d, HELPER, &["A"]);

    let result = line(&mut d, OPERATOR, "!commit > 1,x");

    assert_eq!(
        result.outcome,
        Outcome::Failed(StewardError::InvalidIdSpec {
            token: "x".to_string()
        })
    );
    assert!(d.queue().contains(1));
}

#[test]
fn test_invalid_option() {
    let (mut d, _) = dispatcher();
    queue_locks(&mut d, HELPER, &["A"]);

    let result = line(&mut d, OPERATOR, "!commit > 1 > loud");

    assert_eq!(
        texts(&result.responses),
        vec!["\"loud\" is not a valid option, must be one of [quiet, verbose]"]
    );
    assert!(d.queue().contains(1));
}

#[test]
fn test_argument_count_checked() {
    let (mut d, _) = dispatcher();

    let missing = line(&mut d, OPERATOR, "!commit");
    let extra = line(&mut d, OPERATOR, "!cancel > 1 > quiet > now");

    assert_eq!(texts(&missing.responses), vec!["need more arguments for 'commit'"]);
    assert_eq!(texts(&extra.responses), vec!["too many arguments for 'cancel'"]);
}

#[test]
fn test_failed_commit_is_removed_and_batch_continues() {
    let (mut d, calls) = dispatcher();
    line(&mut d, HELPER, "!wipe > A");
    queue_locks(&mut d, HELPER, &["B"]);

    let result = line(&mut d, OPERATOR, "!commit > all");

    let summary = summary(&result);
    assert_eq!(summary.failed, vec![1]);
    assert_eq!(summary.processed, vec![2]);
    assert!(d.queue().is_empty());
    assert_eq!(called(&calls), vec!["wipe", "lock"]);
    assert_eq!(result.responses[0], Response::to(CHANNEL, HELPER, "user does not exist"));
}

#[test]
fn test_committed_ids_are_not_reused() {
    let (mut d, _) = dispatcher();
    queue_locks(&mut d, HELPER, &["A", "B"]);
    line(&mut d, OPERATOR, "!commit > all");

    let next = line(&mut d, HELPER, "!lock > C");

    assert_eq!(next.outcome, Outcome::Queued(3));
}

#[test]
fn test_quiet_commit_reports_failed_ids() {
    let (mut d, _) = dispatcher();
    line(&mut d, HELPER, "!wipe > A");

    let result = line(&mut d, OPERATOR, "!commit > all > quiet");

    assert_eq!(
        result.responses,
        vec![
            Response::to(CHANNEL, HELPER, "user does not exist"),
            Response::to(CHANNEL, OPERATOR, "done; failed [1]"),
        ]
    );
}

#[test]
fn test_quiet_cancel_reports_refused_ids() {
    let (mut d, _) = dispatcher();
    queue_locks(&mut d, HELPER, &["A"]);
    queue_locks(&mut d, OTHER_HELPER, &["B"]);

    let result = line(&mut d, HELPER, "!cancel > 1,2 > quiet");

    assert_eq!(
        result.responses.last(),
        Some(&Response::to(CHANNEL, HELPER, "done; refused [2]"))
    );
}

#[test]
fn test_executor_panic_is_contained_to_its_commit_id() {
    let (mut d, calls) = dispatcher();
    for user in ["A", "B", "C"] {
        line(&mut d, HELPER, &format!("!purge > {}", user));
    }

    let responses = d.handle_line_guarded("!commit > all", &common::sender(OPERATOR));

    let args: Vec<String> = calls
        .lock()
        .unwrap()
        .iter()
        .map(|c| c.args[0].clone())
        .collect();
    assert_eq!(args, vec!["A", "B", "C"]);
    assert_eq!(
        texts(&responses),
        vec![
            "purged A".to_string(),
            "Internal error: commit id 2 raised an unhandled exception: boom".to_string(),
            "purged C".to_string(),
        ]
    );
    assert_eq!(responses[1], Response::to(CHANNEL, HELPER, responses[1].text.clone()));
    assert!(d.queue().is_empty());
}

#[test]
fn test_executor_panic_is_recorded_as_failed() {
    let (mut d, _) = dispatcher();
    line(&mut d, HELPER, "!purge > A");
    line(&mut d, HELPER, "!purge > B");

    let result = line(&mut d, OPERATOR, "!commit > 1,2");

    let summary = summary(&result);
    assert_eq!(summary.processed, vec![1]);
    assert_eq!(summary.failed, vec![2]);
}
