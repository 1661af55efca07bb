//! Integration Tests for Error Handling
//!
//! These tests verify that failing commands and bad input are reported to
//! the right place and never take down more than they should.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use mosaicmux::models::{Command, CommandList, FindState};
use mosaicmux::{CauseSink, CmdQueue, Error, QueueStatus};
use test_utils::{attached_client, control_client, detached_client, guard_lines, recording_table};

#[test]
fn test_unknown_command_is_a_parse_error() {
    let (table, _) = recording_table();
    let result = table.parse("no-such-command", None, 0);
    assert!(matches!(result, Err(Error::UnknownCommand { ref name }) if name == "no-such-command"));
}

#[test]
fn test_ambiguous_prefix_lists_candidates() {
    let (table, _) = recording_table();
    match table.parse("record-", None, 0) {
        Err(Error::AmbiguousCommand { candidates, .. }) => {
            assert_eq!(candidates, vec!["record-fail", "record-hooked"]);
        }
        other => panic!("expected ambiguous command, got {:?}", other.map(|l| l.len())),
    }
}

#[test]
fn test_syntax_errors_carry_location() {
    let (table, _) = recording_table();
    let err = table.parse("record 'open", Some("cmds.conf"), 4).unwrap_err();
    assert_eq!(err.to_string(), "cmds.conf:4: unterminated quote");
}

#[test]
fn test_failure_sets_client_return_value() {
    let (table, recorder) = recording_table();
    let client = detached_client("c", true);
    let cmdq = CmdQueue::new(Some(client.clone()), CauseSink::new());

    cmdq.run(&table.parse("record-fail x ; record y", None, 0).unwrap(), None);
    cmdq.run(&table.parse("record z", None, 0).unwrap(), None);

    let c = client.borrow();
    assert_eq!(c.stderr(), "x failed\n");
    assert_eq!(c.stderr_pushes(), 1);
    assert_eq!(c.retval, 1);
    assert_eq!(*recorder.borrow(), vec!["x", "z"]);
}

#[test]
fn test_invalid_explicit_target_fails_command() {
    let (table, recorder) = recording_table();
    let (_, session) = attached_client("owner");
    let client = control_client("c");
    let cmdq = CmdQueue::new(Some(client.clone()), CauseSink::new());

    let entry = table.find("record").unwrap();
    let stale = Command::new(entry.clone(), vec!["never".to_string()])
        .with_target(FindState::new(&session, 7, 0));
    let after = Command::new(entry, vec!["skipped".to_string()]);
    let list = CommandList::new(vec![stale, after]);

    assert_eq!(cmdq.run(&list, None), Some(QueueStatus::Empty));
    assert!(recorder.borrow().is_empty());

    let c = client.borrow();
    assert_eq!(c.stderr(), "can't find session\n");
    assert_eq!(c.retval, 1);
    let phases: Vec<String> = guard_lines(c.stdout()).into_iter().map(|g| g.phase).collect();
    assert_eq!(phases, vec!["begin", "error"]);
}

#[test]
fn test_valid_explicit_target_is_bound_during_exec() {
    let (mut table, _) = recording_table();
    let (_, session) = attached_client("owner");
    let seen = std::rc::Rc::new(std::cell::RefCell::new(None));
    let slot = std::rc::Rc::clone(&seen);
    table.register(mosaicmux::models::CommandEntry::new(
        "peek",
        move |_: &Command, cmdq: &CmdQueue| {
            *slot.borrow_mut() = Some(cmdq.target());
            mosaicmux::CmdRetval::Normal
        },
    ));

    let target = FindState::from_session(&session);
    let cmd = Command::new(table.find("peek").unwrap(), Vec::new()).with_target(target.clone());
    let cmdq = CmdQueue::new(None, CauseSink::new());
    cmdq.run(&CommandList::new(vec![cmd]), None);

    assert_eq!(seen.borrow().as_ref(), Some(&target));
}

#[test]
fn test_errors_without_client_become_causes() {
    let (table, _) = recording_table();
    let causes = CauseSink::new();
    let cmdq = CmdQueue::new(None, causes.clone());

    cmdq.run(&table.parse("fail bad option", Some("startup.conf"), 12).unwrap(), None);

    let recorded = causes.causes();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].file.as_deref(), Some("startup.conf"));
    assert_eq!(recorded[0].line, 12);
    assert_eq!(recorded[0].to_string(), "startup.conf:12: bad option");
}

#[test]
fn test_interactive_error_goes_to_status_line() {
    let (table, _) = recording_table();
    let (client, session) = attached_client("c");
    let cmdq = CmdQueue::new(Some(client.clone()), CauseSink::new());

    cmdq.run(&table.parse("fail no such window", None, 0).unwrap(), None);

    let c = client.borrow();
    assert_eq!(c.message(), Some("No such window"));
    assert_eq!(c.stderr(), "");
    assert_eq!(c.retval, 0);
    assert!(session.borrow().active_pane().output_lines().is_empty());
}

#[test]
fn test_error_is_sanitized_without_utf8() {
    let (table, _) = recording_table();
    let client = detached_client("c", false);
    let cmdq = CmdQueue::new(Some(client.clone()), CauseSink::new());

    cmdq.run(&table.parse("fail 'caf\u{e9}\ttab'", None, 0).unwrap(), None);
    assert_eq!(client.borrow().stderr(), "caf__tab\n");
}
