//! Contract Tests for Queue Lifecycle
//!
//! Reference counting, deferred destruction and the empty callback.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use mosaicmux::models::{Command, CommandEntry, MouseEvent};
use mosaicmux::{CauseSink, CmdQueue, CmdRetval, QueueStatus, ReleaseStatus};
use test_utils::{control_client, recording_table};

#[test]
fn test_release_counts_down_to_destruction() {
    let (table, _) = recording_table();
    let cmdq = CmdQueue::new(None, CauseSink::new());
    assert_eq!(cmdq.references(), 1);

    cmdq.retain();
    cmdq.retain();
    cmdq.append(&table.parse("record queued", None, 0).unwrap(), None);

    assert_eq!(cmdq.release(), ReleaseStatus::Referenced);
    assert_eq!(cmdq.release(), ReleaseStatus::Referenced);
    assert!(!cmdq.is_destroyed());
    assert_eq!(cmdq.len(), 1);

    assert_eq!(cmdq.release(), ReleaseStatus::Destroyed);
    assert!(cmdq.is_destroyed());
    assert!(cmdq.is_empty());
}

#[test]
fn test_dead_queue_reports_still_busy() {
    let cmdq = CmdQueue::new(None, CauseSink::new());
    cmdq.retain();
    cmdq.mark_dead();
    assert!(cmdq.is_dead());

    assert_eq!(cmdq.release(), ReleaseStatus::StillBusy);
    assert_eq!(cmdq.release(), ReleaseStatus::Destroyed);
}

#[test]
fn test_release_during_continue_defers_destruction() {
    let k = 3;
    let destroyed_inside = Rc::new(Cell::new(None));
    let seen = Rc::clone(&destroyed_inside);

    let (mut table, recorder) = recording_table();
    table.register(CommandEntry::new(
        "drop-self",
        move |_: &Command, cmdq: &CmdQueue| {
            for _ in 0..=k {
                cmdq.release();
            }
            seen.set(Some(cmdq.is_destroyed()));
            CmdRetval::Normal
        },
    ));

    let cmdq = CmdQueue::new(Some(control_client("c")), CauseSink::new());
    for _ in 0..k {
        cmdq.retain();
    }

    let status = cmdq.run(&table.parse("drop-self ; record still-running", None, 0).unwrap(), None);

    assert_eq!(status, Some(QueueStatus::Empty));
    assert_eq!(destroyed_inside.get(), Some(false));
    assert_eq!(*recorder.borrow(), vec!["still-running"]);
    assert!(cmdq.is_destroyed());
    assert_eq!(cmdq.references(), 0);
}

#[test]
fn test_destroy_flushes_and_drops_callback() {
    let (table, _) = recording_table();
    let cmdq = CmdQueue::new(None, CauseSink::new());
    let fired = Rc::new(Cell::new(false));
    let flag = Rc::clone(&fired);
    cmdq.set_empty_callback(move |_| flag.set(true));

    let list = table.parse("record a", None, 0).unwrap();
    cmdq.append(&list, None);
    assert_eq!(list.references(), 2);

    assert_eq!(cmdq.release(), ReleaseStatus::Destroyed);
    assert_eq!(list.references(), 1);
    assert!(!fired.get());
}

#[test]
fn test_continue_on_destroyed_queue_is_harmless() {
    let (table, recorder) = recording_table();
    let cmdq = CmdQueue::new(None, CauseSink::new());
    cmdq.release();

    let list = table.parse("record late", None, 0).unwrap();
    cmdq.append(&list, None);
    assert!(cmdq.is_empty());
    assert_eq!(list.references(), 1);

    assert_eq!(cmdq.continue_processing(), QueueStatus::Empty);
    assert!(recorder.borrow().is_empty());
}

#[test]
fn test_empty_callback_fires_once_per_registration() {
    let (table, _) = recording_table();
    let cmdq = CmdQueue::new(None, CauseSink::new());
    let count = Rc::new(Cell::new(0));
    let counter = Rc::clone(&count);
    cmdq.set_empty_callback(move |q| {
        assert!(q.is_empty());
        counter.set(counter.get() + 1);
    });

    cmdq.run(&table.parse("record a ; wait ; record b", None, 0).unwrap(), None);
    assert_eq!(count.get(), 0);
    cmdq.continue_processing();
    assert_eq!(count.get(), 1);

    cmdq.run(&table.parse("record c", None, 0).unwrap(), None);
    assert_eq!(count.get(), 1);
}

#[test]
fn test_continue_on_empty_queue_fires_callback() {
    let cmdq = CmdQueue::new(None, CauseSink::new());
    let count = Rc::new(Cell::new(0));
    let counter = Rc::clone(&count);
    cmdq.set_empty_callback(move |_| counter.set(counter.get() + 1));

    assert_eq!(cmdq.continue_processing(), QueueStatus::Empty);
    assert_eq!(count.get(), 1);
}

#[test]
fn test_batches_are_shared_not_copied() {
    let (table, _) = recording_table();
    let first = CmdQueue::new(None, CauseSink::new());
    let second = CmdQueue::new(None, CauseSink::new());
    let list = table.parse("record shared", None, 0).unwrap();

    first.append(&list, None);
    second.append(&list, None);
    assert_eq!(list.references(), 3);

    first.continue_processing();
    assert_eq!(list.references(), 2);
    second.flush();
    assert_eq!(list.references(), 1);
}

#[test]
fn test_mouse_event_visible_only_while_running() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let slot = Rc::clone(&seen);
    let (mut table, _) = recording_table();
    table.register(CommandEntry::new(
        "click",
        move |_: &Command, cmdq: &CmdQueue| {
            slot.borrow_mut().push(cmdq.mouse_event());
            CmdRetval::Normal
        },
    ));

    let cmdq = CmdQueue::new(None, CauseSink::new());
    let event = MouseEvent::new(4, 2, 0).with_pane(3);
    let list = table.parse("click", None, 0).unwrap();

    cmdq.append(&list, Some(&event));
    assert_eq!(cmdq.mouse_event(), None);
    cmdq.append(&list, Some(&MouseEvent::default()));
    cmdq.continue_processing();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].map(|m| (m.x, m.y, m.pane_id)), Some((4, 2, Some(3))));
    assert_eq!(seen[1], None);
}

#[test]
fn test_command_position_tracks_execution() {
    let positions = Rc::new(RefCell::new(Vec::new()));
    let slot = Rc::clone(&positions);
    let (mut table, _) = recording_table();
    table.register(CommandEntry::new(
        "where",
        move |cmd: &Command, cmdq: &CmdQueue| {
            let current = cmdq.current_command().map(|c| c.args.clone());
            slot.borrow_mut().push((current, cmd.args.clone(), cmdq.number()));
            CmdRetval::Normal
        },
    ));

    let cmdq = CmdQueue::new(None, CauseSink::new());
    cmdq.run(&table.parse("where 1 ; where 2", None, 0).unwrap(), None);

    let positions = positions.borrow();
    assert_eq!(positions[0], (Some(vec!["1".to_string()]), vec!["1".to_string()], 1));
    assert_eq!(positions[1], (Some(vec!["2".to_string()]), vec!["2".to_string()], 2));
    assert_eq!(cmdq.current_command().map(|c| c.args), None);
}
