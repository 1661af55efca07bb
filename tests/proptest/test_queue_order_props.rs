//! Property-based tests for queue ordering

#[path = "../test_utils/mod.rs"]
mod test_utils;

use std::cell::Cell;
use std::rc::Rc;

use mosaicmux::{CauseSink, CmdQueue, QueueStatus};
use proptest::prelude::*;
use test_utils::{control_client, guard_lines, recording_table};

/// One command in a generated batch: its tag and whether it fails
type Step = (u32, bool);

fn batch_text(batch: &[Step]) -> String {
    batch
        .iter()
        .map(|(tag, fails)| {
            if *fails {
                format!("record-fail {}", tag)
            } else {
                format!("record {}", tag)
            }
        })
        .collect::<Vec<_>>()
        .join(" ; ")
}

/// Tags expected to run: each batch up to and including its first failure
fn expected_run(batches: &[Vec<Step>]) -> Vec<String> {
    let mut ran = Vec::new();
    for batch in batches {
        for (tag, fails) in batch {
            ran.push(tag.to_string());
            if *fails {
                break;
            }
        }
    }
    ran
}

fn batches_strategy(fail_weight: u32) -> impl Strategy<Value = Vec<Vec<Step>>> {
    let step = (0u32..1000, prop::bool::weighted(fail_weight as f64 / 100.0));
    prop::collection::vec(prop::collection::vec(step, 1..6), 1..8)
}

proptest! {
    #[test]
    fn test_successful_batches_run_in_order(batches in batches_strategy(0)) {
        let (table, recorder) = recording_table();
        let cmdq = CmdQueue::new(None, CauseSink::new());
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        cmdq.set_empty_callback(move |_| counter.set(counter.get() + 1));

        for batch in &batches {
            cmdq.append(&table.parse(&batch_text(batch), None, 0).unwrap(), None);
        }
        prop_assert_eq!(cmdq.continue_processing(), QueueStatus::Empty);

        prop_assert_eq!(recorder.borrow().clone(), expected_run(&batches));
        prop_assert!(cmdq.is_idle());
        prop_assert_eq!(fired.get(), 1);
        let total: usize = batches.iter().map(Vec::len).sum();
        prop_assert_eq!(cmdq.number() as usize, total);
    }

    #[test]
    fn test_failures_only_abort_their_batch(batches in batches_strategy(30)) {
        let (table, recorder) = recording_table();
        let client = control_client("ctl");
        let cmdq = CmdQueue::new(Some(client.clone()), CauseSink::new());

        for batch in &batches {
            cmdq.append(&table.parse(&batch_text(batch), None, 0).unwrap(), None);
        }
        cmdq.continue_processing();

        let expected = expected_run(&batches);
        prop_assert_eq!(recorder.borrow().clone(), expected.clone());

        let c = client.borrow();
        let guards = guard_lines(c.stdout());
        prop_assert_eq!(guards.len(), expected.len() * 2);
        prop_assert!(guards.windows(2).all(|w| w[0].number <= w[1].number));

        let failures = batches
            .iter()
            .filter(|batch| batch.iter().any(|(_, fails)| *fails))
            .count();
        let errors = guards.iter().filter(|g| g.phase == "error").count();
        prop_assert_eq!(errors, failures);
        prop_assert_eq!(c.retval, if failures > 0 { 1 } else { 0 });
    }

    #[test]
    fn test_waits_resume_at_next_command(
        before in prop::collection::vec(0u32..1000, 0..5),
        after in prop::collection::vec(0u32..1000, 0..5),
    ) {
        let (table, recorder) = recording_table();
        let cmdq = CmdQueue::new(None, CauseSink::new());

        let mut parts: Vec<String> = before.iter().map(|t| format!("record {}", t)).collect();
        parts.push("wait".to_string());
        parts.extend(after.iter().map(|t| format!("record {}", t)));

        let status = cmdq.run(&table.parse(&parts.join(" ; "), None, 0).unwrap(), None);
        prop_assert_eq!(status, Some(QueueStatus::Waiting));
        prop_assert_eq!(recorder.borrow().len(), before.len());

        prop_assert_eq!(cmdq.continue_processing(), QueueStatus::Empty);
        let expected: Vec<String> = before.iter().chain(after.iter()).map(u32::to_string).collect();
        prop_assert_eq!(recorder.borrow().clone(), expected);
    }

    #[test]
    fn test_stop_discards_the_rest(
        batches in batches_strategy(0),
        stop_batch in 0usize..8,
    ) {
        let (table, recorder) = recording_table();
        let cmdq = CmdQueue::new(None, CauseSink::new());
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        cmdq.set_empty_callback(move |_| counter.set(counter.get() + 1));

        let stop_at = stop_batch % batches.len();
        for (index, batch) in batches.iter().enumerate() {
            let mut text = batch_text(batch);
            if index == stop_at {
                text.push_str(" ; stop-queue ; record 9999");
            }
            cmdq.append(&table.parse(&text, None, 0).unwrap(), None);
        }
        cmdq.continue_processing();

        let expected = expected_run(&batches[..=stop_at]);
        prop_assert_eq!(recorder.borrow().clone(), expected);
        prop_assert!(cmdq.is_empty());
        prop_assert_eq!(fired.get(), 1);
    }
}
