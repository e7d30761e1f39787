#[cfg(test)]
mod tests {
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::thread;

    use crate::action::{ActionId, ActionKind};
    use crate::chain::CursorChain;
    use crate::config::{CursorConfig, SessionConfig};
    use crate::motion_error::MotionError;
    use crate::tests::test_utils::{assert_near, default_chain, ids};

    #[test]
    fn test_stages_advance_separately() {
        let chain = default_chain().expect("Chain");
        chain.issue(ActionKind::translate(100.0, 0.0, 0.0)).expect("Issue");

        // Virtual is there at once, the rest waits
        assert_near(chain.virtual_cursor().state().expect("State").position(), [100.0, 0.0, 0.0], 1E-9);
        assert_near(chain.write_cursor().state().expect("State").position(), [0.0, 0.0, 0.0], 1E-9);
        assert_eq!(chain.write_cursor().actions_pending(), Ok(1));
        assert_eq!(chain.motion_cursor().actions_pending(), Ok(0));

        let report = chain.release_all().expect("Release");
        assert_eq!(ids(&report.applied), vec![1]);
        assert_near(chain.write_cursor().state().expect("State").position(), [100.0, 0.0, 0.0], 1E-9);
        assert_near(chain.motion_cursor().state().expect("State").position(), [0.0, 0.0, 0.0], 1E-9);
        assert_eq!(chain.motion_cursor().actions_pending(), Ok(1));

        chain.on_executed(1).expect("Executed");
        assert_near(chain.motion_cursor().state().expect("State").position(), [100.0, 0.0, 0.0], 1E-9);
        assert_eq!(chain.motion_cursor().actions_pending(), Ok(0));
        assert_eq!(chain.get_last().expect("Last").map(|a| a.id), Some(1));
    }

    #[test]
    fn test_failed_action_stays_in_virtual() {
        let chain = default_chain().expect("Chain");
        chain.issue(ActionKind::Speed { value: 10.0, relative: false }).expect("Issue");
        assert_eq!(chain.issue(ActionKind::Detach).err(), Some(MotionError::NoToolAttached));
        chain.issue(ActionKind::Speed { value: 5.0, relative: true }).expect("Issue");

        // The id is spent but the action goes no further
        assert_eq!(chain.last_id(), 3);
        assert_eq!(ids(&chain.write_cursor().pending_actions().expect("Pending")), vec![1, 3]);
        assert_eq!(ids(&chain.virtual_cursor().released_actions().expect("Released")), vec![1, 2, 3]);
        assert_eq!(chain.virtual_cursor().state().expect("State").speed, 15.0);
    }

    #[test]
    fn test_issue_needs_initialization() {
        let chain = CursorChain::new(&CursorConfig::default());
        assert!(matches!(
            chain.issue(ActionKind::Comment("too early".into())),
            Err(MotionError::NotInitialized(name)) if name == "virtual"
        ));
        chain.initialize(&SessionConfig::default().initial).expect("Initialize");
        chain.issue(ActionKind::Comment("now".into())).expect("Initialized");
        assert_eq!(chain.last_id(), 1);
    }

    #[test]
    fn test_blocks_are_released_in_order() {
        let chain = default_chain().expect("Chain");
        let issue = |n: usize| {
            for _ in 0..n {
                chain.issue(ActionKind::translate(1.0, 0.0, 0.0)).expect("Issue");
            }
        };
        issue(3);
        chain.set_block().expect("Block");
        issue(2);
        chain.set_block().expect("Block");
        issue(4);

        assert_eq!(ids(&chain.release_block().expect("First").applied), vec![1, 2, 3]);
        assert_eq!(ids(&chain.release_block().expect("Second").applied), vec![4, 5]);
        assert_eq!(ids(&chain.release_block().expect("Rest").applied), vec![6, 7, 8, 9]);
        assert!(chain.release_block().expect("Nothing").is_empty());
    }

    #[test]
    fn test_execution_feedback_up_to_id() {
        let chain = default_chain().expect("Chain");
        let issued: Vec<ActionId> = (0..8)
            .map(|i| chain.issue(ActionKind::translate(0.0, 0.0, i as f64)).expect("Issue").id)
            .collect();
        chain.release_all().expect("Release");

        let fifth = issued[4];
        let report = chain.on_executed(fifth).expect("Executed");
        assert_eq!(ids(&report.applied), vec![1, 2, 3, 4, 5]);
        assert_eq!(ids(&chain.motion_cursor().pending_actions().expect("Pending")), vec![6, 7, 8]);
        assert_near(chain.motion_cursor().state().expect("State").position(), [0.0, 0.0, 10.0], 1E-9);

        // Write side already past that point
        chain.release_up_to(100).expect("Nothing left to write");
        assert_eq!(chain.write_cursor().actions_pending(), Ok(0));
    }

    #[test]
    fn test_execution_feedback_inside_gap_is_fatal() {
        let chain = default_chain().expect("Chain");
        for _ in 0..3 {
            chain.issue(ActionKind::Comment("x".into())).expect("Issue");
        }
        chain.release_all().expect("Release");
        chain.on_executed(2).expect("Executed");

        // Id 1 is already gone: the device reports something that cannot be matched
        let result = catch_unwind(AssertUnwindSafe(|| chain.on_executed(1)));
        assert!(result.is_err());
        assert!(matches!(chain.on_executed(3), Err(MotionError::Compromised(name)) if name == "motion"));
    }

    #[test]
    fn test_concurrent_issue_keeps_order() {
        const THREADS: usize = 4;
        const PER_THREAD: usize = 50;

        let chain = default_chain().expect("Chain");
        thread::scope(|scope| {
            for t in 0..THREADS {
                let chain = &chain;
                scope.spawn(move || {
                    let mut own = Vec::with_capacity(PER_THREAD);
                    for i in 0..PER_THREAD {
                        let action = chain
                            .issue(ActionKind::Comment(format!("thread {} action {}", t, i)))
                            .expect("Issue");
                        own.push(action.id);
                    }
                    assert!(own.windows(2).all(|w| w[0] < w[1]), "Thread {} ids not increasing", t);
                });
            }
        });

        let total = (THREADS * PER_THREAD) as ActionId;
        assert_eq!(chain.last_id(), total);
        let virtual_ids = ids(&chain.virtual_cursor().released_actions().expect("Released"));
        let write_ids = ids(&chain.write_cursor().pending_actions().expect("Pending"));
        let expected: Vec<ActionId> = (1..=total).collect();
        assert_eq!(virtual_ids, expected);
        assert_eq!(write_ids, expected);
    }
}
