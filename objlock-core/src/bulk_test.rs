#[cfg(test)]
mod tests {
    use crate::bulk::BulkOutcome;
    use crate::error::LockError;
    use crate::types::{Lock, ObjectId};

    fn make_lock(id: &str) -> Lock {
        Lock::new(ObjectId::from(id), "s1", "bob", None, 5_000, 1_000)
    }

    fn not_locked(id: &str) -> LockError {
        LockError::NotLocked {
            id: ObjectId::from(id),
        }
    }

    #[test]
    fn test_positions_match_input_order() {
        let mut outcome = BulkOutcome::with_capacity(4);
        outcome.record_ok(make_lock("a"));
        outcome.record_err(ObjectId::from("b"), not_locked("b"));
        outcome.record_ok(make_lock("c"));
        outcome.record_err(ObjectId::from("d"), not_locked("d"));

        assert_eq!(outcome.results.len(), 4);
        assert!(outcome.results[0].is_some());
        assert!(outcome.results[1].is_none());
        assert!(outcome.results[2].is_some());
        assert!(outcome.results[3].is_none());
        assert_eq!(outcome.failed_len(), 2);
        assert!(!outcome.is_complete());

        let succeeded: Vec<_> = outcome.locks().map(|l| l.object_id.as_str()).collect();
        assert_eq!(succeeded, vec!["a", "c"]);
    }

    #[test]
    fn test_all_fail_keeps_every_distinct_error() {
        let mut outcome = BulkOutcome::with_capacity(2);
        outcome.record_err(ObjectId::from("a"), not_locked("a"));
        outcome.record_err(
            ObjectId::from("b"),
            LockError::AlreadyLocked {
                id: ObjectId::from("b"),
                locker: "alice".to_string(),
                remaining_ms: 4_000,
            },
        );

        assert_eq!(outcome.failed_len(), 2);
        assert_eq!(outcome.error_for(&ObjectId::from("a")), Some(&not_locked("a")));
        assert!(matches!(
            outcome.error_for(&ObjectId::from("b")),
            Some(LockError::AlreadyLocked { locker, .. }) if locker == "alice"
        ));
    }

    #[test]
    fn test_into_result_complete() {
        let mut outcome = BulkOutcome::with_capacity(2);
        outcome.record_ok(make_lock("a"));
        outcome.record_ok(make_lock("b"));

        let locks = outcome.into_result().unwrap();
        assert_eq!(locks.len(), 2);
        assert_eq!(locks[0].object_id.as_str(), "a");
    }

    #[test]
    fn test_into_result_partial_carries_successes_and_errors() {
        let mut outcome = BulkOutcome::with_capacity(3);
        outcome.record_ok(make_lock("a"));
        outcome.record_err(ObjectId::from("b"), not_locked("b"));
        outcome.record_ok(make_lock("c"));

        let err = outcome.into_result().unwrap_err();
        let LockError::MultiOperation(failure) = err else {
            panic!("expected MultiOperation");
        };
        // Partial successes are preserved positionally, not discarded
        assert_eq!(failure.results.len(), 3);
        assert!(failure.results[0].is_some());
        assert!(failure.results[1].is_none());
        assert!(failure.results[2].is_some());
        assert_eq!(failure.errors.len(), 1);
        assert!(failure.errors.contains_key(&ObjectId::from("b")));
    }

    #[test]
    fn test_into_single_success_and_failure() {
        let id = ObjectId::from("a");

        let mut ok = BulkOutcome::with_capacity(1);
        ok.record_ok(make_lock("a"));
        assert_eq!(ok.into_single(&id).unwrap().object_id, id);

        let mut failed = BulkOutcome::with_capacity(1);
        failed.record_err(id.clone(), not_locked("a"));
        assert_eq!(failed.into_single(&id).unwrap_err(), not_locked("a"));
    }

    #[test]
    fn test_empty_outcome_is_complete() {
        let outcome = BulkOutcome::default();
        assert!(outcome.is_complete());
        assert!(outcome.into_result().unwrap().is_empty());
    }
}
