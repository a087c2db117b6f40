#[cfg(test)]
mod tests {
    use crate::infrastructure::LockStore;
    use crate::infrastructure_in_memory::InMemoryLockStore;
    use crate::types::{Lock, ObjectId};

    fn make_lock(id: &str, locker: &str, now: u64) -> Lock {
        Lock::new(ObjectId::from(id), "s1", locker, Some(7), 5_000, now)
    }

    #[test]
    fn test_in_memory_put_get_remove() {
        let mut store = InMemoryLockStore::new();
        assert!(store.is_empty());

        let lock = make_lock("page-1", "bob", 1_000);
        store.put(lock.clone());

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&ObjectId::from("page-1")), Some(lock));
        assert_eq!(store.get(&ObjectId::from("page-2")), None);

        assert!(store.remove(&ObjectId::from("page-1")));
        assert!(!store.remove(&ObjectId::from("page-1")));
        assert!(store.is_empty());
    }

    #[test]
    fn test_in_memory_put_replaces_row() {
        let mut store = InMemoryLockStore::new();
        store.put(make_lock("page-1", "bob", 1_000));

        let mut replacement = make_lock("page-1", "alice", 2_000);
        replacement.session = "s2".to_string();
        store.put(replacement.clone());

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&ObjectId::from("page-1")), Some(replacement));
    }

    #[test]
    fn test_in_memory_scan() {
        let mut store = InMemoryLockStore::new();
        store.put(make_lock("a", "bob", 1_000));
        store.put(make_lock("b", "alice", 1_000));
        store.put(make_lock("c", "bob", 1_000));

        let bobs = store.scan(&|l| l.locker == "bob");
        assert_eq!(bobs.len(), 2);

        let expired = store.scan(&|l| !l.is_active(10_000));
        assert_eq!(expired.len(), 3);
    }

    #[cfg(feature = "sqlite")]
    mod sqlite {
        use super::make_lock;
        use crate::infrastructure::LockStore;
        use crate::infrastructure_sqlite::SqliteLockStore;
        use crate::types::ObjectId;

        #[test]
        fn test_sqlite_put_get_remove() {
            let mut store = SqliteLockStore::open_in_memory().unwrap();

            let lock = make_lock("page-1", "bob", 1_000);
            store.put(lock.clone());

            assert_eq!(store.len(), 1);
            assert_eq!(store.get(&ObjectId::from("page-1")), Some(lock));
            assert!(store.remove(&ObjectId::from("page-1")));
            assert!(!store.remove(&ObjectId::from("page-1")));
            assert_eq!(store.len(), 0);
        }

        #[test]
        fn test_sqlite_get_missing_row_is_none() {
            let store = SqliteLockStore::open_in_memory().unwrap();
            assert_eq!(store.get(&ObjectId::from("absent")), None);
        }

        #[test]
        fn test_sqlite_absent_version_round_trips() {
            let mut store = SqliteLockStore::open_in_memory().unwrap();

            let mut lock = make_lock("tpl-9", "bob", 1_000);
            lock.version = None;
            store.put(lock);

            let loaded = store.get(&ObjectId::from("tpl-9")).unwrap();
            assert_eq!(loaded.version, None);
        }

        #[test]
        fn test_sqlite_scan_by_predicate() {
            let mut store = SqliteLockStore::open_in_memory().unwrap();
            store.put(make_lock("a", "bob", 1_000));
            store.put(make_lock("b", "alice", 4_000));

            // a expires at 6_000, b at 9_000
            let expired = store.scan(&|l| !l.is_active(7_000));
            assert_eq!(expired.len(), 1);
            assert_eq!(expired[0].object_id.as_str(), "a");
        }
    }
}
