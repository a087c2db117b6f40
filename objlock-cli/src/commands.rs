//! Subcommand handlers. Each prints JSON to stdout so the output can be
//! piped into jq or other tooling.

use objlock_core::service::LockService;
use objlock_core::types::ObjectId;
use serde_json::json;

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => {
            eprintln!("Failed to render output: {e}");
            std::process::exit(1);
        }
    }
}

pub fn list(service: &LockService) {
    let locks = service.find_active_locks();
    print_json(&json!({ "active": locks }));
}

pub fn expired(service: &LockService) {
    let locks = service.find_expired_locks();
    print_json(&json!({ "expired": locks }));
}

pub fn sweep(service: &LockService) {
    let removed = service.sweep_expired();
    print_json(&json!({ "removed": removed }));
}

pub fn check(service: &LockService, id: &str, session: Option<&str>, locker: Option<&str>) {
    let id = ObjectId::from(id);

    match (session, locker) {
        (Some(session), Some(locker)) => {
            let lock = service.find_lock_for_owner(&id, session, locker);
            print_json(&json!({
                "locked_for_owner": lock.is_some(),
                "lock": lock,
            }));
        }
        _ => {
            let lock = service.find_lock_by_object_id(&id);
            print_json(&json!({
                "locked": lock.is_some(),
                "lock": lock,
            }));
        }
    }
}

pub fn version_of(service: &LockService, id: &str) {
    let id = ObjectId::from(id);
    match service.get_locked_version(&id) {
        Ok(version) => print_json(&json!({ "object_id": id, "version": version })),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

pub fn release(service: &LockService, id: &str, session: &str, locker: &str) {
    let id = ObjectId::from(id);

    // Release is idempotent; reporting whether a matching lock existed is
    // purely informational.
    match service.find_lock_for_owner(&id, session, locker) {
        Some(lock) => {
            service.release_lock(&lock);
            print_json(&json!({ "released": true, "lock": lock }));
        }
        None => print_json(&json!({ "released": false })),
    }
}
