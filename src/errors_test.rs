use std::time::Duration;

use ::config::ConfigError;

use super::*;

#[test]
fn test_storage_and_dispatch_errors_convert_into_system_errors() {
    let e: Error = StorageError::LogStorage("io".to_string()).into();
    assert!(matches!(e, Error::System(SystemError::Storage(_))));

    let e: Error = DispatchError::NotLeader { group_id: 3 }.into();
    assert!(matches!(e, Error::System(SystemError::Dispatch(DispatchError::NotLeader { group_id: 3 }))));
}

#[test]
fn test_recoverability() {
    assert!(Error::from(SystemError::Cancelled { operation: "submit" }).is_recoverable());
    assert!(Error::from(SystemError::Timeout {
        operation: "submit",
        duration: Duration::from_secs(1),
    })
    .is_recoverable());
    assert!(!Error::Fatal("corrupted".to_string()).is_recoverable());
    assert!(!Error::Config(ConfigError::Message("bad".to_string())).is_recoverable());
}

#[test]
fn test_size_recompute_error_keeps_its_source() {
    use std::error::Error as _;

    let e = StorageError::SizeRecompute {
        group_id: 9,
        source: Box::new(StorageError::LogStorage("disk unavailable".to_string()).into()),
    };

    assert_eq!(e.to_string(), "recomputing raft log size of group 9");
    assert!(e.source().unwrap().to_string().contains("disk unavailable"));
}

#[test]
fn test_first_index_mismatch_message() {
    let e = DispatchError::FirstIndexMismatch {
        group_id: 1,
        expected: 11,
        actual: 21,
    };

    assert_eq!(e.to_string(), "group 1: expected first index 11, found 21");
}

#[test]
fn test_invariant_violation_message() {
    let v = InvariantViolation {
        new_compacted_index: 12,
        compacted_index: 10,
        last_index: 20,
        committed_index: 11,
    };

    assert_eq!(
        v.to_string(),
        "invalid truncation decision: output = 12, input: (10, 20], commit idx = 11"
    );
}
