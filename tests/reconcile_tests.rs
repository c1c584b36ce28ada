// Unit tests for the reconciliation buffer.
//
// The buffer must pair metadata and blob halves for the same index no
// matter which arrives first, hand out each complete unit exactly once,
// and treat post-commit repeats as duplicates.

use media_ingest::reconcile::{Offer, StreamBuffer, UnitMetadata};

fn meta_with_duration(duration_ms: u64) -> UnitMetadata {
    UnitMetadata {
        duration_ms: Some(duration_ms),
        ..Default::default()
    }
}

#[test]
fn test_metadata_then_blob_completes() {
    let mut buffer = StreamBuffer::new();

    assert!(matches!(
        buffer.offer_metadata(0, meta_with_duration(9990)),
        Offer::Pending
    ));
    assert_eq!(buffer.pending_len(), 1);

    match buffer.offer_blob(0, vec![1, 2, 3]) {
        Offer::Ready(unit) => {
            assert_eq!(unit.index, 0);
            assert_eq!(unit.metadata.duration_ms, Some(9990));
            assert_eq!(unit.blob, vec![1, 2, 3]);
            assert_eq!(unit.attempts, 0);
        }
        other => panic!("Expected Ready, got {:?}", other),
    }

    assert_eq!(buffer.pending_len(), 0, "Ready unit leaves the buffer");
}

#[test]
fn test_blob_then_metadata_completes_identically() {
    let mut buffer = StreamBuffer::new();

    assert!(matches!(buffer.offer_blob(0, vec![1, 2, 3]), Offer::Pending));

    match buffer.offer_metadata(0, meta_with_duration(9990)) {
        Offer::Ready(unit) => {
            assert_eq!(unit.metadata.duration_ms, Some(9990));
            assert_eq!(unit.blob, vec![1, 2, 3]);
        }
        other => panic!("Expected Ready, got {:?}", other),
    }
}

#[test]
fn test_repeat_half_before_commit_replaces_it() {
    let mut buffer = StreamBuffer::new();

    buffer.offer_metadata(5, meta_with_duration(1000));
    buffer.offer_metadata(5, meta_with_duration(2000));
    assert_eq!(buffer.pending_len(), 1, "Repeat must not create a second entry");

    match buffer.offer_blob(5, vec![9]) {
        Offer::Ready(unit) => {
            assert_eq!(unit.metadata.duration_ms, Some(2000), "Later metadata wins");
        }
        other => panic!("Expected Ready, got {:?}", other),
    }
}

#[test]
fn test_arrival_after_commit_is_duplicate() {
    let mut buffer = StreamBuffer::new();

    buffer.offer_metadata(0, meta_with_duration(100));
    let unit = match buffer.offer_blob(0, vec![1]) {
        Offer::Ready(unit) => unit,
        other => panic!("Expected Ready, got {:?}", other),
    };
    buffer.mark_committed(unit.index);

    assert!(matches!(
        buffer.offer_metadata(0, meta_with_duration(100)),
        Offer::Duplicate
    ));
    assert!(matches!(buffer.offer_blob(0, vec![1]), Offer::Duplicate));
    assert_eq!(buffer.pending_len(), 0, "Duplicates leave no residue");
    assert!(buffer.is_committed(0));
}

#[test]
fn test_restore_bumps_attempts_and_retries_on_next_arrival() {
    let mut buffer = StreamBuffer::new();

    buffer.offer_metadata(3, meta_with_duration(50));
    let unit = match buffer.offer_blob(3, vec![7, 7]) {
        Offer::Ready(unit) => unit,
        other => panic!("Expected Ready, got {:?}", other),
    };

    // Commit failed; unit goes back for retry.
    buffer.restore(unit);
    assert_eq!(buffer.pending_len(), 1);

    // The next related arrival (a client resend of either half) yields the
    // unit again with the attempt count carried forward.
    match buffer.offer_blob(3, vec![7, 7]) {
        Offer::Ready(unit) => {
            assert_eq!(unit.attempts, 1);
            assert_eq!(unit.metadata.duration_ms, Some(50));
        }
        other => panic!("Expected Ready, got {:?}", other),
    }
}

#[test]
fn test_take_retryable_pulls_only_complete_units() {
    let mut buffer = StreamBuffer::new();

    // A half-arrived unit and a restored complete unit.
    buffer.offer_metadata(1, meta_with_duration(10));
    buffer.offer_metadata(2, meta_with_duration(20));
    let unit = match buffer.offer_blob(2, vec![4]) {
        Offer::Ready(unit) => unit,
        other => panic!("Expected Ready, got {:?}", other),
    };
    buffer.restore(unit);

    let retryable = buffer.take_retryable();
    assert_eq!(retryable.len(), 1);
    assert_eq!(retryable[0].index, 2);
    assert_eq!(buffer.pending_len(), 1, "Partial entry for index 1 remains");
}

#[test]
fn test_drain_clears_pending() {
    let mut buffer = StreamBuffer::new();

    buffer.offer_metadata(0, meta_with_duration(1));
    buffer.offer_blob(1, vec![1]);
    buffer.offer_metadata(2, meta_with_duration(3));

    assert_eq!(buffer.drain(), 3);
    assert_eq!(buffer.pending_len(), 0);
}

#[test]
fn test_independent_indices_do_not_interfere() {
    let mut buffer = StreamBuffer::new();

    buffer.offer_metadata(0, meta_with_duration(1));
    buffer.offer_blob(1, vec![1]);

    assert_eq!(buffer.pending_len(), 2);

    // Completing index 1 leaves index 0 untouched.
    match buffer.offer_metadata(1, meta_with_duration(2)) {
        Offer::Ready(unit) => assert_eq!(unit.index, 1),
        other => panic!("Expected Ready, got {:?}", other),
    }
    assert_eq!(buffer.pending_len(), 1);
}
