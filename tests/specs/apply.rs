//! Apply-loop specs: ordering, deduplication, batching, failure handling.

use crate::prelude::Harness;
use keel_adapters::HealthMonitor;
use keel_core::ApplyConfig;
use similar_asserts::assert_eq;

#[tokio::test]
async fn three_fresh_commands_dispatch_in_order_with_one_batch() {
    let harness = Harness::new();
    harness.commit_command("s0", 0, b"c0");
    harness.commit_command("s1", 1, b"c1");
    harness.commit_command("s2", 2, b"c2");
    let process = harness.process(ApplyConfig::default());

    process.notify_committed(2).await.unwrap();
    process.start().await.unwrap();

    assert_eq!(
        harness.host.dispatched(),
        vec![b"c0".to_vec(), b"c1".to_vec(), b"c2".to_vec()]
    );
    assert_eq!(harness.host.closes(), 1);
    assert_eq!(process.last_applied(), 2);
}

#[tokio::test]
async fn duplicate_of_same_operation_dispatches_once() {
    let harness = Harness::new();
    harness.commit_command("client", 0, b"op0");
    harness.commit_command("client", 0, b"op0-retry");
    harness.commit_command("client", 1, b"op1");
    let process = harness.process(ApplyConfig::default());

    process.notify_committed(2).await.unwrap();
    process.start().await.unwrap();

    assert_eq!(
        harness.host.dispatched(),
        vec![b"op0".to_vec(), b"op1".to_vec()]
    );
    assert_eq!(process.last_applied(), 2);
}

#[tokio::test]
async fn out_of_order_duplicates_preserve_dispatch_order() {
    let harness = Harness::new();
    harness.commit_command("tx100", 0, b"tx100");
    harness.commit_command("tx101", 0, b"tx101");
    harness.commit_command("tx102", 0, b"tx102");
    harness.commit_command("tx101", 0, b"tx101"); // retry of tx101
    harness.commit_command("tx100", 0, b"tx100"); // retry of tx100
    harness.commit_command("tx103", 0, b"tx103");
    harness.commit_command("tx104", 0, b"tx104");
    let process = harness.process(ApplyConfig::default());

    process.notify_committed(6).await.unwrap();
    process.start().await.unwrap();

    assert_eq!(
        harness.host.dispatched(),
        vec![
            b"tx100".to_vec(),
            b"tx101".to_vec(),
            b"tx102".to_vec(),
            b"tx103".to_vec(),
            b"tx104".to_vec(),
        ]
    );
    assert_eq!(process.last_applied(), 6);
}

#[tokio::test]
async fn fifty_entries_checkpoint_at_batch_aligned_indices() {
    let harness = Harness::new();
    for operation in 0..50 {
        harness.commit_command("bulk", operation, b"cmd");
    }
    let process = harness.process(ApplyConfig {
        batch_size: 16,
        flush_every: 10,
        clear_cache: true,
    });
    let store = harness.store();

    process.start().await.unwrap();

    // Flush points land on batch boundaries: 15, 31, 47
    process.notify_committed(15).await.unwrap();
    assert_eq!(store.load().unwrap().unwrap().applied_index, 15);

    process.notify_committed(31).await.unwrap();
    assert_eq!(store.load().unwrap().unwrap().applied_index, 31);

    process.notify_committed(47).await.unwrap();
    assert_eq!(store.load().unwrap().unwrap().applied_index, 47);

    // The tail past the last boundary applies without a new checkpoint
    process.notify_committed(49).await.unwrap();
    assert_eq!(process.last_applied(), 49);
    assert_eq!(store.load().unwrap().unwrap().applied_index, 47);
}

#[tokio::test]
async fn fifty_entries_in_one_notification_flush_thrice() {
    let harness = Harness::new();
    for operation in 0..50 {
        harness.commit_command("bulk", operation, b"cmd");
    }
    let process = harness.process(ApplyConfig {
        batch_size: 16,
        flush_every: 10,
        clear_cache: true,
    });

    process.notify_committed(49).await.unwrap();
    process.start().await.unwrap();

    assert_eq!(process.last_applied(), 49);
    // Batches close at 15, 31, 47 and once more when the target exhausts
    assert_eq!(harness.host.closes(), 4);
    assert_eq!(harness.host.opens(), 4);
    // The durable cursor stays at the last batch-aligned flush
    assert_eq!(harness.store().load().unwrap().unwrap().applied_index, 47);
}

#[tokio::test]
async fn control_entries_never_reach_the_dispatcher() {
    let harness = Harness::new();
    harness.commit_control();
    harness.commit_command("s", 0, b"cmd");
    harness.commit_control();
    harness.commit_control();
    let process = harness.process(ApplyConfig::default());

    process.notify_committed(3).await.unwrap();
    process.start().await.unwrap();

    assert_eq!(harness.host.dispatched(), vec![b"cmd".to_vec()]);
    assert_eq!(process.last_applied(), 3);
}

#[tokio::test]
async fn dispatch_failure_latches_unhealthy_and_freezes_at_last_good_index() {
    let harness = Harness::new();
    for operation in 0..5 {
        harness.commit_command("s", operation, b"cmd");
    }
    harness.host.fail_at(3);
    let process = harness.process(ApplyConfig::default());

    process.notify_committed(4).await.unwrap();
    let result = process.start().await;

    assert!(result.is_err());
    assert!(!harness.health.is_healthy());
    assert_eq!(process.last_applied(), 2);
    assert_eq!(harness.host.dispatched_indices(), vec![0, 1, 2]);

    // No progress after the freeze, even with new commit notifications
    process.notify_committed(4).await.unwrap();
    assert_eq!(process.last_applied(), 2);
}

#[tokio::test]
async fn every_fresh_command_resolves_its_submitter() {
    let harness = Harness::new();
    harness.commit_command("a", 0, b"one");
    harness.commit_command("a", 0, b"one-retry");
    harness.commit_command("b", 0, b"two");
    let process = harness.process(ApplyConfig::default());

    process.notify_committed(2).await.unwrap();
    process.start().await.unwrap();

    let completions = harness.progress.completions();
    assert_eq!(completions.len(), 2);
    assert_eq!(completions[0].0, keel_core::SessionId::new("a"));
    assert_eq!(completions[1].0, keel_core::SessionId::new("b"));
}
