//! Recovery specs: checkpointed progress survives a restart and replays
//! only the log tail.

use crate::prelude::Harness;
use keel_adapters::{BoundedEntryCache, FakeDispatcherHost, FakeProgress, HealthLatch};
use keel_core::ApplyConfig;
use keel_engine::{ApplicationProcess, ProcessDeps, ProcessError};

#[tokio::test]
async fn restart_replays_only_the_tail_since_the_checkpoint() {
    let harness = Harness::new();
    for operation in 0..20 {
        harness.commit_command("writer", operation, b"cmd");
    }

    {
        let process = harness.process(ApplyConfig {
            batch_size: 8,
            flush_every: 8,
            clear_cache: true,
        });
        process.notify_committed(19).await.unwrap();
        process.start().await.unwrap();
        assert_eq!(process.last_applied(), 19);
        // Durable progress stops at the last batch-aligned flush
        assert_eq!(harness.store().load().unwrap().unwrap().applied_index, 15);
    }

    // Restart: fresh process, same log and checkpoint, empty cache
    let replay_host = FakeDispatcherHost::new();
    let restarted = ApplicationProcess::new(
        ProcessDeps {
            log: harness.log.clone(),
            cache: BoundedEntryCache::new(256),
            host: replay_host.clone(),
            progress: FakeProgress::new(),
            health: HealthLatch::new(),
        },
        harness.store(),
        ApplyConfig::default(),
    );

    restarted.notify_committed(19).await.unwrap();
    restarted.start().await.unwrap();

    assert_eq!(restarted.last_applied(), 19);
    assert_eq!(replay_host.dispatched_indices(), vec![16, 17, 18, 19]);
}

#[tokio::test]
async fn duplicates_are_still_rejected_after_restart() {
    let harness = Harness::new();
    harness.commit_command("client", 0, b"op0");
    harness.commit_command("client", 1, b"op1");

    {
        let process = harness.process(ApplyConfig {
            batch_size: 2,
            flush_every: 2,
            clear_cache: true,
        });
        process.notify_committed(1).await.unwrap();
        process.start().await.unwrap();
        assert_eq!(harness.store().load().unwrap().unwrap().applied_index, 1);
    }

    // The client retries operation 1 after the node comes back
    harness.commit_command("client", 1, b"op1-retry");
    harness.commit_command("client", 2, b"op2");

    let replay_host = FakeDispatcherHost::new();
    let restarted = ApplicationProcess::new(
        ProcessDeps {
            log: harness.log.clone(),
            cache: BoundedEntryCache::new(256),
            host: replay_host.clone(),
            progress: FakeProgress::new(),
            health: HealthLatch::new(),
        },
        harness.store(),
        ApplyConfig::default(),
    );

    restarted.notify_committed(3).await.unwrap();
    restarted.start().await.unwrap();

    assert_eq!(restarted.last_applied(), 3);
    assert_eq!(replay_host.dispatched(), vec![b"op2".to_vec()]);
}

#[tokio::test]
async fn corrupted_checkpoint_refuses_to_start() {
    let harness = Harness::new();
    std::fs::write(harness.dir.path().join("apply.json"), "torn write").unwrap();
    let process = harness.process(ApplyConfig::default());

    let err = process.start().await.unwrap_err();
    assert!(matches!(err, ProcessError::Checkpoint(_)));
}
