//! Shared harness for the apply pipeline specs.

use keel_adapters::{
    BoundedEntryCache, EntryCache, FakeDispatcherHost, FakeProgress, HealthLatch, MemoryLog,
};
use keel_core::{ApplyConfig, Command, EntryContent, OperationId, SessionId};
use keel_engine::{ApplicationProcess, ProcessDeps};
use keel_storage::CheckpointStore;
use tempfile::TempDir;

pub type SpecProcess =
    ApplicationProcess<MemoryLog, BoundedEntryCache, FakeDispatcherHost, FakeProgress, HealthLatch>;

/// A node's apply pipeline wired to fake collaborators
pub struct Harness {
    pub dir: TempDir,
    pub log: MemoryLog,
    pub cache: BoundedEntryCache,
    pub host: FakeDispatcherHost,
    pub progress: FakeProgress,
    pub health: HealthLatch,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            log: MemoryLog::new(),
            cache: BoundedEntryCache::new(256),
            host: FakeDispatcherHost::new(),
            progress: FakeProgress::new(),
            health: HealthLatch::new(),
        }
    }

    pub fn store(&self) -> CheckpointStore {
        CheckpointStore::new(&self.dir.path().join("apply.json"))
    }

    pub fn process(&self, config: ApplyConfig) -> SpecProcess {
        ApplicationProcess::new(
            ProcessDeps {
                log: self.log.clone(),
                cache: self.cache.clone(),
                host: self.host.clone(),
                progress: self.progress.clone(),
                health: self.health.clone(),
            },
            self.store(),
            config,
        )
    }

    /// Append a command and mirror it into the cache, the way the
    /// replication-ingestion path does
    pub fn commit_command(&self, session: &str, operation: u64, payload: &[u8]) -> u64 {
        let entry = self.log.append(
            1,
            EntryContent::Command(Command {
                payload: payload.to_vec(),
                session: SessionId::new(session),
                operation: OperationId(operation),
            }),
        );
        self.cache.put(entry.index, entry.clone());
        entry.index
    }

    pub fn commit_control(&self) -> u64 {
        let entry = self.log.append(1, EntryContent::Control);
        self.cache.put(entry.index, entry.clone());
        entry.index
    }
}
