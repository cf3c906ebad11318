// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The apply loop
//!
//! `ApplicationProcess` drains committed entries in index order,
//! deduplicates commands per session, dispatches fresh commands in
//! batches, and checkpoints durable progress at batch boundaries. A
//! dispatch failure latches the node unhealthy and freezes the applied
//! index at the last good entry; recovery is restart-only.

use crate::{EntryReader, ProcessError};
use keel_adapters::{
    CommandDispatcher, DispatcherHost, EntryCache, HealthMonitor, ProgressTracker, ReplicatedLog,
};
use keel_core::{ApplyConfig, ApplyCursor, Command, EntryContent, SessionTracker, Validation};
use keel_storage::{Checkpoint, CheckpointStore};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use tokio::sync::{watch, Mutex};

/// Collaborators the apply process drives
pub struct ProcessDeps<L, C, H, P, M> {
    pub log: L,
    pub cache: C,
    pub host: H,
    pub progress: P,
    pub health: M,
}

/// Mutable apply state, exclusively owned by the active drain
struct ApplicationState {
    cursor: ApplyCursor,
    sessions: SessionTracker,
}

/// Orchestrates the apply loop over the collaborator seams
pub struct ApplicationProcess<L, C, H, P, M>
where
    L: ReplicatedLog,
    C: EntryCache,
    H: DispatcherHost,
    P: ProgressTracker,
    M: HealthMonitor,
{
    log: L,
    cache: C,
    host: H,
    progress: P,
    health: M,
    store: CheckpointStore,
    config: ApplyConfig,
    /// Highest index known safe to apply; `-1` until first notification
    target: AtomicI64,
    running: AtomicBool,
    /// Drain exclusivity: whoever holds this lock is the one drain
    state: Mutex<ApplicationState>,
    applied_tx: watch::Sender<i64>,
    applied_rx: watch::Receiver<i64>,
}

impl<L, C, H, P, M> ApplicationProcess<L, C, H, P, M>
where
    L: ReplicatedLog,
    C: EntryCache,
    H: DispatcherHost,
    P: ProgressTracker,
    M: HealthMonitor,
{
    /// Create a stopped process
    pub fn new(deps: ProcessDeps<L, C, H, P, M>, store: CheckpointStore, config: ApplyConfig) -> Self {
        let (applied_tx, applied_rx) = watch::channel(-1);
        Self {
            log: deps.log,
            cache: deps.cache,
            host: deps.host,
            progress: deps.progress,
            health: deps.health,
            store,
            config,
            target: AtomicI64::new(-1),
            running: AtomicBool::new(false),
            state: Mutex::new(ApplicationState {
                cursor: ApplyCursor::new(),
                sessions: SessionTracker::new(),
            }),
            applied_tx,
            applied_rx,
        }
    }

    /// Transition `Stopped -> Running`
    ///
    /// Loads durable progress and immediately drains any backlog between
    /// the checkpointed index and the known commit target; this is how
    /// crash recovery resumes.
    pub async fn start(&self) -> Result<(), ProcessError> {
        // The lock is held from restore through the backlog drain so a
        // concurrent notification can never drain unrestored state
        let mut state = self.state.lock().await;
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(ProcessError::AlreadyStarted);
        }

        match self.store.load()? {
            Some(checkpoint) => {
                tracing::info!(
                    applied_index = checkpoint.applied_index,
                    sessions = checkpoint.sessions.len(),
                    "resuming from checkpoint"
                );
                state.cursor = ApplyCursor::resume(checkpoint.applied_index);
                state.sessions = SessionTracker::restore(checkpoint.sessions);
            }
            None => {
                tracing::info!("no checkpoint, starting from the beginning");
            }
        }
        self.applied_tx.send_replace(state.cursor.last_applied());

        self.run_drain(&mut state).await
    }

    /// Record the highest index guaranteed safe to apply
    ///
    /// Callable concurrently with an active drain; it only ever extends
    /// the running drain's target, never starts a second drain.
    pub async fn notify_committed(&self, commit_index: u64) -> Result<(), ProcessError> {
        self.target.fetch_max(commit_index as i64, Ordering::SeqCst);
        if !self.running.load(Ordering::SeqCst) {
            // Recorded; start() drains the backlog
            return Ok(());
        }

        let Ok(mut state) = self.state.try_lock() else {
            // A drain is active; it re-reads the target before finishing
            return Ok(());
        };
        self.run_drain(&mut state).await
    }

    /// Highest applied index, `-1` if none
    pub fn last_applied(&self) -> i64 {
        *self.applied_rx.borrow()
    }

    /// Watch applied progress without touching shared state
    pub fn subscribe(&self) -> watch::Receiver<i64> {
        self.applied_rx.clone()
    }

    /// Stop accepting drains and wait for the in-flight one to finish
    ///
    /// The active drain closes its batch before releasing the state lock,
    /// so shutdown never abandons a half-committed batch.
    pub async fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        let _state = self.state.lock().await;
    }

    /// Run one exclusive drain; any failure latches the health monitor
    async fn run_drain(&self, state: &mut ApplicationState) -> Result<(), ProcessError> {
        if !self.health.is_healthy() {
            tracing::warn!("drain refused: node unhealthy");
            return Ok(());
        }

        let result = self.drain_locked(state).await;
        if let Err(e) = &result {
            self.health.panic(&e.to_string());
        }
        result
    }

    async fn drain_locked(&self, state: &mut ApplicationState) -> Result<(), ProcessError> {
        let mut reader = EntryReader::new(
            self.log.clone(),
            self.cache.clone(),
            self.config.clear_cache,
        );
        let mut batch: Option<H::Dispatcher> = None;

        match self.apply_available(state, &mut reader, &mut batch).await {
            Ok(()) => {
                if let Some(mut dispatcher) = batch.take() {
                    tracing::debug!(applied_index = state.cursor.last_applied(), "closing final batch");
                    dispatcher.close().await?;
                }
                Ok(())
            }
            Err(e) => {
                // The poisoned batch is abandoned unclosed: its effects were
                // never committed, and the checkpoint taken at the previous
                // boundary predates all of them.
                drop(batch);
                Err(e)
            }
        }
    }

    async fn apply_available(
        &self,
        state: &mut ApplicationState,
        reader: &mut EntryReader<L, C>,
        batch: &mut Option<H::Dispatcher>,
    ) -> Result<(), ProcessError> {
        loop {
            // Re-read each iteration: notify_committed extends the target
            // while the drain runs
            let target = self.target.load(Ordering::SeqCst);
            if state.cursor.last_applied() >= target {
                return Ok(());
            }

            let index = state.cursor.next_index();
            let entry = reader.get(index)?;

            match entry.content {
                EntryContent::Control => {
                    tracing::trace!(index, term = entry.term, "control entry");
                    state.cursor.mark_applied(index)?;
                }
                EntryContent::Command(command) => {
                    self.apply_command(state, batch, command, index).await?;
                }
            }

            self.applied_tx.send_replace(state.cursor.last_applied());
            self.finish_batch_at_boundary(state, batch, index).await?;
        }
    }

    async fn apply_command(
        &self,
        state: &mut ApplicationState,
        batch: &mut Option<H::Dispatcher>,
        command: Command,
        index: u64,
    ) -> Result<(), ProcessError> {
        match state.sessions.validate(&command.session, command.operation) {
            Validation::Duplicate => {
                tracing::debug!(
                    index,
                    session = %command.session,
                    operation = %command.operation,
                    "duplicate command, skipping dispatch"
                );
                state.cursor.mark_applied(index)?;
            }
            Validation::Fresh => {
                if batch.is_none() {
                    tracing::debug!(index, "opening dispatcher batch");
                    *batch = Some(self.host.begin_batch().await?);
                }

                if let Some(dispatcher) = batch.as_mut() {
                    let result = dispatcher.dispatch(&command.payload, index).await?;
                    state.cursor.mark_applied(index)?;
                    self.progress
                        .complete(&command.session, command.operation, result);
                }
            }
        }
        Ok(())
    }

    /// Close the batch when `index` lands on a batch boundary, then flush
    /// if enough entries accumulated since the last checkpoint
    ///
    /// Checkpoints are taken only at closed-batch boundaries so the durable
    /// cursor never runs ahead of dispatcher-committed work.
    async fn finish_batch_at_boundary(
        &self,
        state: &mut ApplicationState,
        batch: &mut Option<H::Dispatcher>,
        index: u64,
    ) -> Result<(), ProcessError> {
        if (index + 1) % self.config.batch_size != 0 {
            return Ok(());
        }

        if let Some(mut dispatcher) = batch.take() {
            tracing::debug!(index, "closing batch at boundary");
            dispatcher.close().await?;
        }

        if state.cursor.unflushed() >= self.config.flush_every {
            self.flush(state)?;
        }
        Ok(())
    }

    /// Persist apply progress; blocks the loop until durable
    fn flush(&self, state: &mut ApplicationState) -> Result<(), ProcessError> {
        let applied = state.cursor.last_applied();
        let checkpoint = Checkpoint::new(applied, state.sessions.snapshot());
        self.store.save(&checkpoint)?;
        state.cursor.mark_flushed(applied as u64)?;
        tracing::info!(
            applied_index = applied,
            sessions = checkpoint.sessions.len(),
            "checkpoint flushed"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
