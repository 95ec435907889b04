//! Serialized background persistence of dirty locale dictionaries.
//!
//! All disk writes go through one [`WriteQueue`] backed by a dedicated
//! worker thread. Jobs are processed strictly FIFO with at most one write
//! in flight, so concurrent lookups can never interleave writes to a
//! locale file.
//!
//! # Collapsing
//!
//! A job does not carry dictionary content. The worker serializes the
//! locale's *current* cache state when the job reaches the head of the
//! queue, so several queued jobs for one locale each write the latest
//! state and the final file always reflects the newest dictionary.
//!
//! # Failure Model
//!
//! A failed write is reported (hooks, log) and the queue moves on. Nothing
//! is retried; the data stays correct in memory and the next recorded
//! update writes the full dictionary again. When no error hook is
//! configured, the first unobserved failure is parked and handed to the
//! next [`drain`](WriteQueue::drain) or [`shutdown`](WriteQueue::shutdown)
//! call, so a crash-free process still learns its writes were lost.
//!
//! Hooks run on the worker thread and must not call back into `drain` or
//! `shutdown`. A hook that panics is caught and logged; the worker and the
//! pending count both survive it.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex, mpsc};
use std::thread::{self, JoinHandle};

use crate::book::{Shared, lock};
use crate::error::PhrasebookError;
use crate::store;

/// Channel capacity for the pending-job queue.
const CHANNEL_CAPACITY: usize = 256;

/// Metadata describing one recorded dictionary update.
///
/// Passed to the update hook after every write attempt. The target `path`
/// is fixed at enqueue time, so a config change between the lookup and the
/// write cannot redirect the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateEvent {
    /// Locale whose dictionary changed.
    pub locale: String,
    /// File the dictionary is written to.
    pub path: PathBuf,
    /// Singular key of the lookup that caused the update.
    pub singular: String,
    /// Plural variant, when the lookup supplied one.
    pub plural: Option<String>,
    /// Count, when the lookup supplied one.
    pub count: Option<u64>,
}

enum QueueMsg {
    Persist(UpdateEvent),
    Shutdown,
}

/// Worker-side bookkeeping shared with the queue handle.
#[derive(Debug, Default)]
struct QueueState {
    pending: Mutex<usize>,
    drained: Condvar,
    deferred: Mutex<Option<PhrasebookError>>,
}

pub(crate) struct WriteQueue {
    sender: mpsc::SyncSender<QueueMsg>,
    state: Arc<QueueState>,
    /// Serializes job sends against the shutdown marker: every job is
    /// either sent before the marker or rejected, so none can land behind
    /// it and leave the pending count stuck.
    closed: Mutex<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl WriteQueue {
    pub(crate) fn start(shared: Arc<Shared>) -> Result<Self, PhrasebookError> {
        let (tx, rx) = mpsc::sync_channel::<QueueMsg>(CHANNEL_CAPACITY);
        let state = Arc::new(QueueState::default());
        let worker_state = Arc::clone(&state);

        let handle = thread::Builder::new()
            .name("phrasebook-writer".into())
            .spawn(move || write_loop(&shared, &worker_state, &rx))
            .map_err(|e| PhrasebookError::Spawn { source: e })?;

        Ok(Self {
            sender: tx,
            state,
            closed: Mutex::new(false),
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Append a persistence job for `event.locale`.
    ///
    /// Blocks only if the queue is saturated. Once
    /// [`shutdown`](WriteQueue::shutdown) has begun, jobs are rejected
    /// with [`PhrasebookError::QueueClosed`].
    pub(crate) fn enqueue(&self, event: UpdateEvent) -> Result<(), PhrasebookError> {
        let locale = event.locale.clone();

        {
            let mut pending = lock(&self.state.pending);
            *pending += 1;
        }

        let closed = lock(&self.closed);
        let rejected = *closed || self.sender.send(QueueMsg::Persist(event)).is_err();
        drop(closed);

        if rejected {
            let mut pending = lock(&self.state.pending);
            *pending -= 1;
            if *pending == 0 {
                self.state.drained.notify_all();
            }
            return Err(PhrasebookError::QueueClosed { locale });
        }
        Ok(())
    }

    /// Block until every job enqueued so far has finished its write
    /// attempt, then surface a parked failure, if any, exactly once.
    pub(crate) fn drain(&self) -> Result<(), PhrasebookError> {
        self.wait_drained();
        match self.take_deferred() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Drain, stop the worker thread, and surface a parked failure.
    ///
    /// Safe to call more than once; later calls wait for the first to
    /// finish and return `Ok(())`.
    pub(crate) fn shutdown(&self) -> Result<(), PhrasebookError> {
        self.wait_drained();
        self.close();

        let mut handle = lock(&self.handle);
        if let Some(handle) = handle.take() {
            let _ = handle.join();
        }
        drop(handle);

        match self.take_deferred() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Mark the queue closed and send the marker the worker exits on.
    fn close(&self) {
        let mut closed = lock(&self.closed);
        if !*closed {
            *closed = true;
            let _ = self.sender.send(QueueMsg::Shutdown);
        }
    }

    fn wait_drained(&self) {
        let mut pending = lock(&self.state.pending);
        while *pending > 0 {
            pending = self
                .state
                .drained
                .wait(pending)
                .unwrap_or_else(|e| e.into_inner());
        }
    }

    fn take_deferred(&self) -> Option<PhrasebookError> {
        lock(&self.state.deferred).take()
    }
}

impl Drop for WriteQueue {
    fn drop(&mut self) {
        // The channel is FIFO, so every job already enqueued is attempted
        // before the worker sees the marker and exits.
        self.close();
        if let Some(handle) = lock(&self.handle).take() {
            let _ = handle.join();
        }
        if let Some(err) = self.take_deferred() {
            tracing::error!(
                target: "phrasebook.queue",
                error = %err,
                "write failed and was never observed; dropped at shutdown"
            );
        }
    }
}

fn write_loop(shared: &Shared, state: &QueueState, rx: &mpsc::Receiver<QueueMsg>) {
    while let Ok(msg) = rx.recv() {
        match msg {
            QueueMsg::Persist(event) => process_job(shared, state, event),
            QueueMsg::Shutdown => break,
        }
    }
}

/// Decrements the pending count on drop, during unwind included, so the
/// count reaches zero on every job exit path.
struct PendingGuard<'a> {
    state: &'a QueueState,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut pending = lock(&self.state.pending);
        *pending = pending.saturating_sub(1);
        if *pending == 0 {
            self.state.drained.notify_all();
        }
    }
}

fn process_job(shared: &Shared, state: &QueueState, event: UpdateEvent) {
    // Hooks run user code below; a panic must still complete the count or
    // every later drain would block forever.
    let _guard = PendingGuard { state };

    // Current state, not an enqueue-time snapshot.
    let dict = {
        let cache = lock(&shared.cache);
        cache.get(&event.locale).cloned().unwrap_or_default()
    };

    let err = store::save(&event.path, &dict, &event.locale).err();
    match &err {
        None => tracing::debug!(
            target: "phrasebook.queue",
            locale = event.locale.as_str(),
            path = %event.path.display(),
            entries = dict.len(),
            "locale file persisted"
        ),
        Some(e) => tracing::error!(
            target: "phrasebook.queue",
            locale = event.locale.as_str(),
            path = %event.path.display(),
            error = %e,
            "locale write failed"
        ),
    }

    let hook_panicked = catch_unwind(AssertUnwindSafe(|| {
        shared.hooks.notify_update(err.as_ref(), &event);
    }))
    .is_err();
    if hook_panicked {
        tracing::error!(
            target: "phrasebook.queue",
            locale = event.locale.as_str(),
            "update hook panicked"
        );
    }

    if let Some(e) = err {
        let handled = match catch_unwind(AssertUnwindSafe(|| shared.hooks.notify_error(&e))) {
            Ok(handled) => handled,
            // Only a registered hook body can panic, so the failure was seen.
            Err(_) => {
                tracing::error!(
                    target: "phrasebook.queue",
                    locale = event.locale.as_str(),
                    "error hook panicked"
                );
                true
            }
        };
        if !handled {
            // Park the first unobserved failure for the next drain/shutdown.
            let mut deferred = lock(&state.deferred);
            if deferred.is_none() {
                *deferred = Some(e);
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
