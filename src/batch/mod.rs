//! Batch driver: enumerate once, then shred file after file while emitting events.
//!
//! [`BatchRunner`] is a lazy iterator. Nothing touches the filesystem until the
//! first call to `next()`, and each further call does at most one file's worth
//! of work. The event order is:
//!
//! ```text
//! Started{method, total}
//! TargetSkipped{path, reason}          (one per skipped target)
//! FileResult{path, result}             \ per file, until the list is done
//! Progress{completed, total}           / or cancellation is seen
//! Completed{deleted, skipped, failed, total, cancelled}
//! ```
//!
//! [`spawn_batch`] runs a runner on its own thread and forwards the events
//! over a channel, for callers with an interactive thread to keep free.

pub mod cancellation;
pub mod events;


pub use cancellation::CancellationToken;
pub use events::{BatchEvent, BatchSummary};

use crate::enumerator::Enumerator;
use crate::shredder::Shredder;
use crate::{DeletionMethod, ShredConfig, ShredError, ShredResult};
use chrono::Utc;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::thread::JoinHandle;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info};
use uuid::Uuid;

/// Engine-owned counters for one invocation
#[derive(Debug, Default)]
pub struct BatchState {
    pub total: usize,
    pub completed: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub targets_skipped: usize,
    pub cancelled: bool,
    /// Every event emitted so far, in order
    pub events: Vec<BatchEvent>,
}

impl BatchState {
    fn record(&mut self, result: &ShredResult) {
        debug_assert!(self.completed < self.total);
        self.completed = (self.completed + 1).min(self.total);
        match result {
            ShredResult::Deleted => self.deleted += 1,
            ShredResult::SkippedNotFound => self.skipped += 1,
            ShredResult::Failed(_) => self.failed += 1,
        }
    }

    fn completed_event(&self) -> BatchEvent {
        BatchEvent::Completed {
            deleted: self.deleted,
            skipped: self.skipped,
            failed: self.failed,
            total: self.total,
            cancelled: self.cancelled,
        }
    }
}

enum Phase {
    Pending,
    Running(std::vec::IntoIter<PathBuf>),
    Finished,
}

pub struct BatchRunner {
    session_id: Uuid,
    targets: Vec<PathBuf>,
    recursive: bool,
    shredder: Shredder,
    token: CancellationToken,
    phase: Phase,
    queue: VecDeque<BatchEvent>,
    state: BatchState,
    start_time: chrono::DateTime<Utc>,
    end_time: Option<chrono::DateTime<Utc>>,
}

impl BatchRunner {
    /// Snapshot `targets` and prepare a batch. No I/O happens here.
    pub fn new(targets: Vec<PathBuf>, config: &ShredConfig, token: CancellationToken) -> Self {
        Self::with_shredder(targets, config.recursive, Shredder::new(config.method), token)
    }

    pub fn with_shredder(
        targets: Vec<PathBuf>,
        recursive: bool,
        shredder: Shredder,
        token: CancellationToken,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            targets,
            recursive,
            shredder,
            token,
            phase: Phase::Pending,
            queue: VecDeque::new(),
            state: BatchState::default(),
            start_time: Utc::now(),
            end_time: None,
        }
    }

    pub fn method(&self) -> DeletionMethod {
        self.shredder.method()
    }

    pub fn state(&self) -> &BatchState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished) && self.queue.is_empty()
    }

    /// Drain any remaining events and return the aggregate outcome
    pub fn into_summary(mut self) -> BatchSummary {
        while !self.is_finished() {
            self.next();
        }
        self.summary()
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            session_id: self.session_id,
            method: self.shredder.method(),
            total: self.state.total,
            completed: self.state.completed,
            deleted: self.state.deleted,
            skipped: self.state.skipped,
            failed: self.state.failed,
            targets_skipped: self.state.targets_skipped,
            cancelled: self.state.cancelled,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }

    fn start(&mut self) {
        let targets = std::mem::take(&mut self.targets);
        let enumeration = Enumerator::new(self.recursive).enumerate(&targets);

        self.start_time = Utc::now();
        self.state.total = enumeration.files.len();
        self.state.targets_skipped = enumeration.skipped.len();

        info!(
            session = %self.session_id,
            method = %self.shredder.method(),
            total = self.state.total,
            skipped = self.state.targets_skipped,
            "batch started"
        );

        self.queue.push_back(BatchEvent::Started {
            method: self.shredder.method(),
            total: self.state.total,
        });
        for skipped in enumeration.skipped {
            self.queue.push_back(BatchEvent::TargetSkipped {
                path: skipped.path,
                reason: skipped.reason,
            });
        }

        self.phase = Phase::Running(enumeration.files.into_iter());
    }

    fn finish(&mut self) {
        self.end_time = Some(Utc::now());
        self.queue.push_back(self.state.completed_event());
        self.phase = Phase::Finished;

        info!(
            session = %self.session_id,
            deleted = self.state.deleted,
            skipped = self.state.skipped,
            failed = self.state.failed,
            total = self.state.total,
            cancelled = self.state.cancelled,
            "batch finished"
        );
    }

    fn step(&mut self) {
        let next = match &mut self.phase {
            Phase::Pending => {
                self.start();
                return;
            }
            Phase::Finished => return,
            Phase::Running(files) => {
                if files.as_slice().is_empty() {
                    None
                } else if self.token.is_cancelled() {
                    debug!(remaining = files.len(), "cancellation observed between files");
                    self.state.cancelled = true;
                    None
                } else {
                    files.next()
                }
            }
        };

        match next {
            Some(path) => {
                let result = self.shredder.shred(&path);
                self.state.record(&result);
                self.queue.push_back(BatchEvent::FileResult { path, result });
                self.queue.push_back(BatchEvent::Progress {
                    completed: self.state.completed,
                    total: self.state.total,
                });
            }
            None => self.finish(),
        }
    }
}

impl Iterator for BatchRunner {
    type Item = BatchEvent;

    fn next(&mut self) -> Option<BatchEvent> {
        loop {
            if let Some(event) = self.queue.pop_front() {
                self.state.events.push(event.clone());
                return Some(event);
            }
            if matches!(self.phase, Phase::Finished) {
                return None;
            }
            self.step();
        }
    }
}

/// Build a runner for `targets`. Lazy: work starts on the first `next()`.
pub fn run_batch(
    targets: Vec<PathBuf>,
    method: DeletionMethod,
    recursive: bool,
    token: CancellationToken,
) -> BatchRunner {
    let config = ShredConfig { method, recursive };
    BatchRunner::new(targets, &config, token)
}

/// A batch running on its own worker thread
pub struct BatchHandle {
    pub events: UnboundedReceiver<BatchEvent>,
    token: CancellationToken,
    worker: JoinHandle<BatchSummary>,
}

impl BatchHandle {
    /// Ask the worker to stop after the file in progress
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Wait for the worker and collect the aggregate outcome
    pub fn join(self) -> Result<BatchSummary, ShredError> {
        self.worker.join().map_err(|_| ShredError::WorkerPanicked)
    }
}

/// Run a batch on a dedicated thread, forwarding every event over a channel.
///
/// The worker keeps going if the receiver is dropped; cancellation is the only
/// way to stop it early.
pub fn spawn_batch(
    targets: Vec<PathBuf>,
    config: ShredConfig,
    token: CancellationToken,
) -> std::io::Result<BatchHandle> {
    let (tx, rx) = mpsc::unbounded_channel();
    let runner = BatchRunner::new(targets, &config, token.clone());

    let worker = std::thread::Builder::new()
        .name("fshred-batch".to_string())
        .spawn(move || {
            let mut runner = runner;
            for event in runner.by_ref() {
                tx.send(event).ok();
            }
            runner.summary()
        })?;

    Ok(BatchHandle {
        events: rx,
        token,
        worker,
    })
}
