use crate::enumerator::SkipReason;
use crate::{DeletionMethod, ShredResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

/// One observable step of a batch. Each event carries its own counter
/// snapshot, so observers never read engine state directly.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BatchEvent {
    Started {
        method: DeletionMethod,
        total: usize,
    },
    TargetSkipped {
        #[serde(serialize_with = "crate::lossy_path")]
        path: PathBuf,
        reason: SkipReason,
    },
    FileResult {
        #[serde(serialize_with = "crate::lossy_path")]
        path: PathBuf,
        result: ShredResult,
    },
    Progress {
        completed: usize,
        total: usize,
    },
    Completed {
        deleted: usize,
        skipped: usize,
        failed: usize,
        total: usize,
        cancelled: bool,
    },
}

impl BatchEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BatchEvent::Completed { .. })
    }
}

/// Aggregate outcome of one batch invocation
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub session_id: Uuid,
    pub method: DeletionMethod,
    pub total: usize,
    pub completed: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Targets the enumerator reported as skipped
    pub targets_skipped: usize,
    pub cancelled: bool,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

impl BatchSummary {
    /// True when nothing failed; callers wanting all-or-nothing also check
    /// `skipped`, `targets_skipped` and `cancelled`
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}
