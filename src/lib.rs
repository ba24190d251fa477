//! Secure file shredding engine.
//!
//! Files are overwritten pass-by-pass with a method-specific pattern, each pass
//! flushed to storage, then renamed to a random sibling name and unlinked.
//!
//! # Caveat
//!
//! This implements the overwrite *protocol* only. On wear-leveled flash (SSD,
//! eMMC, USB sticks), copy-on-write file systems (btrfs, ZFS, APFS), journaling
//! file systems and anything with snapshots, old blocks may survive the
//! overwrite. The engine resists trivial undelete and naive scraping of the
//! freed blocks, nothing more.

pub mod algorithms;
pub mod batch;
pub mod crypto;
pub mod enumerator;
pub mod io;
pub mod shredder;
pub mod ui;

pub use algorithms::{patterns_for, PassPlan};
pub use batch::{
    run_batch, spawn_batch, BatchEvent, BatchHandle, BatchRunner, BatchState, BatchSummary,
    CancellationToken,
};
pub use enumerator::{enumerate, Enumeration, Enumerator, SkipReason, SkippedTarget};
pub use shredder::{shred, Shredder};

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Stage of the per-file protocol an error was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShredStage {
    Validate,
    Open,
    Overwrite,
    Rename,
    Unlink,
}

impl fmt::Display for ShredStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShredStage::Validate => "validate",
            ShredStage::Open => "open",
            ShredStage::Overwrite => "overwrite",
            ShredStage::Rename => "rename",
            ShredStage::Unlink => "unlink",
        };
        f.write_str(name)
    }
}

/// Coarse error taxonomy used by callers to aggregate failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    NotFound,
    IoFailure,
    EnumerationFailure,
    InvalidInput,
}

#[derive(Error, Debug)]
pub enum ShredError {
    #[error("{}: not found", path.display())]
    NotFound { path: PathBuf },

    #[error("{stage} failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        stage: ShredStage,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read {}: {source}", path.display())]
    Enumeration {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: not a regular file", path.display())]
    NotRegularFile { path: PathBuf },

    #[error("Unknown deletion method: {0}")]
    UnknownMethod(String),

    #[error("Batch worker terminated abnormally")]
    WorkerPanicked,
}

impl ShredError {
    pub fn io(path: impl Into<PathBuf>, stage: ShredStage, source: std::io::Error) -> Self {
        ShredError::Io {
            path: path.into(),
            stage,
            source,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            ShredError::NotFound { .. } => ErrorClass::NotFound,
            ShredError::Io { .. } | ShredError::WorkerPanicked => ErrorClass::IoFailure,
            ShredError::Enumeration { .. } => ErrorClass::EnumerationFailure,
            ShredError::NotRegularFile { .. } | ShredError::UnknownMethod(_) => {
                ErrorClass::InvalidInput
            }
        }
    }

    /// Underlying OS error kind, when there is one
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            ShredError::Io { source, .. } | ShredError::Enumeration { source, .. } => {
                Some(source.kind())
            }
            _ => None,
        }
    }
}

// Manual Clone implementation because std::io::Error doesn't implement Clone
impl Clone for ShredError {
    fn clone(&self) -> Self {
        fn copy_io(e: &std::io::Error) -> std::io::Error {
            match e.raw_os_error() {
                Some(code) => std::io::Error::from_raw_os_error(code),
                None => std::io::Error::new(e.kind(), e.to_string()),
            }
        }

        match self {
            ShredError::NotFound { path } => ShredError::NotFound { path: path.clone() },
            ShredError::Io {
                path,
                stage,
                source,
            } => ShredError::Io {
                path: path.clone(),
                stage: *stage,
                source: copy_io(source),
            },
            ShredError::Enumeration { path, source } => ShredError::Enumeration {
                path: path.clone(),
                source: copy_io(source),
            },
            ShredError::NotRegularFile { path } => {
                ShredError::NotRegularFile { path: path.clone() }
            }
            ShredError::UnknownMethod(s) => ShredError::UnknownMethod(s.clone()),
            ShredError::WorkerPanicked => ShredError::WorkerPanicked,
        }
    }
}

// Errors travel inside events, which are emitted as JSON lines
impl Serialize for ShredError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// Non UTF-8 names must not break JSON output
pub(crate) fn lossy_path<P, S>(path: &P, serializer: S) -> Result<S::Ok, S::Error>
where
    P: AsRef<std::path::Path>,
    S: Serializer,
{
    serializer.serialize_str(&path.as_ref().to_string_lossy())
}

pub(crate) fn lossy_paths<S>(paths: &[PathBuf], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(paths.iter().map(|p| p.to_string_lossy()))
}

/// Outcome of shredding one target
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ShredResult {
    Deleted,
    SkippedNotFound,
    Failed(ShredError),
}

impl ShredResult {
    pub fn is_deleted(&self) -> bool {
        matches!(self, ShredResult::Deleted)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ShredResult::Failed(_))
    }
}

/// How a file's contents are destroyed before it is unlinked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum DeletionMethod {
    Simple,   // Unlink only
    DoD3,     // 0x00, 0xFF, 0x00
    DoD7,     // DoD set cycled over 7 passes
    Gutmann,  // 35 passes over a 21-pattern subset
    Random(u32),
    ZeroFill, // Single pass of zeros
}

impl DeletionMethod {
    /// Every method the CLI offers, in menu order
    pub const ALL: [DeletionMethod; 6] = [
        DeletionMethod::Simple,
        DeletionMethod::DoD3,
        DeletionMethod::DoD7,
        DeletionMethod::Gutmann,
        DeletionMethod::Random(3),
        DeletionMethod::ZeroFill,
    ];

    pub fn pass_count(&self) -> u32 {
        self.plan().pass_count()
    }

    pub fn plan(&self) -> PassPlan {
        patterns_for(*self)
    }

    pub fn label(&self) -> String {
        match self {
            DeletionMethod::Simple => "Simple Delete".to_string(),
            DeletionMethod::DoD3 => "DoD 3-Pass (3x overwrite)".to_string(),
            DeletionMethod::DoD7 => "DoD 7-Pass (7x overwrite)".to_string(),
            DeletionMethod::Gutmann => "Gutmann Method (35x overwrite)".to_string(),
            DeletionMethod::Random(n) => format!("Random {}-Pass", n),
            DeletionMethod::ZeroFill => "Zero Fill (1x overwrite)".to_string(),
        }
    }
}

impl Default for DeletionMethod {
    fn default() -> Self {
        DeletionMethod::DoD3
    }
}

impl fmt::Display for DeletionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletionMethod::Simple => f.write_str("simple"),
            DeletionMethod::DoD3 => f.write_str("dod3"),
            DeletionMethod::DoD7 => f.write_str("dod7"),
            DeletionMethod::Gutmann => f.write_str("gutmann"),
            DeletionMethod::Random(n) => write!(f, "random:{}", n),
            DeletionMethod::ZeroFill => f.write_str("zerofill"),
        }
    }
}

impl FromStr for DeletionMethod {
    type Err = ShredError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().to_lowercase();
        let method = match id.as_str() {
            "simple" => DeletionMethod::Simple,
            "dod3" => DeletionMethod::DoD3,
            "dod7" => DeletionMethod::DoD7,
            "gutmann" => DeletionMethod::Gutmann,
            "zerofill" => DeletionMethod::ZeroFill,
            other => {
                let count = other
                    .strip_prefix("random:")
                    .or_else(|| other.strip_prefix("random"))
                    .and_then(|n| n.parse::<u32>().ok())
                    .filter(|&n| n > 0)
                    .ok_or_else(|| ShredError::UnknownMethod(s.to_string()))?;
                DeletionMethod::Random(count)
            }
        };
        Ok(method)
    }
}

impl From<DeletionMethod> for String {
    fn from(method: DeletionMethod) -> Self {
        method.to_string()
    }
}

impl TryFrom<String> for DeletionMethod {
    type Error = ShredError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Per-batch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShredConfig {
    pub method: DeletionMethod,
    pub recursive: bool,
}

impl Default for ShredConfig {
    fn default() -> Self {
        Self {
            method: DeletionMethod::DoD3,
            recursive: true,
        }
    }
}
