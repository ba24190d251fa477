//! Flattens caller-selected targets into the ordered list of entries to shred.
//!
//! Directories are walked depth-first with entries sorted by name. Symbolic
//! links are never followed: a link, whether given directly or met during a
//! walk, is its own entry and only the link is later removed. This keeps a
//! recursive shred from reaching data outside the selected tree.

use crate::ShredError;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::fs::{self, FileType};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Why a target contributed nothing to the batch
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// Directory given while recursion is off
    NotRecursive,
    /// Root target does not exist
    NotFound,
    /// FIFO, socket or device node
    SpecialFile,
    /// Metadata or directory listing could not be read
    Unreadable(ShredError),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotRecursive => f.write_str("directory skipped (recursion disabled)"),
            SkipReason::NotFound => f.write_str("not found"),
            SkipReason::SpecialFile => f.write_str("not a regular file"),
            SkipReason::Unreadable(e) => write!(f, "{}", e),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedTarget {
    #[serde(serialize_with = "crate::lossy_path")]
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Result of flattening a target list
#[derive(Debug, Clone, Default, Serialize)]
pub struct Enumeration {
    /// Entries to shred, in order, each at most once
    #[serde(serialize_with = "crate::lossy_paths")]
    pub files: Vec<PathBuf>,
    pub skipped: Vec<SkippedTarget>,
}

#[derive(Debug, Clone, Copy)]
pub struct Enumerator {
    recursive: bool,
}

impl Enumerator {
    pub fn new(recursive: bool) -> Self {
        Self { recursive }
    }

    pub fn enumerate<P: AsRef<Path>>(&self, targets: &[P]) -> Enumeration {
        let mut out = Enumeration::default();
        let mut seen = HashSet::new();

        for target in targets {
            let path = target.as_ref();
            let metadata = match fs::symlink_metadata(path) {
                Ok(m) => m,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(path = %path.display(), "target not found");
                    out.skip(path, SkipReason::NotFound);
                    continue;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cannot stat target");
                    out.skip(path, unreadable(path, e));
                    continue;
                }
            };

            if metadata.is_dir() {
                if self.recursive {
                    self.walk(path, &mut seen, &mut out);
                } else {
                    warn!(path = %path.display(), "skipping directory, recursion disabled");
                    out.skip(path, SkipReason::NotRecursive);
                }
            } else {
                out.push_leaf(path, metadata.file_type(), &mut seen);
            }
        }

        debug!(
            files = out.files.len(),
            skipped = out.skipped.len(),
            "enumeration finished"
        );
        out
    }

    fn walk(&self, root: &Path, seen: &mut HashSet<PathBuf>, out: &mut Enumeration) {
        let walker = WalkDir::new(root).follow_links(false).sort_by_file_name();

        for entry in walker {
            match entry {
                Ok(entry) => {
                    let file_type = entry.file_type();
                    if file_type.is_dir() {
                        continue;
                    }
                    out.push_leaf(entry.path(), file_type, seen);
                }
                Err(err) => {
                    let path = err.path().unwrap_or(root).to_path_buf();
                    warn!(path = %path.display(), error = %err, "skipping unreadable entry");
                    let source = err
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::other("filesystem loop detected"));
                    let reason = unreadable(&path, source);
                    out.skip(&path, reason);
                }
            }
        }
    }
}

impl Enumeration {
    fn skip(&mut self, path: &Path, reason: SkipReason) {
        self.skipped.push(SkippedTarget {
            path: path.to_path_buf(),
            reason,
        });
    }

    fn push_leaf(&mut self, path: &Path, file_type: FileType, seen: &mut HashSet<PathBuf>) {
        if !(file_type.is_file() || file_type.is_symlink()) {
            self.skip(path, SkipReason::SpecialFile);
            return;
        }

        if seen.insert(identity(path, file_type)) {
            self.files.push(path.to_path_buf());
        } else {
            debug!(path = %path.display(), "duplicate target ignored");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Flatten `targets` into the entries to shred
pub fn enumerate<P: AsRef<Path>>(targets: &[P], recursive: bool) -> Enumeration {
    Enumerator::new(recursive).enumerate(targets)
}

fn unreadable(path: &Path, source: io::Error) -> SkipReason {
    SkipReason::Unreadable(ShredError::Enumeration {
        path: path.to_path_buf(),
        source,
    })
}

/// Deduplication key. Regular files resolve to their canonical path; links
/// keep their own name under a canonical parent so they are never confused
/// with their target.
fn identity(path: &Path, file_type: FileType) -> PathBuf {
    if file_type.is_symlink() {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        match (fs::canonicalize(parent), path.file_name()) {
            (Ok(dir), Some(name)) => dir.join(name),
            _ => path.to_path_buf(),
        }
    } else {
        fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }
}
