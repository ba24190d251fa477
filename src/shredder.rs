// Shredder - runs the per-file protocol
//
// Validate -> overwrite N passes -> rename to a random sibling name -> unlink.
// Every failure becomes a ShredResult for that one file; nothing here aborts a batch.

use crate::algorithms::PassPlan;
use crate::io::OverwriteWriter;
use crate::{DeletionMethod, ShredError, ShredResult, ShredStage};
use rand::distributions::{Alphanumeric, DistString};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Attempts at finding an unused obfuscated name before giving up on the rename
const RENAME_ATTEMPTS: usize = 16;

const MIN_OBFUSCATED_LEN: usize = 8;
const MAX_OBFUSCATED_LEN: usize = 64;

/// Moves a file out of the way before unlink, returning its new path
pub(crate) type Renamer = fn(&Path) -> io::Result<PathBuf>;

/// Destroys single files with a fixed deletion method
#[derive(Clone)]
pub struct Shredder {
    method: DeletionMethod,
    plan: PassPlan,
    writer: OverwriteWriter,
    renamer: Renamer,
}

impl fmt::Debug for Shredder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shredder")
            .field("method", &self.method)
            .field("plan", &self.plan)
            .field("writer", &self.writer)
            .finish_non_exhaustive()
    }
}

impl Shredder {
    pub fn new(method: DeletionMethod) -> Self {
        Self::with_writer(method, OverwriteWriter::default())
    }

    pub fn with_writer(method: DeletionMethod, writer: OverwriteWriter) -> Self {
        Self {
            method,
            plan: method.plan(),
            writer,
            renamer: rename_to_obfuscated,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_renamer(mut self, renamer: Renamer) -> Self {
        self.renamer = renamer;
        self
    }

    pub fn method(&self) -> DeletionMethod {
        self.method
    }

    /// Shred one path. Never panics and never returns an error: every outcome
    /// is folded into the result.
    pub fn shred(&self, path: &Path) -> ShredResult {
        match self.try_shred(path) {
            Ok(result) => result,
            Err(e) => {
                debug!(
                    path = %path.display(),
                    error = %e,
                    kind = ?e.io_kind(),
                    "shred failed"
                );
                ShredResult::Failed(e)
            }
        }
    }

    fn try_shred(&self, path: &Path) -> Result<ShredResult, ShredError> {
        // Validate
        let metadata = match fs::symlink_metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(ShredResult::SkippedNotFound);
            }
            Err(e) => return Err(ShredError::io(path, ShredStage::Validate, e)),
        };

        let file_type = metadata.file_type();
        if file_type.is_symlink() {
            // The link is its own entry; its target is never opened
            debug!(path = %path.display(), "removing symbolic link without overwrite");
            return unlink(path);
        }
        if !file_type.is_file() {
            return Err(ShredError::NotRegularFile {
                path: path.to_path_buf(),
            });
        }

        if self.method == DeletionMethod::Simple {
            return unlink(path);
        }

        // Overwriting
        match self.overwrite_in_place(path) {
            Ok(()) => {}
            Err(ShredError::NotFound { .. }) => return Ok(ShredResult::SkippedNotFound),
            Err(e) => return Err(e),
        }

        // Renaming is best effort; unlink falls back to the original path
        let doomed = match (self.renamer)(path) {
            Ok(renamed) => renamed,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "rename before unlink failed, removing original name"
                );
                path.to_path_buf()
            }
        };

        unlink(&doomed)
    }

    /// Run every overwrite pass of this shredder's method over `path`.
    /// The handle is closed (after the last durability barrier) on return.
    pub(crate) fn overwrite_in_place(&self, path: &Path) -> Result<(), ShredError> {
        let mut file = open_for_overwrite(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ShredError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ShredError::io(path, ShredStage::Open, e),
        })?;

        let metadata = file
            .metadata()
            .map_err(|e| ShredError::io(path, ShredStage::Open, e))?;
        if !metadata.is_file() {
            return Err(ShredError::NotRegularFile {
                path: path.to_path_buf(),
            });
        }

        let length = metadata.len();
        debug!(
            path = %path.display(),
            bytes = length,
            passes = self.plan.pass_count(),
            method = %self.method,
            "overwriting"
        );

        let plan = self.plan;
        self.writer
            .overwrite(&mut file, length, plan.pass_count(), |pass| {
                trace!(pass = pass + 1, pattern = %plan.describe(pass), "pass pattern");
                plan.pattern(pass)
            })
            .map_err(|e| ShredError::io(path, ShredStage::Overwrite, e))
    }
}

/// Shred `path` with `method` using a default writer
pub fn shred(path: &Path, method: DeletionMethod) -> ShredResult {
    Shredder::new(method).shred(path)
}

fn open_for_overwrite(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.read(true).write(true);

    // Refuse a symlink swapped in after validation
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.custom_flags(libc::O_NOFOLLOW);
    }

    options.open(path)
}

fn unlink(path: &Path) -> Result<ShredResult, ShredError> {
    fs::remove_file(path).map_err(|e| ShredError::io(path, ShredStage::Unlink, e))?;
    debug!(path = %path.display(), "unlinked");
    Ok(ShredResult::Deleted)
}

/// Rename `path` to a random alphanumeric name in the same directory.
///
/// The new name has the original name's length, clamped to 8..=64 characters,
/// and must not already exist.
pub(crate) fn rename_to_obfuscated(path: &Path) -> io::Result<PathBuf> {
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let name_len = path
        .file_name()
        .map(|n| n.len())
        .unwrap_or(MIN_OBFUSCATED_LEN)
        .clamp(MIN_OBFUSCATED_LEN, MAX_OBFUSCATED_LEN);

    let mut rng = rand::thread_rng();
    for _ in 0..RENAME_ATTEMPTS {
        let candidate = parent.join(Alphanumeric.sample_string(&mut rng, name_len));
        if fs::symlink_metadata(&candidate).is_ok() {
            continue;
        }
        match rename_no_replace(path, &candidate) {
            Ok(()) => {
                debug!(from = %path.display(), to = %candidate.display(), "renamed before unlink");
                return Ok(candidate);
            }
            // Lost a race with another entry of that name
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        "no unused obfuscated name found",
    ))
}

/// Rename that fails with `AlreadyExists` instead of replacing `to`
#[cfg(all(target_os = "linux", target_env = "gnu"))]
pub(crate) fn rename_no_replace(from: &Path, to: &Path) -> io::Result<()> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_from = CString::new(from.as_os_str().as_bytes())?;
    let c_to = CString::new(to.as_os_str().as_bytes())?;

    let rc = unsafe {
        libc::renameat2(
            libc::AT_FDCWD,
            c_from.as_ptr(),
            libc::AT_FDCWD,
            c_to.as_ptr(),
            libc::RENAME_NOREPLACE,
        )
    };
    if rc == 0 {
        return Ok(());
    }

    let err = io::Error::last_os_error();
    match err.raw_os_error() {
        // File system or kernel without RENAME_NOREPLACE
        Some(libc::EINVAL) | Some(libc::ENOSYS) => fallback_rename(from, to),
        _ => Err(err),
    }
}

#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
pub(crate) fn rename_no_replace(from: &Path, to: &Path) -> io::Result<()> {
    fallback_rename(from, to)
}

// Check-then-rename: an entry created at `to` between the check and the
// rename is replaced. Only used where no atomic no-replace rename exists.
fn fallback_rename(from: &Path, to: &Path) -> io::Result<()> {
    if fs::symlink_metadata(to).is_ok() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "rename destination exists",
        ));
    }
    fs::rename(from, to)
}

#[cfg(test)]
mod shredder_tests;
