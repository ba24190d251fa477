//! Pass-by-pass overwrite of a file's existing byte range.
//!
//! Every pass rewinds to offset 0, tiles the pass pattern across exactly
//! `file_length` bytes (the final tile truncated, never written past the end),
//! then issues a durability barrier before the next pass starts. The file
//! length is never changed; sparse ranges are materialized by the writes.


use std::borrow::Cow;
use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use tracing::trace;

/// Default size of the tiled write buffer
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// The minimal handle surface the overwrite protocol needs
#[cfg_attr(test, mockall::automock)]
pub trait OverwriteTarget {
    /// Position the next write at offset 0
    fn rewind_to_start(&mut self) -> io::Result<()>;

    /// Write the whole buffer at the current position
    fn write_chunk(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Flush and sync everything written so far to storage
    fn barrier(&mut self) -> io::Result<()>;
}

impl OverwriteTarget for File {
    fn rewind_to_start(&mut self) -> io::Result<()> {
        self.seek(SeekFrom::Start(0)).map(|_| ())
    }

    fn write_chunk(&mut self, buf: &[u8]) -> io::Result<()> {
        self.write_all(buf)
    }

    fn barrier(&mut self) -> io::Result<()> {
        self.flush()?;
        self.sync_all()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OverwriteWriter {
    chunk_size: usize,
}

impl Default for OverwriteWriter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl OverwriteWriter {
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Run `pass_count` full-length passes over `handle`.
    ///
    /// `pattern_source` is asked for the pattern of each pass in order. The
    /// first I/O or pattern error aborts the remaining passes.
    pub fn overwrite<T, F>(
        &self,
        handle: &mut T,
        file_length: u64,
        pass_count: u32,
        mut pattern_source: F,
    ) -> io::Result<()>
    where
        T: OverwriteTarget + ?Sized,
        F: FnMut(u32) -> io::Result<Cow<'static, [u8]>>,
    {
        let mut buffer = Vec::new();

        for pass in 0..pass_count {
            let pattern = pattern_source(pass)?;
            tile_pattern(&pattern, self.chunk_size, &mut buffer)?;

            handle.rewind_to_start()?;

            let mut remaining = file_length;
            while remaining > 0 {
                let n = remaining.min(buffer.len() as u64) as usize;
                handle.write_chunk(&buffer[..n])?;
                remaining -= n as u64;
            }

            handle.barrier()?;

            trace!(
                pass = pass + 1,
                passes = pass_count,
                bytes = file_length,
                "overwrite pass synced"
            );
        }

        Ok(())
    }
}

/// Convenience wrapper using the default chunk size
pub fn overwrite<T, F>(
    handle: &mut T,
    file_length: u64,
    pass_count: u32,
    pattern_source: F,
) -> io::Result<()>
where
    T: OverwriteTarget + ?Sized,
    F: FnMut(u32) -> io::Result<Cow<'static, [u8]>>,
{
    OverwriteWriter::default().overwrite(handle, file_length, pass_count, pattern_source)
}

/// Fill `buffer` with whole repetitions of `pattern`, about `chunk_size` bytes.
///
/// The length is a multiple of the pattern length (at least one repetition),
/// so consecutive chunks keep byte k of the file equal to pattern[k % len].
pub(crate) fn tile_pattern(pattern: &[u8], chunk_size: usize, buffer: &mut Vec<u8>) -> io::Result<()> {
    if pattern.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "overwrite pattern is empty",
        ));
    }

    let repetitions = (chunk_size / pattern.len()).max(1);
    buffer.clear();
    buffer.reserve(repetitions * pattern.len());
    for _ in 0..repetitions {
        buffer.extend_from_slice(pattern);
    }
    Ok(())
}
