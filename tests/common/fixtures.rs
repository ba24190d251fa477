/// Temporary file trees for end-to-end shredding
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A directory tree under a temp dir that is removed on drop
pub struct TestTree {
    dir: TempDir,
    files: Vec<PathBuf>,
}

impl TestTree {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
            files: Vec::new(),
        }
    }

    /// Add a file at `relative`, creating parent directories as needed
    pub fn with_file(mut self, relative: &str, content: &[u8]) -> Self {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent");
        }
        fs::write(&path, content).expect("Failed to write file");
        self.files.push(path);
        self
    }

    /// Add `count` files named `name00`, `name01`, ... in `relative_dir`
    pub fn with_numbered_files(mut self, relative_dir: &str, count: usize, size: usize) -> Self {
        for i in 0..count {
            let relative = format!("{}/file{:02}.dat", relative_dir, i);
            let content = vec![(i as u8).wrapping_add(0x41); size];
            self = self.with_file(&relative, &content);
        }
        self
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Files added so far, in insertion order
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Every entry still present under the root, relative and sorted
    pub fn remaining(&self) -> Vec<String> {
        walkdir::WalkDir::new(self.dir.path())
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| !e.file_type().is_dir())
            .map(|e| {
                e.path()
                    .strip_prefix(self.dir.path())
                    .map(|p| p.to_string_lossy().into_owned())
                    .unwrap_or_default()
            })
            .collect()
    }
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}
