//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A test fixture that provides source and destination directories.
pub struct TestFixture {
    pub src: TempDir,
    pub dst: TempDir,
}

impl TestFixture {
    /// Create a new test fixture with fresh source and destination directories.
    pub fn new() -> Self {
        Self {
            src: TempDir::new().expect("Failed to create temp source dir"),
            dst: TempDir::new().expect("Failed to create temp dest dir"),
        }
    }

    /// Create a source file of `size` bytes with a repeating byte pattern.
    pub fn create_file(&self, name: &str, size: usize) -> PathBuf {
        let content: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
        let path = self.src.path().join(name);
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Create `count` source files named `file{i}.bin`, each `size` bytes.
    pub fn create_files(&self, count: usize, size: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| self.create_file(&format!("file{}.bin", i), size))
            .collect()
    }

    /// Assert that `copy` has the same bytes as `original`.
    pub fn assert_same_content(&self, original: &Path, copy: &Path) {
        assert!(copy.exists(), "File does not exist: {:?}", copy);
        let expected = fs::read(original).expect("Failed to read original");
        let actual = fs::read(copy).expect("Failed to read copy");
        assert_eq!(actual, expected, "File content mismatch: {:?}", copy);
    }

    /// Count entries left in the destination directory.
    pub fn count_dst_entries(&self) -> usize {
        fs::read_dir(self.dst.path())
            .expect("Failed to read directory")
            .filter_map(|e| e.ok())
            .count()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
