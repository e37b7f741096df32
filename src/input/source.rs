//! Table file read provider

use std::io;
use std::path::Path;

/// Supplies raw table bytes for a path.
///
/// The engine reads tables only through this trait, so tests and embedders
/// can serve tables from memory.
pub trait TableSource: Send + Sync {
    /// # Errors
    /// Returns the I/O error when the table is missing or unreadable.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Reads tables from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsTableSource;

impl TableSource for FsTableSource {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}
