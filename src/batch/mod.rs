//! Batch decryption: directory scanning plus the worker pool that
//! drives the single-file pipeline over every discovered database.

pub mod pool;

pub use pool::{BatchOptions, BatchReport, FileOutcome, decrypt_batch};

use std::path::Path;

use log::debug;
use walkdir::WalkDir;

use crate::config::DB_EXTENSION;
use crate::error::Result;

/// One database discovered under the scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbFileEntry {
    /// Path relative to the scan root, always with forward slashes.
    pub relative_path: String,
    pub size_bytes: u64,
}

/// Recursively collects every regular `.db` file under `root`
/// (extension matched case-insensitively), ordered by relative path.
/// The ordering is deterministic: repeated scans of an unchanged tree
/// return the same list.
pub fn scan(root: &Path) -> Result<Vec<DbFileEntry>> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !name.to_ascii_lowercase().ends_with(DB_EXTENSION) {
            continue;
        }

        let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let relative_path = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let size_bytes = entry.metadata().map_err(std::io::Error::from)?.len();

        entries.push(DbFileEntry {
            relative_path,
            size_bytes,
        });
    }

    entries.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    debug!("scan of {} found {} databases", root.display(), entries.len());
    Ok(entries)
}
