//! The bounded worker pool behind batch decryption.
//!
//! Files are independent work units: a FIFO channel feeds a fixed set
//! of OS threads, and every outcome lands in a mutex-guarded sink in
//! completion order. A failing file never aborts its siblings.

use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use log::warn;

use crate::batch::{DbFileEntry, scan};
use crate::db::pipeline::{DecryptOptions, decrypt_database};
use crate::error::{Error, Result};
use crate::key::MasterKey;
use crate::progress::ProgressSink;

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// Worker threads. Zero decrypts sequentially, which is the mode
    /// that reports fine-grained per-page progress.
    pub workers: usize,
    pub skip_validation: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            workers: 0,
            skip_validation: false,
        }
    }
}

/// Result of one file in a batch run.
#[derive(Debug)]
pub struct FileOutcome {
    pub relative_path: String,
    pub size_bytes: u64,
    pub duration: Duration,
    /// `None` on success.
    pub error: Option<Error>,
}

impl FileOutcome {
    #[inline]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub successes: Vec<FileOutcome>,
    pub failures: Vec<FileOutcome>,
}

impl BatchReport {
    #[inline]
    pub fn total(&self) -> usize {
        self.successes.len() + self.failures.len()
    }
}

/// Decrypts every `.db` file under `root` into the mirrored tree below
/// `out_root`.
///
/// All files are attempted; per-file errors are recorded in the report
/// rather than propagated. The result lists are ordered by completion.
pub fn decrypt_batch(
    root: &Path,
    out_root: &Path,
    key: &MasterKey,
    options: &BatchOptions,
    sink: &dyn ProgressSink,
) -> Result<BatchReport> {
    let entries = scan(root)?;
    prepare_output_tree(out_root, &entries)?;

    let outcomes = if options.workers == 0 {
        run_sequential(root, out_root, &entries, key, options, sink)
    } else {
        run_parallel(root, out_root, &entries, key, options, sink)
    };

    let (successes, failures) = outcomes.into_iter().partition(FileOutcome::is_success);
    Ok(BatchReport {
        successes,
        failures,
    })
}

/// Mirrors the directory structure up front so workers never race on
/// directory creation.
fn prepare_output_tree(out_root: &Path, entries: &[DbFileEntry]) -> Result<()> {
    fs::create_dir_all(out_root)?;
    for entry in entries {
        if let Some(parent) = out_root.join(&entry.relative_path).parent() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn decrypt_one(
    root: &Path,
    out_root: &Path,
    entry: &DbFileEntry,
    key: &MasterKey,
    options: &BatchOptions,
    progress: Option<&dyn ProgressSink>,
) -> FileOutcome {
    let input = root.join(&entry.relative_path);
    let output = out_root.join(&entry.relative_path);
    let started = Instant::now();

    let decrypt_options = DecryptOptions {
        skip_validation: options.skip_validation,
        progress,
    };
    let error = decrypt_database(&input, &output, key, &decrypt_options).err();
    if let Some(e) = &error {
        warn!("{}: {e}", entry.relative_path);
    }

    FileOutcome {
        relative_path: entry.relative_path.clone(),
        size_bytes: entry.size_bytes,
        duration: started.elapsed(),
        error,
    }
}

fn run_sequential(
    root: &Path,
    out_root: &Path,
    entries: &[DbFileEntry],
    key: &MasterKey,
    options: &BatchOptions,
    sink: &dyn ProgressSink,
) -> Vec<FileOutcome> {
    let total = entries.len();
    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            sink.on_file(&entry.relative_path, idx + 1, total);
            decrypt_one(root, out_root, entry, key, options, Some(sink))
        })
        .collect()
}

fn run_parallel(
    root: &Path,
    out_root: &Path,
    entries: &[DbFileEntry],
    key: &MasterKey,
    options: &BatchOptions,
    sink: &dyn ProgressSink,
) -> Vec<FileOutcome> {
    let total = entries.len();
    let (tx, rx) = flume::unbounded::<DbFileEntry>();
    for entry in entries {
        // Send on an unbounded channel with the receiver alive cannot
        // fail.
        let _ = tx.send(entry.clone());
    }
    drop(tx);

    let results = Mutex::new(Vec::with_capacity(total));

    thread::scope(|scope| {
        for _ in 0..options.workers {
            let rx = rx.clone();
            let results = &results;
            scope.spawn(move || {
                for entry in rx.iter() {
                    let outcome = decrypt_one(root, out_root, &entry, key, options, None);
                    let done = {
                        let mut guard =
                            results.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                        guard.push(outcome);
                        guard.len()
                    };
                    sink.on_file(&entry.relative_path, done, total);
                }
            });
        }
    });

    results
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
