//! Progress reporting hooks.
//!
//! The pipelines report through an opaque sink so the core stays free of
//! any terminal dependency; the binary plugs in indicatif bars, tests
//! and embedders use the no-op sink.

/// Receives progress events from the decryption pipelines.
///
/// Callbacks are invoked on the thread doing the work and must not
/// block. Page callbacks are rate-limited by the pipeline (see
/// [`crate::config::PAGE_PROGRESS_INTERVAL`]).
pub trait ProgressSink: Sync {
    /// Called as pages of a single database are written.
    fn on_page(&self, _current: u64, _total: u64) {}

    /// Called as files of a batch are processed.
    fn on_file(&self, _path: &str, _current: usize, _total: usize) {}
}

/// Sink that ignores every event.
pub struct NoopSink;

impl ProgressSink for NoopSink {}
