//! Progress bar visualization.
//!
//! Wraps `indicatif` bars behind the [`ProgressSink`] trait so the
//! pipelines stay terminal-agnostic.

use anyhow::Result;
use indicatif::{ProgressBar as Bar, ProgressStyle as Style};

use crate::progress::ProgressSink;

/// Bar template for page-level progress of one database.
const PAGE_TEMPLATE: &str =
    "{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} pages ({eta})";

/// Bar template for file-level progress of a batch run.
const FILE_TEMPLATE: &str = "{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} files";

fn styled_bar(template: &str) -> Result<Bar> {
    let bar = Bar::no_length();
    bar.set_style(Style::with_template(template)?.progress_chars("●○ "));
    Ok(bar)
}

/// Page-level bar for a single database.
pub struct PageBar {
    bar: Bar,
}

impl PageBar {
    pub fn new(total_pages: u64, description: &str) -> Result<Self> {
        let bar = styled_bar(PAGE_TEMPLATE)?;
        bar.set_length(total_pages);
        bar.set_message(description.to_owned());
        Ok(Self { bar })
    }

    #[inline]
    pub fn finish(&self) {
        self.bar.finish()
    }
}

impl ProgressSink for PageBar {
    fn on_page(&self, current: u64, _total: u64) {
        self.bar.set_position(current);
    }
}

/// File-level bar for a parallel batch run.
pub struct BatchBar {
    bar: Bar,
}

impl BatchBar {
    pub fn new() -> Result<Self> {
        Ok(Self {
            bar: styled_bar(FILE_TEMPLATE)?,
        })
    }

    #[inline]
    pub fn finish(&self) {
        self.bar.finish()
    }
}

impl ProgressSink for BatchBar {
    fn on_file(&self, path: &str, current: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(current as u64);
        self.bar.set_message(path.to_owned());
    }
}

/// Sink for sequential batch runs: one line per file plus a page bar
/// that restarts for each database.
pub struct SequentialBatchSink {
    bar: Bar,
}

impl SequentialBatchSink {
    pub fn new() -> Result<Self> {
        Ok(Self {
            bar: styled_bar(PAGE_TEMPLATE)?,
        })
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear()
    }
}

impl ProgressSink for SequentialBatchSink {
    fn on_page(&self, current: u64, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(current);
    }

    fn on_file(&self, path: &str, current: usize, total: usize) {
        self.bar.set_position(0);
        self.bar.println(format!("[{current}/{total}] {path}"));
        self.bar.set_message(path.to_owned());
    }
}
