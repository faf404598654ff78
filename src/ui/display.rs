//! Formatted terminal output for scan listings, database facts and
//! batch summaries.

use std::path::Path;
use std::time::Duration;

use bytesize::ByteSize;

use crate::batch::{BatchReport, DbFileEntry};
use crate::db::pipeline::DatabaseInfo;

/// Lists scanned databases with their sizes and a total.
pub fn show_scan_results(entries: &[DbFileEntry]) {
    if entries.is_empty() {
        println!("{}", console::style("No .db files found").yellow().bright());
        return;
    }

    println!(
        "{} {}",
        console::style("✔").green().bright(),
        console::style(format!("Found {} database(s):", entries.len()))
            .white()
            .bright()
    );

    let mut total = 0u64;
    for (i, entry) in entries.iter().enumerate() {
        println!(
            "  {:3}. {} ({})",
            i + 1,
            entry.relative_path,
            ByteSize(entry.size_bytes)
        );
        total += entry.size_bytes;
    }
    println!("Total: {}", ByteSize(total));
}

/// Prints the keyless facts about one database file.
pub fn show_database_info(path: &Path, info: &DatabaseInfo) {
    println!("File:      {}", path.display());
    println!(
        "Size:      {} ({} bytes)",
        ByteSize(info.size_bytes),
        info.size_bytes
    );
    println!("Pages:     {} x {} bytes", info.page_count, info.page_size);
    println!("Salt:      {}", hex::encode(info.salt));
    println!(
        "Encrypted: {}",
        if info.is_encrypted { "yes" } else { "no" }
    );
}

/// Prints the per-file results and totals of a batch run.
pub fn show_batch_summary(report: &BatchReport, elapsed: Duration) {
    println!();
    for outcome in &report.successes {
        println!(
            "{} {} ({}, {:.1}s)",
            console::style("✔").green().bright(),
            outcome.relative_path,
            ByteSize(outcome.size_bytes),
            outcome.duration.as_secs_f64()
        );
    }
    for outcome in &report.failures {
        let reason = outcome
            .error
            .as_ref()
            .map_or_else(|| "unknown error".to_owned(), ToString::to_string);
        println!(
            "{} {}: {}",
            console::style("✗").red().bright(),
            outcome.relative_path,
            reason
        );
    }

    println!();
    println!(
        "{} succeeded, {} failed in {:.1}s",
        report.successes.len(),
        report.failures.len(),
        elapsed.as_secs_f64()
    );
}

/// Success line for a single decrypted file.
pub fn show_decrypted(input: &Path, output: &Path, detail: &str) {
    println!(
        "{} {}",
        console::style("✔").green().bright(),
        console::style(format!(
            "Decrypted {} -> {} ({detail})",
            input.display(),
            output.display()
        ))
        .white()
        .bright()
    );
}
