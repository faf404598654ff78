//! Command-line interface.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use crate::batch::{self, BatchOptions};
use crate::dat;
use crate::db::pipeline::{self, DecryptOptions};
use crate::key::MasterKey;
use crate::progress::{NoopSink, ProgressSink};
use crate::ui::display;
use crate::ui::progress::{BatchBar, PageBar, SequentialBatchSink};

#[derive(Parser)]
#[command(
    name = "wxunlock",
    version,
    about = "Decrypt WeChat v4 databases and dat images. The master key must be supplied as 64 hex characters."
)]
pub struct Cli {
    /// Suppress progress bars and per-file listings.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[inline]
pub fn parse() -> Cli {
    Cli::parse()
}

impl Cli {
    pub fn execute(self) -> Result<()> {
        self.command.run(self.quiet)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decrypt a single database file.
    Db {
        /// Encrypted database path.
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the decrypted SQLite file.
        #[arg(short, long)]
        output: PathBuf,

        /// Master key (64 hex characters).
        #[arg(short, long)]
        key: String,

        /// Skip the first-page key check.
        #[arg(long)]
        skip_validation: bool,
    },

    /// Recursively decrypt every .db file under a directory.
    Batch {
        /// Root directory to scan.
        #[arg(short, long)]
        input: PathBuf,

        /// Output root; the input tree is mirrored below it.
        #[arg(short, long)]
        output: PathBuf,

        /// Master key (64 hex characters).
        #[arg(short, long)]
        key: String,

        /// Worker threads; 0 decrypts sequentially with per-page progress.
        #[arg(long, default_value_t = 0)]
        parallel: usize,

        /// Skip the first-page key check on every file.
        #[arg(long)]
        skip_validation: bool,

        /// List matching databases and exit without decrypting.
        #[arg(long)]
        scan_only: bool,
    },

    /// Check a key against a database without writing anything.
    Validate {
        /// Encrypted database path.
        #[arg(short, long)]
        input: PathBuf,

        /// Master key (64 hex characters).
        #[arg(short, long)]
        key: String,
    },

    /// Print keyless information about a database file.
    Info {
        /// Database path.
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Decrypt a dat image file.
    Image {
        /// Encrypted dat path.
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the raw image bytes.
        #[arg(short, long)]
        output: PathBuf,

        /// XOR key (0-255). Probed automatically for v3 files when
        /// omitted.
        #[arg(long)]
        xor_key: Option<u8>,

        /// AES key for v4 containers, 16 ASCII characters. Defaults to
        /// the well-known v1 key.
        #[arg(long)]
        aes_key: Option<String>,
    },

    /// Report the dat container version and probe the xor key.
    Detect {
        /// dat file path.
        #[arg(short, long)]
        input: PathBuf,
    },
}

impl Commands {
    pub fn run(self, quiet: bool) -> Result<()> {
        match self {
            Self::Db {
                input,
                output,
                key,
                skip_validation,
            } => run_db(&input, &output, &key, skip_validation, quiet),
            Self::Batch {
                input,
                output,
                key,
                parallel,
                skip_validation,
                scan_only,
            } => run_batch(&input, &output, &key, parallel, skip_validation, scan_only, quiet),
            Self::Validate { input, key } => run_validate(&input, &key),
            Self::Info { input } => run_info(&input),
            Self::Image {
                input,
                output,
                xor_key,
                aes_key,
            } => run_image(&input, &output, xor_key, aes_key.as_deref(), quiet),
            Self::Detect { input } => run_detect(&input),
        }
    }
}

fn run_db(
    input: &Path,
    output: &Path,
    key: &str,
    skip_validation: bool,
    quiet: bool,
) -> Result<()> {
    // Key problems must surface before the input file is touched.
    let key = MasterKey::from_hex(key)?;

    let bar = if quiet {
        None
    } else {
        let info = pipeline::database_info(input)?;
        Some(PageBar::new(info.page_count, "Decrypting")?)
    };
    let options = DecryptOptions {
        skip_validation,
        progress: bar.as_ref().map(|b| b as &dyn ProgressSink),
    };

    let stats = match pipeline::decrypt_database(input, output, &key, &options) {
        Err(e) if e.is_wrong_key() => {
            return Err(
                anyhow::Error::new(e).context(format!("key rejected for {}", input.display()))
            );
        }
        other => other.with_context(|| format!("failed to decrypt {}", input.display()))?,
    };

    if let Some(bar) = bar {
        bar.finish();
    }
    if !quiet {
        display::show_decrypted(input, output, &format!("{} pages", stats.pages));
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_batch(
    input: &Path,
    output: &Path,
    key: &str,
    parallel: usize,
    skip_validation: bool,
    scan_only: bool,
    quiet: bool,
) -> Result<()> {
    let key = MasterKey::from_hex(key)?;

    if scan_only {
        let entries = batch::scan(input)?;
        display::show_scan_results(&entries);
        return Ok(());
    }

    let options = BatchOptions {
        workers: parallel,
        skip_validation,
    };
    let started = Instant::now();

    let report = if quiet {
        batch::decrypt_batch(input, output, &key, &options, &NoopSink)?
    } else if parallel == 0 {
        let sink = SequentialBatchSink::new()?;
        let report = batch::decrypt_batch(input, output, &key, &options, &sink)?;
        sink.finish();
        report
    } else {
        let bar = BatchBar::new()?;
        let report = batch::decrypt_batch(input, output, &key, &options, &bar)?;
        bar.finish();
        report
    };

    if report.total() == 0 {
        bail!("no .db files found under {}", input.display());
    }
    if !quiet {
        display::show_batch_summary(&report, started.elapsed());
    }
    if !report.failures.is_empty() {
        bail!(
            "{} of {} files failed to decrypt",
            report.failures.len(),
            report.total()
        );
    }
    Ok(())
}

fn run_validate(input: &Path, key: &str) -> Result<()> {
    let key = MasterKey::from_hex(key)?;
    if pipeline::validate_key(input, &key)? {
        println!(
            "{} key accepted for {}",
            console::style("✔").green().bright(),
            input.display()
        );
        Ok(())
    } else {
        bail!("key rejected for {}", input.display());
    }
}

fn run_info(input: &Path) -> Result<()> {
    let info = pipeline::database_info(input)?;
    display::show_database_info(input, &info);
    Ok(())
}

fn run_image(
    input: &Path,
    output: &Path,
    xor_key: Option<u8>,
    aes_key: Option<&str>,
    quiet: bool,
) -> Result<()> {
    let aes_key = aes_key.map(parse_aes_key).transpose()?;

    let xor_key = match xor_key {
        Some(key) => key,
        None => dat::detect_xor_key(input)?.with_context(|| {
            format!(
                "unable to probe the xor key for {}; pass --xor-key",
                input.display()
            )
        })?,
    };

    let version = dat::auto_decrypt(input, output, xor_key, aes_key.as_ref())
        .with_context(|| format!("failed to decrypt {}", input.display()))?;

    if !quiet {
        display::show_decrypted(input, output, version.label());
    }
    Ok(())
}

fn parse_aes_key(key: &str) -> Result<[u8; 16]> {
    let bytes = key.as_bytes();
    if bytes.len() != 16 {
        bail!("aes key must be 16 characters, got {}", bytes.len());
    }
    let mut out = [0u8; 16];
    out.copy_from_slice(bytes);
    Ok(out)
}

fn run_detect(input: &Path) -> Result<()> {
    let version = dat::detect_file_version(input)?;
    println!("Version: {}", version.label());

    match dat::detect_xor_key(input)? {
        Some(key) => println!("XOR key: {key} (0x{key:02x})"),
        None => println!("XOR key: not detected"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aes_key_must_be_sixteen_chars() {
        assert!(parse_aes_key("0123456789abcdef").is_ok());
        assert!(parse_aes_key("short").is_err());
        assert!(parse_aes_key("0123456789abcdef0").is_err());
    }
}
