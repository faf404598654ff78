//! Streaming database decryption.
//!
//! Reads an encrypted database page by page, feeds each page through the
//! codec in [`crate::db::page`] and writes the standard SQLite file out.
//! Pages are processed strictly in order; the output is exactly as large
//! as the input.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use log::debug;

use crate::config::{PAGE_PROGRESS_INTERVAL, PAGE_SIZE, SALT_SIZE, SQLITE_MAGIC};
use crate::db::page::{self, SubKeys};
use crate::error::{Error, Result};
use crate::key::MasterKey;
use crate::progress::ProgressSink;

/// Knobs for a single-file decryption run.
#[derive(Default, Clone, Copy)]
pub struct DecryptOptions<'a> {
    /// Skip the first-page key check. A wrong key then surfaces as a
    /// MAC mismatch on page 1 instead of an up-front rejection.
    pub skip_validation: bool,

    /// Optional page-progress receiver.
    pub progress: Option<&'a dyn ProgressSink>,
}

#[derive(Debug, Clone, Copy)]
pub struct DecryptStats {
    pub pages: u64,
    pub bytes: u64,
}

/// Keyless facts about a database file.
#[derive(Debug, Clone)]
pub struct DatabaseInfo {
    pub page_count: u64,
    pub page_size: usize,
    pub salt: [u8; SALT_SIZE],
    pub is_encrypted: bool,
    pub size_bytes: u64,
}

/// Decrypts `input` into `output`.
///
/// The output file is created only after the key has been accepted
/// (unless validation is skipped) and is removed again if any later
/// page fails. Derived subkeys are zeroized on every exit path.
pub fn decrypt_database(
    input: &Path,
    output: &Path,
    key: &MasterKey,
    options: &DecryptOptions<'_>,
) -> Result<DecryptStats> {
    let size = fs::metadata(input)?.len();
    if size == 0 {
        return Err(Error::CorruptInput("file is empty".to_owned()));
    }
    if size % PAGE_SIZE as u64 != 0 {
        return Err(Error::CorruptInput(format!(
            "size {size} is not a multiple of the {PAGE_SIZE}-byte page size"
        )));
    }
    let page_count = size / PAGE_SIZE as u64;

    let mut reader = BufReader::new(File::open(input)?);
    let mut first = [0u8; PAGE_SIZE];
    reader.read_exact(&mut first)?;

    let mut salt = [0u8; SALT_SIZE];
    salt.copy_from_slice(&first[..SALT_SIZE]);
    let keys = page::derive_subkeys(key, &salt);

    if !options.skip_validation && !page::verify_page(&keys, 1, &first)? {
        return Err(Error::InvalidKey(
            "first-page mac check failed".to_owned(),
        ));
    }

    let writer = create_output(output)?;
    match stream_pages(&mut reader, writer, &keys, &first, page_count, options) {
        Ok(stats) => {
            debug!(
                "decrypted {} ({} pages) -> {}",
                input.display(),
                stats.pages,
                output.display()
            );
            Ok(stats)
        }
        Err(e) => {
            // Never leave a partially written database behind.
            let _ = fs::remove_file(output);
            Err(e)
        }
    }
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;

    Ok(BufWriter::new(file))
}

fn stream_pages(
    reader: &mut BufReader<File>,
    mut writer: BufWriter<File>,
    keys: &SubKeys,
    first: &[u8; PAGE_SIZE],
    page_count: u64,
    options: &DecryptOptions<'_>,
) -> Result<DecryptStats> {
    let mut out_page = page::decrypt_page(keys, 1, first)?;
    out_page[..SQLITE_MAGIC.len()].copy_from_slice(SQLITE_MAGIC);
    writer.write_all(&out_page)?;
    report(options, 1, page_count);

    let mut buf = [0u8; PAGE_SIZE];
    for page_no in 2..=page_count {
        reader.read_exact(&mut buf)?;
        let out_page = page::decrypt_page(keys, page_no as u32, &buf)?;
        writer.write_all(&out_page)?;
        report(options, page_no, page_count);
    }

    writer.flush()?;
    Ok(DecryptStats {
        pages: page_count,
        bytes: page_count * PAGE_SIZE as u64,
    })
}

fn report(options: &DecryptOptions<'_>, page_no: u64, page_count: u64) {
    if let Some(sink) = options.progress
        && (page_no % PAGE_PROGRESS_INTERVAL == 0 || page_no == page_count)
    {
        sink.on_page(page_no, page_count);
    }
}

/// Reads the keyless header facts of a database file.
///
/// `is_encrypted` is true iff page 1 does not start with the SQLite
/// magic; the salt is simply the first 16 bytes of the file.
pub fn database_info(input: &Path) -> Result<DatabaseInfo> {
    let size = fs::metadata(input)?.len();

    let mut head = [0u8; SALT_SIZE];
    match File::open(input)?.read_exact(&mut head) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
            return Err(Error::CorruptInput(
                "file is shorter than a database header".to_owned(),
            ));
        }
        Err(e) => return Err(e.into()),
    }

    Ok(DatabaseInfo {
        page_count: size / PAGE_SIZE as u64,
        page_size: PAGE_SIZE,
        salt: head,
        is_encrypted: &head != SQLITE_MAGIC,
        size_bytes: size,
    })
}

/// Checks a key against a database without writing anything.
pub fn validate_key(input: &Path, key: &MasterKey) -> Result<bool> {
    let mut first = [0u8; PAGE_SIZE];
    match File::open(input)?.read_exact(&mut first) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
            return Err(Error::CorruptInput(
                "file is shorter than one page".to_owned(),
            ));
        }
        Err(e) => return Err(e.into()),
    }

    page::validate_first_page(&first, key)
}
