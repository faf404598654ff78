//! Format Constants
//!
//! This module contains the page geometry, key-derivation parameters and
//! container signatures for the WeChat v4 database and dat image
//! formats.
//!
//! ## Design Philosophy
//!
//! The configuration follows these principles:
//! - **Format First**: every value here is dictated by the on-disk
//!   format being decrypted, not chosen by this crate
//! - **Single Source**: all geometry and KDF parameters live in this
//!   module so the codec, pipeline and container code never hard-code
//!   offsets
//! - **Fail Closed**: inputs that do not match these parameters are
//!   rejected as corrupt rather than decrypted on a best-effort basis
//!
//! ## Security Considerations
//!
//! - The PBKDF2 iteration counts and the MAC salt mask must reproduce
//!   the writer's derivation exactly; they are compatibility constants,
//!   not tunables
//! - Key and tag sizes meet current security standards (256-bit keys,
//!   160-bit stored tags)
//! - Tag comparison elsewhere in the crate is constant-time; nothing in
//!   this module weakens that

/// Size of one database page in bytes.
///
/// Every file is an exact sequence of pages this large; a trailing
/// partial page is treated as corruption. The decrypted output keeps
/// the same page size, so standard SQLite tooling can open it.
pub const PAGE_SIZE: usize = 4096;

/// Size of the salt stored at the start of page 1.
pub const SALT_SIZE: usize = 16;

/// Size of the per-page AES-CBC initialization vector.
pub const IV_SIZE: usize = 16;

/// Stored length of the per-page authentication tag.
///
/// The writer computes HMAC-SHA512 (64 bytes) and stores only the first
/// 20 bytes in the page trailer. Verification therefore truncates the
/// recomputed digest to the same length before comparing.
///
/// Security Impact: 160 bits of tag still leave forgery at 2^160 tries
/// Compatibility Impact: comparing more or fewer bytes than the writer
/// stored makes every page fail authentication
pub const MAC_SIZE: usize = 20;

/// Trailing bytes of every page that are never encrypted:
/// IV (16) + tag (20) + reserved padding (12).
pub const RESERVE_SIZE: usize = 48;

/// Encrypted portion of a page.
pub const BODY_SIZE: usize = PAGE_SIZE - RESERVE_SIZE;

/// Size of the master key and both derived subkeys in bytes.
///
/// 32 bytes (256 bits) matches AES-256 and gives the HMAC subkey a full
/// hash-block's worth of entropy. The PBKDF2 output length is pinned to
/// this value.
///
/// Security Impact: 256-bit keys are beyond brute force for the
/// foreseeable future
/// Compatibility Impact: a different derived length produces unrelated
/// subkeys and every MAC check fails
pub const KEY_SIZE: usize = 32;

/// Length of a master key in hex notation.
pub const HEX_KEY_LEN: usize = 2 * KEY_SIZE;

// === Key Derivation Parameters ===
// These reproduce the derivation performed by the application that
// wrote the database. They must match bit-for-bit; none of them is a
// knob this crate may turn.

/// PBKDF2-HMAC-SHA512 iteration count for the encryption subkey.
///
/// The writer stretches the master key with this many rounds over the
/// page-1 salt. The count is what makes trying candidate keys against a
/// stolen database expensive.
///
/// Security Impact: each halving of the count halves an attacker's cost
/// per guess
/// Performance Impact: dominates file-open latency (~100-300ms per
/// database), which is why subkeys are derived once per file and reused
/// Compatibility Impact: any other count derives a different key and
/// the first-page check reports the key as wrong
pub const KDF_ITER_ENC: u32 = 256_000;

/// PBKDF2-HMAC-SHA512 iteration count for the MAC subkey.
///
/// Deliberately tiny: the input is the already-stretched encryption
/// subkey, not the user key, so these rounds only separate the two
/// subkey domains rather than add brute-force resistance.
///
/// Security Impact: none beyond domain separation; the entropy comes
/// from the encryption subkey
/// Compatibility Impact: must stay at 2 or every stored tag fails to
/// verify
pub const KDF_ITER_MAC: u32 = 2;

/// Byte XORed over the salt to form the MAC-subkey salt.
///
/// Keeps the MAC derivation from ever running PBKDF2 with the same salt
/// as the encryption derivation, so the two subkeys can never collide
/// even though one feeds the other.
///
/// Security Impact: guarantees distinct derivation domains for
/// encryption and authentication
/// Compatibility Impact: a different mask derives a MAC key unrelated
/// to the writer's and authentication fails on every page
pub const MAC_SALT_MASK: u8 = 0x3a;

/// Header of every standard SQLite 3 file; substituted over the salt
/// when page 1 is written out.
pub const SQLITE_MAGIC: &[u8; 16] = b"SQLite format 3\0";

/// File extension picked up by the batch scanner (matched
/// case-insensitively).
pub const DB_EXTENSION: &str = ".db";

// === dat Container Constants ===

/// AES block size; the ECB segment of a v4 dat container is aligned to
/// this.
pub const AES_BLOCK_SIZE: usize = 16;

/// Size of the v4 dat container header:
/// signature (6) + aes size (4) + xor size (4) + reserved (1).
pub const DAT_HEADER_SIZE: usize = 15;

/// Signature of a v4 dat container, first revision.
pub const V4_V1_SIGNATURE: [u8; 6] = *b"\x07\x08V1\x08\x07";

/// Signature of a v4 dat container, second revision.
pub const V4_V2_SIGNATURE: [u8; 6] = *b"\x07\x08V2\x08\x07";

/// AES key applied to v4 containers when the caller supplies none.
/// Well-known constant used by the v1 container revision.
pub const DEFAULT_V4_AES_KEY: &[u8; 16] = b"cfcd208495d565ef";

// === Progress Reporting ===

/// Pages decrypted between successive progress callbacks.
///
/// Callbacks run on the decrypting thread, so reporting every page
/// would put the sink on the hot path of a 4 KiB read/decrypt loop.
///
/// Performance Impact: bounds callback overhead to one call per 256 KiB
/// processed
pub const PAGE_PROGRESS_INTERVAL: u64 = 64;
