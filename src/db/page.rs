//! Per-page authenticated decryption.
//!
//! Every 4096-byte page carries its own IV and a truncated HMAC-SHA512
//! tag in the trailing 48 bytes. The tag binds the encrypted body, the
//! IV and the 1-based page number, so pages cannot be reordered or
//! spliced between files without detection.

use std::fmt;

use aes::cipher::{BlockDecryptMut, KeyIvInit, block_padding::NoPadding};
use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac_array;
use sha2::Sha512;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::{
    BODY_SIZE, IV_SIZE, KDF_ITER_ENC, KDF_ITER_MAC, KEY_SIZE, MAC_SALT_MASK, MAC_SIZE, PAGE_SIZE,
    SALT_SIZE,
};
use crate::error::{Error, Result};
use crate::key::MasterKey;

type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type HmacSha512 = Hmac<Sha512>;

/// The two subkeys a database file is processed under.
///
/// Derivation is expensive (256k PBKDF2 rounds for the encryption key),
/// so a [`SubKeys`] is created once per file and reused for every page.
/// Both keys are zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SubKeys {
    pub(crate) enc: [u8; KEY_SIZE],
    pub(crate) mac: [u8; KEY_SIZE],
}

impl fmt::Debug for SubKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Derives the encryption and MAC subkeys from the master key and the
/// salt stored at the start of page 1.
///
/// The MAC subkey is derived from the encryption subkey under the salt
/// XORed with `0x3a`, at a nominal iteration count.
pub fn derive_subkeys(key: &MasterKey, salt: &[u8; SALT_SIZE]) -> SubKeys {
    let enc = pbkdf2_hmac_array::<Sha512, KEY_SIZE>(key.as_bytes(), salt, KDF_ITER_ENC);
    let mac_salt = salt.map(|b| b ^ MAC_SALT_MASK);
    let mac = pbkdf2_hmac_array::<Sha512, KEY_SIZE>(&enc, &mac_salt, KDF_ITER_MAC);
    SubKeys { enc, mac }
}

fn page_tag(keys: &SubKeys, page_no: u32, body: &[u8], iv: &[u8]) -> Result<[u8; MAC_SIZE]> {
    let mut mac = HmacSha512::new_from_slice(&keys.mac).map_err(|_| Error::CryptoFailure)?;
    mac.update(body);
    mac.update(iv);
    mac.update(&page_no.to_le_bytes());

    let digest = mac.finalize().into_bytes();
    let mut tag = [0u8; MAC_SIZE];
    tag.copy_from_slice(&digest[..MAC_SIZE]);
    Ok(tag)
}

/// Checks the stored tag of a page against the one recomputed under
/// `keys`. Comparison is constant-time.
pub fn verify_page(keys: &SubKeys, page_no: u32, page: &[u8; PAGE_SIZE]) -> Result<bool> {
    let body = &page[..BODY_SIZE];
    let iv = &page[BODY_SIZE..BODY_SIZE + IV_SIZE];
    let stored = &page[BODY_SIZE + IV_SIZE..BODY_SIZE + IV_SIZE + MAC_SIZE];

    let computed = page_tag(keys, page_no, body, iv)?;
    Ok(bool::from(computed.ct_eq(stored)))
}

/// Cheap key-correctness oracle: derives subkeys from the salt embedded
/// in `page` and verifies its tag. Nothing is written.
pub fn validate_first_page(page: &[u8; PAGE_SIZE], key: &MasterKey) -> Result<bool> {
    let mut salt = [0u8; SALT_SIZE];
    salt.copy_from_slice(&page[..SALT_SIZE]);

    let keys = derive_subkeys(key, &salt);
    verify_page(&keys, 1, page)
}

/// Authenticates and decrypts one page, returning the full 4096-byte
/// output page: the CBC plaintext of the body followed by the untouched
/// IV, tag and reserved trailer.
///
/// For page 1 the first 16 plaintext bytes are meaningless (they decrypt
/// the salt block); the pipeline overwrites them with the SQLite magic.
pub fn decrypt_page(keys: &SubKeys, page_no: u32, page: &[u8; PAGE_SIZE]) -> Result<Vec<u8>> {
    if !verify_page(keys, page_no, page)? {
        return Err(Error::MacMismatch {
            page: u64::from(page_no),
        });
    }

    let iv = &page[BODY_SIZE..BODY_SIZE + IV_SIZE];
    let mut body = page[..BODY_SIZE].to_vec();

    // SQLite pages are a fixed width; the body is an exact multiple of
    // the block size and carries no padding layer.
    let cipher =
        Aes256CbcDec::new_from_slices(&keys.enc, iv).map_err(|_| Error::CryptoFailure)?;
    cipher
        .decrypt_padded_mut::<NoPadding>(&mut body)
        .map_err(|_| Error::CryptoFailure)?;

    let mut out = body;
    out.extend_from_slice(&page[BODY_SIZE..]);
    Ok(out)
}
