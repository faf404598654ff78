//! Encrypted database handling: the per-page codec and the streaming
//! file pipeline built on top of it.

pub mod page;
pub mod pipeline;

pub use page::{SubKeys, derive_subkeys, validate_first_page};
pub use pipeline::{
    DatabaseInfo, DecryptOptions, DecryptStats, database_info, decrypt_database, validate_key,
};

/// Test-only inverse of the page codec, used to build encrypted
/// fixtures that the real decryption paths are exercised against.
#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::LazyLock;

    use aes::cipher::{BlockEncryptMut, KeyIvInit, block_padding::NoPadding};
    use hmac::{Hmac, Mac};
    use sha2::Sha512;

    use crate::config::{BODY_SIZE, IV_SIZE, KEY_SIZE, MAC_SIZE, PAGE_SIZE, SALT_SIZE};
    use crate::db::page::{SubKeys, derive_subkeys};
    use crate::key::MasterKey;

    type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;

    pub(crate) const KEY_HEX: &str =
        "0000000000000000000000000000000000000000000000000000000000000000";
    pub(crate) const WRONG_KEY_HEX: &str =
        "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";
    pub(crate) const SALT: [u8; SALT_SIZE] = [0x11; SALT_SIZE];

    pub(crate) fn master_key() -> MasterKey {
        MasterKey::from_hex(KEY_HEX).unwrap()
    }

    // Subkey derivation runs 256k PBKDF2 rounds; share one derivation
    // across the whole test binary.
    static KEYS: LazyLock<SubKeys> = LazyLock::new(|| derive_subkeys(&master_key(), &SALT));

    pub(crate) fn subkeys() -> &'static SubKeys {
        &KEYS
    }

    /// Deterministic filler for the plaintext body of a page.
    pub(crate) fn sample_body(page_no: u32) -> Vec<u8> {
        (0..BODY_SIZE)
            .map(|i| (i as u32).wrapping_mul(31).wrapping_add(page_no.wrapping_mul(7)) as u8)
            .collect()
    }

    fn cbc_encrypt(key: &[u8; KEY_SIZE], iv: &[u8; IV_SIZE], plaintext: &[u8]) -> Vec<u8> {
        let mut buf = plaintext.to_vec();
        let len = buf.len();
        Aes256CbcEnc::new(key.into(), iv.into())
            .encrypt_padded_mut::<NoPadding>(&mut buf, len)
            .unwrap();
        buf
    }

    fn tag_for(keys: &SubKeys, page_no: u32, body: &[u8], iv: &[u8]) -> [u8; MAC_SIZE] {
        let mut mac = Hmac::<Sha512>::new_from_slice(&keys.mac).unwrap();
        mac.update(body);
        mac.update(iv);
        mac.update(&page_no.to_le_bytes());
        let digest = mac.finalize().into_bytes();
        digest[..MAC_SIZE].try_into().unwrap()
    }

    /// Builds one encrypted page around `plaintext` (BODY_SIZE bytes).
    ///
    /// Page 1 keeps the salt as its first on-disk block; the CBC chain
    /// for the remaining blocks starts from it, matching what the
    /// decryptor expects when it runs the whole body under the
    /// trailer IV.
    pub(crate) fn encrypt_page(keys: &SubKeys, page_no: u32, plaintext: &[u8]) -> Vec<u8> {
        assert_eq!(plaintext.len(), BODY_SIZE);
        let iv = [0x40u8.wrapping_add(page_no as u8); IV_SIZE];

        let body = if page_no == 1 {
            let mut body = SALT.to_vec();
            body.extend_from_slice(&cbc_encrypt(&keys.enc, &SALT, &plaintext[SALT_SIZE..]));
            body
        } else {
            cbc_encrypt(&keys.enc, &iv, plaintext)
        };

        let tag = tag_for(keys, page_no, &body, &iv);

        let mut page = body;
        page.extend_from_slice(&iv);
        page.extend_from_slice(&tag);
        page.extend_from_slice(&[0u8; PAGE_SIZE - BODY_SIZE - IV_SIZE - MAC_SIZE]);
        assert_eq!(page.len(), PAGE_SIZE);
        page
    }

    /// Builds a complete encrypted database image of `pages` pages.
    pub(crate) fn make_encrypted_db(pages: u32) -> Vec<u8> {
        let keys = subkeys();
        (1..=pages)
            .flat_map(|p| encrypt_page(keys, p, &sample_body(p)))
            .collect()
    }
}
