//! Master key handling.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::{HEX_KEY_LEN, KEY_SIZE};
use crate::error::{Error, Result};

/// The 256-bit master key a database was encrypted under.
///
/// Parsed from hex before any file is touched, and overwritten with
/// zeros when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey([u8; KEY_SIZE]);

impl MasterKey {
    /// Parses a key from its 64-character hex notation.
    ///
    /// Accepts upper and lower case. Anything that is not exactly 64
    /// hex characters is rejected up front.
    pub fn from_hex(hex_key: &str) -> Result<Self> {
        let hex_key = hex_key.trim();
        if hex_key.len() != HEX_KEY_LEN {
            return Err(Error::InvalidKey(format!(
                "expected {HEX_KEY_LEN} hex characters, got {}",
                hex_key.len()
            )));
        }

        let mut key = [0u8; KEY_SIZE];
        hex::decode_to_slice(hex_key, &mut key)
            .map_err(|_| Error::InvalidKey("key contains non-hex characters".to_owned()))?;

        Ok(Self(key))
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "a1b2c3d4e5f60718293a4b5c6d7e8f90a1b2c3d4e5f60718293a4b5c6d7e8f90";

    #[test]
    fn test_parses_valid_hex() {
        let key = MasterKey::from_hex(SAMPLE).unwrap();
        assert_eq!(key.as_bytes()[0], 0xa1);
        assert_eq!(key.as_bytes()[31], 0x90);
    }

    #[test]
    fn test_case_insensitive() {
        let lower = MasterKey::from_hex(SAMPLE).unwrap();
        let upper = MasterKey::from_hex(&SAMPLE.to_uppercase()).unwrap();
        assert_eq!(lower.as_bytes(), upper.as_bytes());
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(matches!(
            MasterKey::from_hex(&SAMPLE[..63]),
            Err(Error::InvalidKey(_))
        ));
        let long = format!("{SAMPLE}0");
        assert!(matches!(
            MasterKey::from_hex(&long),
            Err(Error::InvalidKey(_))
        ));
    }

    #[test]
    fn test_rejects_non_hex() {
        let bad = format!("g{}", &SAMPLE[1..]);
        assert!(matches!(
            MasterKey::from_hex(&bad),
            Err(Error::InvalidKey(_))
        ));
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = MasterKey::from_hex(SAMPLE).unwrap();
        assert_eq!(format!("{key:?}"), "[REDACTED]");
    }
}
