//! Error types shared across the decryption pipelines.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The supplied key is malformed, or the first-page check rejected it.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A page failed authentication after the key was accepted.
    #[error("hmac verification failed on page {page}")]
    MacMismatch { page: u64 },

    /// The input file does not have the expected shape.
    #[error("corrupt input: {0}")]
    CorruptInput(String),

    /// A cipher primitive rejected its input.
    #[error("cipher rejected its input")]
    CryptoFailure,

    /// A dat container frame with a version we do not understand.
    #[error("unsupported dat container version")]
    UnsupportedVersion,

    /// The AES segment of a dat container did not unpad cleanly.
    #[error("invalid pkcs#7 padding in aes segment")]
    BadPadding,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// A page-1 MAC failure is indistinguishable from a wrong key, so
    /// callers report both the same way.
    pub fn is_wrong_key(&self) -> bool {
        matches!(self, Self::InvalidKey(_) | Self::MacMismatch { page: 1 })
    }
}
