//! v4 dat decryption.
//!
//! A v4 container is a 15-byte header followed by three sections: an
//! AES-128-ECB segment (PKCS#7 padded), a plaintext middle and an XOR
//! tail. The middle and tail are copied bit-for-bit; only the AES
//! segment is unpadded.

use aes::cipher::{BlockDecryptMut, KeyInit, block_padding::Pkcs7};
use log::debug;

use crate::config::{AES_BLOCK_SIZE, DAT_HEADER_SIZE};
use crate::error::{Error, Result};

type Aes128EcbDec = ecb::Decryptor<aes::Aes128>;

/// Parsed v4 container header.
#[derive(Debug, Clone, Copy)]
pub struct V4Header {
    /// Bytes of the AES section as named by the header; the section on
    /// disk is this rounded up to a whole block.
    pub aes_size: u32,
    /// Bytes of the XOR-encrypted tail.
    pub xor_size: u32,
}

impl V4Header {
    pub const SIZE: usize = DAT_HEADER_SIZE;

    /// Parses the header from the start of a container. The 6-byte
    /// signature has already been matched by version detection and is
    /// skipped here.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(Error::CorruptInput(
                "dat container header truncated".to_owned(),
            ));
        }

        let aes_size = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);
        let xor_size = u32::from_le_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]);

        Ok(Self { aes_size, xor_size })
    }

    /// On-disk length of the AES section.
    pub fn aligned_aes_size(&self) -> usize {
        let size = self.aes_size as usize;
        match size % AES_BLOCK_SIZE {
            0 => size,
            rem => size + (AES_BLOCK_SIZE - rem),
        }
    }
}

/// Decrypts a v4 container into the original image bytes.
pub fn decrypt_v4(data: &[u8], xor_key: u8, aes_key: &[u8; 16]) -> Result<Vec<u8>> {
    let header = V4Header::parse(data)?;
    let body = &data[V4Header::SIZE..];

    let aes_len = header.aligned_aes_size();
    if aes_len > body.len() {
        return Err(Error::CorruptInput(format!(
            "aes section ({aes_len} bytes) exceeds container body ({} bytes)",
            body.len()
        )));
    }

    let rest = &body[aes_len..];
    let xor_len = header.xor_size as usize;
    if xor_len > rest.len() {
        return Err(Error::CorruptInput(format!(
            "xor section ({xor_len} bytes) exceeds remaining body ({} bytes)",
            rest.len()
        )));
    }

    debug!(
        "v4 container: aes {} bytes, middle {} bytes, xor {} bytes",
        aes_len,
        rest.len() - xor_len,
        xor_len
    );

    let mut out = Vec::with_capacity(body.len());
    if aes_len > 0 {
        let mut section = body[..aes_len].to_vec();
        let plain = Aes128EcbDec::new(aes_key.into())
            .decrypt_padded_mut::<Pkcs7>(&mut section)
            .map_err(|_| Error::BadPadding)?;
        out.extend_from_slice(plain);
    }

    let middle_len = rest.len() - xor_len;
    out.extend_from_slice(&rest[..middle_len]);
    out.extend(rest[middle_len..].iter().map(|b| b ^ xor_key));

    Ok(out)
}
