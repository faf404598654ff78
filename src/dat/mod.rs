//! dat image container decryption.

pub mod v3;
pub mod v4;
pub mod version;

pub use v4::V4Header;
pub use version::{DatVersion, detect_version};

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use crate::config::DEFAULT_V4_AES_KEY;
use crate::error::{Error, Result};

/// Decrypts an in-memory dat image, dispatching on the detected
/// container version. `aes_key` is only consulted for v4 containers and
/// falls back to the well-known v1 key.
pub fn decrypt_bytes(
    data: &[u8],
    xor_key: u8,
    aes_key: Option<&[u8; 16]>,
) -> Result<(DatVersion, Vec<u8>)> {
    let version = detect_version(data);
    let plain = match version {
        DatVersion::V3 => v3::decrypt_v3(data, xor_key),
        DatVersion::V4V1 | DatVersion::V4V2 => {
            v4::decrypt_v4(data, xor_key, aes_key.unwrap_or(DEFAULT_V4_AES_KEY))?
        }
        DatVersion::Unknown => return Err(Error::UnsupportedVersion),
    };
    Ok((version, plain))
}

/// Decrypts a dat file on disk into `output`, returning the container
/// version that was handled.
pub fn auto_decrypt(
    input: &Path,
    output: &Path,
    xor_key: u8,
    aes_key: Option<&[u8; 16]>,
) -> Result<DatVersion> {
    let data = fs::read(input)?;
    let (version, plain) = decrypt_bytes(&data, xor_key, aes_key)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, plain)?;
    Ok(version)
}

fn read_prefix(input: &Path) -> Result<Vec<u8>> {
    let mut head = Vec::with_capacity(16);
    File::open(input)?.take(16).read_to_end(&mut head)?;
    Ok(head)
}

/// Reports the container version of a dat file.
pub fn detect_file_version(input: &Path) -> Result<DatVersion> {
    Ok(detect_version(&read_prefix(input)?))
}

/// Probes a dat file for its v3 XOR key. Only meaningful for v3 files;
/// v4 containers start with a signature and never match an image magic.
pub fn detect_xor_key(input: &Path) -> Result<Option<u8>> {
    Ok(v3::detect_xor_key(&read_prefix(input)?))
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_auto_decrypt_v3_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("img.dat");
        let output = dir.path().join("img.jpg");

        let jpeg = [0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, 0x4a, 0x46, 0x49, 0x46];
        fs::write(&input, v3::xor_decrypt(&jpeg, 0x7b)).unwrap();

        assert_eq!(detect_file_version(&input).unwrap(), DatVersion::V3);
        assert_eq!(detect_xor_key(&input).unwrap(), Some(0x7b));

        let version = auto_decrypt(&input, &output, 0x7b, None).unwrap();
        assert_eq!(version, DatVersion::V3);
        assert_eq!(fs::read(&output).unwrap(), jpeg);
    }

    #[test]
    fn test_unknown_container_is_rejected() {
        let err = decrypt_bytes(b"\x07\x08V7\x08\x07rest of file", 0, None).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion));
    }

    #[test]
    fn test_v4_defaults_to_the_v1_key() {
        use aes::cipher::{BlockEncryptMut, KeyInit, block_padding::NoPadding};
        type Aes128EcbEnc = ecb::Encryptor<aes::Aes128>;

        // One block of plaintext padded with a full padding block.
        let mut buf = Vec::from(*b"0123456789abcdef");
        buf.extend_from_slice(&[16u8; 16]);
        let len = buf.len();
        Aes128EcbEnc::new(DEFAULT_V4_AES_KEY.into())
            .encrypt_padded_mut::<NoPadding>(&mut buf, len)
            .unwrap();

        let mut data = crate::config::V4_V1_SIGNATURE.to_vec();
        data.extend_from_slice(&(buf.len() as u32).to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.push(0);
        data.extend_from_slice(&buf);

        let (version, plain) = decrypt_bytes(&data, 0, None).unwrap();
        assert_eq!(version, DatVersion::V4V1);
        assert_eq!(plain, b"0123456789abcdef");
    }
}
