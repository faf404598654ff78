//! dat container version detection.

use crate::config::{V4_V1_SIGNATURE, V4_V2_SIGNATURE};

/// Encryption scheme of a dat image file.
///
/// v3 files carry no signature and are XOR-encrypted whole. v4 files
/// open with a six-byte signature frame whose middle bytes name the
/// container revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatVersion {
    /// No container signature; whole-file single-byte XOR.
    V3,
    /// v4 container, first revision (fixed AES key).
    V4V1,
    /// v4 container, second revision (per-account AES key).
    V4V2,
    /// A v4 signature frame with a revision we do not know.
    Unknown,
}

impl DatVersion {
    pub fn label(self) -> &'static str {
        match self {
            Self::V3 => "v3 (xor)",
            Self::V4V1 => "v4-v1 (aes+xor)",
            Self::V4V2 => "v4-v2 (aes+xor)",
            Self::Unknown => "unknown",
        }
    }
}

/// Classifies a dat file by its leading bytes. Pure function; prefixes
/// shorter than a signature are v3 by definition.
pub fn detect_version(prefix: &[u8]) -> DatVersion {
    if prefix.len() < V4_V1_SIGNATURE.len() {
        return DatVersion::V3;
    }

    let mut sig = [0u8; 6];
    sig.copy_from_slice(&prefix[..6]);

    match sig {
        V4_V1_SIGNATURE => DatVersion::V4V1,
        V4_V2_SIGNATURE => DatVersion::V4V2,
        // Same frame bytes around an unexpected revision marker.
        [0x07, 0x08, 0x56, _, 0x08, 0x07] => DatVersion::Unknown,
        _ => DatVersion::V3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_signatures() {
        assert_eq!(detect_version(b"\x07\x08V1\x08\x07rest"), DatVersion::V4V1);
        assert_eq!(detect_version(b"\x07\x08V2\x08\x07rest"), DatVersion::V4V2);
    }

    #[test]
    fn test_unknown_revision_in_v4_frame() {
        assert_eq!(detect_version(b"\x07\x08V3\x08\x07"), DatVersion::Unknown);
        assert_eq!(detect_version(b"\x07\x08V9\x08\x07"), DatVersion::Unknown);
    }

    #[test]
    fn test_everything_else_is_v3() {
        assert_eq!(detect_version(b"\xff\xd8\xff\xe0\x00\x10"), DatVersion::V3);
        assert_eq!(detect_version(b""), DatVersion::V3);
        assert_eq!(detect_version(b"\x07\x08V"), DatVersion::V3);
        assert_eq!(detect_version(b"\x07\x08X1\x08\x07"), DatVersion::V3);
    }

    #[test]
    fn test_detection_only_reads_the_prefix() {
        let mut a = b"\x07\x08V1\x08\x07".to_vec();
        let mut b = a.clone();
        a.extend_from_slice(&[0u8; 64]);
        b.extend_from_slice(&[0xffu8; 512]);
        assert_eq!(detect_version(&a), detect_version(&b));
    }
}
