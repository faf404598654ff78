//! v3 dat decryption: a single-byte XOR over the whole file.

/// XORs every byte with `key`. Its own inverse.
pub fn xor_decrypt(data: &[u8], key: u8) -> Vec<u8> {
    data.iter().map(|b| b ^ key).collect()
}

/// Decrypts a v3 dat image.
#[inline]
pub fn decrypt_v3(data: &[u8], xor_key: u8) -> Vec<u8> {
    xor_decrypt(data, xor_key)
}

fn matches_known_magic(bytes: &[u8]) -> bool {
    const JPEG: &[u8] = &[0xff, 0xd8, 0xff];
    const PNG: &[u8] = &[0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];
    const GIF: &[u8] = &[0x47, 0x49, 0x46, 0x38];
    const BMP: &[u8] = &[0x42, 0x4d];

    if bytes.starts_with(JPEG)
        || bytes.starts_with(PNG)
        || bytes.starts_with(GIF)
        || bytes.starts_with(BMP)
    {
        return true;
    }

    // WEBP: RIFF container with a WEBP fourcc after the chunk size.
    bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP"
}

/// Probes for the XOR key of a v3 image by trying every candidate
/// against the known image magic table. Returns the first key (in
/// ascending order) whose decryption of `head` starts like a known
/// image format.
pub fn detect_xor_key(head: &[u8]) -> Option<u8> {
    if head.len() < 2 {
        return None;
    }

    (0..=u8::MAX).find(|&key| {
        let probe: Vec<u8> = head.iter().map(|b| b ^ key).collect();
        matches_known_magic(&probe)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xor_is_an_involution() {
        let data: Vec<u8> = (0..=255).collect();
        for key in [0x00, 0x01, 0x7b, 0xff] {
            assert_eq!(xor_decrypt(&xor_decrypt(&data, key), key), data);
        }
    }

    #[test]
    fn test_xor_with_zero_is_identity() {
        let data = b"unchanged".to_vec();
        assert_eq!(xor_decrypt(&data, 0), data);
    }

    #[test]
    fn test_detects_jpeg_key() {
        let jpeg_head = [0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, 0x4a, 0x46, 0x49, 0x46];
        let encrypted = xor_decrypt(&jpeg_head, 0x7b);

        assert_eq!(detect_xor_key(&encrypted), Some(0x7b));
        assert_eq!(decrypt_v3(&encrypted, 0x7b), jpeg_head);
    }

    #[test]
    fn test_detects_png_key() {
        let png_head = [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00];
        let encrypted = xor_decrypt(&png_head, 0xa5);
        assert_eq!(detect_xor_key(&encrypted), Some(0xa5));
    }

    #[test]
    fn test_detects_webp_key() {
        let mut webp_head = b"RIFF\x24\x00\x00\x00WEBPVP8 ".to_vec();
        webp_head.truncate(16);
        let encrypted = xor_decrypt(&webp_head, 0x33);
        assert_eq!(detect_xor_key(&encrypted), Some(0x33));
    }

    #[test]
    fn test_no_key_for_unrecognized_content() {
        let head: Vec<u8> = (0..16).collect();
        assert_eq!(detect_xor_key(&head), None);
        assert_eq!(detect_xor_key(&[0x42]), None);
    }
}
