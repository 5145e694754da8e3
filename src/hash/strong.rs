// Strong hash: SHA-256 of a window, rendered as lowercase hex.
//
// The 64-character hex string is the canonical form: signature entries
// store it and equality on strong hashes is equality on that string.

use sha2::{Digest, Sha256};

/// Length of the rendered digest in hex characters.
pub const STRONG_HEX_LEN: usize = 64;

/// SHA-256 of `data` as a 64-char lowercase hex string.
pub fn strong_checksum(data: &[u8]) -> String {
    let mut sha = Sha256::new();
    sha.update(data);
    hex::encode(sha.finalize())
}

/// SHA-256 of the concatenation `front ++ back`.
///
/// The window machine stores its bytes in a ring buffer; hashing the two
/// halves in logical order avoids materializing the window. Equal to
/// `strong_checksum` of the joined bytes.
pub fn strong_checksum_parts(front: &[u8], back: &[u8]) -> String {
    let mut sha = Sha256::new();
    sha.update(front);
    sha.update(back);
    hex::encode(sha.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_vector() {
        assert_eq!(
            strong_checksum(b"abcdefghijklmnop"),
            "f39dac6cbaba535e2c207cd0cd8f154974223c848f727f98b3564cea569b41cf"
        );
    }

    #[test]
    fn pinned_vector_rolled_window() {
        assert_eq!(
            strong_checksum(b"bcdefghijklmnopq"),
            "2c9d26566889bcb66e96d74b97b14bc36cfd8c2949ab289fff2caeb0422e91b0"
        );
    }

    #[test]
    fn rendered_form() {
        let hex = strong_checksum(b"");
        assert_eq!(hex.len(), STRONG_HEX_LEN);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn parts_equal_whole() {
        let data = b"abcdefghijklmnop";
        for split in 0..=data.len() {
            let (front, back) = data.split_at(split);
            assert_eq!(
                strong_checksum_parts(front, back),
                strong_checksum(data),
                "split at {split}"
            );
        }
    }
}
