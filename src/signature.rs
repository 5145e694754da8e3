// Signature: an index of a file's windows keyed by weak hash.
//
// Built in one pass over the original file. Every window position gets
// an entry carrying the strong hash and the window's byte offsets; on a
// weak-hash collision the later window replaces the earlier one (last
// wins; the strong hash guards the delta pass against false positives,
// and repeated identical windows are indistinguishable anyway).

use std::collections::HashMap;
use std::io::Read;

use crate::hash::{self, WINDOW_SIZE};
use crate::window::{ByteWindow, WindowError};

// ---------------------------------------------------------------------------
// Data model
// ---------------------------------------------------------------------------

/// Strong-hash record for one window of the original file.
///
/// `head` is the offset of the window's first byte, `tail` the offset of
/// its last: `tail - head + 1 == WINDOW_SIZE` always.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrongEntry {
    /// SHA-256 of the window, 64-char lowercase hex.
    pub strong: String,
    pub head: u64,
    pub tail: u64,
}

/// Index of an original file's windows by weak hash.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    entries: HashMap<i64, StrongEntry>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct weak hashes in the index. At most
    /// `L - WINDOW_SIZE + 1` for a source of length `L`, with equality
    /// iff no two windows collided.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert an entry, replacing any previous window with the same weak
    /// hash.
    pub fn insert(&mut self, weak: i64, entry: StrongEntry) {
        self.entries.insert(weak, entry);
    }

    pub fn get(&self, weak: i64) -> Option<&StrongEntry> {
        self.entries.get(&weak)
    }

    /// Iterate entries in ascending head order (the order the builder
    /// inserted them in).
    pub fn iter_by_head(&self) -> impl Iterator<Item = (i64, &StrongEntry)> {
        let mut pairs: Vec<_> = self.entries.iter().map(|(&w, e)| (w, e)).collect();
        pairs.sort_by_key(|(_, e)| e.head);
        pairs.into_iter()
    }

    /// Look up the current window in the index.
    ///
    /// Misses on an absent weak key without touching the window bytes;
    /// on a weak hit the strong hash is computed lazily and compared.
    /// Returns the matched window's original-file `(head, tail)`.
    pub fn find<R: Read>(&self, weak: i64, window: &ByteWindow<R>) -> Option<(u64, u64)> {
        let entry = self.entries.get(&weak)?;
        let (front, back) = window.as_slices();
        if hash::strong_checksum_parts(front, back) == entry.strong {
            Some((entry.head, entry.tail))
        } else {
            None
        }
    }

    /// Build the signature of `reader` in one pass.
    ///
    /// Visits every window position in increasing offset order: prime,
    /// hash, insert, then roll one byte at a time until end of stream.
    /// A source shorter than one window fails with `EndOfStream`; an
    /// empty signature is not a valid result.
    pub fn build<R: Read>(reader: R) -> Result<Self, WindowError> {
        let mut signature = Self::new();

        let mut window = ByteWindow::prime(reader)?;
        let mut weak = hash::weak_checksum(&window.to_array());
        let mut head = 0u64;
        let mut tail = WINDOW_SIZE as u64 - 1;

        log::debug!("initial window = {:?}", window.to_array());
        log::debug!("initial weak hash = {weak}");

        let (front, back) = window.as_slices();
        let strong = hash::strong_checksum_parts(front, back);
        log::debug!("strong hash = {strong}");
        signature.insert(weak, StrongEntry { strong, head, tail });

        loop {
            let roll = match window.advance() {
                Ok(roll) => roll,
                Err(WindowError::EndOfStream) => break,
                Err(err) => return Err(err),
            };

            head += 1;
            tail += 1;
            weak = hash::roll(weak, roll.evicted, roll.appended);
            log::trace!("rolled window = {:?}", window.to_array());
            log::debug!("rolled weak hash = {weak}");

            let (front, back) = window.as_slices();
            let strong = hash::strong_checksum_parts(front, back);
            log::debug!("strong hash = {strong}");
            signature.insert(weak, StrongEntry { strong, head, tail });
        }

        Ok(signature)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const ALPHA_WEAK: i64 = 76_935_130_210;
    const ALPHA_STRONG: &str = "f39dac6cbaba535e2c207cd0cd8f154974223c848f727f98b3564cea569b41cf";

    fn entry(strong: &str, head: u64, tail: u64) -> StrongEntry {
        StrongEntry {
            strong: strong.to_string(),
            head,
            tail,
        }
    }

    #[test]
    fn build_single_window() {
        let sig = Signature::build(Cursor::new(b"abcdefghijklmnop".to_vec())).unwrap();
        assert_eq!(sig.len(), 1);
        assert_eq!(sig.get(ALPHA_WEAK), Some(&entry(ALPHA_STRONG, 0, 15)));
    }

    #[test]
    fn build_two_windows() {
        let sig = Signature::build(Cursor::new(b"abcdefghijklmnopq".to_vec())).unwrap();
        assert_eq!(sig.len(), 2);
        assert_eq!(sig.get(ALPHA_WEAK), Some(&entry(ALPHA_STRONG, 0, 15)));
        assert_eq!(
            sig.get(49_921_073_876),
            Some(&entry(
                "2c9d26566889bcb66e96d74b97b14bc36cfd8c2949ab289fff2caeb0422e91b0",
                1,
                16
            ))
        );
    }

    #[test]
    fn every_entry_spans_one_window() {
        let data: Vec<u8> = (0u8..=255).cycle().take(300).collect();
        let sig = Signature::build(Cursor::new(data)).unwrap();
        for (_, e) in sig.iter_by_head() {
            assert_eq!(e.tail - e.head + 1, WINDOW_SIZE as u64);
        }
    }

    #[test]
    fn size_bounded_by_window_count() {
        let data: Vec<u8> = (0u8..200).collect();
        let len = data.len();
        let sig = Signature::build(Cursor::new(data)).unwrap();
        assert!(sig.len() <= len - WINDOW_SIZE + 1);
    }

    #[test]
    fn collision_keeps_latest_window() {
        // Every window of a constant run is identical, so they all share
        // one weak hash and the final window's offsets survive.
        let data = vec![b'a'; 40];
        let sig = Signature::build(Cursor::new(data)).unwrap();
        assert_eq!(sig.len(), 1);
        let (_, e) = sig.iter_by_head().next().unwrap();
        assert_eq!((e.head, e.tail), (24, 39));
    }

    #[test]
    fn source_shorter_than_window_fails() {
        let err = Signature::build(Cursor::new(b"abc".to_vec())).unwrap_err();
        assert!(matches!(err, WindowError::EndOfStream));
    }

    #[test]
    fn find_hits_on_both_hashes() {
        let sig = Signature::build(Cursor::new(b"abcdefghijklmnop".to_vec())).unwrap();
        let window = ByteWindow::prime(Cursor::new(b"abcdefghijklmnop".to_vec())).unwrap();
        assert_eq!(sig.find(ALPHA_WEAK, &window), Some((0, 15)));
    }

    #[test]
    fn find_misses_on_absent_weak_hash() {
        let sig = Signature::build(Cursor::new(b"abcdefghijklmnop".to_vec())).unwrap();
        let window = ByteWindow::prime(Cursor::new(b"abcdefghijklmnop".to_vec())).unwrap();
        assert_eq!(sig.find(123, &window), None);
    }

    #[test]
    fn find_misses_on_strong_mismatch() {
        // Same weak key, different window bytes: the strong check rejects.
        let mut sig = Signature::new();
        sig.insert(ALPHA_WEAK, entry(ALPHA_STRONG, 0, 15));
        let window = ByteWindow::prime(Cursor::new(b"bcdefghijklmnop1".to_vec())).unwrap();
        assert_eq!(sig.find(ALPHA_WEAK, &window), None);
    }

    #[test]
    fn iter_by_head_is_monotone() {
        let data = b"the quick brown fox jumps over the lazy dog".to_vec();
        let sig = Signature::build(Cursor::new(data)).unwrap();
        let heads: Vec<u64> = sig.iter_by_head().map(|(_, e)| e.head).collect();
        assert!(heads.windows(2).all(|w| w[0] < w[1]));
    }
}
