// Delta builder: segments the updated file into matched and modified
// blocks against a signature of the original.
//
// One pass over the updated file. Every window position costs one index
// lookup; consecutive matches collapse into a single matched block by
// extending its tail, consecutive misses collapse into a single modified
// block by appending bytes. The only delicate step is the handover at a
// match boundary: the window is 16 bytes wide, so when a match appears
// the last 15 bytes already accumulated in the open modified block
// belong to the match and must be truncated off before the block is
// emitted.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::mem;

use crate::hash::{self, WINDOW_SIZE};
use crate::signature::Signature;
use crate::window::{ByteWindow, WindowError};

// ---------------------------------------------------------------------------
// Data model
// ---------------------------------------------------------------------------

/// One block of the delta.
///
/// Matched blocks carry the original-file byte range `[head, tail]` to
/// copy and an empty `value`. Modified blocks carry literal bytes in
/// `value`, with `head = 0` and `tail = value.len() - 1` indexing into
/// it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub head: u64,
    pub tail: u64,
    pub modified: bool,
    pub value: Vec<u8>,
}

impl Block {
    /// A matched block copying `[head, tail]` from the original.
    pub fn matched(head: u64, tail: u64) -> Self {
        Self {
            head,
            tail,
            modified: false,
            value: Vec::new(),
        }
    }

    /// A modified block carrying literal bytes. `value` must be
    /// non-empty.
    pub fn literal(value: Vec<u8>) -> Self {
        debug_assert!(!value.is_empty());
        Self {
            head: 0,
            tail: value.len() as u64 - 1,
            modified: true,
            value,
        }
    }

    /// Number of destination bytes this block produces.
    pub fn len(&self) -> u64 {
        if self.modified {
            self.value.len() as u64
        } else {
            self.tail - self.head + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An ordered collection of blocks keyed by the destination-file offset
/// at which each block begins. Visited in ascending key order the blocks
/// tile the updated file without gap or overlap. Modified blocks never
/// touch; a deletion in the updated file can leave two matched blocks
/// side by side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    blocks: BTreeMap<u64, Block>,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn insert(&mut self, offset: u64, block: Block) {
        self.blocks.insert(offset, block);
    }

    pub fn get(&self, offset: u64) -> Option<&Block> {
        self.blocks.get(&offset)
    }

    /// Blocks in ascending destination-offset order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &Block)> {
        self.blocks.iter().map(|(&k, v)| (k, v))
    }

    pub fn matched_blocks(&self) -> usize {
        self.blocks.values().filter(|b| !b.modified).count()
    }

    pub fn modified_blocks(&self) -> usize {
        self.blocks.values().filter(|b| b.modified).count()
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum DeltaError {
    /// The updated file is byte-identical to the original: the delta
    /// collapsed to a single matched block.
    NoChanges,
    /// The byte source failed (or was shorter than one window).
    Window(WindowError),
}

impl fmt::Display for DeltaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoChanges => write!(f, "updated file contains no changes from original"),
            Self::Window(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DeltaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NoChanges => None,
            Self::Window(e) => Some(e),
        }
    }
}

impl From<WindowError> for DeltaError {
    fn from(e: WindowError) -> Self {
        Self::Window(e)
    }
}

// ---------------------------------------------------------------------------
// Segmentation automaton
// ---------------------------------------------------------------------------

/// The block currently being accumulated.
enum OpenBlock {
    /// Original-file range; `tail` grows by one per consecutive match.
    Matched { head: u64, tail: u64 },
    /// Literal bytes; grows by one byte per consecutive miss.
    Modified { value: Vec<u8> },
}

impl Delta {
    /// Build the delta of `reader` against `signature` in one pass.
    ///
    /// Fails with `NoChanges` when the updated file is byte-identical to
    /// the original, and with `Window` when the source fails or is
    /// shorter than one window.
    pub fn build<R: Read>(reader: R, signature: &Signature) -> Result<Self, DeltaError> {
        let mut delta = Self::new();

        let mut window = ByteWindow::prime(reader)?;
        let mut weak = hash::weak_checksum(&window.to_array());
        log::debug!("initial window = {:?}", window.to_array());
        log::debug!("initial weak hash = {weak}");

        // Destination offset at which the open block begins.
        let mut block_head_dst = 0u64;
        // Destination offsets of the current window's first and last byte.
        let mut delta_head_dst = 0u64;
        let mut delta_tail_dst = WINDOW_SIZE as u64 - 1;

        // Whether modified bytes still belong to the unmatched prefix of
        // the updated file: those were appended one per advance (never a
        // whole window), so they are emitted without truncation.
        let mut initial_block_matches;
        let mut prev_matched;

        let mut open = match signature.find(weak, &window) {
            Some((head, tail)) => {
                log::debug!("initial window matched original [{head}, {tail}]");
                initial_block_matches = true;
                prev_matched = true;
                OpenBlock::Matched { head, tail }
            }
            None => {
                // Only the front byte: the rest of the window is consumed
                // by subsequent rolls.
                initial_block_matches = false;
                prev_matched = false;
                OpenBlock::Modified {
                    value: vec![window.front()],
                }
            }
        };

        loop {
            let roll = match window.advance() {
                Ok(roll) => roll,
                Err(WindowError::EndOfStream) => break,
                Err(err) => return Err(err.into()),
            };

            delta_head_dst += 1;
            delta_tail_dst += 1;
            weak = hash::roll(weak, roll.evicted, roll.appended);
            let hit = signature.find(weak, &window);
            log::trace!(
                "window at destination [{delta_head_dst}, {delta_tail_dst}]: \
                 weak hash {weak}, match {hit:?}"
            );

            match (prev_matched, hit) {
                // Still inside a matched run: extend the destination span.
                // Consecutive rolls re-match the window shifted by one, so
                // the original-file range stays contiguous; the hit's own
                // offsets are ignored.
                (true, Some(_)) => {
                    if let OpenBlock::Matched { tail, .. } = &mut open {
                        *tail += 1;
                    }
                }

                // Still inside a modified run: accumulate one byte. In the
                // initial unmatched prefix that is the byte scrolling past
                // the front of the window; after a matched block it is the
                // byte just rolled in, because the match already covered
                // the earlier ones.
                (false, None) => {
                    if let OpenBlock::Modified { value } = &mut open {
                        if initial_block_matches {
                            value.push(roll.appended);
                        } else {
                            value.push(window.front());
                        }
                    }
                }

                // Match ended: emit it and open a modified block seeded
                // with the byte that broke the match.
                (true, None) => {
                    if let OpenBlock::Matched { head, tail } = open {
                        log::debug!(
                            "matched block [{head}, {tail}] at destination {block_head_dst}"
                        );
                        delta.insert(block_head_dst, Block::matched(head, tail));
                        block_head_dst += tail - head + 1;
                    }
                    open = OpenBlock::Modified {
                        value: vec![roll.appended],
                    };
                }

                // Modified run ended on a fresh match. The last 15
                // accumulated bytes are the front of the matching window
                // and belong to the matched block, so the modified block
                // keeps only its first `len + 1 - WINDOW_SIZE` bytes,
                // unless it is the initial prefix, whose bytes were never
                // window-sized to begin with.
                (false, Some((head, tail))) => {
                    if let OpenBlock::Modified { value } = &mut open {
                        if initial_block_matches {
                            let keep = (value.len() + 1).saturating_sub(WINDOW_SIZE);
                            value.truncate(keep);
                        } else {
                            initial_block_matches = true;
                        }
                        // A truncation can consume the whole block (the
                        // mismatch run was shorter than one window); the
                        // matched block then starts at the same
                        // destination offset and nothing is emitted.
                        if !value.is_empty() {
                            log::debug!(
                                "modified block of {} bytes at destination {block_head_dst}",
                                value.len()
                            );
                            delta.insert(block_head_dst, Block::literal(mem::take(value)));
                        }
                    }
                    log::debug!("match resumed at original [{head}, {tail}]");
                    block_head_dst = delta_head_dst;
                    open = OpenBlock::Matched { head, tail };
                }
            }

            prev_matched = hit.is_some();
        }

        // End of stream: the open block is emitted whether matched or
        // modified.
        match open {
            OpenBlock::Matched { head, tail } => {
                log::debug!("final matched block [{head}, {tail}] at destination {block_head_dst}");
                delta.insert(block_head_dst, Block::matched(head, tail));
            }
            OpenBlock::Modified { mut value } => {
                if !initial_block_matches {
                    // No window ever matched, so bytes were only appended
                    // one per advance and the last 15 bytes of the final
                    // window are still outstanding. Flush them so the
                    // delta covers the whole updated file.
                    let (front, back) = window.as_slices();
                    value.extend_from_slice(&front[1..]);
                    value.extend_from_slice(back);
                }
                log::debug!(
                    "final modified block of {} bytes at destination {block_head_dst}",
                    value.len()
                );
                delta.insert(block_head_dst, Block::literal(value));
            }
        }

        if delta.len() == 1 && delta.blocks.values().all(|b| !b.modified) {
            return Err(DeltaError::NoChanges);
        }

        Ok(delta)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    fn signature_of(data: &[u8]) -> Signature {
        Signature::build(Cursor::new(data.to_vec())).unwrap()
    }

    fn delta_of(updated: &[u8], signature: &Signature) -> Delta {
        Delta::build(Cursor::new(updated.to_vec()), signature).unwrap()
    }

    #[test]
    fn prefix_insertion() {
        let signature = signature_of(b"abcdefghijklmnop");
        let delta = delta_of(b"123abcdefghijklmnop", &signature);

        assert_eq!(delta.len(), 2);
        assert_eq!(delta.get(0), Some(&Block::literal(b"123".to_vec())));
        assert_eq!(delta.get(3), Some(&Block::matched(0, 15)));
    }

    #[test]
    fn suffix_insertion() {
        let signature = signature_of(b"abcdefghijklmnop");
        let delta = delta_of(b"abcdefghijklmnopqrs", &signature);

        assert_eq!(delta.len(), 2);
        assert_eq!(delta.get(0), Some(&Block::matched(0, 15)));
        assert_eq!(delta.get(16), Some(&Block::literal(b"qrs".to_vec())));
    }

    #[test]
    fn fully_rewritten_file_is_one_literal() {
        let signature = signature_of(b"abcdefghijklmnop");
        let updated = b"0123456789ABCDEFGHIJ";
        let delta = delta_of(updated, &signature);

        assert_eq!(delta.len(), 1);
        assert_eq!(delta.get(0), Some(&Block::literal(updated.to_vec())));
    }

    #[test]
    fn fully_rewritten_single_window_file() {
        let signature = signature_of(b"abcdefghijklmnop");
        let delta = delta_of(b"ABCDEFGHIJKLMNOP", &signature);

        assert_eq!(delta.len(), 1);
        assert_eq!(delta.get(0), Some(&Block::literal(b"ABCDEFGHIJKLMNOP".to_vec())));
    }

    #[test]
    fn identical_file_is_no_changes() {
        let signature = signature_of(b"abcdefghijklmnopq");
        let err = Delta::build(Cursor::new(b"abcdefghijklmnopq".to_vec()), &signature).unwrap_err();
        assert!(matches!(err, DeltaError::NoChanges));
    }

    #[test]
    fn matched_run_extends_to_one_block() {
        // Identical content plus a suffix: the whole shared region
        // collapses into one matched block spanning it.
        let original = b"abcdefghijklmnopqrstuvwxy";
        let signature = signature_of(original);
        let mut updated = original.to_vec();
        updated.extend_from_slice(b"0123");
        let delta = delta_of(&updated, &signature);

        assert_eq!(delta.len(), 2);
        assert_eq!(delta.get(0), Some(&Block::matched(0, 24)));
        assert_eq!(delta.get(25), Some(&Block::literal(b"0123".to_vec())));
    }

    #[test]
    fn updated_shorter_than_window_fails() {
        let signature = signature_of(b"abcdefghijklmnop");
        let err = Delta::build(Cursor::new(b"short".to_vec()), &signature).unwrap_err();
        assert!(matches!(err, DeltaError::Window(WindowError::EndOfStream)));
    }

    #[test]
    fn read_failure_aborts() {
        struct Flaky {
            remaining: usize,
        }
        impl io::Read for Flaky {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.remaining == 0 {
                    return Err(io::Error::other("disk on fire"));
                }
                let n = buf.len().min(self.remaining);
                buf[..n].fill(b'x');
                self.remaining -= n;
                Ok(n)
            }
        }

        let signature = signature_of(b"abcdefghijklmnop");
        let err = Delta::build(Flaky { remaining: 20 }, &signature).unwrap_err();
        assert!(matches!(err, DeltaError::Window(WindowError::Io(_))));
    }

    #[test]
    fn blocks_alternate_and_tile() {
        let original = b"The quick brown fox jumps over the lazy dog once more";
        let signature = signature_of(original);
        let updated = b"NEW The quick brown fox jumps over the lazy dog once STOP";
        let delta = delta_of(updated, &signature);

        let mut expected_offset = 0u64;
        let mut prev_modified: Option<bool> = None;
        for (offset, block) in delta.iter() {
            assert_eq!(offset, expected_offset, "blocks must tile without gaps");
            assert_ne!(Some(block.modified), prev_modified, "blocks must alternate");
            expected_offset += block.len();
            prev_modified = Some(block.modified);
        }
        assert_eq!(expected_offset, updated.len() as u64);
    }

    #[test]
    fn block_len_matches_kind() {
        assert_eq!(Block::matched(4, 19).len(), 16);
        assert_eq!(Block::literal(b"abc".to_vec()).len(), 3);
        assert_eq!(Block::literal(b"abc".to_vec()).tail, 2);
    }
}
