//! Rollsync: rolling-hash file signatures and deltas in the spirit of rdiff.
//!
//! The crate provides:
//! - Weak/strong checksum primitives over 16-byte windows (`hash`)
//! - A windowed byte stream over any reader (`window`)
//! - Signature generation and lookup (`signature`)
//! - Delta segmentation against a signature (`delta`)
//! - Artifact containers and file helpers (`format`, `io`)
//! - A driver and an optional CLI (`engine`, `cli` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! use std::io::Cursor;
//! use rollsync::signature::Signature;
//! use rollsync::delta::Delta;
//!
//! let original = b"the quick brown fox jumps over the lazy dog";
//! let updated = b"the quick brown cat jumps over the lazy dog";
//!
//! let signature = Signature::build(Cursor::new(&original[..])).unwrap();
//! let delta = Delta::build(Cursor::new(&updated[..]), &signature).unwrap();
//! assert!(delta.modified_blocks() > 0);
//! ```

pub mod delta;
pub mod engine;
pub mod format;
pub mod hash;
pub mod io;
pub mod signature;
pub mod window;

#[cfg(feature = "cli")]
pub mod cli;
