// Checksum primitives for signature and delta generation.
//
// This module provides:
// - Weak polynomial rolling hash over fixed 16-byte windows (`rolling`)
// - Strong SHA-256 hash rendered as lowercase hex (`strong`)

pub mod rolling;
pub mod strong;

pub use rolling::{MODULUS, SEED, WINDOW_SIZE, roll, weak_checksum};
pub use strong::{strong_checksum, strong_checksum_parts};
