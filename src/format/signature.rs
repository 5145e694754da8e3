// Signature artifact encoding.
//
// Layout:
//
//   magic "RSG\0" | version | varint entry count |
//   entries: varint weak | varint head | varint tail | 32 digest bytes
//
// Entries are written in ascending head order (the builder inserts them
// that way); decode order does not matter because the signature is a
// mapping. The strong hash travels as raw digest bytes and is rendered
// back to its canonical lowercase-hex form on decode.

use std::io::{Read, Write};

use super::{FormatError, read_preamble, varint, write_preamble};
use crate::hash::WINDOW_SIZE;
use crate::signature::{Signature, StrongEntry};

/// Artifact magic for signature files.
pub const SIGNATURE_MAGIC: [u8; 4] = *b"RSG\0";

/// Serialize `signature` to `writer`.
pub fn encode<W: Write>(signature: &Signature, writer: &mut W) -> Result<(), FormatError> {
    write_preamble(writer, &SIGNATURE_MAGIC)?;
    varint::write_usize(writer, signature.len())?;

    for (weak, entry) in signature.iter_by_head() {
        varint::write_u64(writer, weak as u64)?;
        varint::write_u64(writer, entry.head)?;
        varint::write_u64(writer, entry.tail)?;
        writer.write_all(&hex_to_digest(&entry.strong)?)?;
    }
    Ok(())
}

/// Deserialize a signature from `reader`.
pub fn decode<R: Read>(reader: &mut R) -> Result<Signature, FormatError> {
    read_preamble(reader, &SIGNATURE_MAGIC)?;
    let count = varint::read_usize(reader)?;

    let mut signature = Signature::new();
    for _ in 0..count {
        let weak = varint::read_u64(reader)? as i64;
        let head = varint::read_u64(reader)?;
        let tail = varint::read_u64(reader)?;
        if tail < head || tail - head != WINDOW_SIZE as u64 - 1 {
            return Err(FormatError::Corrupt("entry does not span one window"));
        }

        let mut digest = [0u8; 32];
        reader.read_exact(&mut digest)?;
        signature.insert(
            weak,
            StrongEntry {
                strong: hex::encode(digest),
                head,
                tail,
            },
        );
    }
    Ok(signature)
}

fn hex_to_digest(strong: &str) -> Result<[u8; 32], FormatError> {
    let bytes = hex::decode(strong)
        .map_err(|_| FormatError::Corrupt("strong hash is not hex"))?;
    bytes
        .try_into()
        .map_err(|_| FormatError::Corrupt("strong hash is not 32 bytes"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
