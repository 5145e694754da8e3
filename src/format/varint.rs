// Variable-length integer encoding for the artifact containers.
//
// LEB128: base-128, least-significant group first. Each byte carries 7
// value bits; bit 7 is set on every byte except the last. A u64 encodes
// in 1..=10 bytes.

use std::io::{self, Read, Write};

/// Maximum encoded length for a 64-bit value (ceil(64/7) = 10).
pub const MAX_VARINT_LEN: usize = 10;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode `num` into `buf`, returning the number of bytes written.
#[inline]
pub fn encode_u64(mut num: u64, buf: &mut [u8; MAX_VARINT_LEN]) -> usize {
    let mut i = 0;
    loop {
        let group = (num & 0x7F) as u8;
        num >>= 7;
        if num == 0 {
            buf[i] = group;
            return i + 1;
        }
        buf[i] = group | 0x80;
        i += 1;
    }
}

/// Encode `num` and write it to a sink.
pub fn write_u64<W: Write>(w: &mut W, num: u64) -> io::Result<()> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let len = encode_u64(num, &mut buf);
    w.write_all(&buf[..len])
}

/// Encode a `usize` and write it to a sink.
pub fn write_usize<W: Write>(w: &mut W, num: usize) -> io::Result<()> {
    write_u64(w, num as u64)
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Read a varint-encoded u64 from a reader.
///
/// Rejects encodings longer than 10 bytes and final groups that would
/// shift value bits past 64.
pub fn read_u64<R: Read>(r: &mut R) -> io::Result<u64> {
    let mut value = 0u64;
    let mut shift = 0u32;
    loop {
        let mut byte = [0u8; 1];
        r.read_exact(&mut byte)?;
        let group = (byte[0] & 0x7F) as u64;
        if shift == 63 && group > 1 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "varint overflows u64",
            ));
        }
        value |= group << shift;
        if byte[0] & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
        if shift >= 64 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "varint longer than 10 bytes",
            ));
        }
    }
}

/// Read a varint and narrow it to `usize`.
pub fn read_usize<R: Read>(r: &mut R) -> io::Result<usize> {
    let value = read_u64(r)?;
    usize::try_from(value)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "varint exceeds usize"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
