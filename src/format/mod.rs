// On-disk containers for the signature and delta artifacts.
//
// The reference implementation wrote both artifacts through Go's
// self-describing gob encoder; here each gets a small explicit
// container. The only contract is the round trip: decode(encode(x))
// equals x on every key and value.
//
// # Modules
//
// - `varint`    — LEB128 variable-length integers
// - `signature` — signature artifact encode/decode
// - `delta`     — delta artifact encode/decode

pub mod delta;
pub mod signature;
pub mod varint;

use std::fmt;
use std::io;

/// Container format version shared by both artifacts.
pub const FORMAT_VERSION: u8 = 1;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Decode/encode failure for either artifact.
#[derive(Debug)]
pub enum FormatError {
    /// The input does not start with the artifact's magic bytes.
    BadMagic,
    /// The container version is newer than this build understands.
    UnsupportedVersion(u8),
    /// Structurally invalid content.
    Corrupt(&'static str),
    /// Underlying read/write failure (including truncation).
    Io(io::Error),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadMagic => write!(f, "not a rollsync artifact (bad magic)"),
            Self::UnsupportedVersion(v) => write!(f, "unsupported container version {v}"),
            Self::Corrupt(what) => write!(f, "corrupt artifact: {what}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for FormatError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Read and check a 4-byte magic plus version byte.
pub(crate) fn read_preamble<R: io::Read>(r: &mut R, magic: &[u8; 4]) -> Result<(), FormatError> {
    let mut found = [0u8; 4];
    r.read_exact(&mut found)?;
    if &found != magic {
        return Err(FormatError::BadMagic);
    }
    let mut version = [0u8; 1];
    r.read_exact(&mut version)?;
    if version[0] != FORMAT_VERSION {
        return Err(FormatError::UnsupportedVersion(version[0]));
    }
    Ok(())
}

/// Write a 4-byte magic plus version byte.
pub(crate) fn write_preamble<W: io::Write>(w: &mut W, magic: &[u8; 4]) -> Result<(), FormatError> {
    w.write_all(magic)?;
    w.write_all(&[FORMAT_VERSION])?;
    Ok(())
}
