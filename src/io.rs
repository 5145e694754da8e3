// File-level I/O helpers for the signature and delta pipeline.
//
// Inputs are opened through `open_input`, which distinguishes a missing
// path from a directory from any other filesystem failure; the driver
// specializes those to the input's role. Outputs land under a
// process-local `Outputs/` directory created on demand.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::delta::Delta;
use crate::format::{self, FormatError};
use crate::signature::Signature;

/// Directory artifacts are written to, relative to the working directory.
pub const OUTPUT_DIR: &str = "Outputs";

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Role-agnostic failure to open an input file. The caller attaches the
/// role (original/updated/signature/delta) at exactly one site.
#[derive(Debug)]
pub enum InputError {
    /// The path does not exist.
    NotFound,
    /// The path names a directory, not a file.
    IsDirectory,
    /// Any other filesystem failure.
    Io(io::Error),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "file does not exist"),
            Self::IsDirectory => write!(f, "found a directory where a file was expected"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Open an input file for buffered reading.
pub fn open_input(path: &Path) -> Result<BufReader<File>, InputError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => return Err(InputError::IsDirectory),
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(InputError::NotFound),
        Err(e) => return Err(InputError::Io(e)),
    }
    let file = File::open(path).map_err(InputError::Io)?;
    Ok(BufReader::with_capacity(BUF_SIZE, file))
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Create `Outputs/` if it does not exist yet and return its path.
pub fn ensure_output_dir() -> io::Result<PathBuf> {
    let dir = PathBuf::from(OUTPUT_DIR);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Write a signature artifact to `Outputs/<file_name>`, returning the
/// full path written.
pub fn write_signature(signature: &Signature, file_name: &str) -> Result<PathBuf, FormatError> {
    let path = ensure_output_dir()?.join(file_name);
    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(&path)?);
    format::signature::encode(signature, &mut writer)?;
    writer.flush()?;
    log::info!("signature written to {}", path.display());
    Ok(path)
}

/// Read and decode a signature artifact.
pub fn read_signature<R: io::Read>(reader: &mut R) -> Result<Signature, FormatError> {
    format::signature::decode(reader)
}

/// Write a delta artifact to `Outputs/<file_name>`, returning the full
/// path written.
pub fn write_delta(delta: &Delta, file_name: &str) -> Result<PathBuf, FormatError> {
    let path = ensure_output_dir()?.join(file_name);
    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(&path)?);
    format::delta::encode(delta, &mut writer)?;
    writer.flush()?;
    log::info!("delta written to {}", path.display());
    Ok(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
