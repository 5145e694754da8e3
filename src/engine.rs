// Driver: ties the hash, window, signature, delta, format, and io
// modules into the two public phases.
//
// Each phase fails fast with one specific error; generic open failures
// are specialized to the input's role here and nowhere else.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::delta::{Delta, DeltaError};
use crate::format::FormatError;
use crate::io::{self as fileio, InputError};
use crate::signature::Signature;
use crate::window::WindowError;

// ---------------------------------------------------------------------------
// Roles and phases
// ---------------------------------------------------------------------------

/// Which input file an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Original,
    Updated,
    Signature,
    Delta,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Original => "original",
            Self::Updated => "updated",
            Self::Signature => "signature",
            Self::Delta => "delta",
        };
        write!(f, "{name}")
    }
}

/// Which build phase aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Signature,
    Delta,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signature => write!(f, "signature"),
            Self::Delta => write!(f, "delta"),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// One error per invocation; no aggregation.
#[derive(Debug)]
pub enum EngineError {
    /// An input file does not exist.
    NotFound(Role),
    /// An input path names a directory.
    IsDirectory(Role),
    /// Filesystem failure outside the build itself.
    Io(io::Error),
    /// Artifact encode/decode failure.
    Format(FormatError),
    /// Signature or delta generation aborted (including a source
    /// shorter than one window).
    Build(Phase),
    /// The updated file is byte-identical to the original.
    NoChanges,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(role) => write!(f, "{role} file does not exist"),
            Self::IsDirectory(role) => write!(f, "{role} file is a directory"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Format(e) => write!(f, "{e}"),
            Self::Build(phase) => write!(f, "unable to generate {phase}"),
            Self::NoChanges => write!(f, "updated file contains no changes from original"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Format(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FormatError> for EngineError {
    fn from(e: FormatError) -> Self {
        Self::Format(e)
    }
}

/// Specialize a generic input failure to its role. The only site where
/// that translation happens.
fn specialize(err: InputError, role: Role) -> EngineError {
    match err {
        InputError::NotFound => EngineError::NotFound(role),
        InputError::IsDirectory => EngineError::IsDirectory(role),
        InputError::Io(e) => EngineError::Io(e),
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of a signature run.
#[derive(Debug)]
pub struct SignatureOutcome {
    pub signature: Signature,
    /// Distinct weak hashes indexed.
    pub entries: usize,
    /// Path of the artifact under `Outputs/`.
    pub output: PathBuf,
}

/// Result of a delta run.
#[derive(Debug)]
pub struct DeltaOutcome {
    pub delta: Delta,
    pub blocks: usize,
    pub matched: usize,
    pub modified: usize,
    /// Path of the artifact under `Outputs/`.
    pub output: PathBuf,
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// Signature phase: read the original file, build its signature, write
/// the artifact to `Outputs/<signature_name>`.
pub fn generate_signature(
    original: &Path,
    signature_name: &str,
) -> Result<SignatureOutcome, EngineError> {
    let reader = fileio::open_input(original).map_err(|e| specialize(e, Role::Original))?;

    let signature = Signature::build(reader).map_err(|err| match err {
        WindowError::Io(e) => {
            log::error!("signature build aborted: {e}");
            EngineError::Build(Phase::Signature)
        }
        WindowError::EndOfStream => {
            log::error!("original file is shorter than one window");
            EngineError::Build(Phase::Signature)
        }
    })?;

    let output = fileio::write_signature(&signature, signature_name)?;
    Ok(SignatureOutcome {
        entries: signature.len(),
        signature,
        output,
    })
}

/// Load a previously written signature artifact (delta-only mode).
pub fn load_signature(path: &Path) -> Result<Signature, EngineError> {
    let mut reader = fileio::open_input(path).map_err(|e| specialize(e, Role::Signature))?;
    let signature = fileio::read_signature(&mut reader)?;
    log::debug!("loaded signature with {} entries", signature.len());
    Ok(signature)
}

/// Delta phase: read the updated file, segment it against `signature`,
/// write the artifact to `Outputs/<delta_name>`.
pub fn generate_delta(
    updated: &Path,
    signature: &Signature,
    delta_name: &str,
) -> Result<DeltaOutcome, EngineError> {
    let reader = fileio::open_input(updated).map_err(|e| specialize(e, Role::Updated))?;

    let delta = Delta::build(reader, signature).map_err(|err| match err {
        DeltaError::NoChanges => EngineError::NoChanges,
        DeltaError::Window(WindowError::Io(e)) => {
            log::error!("delta build aborted: {e}");
            EngineError::Build(Phase::Delta)
        }
        DeltaError::Window(WindowError::EndOfStream) => {
            log::error!("updated file is shorter than one window");
            EngineError::Build(Phase::Delta)
        }
    })?;

    let output = fileio::write_delta(&delta, delta_name)?;
    Ok(DeltaOutcome {
        blocks: delta.len(),
        matched: delta.matched_blocks(),
        modified: delta.modified_blocks(),
        delta,
        output,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
