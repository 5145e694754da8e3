// Command-line interface for rollsync.
//
// Two modes, separately or combined: signature generation (index the
// original file) and delta generation (segment the updated file against
// that index). Flag validation mirrors the mode matrix exactly; every
// failure is one line on stderr and a non-zero exit.

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use crate::engine::{self, EngineError};
use crate::signature::Signature;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Rolling-hash file differ: signatures and deltas in the spirit of rdiff.
#[derive(Parser, Debug)]
#[command(name = "rollsync", version, about = "Rolling-hash signature/delta generator")]
struct Cli {
    /// Enable signature generation.
    #[arg(long = "signatureMode")]
    signature_mode: bool,

    /// Enable delta generation.
    #[arg(long = "deltaMode")]
    delta_mode: bool,

    /// Original file to index.
    #[arg(long)]
    original: Option<PathBuf>,

    /// Signature file: output name in signature mode, input path in
    /// delta-only mode.
    #[arg(long)]
    signature: Option<String>,

    /// Updated file to diff against the signature.
    #[arg(long)]
    updated: Option<PathBuf>,

    /// Delta output file name.
    #[arg(long)]
    delta: Option<String>,

    /// Enable extended logging.
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Output run statistics as JSON to stderr.
    #[arg(long = "json")]
    json_output: bool,
}

// ---------------------------------------------------------------------------
// Mode resolution
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
enum Mode {
    SignatureOnly {
        original: PathBuf,
        signature: String,
    },
    DeltaOnly {
        signature: PathBuf,
        updated: PathBuf,
        delta: String,
    },
    Combined {
        original: PathBuf,
        signature: String,
        updated: PathBuf,
        delta: String,
    },
}

/// Check the mode/flag matrix and resolve which pipeline to run.
///
/// - at least one of the two modes must be set;
/// - signature mode requires `--original` and `--signature`;
/// - delta mode alone requires `--signature`, `--updated` and `--delta`;
/// - combined mode requires all four files.
fn resolve_mode(cli: &Cli) -> Result<Mode, String> {
    if !cli.signature_mode && !cli.delta_mode {
        return Err("must set at least one mode (--signatureMode / --deltaMode)".into());
    }

    if cli.signature_mode && (cli.original.is_none() || cli.signature.is_none()) {
        return Err(
            "must provide original and signature files when enabling signature mode".into(),
        );
    }

    if cli.delta_mode {
        if cli.signature_mode {
            if cli.updated.is_none() || cli.delta.is_none() {
                return Err(
                    "must provide updated and delta files when enabling signature and delta modes"
                        .into(),
                );
            }
        } else if cli.signature.is_none() || cli.updated.is_none() || cli.delta.is_none() {
            return Err(
                "must provide signature, updated and delta files when enabling delta mode".into(),
            );
        }
    }

    let mode = match (cli.signature_mode, cli.delta_mode) {
        (true, false) => Mode::SignatureOnly {
            original: cli.original.clone().unwrap(),
            signature: cli.signature.clone().unwrap(),
        },
        (false, true) => Mode::DeltaOnly {
            signature: PathBuf::from(cli.signature.clone().unwrap()),
            updated: cli.updated.clone().unwrap(),
            delta: cli.delta.clone().unwrap(),
        },
        (true, true) => Mode::Combined {
            original: cli.original.clone().unwrap(),
            signature: cli.signature.clone().unwrap(),
            updated: cli.updated.clone().unwrap(),
            delta: cli.delta.clone().unwrap(),
        },
        (false, false) => unreachable!("mode checked above"),
    };
    Ok(mode)
}

// ---------------------------------------------------------------------------
// Pipelines
// ---------------------------------------------------------------------------

fn run_signature(
    original: &Path,
    signature_name: &str,
    opts: &Cli,
) -> Result<Signature, EngineError> {
    let outcome = engine::generate_signature(original, signature_name)?;

    if opts.verbose {
        eprintln!(
            "rollsync: signature: {} windows indexed, written to {}",
            outcome.entries,
            outcome.output.display()
        );
    }
    if opts.json_output {
        let json = serde_json::json!({
            "command": "signature",
            "entries": outcome.entries,
            "output": outcome.output,
        });
        eprintln!("{}", serde_json::to_string_pretty(&json).unwrap());
    }

    Ok(outcome.signature)
}

fn run_delta(
    updated: &Path,
    signature: &Signature,
    delta_name: &str,
    opts: &Cli,
) -> Result<(), EngineError> {
    let outcome = engine::generate_delta(updated, signature, delta_name)?;

    if opts.verbose {
        eprintln!(
            "rollsync: delta: {} blocks ({} matched, {} modified), written to {}",
            outcome.blocks,
            outcome.matched,
            outcome.modified,
            outcome.output.display()
        );
    }
    if opts.json_output {
        let json = serde_json::json!({
            "command": "delta",
            "blocks": outcome.blocks,
            "matched": outcome.matched,
            "modified": outcome.modified,
            "output": outcome.output,
        });
        eprintln!("{}", serde_json::to_string_pretty(&json).unwrap());
    }

    Ok(())
}

fn dispatch(mode: Mode, opts: &Cli) -> Result<(), EngineError> {
    match mode {
        Mode::SignatureOnly {
            original,
            signature,
        } => {
            run_signature(&original, &signature, opts)?;
            Ok(())
        }
        Mode::DeltaOnly {
            signature,
            updated,
            delta,
        } => {
            let signature = engine::load_signature(&signature)?;
            run_delta(&updated, &signature, &delta, opts)
        }
        Mode::Combined {
            original,
            signature,
            updated,
            delta,
        } => {
            // The in-memory signature is reused; the artifact is still
            // written so the receiver side can be handed both files.
            let signature = run_signature(&original, &signature, opts)?;
            run_delta(&updated, &signature, &delta, opts)
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point: parse arguments, validate the mode matrix,
/// run the selected pipelines.
pub fn run() -> ! {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let mode = match resolve_mode(&cli) {
        Ok(mode) => mode,
        Err(message) => {
            eprintln!("rollsync: {message}");
            process::exit(2);
        }
    };

    match dispatch(mode, &cli) {
        Ok(()) => process::exit(0),
        Err(err) => {
            eprintln!("rollsync: {err}");
            process::exit(1);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
