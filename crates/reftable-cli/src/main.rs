//! reftable command-line tool.
//!
//! Provides the `reftable` binary for converting between plain JSON documents
//! and reference tables:
//! - `encode`: plain JSON -> table
//! - `decode`: table -> plain JSON (acyclic tables only)
//! - `inspect`: validate a table and print entry statistics
//!
//! Input is read from a file, or from stdin when the path is `-` or omitted.
//! Output goes to stdout; diagnostics and logs go to stderr. Log verbosity is
//! taken from `RUST_LOG`.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use reftable_core::reduce::{from_json, to_json};
use reftable_core::text::{decode_from_text, encode_to_text};
use reftable_core::{CodecError, JsonCodec, ObjectGraph, TextCodec};

/// Reference table codec for JSON object graphs.
#[derive(Parser)]
#[command(name = "reftable", about = "Reference table codec for JSON object graphs")]
struct Cli {
    /// Emit indented JSON.
    #[arg(long, global = true, env = "REFTABLE_PRETTY")]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Encode a plain JSON document into a table.
    Encode {
        /// Input file, or `-` for stdin.
        #[arg(default_value = "-")]
        input: PathBuf,
    },
    /// Decode a table back into a plain JSON document.
    Decode {
        /// Input file, or `-` for stdin.
        #[arg(default_value = "-")]
        input: PathBuf,
    },
    /// Validate a table and print entry statistics.
    Inspect {
        /// Input file, or `-` for stdin.
        #[arg(default_value = "-")]
        input: PathBuf,
    },
}

type Runner = fn(&str, &JsonCodec) -> Result<String, CodecError>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let codec = JsonCodec { pretty: cli.pretty };

    let (input, run) = match &cli.command {
        Commands::Encode { input } => (input, run_encode as Runner),
        Commands::Decode { input } => (input, run_decode as Runner),
        Commands::Inspect { input } => (input, run_inspect as Runner),
    };

    let text = match read_input(input) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: failed to read '{}': {}", input.display(), e);
            process::exit(3);
        }
    };

    match run(&text, &codec) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(exit_code(&e));
        }
    }
}

/// Reads the whole input, treating `-` as stdin.
fn read_input(path: &Path) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        std::fs::read_to_string(path)
    }
}

/// Maps an error to the process exit code: 2 for graphs that cannot be
/// written as a plain tree, 1 for everything else.
fn exit_code(err: &CodecError) -> i32 {
    match err {
        CodecError::CycleDetected { .. } => 2,
        _ => 1,
    }
}

/// Execute the encode subcommand.
fn run_encode(text: &str, codec: &JsonCodec) -> Result<String, CodecError> {
    let document: serde_json::Value = serde_json::from_str(text)?;
    let mut graph = ObjectGraph::new();
    let root = from_json(&mut graph, &document);
    let output = encode_to_text(codec, &graph, &root)?;
    tracing::info!(containers = graph.len(), "encoded document");
    Ok(output)
}

/// Execute the decode subcommand.
fn run_decode(text: &str, codec: &JsonCodec) -> Result<String, CodecError> {
    let decoded = decode_from_text(codec, text)?;
    let document = to_json(&decoded.graph, &decoded.root)?;
    tracing::info!(containers = decoded.graph.len(), "decoded table");
    render(&document, codec.pretty)
}

/// Execute the inspect subcommand.
fn run_inspect(text: &str, codec: &JsonCodec) -> Result<String, CodecError> {
    let table = codec.decode(text)?;
    table.validate()?;
    render(&table.stats(), codec.pretty)
}

fn render<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, CodecError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn encode_plain_document() {
        let out = run_encode(r#"{"a":1,"b":"hello","c":true}"#, &JsonCodec::default()).unwrap();
        assert_eq!(out, r#"{"root":0,"obj":[{"a":1,"b":2,"c":3},1,"hello",true]}"#);
    }

    #[test]
    fn encode_rejects_invalid_json() {
        let err = run_encode("{", &JsonCodec::default()).unwrap_err();
        assert!(matches!(err, CodecError::Json(_)));
        assert_eq!(exit_code(&err), 1);
    }

    #[test]
    fn decode_acyclic_table() {
        let out = run_decode(r#"{"root":0,"obj":[{"a":1},{"b":2},{"c":3},1]}"#, &JsonCodec::default())
            .unwrap();
        assert_eq!(out, r#"{"a":{"b":{"c":1}}}"#);
    }

    #[test]
    fn decode_cyclic_table_fails_with_exit_code_two() {
        let err = run_decode(r#"{"root":0,"obj":[{"a":1,"b":0},1]}"#, &JsonCodec::default())
            .unwrap_err();
        assert!(matches!(err, CodecError::CycleDetected { .. }));
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn decode_deep_chain_fails_with_exit_code_one() {
        let depth = 200_000;
        let mut obj: Vec<String> = (1..=depth).map(|next| format!("[{}]", next)).collect();
        obj.push("0".to_string());
        let text = format!(r#"{{"root":0,"obj":[{}]}}"#, obj.join(","));

        let err = run_decode(&text, &JsonCodec::default()).unwrap_err();
        assert!(matches!(err, CodecError::DepthLimitExceeded { .. }));
        assert_eq!(exit_code(&err), 1);
    }

    #[test]
    fn inspect_reports_stats() {
        let out = run_inspect(r#"{"root":0,"obj":[{"a":1,"b":0},1]}"#, &JsonCodec::default())
            .unwrap();
        assert_eq!(
            out,
            r#"{"entries":2,"scalars":1,"sequences":0,"records":1,"references":2,"back_references":1}"#
        );
    }

    #[test]
    fn inspect_rejects_dangling_index() {
        let err = run_inspect(r#"{"root":0,"obj":[[3]]}"#, &JsonCodec::default()).unwrap_err();
        assert!(matches!(err, CodecError::IndexOutOfRange { index: 3, len: 1 }));
    }

    #[test]
    fn read_input_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1,2]").unwrap();
        assert_eq!(read_input(file.path()).unwrap(), "[1,2]");
    }
}
