//! Command-line tools for inspecting reflection record files.
#![allow(clippy::uninlined_format_args)]

use clap::{Parser, Subcommand};
use rustrefl_codec::{decode, encode, MappedReflectionReader};
use rustrefl_core::Reflection;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Codec error: {0}")]
    Codec(#[from] rustrefl_codec::Error),

    #[error("No record at index {index} (file has {count})")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("Verification failed for {0} record(s)")]
    VerificationFailed(usize),
}

/// Reflection record file inspector.
#[derive(Parser)]
#[command(name = "rustrefl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a summary of every record in a file
    Info {
        /// Input reflection file
        input: PathBuf,
    },

    /// Print one record in full
    Dump {
        /// Input reflection file
        input: PathBuf,

        /// Zero-based record index
        #[arg(short, long, default_value = "0")]
        index: usize,
    },

    /// Decode and re-encode every record, comparing the bytes
    Verify {
        /// Input reflection file
        input: PathBuf,
    },
}

fn summary_line(index: usize, reflection: &Reflection) -> String {
    let [h, k, l] = reflection.miller_index;
    format!(
        "{:6}  hkl=({:4},{:4},{:4})  frame={:5}  panel={:3}  I={:12.3}  shoebox={:?}",
        index,
        h,
        k,
        l,
        reflection.frame_number,
        reflection.panel_number,
        reflection.intensity,
        reflection.shoebox.shape()
    )
}

fn cmd_info(input: &Path) -> Result<()> {
    let reader = MappedReflectionReader::open(input)?;
    let records = reader.read_all()?;
    println!("{}: {} record(s)", input.display(), records.len());
    for (index, reflection) in records.iter().enumerate() {
        println!("{}", summary_line(index, reflection));
    }
    Ok(())
}

fn cmd_dump(input: &Path, index: usize) -> Result<()> {
    let reader = MappedReflectionReader::open(input)?;
    let mut count = 0;
    for (i, record) in reader.records().enumerate() {
        let bytes = record?;
        if i == index {
            let reflection = decode(bytes)?;
            println!("{reflection:#?}");
            return Ok(());
        }
        count = i + 1;
    }
    Err(CliError::IndexOutOfRange { index, count })
}

fn cmd_verify(input: &Path) -> Result<()> {
    let reader = MappedReflectionReader::open(input)?;
    let mut total = 0;
    let mut mismatches = 0;
    for record in reader.records() {
        let bytes = record?;
        let reflection = decode(bytes)?;
        if encode(&reflection) != bytes {
            println!("record {total}: re-encoded bytes differ");
            mismatches += 1;
        }
        total += 1;
    }
    if mismatches > 0 {
        return Err(CliError::VerificationFailed(mismatches));
    }
    println!("{}: {} record(s) verified", input.display(), total);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Info { input } => cmd_info(&input),
        Commands::Dump { input, index } => cmd_dump(&input, index),
        Commands::Verify { input } => cmd_verify(&input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustrefl_codec::ReflectionFileWriter;
    use tempfile::NamedTempFile;

    fn write_sample_file(records: usize) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        let mut writer = ReflectionFileWriter::create(file.path()).unwrap();
        for i in 0..records {
            let reflection = Reflection {
                miller_index: [i as i32, 0, 0],
                ..Reflection::new()
            };
            writer.write_reflection(&reflection).unwrap();
        }
        writer.flush().unwrap();
        file
    }

    #[test]
    fn test_info_and_verify() {
        let file = write_sample_file(3);
        cmd_info(file.path()).unwrap();
        cmd_verify(file.path()).unwrap();
    }

    #[test]
    fn test_dump_index_out_of_range() {
        let file = write_sample_file(2);
        let err = cmd_dump(file.path(), 5).unwrap_err();
        assert!(matches!(err, CliError::IndexOutOfRange { index: 5, .. }));
    }

    #[test]
    fn test_summary_line_mentions_hkl() {
        let reflection = Reflection {
            miller_index: [1, 2, 3],
            ..Reflection::new()
        };
        let line = summary_line(0, &reflection);
        assert!(line.contains("(   1,   2,   3)"));
    }
}
