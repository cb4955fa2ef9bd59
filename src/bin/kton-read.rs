//! CLI tool to decode the `T10` transaction records of a KTON file.
//!
//! Usage:
//!   kton-read <input.kton>
//!   kton-read <input.kton> -o <output.csv> --header
//!   kton-read <input.kton> --format table
//!
//! If no output file is specified, writes to stdout.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use arrow_array::RecordBatch;
use arrow_cast::pretty::pretty_format_batches;
use arrow_csv::WriterBuilder;
use clap::{ArgAction, Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use kton_rs::{DEFAULT_BATCH_SIZE, ReadKton, ScanConfig, read_kton, schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Comma-separated values
    Csv,
    /// Aligned text table
    Table,
}

/// Decode KTON basic transaction records (T10) into CSV or a table.
#[derive(Parser)]
#[command(name = "kton-read")]
struct Cli {
    /// KTON input file (or /dev/stdin)
    input: Option<PathBuf>,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum rows per decoded batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,

    /// Emit a header line with column names (csv only)
    #[arg(long)]
    header: bool,

    /// Print the column names and types, then exit
    #[arg(long)]
    schema: bool,

    /// Show progress on stderr (-v for counts, -vv for per-line detail)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

fn open_output(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)?;
            }
            Ok(Box::new(BufWriter::new(File::create(path)?)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

fn run(cli: &Cli) -> Result<(u64, u64), Box<dyn std::error::Error>> {
    let config = ScanConfig::with_batch_size(cli.batch_size)?;
    let input = cli.input.as_deref().ok_or("missing input file")?;
    let mut scan = read_kton(input, config)?;
    let mut out = open_output(cli.output.as_deref())?;

    match cli.format {
        Format::Csv => {
            let mut writer = WriterBuilder::new().with_header(cli.header).build(&mut out);
            // Header goes out even when no record survives.
            writer.write(&RecordBatch::new_empty(schema()))?;
            for batch in scan.by_ref() {
                writer.write(&batch?)?;
            }
        }
        Format::Table => {
            let batches = scan.by_ref().collect::<Result<Vec<_>, _>>()?;
            writeln!(out, "{}", pretty_format_batches(&batches)?)?;
        }
    }
    out.flush()?;

    let stats = scan.stats();
    Ok((stats.lines_read, stats.rows_emitted))
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.schema {
        for (name, kind) in ReadKton::default().columns() {
            println!("{name}\t{}", kind.name());
        }
        return;
    }

    if cli.verbose > 0 {
        if let Some(input) = &cli.input {
            eprintln!("Input:   {}", input.display());
        }
        eprintln!(
            "Output:  {}",
            cli.output
                .as_deref()
                .map_or("(stdout)".into(), |p| p.display().to_string())
        );
    }

    match run(&cli) {
        Ok((lines, records)) => {
            if cli.verbose > 0 {
                eprintln!("Processed {lines} lines -> {records} records");
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
