//! xlsx2csv - convert the first worksheet of an XLSX file to CSV

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use xlsxcsv::{ConverterBuilder, FormulaMode};

#[derive(Parser)]
#[command(name = "xlsx2csv")]
#[command(
    author,
    version,
    about = "Convert the first worksheet of an XLSX file to CSV"
)]
struct Cli {
    /// Input spreadsheet file (.xlsx)
    input: PathBuf,

    /// Output CSV file (created or truncated)
    output: PathBuf,

    /// Write formula text instead of cached results
    #[arg(long)]
    formulas: bool,

    /// Do not fill skipped columns with empty values
    #[arg(long)]
    no_fill: bool,

    /// Increase log verbosity (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// ログ出力を初期化する
///
/// `-v`の回数で既定のレベルを決め、`RUST_LOG`の指定があればそちらを優先します。
/// ライブラリの`log`レコードは`tracing-log`経由で取り込みます。
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn run(cli: &Cli) -> Result<()> {
    let mode = if cli.formulas {
        FormulaMode::Formula
    } else {
        FormulaMode::CachedValue
    };

    let converter = ConverterBuilder::new()
        .with_formula_mode(mode)
        .fill_missing_cells(!cli.no_fill)
        .build()
        .context("Invalid converter configuration")?;

    let summary = converter
        .convert_file(&cli.input, &cli.output)
        .with_context(|| {
            format!(
                "Failed to convert '{}' to '{}'",
                cli.input.display(),
                cli.output.display()
            )
        })?;

    log::info!(
        "Wrote {} rows from sheet '{}' to {}",
        summary.rows,
        summary.sheet_name,
        cli.output.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
