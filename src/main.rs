//! tabconv - Fidelity-preserving tabular file conversion

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use termcolor::ColorChoice;
use tracing::Level;

use tabconv::config::{Config, OutputFormat, SheetMode};
use tabconv::convert::{collect_inputs, Converter};
use tabconv::error::ConvertError;

/// Convert spreadsheets and tabular text files without losing field fidelity
#[derive(Parser, Debug)]
#[command(name = "tabconv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input files, directories or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Directory to write converted files into
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Output format: xlsx, xls, csv, tsv, tab, txt, json or xml
    #[arg(short, long, default_value = "xlsx")]
    format: String,

    /// Convert only these workbook sheets, one output per sheet (repeatable)
    #[arg(short, long = "sheet", value_name = "NAME")]
    sheets: Vec<String>,

    /// Write every workbook sheet to its own file
    #[arg(long, conflicts_with = "sheets")]
    split_sheets: bool,

    /// Office automation command used for unreadable .xls files
    #[arg(long, default_value = tabconv::automation::DEFAULT_OFFICE_COMMAND)]
    office_command: String,

    /// Seconds to wait for one office automation conversion
    #[arg(long, default_value_t = 120)]
    office_timeout: u64,

    /// Never fall back to office automation
    #[arg(long)]
    no_office: bool,

    /// Print the batch report as JSON instead of a summary
    #[arg(long)]
    summary_json: bool,

    /// Log strategy attempts and other details
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1), // some files failed or nothing was written
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<bool> {
    let cli = Cli::parse();
    init_logging(&cli);

    let format: OutputFormat = cli.format.parse()?;
    let sheet_mode = if cli.split_sheets {
        SheetMode::All
    } else if !cli.sheets.is_empty() {
        SheetMode::Named(cli.sheets.clone())
    } else {
        SheetMode::Merged
    };

    let config = Config::new(cli.output.clone())
        .with_output_format(format)
        .with_sheet_mode(sheet_mode)
        .with_office_command(cli.office_command.clone())
        .with_office_timeout(Duration::from_secs(cli.office_timeout))
        .with_automation(!cli.no_office);

    let inputs = collect_inputs(&cli.inputs);
    let mut converter = Converter::new(config);
    let report = match converter.run(&inputs) {
        Ok(report) => report,
        Err(ConvertError::Cancelled) => anyhow::bail!("Sheet selection cancelled; nothing was written"),
        Err(e) => {
            return Err(e).with_context(|| {
                format!("Failed to convert into {}", cli.output.display())
            })
        }
    };

    if cli.summary_json {
        println!("{}", report.to_json().context("Failed to serialize report")?);
    } else {
        let color = if std::io::stdout().is_terminal() {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        report
            .print_summary(color)
            .context("Failed to print summary")?;
    }

    Ok(report.is_success())
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
