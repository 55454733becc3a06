use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use medreport_extract::{
    AccuracyReport, ExtractOptions, ExtractionReport, FieldSelection, ScoreOptions,
    extract_files_to_csv, extract_files_to_json, score_csv_files,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "report2csv",
    version,
    about = "Extract patient, test and diagnosis fields from medical reports"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract fields from report files and write one row per file.
    Extract(ExtractArgs),
    /// Score a predicted CSV against a labeled ground-truth CSV.
    Score(ScoreArgs),
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Input report paths (.pdf or plain text).
    #[arg(short, long, num_args = 1.., required = true)]
    input: Vec<PathBuf>,

    /// Output path.
    #[arg(short, long)]
    output: PathBuf,

    /// JSON term catalog replacing the built-in tests and diagnoses.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Disease lexicon, one term per line, for entity recognition.
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Output delimiter character.
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Write structured records as JSON instead of flat CSV.
    #[arg(long)]
    json: bool,

    /// Enable verbose warning output.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Args)]
struct ScoreArgs {
    /// CSV produced by `extract`.
    #[arg(long)]
    predicted: PathBuf,

    /// Hand-labeled CSV with the same columns.
    #[arg(long)]
    truth: PathBuf,

    /// Fields to score, like name,age,tests. Defaults to all but the report date.
    #[arg(long)]
    fields: Option<String>,

    /// Input delimiter character.
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

fn parse_delimiter(delimiter: char) -> Result<u8> {
    if !delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character");
    }
    Ok(delimiter as u8)
}

fn parse_extract_options(args: &ExtractArgs) -> Result<ExtractOptions> {
    Ok(ExtractOptions {
        catalog: args.catalog.clone(),
        lexicon: args.lexicon.clone(),
        delimiter: parse_delimiter(args.delimiter)?,
    })
}

fn parse_score_options(args: &ScoreArgs) -> Result<ScoreOptions> {
    let fields = args
        .fields
        .as_deref()
        .map(FieldSelection::from_str)
        .transpose()
        .map_err(|error| anyhow!("invalid field selection: {error}"))
        .context("failed to parse --fields")?
        .unwrap_or_default();

    Ok(ScoreOptions {
        fields,
        delimiter: parse_delimiter(args.delimiter)?,
    })
}

fn log_report(report: &ExtractionReport, verbose: bool) {
    if report.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", report.warnings.len());
    if verbose {
        for warning in &report.warnings {
            eprintln!(
                "  - {:?} file={:?}: {}",
                warning.code, warning.file, warning.message
            );
        }
    }
}

fn run_extract(args: &ExtractArgs) -> Result<ExtractionReport> {
    let options = parse_extract_options(args)?;
    let result = if args.json {
        extract_files_to_json(&args.input, &args.output, &options)
    } else {
        extract_files_to_csv(&args.input, &args.output, &options)
    };
    result.with_context(|| format!("failed to write '{}'", args.output.display()))
}

fn run_score(args: &ScoreArgs) -> Result<AccuracyReport> {
    let options = parse_score_options(args)?;
    score_csv_files(&args.predicted, &args.truth, &options).with_context(|| {
        format!(
            "failed to score '{}' against '{}'",
            args.predicted.display(),
            args.truth.display()
        )
    })
}

fn print_accuracy(report: &AccuracyReport, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(report).context("failed to render json report")?
        );
    } else {
        println!("{report}");
    }
    Ok(())
}

fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("medreport_extract=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Extract(args) => match run_extract(&args) {
            Ok(report) => {
                log_report(&report, args.verbose);
                if report.readable_count > 0 {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::from(2)
                }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
        Commands::Score(args) => {
            match run_score(&args).and_then(|report| {
                print_accuracy(&report, args.json)?;
                Ok(report)
            }) {
                Ok(report) if report.matched_rows > 0 => ExitCode::SUCCESS,
                Ok(_) => {
                    eprintln!("warning: no ground-truth row matched a predicted file");
                    ExitCode::from(2)
                }
                Err(error) => {
                    eprintln!("error: {error:#}");
                    ExitCode::from(1)
                }
            }
        }
    }
}
