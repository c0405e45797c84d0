use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use miette::IntoDiagnostic;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cazy_db_builder::app::{App, BuildOptions, RunSummary, SampleReport};
use cazy_db_builder::error::BuildError;
use cazy_db_builder::output::{JsonOutput, LogSink, OutputMode};
use cazy_db_builder::pairing::{SamplePair, discover_pairs, load_pair, read_input_text};
use cazy_db_builder::store::{OutputStore, RunManifest};
use cazy_db_builder::taxonomy::LevelTable;

#[derive(Parser)]
#[command(name = "cazy-db")]
#[command(about = "Builds CAZyme sequence and taxonomy databases from dbCAN annotation output")]
#[command(version, author)]
struct Cli {
    /// Directory holding dbCAN hit tables (.tab) and nucleotide files (.fnn)
    #[arg(short, long)]
    input: Utf8PathBuf,

    /// Directory the .fasta/.tax artifacts are written to
    #[arg(short, long)]
    output: Utf8PathBuf,

    /// CAZy level table (tab-delimited, header row)
    #[arg(short, long)]
    level: Utf8PathBuf,

    /// Keep every hit per gene instead of only the best-covered one
    #[arg(long)]
    multi: bool,

    /// Level-table column holding the classification code
    #[arg(long, default_value = "L4")]
    code_column: String,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(build) = report.downcast_ref::<BuildError>() {
            return ExitCode::from(map_exit_code(build));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &BuildError) -> u8 {
    match error {
        BuildError::EmptyLevelTable
        | BuildError::MissingCodeColumn(_)
        | BuildError::MalformedLevelRow { .. }
        | BuildError::InputRead { .. } => 2,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    let level_text = read_input_text(&cli.level).into_diagnostic()?;
    let level_table = LevelTable::parse(&level_text, &cli.code_column).into_diagnostic()?;
    info!("loaded level table: {} rows", level_table.len());

    let app = App::new(
        level_table,
        BuildOptions {
            keep_multiple: cli.multi,
        },
    );
    let store = OutputStore::new(cli.output.clone());
    store.ensure_root().into_diagnostic()?;

    let discovery = discover_pairs(&cli.input).into_diagnostic()?;
    if discovery.pairs.is_empty() && discovery.unpaired.is_empty() {
        warn!("no annotation tables found in {}", cli.input);
    }

    let mut summary = RunSummary::default();

    for table_path in &discovery.unpaired {
        let error = BuildError::MissingSequenceFile(table_path.clone());
        warn!("{error}");
        let basename = table_path.file_stem().unwrap_or("unknown");
        summary.push(SampleReport::failed(basename, &error));
    }

    for pair in &discovery.pairs {
        match build_pair(&app, &store, pair) {
            Ok(report) => summary.push(report),
            Err(error) => {
                warn!("{}: {error}", pair.basename);
                summary.push(SampleReport::failed(&pair.basename, &error));
            }
        }
    }

    store
        .write_manifest(&RunManifest::new(summary.clone()))
        .into_diagnostic()?;

    match output_mode {
        OutputMode::Json => JsonOutput::print_summary(&summary).into_diagnostic()?,
        OutputMode::Text => print_run_summary(&summary),
    }

    if summary.pairs_failed > 0 {
        return Err(miette::Report::msg(format!(
            "{} of {} pairs failed",
            summary.pairs_failed,
            summary.samples.len()
        )));
    }
    Ok(())
}

/// One pair end to end: read, process, write. Failures isolate to the pair.
/// Diagnostics always go to the log stream on stderr, whatever the summary
/// mode on stdout.
fn build_pair(app: &App, store: &OutputStore, pair: &SamplePair) -> Result<SampleReport, BuildError> {
    let sample = load_pair(pair)?;
    let output = app.process_pair(&sample, &LogSink)?;
    store.write_pair(&output)?;
    Ok(output.report)
}

fn print_run_summary(summary: &RunSummary) {
    let green = "\x1b[32m";
    let yellow = "\x1b[33m";
    let cyan = "\x1b[36m";
    let reset = "\x1b[0m";

    println!("{cyan}cazy-db summary{reset}");
    println!("{green}pairs built: {}{reset}", summary.pairs_processed);
    println!("{yellow}pairs failed: {}{reset}", summary.pairs_failed);

    for sample in &summary.samples {
        match &sample.error {
            Some(error) => println!("{yellow}  {} failed: {error}{reset}", sample.basename),
            None => {
                println!(
                    "{green}  {}: {} sequences, {} taxonomy rows{reset}",
                    sample.basename, sample.sequences_written, sample.taxonomy_written
                );
                let skipped = sample.skipped_missing_sequence + sample.skipped_length_mismatch;
                if skipped > 0 {
                    println!("{yellow}    skipped {skipped} hits{reset}");
                }
            }
        }
    }
}
