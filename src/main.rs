use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{error::ErrorKind, Parser};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use thread_consolidator::config::{parse_policy, Config};
use thread_consolidator::progress::{LineReporter, ProgressReporter};
use thread_consolidator::thread::HeuristicAugmented;
use thread_consolidator::{analysis, engine, records};

/// Consolidate rapid-fire post threads in a raw CSV export.
#[derive(Parser, Debug)]
#[command(name = "thread-consolidator")]
#[command(version)]
struct Args {
    /// Raw CSV file; looked up in RAW_DATA_DIR when not found as given
    input: PathBuf,

    /// Output file name inside PROCESSED_DATA_DIR
    #[arg(short, long)]
    output: Option<String>,

    /// Clustering window in seconds (overrides THREAD_WINDOW_SECS)
    #[arg(short, long)]
    window_seconds: Option<u64>,

    /// Thread policy: window-only or heuristic (overrides THREAD_POLICY)
    #[arg(short, long)]
    policy: Option<String>,

    /// Also write is_thread and member_count columns
    #[arg(long)]
    extended: bool,

    /// Write a JSON thread report instead of a CSV
    #[arg(long)]
    analyze: bool,
}

fn main() {
    let mut progress = LineReporter::stdout();
    if let Err(e) = run(&mut progress) {
        error!("Thread consolidation failed: {e:#}");
        progress.error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn run(progress: &mut dyn ProgressReporter) -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    let args = parse_args(std::env::args_os())?;

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(window) = args.window_seconds {
        config.window_seconds = window;
    }
    if let Some(policy) = args.policy.as_deref() {
        config.policy = parse_policy(policy)?;
    }
    config.validate().context("Invalid configuration")?;

    execute(args, &config, progress)
}

/// Parse command-line arguments. Help and version output still exit
/// directly; every other parse failure is returned as an error.
fn parse_args<I, T>(args: I) -> Result<Args>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Args::try_parse_from(args) {
        Ok(args) => Ok(args),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => Err(e).context("Invalid arguments"),
    }
}

fn execute(args: Args, config: &Config, progress: &mut dyn ProgressReporter) -> Result<()> {
    progress.status("Starting thread consolidation...");

    let Some(input) = records::resolve_input(&args.input, &config.raw_data_dir) else {
        anyhow::bail!("File not found: {}", args.input.display());
    };
    progress.status(&format!("Processing file: {}", input.display()));

    let raw = records::read_raw_file(&input)?;

    if args.analyze {
        let report = analysis::analyze(&raw, config.window_seconds, &HeuristicAugmented::default())?;
        progress.status(&format!(
            "Found {} threads and {} standalone posts",
            report.stats.threads_found, report.stats.standalone_posts
        ));
        let file_name = args
            .output
            .unwrap_or_else(|| records::analysis_file_name(&input));
        let output_path =
            records::write_json_file(&config.processed_data_dir, &file_name, &report)?;
        progress.success(&output_path.display().to_string());
        return Ok(());
    }

    info!(
        window_seconds = config.window_seconds,
        policy = %config.policy,
        "Consolidating threads"
    );
    let consolidation = engine::consolidate(&raw, &config.engine_options(), progress)?;

    let file_name = args
        .output
        .unwrap_or_else(|| records::processed_file_name(&input));
    let output_path = records::write_processed_file(
        &config.processed_data_dir,
        &file_name,
        &consolidation.posts,
        args.extended,
    )?;
    progress.status(&format!(
        "Saved {} consolidated posts to {}",
        consolidation.posts.len(),
        output_path.display()
    ));
    progress.success(&output_path.display().to_string());

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,thread_consolidator=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    // Stdout is reserved for protocol lines
    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}
