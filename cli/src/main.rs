use anyhow::Context;
use clap::{CommandFactory, Parser};
use parscribe_core::batch::{self, BatchOptions, BatchRunner, ItemStatus, OutputPolicy};
use parscribe_core::config::{
    Compute, Config, Device, EngineKind, LogLevel, LogRotation, LoggingConfig, ModelSize,
    OutputFormat, Overrides,
};
use parscribe_core::discover::{self, MediaItem};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Application-specific environment variable for log filtering (overrides config).
const LOG_ENV_VAR: &str = "PARSCRIBE_LOG";

#[derive(Parser)]
#[command(name = "parscribe")]
#[command(about = "Persian speech transcription for audio and video files")]
#[command(version)]
struct Cli {
    /// Audio/video file or directory to transcribe
    input: Option<PathBuf>,

    /// Transcription engine: whisper (local) or openai (cloud)
    #[arg(short, long)]
    engine: Option<EngineKind>,

    /// Model size for the local engine
    #[arg(short, long)]
    model: Option<ModelSize>,

    /// Language code passed to the engine
    #[arg(short, long)]
    language: Option<String>,

    /// Output format: txt, srt, or json
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Computation device for the local engine: auto, cpu, cuda, or mps
    #[arg(short, long)]
    device: Option<Device>,

    /// Compute precision for the local engine
    #[arg(long)]
    compute: Option<Compute>,

    /// Write the transcript to this exact path (single file input only)
    #[arg(short, long, conflicts_with = "output_dir")]
    output: Option<PathBuf>,

    /// Write all transcripts into this directory
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print transcripts to stdout instead of writing files
    #[arg(long, conflicts_with_all = ["output", "output_dir"])]
    no_save: bool,

    /// Re-transcribe files whose transcript already exists
    #[arg(long)]
    no_skip: bool,

    /// Keep engine output as-is, without Persian orthography normalization
    #[arg(long)]
    no_normalize: bool,

    /// Include per-segment timestamps in text output
    #[arg(long)]
    timestamps: bool,

    /// Recurse into subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// OpenAI API key (overrides the OPENAI_API_KEY environment variable)
    #[arg(long)]
    api_key: Option<String>,

    /// Path to the config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors; suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tokio::select! {
        result = run(cli) => match result {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {e:#}");
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!();
            eprintln!("Interrupted");
            ExitCode::from(130)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let Some(input) = cli.input.clone() else {
        Cli::command().print_help()?;
        return Ok(ExitCode::FAILURE);
    };

    let overrides = Overrides {
        engine: cli.engine,
        model: cli.model,
        device: cli.device,
        compute: cli.compute,
        language: cli.language.clone(),
        format: cli.format,
        output_dir: cli.output_dir.clone(),
        include_timestamps: cli.timestamps.then_some(true),
        normalize: cli.no_normalize.then_some(false),
        api_key: cli.api_key.clone(),
    };

    let config = Config::resolve(cli.config.as_deref(), &overrides)?;
    let _guard = init_logging(&config.logging, cli.verbose, cli.quiet)?;
    tracing::debug!(?config, "resolved configuration");

    let mut items = discover::discover(&input, cli.recursive)?;
    items.sort_by(|a, b| a.path.cmp(&b.path));

    if items.is_empty() {
        if !cli.quiet {
            println!("No supported media files found in {}", input.display());
        }
        return Ok(ExitCode::SUCCESS);
    }

    let single = input.is_file();
    let policy = if cli.no_save {
        OutputPolicy::Suppress
    } else if let Some(path) = cli.output.clone() {
        if !single {
            anyhow::bail!("--output expects a single file input; use --output-dir for directories");
        }
        OutputPolicy::File(path)
    } else if let Some(dir) = config.output.directory.clone() {
        OutputPolicy::Directory(dir)
    } else {
        OutputPolicy::Alongside
    };
    let options = BatchOptions {
        output: policy,
        // An explicitly named file is always re-transcribed.
        skip_existing: !single && !cli.no_skip,
    };

    let mut runner = BatchRunner::new(config).await?;

    let quiet = cli.quiet;
    if !quiet && !single {
        let noun = if items.len() == 1 { "file" } else { "files" };
        eprintln!(
            "Transcribing {} {noun} with {}",
            items.len(),
            runner.engine_name()
        );
    }

    let reports = runner
        .run(items, &options, |n: usize, total: usize, item: &MediaItem| {
            if !quiet && !single {
                eprintln!("[{n}/{total}] {}", item.file_name());
            }
        })
        .await;

    if single {
        let report = reports.into_iter().next().context("no report for input")?;
        return match report.status {
            ItemStatus::Transcribed(t) => {
                if cli.no_save {
                    println!("{}", t.text);
                } else if let Some(path) = report.output_path {
                    if !quiet {
                        println!(
                            "Saved {} ({:.1}s audio, {:.1}s processing)",
                            path.display(),
                            t.duration,
                            t.processing_time
                        );
                    }
                }
                Ok(ExitCode::SUCCESS)
            }
            ItemStatus::Skipped => {
                if !quiet {
                    if let Some(path) = report.output_path {
                        println!("Transcript already exists: {}", path.display());
                    }
                }
                Ok(ExitCode::SUCCESS)
            }
            ItemStatus::Failed(e) => Err(e.into()),
        };
    }

    if cli.no_save {
        for report in &reports {
            if let ItemStatus::Transcribed(t) = &report.status {
                println!("--- {} ---", report.item.file_name());
                println!("{}", t.text);
            }
        }
    }

    let summary = batch::summarize(&reports);
    if !quiet {
        println!();
        println!("Successful: {}/{}", summary.successful(), summary.total);
        if summary.skipped > 0 {
            println!("Skipped (transcript exists): {}", summary.skipped);
        }
    }
    if !summary.failed.is_empty() {
        eprintln!("Failed:");
        for report in &summary.failed {
            if let ItemStatus::Failed(e) = &report.status {
                eprintln!("  {}: {e}", report.item.file_name());
            }
        }
    }

    if summary.all_failed() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Set up tracing with a stderr layer and an optional log file.
///
/// Returns the appender guard; dropping it flushes buffered log lines.
fn init_logging(
    logging: &LoggingConfig,
    verbose: bool,
    quiet: bool,
) -> anyhow::Result<Option<WorkerGuard>> {
    let level = if verbose {
        LogLevel::Debug
    } else if quiet {
        LogLevel::Error
    } else {
        logging.level
    };

    // PARSCRIBE_LOG env var overrides the configured level
    let filter = EnvFilter::builder()
        .with_env_var(LOG_ENV_VAR)
        .with_default_directive(level.as_directive().parse()?)
        .from_env()?;

    // Logs go to stderr; stdout is reserved for transcripts and summaries.
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr));

    match &logging.file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let name = path.file_name().context("log file path has no file name")?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;

            let appender = match logging.rotation {
                LogRotation::Never => tracing_appender::rolling::never(dir, name),
                LogRotation::Daily => tracing_appender::rolling::daily(dir, name),
                LogRotation::Hourly => tracing_appender::rolling::hourly(dir, name),
            };
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                .init();
            Ok(Some(guard))
        }
        None => {
            registry.init();
            Ok(None)
        }
    }
}
