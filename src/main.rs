use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

use wiktionary_ipa_extract::input::{open_input, open_output};
use wiktionary_ipa_extract::{pipeline, Config, Stats};

#[derive(Parser)]
#[command(name = "wiktionary-ipa-extract")]
#[command(version)]
#[command(about = "Extract {{IPA}} pronunciations from a Wiktionary XML dump as JSON lines")]
struct Args {
    /// Input XML dump (default: stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output JSONL file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Input is bzip2 compressed
    #[arg(long)]
    bz: bool,

    /// Number of parser threads (overrides the config file)
    #[arg(short, long)]
    workers: Option<usize>,

    /// YAML config file with pipeline tunables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Quiet mode - no progress spinner or summary
    #[arg(short, long)]
    quiet: bool,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    loglevel: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.loglevel.to_level_filter())
        .format_timestamp_secs()
        .init();

    if let Err(err) = run(&args) {
        log::error!("{err:#}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    config.validate()?;
    log::debug!("{config:?}");

    let reader = open_input(args.input.as_deref(), args.bz).with_context(|| match &args.input {
        Some(path) => format!("opening {}", path.display()),
        None => "opening stdin".to_string(),
    })?;
    let writer = open_output(args.output.as_deref()).with_context(|| match &args.output {
        Some(path) => format!("creating {}", path.display()),
        None => "opening stdout".to_string(),
    })?;

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner} Finding IPA's: {pos} ({per_sec})")?;
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    };

    let stats = pipeline::process(reader, writer, &config, &pb)?;
    pb.finish_and_clear();

    if !args.quiet {
        print_stats(&stats);
    }
    Ok(())
}

fn print_stats(stats: &Stats) {
    log::info!("Pages scanned: {}", stats.pages_scanned);
    log::info!("Meta pages skipped: {}", stats.meta_records);
    log::info!("Candidate pages: {}", stats.work_items);
    log::info!("Entries written: {}", stats.entries_written);
    log::info!(
        "Time: {}m {}s ({:.0} pages/sec)",
        stats.elapsed.as_secs() / 60,
        stats.elapsed.as_secs() % 60,
        stats.pages_per_sec()
    );
}
