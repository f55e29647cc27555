use std::path::PathBuf;

use anyhow::{Context as _, Result};
use bigdiff::{HashAlgorithm, RunConfig, RunReport, TracingObserver};
use clap::Parser;

mod telemetry;

use telemetry::LogFormat;

/// Bounded-memory diff of two very large line files
///
/// Reads the two files in DIR (gzip or plain text, one record per line) and
/// writes the distinct lines found in only one of them to
/// DIR/diff/diff-left.gz and DIR/diff/diff-right.gz. The smaller file name
/// is the left side.
///
/// Each input is first hashed into BUCKETS partition files under DIR/temp,
/// so memory use is bounded by the largest bucket pair, not by the input
/// size. Use more buckets for larger inputs.
///
/// Comparison is on line hashes: with the default 32-bit hash, inputs with
/// many millions of lines may see occasional collisions. Use --hash xxh64 to
/// make them negligible.
#[derive(Parser)]
#[command(name = "bigdiff")]
#[command(version, about)]
struct Cli {
    /// Directory holding exactly the two input files
    #[arg(short, long, value_name = "DIR")]
    dir: PathBuf,

    /// Number of hash buckets per input
    #[arg(short, long, value_name = "N")]
    buckets: u32,

    /// Line hash algorithm (xxh32 or xxh64)
    #[arg(long, value_name = "ALGO", default_value_t = HashAlgorithm::Xxh32)]
    hash: HashAlgorithm,

    /// Hash seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// TOML run configuration (a missing file means defaults)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output directory (default: DIR/diff); must not exist
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Log format on stderr (human or json)
    #[arg(long, env = "BIGDIFF_LOG_FORMAT", default_value_t = LogFormat::Human)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _telemetry = telemetry::init(cli.log_format);

    let mut config = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    if let Some(output) = &cli.output {
        // Relative to the working directory, not to DIR.
        config.output_dir = std::path::absolute(output)
            .with_context(|| format!("resolving output directory {}", output.display()))?;
        config.validate()?;
    }

    let hasher = cli.hash.hasher(cli.seed);
    let report = bigdiff::run(
        &cli.dir,
        cli.buckets,
        hasher.as_ref(),
        &config,
        &TracingObserver,
    )
    .with_context(|| format!("diffing {}", cli.dir.display()))?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serializing run report")?
        );
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn print_summary(report: &RunReport) {
    println!(
        "{} only in {}, {} only in {} -> {}",
        plural(report.diff_left_lines),
        report.inputs.left.display(),
        plural(report.diff_right_lines),
        report.inputs.right.display(),
        report.output_dir.display(),
    );
}

fn plural(n: usize) -> String {
    if n == 1 {
        "1 line".to_owned()
    } else {
        format!("{n} lines")
    }
}
