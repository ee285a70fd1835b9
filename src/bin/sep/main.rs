// Exclusion Process Runner - seedable ChaCha8 PRNG, Monte Carlo repetitions,
// JSON report and optional JSONL time series
//
// Usage:
//   cargo run --release --bin sep                                  # Defaults (n=100, time=10000)
//   cargo run --release --bin sep -- -n 200 --alpha 50 --beta 0.5  # Defect parameters
//   cargo run --release --bin sep -- --runs 10 --seed 42           # 10 runs, seeds 42..51
//   cargo run --release --bin sep -- --time-series                 # JSONL sampled every 0.01
//   cargo run --release --bin sep -- --config run.json             # Load a config file

mod metrics;
mod monte_carlo;
mod report;
mod time_series;

use clap::Parser;
use exclusion_engine::SimulationConfig;
use report::Report;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Grid spacing used for time series when none is configured.
const DEFAULT_SAMPLE_INTERVAL: f64 = 0.01;

// ─── CLI Parsing ────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name = "sep",
    about = "Symmetric exclusion process on a ring with an alpha/n^beta clock at site 0"
)]
struct Cli {
    /// Ring size
    #[arg(short = 'n', long = "sites")]
    n: Option<usize>,

    /// Alpha parameter of the site-0 clock rate
    #[arg(long)]
    alpha: Option<f64>,

    /// Beta parameter of the site-0 clock rate
    #[arg(long)]
    beta: Option<f64>,

    /// Initial particle density
    #[arg(long)]
    density: Option<f64>,

    /// Simulated stopping time
    #[arg(long)]
    time: Option<f64>,

    /// Base seed; run i uses seed + i
    #[arg(long)]
    seed: Option<u64>,

    /// Number of independent runs
    #[arg(long, default_value_t = 1)]
    runs: usize,

    /// Replay snapshots on a uniform grid of this spacing
    #[arg(long)]
    sample_interval: Option<f64>,

    /// Write one JSONL time series per seed
    #[arg(long)]
    time_series: bool,

    /// Points on [0, 1] at which the empirical measure is evaluated
    #[arg(long, default_value_t = 101)]
    grid_points: usize,

    /// JSON configuration file; command-line flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Results directory
    #[arg(long, default_value = "sep-results")]
    output: PathBuf,
}

impl Cli {
    fn to_config(&self) -> Result<SimulationConfig, exclusion_engine::ConfigError> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_json_file(path)?,
            None => SimulationConfig::default(),
        };
        if let Some(n) = self.n {
            config.n = n;
        }
        if let Some(alpha) = self.alpha {
            config.alpha = alpha;
        }
        if let Some(beta) = self.beta {
            config.beta = beta;
        }
        if let Some(density) = self.density {
            config.density = density;
        }
        if let Some(time) = self.time {
            config.max_time = time;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.sample_interval.is_some() {
            config.sample_interval = self.sample_interval;
        }
        if self.time_series && config.sample_interval.is_none() {
            config.sample_interval = Some(DEFAULT_SAMPLE_INTERVAL);
        }
        config.validate()?;
        Ok(config)
    }
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run aborted");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = cli.to_config()?;
    if cli.runs == 0 {
        return Err("--runs must be at least 1".into());
    }

    let ts_dir = cli.time_series.then(|| cli.output.join("time-series"));

    println!("\n  Exclusion Process Runner");
    println!(
        "  n={} alpha={} beta={} density={} time={} | site-0 rate {:.6}",
        config.n,
        config.alpha,
        config.beta,
        config.density,
        config.max_time,
        config.defect_rate()
    );
    println!("  PRNG: ChaCha8Rng | Runs: {} | Base seed: {}\n", cli.runs, config.seed);
    println!(
        "  {:>6} {:>10} {:>8} {:>10} {:>8} {:>8} {:>8}",
        "Seed", "Events", "Reject%", "Final t", "Site0", "Bulk", "Time"
    );
    println!("  {}", "-".repeat(66));

    let suite_start = Instant::now();
    let results = monte_carlo::run_monte_carlo(
        &config,
        cli.runs,
        config.seed,
        cli.grid_points,
        ts_dir.as_deref(),
    )?;

    for r in &results.individual_runs {
        println!(
            "  {:>6} {:>10} {:>7.1}% {:>10.2} {:>8.4} {:>8.4} {:>6}ms",
            r.seed,
            r.events,
            r.rejection_rate * 100.0,
            r.final_time,
            r.site0_occupation,
            r.bulk_occupation,
            r.elapsed_ms,
        );
    }

    println!("  {}", "-".repeat(66));
    println!(
        "  Site-0 occupation: {:.4} ± {:.4}   Bulk occupation: {:.4} ± {:.4}",
        results.site0_occupation.mean,
        results.site0_occupation.half_width(),
        results.bulk_occupation.mean,
        results.bulk_occupation.half_width(),
    );
    println!(
        "  Rejection rate: {:.2}%   Suite time: {:.1}s\n",
        results.rejection_rate.mean * 100.0,
        suite_start.elapsed().as_secs_f64()
    );

    // ─── Write JSON Report ──────────────────────────────────────────────

    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis().to_string();
    let report = Report {
        timestamp: timestamp.clone(),
        version: env!("CARGO_PKG_VERSION"),
        prng: "ChaCha8Rng",
        defect_rate: config.defect_rate(),
        config,
        results,
    };

    std::fs::create_dir_all(&cli.output)?;
    let path = cli.output.join(format!("sep-{}.json", timestamp));
    std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
    println!("  Results saved to: {}\n", path.display());

    Ok(())
}
