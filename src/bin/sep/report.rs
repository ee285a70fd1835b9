// Run Report Types
// Structured JSON output for independent analysis of the defect process

use exclusion_engine::{SimulationConfig, StopReason};
use serde::Serialize;

// ─── Statistics (per-metric Monte Carlo aggregation) ────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self { mean: 0.0, std_dev: 0.0, ci_lower: 0.0, ci_upper: 0.0, min: 0.0, max: 0.0, n: 0 };
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std_dev = variance.sqrt();
        let half_width = 1.96 * std_dev / (n as f64).sqrt(); // 95% CI
        Self {
            mean,
            std_dev,
            ci_lower: mean - half_width,
            ci_upper: mean + half_width,
            min: samples.iter().cloned().fold(f64::INFINITY, f64::min),
            max: samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            n,
        }
    }

    pub fn half_width(&self) -> f64 {
        (self.ci_upper - self.ci_lower) / 2.0
    }
}

// ─── Single-Run Result ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub seed: u64,
    pub particles: usize,
    pub events: u64,
    pub moves: u64,
    pub rejections: u64,
    pub rejection_rate: f64,
    pub samples: u64,
    pub final_time: f64,
    pub stop: StopReason,
    pub elapsed_ms: u128,
    pub events_per_sec: f64,
    /// Fraction of simulated time site 0 held a particle.
    pub site0_occupation: f64,
    /// Same fraction averaged over all other sites.
    pub bulk_occupation: f64,
    pub occupation_profile: Vec<f64>,
    /// Empirical measure on the unit grid at the final time.
    pub final_measure: Vec<f64>,
}

// ─── Monte Carlo Report ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct MonteCarloReport {
    pub n_runs: usize,
    pub events: Stats,
    pub rejection_rate: Stats,
    pub final_time: Stats,
    pub site0_occupation: Stats,
    pub bulk_occupation: Stats,
    pub elapsed_ms: Stats,
    pub events_per_sec: Stats,
    /// Grid abscissae shared by every `measure_profile` entry.
    pub grid: Vec<f64>,
    /// Across-run spread of the final empirical measure at each grid point.
    pub measure_profile: Vec<Stats>,
    /// Mean occupation fraction per site across runs.
    pub occupation_profile: Vec<f64>,
    pub individual_runs: Vec<RunResult>,
}

// ─── Top-Level Report ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Report {
    pub timestamp: String,
    pub version: &'static str,
    pub prng: &'static str,
    pub defect_rate: f64,
    pub config: SimulationConfig,
    pub results: MonteCarloReport,
}
