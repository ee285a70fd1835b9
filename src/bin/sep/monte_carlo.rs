// Monte Carlo Infrastructure - N independent runs with statistical aggregation
// Run i uses seed base + i, so any single run can be replayed on its own

use exclusion_engine::metrics::{unit_grid, EmpiricalMeasure};
use exclusion_engine::{LatticeState, Observer, SimulationConfig, SimulationDriver};
use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::metrics::{bulk_mean, OccupationTracker};
use crate::report::*;
use crate::time_series::TimeSeriesRecorder;

/// Run one seed of `config` to its stopping time.
pub fn run_single(
    config: &SimulationConfig,
    seed: u64,
    grid_points: usize,
    time_series_dir: Option<&Path>,
) -> Result<RunResult, Box<dyn std::error::Error>> {
    let recorder = match time_series_dir {
        Some(dir) => Some(TimeSeriesRecorder::create(
            &dir.join(format!("seed-{}.jsonl", seed)),
            grid_points,
        )?),
        None => None,
    };
    run_recorded(config, seed, grid_points, recorder)
}

/// Run one seed, streaming snapshots into `recorder` if given. A failed
/// time-series write fails the run.
fn run_recorded(
    config: &SimulationConfig,
    seed: u64,
    grid_points: usize,
    mut recorder: Option<TimeSeriesRecorder>,
) -> Result<RunResult, Box<dyn std::error::Error>> {
    let config = config.clone().with_seed(seed);
    let start = Instant::now();

    let mut state = LatticeState::from_config(&config)?;
    let mut occupation = OccupationTracker::new(config.n, config.max_time);

    let mut observers: Vec<&mut dyn Observer> = vec![&mut occupation];
    if let Some(recorder) = recorder.as_mut() {
        observers.push(recorder);
    }
    let summary = SimulationDriver::from_config(&config).run(&mut state, &mut observers)?;
    drop(observers);

    if let Some(recorder) = recorder {
        let lines = recorder.finish()?;
        info!(seed, lines, "time series written");
    }

    let elapsed = start.elapsed();
    let elapsed_secs = elapsed.as_secs_f64().max(0.001);
    let profile = occupation.profile();
    let final_measure = EmpiricalMeasure::from_view(&state.view()).evaluate_grid(grid_points);

    Ok(RunResult {
        seed,
        particles: state.occupied_count(),
        events: summary.events,
        moves: summary.moves,
        rejections: summary.rejections,
        rejection_rate: summary.rejection_rate(),
        samples: summary.samples,
        final_time: summary.final_time,
        stop: summary.stop,
        elapsed_ms: elapsed.as_millis(),
        events_per_sec: summary.events as f64 / elapsed_secs,
        site0_occupation: profile.first().copied().unwrap_or(0.0),
        bulk_occupation: bulk_mean(&profile),
        occupation_profile: profile,
        final_measure,
    })
}

/// Run `n_runs` seeds starting at `base_seed` and aggregate.
pub fn run_monte_carlo(
    config: &SimulationConfig,
    n_runs: usize,
    base_seed: u64,
    grid_points: usize,
    time_series_dir: Option<&Path>,
) -> Result<MonteCarloReport, Box<dyn std::error::Error>> {
    let mut results = Vec::with_capacity(n_runs);
    for i in 0..n_runs {
        // Seeds wrap past u64::MAX.
        let seed = base_seed.wrapping_add(i as u64);
        results.push(run_single(config, seed, grid_points, time_series_dir)?);
    }
    Ok(aggregate(config.n, grid_points, results))
}

fn collect(results: &[RunResult], f: impl Fn(&RunResult) -> f64) -> Stats {
    Stats::from_samples(&results.iter().map(f).collect::<Vec<_>>())
}

/// Aggregate individual runs into a MonteCarloReport.
fn aggregate(n: usize, grid_points: usize, results: Vec<RunResult>) -> MonteCarloReport {
    let runs = results.len().max(1) as f64;

    let measure_profile = (0..grid_points)
        .map(|k| collect(&results, |r| r.final_measure[k]))
        .collect();

    let mut occupation_profile = vec![0.0; n];
    for r in &results {
        for (acc, v) in occupation_profile.iter_mut().zip(&r.occupation_profile) {
            *acc += v / runs;
        }
    }

    MonteCarloReport {
        n_runs: results.len(),
        events: collect(&results, |r| r.events as f64),
        rejection_rate: collect(&results, |r| r.rejection_rate),
        final_time: collect(&results, |r| r.final_time),
        site0_occupation: collect(&results, |r| r.site0_occupation),
        bulk_occupation: collect(&results, |r| r.bulk_occupation),
        elapsed_ms: collect(&results, |r| r.elapsed_ms as f64),
        events_per_sec: collect(&results, |r| r.events_per_sec),
        grid: unit_grid(grid_points).collect(),
        measure_profile,
        occupation_profile,
        individual_runs: results,
    }
}
