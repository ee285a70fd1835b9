// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Exclusion Process Simulation Suite - Simulation Driver

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::SimulationConfig;
use crate::error::{ConfigError, QueueViolation, Result};
use crate::lattice::{LatticeState, LatticeView, Outcome};
use crate::transition::TransitionRule;

// ─── Observer ────────────────────────────────────────────────────────────────

/// Receives a read-only snapshot after every event and at every replayed
/// grid time. `timestamp` is the moment being reported, which for grid
/// samples is later than `view.current_time()`.
pub trait Observer {
    fn on_event(&mut self, view: &LatticeView<'_>, timestamp: f64);
}

fn notify(observers: &mut [&mut dyn Observer], view: &LatticeView<'_>, timestamp: f64) {
    for observer in observers.iter_mut() {
        observer.on_event(view, timestamp);
    }
}

// ─── Sample Grid ─────────────────────────────────────────────────────────────

/// Uniform time grid `k * dt`. Times are rebuilt from the integer index so
/// no rounding accumulates over long runs.
#[derive(Debug, Clone, Copy)]
struct SampleGrid {
    dt: f64,
    next_k: u64,
}

impl SampleGrid {
    /// First grid point strictly after `start`.
    fn after(dt: f64, start: f64) -> Self {
        Self { dt, next_k: (start / dt).floor() as u64 + 1 }
    }

    fn peek(&self) -> f64 {
        self.next_k as f64 * self.dt
    }

    fn advance(&mut self) {
        self.next_k += 1;
    }
}

// ─── Run Summary ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// Simulated time reached the stopping time.
    ReachedStopTime,
    /// No particles, so no clock will ever fire.
    Quiescent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub events: u64,
    pub moves: u64,
    pub rejections: u64,
    /// Grid replays delivered to observers.
    pub samples: u64,
    pub final_time: f64,
    pub stop: StopReason,
}

impl RunSummary {
    pub fn rejection_rate(&self) -> f64 {
        if self.events == 0 {
            return 0.0;
        }
        self.rejections as f64 / self.events as f64
    }
}

// ─── SimulationDriver ────────────────────────────────────────────────────────

/// Pops events in time order until the lattice clock reaches `stop_time`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationDriver {
    stop_time: f64,
    sample_interval: Option<f64>,
}

impl SimulationDriver {
    pub fn new(stop_time: f64) -> Self {
        Self { stop_time, sample_interval: None }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            stop_time: config.max_time,
            sample_interval: config.sample_interval,
        }
    }

    /// Replay the unchanged state at every multiple of `dt` between events.
    pub fn with_sample_interval(mut self, dt: f64) -> Self {
        self.sample_interval = Some(dt);
        self
    }

    pub fn stop_time(&self) -> f64 {
        self.stop_time
    }

    pub fn sample_interval(&self) -> Option<f64> {
        self.sample_interval
    }

    /// Drive `state` to the stopping time.
    ///
    /// Observers see the initial state at its current time, then every
    /// post-event state. The event that crosses `stop_time` is still
    /// processed, so the final time is at or past it. Any core error aborts
    /// the run; the state must not be resumed afterwards.
    pub fn run<T, R>(
        &self,
        state: &mut LatticeState<T, R>,
        observers: &mut [&mut dyn Observer],
    ) -> Result<RunSummary>
    where
        T: TransitionRule,
        R: Rng,
    {
        if !(self.stop_time.is_finite() && self.stop_time > 0.0) {
            return Err(ConfigError::NonPositiveStopTime(self.stop_time).into());
        }
        if let Some(dt) = self.sample_interval {
            if !(dt.is_finite() && dt > 0.0) {
                return Err(ConfigError::NonPositiveSampleInterval(dt).into());
            }
        }

        info!(
            n = state.n(),
            particles = state.occupied_count(),
            stop_time = self.stop_time,
            "run started"
        );

        let mut grid = self
            .sample_interval
            .map(|dt| SampleGrid::after(dt, state.current_time()));
        let mut summary = RunSummary {
            events: 0,
            moves: 0,
            rejections: 0,
            samples: 0,
            final_time: state.current_time(),
            stop: StopReason::ReachedStopTime,
        };

        notify(observers, &state.view(), state.current_time());

        while state.current_time() < self.stop_time {
            let next = match state.next_event_time() {
                Some(t) => t,
                None if state.occupied_count() == 0 => {
                    warn!(time = state.current_time(), "no particles on the ring, run is quiescent");
                    summary.stop = StopReason::Quiescent;
                    if let Some(grid) = grid.as_mut() {
                        summary.samples += replay(grid, &state.view(), observers, |t| t <= self.stop_time);
                    }
                    break;
                }
                None => {
                    return Err(QueueViolation::NoPendingEvents {
                        occupied: state.occupied_count(),
                    }
                    .into())
                }
            };

            if let Some(grid) = grid.as_mut() {
                summary.samples +=
                    replay(grid, &state.view(), observers, |t| t < next && t <= self.stop_time);
            }

            let record = state.process_next_event()?;
            summary.events += 1;
            match record.outcome {
                Outcome::Moved => summary.moves += 1,
                Outcome::Blocked => summary.rejections += 1,
            }

            notify(observers, &state.view(), state.current_time());
        }

        summary.final_time = state.current_time();
        info!(
            events = summary.events,
            moves = summary.moves,
            rejections = summary.rejections,
            final_time = summary.final_time,
            "run finished"
        );
        Ok(summary)
    }
}

/// Report `view` at every pending grid time accepted by `keep`.
fn replay(
    grid: &mut SampleGrid,
    view: &LatticeView<'_>,
    observers: &mut [&mut dyn Observer],
    keep: impl Fn(f64) -> bool,
) -> u64 {
    let mut delivered = 0;
    while keep(grid.peek()) {
        notify(observers, view, grid.peek());
        grid.advance();
        delivered += 1;
    }
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimulationError;
    use crate::transition::SymmetricTransition;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[derive(Default)]
    struct Recorder {
        timestamps: Vec<f64>,
        view_times: Vec<f64>,
        counts: Vec<usize>,
    }

    impl Observer for Recorder {
        fn on_event(&mut self, view: &LatticeView<'_>, timestamp: f64) {
            self.timestamps.push(timestamp);
            self.view_times.push(view.current_time());
            self.counts.push(view.occupied_count());
        }
    }

    #[test]
    fn test_runs_to_stop_time() {
        let config = SimulationConfig::new(30, 0.4).with_seed(5).with_max_time(50.0);
        let mut state = LatticeState::from_config(&config).unwrap();
        let mut recorder = Recorder::default();

        let summary = SimulationDriver::from_config(&config)
            .run(&mut state, &mut [&mut recorder])
            .unwrap();

        assert_eq!(summary.stop, StopReason::ReachedStopTime);
        assert!(summary.final_time >= 50.0);
        assert_eq!(summary.events, summary.moves + summary.rejections);
        assert_eq!(summary.samples, 0);
        // Initial report plus one per event.
        assert_eq!(recorder.timestamps.len() as u64, summary.events + 1);
        assert_eq!(recorder.timestamps[0], 0.0);
        assert!(recorder.timestamps.windows(2).all(|w| w[0] <= w[1]));
        assert!(recorder.counts.iter().all(|&c| c == 12));
        // Only the last event may land at or beyond the stopping time.
        let beyond = recorder.timestamps.iter().filter(|&&t| t >= 50.0).count();
        assert_eq!(beyond, 1);
    }

    #[test]
    fn test_grid_replay_between_events() {
        let config = SimulationConfig::new(10, 0.5).with_seed(8).with_max_time(5.0);
        let mut state = LatticeState::from_config(&config).unwrap();
        let mut recorder = Recorder::default();

        let summary = SimulationDriver::new(5.0)
            .with_sample_interval(0.5)
            .run(&mut state, &mut [&mut recorder])
            .unwrap();

        // Grid points 0.5, 1.0, ..., 5.0
        assert_eq!(summary.samples, 10);
        assert_eq!(recorder.timestamps.len() as u64, summary.events + summary.samples + 1);
        assert!(recorder.timestamps.windows(2).all(|w| w[0] <= w[1]));

        for k in 1..=10 {
            let t = k as f64 * 0.5;
            let idx = recorder
                .timestamps
                .iter()
                .position(|&ts| ts == t)
                .unwrap_or_else(|| panic!("grid time {} not reported", t));
            // Replays carry the last event time at or before the grid time.
            assert!(recorder.view_times[idx] <= t);
        }
    }

    #[test]
    fn test_empty_ring_is_quiescent() {
        let mut state = LatticeState::new(
            vec![false; 6],
            vec![1.0; 6],
            SymmetricTransition,
            ChaCha8Rng::seed_from_u64(0),
        )
        .unwrap();
        let mut recorder = Recorder::default();

        let summary = SimulationDriver::new(2.0)
            .with_sample_interval(0.5)
            .run(&mut state, &mut [&mut recorder])
            .unwrap();

        assert_eq!(summary.stop, StopReason::Quiescent);
        assert_eq!(summary.events, 0);
        assert_eq!(summary.samples, 4);
        assert_eq!(recorder.timestamps, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
    }

    #[test]
    fn test_rejects_bad_stop_time() {
        let config = SimulationConfig::new(8, 0.5);
        let mut state = LatticeState::from_config(&config).unwrap();
        let err = SimulationDriver::new(-1.0).run(&mut state, &mut []).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidConfiguration(ConfigError::NonPositiveStopTime(_))));

        let err = SimulationDriver::new(1.0)
            .with_sample_interval(0.0)
            .run(&mut state, &mut [])
            .unwrap_err();
        assert!(matches!(
            err,
            SimulationError::InvalidConfiguration(ConfigError::NonPositiveSampleInterval(_))
        ));
    }
}
