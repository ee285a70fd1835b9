// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Exclusion Process Simulation Suite
//
// Continuous-time symmetric simple exclusion process on a ring, with an
// accelerated clock (rate alpha / n^beta) at site 0. Events are executed
// one at a time in global time order.

pub mod error;
pub mod config;
pub mod clock;
pub mod event_queue;
pub mod transition;
pub mod lattice;
pub mod driver;
pub mod metrics;

pub use clock::ExponentialClock;
pub use config::SimulationConfig;
pub use driver::{Observer, RunSummary, SimulationDriver, StopReason};
pub use error::{ConfigError, QueueViolation, SimulationError, TransitionViolation};
pub use event_queue::EventQueue;
pub use lattice::{EventRecord, LatticeState, LatticeView, Outcome, Site};
pub use metrics::{EmpiricalMeasure, MetricKind, MetricRegistry, MetricSeries, MetricValue, PositionProfile};
pub use transition::{AsymmetricTransition, SymmetricTransition, TransitionRule};

/// Build the lattice described by `config` and run it to `config.max_time`.
pub fn run_simulation(
    config: &SimulationConfig,
    observers: &mut [&mut dyn Observer],
) -> error::Result<RunSummary> {
    let mut state = LatticeState::from_config(config)?;
    SimulationDriver::from_config(config).run(&mut state, observers)
}
