// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Exclusion Process Simulation Suite - Error Types

// ─── Configuration ───────────────────────────────────────────────────────────

/// Rejected construction parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("ring must contain at least one site")]
    EmptyRing,

    #[error("density must lie in [0, 1], got {0}")]
    DensityOutOfRange(f64),

    #[error("alpha must be positive and finite, got {0}")]
    NonPositiveAlpha(f64),

    #[error("beta must be non-negative and finite, got {0}")]
    NegativeBeta(f64),

    #[error("clock rate at site {site} must be positive and finite, got {rate}")]
    NonPositiveRate { site: usize, rate: f64 },

    #[error("occupancy has {occupancy} sites but {rates} rates were supplied")]
    LengthMismatch { occupancy: usize, rates: usize },

    #[error("stopping time must be positive and finite, got {0}")]
    NonPositiveStopTime(f64),

    #[error("sample interval must be positive and finite, got {0}")]
    NonPositiveSampleInterval(f64),

    #[error("failed to load configuration: {0}")]
    Load(String),
}

// ─── Queue Invariants ────────────────────────────────────────────────────────

/// The event queue and the lattice disagree; every derived statistic from
/// this point on would be meaningless.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueueViolation {
    #[error("event queue exhausted with {occupied} occupied site(s)")]
    NoPendingEvents { occupied: usize },

    #[error("event at t={event_time} precedes current time t={current_time}")]
    TimeRegression { current_time: f64, event_time: f64 },

    #[error("clock fired at empty site {site}")]
    EmptySiteFired { site: usize },

    #[error("{occupied} occupied site(s) but {queued} live queue entries")]
    Incoherent { occupied: usize, queued: usize },
}

// ─── Transition Constraints ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionViolation {
    #[error("cannot move particle from site {from} onto occupied site {to}")]
    DestinationOccupied { from: usize, to: usize },

    #[error("no particle at site {site}")]
    SourceEmpty { site: usize },

    #[error("transition rule returned site {destination} on a ring of {n} sites")]
    DestinationOutOfRange { destination: usize, n: usize },
}

// ─── SimulationError ─────────────────────────────────────────────────────────

/// Every core error is fatal for the run that raised it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    #[error("queue invariant violated: {0}")]
    QueueInvariantViolation(#[from] QueueViolation),

    #[error("transition constraint violated: {0}")]
    TransitionConstraintViolation(#[from] TransitionViolation),
}

pub type Result<T, E = SimulationError> = std::result::Result<T, E>;
