// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Exclusion Process Simulation Suite - Spatial Statistics
//
// Collectors are observers: they read a lattice snapshot and keep a time
// series of derived values. Collector selection is a fixed enumeration with
// one registry slot per kind.

use serde::{Deserialize, Serialize};

use crate::driver::Observer;
use crate::lattice::LatticeView;

// ─── Empirical Measure ───────────────────────────────────────────────────────

/// Empirical distribution of particle positions, rescaled to `[0, 1)`.
///
/// Each particle at site `i` puts mass `1/n` at `i/n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmpiricalMeasure {
    n: usize,
    /// Occupied sites, ascending.
    positions: Vec<usize>,
}

impl EmpiricalMeasure {
    pub fn from_view(view: &LatticeView<'_>) -> Self {
        Self {
            n: view.n(),
            positions: view.occupied_sites().collect(),
        }
    }

    /// Build from arbitrary positions; duplicates are dropped.
    pub fn from_positions(n: usize, mut positions: Vec<usize>) -> Self {
        positions.sort_unstable();
        positions.dedup();
        Self { n, positions }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Cumulative mass at `x`: `#{i occupied : i/n <= x} / n`.
    pub fn cdf(&self, x: f64) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        let n = self.n as f64;
        let count = self.positions.partition_point(|&p| p as f64 / n <= x);
        count as f64 / n
    }

    /// Total mass, equal to the particle density.
    pub fn total_mass(&self) -> f64 {
        self.cdf(1.0)
    }

    /// `cdf` on `points` evenly spaced values spanning `[0, 1]`.
    pub fn evaluate_grid(&self, points: usize) -> Vec<f64> {
        unit_grid(points).map(|x| self.cdf(x)).collect()
    }
}

/// `points` evenly spaced values from 0 to 1 inclusive.
pub fn unit_grid(points: usize) -> impl Iterator<Item = f64> {
    let denom = points.saturating_sub(1).max(1) as f64;
    (0..points).map(move |k| k as f64 / denom)
}

// ─── Position Profile ────────────────────────────────────────────────────────

/// Occupied site indices at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionProfile(pub Vec<usize>);

impl PositionProfile {
    pub fn from_view(view: &LatticeView<'_>) -> Self {
        Self(view.occupied_sites().collect())
    }
}

// ─── Registry ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    EmpiricalMeasure = 0,
    PositionProfile = 1,
}

impl MetricKind {
    pub const COUNT: usize = 2;
    pub const ALL: [MetricKind; MetricKind::COUNT] = [Self::EmpiricalMeasure, Self::PositionProfile];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::EmpiricalMeasure => "Empirical Measure",
            Self::PositionProfile => "Position Profile",
        }
    }

    fn measure(self, view: &LatticeView<'_>) -> MetricValue {
        match self {
            Self::EmpiricalMeasure => MetricValue::EmpiricalMeasure(EmpiricalMeasure::from_view(view)),
            Self::PositionProfile => MetricValue::PositionProfile(PositionProfile::from_view(view)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricValue {
    EmpiricalMeasure(EmpiricalMeasure),
    PositionProfile(PositionProfile),
}

/// Values of one metric with the timestamp each was taken at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub kind: MetricKind,
    pub values: Vec<MetricValue>,
    pub timestamps: Vec<f64>,
}

impl MetricSeries {
    pub fn new(kind: MetricKind) -> Self {
        Self { kind, values: Vec::new(), timestamps: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last(&self) -> Option<(&MetricValue, f64)> {
        self.values.last().zip(self.timestamps.last().copied())
    }
}

/// One optional series per [`MetricKind`], indexed by the kind.
#[derive(Debug, Clone, Default)]
pub struct MetricRegistry {
    slots: [Option<MetricSeries>; MetricKind::COUNT],
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry collecting every kind.
    pub fn all() -> Self {
        let mut registry = Self::new();
        for kind in MetricKind::ALL {
            registry.enable(kind);
        }
        registry
    }

    pub fn enable(&mut self, kind: MetricKind) -> &mut Self {
        self.slots[kind.index()].get_or_insert_with(|| MetricSeries::new(kind));
        self
    }

    pub fn is_enabled(&self, kind: MetricKind) -> bool {
        self.slots[kind.index()].is_some()
    }

    pub fn series(&self, kind: MetricKind) -> Option<&MetricSeries> {
        self.slots[kind.index()].as_ref()
    }

    pub fn into_series(self) -> Vec<MetricSeries> {
        self.slots.into_iter().flatten().collect()
    }
}

impl Observer for MetricRegistry {
    fn on_event(&mut self, view: &LatticeView<'_>, timestamp: f64) {
        for series in self.slots.iter_mut().flatten() {
            series.values.push(series.kind.measure(view));
            series.timestamps.push(timestamp);
        }
    }
}
