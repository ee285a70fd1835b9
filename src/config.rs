// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Exclusion Process Simulation Suite - Run Configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Parameters of one exclusion-process run.
///
/// Site 0 carries the defect rate `alpha / n^beta`; every other site rings
/// at rate 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Ring size.
    pub n: usize,
    pub alpha: f64,
    pub beta: f64,
    /// Fraction of sites occupied at t = 0.
    pub density: f64,
    /// Simulated stopping time.
    pub max_time: f64,
    pub seed: u64,
    /// Grid spacing for replaying snapshots between events.
    pub sample_interval: Option<f64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n: 100,
            alpha: 100.0,
            beta: 1.0,
            density: 0.1,
            max_time: 10_000.0,
            seed: 0,
            sample_interval: None,
        }
    }
}

impl SimulationConfig {
    pub fn new(n: usize, density: f64) -> Self {
        Self { n, density, ..Self::default() }
    }

    pub fn with_defect(mut self, alpha: f64, beta: f64) -> Self {
        self.alpha = alpha;
        self.beta = beta;
        self
    }

    pub fn with_max_time(mut self, max_time: f64) -> Self {
        self.max_time = max_time;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_sample_interval(mut self, dt: f64) -> Self {
        self.sample_interval = Some(dt);
        self
    }

    /// Load a JSON configuration; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n < 1 {
            return Err(ConfigError::EmptyRing);
        }
        if !(0.0..=1.0).contains(&self.density) {
            return Err(ConfigError::DensityOutOfRange(self.density));
        }
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return Err(ConfigError::NonPositiveAlpha(self.alpha));
        }
        if !(self.beta.is_finite() && self.beta >= 0.0) {
            return Err(ConfigError::NegativeBeta(self.beta));
        }
        if !(self.max_time.is_finite() && self.max_time > 0.0) {
            return Err(ConfigError::NonPositiveStopTime(self.max_time));
        }
        if let Some(dt) = self.sample_interval {
            if !(dt.is_finite() && dt > 0.0) {
                return Err(ConfigError::NonPositiveSampleInterval(dt));
            }
        }
        Ok(())
    }

    /// Clock rate at site 0.
    pub fn defect_rate(&self) -> f64 {
        self.alpha / (self.n as f64).powf(self.beta)
    }

    /// Rate per site: the defect rate at site 0, 1 elsewhere.
    pub fn site_rates(&self) -> Vec<f64> {
        let mut rates = vec![1.0; self.n];
        if let Some(first) = rates.first_mut() {
            *first = self.defect_rate();
        }
        rates
    }

    /// Number of particles placed at t = 0 (`floor(density * n)`).
    pub fn occupied_count(&self) -> usize {
        ((self.density * self.n as f64).floor() as usize).min(self.n)
    }
}
