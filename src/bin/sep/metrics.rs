// Occupation-Time Tracker
// Integrates per-site occupancy over simulated time

use exclusion_engine::{LatticeView, Observer};

/// Accumulates, for every site, the simulated time it spent occupied.
///
/// Occupancy is piecewise constant between reports, so each interval is
/// credited to the sites that were occupied at its left end. Integration
/// stops at `horizon`, so the event that crosses the stopping time adds
/// nothing past it.
pub struct OccupationTracker {
    occupied_time: Vec<f64>,
    last_positions: Vec<usize>,
    last_timestamp: f64,
    horizon: f64,
}

impl OccupationTracker {
    pub fn new(n: usize, horizon: f64) -> Self {
        Self {
            occupied_time: vec![0.0; n],
            last_positions: Vec::new(),
            last_timestamp: 0.0,
            horizon,
        }
    }

    /// Occupied fraction of the covered time for each site.
    pub fn profile(&self) -> Vec<f64> {
        if self.last_timestamp <= 0.0 {
            return vec![0.0; self.occupied_time.len()];
        }
        self.occupied_time
            .iter()
            .map(|t| t / self.last_timestamp)
            .collect()
    }
}

impl Observer for OccupationTracker {
    fn on_event(&mut self, view: &LatticeView<'_>, timestamp: f64) {
        let timestamp = timestamp.min(self.horizon);
        let dt = timestamp - self.last_timestamp;
        if dt > 0.0 {
            for &site in &self.last_positions {
                self.occupied_time[site] += dt;
            }
        }
        self.last_positions.clear();
        self.last_positions.extend(view.occupied_sites());
        self.last_timestamp = self.last_timestamp.max(timestamp);
    }
}

/// Mean of `profile` over every site except site 0.
pub fn bulk_mean(profile: &[f64]) -> f64 {
    match profile.get(1..) {
        Some(rest) if !rest.is_empty() => rest.iter().sum::<f64>() / rest.len() as f64,
        _ => 0.0,
    }
}
