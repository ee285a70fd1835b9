// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Exclusion Process Simulation Suite - Exponential Clocks

use rand::Rng;

/// Draw one Exponential(rate) variate by inverse transform.
///
/// `1 - U` lies in `(0, 1]`, so the logarithm is finite and the result is
/// never negative.
pub fn sample_exponential<R: Rng + ?Sized>(rng: &mut R, rate: f64) -> f64 {
    let u: f64 = rng.gen();
    -(1.0 - u).ln() / rate
}

/// Alarm clock attached to one site.
///
/// The rate is fixed at construction. `next_time` is `None` while the clock
/// is erased, which is exactly when its site is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialClock {
    rate: f64,
    next_time: Option<f64>,
}

impl ExponentialClock {
    pub fn new(rate: f64) -> Self {
        Self { rate, next_time: None }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Mean waiting time, the `1/rate` scale of the distribution.
    pub fn scale(&self) -> f64 {
        1.0 / self.rate
    }

    pub fn next_time(&self) -> Option<f64> {
        self.next_time
    }

    pub fn is_erased(&self) -> bool {
        self.next_time.is_none()
    }

    /// Arm the clock at `current_time + Exp(rate)` and return the firing time.
    pub fn next<R: Rng + ?Sized>(&mut self, current_time: f64, rng: &mut R) -> f64 {
        let t = current_time + sample_exponential(rng, self.rate);
        self.next_time = Some(t);
        t
    }

    pub fn erase(&mut self) {
        self.next_time = None;
    }
}
