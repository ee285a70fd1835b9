// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Exclusion Process Simulation Suite - Transition Rules

use rand::Rng;

/// Maps a firing site to the site its particle attempts to jump to.
///
/// Implementations must return a value in `[0, n)` and must not look at the
/// lattice: the exclusion check belongs to the state machine.
pub trait TransitionRule {
    fn destination<R: Rng + ?Sized>(&mut self, site: usize, n: usize, rng: &mut R) -> usize;
}

/// Neighbour at signed offset `shift` on a ring of `n` sites.
pub fn ring_neighbor(site: usize, shift: isize, n: usize) -> usize {
    (site as isize + shift).rem_euclid(n as isize) as usize
}

// ─── Symmetric ───────────────────────────────────────────────────────────────

/// Fair coin between the left and right neighbour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SymmetricTransition;

impl TransitionRule for SymmetricTransition {
    fn destination<R: Rng + ?Sized>(&mut self, site: usize, n: usize, rng: &mut R) -> usize {
        let shift = if rng.gen_bool(0.5) { 1 } else { -1 };
        ring_neighbor(site, shift, n)
    }
}

// ─── Asymmetric ──────────────────────────────────────────────────────────────

/// Jumps right with probability `p_right`, left otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AsymmetricTransition {
    p_right: f64,
}

impl AsymmetricTransition {
    /// `p_right` is clamped into `[0, 1]`.
    pub fn new(p_right: f64) -> Self {
        Self { p_right: p_right.clamp(0.0, 1.0) }
    }

    pub fn p_right(&self) -> f64 {
        self.p_right
    }
}

impl TransitionRule for AsymmetricTransition {
    fn destination<R: Rng + ?Sized>(&mut self, site: usize, n: usize, rng: &mut R) -> usize {
        let shift = if rng.gen_bool(self.p_right) { 1 } else { -1 };
        ring_neighbor(site, shift, n)
    }
}
