// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Exclusion Process Simulation Suite - Lattice State Machine

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::clock::ExponentialClock;
use crate::config::SimulationConfig;
use crate::error::{ConfigError, QueueViolation, Result, TransitionViolation};
use crate::event_queue::EventQueue;
use crate::transition::{SymmetricTransition, TransitionRule};

// ─── Site ────────────────────────────────────────────────────────────────────

/// One ring position. Its clock is armed iff the site is occupied.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    occupied: bool,
    clock: ExponentialClock,
}

impl Site {
    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    pub fn clock(&self) -> &ExponentialClock {
        &self.clock
    }
}

// ─── Event Record ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The particle jumped to an empty destination.
    Moved,
    /// The destination was occupied; the firing clock was re-armed.
    Blocked,
}

/// What one call to [`LatticeState::process_next_event`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventRecord {
    pub site: usize,
    pub destination: usize,
    pub time: f64,
    pub outcome: Outcome,
}

// ─── Initial Placement ───────────────────────────────────────────────────────

/// `particles` occupied sites placed uniformly at random without replacement.
pub fn initial_occupancy<R: Rng + ?Sized>(n: usize, particles: usize, rng: &mut R) -> Vec<bool> {
    let particles = particles.min(n);
    let mut occupancy = vec![true; particles];
    occupancy.resize(n, false);
    occupancy.shuffle(rng);
    occupancy
}

// ─── LatticeState ────────────────────────────────────────────────────────────

/// Ring of `n` sites driven by per-site exponential clocks.
///
/// The state owns its random generator and lends it to the clocks and the
/// transition rule, so a fixed seed reproduces a run exactly.
#[derive(Debug)]
pub struct LatticeState<T = SymmetricTransition, R = ChaCha8Rng> {
    n: usize,
    sites: Vec<Site>,
    queue: EventQueue<usize>,
    current_time: f64,
    occupied: usize,
    rule: T,
    rng: R,
}

impl LatticeState {
    /// Symmetric exclusion process seeded from `config.seed`.
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        Self::from_config_with(
            config,
            SymmetricTransition,
            ChaCha8Rng::seed_from_u64(config.seed),
        )
    }
}

impl<T: TransitionRule, R: Rng> LatticeState<T, R> {
    /// Random initial placement at `config.density`, defect rate at site 0.
    pub fn from_config_with(config: &SimulationConfig, rule: T, mut rng: R) -> Result<Self> {
        config.validate()?;
        let occupancy = initial_occupancy(config.n, config.occupied_count(), &mut rng);
        Self::new(occupancy, config.site_rates(), rule, rng)
    }

    /// Build from an explicit occupancy vector and per-site rates, arming one
    /// clock per occupied site at t = 0.
    pub fn new(occupancy: Vec<bool>, rates: Vec<f64>, rule: T, mut rng: R) -> Result<Self> {
        let n = occupancy.len();
        if n == 0 {
            return Err(ConfigError::EmptyRing.into());
        }
        if rates.len() != n {
            return Err(ConfigError::LengthMismatch { occupancy: n, rates: rates.len() }.into());
        }
        if let Some((site, &rate)) = rates
            .iter()
            .enumerate()
            .find(|(_, r)| !(r.is_finite() && **r > 0.0))
        {
            return Err(ConfigError::NonPositiveRate { site, rate }.into());
        }

        let mut queue = EventQueue::with_capacity(n);
        let mut sites = Vec::with_capacity(n);
        for (idx, (occupied, rate)) in occupancy.into_iter().zip(rates).enumerate() {
            let mut clock = ExponentialClock::new(rate);
            if occupied {
                let t = clock.next(0.0, &mut rng);
                queue.add_or_update(idx, t);
            }
            sites.push(Site { occupied, clock });
        }
        let occupied = queue.len();

        debug!(
            n,
            particles = occupied,
            defect_rate = sites[0].clock.rate(),
            "lattice constructed"
        );

        Ok(Self {
            n,
            sites,
            queue,
            current_time: 0.0,
            occupied,
            rule,
            rng,
        })
    }

    /// Pop the globally earliest clock and apply its transition.
    ///
    /// A blocked jump still consumes the firing and re-arms the clock from
    /// the current time. Exactly one site's occupancy changes on a move.
    pub fn process_next_event(&mut self) -> Result<EventRecord> {
        let (site, time) = self
            .queue
            .pop_min()
            .ok_or(QueueViolation::NoPendingEvents { occupied: self.occupied })?;

        if time < self.current_time {
            return Err(QueueViolation::TimeRegression {
                current_time: self.current_time,
                event_time: time,
            }
            .into());
        }
        self.current_time = time;

        if !self.sites[site].occupied {
            return Err(QueueViolation::EmptySiteFired { site }.into());
        }

        let destination = self.rule.destination(site, self.n, &mut self.rng);
        if destination >= self.n {
            return Err(TransitionViolation::DestinationOutOfRange { destination, n: self.n }.into());
        }

        let outcome = if self.sites[destination].occupied {
            let next = self.sites[site].clock.next(time, &mut self.rng);
            self.queue.add_or_update(site, next);
            Outcome::Blocked
        } else {
            self.move_particle(site, destination)?;
            self.sites[site].clock.erase();
            self.queue.remove_key(site);
            let next = self.sites[destination].clock.next(time, &mut self.rng);
            self.queue.add_or_update(destination, next);
            Outcome::Moved
        };

        trace!(site, destination, time, ?outcome, "event processed");

        Ok(EventRecord { site, destination, time, outcome })
    }

    fn move_particle(&mut self, from: usize, to: usize) -> Result<()> {
        if self.sites[to].occupied {
            return Err(TransitionViolation::DestinationOccupied { from, to }.into());
        }
        if !self.sites[from].occupied {
            return Err(TransitionViolation::SourceEmpty { site: from }.into());
        }
        self.sites[from].occupied = false;
        self.sites[to].occupied = true;
        Ok(())
    }
}

impl<T, R> LatticeState<T, R> {
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Firing time of the next live event, without consuming it.
    pub fn next_event_time(&mut self) -> Option<f64> {
        self.queue.peek_min().map(|(_, t)| t)
    }

    pub fn is_occupied(&self, site: usize) -> bool {
        self.sites.get(site).is_some_and(Site::is_occupied)
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied
    }

    pub fn occupied_sites(&self) -> impl Iterator<Item = usize> + '_ {
        self.sites
            .iter()
            .enumerate()
            .filter(|(_, s)| s.occupied)
            .map(|(i, _)| i)
    }

    /// Armed firing time of the clock at `site`.
    pub fn clock_time(&self, site: usize) -> Option<f64> {
        self.sites.get(site).and_then(|s| s.clock.next_time())
    }

    pub fn rate(&self, site: usize) -> Option<f64> {
        self.sites.get(site).map(|s| s.clock.rate())
    }

    pub fn queue(&self) -> &EventQueue<usize> {
        &self.queue
    }

    pub fn rule(&self) -> &T {
        &self.rule
    }

    /// Read-only snapshot for observers.
    pub fn view(&self) -> LatticeView<'_> {
        LatticeView {
            sites: &self.sites,
            current_time: self.current_time,
            occupied: self.occupied,
        }
    }

    /// Check that the occupied sites, the armed clocks, and the live queue
    /// keys all coincide, and that particle count is conserved.
    pub fn verify_invariants(&self) -> Result<()> {
        let mut occupied = 0;
        for (idx, site) in self.sites.iter().enumerate() {
            let queued = self.queue.time_of(idx);
            if site.occupied {
                occupied += 1;
                if queued.is_none() || queued != site.clock.next_time() {
                    return Err(self.incoherent());
                }
            } else if queued.is_some() || !site.clock.is_erased() {
                return Err(self.incoherent());
            }
        }
        if occupied != self.occupied || self.queue.len() != occupied {
            return Err(self.incoherent());
        }
        Ok(())
    }

    fn incoherent(&self) -> crate::error::SimulationError {
        QueueViolation::Incoherent {
            occupied: self.occupied_sites().count(),
            queued: self.queue.len(),
        }
        .into()
    }
}

// ─── LatticeView ─────────────────────────────────────────────────────────────

/// Borrowed, immutable snapshot of a lattice at its current time.
#[derive(Debug, Clone, Copy)]
pub struct LatticeView<'a> {
    sites: &'a [Site],
    current_time: f64,
    occupied: usize,
}

impl<'a> LatticeView<'a> {
    pub fn n(&self) -> usize {
        self.sites.len()
    }

    /// Time of the last processed event.
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn is_occupied(&self, site: usize) -> bool {
        self.sites.get(site).is_some_and(Site::is_occupied)
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied
    }

    /// Occupied indices in increasing order.
    pub fn occupied_sites(&self) -> impl Iterator<Item = usize> + 'a {
        let sites: &'a [Site] = self.sites;
        sites
            .iter()
            .enumerate()
            .filter(|(_, s)| s.occupied)
            .map(|(i, _)| i)
    }

    pub fn occupancy(&self) -> Vec<bool> {
        self.sites.iter().map(Site::is_occupied).collect()
    }
}
