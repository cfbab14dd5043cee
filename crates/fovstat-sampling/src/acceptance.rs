//! Rejection sampling of windows
//!
//! [`AcceptanceSampler`] draws windows from a [`RandomWindowGenerator`]
//! until the requested number lie inside the domain. Rejected windows are
//! dropped. Accepted windows are numbered from 1 in acceptance order.
//!
//! Sampling always terminates: construction fails when no integer
//! orientation can fit inside the domain, and a run that exhausts its
//! attempt ceiling fails instead of looping.

use crate::error::{SamplingError, SamplingResult};
use crate::window::{MAX_ANGLE_DEG, RandomWindowGenerator, Window};
use rand::Rng;
use tracing::debug;

/// Default number of windows sampled per image.
pub const DEFAULT_RUN_COUNT: usize = 100;

/// Default ceiling on generated windows per image.
pub const DEFAULT_MAX_ATTEMPTS: u64 = 1_000_000;

/// Outcome of one sampling run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingStats {
    /// Windows that passed the containment check
    pub accepted: usize,
    /// Windows generated in total
    pub attempts: u64,
}

impl SamplingStats {
    /// Fraction of generated windows that were accepted
    pub fn acceptance_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.accepted as f64 / self.attempts as f64
        }
    }
}

/// Collects windows that lie fully inside the domain
#[derive(Debug, Clone)]
pub struct AcceptanceSampler {
    generator: RandomWindowGenerator,
    max_attempts: u64,
}

impl AcceptanceSampler {
    /// Create a sampler around `generator`.
    ///
    /// # Errors
    ///
    /// Returns [`SamplingError::Configuration`] if the window is not
    /// smaller than the domain in both axes, if no orientation in
    /// `0..=90` degrees fits, or if `max_attempts` is zero.
    pub fn new(generator: RandomWindowGenerator, max_attempts: u64) -> SamplingResult<Self> {
        check_feasible(&generator)?;
        if max_attempts == 0 {
            return Err(SamplingError::Configuration(
                "max_attempts must be positive".to_string(),
            ));
        }
        Ok(Self {
            generator,
            max_attempts,
        })
    }

    pub fn generator(&self) -> &RandomWindowGenerator {
        &self.generator
    }

    pub fn max_attempts(&self) -> u64 {
        self.max_attempts
    }

    /// Collect `count` accepted windows.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> SamplingResult<Vec<Window>> {
        let mut windows = Vec::with_capacity(count);
        self.sample_each(rng, count, |_, window| {
            windows.push(window);
            Ok(())
        })?;
        Ok(windows)
    }

    /// Collect `count` accepted windows, handing each to `on_accept` with
    /// its 1-based number as soon as it is found.
    ///
    /// An error from `on_accept` stops sampling and is returned.
    pub fn sample_each<R, F>(&self, rng: &mut R, count: usize, mut on_accept: F) -> SamplingResult<SamplingStats>
    where
        R: Rng + ?Sized,
        F: FnMut(usize, Window) -> SamplingResult<()>,
    {
        let mut stats = SamplingStats {
            accepted: 0,
            attempts: 0,
        };
        while stats.accepted < count {
            if stats.attempts >= self.max_attempts {
                return Err(SamplingError::Configuration(format!(
                    "only {} of {} windows accepted after {} attempts",
                    stats.accepted, count, stats.attempts
                )));
            }
            stats.attempts += 1;
            let window = self.generator.generate(rng);
            if window.contains_check() {
                stats.accepted += 1;
                on_accept(stats.accepted, window)?;
            }
        }

        debug!(
            accepted = stats.accepted,
            attempts = stats.attempts,
            rate = stats.acceptance_rate(),
            "sampling run finished"
        );
        Ok(stats)
    }
}

/// Check that windows from `generator` can ever be accepted.
pub fn check_feasible(generator: &RandomWindowGenerator) -> SamplingResult<()> {
    let domain = generator.domain();
    let (l, b) = (f64::from(generator.length()), f64::from(generator.breadth()));
    if l >= domain.width() || b >= domain.height() {
        return Err(SamplingError::Configuration(format!(
            "window {}x{} does not fit in domain {}x{}",
            generator.length(),
            generator.breadth(),
            domain.width(),
            domain.height()
        )));
    }
    if !(0..=MAX_ANGLE_DEG).any(|angle| generator.orientation_fits(angle)) {
        return Err(SamplingError::Configuration(format!(
            "no orientation of window {}x{} fits with safety margin {}",
            generator.length(),
            generator.breadth(),
            generator.safety_margin()
        )));
    }
    Ok(())
}
