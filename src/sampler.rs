/*
 * Sampler Module
 *
 * Initial conditions for a population reset. A sampler produces one vector
 * per call; the flock asks for one position and one velocity per agent.
 *
 * Any `FnMut() -> Vector2` closure is a sampler, which keeps hand-placed
 * test populations short.
 */

use std::ops::Range;

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::Domain;
use crate::error::SwarmError;
use crate::vector::Vector2;

// Inset used to keep sampled positions strictly away from the domain walls
const INTERIOR_INSET: f32 = 1e-3;

pub trait Sampler {
    fn sample(&mut self) -> Vector2;
}

impl<F> Sampler for F
where
    F: FnMut() -> Vector2,
{
    fn sample(&mut self) -> Vector2 {
        self()
    }
}

// Uniform sampling over an axis-aligned rectangle. Every instance owns its
// own generator so two collections can be reset concurrently.
pub struct UniformSampler {
    x: Uniform<f32>,
    y: Uniform<f32>,
    rng: StdRng,
}

impl UniformSampler {
    pub fn new(x: Range<f32>, y: Range<f32>) -> Result<Self, SwarmError> {
        Self::with_rng(x, y, StdRng::from_entropy())
    }

    // Same as `new` but reproducible
    pub fn seeded(x: Range<f32>, y: Range<f32>, seed: u64) -> Result<Self, SwarmError> {
        Self::with_rng(x, y, StdRng::seed_from_u64(seed))
    }

    // Same range on both axes
    pub fn square(low: f32, high: f32) -> Result<Self, SwarmError> {
        Self::new(low..high, low..high)
    }

    // The whole domain, inset slightly from its walls
    pub fn domain_interior(domain: &Domain) -> Result<Self, SwarmError> {
        let range = Self::interior_range(domain);
        Self::new(range.clone(), range)
    }

    pub fn domain_interior_seeded(domain: &Domain, seed: u64) -> Result<Self, SwarmError> {
        let range = Self::interior_range(domain);
        Self::seeded(range.clone(), range, seed)
    }

    fn interior_range(domain: &Domain) -> Range<f32> {
        let inset = INTERIOR_INSET.min(domain.span() * 0.25);
        inset..domain.span() - inset
    }

    fn with_rng(x: Range<f32>, y: Range<f32>, rng: StdRng) -> Result<Self, SwarmError> {
        Ok(Self {
            x: Self::axis("x", x)?,
            y: Self::axis("y", y)?,
            rng,
        })
    }

    // Uniform::new panics on empty ranges, so check first
    fn axis(axis: &'static str, range: Range<f32>) -> Result<Uniform<f32>, SwarmError> {
        if !range.start.is_finite() || !range.end.is_finite() || range.start >= range.end {
            return Err(SwarmError::InvalidRange {
                axis,
                low: range.start,
                high: range.end,
            });
        }
        Ok(Uniform::new(range.start, range.end))
    }
}

impl Sampler for UniformSampler {
    fn sample(&mut self) -> Vector2 {
        Vector2::new(self.x.sample(&mut self.rng), self.y.sample(&mut self.rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_stay_inside_their_ranges() {
        let mut sampler = UniformSampler::new(2.0..3.0, -10.0..-5.0).unwrap();
        for _ in 0..1000 {
            let v = sampler.sample();
            assert!((2.0..3.0).contains(&v.x), "x out of range: {v}");
            assert!((-10.0..-5.0).contains(&v.y), "y out of range: {v}");
        }
    }

    #[test]
    fn seeded_samplers_repeat() {
        let mut a = UniformSampler::seeded(0.0..1.0, 0.0..1.0, 42).unwrap();
        let mut b = UniformSampler::seeded(0.0..1.0, 0.0..1.0, 42).unwrap();
        for _ in 0..16 {
            assert_eq!(a.sample(), b.sample());
        }
    }

    #[test]
    fn domain_interior_is_inside_the_domain() {
        let domain = Domain::new(4.0).unwrap();
        let mut sampler = UniformSampler::domain_interior(&domain).unwrap();
        for _ in 0..1000 {
            assert!(domain.contains(sampler.sample()));
        }
    }

    #[test]
    fn empty_ranges_are_rejected() {
        assert!(matches!(
            UniformSampler::new(1.0..1.0, 0.0..1.0),
            Err(SwarmError::InvalidRange { axis: "x", .. })
        ));
        assert!(matches!(
            UniformSampler::new(0.0..1.0, 5.0..2.0),
            Err(SwarmError::InvalidRange { axis: "y", .. })
        ));
        assert!(UniformSampler::square(0.0, f32::NAN).is_err());
    }

    #[test]
    fn closures_are_samplers() {
        let mut next = 0.0;
        let mut counter = || {
            next += 1.0;
            Vector2::new(next, -next)
        };
        let sampler: &mut dyn Sampler = &mut counter;
        assert_eq!(sampler.sample(), Vector2::new(1.0, -1.0));
        assert_eq!(sampler.sample(), Vector2::new(2.0, -2.0));
    }
}
