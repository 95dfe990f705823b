//! Price generators driving the mock feeds

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the next price a feed emits
pub trait PriceGenerator {
    fn next_price(&mut self) -> f64;
}

/// Always emits the same price
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantPrice(pub f64);

impl PriceGenerator for ConstantPrice {
    fn next_price(&mut self) -> f64 {
        self.0
    }
}

/// Emits prices drawn uniformly from `[min, max)`
#[derive(Debug, Clone)]
pub struct RandomPrice {
    min: f64,
    max: f64,
    rng: StdRng,
}

impl RandomPrice {
    pub fn new(min: f64, max: f64) -> Self {
        Self::with_rng(min, max, StdRng::from_os_rng())
    }

    /// Deterministic sequence, for reproducible runs
    pub fn seeded(min: f64, max: f64, seed: u64) -> Self {
        Self::with_rng(min, max, StdRng::seed_from_u64(seed))
    }

    fn with_rng(min: f64, max: f64, rng: StdRng) -> Self {
        Self { min, max, rng }
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }
}

impl PriceGenerator for RandomPrice {
    fn next_price(&mut self) -> f64 {
        if self.max > self.min {
            self.rng.random_range(self.min..self.max)
        } else {
            self.min
        }
    }
}

impl<G: PriceGenerator + ?Sized> PriceGenerator for Box<G> {
    fn next_price(&mut self) -> f64 {
        (**self).next_price()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_price() {
        let mut generator = ConstantPrice(100.0);
        assert_eq!(generator.next_price(), 100.0);
        assert_eq!(generator.next_price(), 100.0);
    }

    #[test]
    fn test_random_price_in_bounds() {
        let mut generator = RandomPrice::seeded(98.0, 102.0, 7);
        for _ in 0..1000 {
            let price = generator.next_price();
            assert!((98.0..102.0).contains(&price), "price {} out of bounds", price);
        }
    }

    #[test]
    fn test_random_price_seeded_is_reproducible() {
        let mut a = RandomPrice::seeded(1.0, 2.0, 42);
        let mut b = RandomPrice::seeded(1.0, 2.0, 42);
        assert_eq!(a.next_price(), b.next_price());
    }

    #[test]
    fn test_random_price_degenerate_bounds() {
        let mut generator = RandomPrice::seeded(5.0, 5.0, 1);
        assert_eq!(generator.next_price(), 5.0);
    }
}
