//! Synthetic price feed for the demo — a seeded random walk with mild
//! drift, so runs are reproducible per seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct PriceFeed {
    rng: StdRng,
    last: f64,
    drift: f64,
    volatility: f64,
}

impl PriceFeed {
    pub fn new(seed: u64, start: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            last: start,
            drift: 0.00005,
            volatility: 0.0025,
        }
    }

    pub fn last(&self) -> f64 {
        self.last
    }

    /// Next tick. The walk is multiplicative and floored well above zero
    /// so reference prices stay valid.
    pub fn next_tick(&mut self) -> f64 {
        let shock: f64 = self.rng.gen_range(-1.0..1.0);
        let step = self.drift + shock * self.volatility;
        self.last = (self.last * (1.0 + step)).max(0.01);
        self.last
    }
}
