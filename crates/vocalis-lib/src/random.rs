//! Injectable integer source for the lucky-number segment.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces integers in `[0, bound)`.
pub trait NumberSource: Send + Sync {
    fn below(&self, bound: u32) -> u32;
}

/// Thread-local RNG. Used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl NumberSource for ThreadRandom {
    fn below(&self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        rand::thread_rng().gen_range(0..bound)
    }
}

/// Deterministic source for tests and reproducible runs.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl NumberSource for SeededRandom {
    fn below(&self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.rng
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .gen_range(0..bound)
    }
}
