//! Rule identifier generation

use crate::traits::IdGenerator;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::{Builder, Uuid};

/// Random UUID v4 identifiers from the operating system RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Reproducible UUID-shaped identifiers from a seeded ChaCha stream
#[derive(Debug)]
pub struct SeededIds {
    rng: ChaCha8Rng,
    seed: u64,
}

impl SeededIds {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Clone for SeededIds {
    fn clone(&self) -> Self {
        // Restart from the seed so a clone replays the same sequence
        Self::new(self.seed)
    }
}

impl IdGenerator for SeededIds {
    fn next_id(&mut self) -> String {
        let mut bytes = [0u8; 16];
        self.rng.fill_bytes(&mut bytes);
        Builder::from_random_bytes(bytes).into_uuid().to_string()
    }
}

/// Fresh identifier for rules decoded without one
pub(crate) fn fresh_id() -> String {
    RandomIds.next_id()
}
