use chrono::{Local, Timelike};
use rand::{rngs::StdRng, seq::SliceRandom, RngCore, SeedableRng};
use rand_distr::{Distribution, Uniform};

const BASE_SEED: u64 = 173_645_501;

pub struct Rand(StdRng);

impl Rand {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    /// Fixed base seed, advanced by one draw per second elapsed since
    /// local midnight.
    pub fn from_time() -> Self {
        let draws = Local::now().num_seconds_from_midnight();
        let mut rand = Self::new(BASE_SEED);
        rand.discard(u64::from(draws));
        rand
    }

    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    pub fn discard(&mut self, draws: u64) {
        for _ in 0..draws {
            self.0.next_u64();
        }
    }

    pub fn rng(&mut self) -> u64 {
        self.0.next_u64()
    }

    pub fn shuffle<T>(&mut self, values: &mut [T]) {
        values.shuffle(&mut self.0);
    }

    pub fn fill(&mut self, values: &mut [f32], scale: f32) {
        let dist = Uniform::new(-scale, scale);

        for value in values.iter_mut() {
            *value = dist.sample(&mut self.0);
        }
    }
}

impl Default for Rand {
    fn default() -> Self {
        Self::from_time()
    }
}
