use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Every random decision of a session goes through this wrapper so a seed reproduces a game.
pub struct SessionRng {
    rng: StdRng,
    seed: u64,
}

impl SessionRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn from_random() -> Self {
        let seed: u64 = rand::rng().random();
        Self::new(seed)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn random_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distr::uniform::SampleUniform,
        R: rand::distr::uniform::SampleRange<T>,
    {
        self.rng.random_range(range)
    }

    /// Bernoulli draw. Probabilities outside `[0, 1]` (or NaN) never succeed.
    pub fn chance(&mut self, probability: f64) -> bool {
        if !(0.0..=1.0).contains(&probability) {
            return false;
        }
        self.rng.random_bool(probability)
    }

    /// Index drawn with probability proportional to its weight, `None` when all weights are zero.
    pub fn pick_weighted(&mut self, weights: &[u32]) -> Option<usize> {
        let total: u64 = weights.iter().map(|&w| w as u64).sum();
        if total == 0 {
            return None;
        }

        let mut roll = self.rng.random_range(0..total);
        for (index, &weight) in weights.iter().enumerate() {
            let weight = weight as u64;
            if roll < weight {
                return Some(index);
            }
            roll -= weight;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SessionRng::new(7);
        let mut b = SessionRng::new(7);
        for _ in 0..20 {
            assert_eq!(a.random_range(0..100u32), b.random_range(0..100u32));
        }
        assert_eq!(a.seed(), 7);
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = SessionRng::new(42);
        assert!(!rng.chance(0.0));
        assert!(rng.chance(1.0));
        assert!(!rng.chance(f64::NAN));
        assert!(!rng.chance(1.5));
    }

    #[test]
    fn test_pick_weighted_skips_zero_weights() {
        let mut rng = SessionRng::new(42);
        for _ in 0..200 {
            let index = rng.pick_weighted(&[0, 5, 0, 1]).unwrap();
            assert!(index == 1 || index == 3);
        }
        assert_eq!(rng.pick_weighted(&[0, 0]), None);
        assert_eq!(rng.pick_weighted(&[]), None);
    }

    #[test]
    fn test_pick_weighted_roughly_proportional() {
        let mut rng = SessionRng::new(42);
        let mut counts = [0u32; 2];
        for _ in 0..4000 {
            counts[rng.pick_weighted(&[3, 1]).unwrap()] += 1;
        }
        assert!(counts[0] > counts[1] * 2);
    }
}
