//! Random index source used to shuffle place candidates.

use rand::Rng;

/// Source of uniformly distributed indices.
pub trait RandomSource: Send + Sync {
    /// Uniform index in `0..=upper`.
    fn index_up_to(&self, upper: usize) -> usize;
}

/// Thread-local RNG from `rand`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn index_up_to(&self, upper: usize) -> usize {
        rand::thread_rng().gen_range(0..=upper)
    }
}

/// Fisher–Yates shuffle. Every permutation is equally likely given a uniform source.
pub fn shuffle<T>(items: &mut [T], rng: &dyn RandomSource) {
    for i in (1..items.len()).rev() {
        let j = rng.index_up_to(i);
        items.swap(i, j);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::RandomSource;
    use std::sync::Mutex;

    /// Replays a fixed list of indices; `0` once exhausted.
    pub struct ScriptedRandom(Mutex<Vec<usize>>);

    impl ScriptedRandom {
        pub fn new(mut indices: Vec<usize>) -> Self {
            indices.reverse();
            Self(Mutex::new(indices))
        }
    }

    impl RandomSource for ScriptedRandom {
        fn index_up_to(&self, upper: usize) -> usize {
            let next = self.0.lock().unwrap().pop().unwrap_or(0);
            assert!(next <= upper, "scripted index {next} out of range 0..={upper}");
            next
        }
    }

    /// Always picks the current position, leaving the order untouched.
    pub struct IdentityRandom;

    impl RandomSource for IdentityRandom {
        fn index_up_to(&self, upper: usize) -> usize {
            upper
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{IdentityRandom, ScriptedRandom};
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_scripted_shuffle_is_exact() {
        let mut items = vec!['a', 'b', 'c', 'd'];
        // i=3 swaps with 0, i=2 with 2, i=1 with 0
        shuffle(&mut items, &ScriptedRandom::new(vec![0, 2, 0]));
        assert_eq!(items, vec!['b', 'd', 'c', 'a']);
    }

    #[test]
    fn test_identity_source_keeps_order() {
        let mut items = vec![1, 2, 3, 4, 5];
        shuffle(&mut items, &IdentityRandom);
        assert_eq!(items, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_short_slices() {
        let mut empty: Vec<u8> = Vec::new();
        shuffle(&mut empty, &ThreadRandom);
        let mut one = vec![7];
        shuffle(&mut one, &ThreadRandom);
        assert_eq!(one, vec![7]);
    }

    #[test]
    fn test_thread_random_covers_all_permutations() {
        let mut seen: HashMap<Vec<u8>, usize> = HashMap::new();
        for _ in 0..3000 {
            let mut items = vec![1u8, 2, 3];
            shuffle(&mut items, &ThreadRandom);
            *seen.entry(items).or_default() += 1;
        }
        assert_eq!(seen.len(), 6);
        // 500 expected each; a fair shuffle stays far from these bounds
        assert!(seen.values().all(|&n| n > 350 && n < 650));
    }
}
