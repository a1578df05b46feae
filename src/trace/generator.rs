//! Initial array generation.

use rand::Rng;

use super::step::{Step, StepKind};
use crate::schema::{Distribution, PermutationPolicy, ValuePolicy};

/// Build an initial array for `distribution`.
///
/// Returns the array and one `start` step per index carrying the final,
/// post-permutation value.
pub fn generate<R: Rng + ?Sized>(
    size: usize,
    distribution: Distribution,
    rng: &mut R,
) -> (Vec<i64>, Vec<Step>) {
    let array = build_array(
        size,
        distribution.value_policy(),
        distribution.permutation_policy(),
        rng,
    );

    let start = array
        .iter()
        .enumerate()
        .map(|(i, &v)| Step::new(i, v, StepKind::Start))
        .collect();

    (array, start)
}

fn build_array<R: Rng + ?Sized>(
    size: usize,
    values: ValuePolicy,
    permutation: Option<PermutationPolicy>,
    rng: &mut R,
) -> Vec<i64> {
    let mut array: Vec<i64> = (0..size).map(|i| values.value(i, size)).collect();

    if let Some(policy) = permutation {
        for i in 0..size {
            let a = pick_index(policy, i, size, rng);
            let b = pick_index(policy, i, size, rng);
            array.swap(a, b);
        }
    }

    array
}

/// Draw one index for permutation round `i`.
fn pick_index<R: Rng + ?Sized>(
    policy: PermutationPolicy,
    i: usize,
    size: usize,
    rng: &mut R,
) -> usize {
    match policy {
        PermutationPolicy::FullyRandom => rng.gen_range(0..size),
        PermutationPolicy::LocalJitter => {
            // i - 1 + {0, 1, 2}
            let offset = rng.gen_range(0..3usize);
            (i + offset).saturating_sub(1).min(size - 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_ascending_example() {
        let mut rng = StdRng::seed_from_u64(42);
        let (array, start) = generate(5, Distribution::Ascending, &mut rng);
        assert_eq!(array, vec![0, 1, 2, 3, 4]);
        let expected: Vec<Step> = (0..5)
            .map(|i| Step::new(i, i as i64, StepKind::Start))
            .collect();
        assert_eq!(start, expected);
    }

    #[test]
    fn test_descending_and_equal() {
        let mut rng = StdRng::seed_from_u64(42);
        let (array, _) = generate(4, Distribution::Descending, &mut rng);
        assert_eq!(array, vec![3, 2, 1, 0]);
        let (array, _) = generate(5, Distribution::Equal, &mut rng);
        assert_eq!(array, vec![2; 5]);
    }

    #[test]
    fn test_empty_and_single() {
        let mut rng = StdRng::seed_from_u64(7);
        for d in Distribution::ALL {
            let (array, start) = generate(0, d, &mut rng);
            assert!(array.is_empty());
            assert!(start.is_empty());

            let (array, start) = generate(1, d, &mut rng);
            assert_eq!(array.len(), 1);
            assert_eq!(start.len(), 1);
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = generate(64, Distribution::Random, &mut StdRng::seed_from_u64(9));
        let b = generate(64, Distribution::Random, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_jitter_stays_local() {
        // Each jitter swap moves a value at most two places per round, so a
        // large array stays close to sorted on average.
        let mut rng = StdRng::seed_from_u64(3);
        let (array, _) = generate(200, Distribution::Similar, &mut rng);
        let displacement: i64 = array
            .iter()
            .enumerate()
            .map(|(i, &v)| (v - i as i64).abs())
            .sum();
        assert!(displacement < 200 * 20, "displacement {displacement}");
    }

    proptest! {
        #[test]
        fn prop_start_steps_match_policy(
            size in 0usize..120,
            which in 0usize..6,
            seed in any::<u64>(),
        ) {
            let distribution = Distribution::ALL[which];
            let mut rng = StdRng::seed_from_u64(seed);
            let (array, start) = generate(size, distribution, &mut rng);

            prop_assert_eq!(start.len(), size);
            for (i, step) in start.iter().enumerate() {
                prop_assert_eq!(step.kind, StepKind::Start);
                prop_assert_eq!(step.index, i);
                prop_assert_eq!(step.value, array[i]);
            }

            if let Some((lo, hi)) = distribution.value_policy().range(size) {
                prop_assert!(array.iter().all(|v| (lo..=hi).contains(v)));
            }

            // Permutations only rearrange values.
            let mut expected: Vec<i64> = (0..size)
                .map(|i| distribution.value_policy().value(i, size))
                .collect();
            let mut actual = array.clone();
            expected.sort_unstable();
            actual.sort_unstable();
            prop_assert_eq!(expected, actual);
        }
    }
}
