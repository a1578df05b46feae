//! Reference sort drivers.
//!
//! Plain sorting algorithms written purely against [`Recorder`]. They give
//! the CLI and benches something to record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::recorder::{Recorder, SortDriver};

/// Built-in sorting algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Bubble,
    Insertion,
    Selection,
    #[default]
    Quick,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Bubble,
        Algorithm::Insertion,
        Algorithm::Selection,
        Algorithm::Quick,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Bubble => "bubble",
            Algorithm::Insertion => "insertion",
            Algorithm::Selection => "selection",
            Algorithm::Quick => "quick",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| format!("Unknown algorithm '{s}'"))
    }
}

impl SortDriver for Algorithm {
    fn sort(&self, array: &mut [i64], recorder: &mut Recorder) {
        match self {
            Algorithm::Bubble => bubble_sort(array, recorder),
            Algorithm::Insertion => insertion_sort(array, recorder),
            Algorithm::Selection => selection_sort(array, recorder),
            Algorithm::Quick => {
                if !array.is_empty() {
                    let hi = array.len() - 1;
                    quick_sort(array, recorder, 0, hi);
                }
            }
        }
    }
}

pub fn bubble_sort(a: &mut [i64], r: &mut Recorder) {
    let n = a.len();
    for end in (1..n).rev() {
        let mut swapped = false;
        for i in 0..end {
            if r.gt(a, i, a[i + 1]) {
                r.swap(a, i, i + 1);
                swapped = true;
            }
        }
        if !swapped {
            break;
        }
    }
}

/// Shifts with `copy` and drops the held value with `set`.
pub fn insertion_sort(a: &mut [i64], r: &mut Recorder) {
    for i in 1..a.len() {
        let held = a[i];
        let mut j = i;
        while j > 0 && r.gt(a, j - 1, held) {
            r.copy(a, j - 1, j);
            j -= 1;
        }
        if j != i {
            r.set(a, j, held);
        }
    }
}

pub fn selection_sort(a: &mut [i64], r: &mut Recorder) {
    let n = a.len();
    for i in 0..n.saturating_sub(1) {
        let mut min = i;
        for j in i + 1..n {
            if r.lt(a, j, a[min]) {
                min = j;
            }
        }
        if min != i {
            r.swap(a, i, min);
        }
    }
}

/// Lomuto partitioning around the last element.
pub fn quick_sort(a: &mut [i64], r: &mut Recorder, lo: usize, hi: usize) {
    if lo >= hi {
        return;
    }
    let pivot = a[hi];
    let mut store = lo;
    for i in lo..hi {
        if r.lt(a, i, pivot) {
            r.swap(a, i, store);
            store += 1;
        }
    }
    r.swap(a, store, hi);

    if store > lo {
        quick_sort(a, r, lo, store - 1);
    }
    quick_sort(a, r, store + 1, hi);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Distribution;
    use crate::trace::{StepKind, record};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sorted_by(algorithm: Algorithm, input: &[i64]) -> (Vec<i64>, Recorder) {
        let mut a = input.to_vec();
        let mut r = Recorder::new();
        algorithm.sort(&mut a, &mut r);
        (a, r)
    }

    #[test]
    fn test_all_algorithms_sort() {
        let input = [5, 3, 9, 1, 1, 0, 7, 3, 8, 2];
        let mut expected = input.to_vec();
        expected.sort_unstable();
        for algorithm in Algorithm::ALL {
            let (a, r) = sorted_by(algorithm, &input);
            assert_eq!(a, expected, "{algorithm} failed");
            assert!(!r.is_empty());
        }
    }

    #[test]
    fn test_trivial_inputs() {
        for algorithm in Algorithm::ALL {
            let (a, r) = sorted_by(algorithm, &[]);
            assert!(a.is_empty());
            assert!(r.is_empty());

            let (a, _) = sorted_by(algorithm, &[4]);
            assert_eq!(a, vec![4]);
        }
    }

    #[test]
    fn test_insertion_uses_copy_and_set() {
        let (_, r) = sorted_by(Algorithm::Insertion, &[3, 2, 1]);
        let kinds: Vec<StepKind> = r.steps().iter().map(|s| s.kind).collect();
        assert!(kinds.contains(&StepKind::Copy));
        assert!(kinds.contains(&StepKind::Set));
        assert!(!kinds.contains(&StepKind::Swap));
    }

    #[test]
    fn test_replaying_trace_rebuilds_sorted_array() {
        // Applying every recorded write in order must reproduce the final array.
        for algorithm in Algorithm::ALL {
            for distribution in Distribution::ALL {
                let mut rng = StdRng::seed_from_u64(11);
                let trace = record(40, distribution, &mut rng, &algorithm);
                let mut cells = vec![0i64; trace.cell_count()];
                for step in &trace {
                    if step.kind != StepKind::Cmp {
                        cells[step.index] = step.value;
                    }
                }
                assert!(
                    cells.windows(2).all(|w| w[0] <= w[1]),
                    "{algorithm} on {distribution} did not replay sorted"
                );
            }
        }
    }

    #[test]
    fn test_parse_algorithm() {
        assert_eq!("bubble".parse::<Algorithm>().unwrap(), Algorithm::Bubble);
        assert!("bogo".parse::<Algorithm>().is_err());
    }
}
