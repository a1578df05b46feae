//! Initial array distributions.
//!
//! A [`Distribution`] is a named preset combining a [`ValuePolicy`] (how each
//! index is assigned its value) with an optional [`PermutationPolicy`] (how
//! values are shuffled afterwards).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Named initial-array preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Distribution {
    /// Ascending values, fully shuffled.
    #[default]
    Random,
    /// Ascending values, locally jittered.
    Similar,
    /// Already sorted.
    Ascending,
    /// Reverse sorted.
    Descending,
    /// Clustered values in runs of ten, fully shuffled.
    MostEqual,
    /// Every value identical.
    Equal,
}

impl Distribution {
    /// All presets, in selector order.
    pub const ALL: [Distribution; 6] = [
        Distribution::Random,
        Distribution::Similar,
        Distribution::Ascending,
        Distribution::Descending,
        Distribution::MostEqual,
        Distribution::Equal,
    ];

    /// Value-assignment policy for this preset.
    pub fn value_policy(self) -> ValuePolicy {
        match self {
            Distribution::Random | Distribution::Similar | Distribution::Ascending => {
                ValuePolicy::Ascending
            }
            Distribution::Descending => ValuePolicy::Descending,
            Distribution::MostEqual => ValuePolicy::Clustered,
            Distribution::Equal => ValuePolicy::Constant,
        }
    }

    /// Permutation applied after value assignment, if any.
    pub fn permutation_policy(self) -> Option<PermutationPolicy> {
        match self {
            Distribution::Random | Distribution::MostEqual => Some(PermutationPolicy::FullyRandom),
            Distribution::Similar => Some(PermutationPolicy::LocalJitter),
            Distribution::Ascending | Distribution::Descending | Distribution::Equal => None,
        }
    }

    /// Selector name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Distribution::Random => "random",
            Distribution::Similar => "similar",
            Distribution::Ascending => "ascending",
            Distribution::Descending => "descending",
            Distribution::MostEqual => "mostEqual",
            Distribution::Equal => "equal",
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Distribution {
    type Err = UnknownDistribution;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Distribution::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| UnknownDistribution(s.to_string()))
    }
}

/// Returned when a distribution selector name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown distribution '{0}' (expected one of random, similar, ascending, descending, mostEqual, equal)")]
pub struct UnknownDistribution(pub String);

/// How index `i` of an array of length `size` is assigned its initial value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValuePolicy {
    /// `i`
    Ascending,
    /// `size - 1 - i`
    Descending,
    /// `10 * (1 + floor(i / 10))`
    Clustered,
    /// `floor(size / 2)`
    Constant,
}

impl ValuePolicy {
    /// Value for index `i`.
    #[inline]
    pub fn value(self, i: usize, size: usize) -> i64 {
        let v = match self {
            ValuePolicy::Ascending => i,
            ValuePolicy::Descending => size - 1 - i,
            ValuePolicy::Clustered => 10 * (1 + i / 10),
            ValuePolicy::Constant => size / 2,
        };
        v as i64
    }

    /// Inclusive range every value produced for `size` falls into.
    ///
    /// Returns `None` for an empty array.
    pub fn range(self, size: usize) -> Option<(i64, i64)> {
        if size == 0 {
            return None;
        }
        let last = size - 1;
        Some(match self {
            ValuePolicy::Ascending | ValuePolicy::Descending => (0, last as i64),
            ValuePolicy::Clustered => (10, self.value(last, size)),
            ValuePolicy::Constant => {
                let v = self.value(0, size);
                (v, v)
            }
        })
    }
}

/// How index pairs are chosen for the post-assignment shuffle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermutationPolicy {
    /// Any index in `[0, size)`.
    FullyRandom,
    /// `i - 1 + {0, 1, 2}`, clamped to the array bounds.
    LocalJitter,
}
