//! Playback statistics.

use std::str::FromStr;

use serde::Serialize;

use crate::trace::{Step, StepKind};

/// A statistic exposed by [`Counters::get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    /// Occurrences of a step kind.
    Kind(StepKind),
    /// Lifetime cycle counter.
    Cycles,
}

impl FromStr for Stat {
    type Err = crate::trace::TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "cycles" {
            return Ok(Stat::Cycles);
        }
        s.parse().map(Stat::Kind)
    }
}

impl From<StepKind> for Stat {
    fn from(kind: StepKind) -> Self {
        Stat::Kind(kind)
    }
}

/// Per-kind occurrence counts and the lifetime cycle counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    counts: [u64; StepKind::COUNT],
    cycles: u64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `step` and charge its cost. Returns the cost.
    #[inline]
    pub fn record(&mut self, step: &Step) -> u64 {
        let cost = step.cost();
        self.counts[step.kind.ordinal()] += 1;
        self.cycles += cost;
        cost
    }

    /// Raw number of consumed steps of `kind`.
    pub fn raw(&self, kind: StepKind) -> u64 {
        self.counts[kind.ordinal()]
    }

    /// Reported value of `stat`.
    ///
    /// Swaps are reported as logical swaps: each one records two steps, so
    /// the raw count is halved.
    pub fn get(&self, stat: impl Into<Stat>) -> u64 {
        match stat.into() {
            Stat::Cycles => self.cycles,
            Stat::Kind(StepKind::Swap) => self.raw(StepKind::Swap) / 2,
            Stat::Kind(kind) => self.raw(kind),
        }
    }

    /// Lookup by name. Unknown names report zero.
    pub fn get_named(&self, name: &str) -> u64 {
        name.parse::<Stat>().map(|s| self.get(s)).unwrap_or(0)
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            start: self.get(StepKind::Start),
            cmp: self.get(StepKind::Cmp),
            swap: self.get(StepKind::Swap),
            copy: self.get(StepKind::Copy),
            set: self.get(StepKind::Set),
            cycles: self.cycles,
        }
    }
}

/// Serializable view of all reported statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub start: u64,
    pub cmp: u64,
    pub swap: u64,
    pub copy: u64,
    pub set: u64,
    pub cycles: u64,
}

impl std::fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} compares, {} swaps, {} copies, {} sets, {} cycles",
            self.cmp, self.swap, self.copy, self.set, self.cycles
        )
    }
}
