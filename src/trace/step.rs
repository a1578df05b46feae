//! Step records and the frozen trace.

use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of elementary array operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    /// Baseline value emitted by the generator.
    Start,
    Cmp,
    Swap,
    Copy,
    Set,
}

impl StepKind {
    /// Number of step kinds.
    pub const COUNT: usize = 5;

    pub const ALL: [StepKind; Self::COUNT] = [
        StepKind::Start,
        StepKind::Cmp,
        StepKind::Swap,
        StepKind::Copy,
        StepKind::Set,
    ];

    /// Dense index into per-kind tables.
    #[inline]
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            StepKind::Start => "start",
            StepKind::Cmp => "cmp",
            StepKind::Swap => "swap",
            StepKind::Copy => "copy",
            StepKind::Set => "set",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StepKind {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StepKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| TraceError::UnknownStepKind(s.to_string()))
    }
}

/// Cycle cost per step kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostTable;

impl CostTable {
    const COSTS: [u64; StepKind::COUNT] = [0, 3, 6, 4, 2];

    /// Cycles charged for one step of `kind`.
    #[inline]
    pub const fn cost(kind: StepKind) -> u64 {
        Self::COSTS[kind.ordinal()]
    }
}

/// One recorded array operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub index: usize,
    pub value: i64,
    pub kind: StepKind,
}

impl Step {
    #[inline]
    pub const fn new(index: usize, value: i64, kind: StepKind) -> Self {
        Self { index, value, kind }
    }

    #[inline]
    pub const fn cost(&self) -> u64 {
        CostTable::cost(self.kind)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({},{})", self.kind, self.index, self.value)
    }
}

/// Loosely typed step, as received from outside the crate (e.g. JavaScript).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub index: usize,
    pub value: i64,
    #[serde(alias = "type")]
    pub kind: String,
}

/// Complete, immutable sequence of steps for one sort run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    steps: Vec<Step>,
}

impl Trace {
    pub(crate) fn from_steps(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Build a trace from untyped records, checking kinds and indices.
    ///
    /// The array size is taken from the `start` records; every record must
    /// address an index below it.
    pub fn from_records<I>(records: I) -> Result<Self, TraceError>
    where
        I: IntoIterator<Item = StepRecord>,
    {
        let steps = records
            .into_iter()
            .map(|r| Ok(Step::new(r.index, r.value, r.kind.parse()?)))
            .collect::<Result<Vec<_>, TraceError>>()?;

        let trace = Self { steps };
        trace.validate()?;
        Ok(trace)
    }

    /// Check that `start` steps cover every cell and that every step
    /// addresses one of them.
    pub fn validate(&self) -> Result<(), TraceError> {
        let size = self.cell_count();
        let starts = self.count(StepKind::Start);
        if starts < size {
            return Err(TraceError::MissingStart { cells: size, starts });
        }
        if let Some(bad) = self.steps.iter().find(|s| s.index >= size) {
            return Err(TraceError::IndexOutOfRange {
                index: bad.index,
                size,
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    pub fn get(&self, i: usize) -> Option<&Step> {
        self.steps.get(i)
    }

    /// Number of array cells described by the `start` steps.
    pub fn cell_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.kind == StepKind::Start)
            .map(|s| s.index.saturating_add(1))
            .max()
            .unwrap_or(0)
    }

    /// Sum of step costs over the whole trace.
    pub fn total_cycles(&self) -> u64 {
        self.steps.iter().map(Step::cost).sum()
    }

    /// Number of steps of `kind`.
    pub fn count(&self, kind: StepKind) -> usize {
        self.steps.iter().filter(|s| s.kind == kind).count()
    }
}

impl Index<usize> for Trace {
    type Output = Step;

    fn index(&self, i: usize) -> &Step {
        &self.steps[i]
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

/// Errors raised at the untyped trace boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TraceError {
    #[error("Unknown step type '{0}'")]
    UnknownStepKind(String),
    #[error("Step index {index} out of range for array of {size} cells")]
    IndexOutOfRange { index: usize, size: usize },
    #[error("Start steps cover {starts} of {cells} cells")]
    MissingStart { cells: usize, starts: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(index: usize, value: i64, kind: &str) -> StepRecord {
        StepRecord {
            index,
            value,
            kind: kind.to_string(),
        }
    }

    #[test]
    fn test_cost_table() {
        assert_eq!(CostTable::cost(StepKind::Start), 0);
        assert_eq!(CostTable::cost(StepKind::Cmp), 3);
        assert_eq!(CostTable::cost(StepKind::Swap), 6);
        assert_eq!(CostTable::cost(StepKind::Copy), 4);
        assert_eq!(CostTable::cost(StepKind::Set), 2);
    }

    #[test]
    fn test_kind_names_roundtrip() {
        for kind in StepKind::ALL {
            assert_eq!(kind.name().parse::<StepKind>().unwrap(), kind);
        }
        assert_eq!(
            "move".parse::<StepKind>(),
            Err(TraceError::UnknownStepKind("move".into()))
        );
    }

    #[test]
    fn test_from_records() {
        let trace = Trace::from_records(vec![
            record(0, 4, "start"),
            record(1, 2, "start"),
            record(0, 2, "swap"),
            record(1, 4, "swap"),
        ])
        .unwrap();

        assert_eq!(trace.len(), 4);
        assert_eq!(trace.cell_count(), 2);
        assert_eq!(trace[2], Step::new(0, 2, StepKind::Swap));
        assert_eq!(trace.total_cycles(), 12);
    }

    #[test]
    fn test_from_records_rejects_unknown_kind() {
        let err = Trace::from_records(vec![record(0, 1, "start"), record(0, 1, "poke")])
            .unwrap_err();
        assert_eq!(err, TraceError::UnknownStepKind("poke".into()));
    }

    #[test]
    fn test_from_records_rejects_out_of_range() {
        let err = Trace::from_records(vec![record(0, 1, "start"), record(3, 1, "set")])
            .unwrap_err();
        assert_eq!(err, TraceError::IndexOutOfRange { index: 3, size: 1 });
    }

    #[test]
    fn test_from_records_rejects_sparse_start() {
        let err = Trace::from_records(vec![record(usize::MAX - 1, 1, "start")]).unwrap_err();
        assert_eq!(
            err,
            TraceError::MissingStart {
                cells: usize::MAX,
                starts: 1
            }
        );
    }

    #[test]
    fn test_validate_recorded_steps() {
        let ok = Trace::from_steps(vec![
            Step::new(0, 1, StepKind::Start),
            Step::new(0, 3, StepKind::Set),
        ]);
        assert_eq!(ok.validate(), Ok(()));

        let grown = Trace::from_steps(vec![
            Step::new(0, 1, StepKind::Start),
            Step::new(1, 3, StepKind::Set),
        ]);
        assert_eq!(
            grown.validate(),
            Err(TraceError::IndexOutOfRange { index: 1, size: 1 })
        );
    }

    #[test]
    fn test_record_accepts_type_alias() {
        let r: StepRecord =
            serde_json::from_str(r#"{ "index": 2, "value": 7, "type": "cmp" }"#).unwrap();
        assert_eq!(r.kind, "cmp");
    }
}
