//! Instrumented array operations.
//!
//! [`Recorder`] is the only sanctioned way a sort driver inspects or mutates
//! its array. Every operation performs the change and appends the matching
//! [`Step`]s to the trace being built.

use std::cmp::Ordering;

use rand::Rng;

use super::generator::generate;
use super::step::{Step, StepKind, Trace};
use crate::schema::Distribution;

/// Backing storage the instrumented operations act on.
pub trait ArrayStore {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self, index: usize) -> i64;

    fn write(&mut self, index: usize, value: i64);

    fn exchange(&mut self, a: usize, b: usize) {
        let t = self.read(a);
        let v = self.read(b);
        self.write(a, v);
        self.write(b, t);
    }
}

impl ArrayStore for [i64] {
    fn len(&self) -> usize {
        <[i64]>::len(self)
    }

    fn read(&self, index: usize) -> i64 {
        self[index]
    }

    fn write(&mut self, index: usize, value: i64) {
        self[index] = value;
    }

    fn exchange(&mut self, a: usize, b: usize) {
        self.swap(a, b);
    }
}

impl ArrayStore for Vec<i64> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn read(&self, index: usize) -> i64 {
        self[index]
    }

    fn write(&mut self, index: usize, value: i64) {
        self[index] = value;
    }

    fn exchange(&mut self, a: usize, b: usize) {
        self.swap(a, b);
    }
}

/// Append-only step log for one sort run.
#[derive(Debug, Default)]
pub struct Recorder {
    steps: Vec<Step>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps recorded so far.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Freeze the log into a trace.
    pub fn finish(self) -> Trace {
        Trace::from_steps(self.steps)
    }

    #[inline]
    fn push(&mut self, index: usize, value: i64, kind: StepKind) {
        self.steps.push(Step::new(index, value, kind));
    }

    /// Emit one `start` step per element, in index order.
    pub fn record_start<A: ArrayStore + ?Sized>(&mut self, array: &A) {
        self.steps.reserve(array.len());
        for i in 0..array.len() {
            self.push(i, array.read(i), StepKind::Start);
        }
    }

    /// Compare `array[index]` against `value`.
    ///
    /// Returns `array[index] - value`, saturated to the `i64` range so the
    /// sign is always right. The recorded step carries the value stored at
    /// `index`, not the argument.
    pub fn compare<A: ArrayStore + ?Sized>(&mut self, array: &A, index: usize, value: i64) -> i64 {
        let current = array.read(index);
        self.push(index, current, StepKind::Cmp);
        current.saturating_sub(value)
    }

    /// Sign of [`compare`](Self::compare) as an [`Ordering`].
    pub fn order<A: ArrayStore + ?Sized>(&mut self, array: &A, index: usize, value: i64) -> Ordering {
        self.compare(array, index, value).cmp(&0)
    }

    pub fn gt<A: ArrayStore + ?Sized>(&mut self, array: &A, index: usize, value: i64) -> bool {
        self.order(array, index, value).is_gt()
    }

    pub fn lt<A: ArrayStore + ?Sized>(&mut self, array: &A, index: usize, value: i64) -> bool {
        self.order(array, index, value).is_lt()
    }

    pub fn ge<A: ArrayStore + ?Sized>(&mut self, array: &A, index: usize, value: i64) -> bool {
        self.order(array, index, value).is_ge()
    }

    pub fn le<A: ArrayStore + ?Sized>(&mut self, array: &A, index: usize, value: i64) -> bool {
        self.order(array, index, value).is_le()
    }

    pub fn eq<A: ArrayStore + ?Sized>(&mut self, array: &A, index: usize, value: i64) -> bool {
        self.order(array, index, value).is_eq()
    }

    pub fn ne<A: ArrayStore + ?Sized>(&mut self, array: &A, index: usize, value: i64) -> bool {
        self.order(array, index, value).is_ne()
    }

    /// Exchange `array[a]` and `array[b]`.
    ///
    /// Always records two steps, one per index with its post-swap value,
    /// even when `a == b`.
    pub fn swap<A: ArrayStore + ?Sized>(&mut self, array: &mut A, a: usize, b: usize) {
        array.exchange(a, b);
        self.push(a, array.read(a), StepKind::Swap);
        self.push(b, array.read(b), StepKind::Swap);
    }

    /// `array[dst] = array[src]`
    pub fn copy<A: ArrayStore + ?Sized>(&mut self, array: &mut A, src: usize, dst: usize) {
        let v = array.read(src);
        array.write(dst, v);
        self.push(dst, v, StepKind::Copy);
    }

    /// `array[index] = value`
    pub fn set<A: ArrayStore + ?Sized>(&mut self, array: &mut A, index: usize, value: i64) {
        array.write(index, value);
        self.push(index, value, StepKind::Set);
    }
}

/// A sorting algorithm that works through a [`Recorder`].
///
/// Drivers run synchronously to completion. Touching `array` other than
/// through the recorder produces a trace that no longer matches the array.
pub trait SortDriver {
    fn sort(&self, array: &mut [i64], recorder: &mut Recorder);
}

impl<F> SortDriver for F
where
    F: Fn(&mut [i64], &mut Recorder),
{
    fn sort(&self, array: &mut [i64], recorder: &mut Recorder) {
        self(array, recorder)
    }
}

/// Generate an array, run `driver` over it and return the finished trace.
pub fn record<R, D>(size: usize, distribution: Distribution, rng: &mut R, driver: &D) -> Trace
where
    R: Rng + ?Sized,
    D: SortDriver + ?Sized,
{
    let (mut array, start) = generate(size, distribution, rng);
    let mut recorder = Recorder {
        steps: start,
    };
    driver.sort(&mut array, &mut recorder);
    log::debug!(
        "Recorded {} steps for {} elements ({})",
        recorder.len(),
        size,
        distribution
    );
    recorder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn kinds(recorder: &Recorder) -> Vec<StepKind> {
        recorder.steps().iter().map(|s| s.kind).collect()
    }

    #[test]
    fn test_compare_records_current_value() {
        let array = vec![5, 9];
        let mut rec = Recorder::new();
        assert_eq!(rec.compare(&array, 1, 4), 5);
        assert_eq!(rec.steps(), &[Step::new(1, 9, StepKind::Cmp)]);
    }

    #[test]
    fn test_compare_extreme_values_keeps_sign() {
        let mut array = vec![0, i64::MAX];
        let mut rec = Recorder::new();
        rec.set(array.as_mut_slice(), 0, i64::MIN);

        assert!(rec.lt(&array, 0, 1));
        assert!(!rec.ge(&array, 0, i64::MAX));
        assert_eq!(rec.compare(&array, 0, i64::MAX), i64::MIN);
        assert!(rec.gt(&array, 1, i64::MIN));
        assert_eq!(rec.compare(&array, 1, -1), i64::MAX);
        assert_eq!(rec.compare(&array, 1, 5), i64::MAX - 5);
        assert_eq!(rec.len(), 7);
    }

    #[test]
    fn test_predicates_record_one_step_each() {
        let array = vec![3];
        let mut rec = Recorder::new();
        assert!(rec.gt(&array, 0, 2));
        assert!(rec.lt(&array, 0, 4));
        assert!(rec.ge(&array, 0, 3));
        assert!(rec.le(&array, 0, 3));
        assert!(rec.eq(&array, 0, 3));
        assert!(rec.ne(&array, 0, 1));
        assert_eq!(rec.len(), 6);
        assert!(kinds(&rec).iter().all(|k| *k == StepKind::Cmp));
    }

    #[test]
    fn test_swap_records_post_swap_values() {
        let mut array = vec![0, 1];
        let mut rec = Recorder::new();
        rec.swap(&mut array, 0, 1);
        assert_eq!(array, vec![1, 0]);
        assert_eq!(
            rec.steps(),
            &[
                Step::new(0, 1, StepKind::Swap),
                Step::new(1, 0, StepKind::Swap)
            ]
        );
    }

    #[test]
    fn test_swap_same_index_records_two_steps() {
        let mut array = vec![7, 8, 9];
        let mut rec = Recorder::new();
        rec.swap(&mut array, 1, 1);
        assert_eq!(array, vec![7, 8, 9]);
        assert_eq!(
            rec.steps(),
            &[
                Step::new(1, 8, StepKind::Swap),
                Step::new(1, 8, StepKind::Swap)
            ]
        );
    }

    #[test]
    fn test_copy_and_set() {
        let mut array = vec![1, 2, 3];
        let mut rec = Recorder::new();
        rec.copy(&mut array, 2, 0);
        rec.set(array.as_mut_slice(), 1, 42);
        assert_eq!(array, vec![3, 42, 3]);
        assert_eq!(
            rec.steps(),
            &[
                Step::new(0, 3, StepKind::Copy),
                Step::new(1, 42, StepKind::Set)
            ]
        );
    }

    #[test]
    fn test_trace_follows_call_order() {
        let driver = |a: &mut [i64], r: &mut Recorder| {
            r.compare(a, 0, 0);
            r.swap(a, 0, 1);
            r.copy(a, 1, 2);
            r.set(a, 0, 9);
            r.lt(a, 2, 100);
        };
        let mut rng = StdRng::seed_from_u64(1);
        let trace = record(3, Distribution::Ascending, &mut rng, &driver);

        let expected = vec![
            Step::new(0, 0, StepKind::Start),
            Step::new(1, 1, StepKind::Start),
            Step::new(2, 2, StepKind::Start),
            Step::new(0, 0, StepKind::Cmp),
            Step::new(0, 1, StepKind::Swap),
            Step::new(1, 0, StepKind::Swap),
            Step::new(2, 0, StepKind::Copy),
            Step::new(0, 9, StepKind::Set),
            Step::new(2, 0, StepKind::Cmp),
        ];
        assert_eq!(trace.steps(), expected.as_slice());
    }

    #[test]
    fn test_single_swap_example() {
        let driver = |a: &mut [i64], r: &mut Recorder| r.swap(a, 0, 1);
        let mut rng = StdRng::seed_from_u64(0);
        let trace = record(2, Distribution::Ascending, &mut rng, &driver);
        let rendered: Vec<String> = trace.iter().map(|s| s.to_string()).collect();
        assert_eq!(
            rendered,
            vec!["start(0,0)", "start(1,1)", "swap(0,1)", "swap(1,0)"]
        );
    }

    proptest! {
        #[test]
        fn prop_swap_always_two_steps(
            values in proptest::collection::vec(-100i64..100, 1..20),
            picks in proptest::collection::vec((0usize..20, 0usize..20), 0..30),
        ) {
            let mut array = values.clone();
            let n = array.len();
            let mut rec = Recorder::new();
            for (i, &(a, b)) in picks.iter().enumerate() {
                let (a, b) = (a % n, b % n);
                rec.swap(&mut array, a, b);
                let steps = &rec.steps()[i * 2..i * 2 + 2];
                prop_assert_eq!(steps[0], Step::new(a, array[a], StepKind::Swap));
                prop_assert_eq!(steps[1], Step::new(b, array[b], StepKind::Swap));
            }
            prop_assert_eq!(rec.len(), picks.len() * 2);

            let mut sorted_before = values;
            let mut sorted_after = array;
            sorted_before.sort_unstable();
            sorted_after.sort_unstable();
            prop_assert_eq!(sorted_before, sorted_after);
        }
    }
}
