//! Step recording for sort runs.
//!
//! A sort run produces a [`Trace`]: the ordered list of every elementary
//! operation the algorithm performed on its array.
//!
//! # Overview
//!
//! - **Generator** (`generator`): builds the initial array for a
//!   [`Distribution`](crate::schema::Distribution) and emits one `start`
//!   step per element
//! - **Recorder** (`recorder`): the instrumented `compare`/`swap`/`copy`/`set`
//!   operations and the [`SortDriver`] plug-in contract
//! - **Steps** (`step`): [`Step`], [`StepKind`], [`CostTable`] and the frozen
//!   [`Trace`]
//! - **Drivers** (`drivers`): reference algorithms built on the recorder
//!
//! # Example
//!
//! ```rust
//! use rand::SeedableRng;
//! use sort_replay::schema::Distribution;
//! use sort_replay::trace::{Recorder, StepKind, record};
//!
//! let driver = |a: &mut [i64], r: &mut Recorder| r.swap(a, 0, 1);
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//! let trace = record(2, Distribution::Ascending, &mut rng, &driver);
//!
//! assert_eq!(trace.len(), 4);
//! assert_eq!(trace.count(StepKind::Swap), 2);
//! ```

mod drivers;
mod generator;
mod recorder;
mod step;

pub use drivers::{Algorithm, bubble_sort, insertion_sort, quick_sort, selection_sort};
pub use generator::generate;
pub use recorder::{ArrayStore, Recorder, SortDriver, record};
pub use step::{CostTable, Step, StepKind, StepRecord, Trace, TraceError};
