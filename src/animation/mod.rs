//! Cost-weighted playback of recorded sort traces.
//!
//! This module replays a finished [`Trace`](crate::trace::Trace) onto a
//! drawing surface, one frame at a time, so the animation shows the order
//! in which the algorithm touched the array rather than its final state.
//!
//! # Frame pacing
//!
//! Each step is charged a fixed number of synthetic cycles:
//!
//! ```text
//! start  0
//! cmp    3
//! swap   6   (per step; one swap records two)
//! copy   4
//! set    2
//! ```
//!
//! A frame consumes steps until `cycles_per_frame` is reached, then yields to
//! the [`FrameScheduler`]. The cycle clock advances once per frame; a
//! highlighted column returns to neutral once the clock has moved more than
//! `restore_threshold` frames past its last highlight.
//!
//! # States
//!
//! ```text
//! Idle -> Playing -> Draining -> Finished
//! ```

mod player;
mod scheduler;
mod stats;
mod surface;

pub use player::{
    CellState, FrameCallback, PlaybackEngine, PlaybackError, PlaybackState, Tick, Visual,
};
#[cfg(not(target_arch = "wasm32"))]
pub use scheduler::IntervalClock;
pub use scheduler::{FrameClock, FrameHandle, FrameScheduler, ManualClock, SchedulerError};
pub use stats::{Counters, Stat, StatsSnapshot};
pub use surface::{
    Color, ColumnRect, DrawCommand, RasterSurface, RecordingSurface, Surface, column_rect,
};
