//! Sort Replay - Record sorting algorithm operations and replay them as a
//! cost-weighted animation.
//!
//! A sort driver runs to completion against instrumented array operations,
//! producing a trace of every compare, swap, copy and set. The trace is then
//! replayed frame by frame, with each operation charged a synthetic cycle
//! cost, so the animation reflects how much work the algorithm did and in
//! what order.
//!
//! # Architecture
//!
//! The crate is split into three main modules:
//!
//! - `schema`: Configuration types and initial array distributions
//! - `trace`: Array generation, instrumented operations and sort drivers
//! - `animation`: Frame scheduler, playback engine and drawing surfaces
//!
//! # Example
//!
//! ```rust
//! use rand::SeedableRng;
//! use sort_replay::{
//!     animation::{ManualClock, PlaybackEngine, RasterSurface, Stat},
//!     schema::{Distribution, PlaybackConfig},
//!     trace::{Algorithm, record},
//! };
//!
//! // Record a run
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let trace = record(50, Distribution::Random, &mut rng, &Algorithm::Quick);
//!
//! // Replay it
//! let surface = RasterSurface::new(320, 180);
//! let mut engine = PlaybackEngine::new(surface, ManualClock::new(), PlaybackConfig::default());
//! engine.play(trace, |_more| {}).unwrap();
//! engine.run_to_end().unwrap();
//!
//! println!("{} cycles", engine.get(Stat::Cycles));
//! ```

pub mod animation;
pub mod schema;
pub mod trace;

// WebAssembly bindings (only for wasm32 target)
#[cfg(target_arch = "wasm32")]
pub mod wasm;

// Re-export commonly used types
pub use animation::{PlaybackEngine, PlaybackState, Stat};
pub use schema::{Distribution, VisualizerConfig};
pub use trace::{Recorder, SortDriver, Step, StepKind, Trace};
