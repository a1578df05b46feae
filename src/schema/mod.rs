//! Schema module - Configuration and distribution types for sort replays.

mod config;
mod distribution;

pub use config::*;
pub use distribution::*;
