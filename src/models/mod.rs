//! Core data models for the meta tracker.

mod observation;
mod ranking;

pub use observation::*;
pub use ranking::*;
