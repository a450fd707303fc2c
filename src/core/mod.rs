//! Core deterministic primitives.
//!
//! Everything in this module is seed-driven and platform independent, so a
//! spin sequence can be replayed exactly from its configuration.

pub mod rng;

// Re-export core types
pub use rng::{derive_seed, DeterministicRng};
