//! Layout algorithms.
//!
//! This module hosts the anti-collision relaxation step. One call performs
//! a single iteration over the node matrix; the embedding driver loops on
//! the returned convergence flag.

pub mod noverlap;

pub use noverlap::{IterationResult, NoverlapSettings, iterate};
