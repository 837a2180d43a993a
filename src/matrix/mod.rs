//! Flat node matrix handling.
//!
//! Node data crosses the JS boundary as a single `Float32Array` with a
//! fixed stride per node, so this module provides a typed view over that
//! buffer rather than a node struct per entry.

mod node;

pub use node::{NodeMatrix, PPN};
