//! Spatial bucketing for collision candidate queries.
//!
//! This module provides the layout extent and the uniform grid used to
//! narrow overlap testing down to nodes sharing the same or a neighboring
//! grid cell.

mod grid;

pub use grid::{Extent, SpatialGrid};
