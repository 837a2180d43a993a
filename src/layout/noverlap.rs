//! Single iteration of the noverlap (anti-collision) layout.
//!
//! One call performs one relaxation step over a flat node matrix:
//!
//! 1. Find the extent of all visible nodes and expand it.
//! 2. Bucket nodes into a uniform spatial grid.
//! 3. Resolve collision candidates from grid-cell adjacency.
//! 4. Test candidates for true circular overlap, accumulate repulsion
//!    displacements, and apply them to non-fixed nodes.
//!
//! The returned [`IterationResult`] tells the caller whether any overlap
//! was found; repeating until `converged` (or an iteration budget runs
//! out) is the caller's job.
//!
//! A detected overlap pushes only the second node of the visited ordered
//! pair. The candidate relation is symmetric, so over the full scan every
//! overlapping pair is visited once from each side and both members end up
//! pushed apart.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::NoverlapError;
use crate::matrix::NodeMatrix;
use crate::spatial::{Extent, SpatialGrid};

/// Fraction of the accumulated displacement applied per iteration.
const DISPLACEMENT_STEP: f32 = 0.1;

/// Seed for the coincident-node jitter, fixed so iterations replay
/// deterministically.
const JITTER_SEED: u64 = 0x6e6f_7665_726c_6170;

/// Settings for the noverlap iteration.
///
/// Deserializes from the JS settings object; missing fields take the
/// defaults below.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoverlapSettings {
    /// Padding added to every collision radius (default: 5.0).
    pub margin: f32,
    /// Multiplier applied to node sizes in the collision radius
    /// `size * ratio + margin` (default: 1.0).
    pub ratio: f32,
    /// Extent enlargement factor; values above 1 leave headroom at the
    /// layout borders (default: 1.1).
    pub expansion: f32,
    /// Grid resolution per axis (default: 20).
    pub grid_size: u32,
    /// Displacement scaling factor (default: 3.0).
    pub speed: f32,
}

impl Default for NoverlapSettings {
    fn default() -> Self {
        Self {
            margin: 5.0,
            ratio: 1.0,
            expansion: 1.1,
            grid_size: 20,
            speed: 3.0,
        }
    }
}

impl NoverlapSettings {
    /// Check the settings against their accepted ranges.
    pub fn validate(&self) -> Result<(), NoverlapError> {
        if !self.margin.is_finite() {
            return Err(NoverlapError::InvalidSetting {
                name: "margin",
                reason: "must be finite",
            });
        }
        if !self.ratio.is_finite() {
            return Err(NoverlapError::InvalidSetting {
                name: "ratio",
                reason: "must be finite",
            });
        }
        if !(self.expansion.is_finite() && self.expansion > 0.0) {
            return Err(NoverlapError::InvalidSetting {
                name: "expansion",
                reason: "must be a positive number",
            });
        }
        if self.grid_size == 0 {
            return Err(NoverlapError::InvalidSetting {
                name: "gridSize",
                reason: "must be at least 1",
            });
        }
        if !(self.speed.is_finite() && self.speed >= 0.0) {
            return Err(NoverlapError::InvalidSetting {
                name: "speed",
                reason: "must be zero or positive",
            });
        }
        Ok(())
    }
}

/// Outcome of one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IterationResult {
    /// True iff no overlapping pair was found anywhere in the matrix.
    pub converged: bool,
}

/// Tie-break displacement for nodes sitting on the exact same spot,
/// uniform in `(-0.005, 0.005]`.
#[inline]
fn jitter(rng: &mut SmallRng) -> f32 {
    0.01 * (0.5 - rng.random::<f32>())
}

/// Perform one noverlap iteration over `nodes`, mutating positions in
/// place.
///
/// `nodes` is a flat stride-5 buffer `[x, y, size, fixed, hidden, ...]`.
/// Degenerate inputs (empty buffer, every node hidden) are a no-op that
/// reports convergence instead of propagating infinite extents.
pub fn iterate(
    settings: &NoverlapSettings,
    nodes: &mut [f32],
) -> Result<IterationResult, NoverlapError> {
    settings.validate()?;

    let mut matrix = NodeMatrix::new(nodes)?;
    let order = matrix.order();

    let Some(extent) = Extent::from_matrix(&matrix, settings.ratio, settings.margin) else {
        return Ok(IterationResult { converged: true });
    };

    // Jitter scales with the pre-expansion layout dimensions.
    let width = extent.width();
    let height = extent.height();
    let expanded = extent.expanded(settings.expansion);

    let grid_size = settings.grid_size as usize;
    let grid = SpatialGrid::build(&matrix, &expanded, grid_size, settings.ratio, settings.margin);
    let candidates = grid.neighbor_candidates(order);

    let mut delta_x = vec![0.0f32; order];
    let mut delta_y = vec![0.0f32; order];
    let mut converged = true;
    let mut rng = SmallRng::seed_from_u64(JITTER_SEED);

    for n1 in 0..order {
        let x1 = matrix.x(n1);
        let y1 = matrix.y(n1);
        let s1 = matrix.size(n1);

        for &n2 in &candidates[n1] {
            let n2 = n2 as usize;
            let x_dist = matrix.x(n2) - x1;
            let y_dist = matrix.y(n2) - y1;
            let dist = (x_dist * x_dist + y_dist * y_dist).sqrt();
            let radius_sum = (s1 * settings.ratio + settings.margin)
                + (matrix.size(n2) * settings.ratio + settings.margin);

            if dist < radius_sum {
                converged = false;
                if dist > 0.0 {
                    // Push the second node of the ordered pair; the
                    // reversed pair pushes the first.
                    delta_x[n2] += x_dist / dist * (1.0 + s1);
                    delta_y[n2] += y_dist / dist * (1.0 + s1);
                } else {
                    // Exact coincidence, jitter to break the singularity.
                    delta_x[n2] += width * jitter(&mut rng);
                    delta_y[n2] += height * jitter(&mut rng);
                }
            }
        }
    }

    for i in 0..order {
        if !matrix.is_fixed(i) {
            matrix.translate(
                i,
                delta_x[i] * DISPLACEMENT_STEP * settings.speed,
                delta_y[i] * DISPLACEMENT_STEP * settings.speed,
            );
        }
    }

    Ok(IterationResult { converged })
}
