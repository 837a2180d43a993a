//! Uniform grid spatial index for overlap candidate detection.
//!
//! The grid is rebuilt from scratch on every layout iteration:
//! 1. Compute the extent of all visible nodes, inflated to collision size.
//! 2. Expand the extent about its center so boxes near the border do not
//!    land exactly on the last cell boundary.
//! 3. Bucket each visible node into every cell its inflated bounding box
//!    overlaps.
//!
//! Candidate neighbors for a node are then all nodes found in the 3×3
//! block of cells around any cell the node occupies (Chebyshev distance 1).
//! This relation is symmetric, which the force pass relies on.

use crate::matrix::NodeMatrix;

/// Axis-aligned bounding box of the visible layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl Extent {
    /// Compute the extent of all non-hidden nodes, each inflated to its
    /// collision radius `size * ratio + margin`.
    ///
    /// Returns `None` when the matrix is empty or every node is hidden;
    /// callers must treat that as "nothing to lay out" rather than feed
    /// infinite bounds into the grid.
    pub fn from_matrix(matrix: &NodeMatrix<'_>, ratio: f32, margin: f32) -> Option<Self> {
        let mut extent = Self {
            x_min: f32::INFINITY,
            y_min: f32::INFINITY,
            x_max: f32::NEG_INFINITY,
            y_max: f32::NEG_INFINITY,
        };
        let mut seen = false;

        for i in 0..matrix.order() {
            if matrix.is_hidden(i) {
                continue;
            }
            seen = true;
            let x = matrix.x(i);
            let y = matrix.y(i);
            let size = matrix.size(i) * ratio + margin;

            extent.x_min = extent.x_min.min(x - size);
            extent.x_max = extent.x_max.max(x + size);
            extent.y_min = extent.y_min.min(y - size);
            extent.y_max = extent.y_max.max(y + size);
        }

        seen.then_some(extent)
    }

    /// Width of the extent.
    #[inline]
    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    /// Height of the extent.
    #[inline]
    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    /// Scale the extent about its own center.
    ///
    /// Factors above 1 leave headroom for nodes sitting on the border.
    pub fn expanded(&self, factor: f32) -> Self {
        let x_center = (self.x_min + self.x_max) / 2.0;
        let y_center = (self.y_min + self.y_max) / 2.0;
        let half_width = factor * self.width() / 2.0;
        let half_height = factor * self.height() / 2.0;

        Self {
            x_min: x_center - half_width,
            x_max: x_center + half_width,
            y_min: y_center - half_height,
            y_max: y_center + half_height,
        }
    }
}

/// Dense `grid_size × grid_size` cell matrix, row-major.
///
/// Each cell stores the indices of the nodes whose inflated bounding box
/// overlaps it; a large node can occupy several cells.
pub struct SpatialGrid {
    size: usize,
    cells: Vec<Vec<u32>>,
}

/// Project a coordinate into cell-index space along one axis.
///
/// A zero (or negative) span collapses the axis to a single cell, which
/// handles single-point layouts without dividing by zero.
#[inline]
fn cell_coord(coord: f32, min: f32, span: f32, grid_size: usize) -> usize {
    if span <= 0.0 {
        return 0;
    }
    let cell = (grid_size as f32 * (coord - min) / span).floor();
    cell.clamp(0.0, (grid_size - 1) as f32) as usize
}

impl SpatialGrid {
    /// Bucket every non-hidden node of `matrix` into the grid.
    ///
    /// `extent` must be the expanded layout extent; `grid_size` must be at
    /// least 1 (enforced by settings validation upstream).
    pub fn build(
        matrix: &NodeMatrix<'_>,
        extent: &Extent,
        grid_size: usize,
        ratio: f32,
        margin: f32,
    ) -> Self {
        let mut cells = vec![Vec::new(); grid_size * grid_size];

        let width = extent.width();
        let height = extent.height();

        for i in 0..matrix.order() {
            if matrix.is_hidden(i) {
                continue;
            }
            let x = matrix.x(i);
            let y = matrix.y(i);
            let size = matrix.size(i) * ratio + margin;

            let col_min = cell_coord(x - size, extent.x_min, width, grid_size);
            let col_max = cell_coord(x + size, extent.x_min, width, grid_size);
            let row_min = cell_coord(y - size, extent.y_min, height, grid_size);
            let row_max = cell_coord(y + size, extent.y_min, height, grid_size);

            for row in row_min..=row_max {
                for col in col_min..=col_max {
                    cells[row * grid_size + col].push(i as u32);
                }
            }
        }

        Self { size: grid_size, cells }
    }

    /// Node indices bucketed into cell `(row, col)`.
    #[inline]
    pub fn cell(&self, row: usize, col: usize) -> &[u32] {
        &self.cells[row * self.size + col]
    }

    /// Resolve collision candidates for every node.
    ///
    /// For each node `i`, the result at index `i` holds every other node
    /// found in the 3×3 block of cells around any cell `i` occupies,
    /// without duplicates and without `i` itself. Hidden nodes occupy no
    /// cell, so their candidate lists stay empty and nothing references
    /// them.
    pub fn neighbor_candidates(&self, order: usize) -> Vec<Vec<u32>> {
        let mut candidates: Vec<Vec<u32>> = vec![Vec::new(); order];

        for row in 0..self.size {
            for col in 0..self.size {
                for &i in self.cell(row, col) {
                    let neighbors = &mut candidates[i as usize];
                    let row_lo = row.saturating_sub(1);
                    let row_hi = (row + 1).min(self.size - 1);
                    let col_lo = col.saturating_sub(1);
                    let col_hi = (col + 1).min(self.size - 1);

                    for sub_row in row_lo..=row_hi {
                        for sub_col in col_lo..=col_hi {
                            for &j in self.cell(sub_row, sub_col) {
                                if j != i && !neighbors.contains(&j) {
                                    neighbors.push(j);
                                }
                            }
                        }
                    }
                }
            }
        }

        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::NodeMatrix;

    fn matrix_of(buf: &mut Vec<f32>) -> NodeMatrix<'_> {
        NodeMatrix::new(buf).unwrap()
    }

    #[test]
    fn test_extent_inflates_by_collision_radius() {
        let mut buf = vec![
            0.0, 0.0, 2.0, 0.0, 0.0, // node 0, radius 2*1+1 = 3
            10.0, 4.0, 1.0, 0.0, 0.0, // node 1, radius 1*1+1 = 2
        ];
        let matrix = matrix_of(&mut buf);
        let extent = Extent::from_matrix(&matrix, 1.0, 1.0).unwrap();
        assert_eq!(extent.x_min, -3.0);
        assert_eq!(extent.x_max, 12.0);
        assert_eq!(extent.y_min, -3.0);
        assert_eq!(extent.y_max, 6.0);
    }

    #[test]
    fn test_extent_skips_hidden_nodes() {
        let mut buf = vec![
            0.0, 0.0, 1.0, 0.0, 0.0, // visible
            100.0, 100.0, 1.0, 0.0, 1.0, // hidden outlier
        ];
        let matrix = matrix_of(&mut buf);
        let extent = Extent::from_matrix(&matrix, 1.0, 0.0).unwrap();
        assert_eq!(extent.x_max, 1.0);
        assert_eq!(extent.y_max, 1.0);
    }

    #[test]
    fn test_extent_none_when_all_hidden() {
        let mut buf = vec![0.0, 0.0, 1.0, 0.0, 1.0];
        let matrix = matrix_of(&mut buf);
        assert!(Extent::from_matrix(&matrix, 1.0, 0.0).is_none());

        let mut empty: Vec<f32> = Vec::new();
        let matrix = matrix_of(&mut empty);
        assert!(Extent::from_matrix(&matrix, 1.0, 0.0).is_none());
    }

    #[test]
    fn test_expanded_scales_about_center() {
        let extent = Extent {
            x_min: 0.0,
            y_min: 0.0,
            x_max: 10.0,
            y_max: 10.0,
        };
        let expanded = extent.expanded(2.0);
        assert_eq!(expanded.x_min, -5.0);
        assert_eq!(expanded.x_max, 15.0);
        assert_eq!(expanded.y_min, -5.0);
        assert_eq!(expanded.y_max, 15.0);
        // Pre-expansion extent is untouched.
        assert_eq!(extent.width(), 10.0);
    }

    #[test]
    fn test_zero_span_extent_collapses_to_one_cell() {
        // A single zero-size node yields a degenerate point extent.
        let mut buf = vec![5.0, 5.0, 0.0, 0.0, 0.0];
        let matrix = matrix_of(&mut buf);
        let extent = Extent::from_matrix(&matrix, 1.0, 0.0).unwrap();
        assert_eq!(extent.width(), 0.0);

        let grid = SpatialGrid::build(&matrix, &extent.expanded(1.1), 4, 1.0, 0.0);
        assert_eq!(grid.cell(0, 0), &[0]);
        for row in 0..4 {
            for col in 0..4 {
                if (row, col) != (0, 0) {
                    assert!(grid.cell(row, col).is_empty());
                }
            }
        }
    }

    #[test]
    fn test_large_node_spans_multiple_cells() {
        let mut buf = vec![
            0.0, 0.0, 10.0, 0.0, 0.0, // box covers the whole layout
            8.0, 8.0, 1.0, 0.0, 0.0,
        ];
        let matrix = matrix_of(&mut buf);
        let extent = Extent::from_matrix(&matrix, 1.0, 0.0).unwrap().expanded(1.1);
        let grid = SpatialGrid::build(&matrix, &extent, 3, 1.0, 0.0);

        let mut cells_with_node0 = 0;
        for row in 0..3 {
            for col in 0..3 {
                if grid.cell(row, col).contains(&0) {
                    cells_with_node0 += 1;
                }
            }
        }
        assert!(cells_with_node0 > 1, "big node should occupy several cells");
    }

    #[test]
    fn test_hidden_node_bucketed_nowhere() {
        let mut buf = vec![
            0.0, 0.0, 1.0, 0.0, 0.0,
            0.5, 0.5, 1.0, 0.0, 1.0, // hidden, overlapping node 0
        ];
        let matrix = matrix_of(&mut buf);
        let extent = Extent::from_matrix(&matrix, 1.0, 0.0).unwrap().expanded(1.1);
        let grid = SpatialGrid::build(&matrix, &extent, 5, 1.0, 0.0);

        for row in 0..5 {
            for col in 0..5 {
                assert!(!grid.cell(row, col).contains(&1));
            }
        }

        let candidates = grid.neighbor_candidates(matrix.order());
        assert!(candidates[0].is_empty());
        assert!(candidates[1].is_empty());
    }

    #[test]
    fn test_candidates_symmetric_and_deduplicated() {
        // A cluster of overlapping nodes plus one far-away node.
        let mut buf = vec![
            0.0, 0.0, 2.0, 0.0, 0.0,
            1.0, 1.0, 2.0, 0.0, 0.0,
            2.0, 0.0, 2.0, 0.0, 0.0,
            1000.0, 1000.0, 1.0, 0.0, 0.0,
        ];
        let matrix = matrix_of(&mut buf);
        let extent = Extent::from_matrix(&matrix, 1.0, 0.0).unwrap().expanded(1.1);
        let grid = SpatialGrid::build(&matrix, &extent, 10, 1.0, 0.0);
        let candidates = grid.neighbor_candidates(matrix.order());

        for (i, list) in candidates.iter().enumerate() {
            // No self-entry, no duplicates.
            assert!(!list.contains(&(i as u32)));
            let mut sorted = list.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), list.len());

            // Symmetry: j sees i whenever i sees j.
            for &j in list {
                assert!(
                    candidates[j as usize].contains(&(i as u32)),
                    "candidate relation must be symmetric ({i} -> {j})"
                );
            }
        }

        // The clustered nodes all see each other.
        assert!(candidates[0].contains(&1));
        assert!(candidates[0].contains(&2));
        assert!(candidates[1].contains(&2));
        // The outlier sees nobody.
        assert!(candidates[3].is_empty());
    }

    #[test]
    fn test_border_boxes_clamp_into_grid() {
        // With no expansion the max corner maps exactly onto grid_size and
        // must clamp back to the last cell instead of indexing out of range.
        let mut buf = vec![
            0.0, 0.0, 1.0, 0.0, 0.0,
            10.0, 10.0, 1.0, 0.0, 0.0,
        ];
        let matrix = matrix_of(&mut buf);
        let extent = Extent::from_matrix(&matrix, 1.0, 0.0).unwrap();
        let grid = SpatialGrid::build(&matrix, &extent, 4, 1.0, 0.0);
        assert!(grid.cell(3, 3).contains(&1));
    }
}
