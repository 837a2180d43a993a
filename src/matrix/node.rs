//! Typed view over the flat node matrix.
//!
//! Each node occupies [`PPN`] consecutive floats:
//! - `x`, `y`: center of the node's circular footprint (mutable)
//! - `size`: radius-like scalar, inflated to a collision radius by the
//!   layout settings
//! - `fixed`: position is never written when set
//! - `hidden`: excluded from extent, grid, and collision logic when set
//!
//! The `fixed`/`hidden` fields are booleans encoded as floats by the JS
//! producer: a field is set iff it equals exactly `1.0`.

use crate::error::NoverlapError;

/// Properties per node: `[x, y, size, fixed, hidden]`.
pub const PPN: usize = 5;

/// Field offsets within a node's slice of the matrix.
const NODE_X: usize = 0;
const NODE_Y: usize = 1;
const NODE_SIZE: usize = 2;
const NODE_FIXED: usize = 3;
const NODE_HIDDEN: usize = 4;

/// Mutable view over a flat stride-[`PPN`] node buffer.
///
/// The view borrows the caller's buffer for the duration of one layout
/// call; it never reorders or resizes it, so node `i` on the way in is
/// node `i` on the way out.
#[derive(Debug)]
pub struct NodeMatrix<'a> {
    data: &'a mut [f32],
}

impl<'a> NodeMatrix<'a> {
    /// Wrap a flat buffer, rejecting lengths that are not a whole number
    /// of nodes.
    pub fn new(data: &'a mut [f32]) -> Result<Self, NoverlapError> {
        if data.len() % PPN != 0 {
            return Err(NoverlapError::BadStride {
                len: data.len(),
                stride: PPN,
            });
        }
        Ok(Self { data })
    }

    /// Number of nodes in the matrix.
    #[inline]
    pub fn order(&self) -> usize {
        self.data.len() / PPN
    }

    /// X position of node `i`.
    #[inline]
    pub fn x(&self, i: usize) -> f32 {
        self.data[i * PPN + NODE_X]
    }

    /// Y position of node `i`.
    #[inline]
    pub fn y(&self, i: usize) -> f32 {
        self.data[i * PPN + NODE_Y]
    }

    /// Raw size scalar of node `i` (not yet inflated by ratio/margin).
    #[inline]
    pub fn size(&self, i: usize) -> f32 {
        self.data[i * PPN + NODE_SIZE]
    }

    /// Whether node `i` is pinned in place.
    #[inline]
    pub fn is_fixed(&self, i: usize) -> bool {
        self.data[i * PPN + NODE_FIXED] == 1.0
    }

    /// Whether node `i` is excluded from the simulation.
    #[inline]
    pub fn is_hidden(&self, i: usize) -> bool {
        self.data[i * PPN + NODE_HIDDEN] == 1.0
    }

    /// Displace node `i` by `(dx, dy)`.
    #[inline]
    pub fn translate(&mut self, i: usize, dx: f32, dy: f32) {
        self.data[i * PPN + NODE_X] += dx;
        self.data[i * PPN + NODE_Y] += dy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_partial_node() {
        let mut buf = vec![0.0; 7];
        let err = NodeMatrix::new(&mut buf).unwrap_err();
        assert_eq!(err, NoverlapError::BadStride { len: 7, stride: PPN });
    }

    #[test]
    fn test_empty_buffer_is_valid() {
        let mut buf: Vec<f32> = Vec::new();
        let matrix = NodeMatrix::new(&mut buf).unwrap();
        assert_eq!(matrix.order(), 0);
    }

    #[test]
    fn test_accessors() {
        let mut buf = vec![
            1.0, 2.0, 3.0, 0.0, 0.0, // node 0
            -4.0, 5.5, 0.5, 1.0, 1.0, // node 1
        ];
        let matrix = NodeMatrix::new(&mut buf).unwrap();
        assert_eq!(matrix.order(), 2);
        assert_eq!(matrix.x(0), 1.0);
        assert_eq!(matrix.y(0), 2.0);
        assert_eq!(matrix.size(0), 3.0);
        assert!(!matrix.is_fixed(0));
        assert!(!matrix.is_hidden(0));
        assert_eq!(matrix.x(1), -4.0);
        assert!(matrix.is_fixed(1));
        assert!(matrix.is_hidden(1));
    }

    #[test]
    fn test_flags_require_exact_one() {
        // Producer compatibility: anything other than exactly 1.0 is false.
        let mut buf = vec![0.0, 0.0, 1.0, 0.999, 2.0];
        let matrix = NodeMatrix::new(&mut buf).unwrap();
        assert!(!matrix.is_fixed(0));
        assert!(!matrix.is_hidden(0));
    }

    #[test]
    fn test_translate() {
        let mut buf = vec![1.0, 1.0, 1.0, 0.0, 0.0];
        let mut matrix = NodeMatrix::new(&mut buf).unwrap();
        matrix.translate(0, 0.5, -2.0);
        assert_eq!(matrix.x(0), 1.5);
        assert_eq!(matrix.y(0), -1.0);
        // Only position fields are touched.
        assert_eq!(matrix.size(0), 1.0);
    }
}
