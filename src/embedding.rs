//! Points carried through a representation change.

use crate::utils::tensor::{Cell, Tensor3};

/// An integer point of a polytope together with the coordinates that are
/// direct images of the original variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embedding {
    /// The embedded point
    pub point: Tensor3,
    /// Cells of `point` holding an original value, in variable order
    pub real_coordinates: Vec<Cell>,
    /// The original values at `real_coordinates`
    pub projected_point: Vec<i64>,
}

impl Embedding {
    /// Read the point back at its real coordinates.
    pub fn project(&self) -> Vec<i64> {
        self.real_coordinates.iter().map(|&c| self.point[c]).collect()
    }
}
