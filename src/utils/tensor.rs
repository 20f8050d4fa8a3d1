//! Dense three-index integer arrays.
//!
//! All tensors in the reduction hold integer counts, so they are stored as
//! `i64` and every margin comparison is exact.

use nalgebra::DMatrix;
use std::fmt;
use std::ops::{Index, IndexMut};

/// A cell of a three-index array.
pub type Cell = [usize; 3];

/// A dense three-index array of integers in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tensor3 {
    data: Vec<i64>,
    shape: [usize; 3],
}

impl Tensor3 {
    /// Create a new tensor with the given shape, initialized to zero.
    pub fn zeros(shape: [usize; 3]) -> Self {
        Self {
            data: vec![0; shape[0] * shape[1] * shape[2]],
            shape,
        }
    }

    /// Create a tensor from nested vectors indexed `[a][b][c]`.
    ///
    /// Returns `None` if the nesting is ragged.
    pub fn from_nested(nested: Vec<Vec<Vec<i64>>>) -> Option<Self> {
        let d0 = nested.len();
        let d1 = nested.first().map_or(0, |s| s.len());
        let d2 = nested
            .first()
            .and_then(|s| s.first())
            .map_or(0, |s| s.len());
        let mut data = Vec::with_capacity(d0 * d1 * d2);
        for slice in nested {
            if slice.len() != d1 {
                return None;
            }
            for line in slice {
                if line.len() != d2 {
                    return None;
                }
                data.extend(line);
            }
        }
        Some(Self {
            data,
            shape: [d0, d1, d2],
        })
    }

    /// Get the shape.
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the tensor has no cells.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether a cell lies inside the tensor.
    pub fn contains(&self, cell: Cell) -> bool {
        cell.iter().zip(self.shape.iter()).all(|(&i, &n)| i < n)
    }

    fn offset(&self, [a, b, c]: Cell) -> usize {
        (a * self.shape[1] + b) * self.shape[2] + c
    }

    fn cell_at(&self, offset: usize) -> Cell {
        let c = offset % self.shape[2];
        let rest = offset / self.shape[2];
        [rest / self.shape[1], rest % self.shape[1], c]
    }

    /// Get an element.
    pub fn get(&self, cell: Cell) -> Option<i64> {
        if self.contains(cell) {
            Some(self.data[self.offset(cell)])
        } else {
            None
        }
    }

    /// Set an element, returning the previous value, or `None` when the cell
    /// lies outside the tensor.
    pub fn set(&mut self, cell: Cell, value: i64) -> Option<i64> {
        if !self.contains(cell) {
            return None;
        }
        let offset = self.offset(cell);
        Some(std::mem::replace(&mut self.data[offset], value))
    }

    /// Sum of all entries.
    pub fn total(&self) -> i64 {
        self.data.iter().sum()
    }

    /// Smallest entry, if any.
    pub fn min(&self) -> Option<i64> {
        self.data.iter().copied().min()
    }

    /// Sum of the line `[a, b, ..]` along the last axis.
    pub fn fiber_sum(&self, a: usize, b: usize) -> i64 {
        let start = self.offset([a, b, 0]);
        self.data[start..start + self.shape[2]].iter().sum()
    }

    /// One-index margins: entry `i` is the sum of the slice with `cell[axis] == i`.
    pub fn plane_sums(&self, axis: usize) -> Vec<i64> {
        let mut sums = vec![0; self.shape[axis]];
        for (offset, &value) in self.data.iter().enumerate() {
            sums[self.cell_at(offset)[axis]] += value;
        }
        sums
    }

    /// Two-index margins obtained by summing out `axis`.
    ///
    /// The result is indexed by the two remaining axes in their original order.
    pub fn line_sums(&self, axis: usize) -> DMatrix<i64> {
        let keep: Vec<usize> = (0..3).filter(|&d| d != axis).collect();
        let mut sums = DMatrix::zeros(self.shape[keep[0]], self.shape[keep[1]]);
        for (offset, &value) in self.data.iter().enumerate() {
            let cell = self.cell_at(offset);
            sums[(cell[keep[0]], cell[keep[1]])] += value;
        }
        sums
    }

    /// Iterate over the nonzero entries.
    pub fn iter_nonzero(&self) -> impl Iterator<Item = (Cell, i64)> + '_ {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0)
            .map(move |(offset, &v)| (self.cell_at(offset), v))
    }
}

impl Index<Cell> for Tensor3 {
    type Output = i64;

    fn index(&self, cell: Cell) -> &i64 {
        assert!(self.contains(cell), "cell {:?} outside shape {:?}", cell, self.shape);
        &self.data[self.offset(cell)]
    }
}

impl IndexMut<Cell> for Tensor3 {
    fn index_mut(&mut self, cell: Cell) -> &mut i64 {
        assert!(self.contains(cell), "cell {:?} outside shape {:?}", cell, self.shape);
        let offset = self.offset(cell);
        &mut self.data[offset]
    }
}

impl fmt::Display for Tensor3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "tensor {}x{}x{} [", self.shape[0], self.shape[1], self.shape[2])?;
        for (cell, value) in self.iter_nonzero() {
            writeln!(f, "  {:?} = {}", cell, value)?;
        }
        write!(f, "]")
    }
}
