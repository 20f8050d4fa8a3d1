//! Standard-form integer systems `{y >= 0 : Ay = b}`.
//!
//! This module provides the input representation of the reduction:
//! - The constraint system itself
//! - Binary-decomposition preprocessing to small coefficients

pub mod preprocess;

pub use preprocess::{binary_expand, preprocess, Preprocessed};

use crate::utils::errors::{
    BoundError, InfeasibilityError, InfeasibilityErrorKind, ReprResult, ShapeError,
    ShapeErrorKind,
};
use nalgebra::{DMatrix, DVector};
use std::fmt;

/// An equality-constrained non-negative integer program `{y >= 0 : Ay = b}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardSystem {
    a: DMatrix<i64>,
    b: DVector<i64>,
}

impl StandardSystem {
    /// Create a system from a constraint matrix and right-hand side.
    pub fn new(a: DMatrix<i64>, b: DVector<i64>) -> ReprResult<Self> {
        if a.nrows() == 0 || a.ncols() == 0 {
            return Err(ShapeError::new(
                ShapeErrorKind::EmptySystem,
                "constraint matrix has no rows or no columns",
            )
            .with_dims(&[1, 1], &[a.nrows(), a.ncols()])
            .into());
        }
        if b.len() != a.nrows() {
            return Err(ShapeError::new(
                ShapeErrorKind::RhsLength,
                "right-hand side length differs from the number of rows",
            )
            .with_dims(&[a.nrows()], &[b.len()])
            .into());
        }
        Ok(Self { a, b })
    }

    /// Create a system from the rows of the augmented matrix `(A|b)`.
    pub fn from_augmented_rows(rows: &[Vec<i64>]) -> ReprResult<Self> {
        let width = rows.first().map_or(0, |r| r.len());
        if rows.is_empty() || width < 2 {
            return Err(ShapeError::new(
                ShapeErrorKind::EmptySystem,
                "augmented matrix needs at least one row and two columns",
            )
            .into());
        }
        if let Some(row) = rows.iter().find(|r| r.len() != width) {
            return Err(ShapeError::new(ShapeErrorKind::RaggedRows, "augmented rows differ in length")
                .with_dims(&[width], &[row.len()])
                .into());
        }
        let a = DMatrix::from_fn(rows.len(), width - 1, |i, j| rows[i][j]);
        let b = DVector::from_fn(rows.len(), |i, _| rows[i][width - 1]);
        Self::new(a, b)
    }

    /// The constraint matrix `A`.
    pub fn matrix(&self) -> &DMatrix<i64> {
        &self.a
    }

    /// The right-hand side `b`.
    pub fn rhs(&self) -> &DVector<i64> {
        &self.b
    }

    /// Number of constraint rows.
    pub fn nrows(&self) -> usize {
        self.a.nrows()
    }

    /// Number of variables.
    pub fn ncols(&self) -> usize {
        self.a.ncols()
    }

    /// Largest absolute coefficient of `A`.
    pub fn max_abs_coefficient(&self) -> i64 {
        self.a.iter().map(|v| v.saturating_abs()).max().unwrap_or(0)
    }

    /// Unit capacity of column `j`: the larger of its positive mass and the
    /// magnitude of its negative mass.
    pub fn column_capacity(&self, j: usize) -> usize {
        let (pos, neg) = self.a.column(j).iter().fold((0u64, 0u64), |(p, n), &v| {
            if v > 0 {
                (p + v.unsigned_abs(), n)
            } else {
                (p, n + v.unsigned_abs())
            }
        });
        pos.max(neg) as usize
    }

    /// Unit capacities of all columns.
    pub fn capacities(&self) -> Vec<usize> {
        (0..self.ncols()).map(|j| self.column_capacity(j)).collect()
    }

    /// Check that `y` is a feasible integer point: right length, `y >= 0`, `Ay = b`.
    pub fn check_point(&self, y: &[i64]) -> ReprResult<()> {
        if y.len() != self.ncols() {
            return Err(ShapeError::new(
                ShapeErrorKind::PointLength,
                "point length differs from the number of variables",
            )
            .with_dims(&[self.ncols()], &[y.len()])
            .into());
        }
        if let Some(k) = y.iter().position(|&v| v < 0) {
            return Err(InfeasibilityError::new(
                InfeasibilityErrorKind::NegativeEntry,
                format!("y[{}] = {} is negative", k, y[k]),
            )
            .into());
        }
        for i in 0..self.nrows() {
            let lhs = self
                .a
                .row(i)
                .iter()
                .zip(y)
                .try_fold(0i64, |acc, (&a, &v)| acc.checked_add(a.checked_mul(v)?))
                .ok_or_else(|| BoundError::overflow(format!("row {} of Ay", i)))?;
            if lhs != self.b[i] {
                return Err(InfeasibilityError::new(
                    InfeasibilityErrorKind::EqualityViolated,
                    format!("row {}: Ay = {} but b = {}", i, lhs, self.b[i]),
                )
                .into());
            }
        }
        Ok(())
    }
}

impl fmt::Display for StandardSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{ y >= 0 : Ay = b }} with {} rows, {} columns", self.nrows(), self.ncols())?;
        for i in 0..self.nrows() {
            write!(f, "  [")?;
            for j in 0..self.ncols() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:>3}", self.a[(i, j)])?;
            }
            writeln!(f, "] = {}", self.b[i])?;
        }
        Ok(())
    }
}
