//! Slim line-sum transportation polytopes.
//!
//! Built from a plane-sum polytope with margins of lengths `l`, `m`, `n`.
//! Rows are the pairs `(i, j)` with `i < l`, `j < m` (row `i * m + j`), columns
//! are three blocks of labels and the third axis has size 3:
//!
//! ```text
//! columns:  [ plane 0 .. n ) [ row 0 .. l ) [ column 0 .. m )
//! ```
//!
//! A tensor `x` of shape `(l m) x (n + l + m) x 3` lies in the polytope when
//! its three families of line sums equal `U`, `V` and `W`. There are no
//! forbidden cells.

use crate::plane_sum::PlaneSumPolytope;
use crate::utils::errors::{
    BoundError, BoundErrorKind, InfeasibilityError, InfeasibilityErrorKind, ReprResult,
    ShapeError, ShapeErrorKind,
};
use crate::utils::tensor::Tensor3;
use log::debug;
use nalgebra::DMatrix;
use std::fmt;

/// Block of a column label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnBlock {
    /// One column per plane of the source polytope
    Plane,
    /// One padding column per first-axis index of the source
    Row,
    /// One padding column per second-axis index of the source
    Column,
}

/// A slim line-sum transportation polytope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlimLineSumPolytope {
    /// Uniform padding capacity
    bound: i64,
    /// Shape `[l, m, n]` of the source plane-sum polytope
    source_shape: [usize; 3],
    /// Sums over the third axis, indexed (row, column)
    u: DMatrix<i64>,
    /// Sums over the columns, indexed (row, plane)
    v: DMatrix<i64>,
    /// Sums over the rows, indexed (column, plane)
    w: DMatrix<i64>,
}

impl SlimLineSumPolytope {
    /// Build the slim line-sum polytope of a plane-sum polytope.
    pub fn encode(polytope: &PlaneSumPolytope) -> ReprResult<Self> {
        let [l, m, n] = polytope.shape();
        let (a_margin, b_margin, c_margin) = (polytope.u(), polytope.v(), polytope.w());
        let bounds = polytope.bound_tensor();

        let max_u = a_margin.iter().copied().max().unwrap_or(0);
        let max_v = b_margin.iter().copied().max().unwrap_or(0);
        let bound = max_u.min(max_v);

        let rows = l * m;
        let cols = n + l + m;
        let mut u = DMatrix::zeros(rows, cols);
        let mut v = DMatrix::zeros(rows, 3);
        let mut w = DMatrix::zeros(cols, 3);

        for i in 0..l {
            for j in 0..m {
                let row = i * m + j;
                for k in 0..n {
                    u[(row, k)] = bounds[[i, j, k]];
                }
                u[(row, column_index(l, n, ColumnBlock::Row, i))] = bound;
                u[(row, column_index(l, n, ColumnBlock::Column, j))] = bound;

                v[(row, 0)] = bound;
                v[(row, 1)] = bounds.fiber_sum(i, j);
                v[(row, 2)] = bound;
            }
        }

        let padded = |count: usize, margin: i64, what: String| -> ReprResult<i64> {
            i64::try_from(count)
                .ok()
                .and_then(|c| c.checked_mul(bound))
                .and_then(|total| total.checked_sub(margin))
                .ok_or_else(|| BoundError::overflow(what).into())
        };

        let plane_totals = bounds.plane_sums(2);
        for k in 0..n {
            w[(k, 0)] = c_margin[k];
            w[(k, 1)] = plane_totals[k] - c_margin[k];
        }
        for t in 0..l {
            let col = column_index(l, n, ColumnBlock::Row, t);
            w[(col, 0)] = padded(m, a_margin[t], format!("W[{}, 0]", col))?;
            w[(col, 2)] = a_margin[t];
        }
        for t in 0..m {
            let col = column_index(l, n, ColumnBlock::Column, t);
            w[(col, 1)] = b_margin[t];
            w[(col, 2)] = padded(l, b_margin[t], format!("W[{}, 2]", col))?;
        }

        for col in 0..cols {
            for plane in 0..3 {
                if w[(col, plane)] < 0 {
                    return Err(BoundError::new(
                        BoundErrorKind::NegativeMargin,
                        format!("line margin W[{}, {}] = {} is negative", col, plane, w[(col, plane)]),
                    )
                    .into());
                }
            }
        }

        debug!(
            "slim line-sum encoding: {}x{}x3 from plane-sum {}x{}x{} (bound {})",
            rows, cols, l, m, n, bound
        );

        Ok(Self {
            bound,
            source_shape: [l, m, n],
            u,
            v,
            w,
        })
    }

    /// The uniform padding capacity `min(max u, max v)` of the source.
    pub fn bound(&self) -> i64 {
        self.bound
    }

    /// Shape `[l, m, n]` of the source plane-sum polytope.
    pub fn source_shape(&self) -> [usize; 3] {
        self.source_shape
    }

    /// Shape of the tensors in the polytope.
    pub fn shape(&self) -> [usize; 3] {
        [self.u.nrows(), self.u.ncols(), 3]
    }

    /// Line sums over the third axis.
    pub fn u(&self) -> &DMatrix<i64> {
        &self.u
    }

    /// Line sums over the columns.
    pub fn v(&self) -> &DMatrix<i64> {
        &self.v
    }

    /// Line sums over the rows.
    pub fn w(&self) -> &DMatrix<i64> {
        &self.w
    }

    /// Row of the source pair `(i, j)`.
    pub fn row_index(&self, i: usize, j: usize) -> usize {
        i * self.source_shape[1] + j
    }

    /// Column of label `t` in `block`.
    pub fn column_index(&self, block: ColumnBlock, t: usize) -> usize {
        column_index(self.source_shape[0], self.source_shape[2], block, t)
    }

    /// Check that `x` is an integer point of the polytope.
    pub fn check_line_sums(&self, x: &Tensor3) -> ReprResult<()> {
        if x.shape() != self.shape() {
            return Err(ShapeError::new(
                ShapeErrorKind::TensorShape,
                "tensor shape differs from the slim line-sum polytope",
            )
            .with_dims(&self.shape(), &x.shape())
            .into());
        }
        if let Some((cell, value)) = x.iter_nonzero().find(|&(_, value)| value < 0) {
            return Err(InfeasibilityError::new(
                InfeasibilityErrorKind::NegativeEntry,
                format!("x{:?} = {} is negative", cell, value),
            )
            .into());
        }

        for (axis, (name, margins)) in [("W", &self.w), ("V", &self.v), ("U", &self.u)]
            .into_iter()
            .enumerate()
        {
            let sums = x.line_sums(axis);
            for r in 0..sums.nrows() {
                for c in 0..sums.ncols() {
                    if sums[(r, c)] != margins[(r, c)] {
                        return Err(InfeasibilityError::new(
                            InfeasibilityErrorKind::LineSumViolated,
                            format!(
                                "line sum {} differs from {}[{}, {}] = {}",
                                sums[(r, c)],
                                name,
                                r,
                                c,
                                margins[(r, c)]
                            ),
                        )
                        .into());
                    }
                }
            }
        }
        Ok(())
    }
}

fn column_index(l: usize, n: usize, block: ColumnBlock, t: usize) -> usize {
    match block {
        ColumnBlock::Plane => t,
        ColumnBlock::Row => n + t,
        ColumnBlock::Column => n + l + t,
    }
}

impl fmt::Display for SlimLineSumPolytope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [rows, cols, _] = self.shape();
        writeln!(f, "slim line-sum polytope {}x{}x3 (bound = {})", rows, cols, self.bound)?;
        write!(f, "  U = {}", self.u)?;
        write!(f, "  V = {}", self.v)?;
        write!(f, "  W = {}", self.w)
    }
}
