//! Plane-sum entry-forbidden transportation polytopes.
//!
//! A polytope of this kind is the set of non-negative integer arrays `x` of
//! shape `l x m x n` with one-index margins
//!
//! ```text
//! sum(x[a, :, :]) = u[a]    sum(x[:, b, :]) = v[b]    sum(x[:, :, c]) = w[c]
//! ```
//!
//! and `x[a, b, c] = 0` for every cell not in the enabled set.

use super::chain::{ChainKind, ChainLayout};
use crate::system::StandardSystem;
use crate::utils::errors::{
    BoundError, BoundErrorKind, InfeasibilityError, InfeasibilityErrorKind, ReprResult,
    ShapeError, ShapeErrorKind,
};
use crate::utils::tensor::{Cell, Tensor3};
use log::debug;
use std::fmt;

/// A plane-sum transportation polytope with forbidden entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaneSumPolytope {
    upper_bound: i64,
    u: Vec<i64>,
    v: Vec<i64>,
    w: Vec<i64>,
    layout: ChainLayout,
    /// Enabled cells, in slot order of `layout`
    enabled: Vec<Cell>,
}

impl PlaneSumPolytope {
    /// Encode `{y >= 0 : Ay = b}` with entries bounded by `upper_bound`.
    ///
    /// The bound must exceed every value a feasible `y_k` can take; this is
    /// not checked here, only that it is positive and yields non-negative
    /// margins.
    pub fn encode(system: &StandardSystem, upper_bound: i64) -> ReprResult<Self> {
        if upper_bound <= 0 {
            return Err(BoundError::new(
                BoundErrorKind::NonPositiveBound,
                format!("upper bound must be positive, got {}", upper_bound),
            )
            .into());
        }

        let capacities = system.capacities();
        if let Some(j) = capacities.iter().position(|&r| r == 0) {
            return Err(ShapeError::new(
                ShapeErrorKind::EmptyColumn,
                format!("column {} of the constraint matrix is zero", j),
            )
            .into());
        }

        let a = system.matrix();
        let nrow = system.nrows();
        let total = capacities.iter().sum::<usize>();
        let total_mass = i64::try_from(total)
            .ok()
            .and_then(|r| r.checked_mul(upper_bound))
            .ok_or_else(|| BoundError::overflow("the total margin mass"))?;

        let u = vec![upper_bound; total];
        let v = vec![upper_bound; total];

        let mut w = Vec::with_capacity(nrow + 1);
        for k in 0..nrow {
            let negative_mass = a
                .row(k)
                .iter()
                .filter(|&&x| x < 0)
                .try_fold(0i64, |acc, &x| acc.checked_add(x.checked_abs()?));
            let margin = negative_mass
                .and_then(|mass| mass.checked_mul(upper_bound))
                .and_then(|mass| mass.checked_add(system.rhs()[k]))
                .ok_or_else(|| BoundError::overflow(format!("w[{}]", k)))?;
            w.push(margin);
        }
        let overflow_margin = w
            .iter()
            .try_fold(total_mass, |acc, &x| acc.checked_sub(x))
            .ok_or_else(|| BoundError::overflow(format!("w[{}]", nrow)))?;
        w.push(overflow_margin);

        if let Some(k) = w.iter().position(|&x| x < 0) {
            return Err(BoundError::new(
                BoundErrorKind::NegativeMargin,
                format!(
                    "plane margin w[{}] = {} is negative; the system has no point bounded by {}",
                    k, w[k], upper_bound
                ),
            )
            .into());
        }

        let layout = ChainLayout::new(capacities);
        let planes = layout.assign_planes(a);
        let enabled = layout
            .slots()
            .iter()
            .zip(planes)
            .map(|(slot, plane)| [slot.row, slot.col, plane])
            .collect();

        debug!(
            "plane-sum encoding: {} columns, shape {}x{}x{}, {} enabled cells",
            system.ncols(),
            total,
            total,
            nrow + 1,
            layout.len()
        );

        Ok(Self {
            upper_bound,
            u,
            v,
            w,
            layout,
            enabled,
        })
    }

    /// The upper bound `U` the polytope was encoded with.
    pub fn upper_bound(&self) -> i64 {
        self.upper_bound
    }

    /// Margins of the first axis.
    pub fn u(&self) -> &[i64] {
        &self.u
    }

    /// Margins of the second axis.
    pub fn v(&self) -> &[i64] {
        &self.v
    }

    /// Margins of the third axis; the last entry is the overflow plane.
    pub fn w(&self) -> &[i64] {
        &self.w
    }

    /// Shape `[l, m, n]` of the tensors in the polytope.
    pub fn shape(&self) -> [usize; 3] {
        [self.u.len(), self.v.len(), self.w.len()]
    }

    /// Enabled cells, column by column, positive chain before negative chain.
    pub fn enabled(&self) -> &[Cell] {
        &self.enabled
    }

    /// Unit capacity `r_j` of every column of the encoded system.
    pub fn capacities(&self) -> &[usize] {
        self.layout.capacities()
    }

    /// The ordered cells of one chain of `column`.
    pub fn chain(&self, column: usize, kind: ChainKind) -> &[Cell] {
        &self.enabled[self.layout.chain_range(column, kind)]
    }

    /// Tensor holding `U` on every enabled cell and 0 elsewhere.
    pub fn bound_tensor(&self) -> Tensor3 {
        let mut bounds = Tensor3::zeros(self.shape());
        for &cell in &self.enabled {
            bounds[cell] = self.upper_bound;
        }
        bounds
    }

    /// Check that `x` is an integer point of the polytope.
    pub fn check_plane_sums(&self, x: &Tensor3) -> ReprResult<()> {
        if x.shape() != self.shape() {
            return Err(ShapeError::new(
                ShapeErrorKind::TensorShape,
                "tensor shape differs from the plane-sum polytope",
            )
            .with_dims(&self.shape(), &x.shape())
            .into());
        }

        let bounds = self.bound_tensor();
        for (cell, value) in x.iter_nonzero() {
            if value < 0 {
                return Err(InfeasibilityError::new(
                    InfeasibilityErrorKind::NegativeEntry,
                    format!("x{:?} = {} is negative", cell, value),
                )
                .into());
            }
            if bounds[cell] == 0 {
                return Err(InfeasibilityError::new(
                    InfeasibilityErrorKind::ForbiddenCell,
                    format!("x{:?} = {} lies on a forbidden cell", cell, value),
                )
                .into());
            }
        }

        for (axis, (name, margins)) in [("u", &self.u), ("v", &self.v), ("w", &self.w)]
            .into_iter()
            .enumerate()
        {
            let sums = x.plane_sums(axis);
            if let Some(i) = (0..margins.len()).find(|&i| sums[i] != margins[i]) {
                return Err(InfeasibilityError::new(
                    InfeasibilityErrorKind::PlaneSumViolated,
                    format!("plane sum {} on axis {} differs from {}[{}] = {}", sums[i], axis, name, i, margins[i]),
                )
                .into());
            }
        }
        Ok(())
    }
}

impl fmt::Display for PlaneSumPolytope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [l, m, n] = self.shape();
        writeln!(f, "plane-sum polytope {}x{}x{} (U = {})", l, m, n, self.upper_bound)?;
        writeln!(f, "  u = {:?}", self.u)?;
        writeln!(f, "  v = {:?}", self.v)?;
        writeln!(f, "  w = {:?}", self.w)?;
        write!(f, "  enabled ({}):", self.enabled.len())?;
        for cell in &self.enabled {
            write!(f, " {:?}", cell)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system(rows: &[Vec<i64>]) -> StandardSystem {
        StandardSystem::from_augmented_rows(rows).unwrap()
    }

    #[test]
    fn test_two_variable_encoding() {
        let p = PlaneSumPolytope::encode(&system(&[vec![1, 1, 2]]), 3).unwrap();
        assert_eq!(p.capacities(), &[1, 1]);
        assert_eq!(p.u(), &[3, 3]);
        assert_eq!(p.v(), &[3, 3]);
        assert_eq!(p.w(), &[2, 4]);
        assert_eq!(
            p.enabled(),
            &[[0, 0, 0], [0, 0, 1], [1, 1, 0], [1, 1, 1]]
        );
        assert_eq!(p.chain(1, ChainKind::Negative), &[[1, 1, 1]]);
    }

    #[test]
    fn test_negative_coefficients_raise_margin() {
        // y0 - y1 = 1, y1 + y2 = 2
        let p = PlaneSumPolytope::encode(&system(&[vec![1, -1, 0, 1], vec![0, 1, 1, 2]]), 4).unwrap();
        assert_eq!(p.capacities(), &[1, 1, 1]);
        assert_eq!(p.w(), &[1 + 4, 2, 12 - 5 - 2]);
        assert_eq!(p.enabled().len(), 6);
        // the negative slot of column 1 sits on row 0, its positive slot on row 1
        assert_eq!(p.chain(1, ChainKind::Negative), &[[1, 1, 0]]);
        assert_eq!(p.chain(1, ChainKind::Positive), &[[1, 1, 1]]);
    }

    #[test]
    fn test_enabled_count() {
        let s = system(&[vec![2, -1, 1, 0, 3], vec![-1, 1, 1, 1, 2], vec![1, -2, 0, 1, 0]]);
        let p = PlaneSumPolytope::encode(&s, 5).unwrap();
        let total: usize = s.capacities().iter().sum();
        assert_eq!(p.enabled().len(), 2 * total);
        let mut cells = p.enabled().to_vec();
        cells.sort();
        cells.dedup();
        assert_eq!(cells.len(), 2 * total);
        assert_eq!(p.w().iter().sum::<i64>(), total as i64 * 5);
    }

    #[test]
    fn test_bound_tensor() {
        let p = PlaneSumPolytope::encode(&system(&[vec![1, 1, 2]]), 3).unwrap();
        let bounds = p.bound_tensor();
        assert_eq!(bounds.shape(), [2, 2, 2]);
        assert_eq!(bounds.total(), 12);
        assert_eq!(bounds[[0, 1, 0]], 0);
        assert_eq!(bounds[[1, 1, 1]], 3);
    }

    #[test]
    fn test_encoding_errors() {
        let s = system(&[vec![1, 0, 2]]);
        assert!(PlaneSumPolytope::encode(&s, 3).unwrap_err().is_shape());

        let s = system(&[vec![1, 1, 2]]);
        assert!(PlaneSumPolytope::encode(&s, 0).unwrap_err().is_bound());

        // y0 + y1 = 9 cannot hold with both variables at most 3
        let s = system(&[vec![1, 1, 9]]);
        assert!(PlaneSumPolytope::encode(&s, 3).unwrap_err().is_bound());
    }

    #[test]
    fn test_check_plane_sums() {
        let p = PlaneSumPolytope::encode(&system(&[vec![1, 1, 2]]), 3).unwrap();
        let mut x = Tensor3::zeros([2, 2, 2]);
        x[[0, 0, 0]] = 2;
        x[[0, 0, 1]] = 1;
        x[[1, 1, 1]] = 3;
        assert!(p.check_plane_sums(&x).is_ok());

        let mut forbidden = x.clone();
        forbidden[[0, 1, 0]] = 1;
        assert!(p.check_plane_sums(&forbidden).unwrap_err().is_infeasible());

        let mut unbalanced = x.clone();
        unbalanced[[1, 1, 0]] = 1;
        assert!(p.check_plane_sums(&unbalanced).unwrap_err().is_infeasible());

        assert!(p.check_plane_sums(&Tensor3::zeros([2, 2, 3])).unwrap_err().is_shape());
    }
}
