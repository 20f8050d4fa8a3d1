//! Binary-decomposition preprocessing.
//!
//! Rewrites a system with arbitrary integer coefficients into an equivalent
//! one whose coefficients are small. Each variable `y_j` whose column holds a
//! coefficient of magnitude at least 2 is expanded into a block of
//! `k_j + 1` variables `x_0, ..., x_k` tied together by doubling rows
//! `2 x_t - x_{t+1} = 0`, so that `x_t = 2^t y_j`. Every coefficient `a` of
//! the original row is then spread over the block as the signed binary
//! digits of `|a|`.
//!
//! ```text
//! [ 3  1 | 7 ]   becomes   [ 2 -1  0 | 0 ]
//!                          [ 1  1  1 | 7 ]
//! ```

use super::StandardSystem;
use crate::utils::errors::{BoundError, ReprResult, ShapeError, ShapeErrorKind};
use log::debug;
use nalgebra::{DMatrix, DVector};

/// Systems whose largest coefficient magnitude is at most this are left alone.
pub const SKIP_THRESHOLD: i64 = 2;

/// A preprocessed system together with the position of each original variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preprocessed {
    system: StandardSystem,
    /// Column of the expanded system holding each original variable
    original_columns: Vec<usize>,
    /// Number of doubling steps introduced per original column
    digits: Vec<usize>,
}

impl Preprocessed {
    /// Wrap a system that needs no expansion.
    pub fn identity(system: StandardSystem) -> Self {
        let n = system.ncols();
        Self {
            system,
            original_columns: (0..n).collect(),
            digits: vec![0; n],
        }
    }

    /// The (possibly expanded) system.
    pub fn system(&self) -> &StandardSystem {
        &self.system
    }

    /// Consume and return the system.
    pub fn into_system(self) -> StandardSystem {
        self.system
    }

    /// Column of the expanded system holding each original variable.
    pub fn original_columns(&self) -> &[usize] {
        &self.original_columns
    }

    /// Number of variables of the original system.
    pub fn original_ncols(&self) -> usize {
        self.original_columns.len()
    }

    /// Whether any auxiliary variables were introduced.
    pub fn is_expanded(&self) -> bool {
        self.digits.iter().any(|&k| k > 0)
    }

    /// Map a point of the original system to the expanded one.
    ///
    /// Block `j` receives `y_j, 2 y_j, 4 y_j, ...` as forced by the doubling rows.
    pub fn lift_point(&self, y: &[i64]) -> ReprResult<Vec<i64>> {
        if y.len() != self.original_ncols() {
            return Err(ShapeError::new(
                ShapeErrorKind::PointLength,
                "point length differs from the number of original variables",
            )
            .with_dims(&[self.original_ncols()], &[y.len()])
            .into());
        }
        let mut lifted = Vec::with_capacity(self.system.ncols());
        for (j, (&value, &k)) in y.iter().zip(&self.digits).enumerate() {
            let mut current = value;
            lifted.push(current);
            for t in 1..=k {
                current = current
                    .checked_mul(2)
                    .ok_or_else(|| BoundError::overflow(format!("2^{} * y[{}]", t, j)))?;
                lifted.push(current);
            }
        }
        Ok(lifted)
    }

    /// Read the original variables back out of a point of the expanded system.
    pub fn project_point(&self, x: &[i64]) -> ReprResult<Vec<i64>> {
        if x.len() != self.system.ncols() {
            return Err(ShapeError::new(
                ShapeErrorKind::PointLength,
                "point length differs from the number of expanded variables",
            )
            .with_dims(&[self.system.ncols()], &[x.len()])
            .into());
        }
        Ok(self.original_columns.iter().map(|&c| x[c]).collect())
    }
}

/// Number of doubling steps needed for a column: `floor(log2(max |a|))`, 0 for
/// an all-zero column.
fn column_digits(system: &StandardSystem, j: usize) -> usize {
    let max = system
        .matrix()
        .column(j)
        .iter()
        .map(|v| v.unsigned_abs())
        .max()
        .unwrap_or(0);
    max.max(1).ilog2() as usize
}

/// Unconditionally apply the binary decomposition.
pub fn binary_expand(system: &StandardSystem) -> Preprocessed {
    let a = system.matrix();
    let (nrow, ncol) = a.shape();
    let digits: Vec<usize> = (0..ncol).map(|j| column_digits(system, j)).collect();
    let extra: usize = digits.iter().sum();

    let mut original_columns = Vec::with_capacity(ncol);
    let mut offset = 0;
    for &k in &digits {
        original_columns.push(offset);
        offset += k + 1;
    }

    let mut c = DMatrix::zeros(nrow + extra, ncol + extra);

    // Doubling rows come first, one per auxiliary variable.
    let mut row = 0;
    for (&start, &k) in original_columns.iter().zip(&digits) {
        for t in 0..k {
            c[(row, start + t)] = 2;
            c[(row, start + t + 1)] = -1;
            row += 1;
        }
    }

    for i in 0..nrow {
        for (j, &start) in original_columns.iter().enumerate() {
            let value = a[(i, j)];
            let sign = value.signum();
            let mut magnitude = value.unsigned_abs();
            let mut s = 0;
            while magnitude > 0 {
                if magnitude & 1 == 1 {
                    c[(extra + i, start + s)] = sign;
                }
                magnitude >>= 1;
                s += 1;
            }
        }
    }

    let d = DVector::from_fn(nrow + extra, |i, _| {
        if i < extra {
            0
        } else {
            system.rhs()[i - extra]
        }
    });

    debug!(
        "binary expansion: {}x{} -> {}x{} ({} auxiliary variables)",
        nrow,
        ncol,
        nrow + extra,
        ncol + extra,
        extra
    );

    Preprocessed {
        // Dimensions are non-zero because the input system is non-empty.
        system: StandardSystem { a: c, b: d },
        original_columns,
        digits,
    }
}

/// Reduce coefficients to small magnitudes, skipping systems that already
/// have no coefficient larger than [`SKIP_THRESHOLD`] in magnitude.
pub fn preprocess(system: &StandardSystem) -> Preprocessed {
    if system.max_abs_coefficient() <= SKIP_THRESHOLD {
        debug!("preprocessing skipped: max |a| = {}", system.max_abs_coefficient());
        Preprocessed::identity(system.clone())
    } else {
        binary_expand(system)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system(rows: &[Vec<i64>]) -> StandardSystem {
        StandardSystem::from_augmented_rows(rows).unwrap()
    }

    #[test]
    fn test_expand_positive_coefficient() {
        let s = system(&[vec![3, 1, 7]]);
        let p = preprocess(&s);
        assert!(p.is_expanded());
        assert_eq!(
            p.system(),
            &system(&[vec![2, -1, 0, 0], vec![1, 1, 1, 7]])
        );
        assert_eq!(p.original_columns(), &[0, 2]);
    }

    #[test]
    fn test_expand_negative_coefficient() {
        // 6 = 110b needs two doubling steps
        let s = system(&[vec![-6, 1, 0]]);
        let p = preprocess(&s);
        assert_eq!(
            p.system(),
            &system(&[
                vec![2, -1, 0, 0, 0],
                vec![0, 2, -1, 0, 0],
                vec![0, -1, -1, 1, 0],
            ])
        );
        assert_eq!(p.original_columns(), &[0, 3]);
    }

    #[test]
    fn test_expansion_preserves_solutions() {
        let s = system(&[vec![-6, 1, 0], vec![5, 0, 10]]);
        let y = [2, 12];
        assert!(s.check_point(&y).is_ok());

        let p = preprocess(&s);
        let lifted = p.lift_point(&y).unwrap();
        assert_eq!(lifted, vec![2, 4, 8, 12]);
        assert!(p.system().check_point(&lifted).is_ok());
        assert_eq!(p.project_point(&lifted).unwrap(), y.to_vec());
    }

    #[test]
    fn test_skip_small_coefficients() {
        let s = system(&[vec![2, -1, 1, 4], vec![0, 1, -2, 1]]);
        let p = preprocess(&s);
        assert!(!p.is_expanded());
        assert_eq!(p.system(), &s);
        assert_eq!(p.lift_point(&[1, 2, 0]).unwrap(), vec![1, 2, 0]);
    }

    #[test]
    fn test_forced_expansion_of_two() {
        let s = system(&[vec![2, 1, 3]]);
        let p = binary_expand(&s);
        assert_eq!(p.system(), &system(&[vec![2, -1, 0, 0], vec![0, 1, 1, 3]]));
    }

    #[test]
    fn test_preprocess_idempotent() {
        let s = system(&[vec![7, -3, 0, 5], vec![1, 12, -1, 30]]);
        let once = preprocess(&s);
        assert!(once.system().max_abs_coefficient() <= SKIP_THRESHOLD);
        let twice = preprocess(once.system());
        assert_eq!(twice.system(), once.system());
    }

    #[test]
    fn test_lift_point_length() {
        let p = preprocess(&system(&[vec![3, 1, 7]]));
        assert!(p.lift_point(&[1]).unwrap_err().is_shape());
        assert!(p.project_point(&[1, 2]).unwrap_err().is_shape());
    }
}
