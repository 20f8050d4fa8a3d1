//! Embedding feasible points into a plane-sum polytope.
//!
//! Every positive-chain cell of column `k` receives `y_k` and every
//! negative-chain cell receives `U - y_k`, so each touched diagonal row and
//! column sums to `U` and each constraint plane reproduces its margin.

use super::chain::ChainKind;
use super::polytope::PlaneSumPolytope;
use crate::embedding::Embedding;
use crate::system::StandardSystem;
use crate::utils::errors::{BoundError, BoundErrorKind, ReprResult, ShapeError, ShapeErrorKind};
use crate::utils::tensor::Tensor3;

/// Embed a feasible point `y` of `system` into its plane-sum encoding.
pub fn embed_point(system: &StandardSystem, upper_bound: i64, y: &[i64]) -> ReprResult<Embedding> {
    let polytope = PlaneSumPolytope::encode(system, upper_bound)?;
    embed_encoded(&polytope, system, y)
}

/// Embed `y` into a polytope already encoded from `system`.
///
/// Every cell of the positive chain of column `k` carries `y_k`, but only the
/// first one is reported as the real coordinate of `y_k`, so the result
/// holds exactly one real coordinate per variable.
pub fn embed_encoded(
    polytope: &PlaneSumPolytope,
    system: &StandardSystem,
    y: &[i64],
) -> ReprResult<Embedding> {
    if polytope.capacities() != system.capacities().as_slice()
        || polytope.w().len() != system.nrows() + 1
    {
        return Err(ShapeError::new(
            ShapeErrorKind::TensorShape,
            "plane-sum polytope was not encoded from this system",
        )
        .with_dims(&polytope.shape(), &[system.nrows(), system.ncols()])
        .into());
    }

    let upper_bound = polytope.upper_bound();
    if let Some(k) = y.iter().position(|&v| v > upper_bound) {
        return Err(BoundError::new(
            BoundErrorKind::ExceedsBound,
            format!("y[{}] = {} exceeds the upper bound {}", k, y[k], upper_bound),
        )
        .into());
    }
    system.check_point(y)?;

    let mut point = Tensor3::zeros(polytope.shape());
    let mut real_coordinates = Vec::with_capacity(y.len());
    let mut projected_point = Vec::with_capacity(y.len());

    for (k, &value) in y.iter().enumerate() {
        let positive = polytope.chain(k, ChainKind::Positive);
        for &cell in positive {
            point[cell] = value;
        }
        real_coordinates.push(positive[0]);
        projected_point.push(value);

        for &cell in polytope.chain(k, ChainKind::Negative) {
            point[cell] = upper_bound - value;
        }
    }

    Ok(Embedding {
        point,
        real_coordinates,
        projected_point,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system(rows: &[Vec<i64>]) -> StandardSystem {
        StandardSystem::from_augmented_rows(rows).unwrap()
    }

    #[test]
    fn test_embed_two_variables() {
        let s = system(&[vec![1, 1, 2]]);
        let e = embed_point(&s, 3, &[2, 0]).unwrap();
        assert_eq!(e.point[[0, 0, 0]], 2);
        assert_eq!(e.point[[1, 1, 0]], 0);
        assert_eq!(e.point[[0, 0, 1]], 1);
        assert_eq!(e.point[[1, 1, 1]], 3);
        assert_eq!(e.real_coordinates, vec![[0, 0, 0], [1, 1, 0]]);
        assert_eq!(e.projected_point, vec![2, 0]);
        assert_eq!(e.project(), vec![2, 0]);
    }

    #[test]
    fn test_embed_multi_unit_column() {
        // 2 y0 - y1 = 1, y0 + y1 = 2 -> y = (1, 1)
        let s = system(&[vec![2, -1, 1], vec![1, 1, 2]]);
        let p = PlaneSumPolytope::encode(&s, 2).unwrap();
        assert_eq!(p.capacities(), &[3, 1]);
        let e = embed_encoded(&p, &s, &[1, 1]).unwrap();

        for &cell in p.chain(0, ChainKind::Positive) {
            assert_eq!(e.point[cell], 1);
        }
        for &cell in p.chain(0, ChainKind::Negative) {
            assert_eq!(e.point[cell], 1);
        }
        assert_eq!(e.real_coordinates.len(), 2);
        assert_eq!(e.real_coordinates[0], p.chain(0, ChainKind::Positive)[0]);
        assert_eq!(e.project(), vec![1, 1]);
        assert!(p.check_plane_sums(&e.point).is_ok());
    }

    #[test]
    fn test_embedding_satisfies_margins() {
        // y0 - y1 + y2 = 1, y1 + y3 = 3
        let s = system(&[vec![1, -1, 1, 0, 1], vec![0, 1, 0, 1, 3]]);
        let p = PlaneSumPolytope::encode(&s, 4).unwrap();
        for y in [[1, 0, 0, 3], [0, 1, 2, 2], [2, 3, 2, 0], [0, 0, 1, 3]] {
            let e = embed_encoded(&p, &s, &y).unwrap();
            assert!(p.check_plane_sums(&e.point).is_ok(), "y = {:?}", y);
            assert_eq!(e.project(), y.to_vec());
        }
    }

    #[test]
    fn test_embed_rejects_bad_points() {
        let s = system(&[vec![1, 1, 2]]);
        assert!(embed_point(&s, 3, &[1]).unwrap_err().is_shape());
        assert!(embed_point(&s, 3, &[1, 0]).unwrap_err().is_infeasible());
        assert!(embed_point(&s, 3, &[3, -1]).unwrap_err().is_infeasible());

        let s = system(&[vec![1, -1, 0]]);
        assert!(embed_point(&s, 3, &[4, 4]).unwrap_err().is_bound());

        // far out of bound: rejected before Ay is formed
        let s = system(&[vec![3, 3]]);
        assert!(embed_point(&s, 3, &[i64::MAX / 2]).unwrap_err().is_bound());
    }

    #[test]
    fn test_embed_rejects_foreign_polytope() {
        let p = PlaneSumPolytope::encode(&system(&[vec![1, 1, 2]]), 3).unwrap();
        let other = system(&[vec![1, 1, 1, 2]]);
        assert!(embed_encoded(&p, &other, &[1, 1, 0]).unwrap_err().is_shape());
    }
}
