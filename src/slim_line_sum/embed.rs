//! Embedding plane-sum points into the slim line-sum polytope.
//!
//! For the row of pair `(i, j)` with fiber total `s = sum(y[i, j, :])`:
//!
//! ```text
//! x[row, k, 0]        = y[i, j, k]           k < n
//! x[row, k, 1]        = e[i, j, k] - y[i, j, k]
//! x[row, n + i, 0]    = bound - s            x[row, n + i, 2]     = s
//! x[row, n + l + j, 1] = s                   x[row, n + l + j, 2] = bound - s
//! ```
//!
//! where `e` is the bound tensor of the plane-sum polytope.

use super::polytope::{ColumnBlock, SlimLineSumPolytope};
use crate::embedding::Embedding;
use crate::plane_sum::PlaneSumPolytope;
use crate::utils::errors::{ReprResult, ShapeError, ShapeErrorKind};
use crate::utils::tensor::{Cell, Tensor3};

/// Embed a point `y` of `polytope` into its slim line-sum polytope.
///
/// `real_coordinates` lists the cells of `y` that are images of original
/// variables; only those are reported as real in the result, in the given
/// order. Without it every cell of `y` counts as real.
pub fn embed_point(
    polytope: &PlaneSumPolytope,
    y: &Tensor3,
    real_coordinates: Option<&[Cell]>,
) -> ReprResult<Embedding> {
    let slim = SlimLineSumPolytope::encode(polytope)?;
    embed_encoded(&slim, polytope, y, real_coordinates)
}

/// Embed `y` into a slim line-sum polytope already encoded from `polytope`.
pub fn embed_encoded(
    slim: &SlimLineSumPolytope,
    polytope: &PlaneSumPolytope,
    y: &Tensor3,
    real_coordinates: Option<&[Cell]>,
) -> ReprResult<Embedding> {
    if slim.source_shape() != polytope.shape() {
        return Err(ShapeError::new(
            ShapeErrorKind::TensorShape,
            "slim line-sum polytope was not encoded from this plane-sum polytope",
        )
        .with_dims(&polytope.shape(), &slim.source_shape())
        .into());
    }
    polytope.check_plane_sums(y)?;
    if let Some(cell) = real_coordinates
        .into_iter()
        .flatten()
        .find(|&&cell| !y.contains(cell))
    {
        return Err(ShapeError::new(
            ShapeErrorKind::CoordinateOutOfRange,
            format!("real coordinate {:?} lies outside the tensor", cell),
        )
        .with_dims(&y.shape(), cell)
        .into());
    }

    let [l, m, n] = polytope.shape();
    let bound = slim.bound();
    let bounds = polytope.bound_tensor();
    let mut x = Tensor3::zeros(slim.shape());

    for i in 0..l {
        for j in 0..m {
            let row = slim.row_index(i, j);
            let fiber = y.fiber_sum(i, j);
            for k in 0..n {
                x[[row, k, 0]] = y[[i, j, k]];
                x[[row, k, 1]] = bounds[[i, j, k]] - y[[i, j, k]];
            }

            let row_pad = slim.column_index(ColumnBlock::Row, i);
            x[[row, row_pad, 0]] = bound - fiber;
            x[[row, row_pad, 2]] = fiber;

            let column_pad = slim.column_index(ColumnBlock::Column, j);
            x[[row, column_pad, 1]] = fiber;
            x[[row, column_pad, 2]] = bound - fiber;
        }
    }

    let sources: Vec<Cell> = match real_coordinates {
        Some(cells) => cells.to_vec(),
        None => (0..l)
            .flat_map(|i| (0..m).flat_map(move |j| (0..n).map(move |k| [i, j, k])))
            .collect(),
    };
    let real_coordinates = sources
        .iter()
        .map(|&[i, j, k]| [slim.row_index(i, j), slim.column_index(ColumnBlock::Plane, k), 0])
        .collect();
    let projected_point = sources.iter().map(|&cell| y[cell]).collect();

    Ok(Embedding {
        point: x,
        real_coordinates,
        projected_point,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plane_sum;
    use crate::system::StandardSystem;

    fn system(rows: &[Vec<i64>]) -> StandardSystem {
        StandardSystem::from_augmented_rows(rows).unwrap()
    }

    #[test]
    fn test_embed_two_variables() {
        let s = system(&[vec![1, 1, 2]]);
        let p = PlaneSumPolytope::encode(&s, 3).unwrap();
        let inner = plane_sum::embed_point(&s, 3, &[2, 0]).unwrap();
        let e = embed_point(&p, &inner.point, Some(inner.real_coordinates.as_slice())).unwrap();

        assert_eq!(e.point.shape(), [4, 6, 3]);
        // row (0, 0): fiber total 3 = 2 + 1
        assert_eq!(e.point[[0, 0, 0]], 2);
        assert_eq!(e.point[[0, 1, 0]], 1);
        assert_eq!(e.point[[0, 0, 1]], 1);
        assert_eq!(e.point[[0, 1, 1]], 2);
        assert_eq!(e.point[[0, 2, 0]], 0);
        assert_eq!(e.point[[0, 2, 2]], 3);
        assert_eq!(e.point[[0, 4, 1]], 3);
        assert_eq!(e.point[[0, 4, 2]], 0);
        // row (0, 1): empty fiber, padding only
        assert_eq!(e.point[[1, 2, 0]], 3);
        assert_eq!(e.point[[1, 5, 2]], 3);

        assert_eq!(e.real_coordinates, vec![[0, 0, 0], [3, 0, 0]]);
        assert_eq!(e.projected_point, vec![2, 0]);
        assert_eq!(e.project(), vec![2, 0]);

        let slim = SlimLineSumPolytope::encode(&p).unwrap();
        assert!(slim.check_line_sums(&e.point).is_ok());
    }

    #[test]
    fn test_embed_without_provenance() {
        let s = system(&[vec![1, 1, 2]]);
        let p = PlaneSumPolytope::encode(&s, 3).unwrap();
        let inner = plane_sum::embed_point(&s, 3, &[1, 1]).unwrap();
        let e = embed_point(&p, &inner.point, None).unwrap();
        assert_eq!(e.real_coordinates.len(), 2 * 2 * 2);
        assert_eq!(e.projected_point.iter().sum::<i64>(), inner.point.total());
        assert_eq!(e.project(), e.projected_point);
    }

    #[test]
    fn test_embed_rejects_points_outside() {
        let s = system(&[vec![1, 1, 2]]);
        let p = PlaneSumPolytope::encode(&s, 3).unwrap();
        let inner = plane_sum::embed_point(&s, 3, &[2, 0]).unwrap();

        let mut broken = inner.point.clone();
        broken[[0, 0, 0]] = 3;
        assert!(embed_point(&p, &broken, None).unwrap_err().is_infeasible());

        assert!(embed_point(&p, &Tensor3::zeros([2, 2, 3]), None).unwrap_err().is_shape());

        let outside = [[0, 0, 5]];
        assert!(embed_point(&p, &inner.point, Some(&outside[..])).unwrap_err().is_shape());
    }
}
