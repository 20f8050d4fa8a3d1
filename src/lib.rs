//! # Transpoly - Transportation Polytope Representations
//!
//! Constructive reduction of integer programs in standard form
//! `{y >= 0 : Ay = b}` to three-index transportation polytopes, following
//! De Loera and Onn (2006):
//! - Binary-decomposition preprocessing to small coefficients
//! - Plane-sum entry-forbidden encoding
//! - Slim line-sum encoding (two-index margins, no forbidden cells)
//! - Embedding of feasible points through every stage, with the coordinates
//!   that carry the original variables
//!
//! ## Architecture
//!
//! ```text
//! StandardSystem → Preprocess → PlaneSumPolytope → SlimLineSumPolytope
//! ```
//!
//! ## Example
//!
//! ```rust
//! use transpoly::prelude::*;
//!
//! // y0 + y1 = 2 with 0 <= y <= 3
//! let system = StandardSystem::from_augmented_rows(&[vec![1, 1, 2]])?;
//! let slim = transpoly::slim_line_sum_representation(&system, 3)?;
//! assert_eq!(slim.shape(), [4, 6, 3]);
//!
//! let embedded = transpoly::embed_in_slim_line_sum(&system, 3, &[2, 0])?;
//! assert_eq!(embedded.projected_point, vec![2, 0]);
//! # Ok::<(), transpoly::utils::TransPolyError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod utils;
pub mod system;
pub mod plane_sum;
pub mod slim_line_sum;
pub mod embedding;
pub mod pipeline;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::system::{StandardSystem, Preprocessed};
    pub use crate::plane_sum::{ChainKind, PlaneSumPolytope};
    pub use crate::slim_line_sum::{ColumnBlock, SlimLineSumPolytope};
    pub use crate::embedding::Embedding;
    pub use crate::pipeline::{PreprocessMode, Reduction, ReductionConfig};
    pub use crate::utils::tensor::{Cell, Tensor3};
    pub use crate::utils::errors::*;
}

use embedding::Embedding;
use plane_sum::PlaneSumPolytope;
use slim_line_sum::SlimLineSumPolytope;
use system::{Preprocessed, StandardSystem};
use utils::errors::ReprResult;
use utils::tensor::{Cell, Tensor3};

/// Reduce coefficients to `{-1, 0, 1}` plus doubling rows.
///
/// Systems whose coefficients are at most 2 in magnitude are returned unchanged.
pub fn preprocess(system: &StandardSystem) -> Preprocessed {
    system::preprocess(system)
}

/// Encode a system as a plane-sum entry-forbidden polytope.
pub fn encode_plane_sum(system: &StandardSystem, upper_bound: i64) -> ReprResult<PlaneSumPolytope> {
    PlaneSumPolytope::encode(system, upper_bound)
}

/// Embed a feasible point of `system` into its plane-sum polytope.
pub fn embed_point_plane_sum(
    system: &StandardSystem,
    upper_bound: i64,
    y: &[i64],
) -> ReprResult<Embedding> {
    plane_sum::embed_point(system, upper_bound, y)
}

/// Encode a plane-sum polytope as a slim line-sum polytope.
pub fn encode_slim_line_sum(polytope: &PlaneSumPolytope) -> ReprResult<SlimLineSumPolytope> {
    SlimLineSumPolytope::encode(polytope)
}

/// Embed a point of a plane-sum polytope into its slim line-sum polytope.
pub fn embed_point_slim_line_sum(
    polytope: &PlaneSumPolytope,
    y: &Tensor3,
    real_coordinates: Option<&[Cell]>,
) -> ReprResult<Embedding> {
    slim_line_sum::embed_point(polytope, y, real_coordinates)
}

/// Full reduction: preprocess (when needed), then plane-sum, then slim line-sum.
pub fn slim_line_sum_representation(
    system: &StandardSystem,
    upper_bound: i64,
) -> ReprResult<SlimLineSumPolytope> {
    let config = pipeline::ReductionConfig::new(upper_bound);
    pipeline::Reduction::build(system, &config).map(pipeline::Reduction::into_slim_line_sum)
}

/// Full embedding of a feasible point of `system` into its slim line-sum polytope.
pub fn embed_in_slim_line_sum(
    system: &StandardSystem,
    upper_bound: i64,
    y: &[i64],
) -> ReprResult<Embedding> {
    let config = pipeline::ReductionConfig::new(upper_bound);
    pipeline::Reduction::build(system, &config)?.embed(y)
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_free_functions_compose() {
        let s = StandardSystem::from_augmented_rows(&[vec![1, 1, 2]]).unwrap();
        let p = encode_plane_sum(&s, 3).unwrap();
        let inner = embed_point_plane_sum(&s, 3, &[0, 2]).unwrap();
        let slim = encode_slim_line_sum(&p).unwrap();
        let outer =
            embed_point_slim_line_sum(&p, &inner.point, Some(inner.real_coordinates.as_slice()))
                .unwrap();
        assert!(slim.check_line_sums(&outer.point).is_ok());
        assert_eq!(outer.project(), vec![0, 2]);
        assert_eq!(slim, slim_line_sum_representation(&s, 3).unwrap());
    }
}
