//! Slim line-sum transportation polytopes.
//!
//! The last stage of the reduction: a plane-sum entry-forbidden polytope is
//! re-encoded as a three-index array constrained only by two-index margins.

pub mod polytope;
pub mod embed;

pub use polytope::{ColumnBlock, SlimLineSumPolytope};
pub use embed::{embed_encoded, embed_point};
