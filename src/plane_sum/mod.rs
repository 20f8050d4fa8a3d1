//! Plane-sum entry-forbidden encoding of standard-form systems.
//!
//! This module provides:
//! - Chain slots and the first-fit plane assignment
//! - The plane-sum polytope and its encoder
//! - Embedding of feasible points

pub mod chain;
pub mod polytope;
pub mod embed;

pub use chain::{ChainKind, ChainLayout, ChainSlot};
pub use polytope::PlaneSumPolytope;
pub use embed::{embed_encoded, embed_point};
