//! Utility modules shared by the reduction stages.
//!
//! - Error types
//! - Dense integer tensors

pub mod errors;
pub mod tensor;

// Re-exports
pub use errors::*;
pub use tensor::{Cell, Tensor3};
