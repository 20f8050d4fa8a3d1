//! Error types for the reduction pipeline.
//!
//! Every component validates its inputs once on entry and reports the first
//! violated precondition. Errors are grouped by category: shape mismatches,
//! infeasible points and bound violations.

use thiserror::Error;
use std::fmt;

/// Top-level error type for the reduction.
#[derive(Error, Debug, Clone)]
pub enum TransPolyError {
    /// Input dimensions are inconsistent with the declared margins
    #[error("Shape error: {0}")]
    Shape(#[from] ShapeError),

    /// A supplied point does not lie in the polytope
    #[error("Infeasible point: {0}")]
    Infeasible(#[from] InfeasibilityError),

    /// The upper bound is too small for a value or margin
    #[error("Bound violation: {0}")]
    Bound(#[from] BoundError),

    /// A produced object failed its own margin check
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TransPolyError {
    /// Whether this is a shape error.
    pub fn is_shape(&self) -> bool {
        matches!(self, Self::Shape(_))
    }

    /// Whether this is an infeasibility error.
    pub fn is_infeasible(&self) -> bool {
        matches!(self, Self::Infeasible(_))
    }

    /// Whether this is a bound violation.
    pub fn is_bound(&self) -> bool {
        matches!(self, Self::Bound(_))
    }
}

/// Dimensions of an input do not match what the component expects.
#[derive(Error, Debug, Clone)]
pub struct ShapeError {
    /// The error message
    pub message: String,
    /// The kind of shape error
    pub kind: ShapeErrorKind,
    /// Expected dimensions (if applicable)
    pub expected: Option<Vec<usize>>,
    /// Dimensions that were found
    pub found: Option<Vec<usize>>,
}

impl ShapeError {
    /// Create a new shape error.
    pub fn new(kind: ShapeErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            expected: None,
            found: None,
        }
    }

    /// Attach expected and found dimensions.
    pub fn with_dims(mut self, expected: &[usize], found: &[usize]) -> Self {
        self.expected = Some(expected.to_vec());
        self.found = Some(found.to_vec());
        self
    }
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let (Some(expected), Some(found)) = (&self.expected, &self.found) {
            write!(f, " (expected: {:?}, found: {:?})", expected, found)?;
        }
        Ok(())
    }
}

/// Kinds of shape errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeErrorKind {
    /// System has no rows or no columns
    EmptySystem,
    /// Matrix rows of different lengths
    RaggedRows,
    /// Right-hand side length differs from the row count
    RhsLength,
    /// Point length differs from the column count
    PointLength,
    /// Tensor shape differs from the polytope shape
    TensorShape,
    /// A column of the constraint matrix is entirely zero
    EmptyColumn,
    /// A coordinate lies outside the tensor
    CoordinateOutOfRange,
}

/// A supplied point violates the constraints it is claimed to satisfy.
#[derive(Error, Debug, Clone)]
pub struct InfeasibilityError {
    /// The error message
    pub message: String,
    /// The kind of infeasibility
    pub kind: InfeasibilityErrorKind,
}

impl InfeasibilityError {
    /// Create a new infeasibility error.
    pub fn new(kind: InfeasibilityErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }
}

impl fmt::Display for InfeasibilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Kinds of infeasibility errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfeasibilityErrorKind {
    /// An entry is negative
    NegativeEntry,
    /// A row of Ay = b does not hold
    EqualityViolated,
    /// A forbidden cell carries a nonzero value
    ForbiddenCell,
    /// A one-index margin does not hold
    PlaneSumViolated,
    /// A two-index margin does not hold
    LineSumViolated,
}

/// The upper bound cannot represent a value or a margin.
#[derive(Error, Debug, Clone)]
pub struct BoundError {
    /// The error message
    pub message: String,
    /// The kind of bound violation
    pub kind: BoundErrorKind,
}

impl BoundError {
    /// Create a new bound error.
    pub fn new(kind: BoundErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Overflow while computing `what`.
    pub fn overflow(what: impl fmt::Display) -> Self {
        Self::new(
            BoundErrorKind::Overflow,
            format!("integer overflow while computing {}", what),
        )
    }
}

impl fmt::Display for BoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Kinds of bound violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundErrorKind {
    /// The upper bound is zero or negative
    NonPositiveBound,
    /// A value exceeds the upper bound
    ExceedsBound,
    /// A derived margin is negative
    NegativeMargin,
    /// Margin arithmetic overflowed `i64`
    Overflow,
}

/// Result type using TransPolyError.
pub type ReprResult<T> = Result<T, TransPolyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_error_display() {
        let err = ShapeError::new(ShapeErrorKind::PointLength, "point has wrong length")
            .with_dims(&[3], &[2]);
        let s = format!("{}", err);
        assert!(s.contains("point has wrong length"));
        assert!(s.contains("[3]"));
        assert!(s.contains("[2]"));
    }

    #[test]
    fn test_error_category() {
        let err: TransPolyError =
            BoundError::new(BoundErrorKind::ExceedsBound, "y[0] = 5 exceeds 3").into();
        assert!(err.is_bound());
        assert!(!err.is_shape());
        assert!(format!("{}", err).starts_with("Bound violation"));

        let err: TransPolyError = BoundError::overflow("w[0]").into();
        assert!(format!("{}", err).contains("overflow"));
    }
}
