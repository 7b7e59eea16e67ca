//! Errors reported by the proximal operators

use thiserror::Error;

use crate::container::{Representation, Shape};

/// Crate-wide result alias.
pub type ProxResult<T> = Result<T, ProxError>;

/// Every failure is detected before any numeric work is done, except
/// `SvdNotConverged`, and none of them is recovered from locally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProxError {
    // ---- Preconditions ----
    /// Step size must be strictly positive and finite.
    #[error("step size must be positive and finite, got {step}")]
    NonPositiveStep { step: f64 },

    /// Scale must be non-zero at every entry.
    #[error("scale must be non-zero, found a zero at flat index {index}")]
    ZeroScale { index: usize },

    /// Quadratic term must be non-negative and finite.
    #[error("quad_term must be non-negative and finite, got {quad}")]
    NegativeQuadTerm { quad: f64 },

    /// Ball radius must be non-negative and finite.
    #[error("radius must be non-negative and finite, got {radius}")]
    InvalidRadius { radius: f64 },

    // ---- Shapes ----
    #[error("{param} has shape {found}, expected {expected}")]
    ShapeMismatch {
        param: &'static str,
        expected: Shape,
        found: Shape,
    },

    #[error("{operator} is only defined for matrices, got {found}")]
    ExpectedMatrix {
        operator: &'static str,
        found: Shape,
    },

    // ---- Representation ----
    #[error("{operator} does not support {representation} input")]
    UnsupportedRepresentation {
        operator: &'static str,
        representation: Representation,
    },

    /// A non-uniform elementwise scale turns the step into a vector,
    /// which only separable penalties accept.
    #[error("{operator} is not separable and cannot take a non-uniform scale")]
    NonUniformScale { operator: &'static str },

    // ---- Numerics ----
    #[error("singular value decomposition did not converge")]
    SvdNotConverged,
}
