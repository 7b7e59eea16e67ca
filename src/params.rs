//! Affine and quadratic parameters of a composed proximal operator
//!
//! A [`ProxParams`] bundle `(a, b, c, d)` turns the proximal operator of
//! $`f`$ into the proximal operator of
//! ```math
//! f(a \circ x - b) + c^T x + d \|x\|_2^2
//! ```
//! The defaults `a = 1, b = 0, c = 0, d = 0` leave $`f`$ untouched.

use ndarray::prelude::*;
use ndarray::NdFloat;
use sprs::{CsMat, CsVec};

use crate::container::{Container, NumericContainer};
use crate::error::{ProxError, ProxResult};

/// A parameter given either as one scalar or entry by entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Param<A> {
    Scalar(A),
    Elementwise(Container<A>),
}

impl From<f64> for Param<f64> {
    fn from(x: f64) -> Self {
        Param::Scalar(x)
    }
}

impl From<f32> for Param<f32> {
    fn from(x: f32) -> Self {
        Param::Scalar(x)
    }
}

impl<A> From<Container<A>> for Param<A> {
    fn from(x: Container<A>) -> Self {
        Param::Elementwise(x)
    }
}

impl<A> From<Array1<A>> for Param<A> {
    fn from(x: Array1<A>) -> Self {
        Param::Elementwise(Container::Vector(x))
    }
}

impl<A> From<Array2<A>> for Param<A> {
    fn from(x: Array2<A>) -> Self {
        Param::Elementwise(Container::Matrix(x))
    }
}

impl<A> From<CsVec<A>> for Param<A> {
    fn from(x: CsVec<A>) -> Self {
        Param::Elementwise(Container::SparseVector(x))
    }
}

impl<A> From<CsMat<A>> for Param<A> {
    fn from(x: CsMat<A>) -> Self {
        Param::Elementwise(Container::SparseMatrix(x))
    }
}

impl<A: NdFloat + Default> Param<A> {
    /// The common value if every entry is equal.
    ///
    /// A sparse parameter with implicit zeros is uniform only when it is
    /// zero everywhere.
    pub fn uniform(&self) -> Option<A> {
        match self {
            Param::Scalar(x) => Some(*x),
            Param::Elementwise(c) => {
                let mut values: Box<dyn Iterator<Item = A> + '_> = match c {
                    Container::Vector(x) => Box::new(x.iter().copied()),
                    Container::Matrix(x) => Box::new(x.iter().copied()),
                    Container::SparseVector(x) => {
                        if x.nnz() < x.dim() {
                            return if x.data().iter().all(|&v| v == A::zero()) {
                                Some(A::zero())
                            } else {
                                None
                            };
                        }
                        Box::new(x.data().iter().copied())
                    }
                    Container::SparseMatrix(x) => {
                        if x.nnz() < x.rows() * x.cols() {
                            return if x.data().iter().all(|&v| v == A::zero()) {
                                Some(A::zero())
                            } else {
                                None
                            };
                        }
                        Box::new(x.data().iter().copied())
                    }
                };
                let first = values.next()?;
                if values.all(|v| v == first) {
                    Some(first)
                } else {
                    None
                }
            }
        }
    }

    /// Whether this parameter is exactly the scalar `x`.
    pub fn is_scalar(&self, x: A) -> bool {
        matches!(self, Param::Scalar(v) if *v == x)
    }

    /// Entrywise `f(v, param)`; see `Container::zip_with` for how storage
    /// is kept.
    pub(crate) fn apply_to<F>(
        &self,
        v: &Container<A>,
        name: &'static str,
        keeps_zero: bool,
        f: F,
    ) -> ProxResult<Container<A>>
    where
        F: Fn(A, A) -> A,
    {
        match self {
            Param::Scalar(k) => Ok(v.map_with_scalar(*k, name, f)),
            Param::Elementwise(p) => v.zip_with(p, name, keeps_zero, f),
        }
    }

    fn check_shape(&self, v: &Container<A>, name: &'static str) -> ProxResult<()> {
        match self {
            Param::Elementwise(p) if p.shape() != v.shape() => Err(ProxError::ShapeMismatch {
                param: name,
                expected: v.shape(),
                found: p.shape(),
            }),
            _ => Ok(()),
        }
    }

    /// Flat row-major index of the first zero entry, if any.
    fn first_zero(&self) -> Option<usize> {
        let zero = A::zero();
        match self {
            Param::Scalar(x) => (*x == zero).then(|| 0),
            Param::Elementwise(Container::Vector(x)) => x.iter().position(|&v| v == zero),
            Param::Elementwise(Container::Matrix(x)) => x.iter().position(|&v| v == zero),
            Param::Elementwise(Container::SparseVector(x)) => {
                // an implicit zero counts as well as a stored one
                (0..x.dim()).find(|&i| x.get(i).map_or(true, |&v| v == zero))
            }
            Param::Elementwise(Container::SparseMatrix(x)) => {
                let cols = x.cols();
                (0..x.rows() * cols)
                    .find(|&k| x.get(k / cols, k % cols).map_or(true, |&v| v == zero))
            }
        }
    }
}

/// Parameters `(a, b, c, d)` of the composed penalty
/// $`f(a \circ x - b) + c^T x + d \|x\|_2^2`$.
///
/// Built with chained setters starting from the defaults:
/// ```
/// use ndarray_prox::ProxParams;
/// let params = ProxParams::<f64>::new().scale(2.0).offset(1.0);
/// assert!(!params.is_identity());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ProxParams<A> {
    /// `a`, non-zero everywhere
    pub scale: Param<A>,
    /// `b`
    pub offset: Param<A>,
    /// `c`
    pub lin_term: Param<A>,
    /// `d`, non-negative
    pub quad_term: A,
}

impl<A: NdFloat + Default> Default for ProxParams<A> {
    fn default() -> Self {
        ProxParams {
            scale: Param::Scalar(A::one()),
            offset: Param::Scalar(A::zero()),
            lin_term: Param::Scalar(A::zero()),
            quad_term: A::zero(),
        }
    }
}

impl<A: NdFloat + Default> ProxParams<A> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn scale(mut self, a: impl Into<Param<A>>) -> Self {
        self.scale = a.into();
        self
    }

    #[must_use]
    pub fn offset(mut self, b: impl Into<Param<A>>) -> Self {
        self.offset = b.into();
        self
    }

    #[must_use]
    pub fn lin_term(mut self, c: impl Into<Param<A>>) -> Self {
        self.lin_term = c.into();
        self
    }

    #[must_use]
    pub fn quad_term(mut self, d: A) -> Self {
        self.quad_term = d;
        self
    }

    /// True when the bundle is exactly the default.
    pub fn is_identity(&self) -> bool {
        self.scale.is_scalar(A::one())
            && self.offset.is_scalar(A::zero())
            && self.lin_term.is_scalar(A::zero())
            && self.quad_term == A::zero()
    }

    /// Checks the parts of the bundle that do not depend on the input.
    pub fn validate(&self) -> ProxResult<()> {
        if !(self.quad_term >= A::zero()) || !self.quad_term.is_finite() {
            return Err(ProxError::NegativeQuadTerm {
                quad: self.quad_term.to_f64().unwrap_or(f64::NAN),
            });
        }
        if let Param::Scalar(_) = self.scale {
            if let Some(index) = self.scale.first_zero() {
                return Err(ProxError::ZeroScale { index });
            }
        }
        Ok(())
    }

    /// Checks the bundle against the input it is about to be applied to.
    pub fn validate_for(&self, v: &Container<A>) -> ProxResult<()> {
        self.validate()?;
        self.scale.check_shape(v, "scale")?;
        self.offset.check_shape(v, "offset")?;
        self.lin_term.check_shape(v, "lin_term")?;
        if let Some(index) = self.scale.first_zero() {
            return Err(ProxError::ZeroScale { index });
        }
        Ok(())
    }
}

/// Rejects step sizes that are not strictly positive and finite.
pub fn check_step<A: NdFloat + Default>(t: A) -> ProxResult<()> {
    if t > A::zero() && t.is_finite() {
        Ok(())
    } else {
        Err(ProxError::NonPositiveStep {
            step: t.to_f64().unwrap_or(f64::NAN),
        })
    }
}

/// Entrywise version of [`check_step`]; an implicit sparse zero is a zero step.
pub fn check_steps<A: NdFloat + Default>(t: &Container<A>) -> ProxResult<()> {
    let implicit_zero = match t {
        Container::SparseVector(x) => x.nnz() < x.dim(),
        Container::SparseMatrix(x) => x.nnz() < x.rows() * x.cols(),
        _ => false,
    };
    if implicit_zero {
        return check_step(A::zero());
    }
    let bad = match t {
        Container::Vector(x) => x.iter().copied().find(|&s| check_step(s).is_err()),
        Container::Matrix(x) => x.iter().copied().find(|&s| check_step(s).is_err()),
        Container::SparseVector(x) => x.data().iter().copied().find(|&s| check_step(s).is_err()),
        Container::SparseMatrix(x) => x.data().iter().copied().find(|&s| check_step(s).is_err()),
    };
    bad.map_or(Ok(()), check_step)
}
