//! The `ndarray-prox` crate provides closed-form proximal operators of
//! common norms for `ndarray` and `sprs` data.
//!
//! It includes:
//! - l1, l2 and l-infinity norms of vectors (and of matrices, entrywise)
//! - the nuclear norm and the column-wise group lasso of matrices
//! - projections onto the l1, l2, l-infinity balls and the simplex
//!
//! Every operator can be composed with an affine argument and linear and
//! quadratic terms, i.e. it evaluates the proximal operator of
//! $`f(a \circ x - b) + c^T x + d\|x\|_2^2`$, which is the form splitting
//! methods such as ADMM or FISTA ask for.
//!
//! ```
//! use ndarray::array;
//! use ndarray_prox::{prox_norm1, Container, ProxParams};
//!
//! let v = Container::from(array![3., -1., 0.5]);
//! let x = prox_norm1(&v, 1., ProxParams::new()).unwrap();
//! assert_eq!(x, Container::from(array![2., 0., 0.]));
//! ```
//!
//! Sparse inputs stay sparse whenever the result is sparse by nature.
//! Operators are pure functions of their inputs and can be called from
//! many threads at once.

#![cfg_attr(all(rustc_nightly, test), feature(test))]
#[cfg(all(rustc_nightly, test))]
extern crate test;

pub mod container;
pub mod error;
pub mod params;
pub mod project;
pub mod prox;

pub use container::{Container, NumericContainer, Representation, Shape};
pub use error::{ProxError, ProxResult};
pub use params::{Param, ProxParams};
pub use prox::*;
