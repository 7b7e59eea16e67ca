//! Nuclear Norm (Singular Value Thresholding)

use nalgebra::{DMatrix, RealField};
use ndarray::prelude::*;
use ndarray::NdFloat;
use tracing::debug;

use super::{ProxBase, ScaledProx};
use crate::container::{Container, NumericContainer};
use crate::error::{ProxError, ProxResult};
use crate::params::{check_step, ProxParams};

const NAME: &str = "norm_nuc";

// bidiagonal QR sweeps allowed per singular value
const SVD_SWEEPS_PER_VALUE: usize = 100;

/// Proximal operator of the nuclear norm $`\|X\|_* = \sum_i \sigma_i(X)`$:
/// ```math
/// \mathrm{prox}_{t\|\cdot\|_*}(V) = U \max(\Sigma - t, 0) V^T
/// ```
/// The result is always a dense matrix. Sparse input is densified first,
/// since the singular vectors are dense anyway.
pub fn prox_norm_nuc_base<A>(v: &Container<A>, t: A) -> ProxResult<Container<A>>
where
    A: NdFloat + Default + RealField,
{
    check_step(t)?;
    let densified;
    let m = match v {
        Container::Matrix(m) => m,
        Container::SparseMatrix(m) => {
            debug!(
                rows = m.rows(),
                cols = m.cols(),
                nnz = m.nnz(),
                "densifying sparse input for singular value thresholding"
            );
            densified = m.to_dense();
            &densified
        }
        Container::Vector(_) | Container::SparseVector(_) => {
            return Err(ProxError::ExpectedMatrix {
                operator: NAME,
                found: v.shape(),
            })
        }
    };
    singular_value_threshold(m.view(), t).map(Container::Matrix)
}

fn singular_value_threshold<A>(m: ArrayView2<A>, t: A) -> ProxResult<Array2<A>>
where
    A: NdFloat + Default + RealField,
{
    let (rows, cols) = m.dim();
    if rows == 0 || cols == 0 {
        return Ok(m.to_owned());
    }

    let mat = DMatrix::from_fn(rows, cols, |i, j| m[[i, j]]);
    let eps = <A as num_traits::Float>::epsilon();
    let max_iter = SVD_SWEEPS_PER_VALUE * rows.min(cols);
    let mut svd = mat
        .try_svd(true, true, eps, max_iter)
        .ok_or(ProxError::SvdNotConverged)?;

    for s in svd.singular_values.iter_mut() {
        *s = if *s > t { *s - t } else { A::zero() };
    }
    let shrunk = svd.recompose().map_err(|_| ProxError::SvdNotConverged)?;
    Ok(Array2::from_shape_fn((rows, cols), |(i, j)| shrunk[(i, j)]))
}

/// The nuclear (trace) norm
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NuclearNorm;

impl<A: NdFloat + Default + RealField> ProxBase<A> for NuclearNorm {
    fn name(&self) -> &'static str {
        NAME
    }

    fn prox(&self, v: &Container<A>, t: A) -> ProxResult<Container<A>> {
        prox_norm_nuc_base(v, t)
    }
}

/// Proximal operator of $`\|a B - C\|_* + \langle c, B\rangle + d\|B\|_F^2`$.
pub fn prox_norm_nuc<A>(v: &Container<A>, t: A, params: ProxParams<A>) -> ProxResult<Container<A>>
where
    A: NdFloat + Default + RealField,
{
    ScaledProx::new(NuclearNorm, params)?.eval(v, t)
}
