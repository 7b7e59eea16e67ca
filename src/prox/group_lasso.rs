//! Group Lasso over Matrix Columns
//!
//! $`\sum_j \|B_{:,j}\|_2`$: every column is a group and gets its own
//! block soft-threshold.

use ndarray::prelude::*;
use ndarray::NdFloat;
use sprs::CsMat;

use super::norm2::shrink_block;
use super::{ProxBase, ScaledProx};
use crate::container::{Container, NumericContainer};
use crate::error::{ProxError, ProxResult};
use crate::params::{check_step, ProxParams};

const NAME: &str = "group_lasso";

/// Proximal operator of the sum of column l2 norms, i.e. the l2 proximal
/// operator applied to each column on its own.
///
/// Sparse matrices stay sparse and keep their storage order.
pub fn prox_group_lasso_base<A>(v: &Container<A>, t: A) -> ProxResult<Container<A>>
where
    A: NdFloat + Default,
{
    check_step(t)?;
    match v {
        Container::Matrix(m) => Ok(Container::Matrix(shrink_columns_dense(m.view(), t))),
        Container::SparseMatrix(m) => Ok(Container::SparseMatrix(shrink_columns_sparse(m, t))),
        Container::Vector(_) | Container::SparseVector(_) => Err(ProxError::ExpectedMatrix {
            operator: NAME,
            found: v.shape(),
        }),
    }
}

fn shrink_columns_dense<A: NdFloat + Default>(m: ArrayView2<A>, t: A) -> Array2<A> {
    let mut out = Array2::zeros(m.raw_dim());
    for (j, col) in m.columns().into_iter().enumerate() {
        if let Some(x) = shrink_block(&col.to_owned(), t) {
            out.column_mut(j).assign(&x);
        }
    }
    out
}

fn shrink_columns_sparse<A: NdFloat + Default>(m: &CsMat<A>, t: A) -> CsMat<A> {
    // compressed columns make every group one outer lane
    let csc = if m.is_csc() { m.clone() } else { m.to_csc() };
    let mut indptr = Vec::with_capacity(csc.cols() + 1);
    let mut indices = Vec::with_capacity(csc.nnz());
    let mut data = Vec::with_capacity(csc.nnz());
    indptr.push(0);
    for col in csc.outer_iterator() {
        if let Some(x) = shrink_block(&col.to_owned(), t) {
            indices.extend_from_slice(x.indices());
            data.extend_from_slice(x.data());
        }
        indptr.push(indices.len());
    }
    let out = CsMat::new_csc((csc.rows(), csc.cols()), indptr, indices, data);
    if m.is_csr() {
        out.to_csr()
    } else {
        out
    }
}

/// Sum of column l2 norms
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupLasso;

impl<A: NdFloat + Default> ProxBase<A> for GroupLasso {
    fn name(&self) -> &'static str {
        NAME
    }

    fn prox(&self, v: &Container<A>, t: A) -> ProxResult<Container<A>> {
        prox_group_lasso_base(v, t)
    }
}

/// Proximal operator of
/// $`\sum_j \|(a B - C)_{:,j}\|_2 + \langle c, B\rangle + d\|B\|_F^2`$.
pub fn prox_group_lasso<A: NdFloat + Default>(
    v: &Container<A>,
    t: A,
    params: ProxParams<A>,
) -> ProxResult<Container<A>> {
    ScaledProx::new(GroupLasso, params)?.eval(v, t)
}
