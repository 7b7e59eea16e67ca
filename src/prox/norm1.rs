//! l1 Norm (Soft-Thresholding)

use ndarray::NdFloat;

use super::{ProxBase, ScaledProx};
use crate::container::{Container, NumericContainer};
use crate::error::ProxResult;
use crate::params::{check_step, check_steps, ProxParams};

/// $`\mathrm{sign}(x) \max(|x| - t, 0)`$
#[inline]
pub fn soft_threshold<A: NdFloat + Default>(x: A, t: A) -> A {
    if x > t {
        x - t
    } else if x < -t {
        x + t
    } else {
        A::zero()
    }
}

/// Proximal operator of $`\|x\|_1`$, entrywise over vectors and matrices.
///
/// Sparse input stays sparse; entries that shrink to zero are dropped
/// from the pattern.
pub fn prox_norm1_base<A: NdFloat + Default>(v: &Container<A>, t: A) -> ProxResult<Container<A>> {
    check_step(t)?;
    Ok(v.map_stored(|x| soft_threshold(x, t)).prune_zeros())
}

/// [`prox_norm1_base`] with a separate threshold for every entry.
pub fn prox_norm1_elementwise<A: NdFloat + Default>(
    v: &Container<A>,
    t: &Container<A>,
) -> ProxResult<Container<A>> {
    check_steps(t)?;
    Ok(v.zip_with(t, "step", true, soft_threshold)?.prune_zeros())
}

/// The l1 norm
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Norm1;

impl<A: NdFloat + Default> ProxBase<A> for Norm1 {
    fn name(&self) -> &'static str {
        "norm1"
    }

    fn prox(&self, v: &Container<A>, t: A) -> ProxResult<Container<A>> {
        prox_norm1_base(v, t)
    }

    fn prox_elementwise(&self, v: &Container<A>, t: &Container<A>) -> ProxResult<Container<A>> {
        prox_norm1_elementwise(v, t)
    }
}

/// Proximal operator of $`\|a \circ x - b\|_1 + c^T x + d\|x\|_2^2`$.
///
/// Unlike the other norms, `a` may vary entry by entry.
pub fn prox_norm1<A: NdFloat + Default>(
    v: &Container<A>,
    t: A,
    params: ProxParams<A>,
) -> ProxResult<Container<A>> {
    ScaledProx::new(Norm1, params)?.eval(v, t)
}
