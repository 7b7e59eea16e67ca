//! l-infinity Norm
//!
//! Computed through the Moreau decomposition against the l1 ball,
//! ```math
//! \mathrm{prox}_{t\|\cdot\|_\infty}(v) = v - t\, \Pi_{\|\cdot\|_1 \leq 1}(v / t)
//! ```
//! Matrices are treated as flat collections of entries.

use ndarray::NdFloat;

use super::{soft_threshold, ProxBase, ScaledProx};
use crate::container::{Container, NumericContainer};
use crate::error::{ProxError, ProxResult};
use crate::params::{check_step, ProxParams};
use crate::project::l1_ball_threshold;

const NAME: &str = "norm_inf";

fn sparse_input<A: NdFloat + Default>(v: &Container<A>) -> ProxError {
    ProxError::UnsupportedRepresentation {
        operator: NAME,
        representation: v.representation(),
    }
}

/// Proximal operator of $`\|x\|_\infty`$ (max-abs over all entries).
///
/// The projection couples every entry, including implicit zeros, so
/// sparse input is rejected.
pub fn prox_norm_inf_base<A>(v: &Container<A>, t: A) -> ProxResult<Container<A>>
where
    A: NdFloat + Default,
{
    check_step(t)?;
    let theta = match v {
        Container::Vector(x) => l1_ball_threshold(x.iter().map(|&x| x / t), A::one())?,
        Container::Matrix(x) => l1_ball_threshold(x.iter().map(|&x| x / t), A::one())?,
        Container::SparseVector(_) | Container::SparseMatrix(_) => return Err(sparse_input(v)),
    };
    // entries below t * theta in magnitude pass through, the rest are clipped
    Ok(v.map_stored(|x| x - t * soft_threshold(x / t, theta)))
}

/// The l-infinity norm
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormInf;

impl<A: NdFloat + Default> ProxBase<A> for NormInf {
    fn name(&self) -> &'static str {
        NAME
    }

    // a non-zero offset would densify sparse input before it gets here
    fn check_input(&self, v: &Container<A>) -> ProxResult<()> {
        if v.is_sparse() {
            return Err(sparse_input(v));
        }
        Ok(())
    }

    fn prox(&self, v: &Container<A>, t: A) -> ProxResult<Container<A>> {
        prox_norm_inf_base(v, t)
    }
}

/// Proximal operator of $`\|a \circ x - b\|_\infty + c^T x + d\|x\|_2^2`$.
pub fn prox_norm_inf<A: NdFloat + Default>(
    v: &Container<A>,
    t: A,
    params: ProxParams<A>,
) -> ProxResult<Container<A>> {
    ScaledProx::new(NormInf, params)?.eval(v, t)
}
