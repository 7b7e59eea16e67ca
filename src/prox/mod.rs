//! Proximal Operators of Norms
//!
//! For a closed convex _f_ and a step $`t > 0`$,
//! ```math
//! \mathrm{prox}_{tf}(v) = \arg\min_x\; t f(x) + \tfrac{1}{2}\|x - v\|_2^2
//! ```
//! Each norm below has a base operator (`prox_*_base`), a zero-sized type
//! implementing [`ProxBase`], and a composed form that folds in an affine
//! argument plus linear and quadratic terms through [`ScaledProx`].

use crate::container::Container;
use crate::error::{ProxError, ProxResult};

mod compose;
pub use compose::*;

mod norm1;
pub use norm1::*;

mod norm2;
pub use norm2::*;

mod norm_inf;
pub use norm_inf::*;

mod nuclear;
pub use nuclear::*;

mod group_lasso;
pub use group_lasso::*;

/// A function with a known proximal operator.
pub trait ProxBase<A> {
    /// Short name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Rejects inputs the operator is not defined for, whatever the
    /// composition does to them afterwards.
    fn check_input(&self, v: &Container<A>) -> ProxResult<()> {
        let _ = v;
        Ok(())
    }

    /// $`\mathrm{prox}_{tf}(v)`$ for a scalar step `t`.
    fn prox(&self, v: &Container<A>, t: A) -> ProxResult<Container<A>>;

    /// Proximal operator with one step per entry.
    ///
    /// Only meaningful for separable functions; the rest keep this default.
    fn prox_elementwise(&self, v: &Container<A>, t: &Container<A>) -> ProxResult<Container<A>> {
        let _ = (v, t);
        Err(ProxError::NonUniformScale {
            operator: self.name(),
        })
    }
}

impl<'a, A, P> ProxBase<A> for &'a P
where
    P: ProxBase<A> + ?Sized,
{
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn check_input(&self, v: &Container<A>) -> ProxResult<()> {
        (**self).check_input(v)
    }

    fn prox(&self, v: &Container<A>, t: A) -> ProxResult<Container<A>> {
        (**self).prox(v, t)
    }

    fn prox_elementwise(&self, v: &Container<A>, t: &Container<A>) -> ProxResult<Container<A>> {
        (**self).prox_elementwise(v, t)
    }
}
