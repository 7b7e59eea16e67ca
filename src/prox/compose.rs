//! Affine Arguments with Linear and Quadratic Terms
//!
//! Given the proximal operator $`P_f`$ of _f_, the proximal operator of
//! ```math
//! \phi(x) = f(a \circ x - b) + c^T x + d\|x\|_2^2
//! ```
//! with step _t_ follows in closed form. Completing the square absorbs the
//! linear and quadratic terms,
//! ```math
//! s = \frac{1}{1 + 2td}, \qquad \hat v = s\,(v - tc)
//! ```
//! and the change of variables $`y = a \circ x - b`$ moves the scale into
//! the step,
//! ```math
//! \mathrm{prox}_{t\phi}(v) = \big(P_f(a \circ \hat v - b,\; t s a^2) + b\big) / a
//! ```
//! With more than one distinct value in _a_ the step $`t s a^2`$ is a
//! vector, which only separable _f_ can take.

use ndarray::NdFloat;
use tracing::trace;

use super::ProxBase;
use crate::container::{Container, NumericContainer};
use crate::error::ProxResult;
use crate::params::{check_step, Param, ProxParams};

/// A base operator together with the parameters of its composition.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledProx<P, A> {
    base: P,
    params: ProxParams<A>,
}

impl<P, A> ScaledProx<P, A>
where
    P: ProxBase<A>,
    A: NdFloat + Default,
{
    /// Fails if the parameters are invalid regardless of the input.
    pub fn new(base: P, params: ProxParams<A>) -> ProxResult<Self> {
        params.validate()?;
        Ok(ScaledProx { base, params })
    }

    pub fn base(&self) -> &P {
        &self.base
    }

    pub fn params(&self) -> &ProxParams<A> {
        &self.params
    }

    /// Proximal operator of the composed function at `v` with step `t`.
    ///
    /// Shapes of the elementwise parameters are checked against `v`
    /// before anything is computed.
    pub fn eval(&self, v: &Container<A>, t: A) -> ProxResult<Container<A>> {
        check_step(t)?;
        self.base.check_input(v)?;
        self.params.validate_for(v)?;

        let ProxParams {
            scale,
            offset,
            lin_term,
            quad_term,
        } = &self.params;
        let one = A::one();
        let s = one / (one + (one + one) * t * *quad_term);

        // s (v - t c)
        let v_hat = lin_term
            .apply_to(v, "lin_term", false, |x, c| x - t * c)?
            .scaled(s);
        // a v_hat - b
        let point = scale.apply_to(&v_hat, "scale", true, |x, a| a * x)?;
        let point = offset.apply_to(&point, "offset", false, |x, b| x - b)?;

        // None when the step differs entry by entry
        let scaled_step = scale.uniform().map(|a| t * s * a * a);
        trace!(
            operator = self.base.name(),
            step = ?t,
            scaled_step = ?scaled_step,
            shape = %v.shape(),
            representation = %v.representation(),
            "evaluating composed proximal operator"
        );
        let y = match scale {
            Param::Scalar(a) => self.base.prox(&point, t * s * *a * *a)?,
            Param::Elementwise(a) => match scaled_step {
                Some(step) => self.base.prox(&point, step)?,
                None => {
                    let steps = a.map_stored(|a| t * s * a * a);
                    self.base.prox_elementwise(&point, &steps)?
                }
            },
        };

        // (y + b) / a
        let y = offset.apply_to(&y, "offset", false, |y, b| y + b)?;
        let x = scale.apply_to(&y, "scale", true, |y, a| y / a)?;
        Ok(x.prune_zeros())
    }
}

/// Compositions nest: the outer parameters act on the inner composed function.
impl<P, A> ProxBase<A> for ScaledProx<P, A>
where
    P: ProxBase<A>,
    A: NdFloat + Default,
{
    fn name(&self) -> &'static str {
        self.base.name()
    }

    fn check_input(&self, v: &Container<A>) -> ProxResult<()> {
        self.base.check_input(v)
    }

    fn prox(&self, v: &Container<A>, t: A) -> ProxResult<Container<A>> {
        self.eval(v, t)
    }
}
