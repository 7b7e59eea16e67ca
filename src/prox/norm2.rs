//! l2 Norm (Block Soft-Thresholding)

use ndarray::NdFloat;

use super::{ProxBase, ScaledProx};
use crate::container::{Container, NumericContainer};
use crate::error::ProxResult;
use crate::params::{check_step, ProxParams};

/// Scales `v` by $`1 - t/\|v\|_2`$, or `None` when the block collapses to zero.
pub(crate) fn shrink_block<A, C>(v: &C, t: A) -> Option<C>
where
    A: NdFloat + Default,
    C: NumericContainer<A>,
{
    let norm = v.norm2();
    if norm == A::zero() {
        return None;
    }
    let factor = A::one() - t / norm;
    if factor <= A::zero() {
        return None;
    }
    Some(v.map_stored(|x| x * factor))
}

/// Proximal operator of $`\|x\|_2`$ (Frobenius norm for matrices):
/// ```math
/// \mathrm{prox}_{t\|\cdot\|_2}(v) = \max(1 - t/\|v\|_2,\, 0)\; v
/// ```
/// A zero input maps to zero.
pub fn prox_norm2_base<A: NdFloat + Default>(v: &Container<A>, t: A) -> ProxResult<Container<A>> {
    check_step(t)?;
    Ok(shrink_block(v, t).unwrap_or_else(|| v.zeros_like()))
}

/// The l2 norm
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Norm2;

impl<A: NdFloat + Default> ProxBase<A> for Norm2 {
    fn name(&self) -> &'static str {
        "norm2"
    }

    fn prox(&self, v: &Container<A>, t: A) -> ProxResult<Container<A>> {
        prox_norm2_base(v, t)
    }
}

/// Proximal operator of $`\|a \circ x - b\|_2 + c^T x + d\|x\|_2^2`$.
pub fn prox_norm2<A: NdFloat + Default>(
    v: &Container<A>,
    t: A,
    params: ProxParams<A>,
) -> ProxResult<Container<A>> {
    ScaledProx::new(Norm2, params)?.eval(v, t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::prelude::*;
    use sprs::CsVec;

    #[test]
    fn shrinks_towards_origin() {
        let v = Container::from(array![3., 4.]);
        let x = prox_norm2_base(&v, 2.).unwrap();
        assert_abs_diff_eq!(x.to_dense_array(), array![1.8, 2.4].into_dyn(), epsilon = 1e-12);
    }

    #[test]
    fn collapses_inside_ball() {
        let v = Container::from(array![0.3, 0.4]);
        assert_eq!(prox_norm2_base(&v, 1.).unwrap(), Container::from(array![0., 0.]));
        // exactly on the boundary
        let v = Container::from(array![3., 4.]);
        assert_eq!(prox_norm2_base(&v, 5.).unwrap(), Container::from(array![0., 0.]));
    }

    #[test]
    fn huge_entries_still_shrink() {
        let v = Container::from(array![1e200, 1e200]);
        let x = prox_norm2_base(&v, 1e199).unwrap();
        let factor = 1. - 0.1 / 2f64.sqrt();
        assert_abs_diff_eq!(
            x.to_dense_array() / 1e200,
            array![factor, factor].into_dyn(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn zero_input_is_zero() {
        let v = Container::from(array![0., 0., 0.]);
        assert_eq!(prox_norm2_base(&v, 1.).unwrap(), v);
    }

    #[test]
    fn frobenius_for_matrices() {
        let v = Container::from(array![[3., 0.], [0., 4.]]);
        let x = prox_norm2_base(&v, 2.5).unwrap();
        assert_abs_diff_eq!(
            x.to_dense_array(),
            array![[1.5, 0.], [0., 2.]].into_dyn(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn sparse_keeps_pattern() {
        let v = Container::from(CsVec::new(10, vec![2, 7], vec![3., 4.]));
        match prox_norm2_base(&v, 2.).unwrap() {
            Container::SparseVector(x) => {
                assert_eq!(x.indices(), &[2, 7]);
                assert_abs_diff_eq!(x.data()[0], 1.8, epsilon = 1e-12);
                assert_abs_diff_eq!(x.data()[1], 2.4, epsilon = 1e-12);
            }
            other => panic!("expected a sparse vector, got {:?}", other),
        }
        match prox_norm2_base(&v, 10.).unwrap() {
            Container::SparseVector(x) => assert_eq!(x.nnz(), 0),
            other => panic!("expected a sparse vector, got {:?}", other),
        }
    }

    #[test]
    fn moreau_decomposition() {
        // v = prox(v) + t * proj_{l2 ball}(v / t)
        let v = array![1., -2., 2.];
        let t = 1.5;
        let x = prox_norm2_base(&Container::from(v.clone()), t).unwrap();
        let p = crate::project::proj_l2((&v / t).view(), 1.).unwrap();
        assert_abs_diff_eq!(
            x.to_dense_array(),
            (&v - &(p * t)).into_dyn(),
            epsilon = 1e-12
        );
    }
}
