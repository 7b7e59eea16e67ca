//! Euclidean Projections onto Norm Balls
//!
//! The proximal operator of a norm and the projection onto the unit ball
//! of its dual norm are two halves of the Moreau decomposition
//! ```math
//! v = \mathrm{prox}_{t\|\cdot\|}(v) + t\, \Pi_{\|\cdot\|_* \leq 1}(v / t)
//! ```
//! so a cheap projection gives a cheap proximal operator. The l1 ball is
//! the one that needs work: its projection is a soft-threshold whose level
//! is found by sorting (Duchi et al., 2008).

use std::cmp::Ordering;

use ndarray::prelude::*;
use ndarray::NdFloat;

use crate::error::{ProxError, ProxResult};
use crate::prox::soft_threshold;

fn check_radius<A: NdFloat + Default>(radius: A) -> ProxResult<()> {
    if radius >= A::zero() && radius.is_finite() {
        Ok(())
    } else {
        Err(ProxError::InvalidRadius {
            radius: radius.to_f64().unwrap_or(f64::NAN),
        })
    }
}

/// Level $`\theta`$ with $`\sum_i \max(v_i - \theta, 0) = r`$.
///
/// Sort descending, keep the running sum $`c_j`$, and take the last index
/// where $`u_j - (c_j - r)/(j+1)`$ is still positive.
fn simplex_threshold<A: NdFloat + Default>(mut values: Vec<A>, radius: A) -> A {
    values.sort_unstable_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));

    // with radius 0 no index qualifies and everything is clipped
    let mut theta = values.first().copied().unwrap_or_else(A::zero);
    let mut cumsum = A::zero();
    let mut count = A::zero();
    for &u in &values {
        cumsum += u;
        count += A::one();
        let candidate = (cumsum - radius) / count;
        if u - candidate > A::zero() {
            theta = candidate;
        }
    }
    theta
}

/// Soft-threshold level that projects `values` onto the l1 ball of `radius`.
///
/// Zero if the values are already inside the ball.
pub fn l1_ball_threshold<A, I>(values: I, radius: A) -> ProxResult<A>
where
    A: NdFloat + Default,
    I: IntoIterator<Item = A>,
{
    check_radius(radius)?;
    let magnitudes: Vec<A> = values.into_iter().map(|x| x.abs()).collect();
    let l1 = magnitudes.iter().fold(A::zero(), |acc, &x| acc + x);
    if l1 <= radius {
        return Ok(A::zero());
    }
    Ok(simplex_threshold(magnitudes, radius).max(A::zero()))
}

/// Projection onto $`\{x : \|x\|_1 \leq r\}`$
pub fn proj_l1<A: NdFloat + Default>(v: ArrayView1<A>, radius: A) -> ProxResult<Array1<A>> {
    let theta = l1_ball_threshold(v.iter().copied(), radius)?;
    Ok(v.mapv(|x| soft_threshold(x, theta)))
}

/// Projection onto the scaled probability simplex
/// $`\{x : x \geq 0, \sum_i x_i = r\}`$
pub fn proj_simplex<A: NdFloat + Default>(v: ArrayView1<A>, radius: A) -> ProxResult<Array1<A>> {
    check_radius(radius)?;
    let theta = simplex_threshold(v.to_vec(), radius);
    Ok(v.mapv(|x| (x - theta).max(A::zero())))
}

/// Projection onto $`\{x : \|x\|_2 \leq r\}`$
pub fn proj_l2<A: NdFloat + Default>(v: ArrayView1<A>, radius: A) -> ProxResult<Array1<A>> {
    check_radius(radius)?;
    let norm = v.fold(A::zero(), |acc, &x| acc + x * x).sqrt();
    if norm <= radius {
        Ok(v.to_owned())
    } else {
        Ok(v.mapv(|x| x * (radius / norm)))
    }
}

/// Projection onto $`\{x : \|x\|_\infty \leq r\}`$, i.e. clipping
pub fn proj_linf<A: NdFloat + Default>(v: ArrayView1<A>, radius: A) -> ProxResult<Array1<A>> {
    check_radius(radius)?;
    Ok(v.mapv(|x| x.max(-radius).min(radius)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn l1(x: &Array1<f64>) -> f64 {
        x.iter().map(|v| v.abs()).sum()
    }

    #[test]
    fn l1_inside_ball_is_unchanged() {
        let v = array![0.2, -0.3, 0.1];
        let p = proj_l1(v.view(), 1.).unwrap();
        assert_eq!(p, v);
    }

    #[test]
    fn l1_sorted_threshold() {
        let p = proj_l1(array![3., -1., 0.5].view(), 1.).unwrap();
        assert_abs_diff_eq!(p, array![1., 0., 0.], epsilon = 1e-12);

        let p = proj_l1(array![1., -1.].view(), 1.).unwrap();
        assert_abs_diff_eq!(p, array![0.5, -0.5], epsilon = 1e-12);

        let p = proj_l1(array![2., -2.].view(), 0.).unwrap();
        assert_abs_diff_eq!(p, array![0., 0.], epsilon = 1e-12);
    }

    #[test]
    fn l1_lands_on_the_sphere() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let v = Array1::from_shape_fn(12, |_| rng.gen_range(-3.0..3.0));
            let p = proj_l1(v.view(), 1.).unwrap();
            assert_abs_diff_eq!(l1(&p), 1., epsilon = 1e-10);
            // signs are kept, magnitudes only shrink
            for (x, y) in v.iter().zip(p.iter()) {
                assert!(x * y >= 0.);
                assert!(y.abs() <= x.abs());
            }
            // projecting again changes nothing
            let pp = proj_l1(p.view(), 1.).unwrap();
            assert_abs_diff_eq!(pp, p, epsilon = 1e-10);
        }
    }

    #[test]
    fn simplex() {
        let p = proj_simplex(array![-1., 2.].view(), 1.).unwrap();
        assert_abs_diff_eq!(p, array![0., 1.], epsilon = 1e-12);

        let p = proj_simplex(array![0.5, 0.5].view(), 1.).unwrap();
        assert_abs_diff_eq!(p, array![0.5, 0.5], epsilon = 1e-12);

        // points inside the simplex's cone but off the face are pushed onto it
        let p = proj_simplex(array![0.1, 0.1, 0.2].view(), 1.).unwrap();
        assert_abs_diff_eq!(p.sum(), 1., epsilon = 1e-12);
        assert_abs_diff_eq!(p, array![0.3, 0.3, 0.4], epsilon = 1e-12);
    }

    #[test]
    fn l2_and_linf() {
        let p = proj_l2(array![3., 4.].view(), 1.).unwrap();
        assert_abs_diff_eq!(p, array![0.6, 0.8], epsilon = 1e-12);
        let p = proj_l2(array![0.3, 0.4].view(), 1.).unwrap();
        assert_abs_diff_eq!(p, array![0.3, 0.4], epsilon = 1e-12);

        let p = proj_linf(array![3., -0.5, -4.].view(), 1.).unwrap();
        assert_abs_diff_eq!(p, array![1., -0.5, -1.], epsilon = 1e-12);
    }

    #[test]
    fn rejects_bad_radius() {
        let v = array![1., 2.];
        assert_eq!(
            proj_l1(v.view(), -1.),
            Err(ProxError::InvalidRadius { radius: -1. })
        );
        assert!(proj_l2(v.view(), f64::INFINITY).is_err());
        assert!(proj_simplex(v.view(), f64::NAN).is_err());
    }
}
