//! Dense and Sparse Containers
//!
//! Proximal operators act on vectors or matrices that are stored either
//! densely (`ndarray`) or in compressed sparse form (`sprs`). The storage
//! is part of what the caller asked for: a sparse input yields a sparse
//! output unless the result of the operator is dense by nature, so every
//! operator needs to know which one it was handed. [`Container`] carries
//! that choice, and [`NumericContainer`] is the small set of capabilities
//! the operators rely on.

use std::fmt;

use ndarray::prelude::*;
use ndarray::{NdFloat, Zip};
use sprs::binop::{csmat_binop, csvec_binop};
use sprs::{CsMat, CsVec};
use tracing::debug;

use crate::error::{ProxError, ProxResult};

/// Storage class of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    Dense,
    Sparse,
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Representation::Dense => write!(f, "dense"),
            Representation::Sparse => write!(f, "sparse"),
        }
    }
}

/// Logical shape of a container, independent of its storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Vector(usize),
    Matrix(usize, usize),
}

impl Shape {
    /// Number of logical entries
    pub fn len(&self) -> usize {
        match *self {
            Shape::Vector(n) => n,
            Shape::Matrix(rows, cols) => rows * cols,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_matrix(&self) -> bool {
        matches!(self, Shape::Matrix(..))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Vector(n) => write!(f, "[{}]", n),
            Shape::Matrix(rows, cols) => write!(f, "[{}, {}]", rows, cols),
        }
    }
}

/// Capabilities shared by every storage type an operator may receive.
pub trait NumericContainer<A> {
    fn shape(&self) -> Shape;

    fn representation(&self) -> Representation;

    /// Euclidean norm of a vector, Frobenius norm of a matrix.
    fn norm2(&self) -> A;

    /// Applies `f` to every stored entry.
    ///
    /// For sparse storage only the explicitly stored entries are visited,
    /// so `f(0)` must be `0` for the result to mean what it says.
    fn map_stored<F>(&self, f: F) -> Self
    where
        F: FnMut(A) -> A,
        Self: Sized;
}

/// Euclidean norm, divided through by the largest magnitude first so that
/// squaring does not overflow or underflow.
fn scaled_norm<'a, A, I>(values: I) -> A
where
    A: NdFloat + Default,
    I: Iterator<Item = &'a A> + Clone,
{
    let largest = values.clone().fold(A::zero(), |acc, &x| acc.max(x.abs()));
    if largest == A::zero() || !largest.is_finite() {
        // all zero, all NaN, or infinite
        return values.fold(A::zero(), |acc, &x| acc + x * x).sqrt();
    }
    let sum = values.fold(A::zero(), |acc, &x| {
        let y = x / largest;
        acc + y * y
    });
    largest * sum.sqrt()
}

impl<A: NdFloat + Default> NumericContainer<A> for Array1<A> {
    fn shape(&self) -> Shape {
        Shape::Vector(self.len())
    }

    fn representation(&self) -> Representation {
        Representation::Dense
    }

    fn norm2(&self) -> A {
        scaled_norm(self.iter())
    }

    fn map_stored<F: FnMut(A) -> A>(&self, f: F) -> Self {
        self.mapv(f)
    }
}

impl<A: NdFloat + Default> NumericContainer<A> for Array2<A> {
    fn shape(&self) -> Shape {
        Shape::Matrix(self.nrows(), self.ncols())
    }

    fn representation(&self) -> Representation {
        Representation::Dense
    }

    fn norm2(&self) -> A {
        scaled_norm(self.iter())
    }

    fn map_stored<F: FnMut(A) -> A>(&self, f: F) -> Self {
        self.mapv(f)
    }
}

impl<A: NdFloat + Default> NumericContainer<A> for CsVec<A> {
    fn shape(&self) -> Shape {
        Shape::Vector(self.dim())
    }

    fn representation(&self) -> Representation {
        Representation::Sparse
    }

    fn norm2(&self) -> A {
        scaled_norm(self.data().iter())
    }

    fn map_stored<F: FnMut(A) -> A>(&self, mut f: F) -> Self {
        self.map(|&x| f(x))
    }
}

impl<A: NdFloat + Default> NumericContainer<A> for CsMat<A> {
    fn shape(&self) -> Shape {
        Shape::Matrix(self.rows(), self.cols())
    }

    fn representation(&self) -> Representation {
        Representation::Sparse
    }

    fn norm2(&self) -> A {
        scaled_norm(self.data().iter())
    }

    fn map_stored<F: FnMut(A) -> A>(&self, mut f: F) -> Self {
        self.map(|&x| f(x))
    }
}

/// A real vector or matrix in dense or compressed sparse storage.
#[derive(Debug, Clone, PartialEq)]
pub enum Container<A> {
    Vector(Array1<A>),
    Matrix(Array2<A>),
    SparseVector(CsVec<A>),
    SparseMatrix(CsMat<A>),
}

impl<A> From<Array1<A>> for Container<A> {
    fn from(x: Array1<A>) -> Self {
        Container::Vector(x)
    }
}

impl<A> From<Array2<A>> for Container<A> {
    fn from(x: Array2<A>) -> Self {
        Container::Matrix(x)
    }
}

impl<A> From<CsVec<A>> for Container<A> {
    fn from(x: CsVec<A>) -> Self {
        Container::SparseVector(x)
    }
}

impl<A> From<CsMat<A>> for Container<A> {
    fn from(x: CsMat<A>) -> Self {
        Container::SparseMatrix(x)
    }
}

impl<A: NdFloat + Default> NumericContainer<A> for Container<A> {
    fn shape(&self) -> Shape {
        match self {
            Container::Vector(x) => NumericContainer::shape(x),
            Container::Matrix(x) => NumericContainer::shape(x),
            Container::SparseVector(x) => NumericContainer::shape(x),
            Container::SparseMatrix(x) => NumericContainer::shape(x),
        }
    }

    fn representation(&self) -> Representation {
        match self {
            Container::Vector(_) | Container::Matrix(_) => Representation::Dense,
            Container::SparseVector(_) | Container::SparseMatrix(_) => Representation::Sparse,
        }
    }

    fn norm2(&self) -> A {
        match self {
            Container::Vector(x) => x.norm2(),
            Container::Matrix(x) => x.norm2(),
            Container::SparseVector(x) => x.norm2(),
            Container::SparseMatrix(x) => x.norm2(),
        }
    }

    fn map_stored<F: FnMut(A) -> A>(&self, f: F) -> Self {
        match self {
            Container::Vector(x) => Container::Vector(x.map_stored(f)),
            Container::Matrix(x) => Container::Matrix(x.map_stored(f)),
            Container::SparseVector(x) => Container::SparseVector(x.map_stored(f)),
            Container::SparseMatrix(x) => Container::SparseMatrix(x.map_stored(f)),
        }
    }
}

impl<A: NdFloat + Default> Container<A> {
    pub fn is_sparse(&self) -> bool {
        self.representation() == Representation::Sparse
    }

    /// The zero container with the same shape and storage.
    pub fn zeros_like(&self) -> Self {
        match self {
            Container::Vector(x) => Container::Vector(Array1::zeros(x.len())),
            Container::Matrix(x) => Container::Matrix(Array2::zeros(x.raw_dim())),
            Container::SparseVector(x) => Container::SparseVector(CsVec::empty(x.dim())),
            Container::SparseMatrix(x) => {
                let shape = (x.rows(), x.cols());
                Container::SparseMatrix(if x.is_csr() {
                    CsMat::new(shape, vec![0; shape.0 + 1], Vec::new(), Vec::new())
                } else {
                    CsMat::new_csc(shape, vec![0; shape.1 + 1], Vec::new(), Vec::new())
                })
            }
        }
    }

    /// Dense copy of the container; dense containers are cloned as is.
    pub fn to_dense(&self) -> Self {
        match self {
            Container::SparseVector(x) => Container::Vector(x.to_dense()),
            Container::SparseMatrix(x) => Container::Matrix(x.to_dense()),
            dense => dense.clone(),
        }
    }

    /// Dense n-dimensional copy, mostly useful for inspection and comparisons.
    pub fn to_dense_array(&self) -> ArrayD<A> {
        match self {
            Container::Vector(x) => x.clone().into_dyn(),
            Container::Matrix(x) => x.clone().into_dyn(),
            Container::SparseVector(x) => x.to_dense().into_dyn(),
            Container::SparseMatrix(x) => x.to_dense().into_dyn(),
        }
    }

    /// Multiplies every entry by `k`, keeping the storage.
    pub fn scaled(&self, k: A) -> Self {
        self.map_stored(|x| x * k)
    }

    /// Drops explicitly stored zeros from sparse storage.
    pub(crate) fn prune_zeros(self) -> Self {
        match self {
            Container::SparseVector(x) => {
                let (indices, data): (Vec<usize>, Vec<A>) = x
                    .iter()
                    .filter(|&(_, &v)| v != A::zero())
                    .map(|(i, &v)| (i, v))
                    .unzip();
                Container::SparseVector(CsVec::new(x.dim(), indices, data))
            }
            Container::SparseMatrix(x) => {
                let mut indptr = Vec::with_capacity(x.outer_dims() + 1);
                let mut indices = Vec::with_capacity(x.nnz());
                let mut data = Vec::with_capacity(x.nnz());
                indptr.push(0);
                for lane in x.outer_iterator() {
                    for (i, &v) in lane.iter() {
                        if v != A::zero() {
                            indices.push(i);
                            data.push(v);
                        }
                    }
                    indptr.push(indices.len());
                }
                let shape = (x.rows(), x.cols());
                Container::SparseMatrix(if x.is_csr() {
                    CsMat::new(shape, indptr, indices, data)
                } else {
                    CsMat::new_csc(shape, indptr, indices, data)
                })
            }
            dense => dense,
        }
    }

    /// Combines every entry with the scalar `k` through `f(entry, k)`.
    ///
    /// Sparse storage is kept when `f(0, k) == 0`; otherwise every implicit
    /// zero changes value and the result is dense.
    pub(crate) fn map_with_scalar<F>(&self, k: A, param: &'static str, f: F) -> Self
    where
        F: Fn(A, A) -> A,
    {
        if self.is_sparse() && f(A::zero(), k) != A::zero() {
            debug!(param, "densifying sparse input for a non-zero scalar shift");
            return self.to_dense().map_stored(|x| f(x, k));
        }
        self.map_stored(|x| f(x, k))
    }

    /// Entrywise `f(self, other)` for two containers of the same shape.
    ///
    /// `keeps_zero` promises `f(0, y) == 0` for every `y` (products,
    /// quotients, thresholds), which lets a sparse `self` keep its pattern.
    /// Otherwise `f(0, 0) == 0` is assumed (sums, differences): two sparse
    /// operands combine over the union of their patterns and a sparse
    /// `self` against a dense `other` is densified.
    pub(crate) fn zip_with<F>(
        &self,
        other: &Container<A>,
        param: &'static str,
        keeps_zero: bool,
        f: F,
    ) -> ProxResult<Self>
    where
        F: Fn(A, A) -> A,
    {
        if self.shape() != other.shape() {
            return Err(ProxError::ShapeMismatch {
                param,
                expected: self.shape(),
                found: other.shape(),
            });
        }

        let out = match (self, other) {
            (Container::Vector(x), Container::Vector(y)) => {
                Container::Vector(Zip::from(x).and(y).map_collect(|&x, &y| f(x, y)))
            }
            (Container::Matrix(x), Container::Matrix(y)) => {
                Container::Matrix(Zip::from(x).and(y).map_collect(|&x, &y| f(x, y)))
            }
            (Container::Vector(_), _) | (Container::Matrix(_), _) => {
                return self.zip_with(&other.to_dense(), param, keeps_zero, f);
            }
            (Container::SparseVector(x), Container::SparseVector(y)) if !keeps_zero => {
                let z = csvec_binop(x.view(), y.view(), |&a, &b| f(a, b)).map_err(|_| {
                    ProxError::ShapeMismatch {
                        param,
                        expected: self.shape(),
                        found: other.shape(),
                    }
                })?;
                Container::SparseVector(z)
            }
            (Container::SparseMatrix(x), Container::SparseMatrix(y)) if !keeps_zero => {
                let y = if x.is_csr() { y.to_csr() } else { y.to_csc() };
                Container::SparseMatrix(csmat_binop(x.view(), y.view(), |&a, &b| f(a, b)))
            }
            (Container::SparseVector(x), _) if keeps_zero => {
                let mut z = x.clone();
                for (i, v) in z.iter_mut() {
                    *v = f(*v, other.vector_entry(i));
                }
                Container::SparseVector(z)
            }
            (Container::SparseMatrix(x), _) if keeps_zero => {
                let values: Vec<A> = x
                    .iter()
                    .map(|(&v, (row, col))| f(v, other.matrix_entry(row, col)))
                    .collect();
                let mut z = x.clone();
                z.data_mut().copy_from_slice(&values);
                Container::SparseMatrix(z)
            }
            _ => {
                debug!(param, "densifying sparse input for a dense elementwise shift");
                return self.to_dense().zip_with(other, param, keeps_zero, f);
            }
        };
        Ok(out)
    }

    // callers have already checked the shape
    fn vector_entry(&self, i: usize) -> A {
        match self {
            Container::Vector(y) => y[i],
            Container::SparseVector(y) => y.get(i).copied().unwrap_or_else(A::zero),
            _ => A::zero(),
        }
    }

    fn matrix_entry(&self, row: usize, col: usize) -> A {
        match self {
            Container::Matrix(y) => y[[row, col]],
            Container::SparseMatrix(y) => y.get(row, col).copied().unwrap_or_else(A::zero),
            _ => A::zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sparse_vec() -> CsVec<f64> {
        CsVec::new(5, vec![1, 3], vec![2., -4.])
    }

    #[test]
    fn shapes_and_tags() {
        let v = Container::from(array![1., 2., 3.]);
        assert_eq!(v.shape(), Shape::Vector(3));
        assert_eq!(v.representation(), Representation::Dense);

        let m = Container::from(CsMat::<f64>::eye(3));
        assert_eq!(m.shape(), Shape::Matrix(3, 3));
        assert_eq!(m.representation(), Representation::Sparse);
        assert_eq!(format!("{}", m.shape()), "[3, 3]");
    }

    #[test]
    fn norms_agree_across_storage() {
        let dense = Container::from(array![0., 2., 0., -4., 0.]);
        let sparse = Container::from(sparse_vec());
        assert_abs_diff_eq!(dense.norm2(), 20f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(sparse.norm2(), dense.norm2(), epsilon = 1e-12);

        let m = Container::from(array![[3., 0.], [0., 4.]]);
        assert_abs_diff_eq!(m.norm2(), 5., epsilon = 1e-12);
    }

    #[test]
    fn norms_of_huge_and_tiny_entries() {
        let big = Container::from(array![1e200, 1e200]);
        assert_abs_diff_eq!(big.norm2() / 1e200, 2f64.sqrt(), epsilon = 1e-12);
        let sparse = Container::from(CsVec::new(4, vec![0, 3], vec![3e-200, -4e-200]));
        assert_abs_diff_eq!(sparse.norm2() / 1e-200, 5., epsilon = 1e-12);

        let inf = Container::from(array![f64::INFINITY, 1.]);
        assert_eq!(inf.norm2(), f64::INFINITY);
        assert!(Container::from(array![f64::NAN, 1.]).norm2().is_nan());
        assert_eq!(Container::from(array![0., 0.]).norm2(), 0.);
    }

    #[test]
    fn zeros_like_keeps_storage() {
        let z = Container::from(sparse_vec()).zeros_like();
        match z {
            Container::SparseVector(x) => {
                assert_eq!(x.dim(), 5);
                assert_eq!(x.nnz(), 0);
            }
            other => panic!("expected a sparse vector, got {:?}", other),
        }

        let csc = CsMat::<f64>::eye(2).to_csc();
        match Container::from(csc).zeros_like() {
            Container::SparseMatrix(x) => {
                assert!(x.is_csc());
                assert_eq!(x.nnz(), 0);
            }
            other => panic!("expected a sparse matrix, got {:?}", other),
        }
    }

    #[test]
    fn prune_drops_stored_zeros() {
        let v = Container::from(CsVec::new(4, vec![0, 2, 3], vec![1., 0., -1.]));
        match v.prune_zeros() {
            Container::SparseVector(x) => assert_eq!(x.indices(), &[0, 3]),
            other => panic!("expected a sparse vector, got {:?}", other),
        }

        let m = CsMat::new((2, 2), vec![0, 2, 3], vec![0, 1, 1], vec![0., 5., 0.]);
        match Container::from(m).prune_zeros() {
            Container::SparseMatrix(x) => {
                assert_eq!(x.nnz(), 1);
                assert_eq!(x.get(0, 1), Some(&5.));
            }
            other => panic!("expected a sparse matrix, got {:?}", other),
        }
    }

    #[test]
    fn scalar_shift_densifies_only_when_needed() {
        let v = Container::from(sparse_vec());
        let halved = v.map_with_scalar(2., "scale", |x, a| x / a);
        assert!(halved.is_sparse());
        assert_abs_diff_eq!(
            halved.to_dense_array(),
            array![0., 1., 0., -2., 0.].into_dyn(),
            epsilon = 1e-12
        );

        let shifted = v.map_with_scalar(1., "offset", |x, b| x - b);
        assert!(!shifted.is_sparse());
        assert_abs_diff_eq!(
            shifted.to_dense_array(),
            array![-1., 1., -1., -5., -1.].into_dyn(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn zip_with_sparse_operands() {
        let x = Container::from(sparse_vec());
        let y = Container::from(CsVec::new(5, vec![0, 3], vec![1., 1.]));

        let sum = x.zip_with(&y, "offset", false, |a, b| a + b).unwrap();
        assert!(sum.is_sparse());
        assert_abs_diff_eq!(
            sum.to_dense_array(),
            array![1., 2., 0., -3., 0.].into_dyn(),
            epsilon = 1e-12
        );

        let weights = Container::from(array![1., 2., 3., 4., 5.]);
        let prod = x.zip_with(&weights, "scale", true, |a, b| a * b).unwrap();
        match &prod {
            Container::SparseVector(z) => assert_eq!(z.indices(), &[1, 3]),
            other => panic!("expected a sparse vector, got {:?}", other),
        }
        assert_abs_diff_eq!(
            prod.to_dense_array(),
            array![0., 4., 0., -16., 0.].into_dyn(),
            epsilon = 1e-12
        );

        let dense_shift = x.zip_with(&weights, "offset", false, |a, b| a - b).unwrap();
        assert!(!dense_shift.is_sparse());
    }

    #[test]
    fn zip_with_sparse_matrices_of_mixed_storage() {
        let x = CsMat::new((2, 2), vec![0, 1, 2], vec![0, 1], vec![1., 2.]);
        let y = CsMat::new((2, 2), vec![0, 1, 1], vec![1], vec![3.]).to_csc();
        let sum = Container::from(x)
            .zip_with(&Container::from(y), "lin_term", false, |a, b| a + b)
            .unwrap();
        assert!(sum.is_sparse());
        assert_abs_diff_eq!(
            sum.to_dense_array(),
            array![[1., 3.], [0., 2.]].into_dyn(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn zip_with_rejects_shape_mismatch() {
        let x = Container::from(array![1., 2.]);
        let y = Container::from(array![[1., 2.]]);
        assert_eq!(
            x.zip_with(&y, "offset", false, |a, b| a + b),
            Err(ProxError::ShapeMismatch {
                param: "offset",
                expected: Shape::Vector(2),
                found: Shape::Matrix(1, 2),
            })
        );
    }
}
