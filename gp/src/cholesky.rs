//! Incremental Cholesky factorization.
//!
//! The factor `L` of a symmetric positive definite matrix `K = L.Lt` is
//! built row by row: appending the row `n` only requires a forward
//! substitution against the current `n x n` factor, hence an `O(n^2)` cost.
//! A from-scratch factorization is nothing more than `n` successive row
//! appends so that both paths give bitwise identical factors.
use crate::errors::{GpError, Result};
use linfa::Float;
use ndarray::{s, Array1, Array2, ArrayBase, ArrayView2, Data, Ix1, Ix2};

/// Smallest buffer allocated when the factor grows
const MIN_CAPACITY: usize = 16;

/// Lower triangular Cholesky factor stored in a growable square buffer.
///
/// Only the leading `len() x len()` block of the buffer is meaningful, the
/// buffer capacity is doubled when full so that appending rows costs `O(n^2)`
/// amortized.
#[derive(Clone, Debug)]
pub struct CholeskyFactor<F: Float> {
    data: Array2<F>,
    size: usize,
}

impl<F: Float> Default for CholeskyFactor<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> CholeskyFactor<F> {
    /// Empty factor
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Empty factor able to hold a `capacity x capacity` factor without reallocation
    pub fn with_capacity(capacity: usize) -> Self {
        CholeskyFactor {
            data: Array2::zeros((capacity, capacity)),
            size: 0,
        }
    }

    /// Factorizes the symmetric matrix `k`. Only its lower triangle is read.
    ///
    /// Fails with [GpError::NotPositiveDefinite] reporting the index of the first
    /// non positive pivot.
    pub fn factorize(k: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Self> {
        if k.nrows() != k.ncols() {
            return Err(GpError::DimensionMismatch(format!(
                "cannot factorize a non square ({}, {}) matrix",
                k.nrows(),
                k.ncols()
            )));
        }
        let n = k.nrows();
        let mut factor = Self::with_capacity(n);
        for i in 0..n {
            factor.extend(&k.slice(s![i, ..i]), k[[i, i]])?;
        }
        Ok(factor)
    }

    /// Appends a row to the factor.
    ///
    /// `row` holds the `n` correlations between the new point and the points
    /// already factorized, `self_correlation` the diagonal term of the new point.
    /// On failure the factor is left untouched.
    pub fn extend(&mut self, row: &ArrayBase<impl Data<Elem = F>, Ix1>, self_correlation: F) -> Result<()> {
        let n = self.size;
        if row.len() != n {
            return Err(GpError::DimensionMismatch(format!(
                "cannot extend a factor of size {} with a row of length {}",
                n,
                row.len()
            )));
        }
        let new_row = self.forward_substitution(row);
        let radicand = self_correlation - new_row.dot(&new_row);
        if !(radicand > F::zero()) {
            return Err(GpError::NotPositiveDefinite { pivot: n });
        }

        self.reserve(n + 1);
        self.data.slice_mut(s![n, ..n]).assign(&new_row);
        self.data[[n, n]] = radicand.sqrt();
        self.size = n + 1;
        Ok(())
    }

    fn reserve(&mut self, size: usize) {
        let capacity = self.data.nrows();
        if size <= capacity {
            return;
        }
        let new_capacity = size.max(2 * capacity).max(MIN_CAPACITY);
        let mut data = Array2::zeros((new_capacity, new_capacity));
        data.slice_mut(s![..self.size, ..self.size])
            .assign(&self.view());
        self.data = data;
    }

    /// Size `n` of the `n x n` factor
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Read-only view of the lower triangular factor
    pub fn view(&self) -> ArrayView2<F> {
        self.data.slice(s![..self.size, ..self.size])
    }

    /// Owned copy of the lower triangular factor
    pub fn to_array(&self) -> Array2<F> {
        self.view().to_owned()
    }

    /// Solves `L.x = b`
    pub fn solve_lower(&self, b: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<Array1<F>> {
        self.check_rhs(b.len())?;
        Ok(self.forward_substitution(b))
    }

    /// Solves `Lt.x = b`
    pub fn solve_upper(&self, b: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<Array1<F>> {
        self.check_rhs(b.len())?;
        let n = self.size;
        let mut x = b.to_owned();
        for i in (0..n).rev() {
            let mut acc = x[i];
            for k in (i + 1)..n {
                acc -= self.data[[k, i]] * x[k];
            }
            x[i] = acc / self.data[[i, i]];
        }
        Ok(x)
    }

    /// Solves `K.x = b` where `K = L.Lt`
    pub fn solve(&self, b: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<Array1<F>> {
        let z = self.solve_lower(b)?;
        self.solve_upper(&z)
    }

    /// Solves `L.X = B` column by column
    pub fn solve_lower_matrix(&self, b: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array2<F>> {
        self.check_rhs(b.nrows())?;
        let mut x = Array2::zeros(b.raw_dim());
        for (j, col) in b.columns().into_iter().enumerate() {
            x.column_mut(j).assign(&self.forward_substitution(&col));
        }
        Ok(x)
    }

    /// `log(det(K))` where `K = L.Lt`
    pub fn log_det(&self) -> F {
        let two = F::cast(2.);
        (0..self.size).fold(F::zero(), |acc, i| acc + two * self.data[[i, i]].ln())
    }

    fn check_rhs(&self, len: usize) -> Result<()> {
        if len != self.size {
            return Err(GpError::DimensionMismatch(format!(
                "right hand side of length {} for a factor of size {}",
                len, self.size
            )));
        }
        Ok(())
    }

    fn forward_substitution(&self, b: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Array1<F> {
        let mut x = b.to_owned();
        for i in 0..b.len() {
            let acc = x[i] - self.data.slice(s![i, ..i]).dot(&x.slice(s![..i]));
            x[i] = acc / self.data[[i, i]];
        }
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use linfa_linalg::cholesky::Cholesky;
    use ndarray::{array, Array};
    use ndarray_rand::rand::SeedableRng;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use rand_xoshiro::Xoshiro256Plus;

    fn spd_matrix(n: usize, seed: u64) -> Array2<f64> {
        let mut rng = Xoshiro256Plus::seed_from_u64(seed);
        let a = Array::random_using((n, n), Uniform::new(-1., 1.), &mut rng);
        a.dot(&a.t()) + Array2::<f64>::eye(n) * n as f64
    }

    #[test]
    fn test_factorize_reconstructs_matrix() {
        let k = spd_matrix(12, 42);
        let factor = CholeskyFactor::factorize(&k).unwrap();
        let l = factor.view();
        assert_abs_diff_eq!(l.dot(&l.t()), k, epsilon = 1e-10);
        for i in 0..12 {
            for j in (i + 1)..12 {
                assert_eq!(l[[i, j]], 0.);
            }
        }
    }

    #[test]
    fn test_factorize_matches_dense_cholesky() {
        let k = spd_matrix(8, 0);
        let factor = CholeskyFactor::factorize(&k).unwrap();
        let expected = k.cholesky().unwrap();
        assert_abs_diff_eq!(factor.to_array(), expected, epsilon = 1e-10);
    }

    #[test]
    fn test_extend_is_factorize_of_augmented_matrix() {
        let k = spd_matrix(30, 7);
        let mut incremental = CholeskyFactor::factorize(&k.slice(s![..5, ..5])).unwrap();
        for i in 5..30 {
            incremental.extend(&k.slice(s![i, ..i]), k[[i, i]]).unwrap();
        }
        let full = CholeskyFactor::factorize(&k).unwrap();
        assert_eq!(incremental.len(), 30);
        assert_eq!(incremental.view(), full.view());
    }

    #[test]
    fn test_not_positive_definite_pivot() {
        let k = array![[1., 0., 0.], [0., 1., 1.], [0., 1., 1.]];
        match CholeskyFactor::factorize(&k) {
            Err(GpError::NotPositiveDefinite { pivot }) => assert_eq!(pivot, 2),
            _ => panic!("expected a not positive definite error"),
        }
    }

    #[test]
    fn test_failed_extend_leaves_factor_untouched() {
        let k = array![[4., 2.], [2., 3.]];
        let mut factor = CholeskyFactor::factorize(&k).unwrap();
        let before = factor.to_array();
        assert!(matches!(
            factor.extend(&array![2., 3.], 2.),
            Err(GpError::NotPositiveDefinite { pivot: 2 })
        ));
        assert_eq!(factor.len(), 2);
        assert_eq!(factor.to_array(), before);
        assert!(matches!(
            factor.extend(&array![1.], 3.),
            Err(GpError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_solves() {
        let k = spd_matrix(6, 3);
        let b = array![1., -2., 0.5, 3., 0., 1.];
        let factor = CholeskyFactor::factorize(&k).unwrap();
        let x = factor.solve(&b).unwrap();
        assert_abs_diff_eq!(k.dot(&x), b, epsilon = 1e-10);

        let z = factor.solve_lower(&b).unwrap();
        assert_abs_diff_eq!(factor.view().dot(&z), b, epsilon = 1e-10);
        let w = factor.solve_upper(&b).unwrap();
        assert_abs_diff_eq!(factor.view().t().dot(&w), b, epsilon = 1e-10);

        let bb = ndarray::stack![ndarray::Axis(1), b, &b * 2.];
        let zz = factor.solve_lower_matrix(&bb).unwrap();
        assert_abs_diff_eq!(factor.view().dot(&zz), bb, epsilon = 1e-10);
    }

    #[test]
    fn test_log_det() {
        let k = array![[4., 2.], [2., 3.]];
        let factor = CholeskyFactor::factorize(&k).unwrap();
        assert_abs_diff_eq!(factor.log_det(), 8f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_empty_factor() {
        let factor = CholeskyFactor::<f64>::factorize(&Array2::zeros((0, 0))).unwrap();
        assert!(factor.is_empty());
        assert_eq!(factor.solve(&Array1::zeros(0)).unwrap().len(), 0);
        assert_eq!(factor.log_det(), 0.);
    }
}
