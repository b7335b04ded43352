use crate::SamplingMethod;
use linfa::Float;
use ndarray::{Array, Array2, ArrayBase, Data, Ix2};
use ndarray_rand::{rand::Rng, rand::SeedableRng, rand_distr::Uniform, RandomExt};
use rand_xoshiro::Xoshiro256Plus;

/// The Random design consists in drawing samples uniformly in the sampling space.
#[derive(Clone, Debug)]
pub struct Random<F: Float, R: Rng + Clone> {
    /// (nx, 2) matrix, the ith row is the [lower_bound, upper_bound] of xi
    xlimits: Array2<F>,
    rng: R,
}

impl<F: Float> Random<F, Xoshiro256Plus> {
    /// Constructor given a design space given a (nx, 2) matrix \[\[lower bound, upper bound\], ...\]
    ///
    /// ```
    /// use bopt_doe::Random;
    /// use ndarray::arr2;
    ///
    /// let doe = Random::new(&arr2(&[[0.0, 1.0], [5.0, 10.0]]));
    /// ```
    pub fn new(xlimits: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Self {
        Self::new_with_rng(xlimits, Xoshiro256Plus::from_entropy())
    }
}

impl<F: Float, R: Rng + Clone> Random<F, R> {
    /// Constructor given a design space and a random generator for reproducibility
    ///
    /// **Panics** if xlimits number of columns is different from 2.
    pub fn new_with_rng(xlimits: &ArrayBase<impl Data<Elem = F>, Ix2>, rng: R) -> Self {
        if xlimits.ncols() != 2 {
            panic!("xlimits must have 2 columns (lower, upper)");
        }
        Random {
            xlimits: xlimits.to_owned(),
            rng,
        }
    }

    /// Set random generator
    pub fn with_rng<R2: Rng + Clone>(self, rng: R2) -> Random<F, R2> {
        Random {
            xlimits: self.xlimits,
            rng,
        }
    }
}

impl<F: Float, R: Rng + Clone> SamplingMethod<F> for Random<F, R> {
    fn sampling_space(&self) -> &Array2<F> {
        &self.xlimits
    }

    fn normalized_sample(&self, ns: usize) -> Array2<F> {
        let mut rng = self.rng.clone();
        let nx = self.xlimits.nrows();
        Array::random_using((ns, nx), Uniform::new(0., 1.), &mut rng).mapv(F::cast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::arr2;

    #[test]
    fn test_random() {
        let xlimits = arr2(&[[5., 10.], [0., 1.]]);
        let doe = Random::new(&xlimits).with_rng(Xoshiro256Plus::seed_from_u64(42));
        let actual = doe.sample(9);
        assert_eq!(actual.shape(), &[9, 2]);
        assert!(actual.column(0).iter().all(|&v| (5. ..10.).contains(&v)));
        assert!(actual.column(1).iter().all(|&v| (0. ..1.).contains(&v)));
        assert_abs_diff_eq!(actual, doe.sample(9));
    }

    #[test]
    fn test_random_seeds_differ() {
        let xlimits = arr2(&[[0., 1.]]);
        let a = Random::new(&xlimits)
            .with_rng(Xoshiro256Plus::seed_from_u64(0))
            .normalized_sample(4);
        let b = Random::new(&xlimits)
            .with_rng(Xoshiro256Plus::seed_from_u64(1))
            .normalized_sample(4);
        assert!(a != b);
    }
}
