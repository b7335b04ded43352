use crate::SamplingMethod;
use linfa::Float;
use ndarray::{Array2, ArrayBase, Data, Ix2};

/// The Halton design is a deterministic low-discrepancy sequence: the jth
/// component of the ith point is the radical inverse of `i` in the base
/// given by the jth prime number.
///
/// The origin (index 0) is always skipped, the sequence starts at index `1 + skip`.
#[derive(Clone, Debug)]
pub struct Halton<F: Float> {
    /// (nx, 2) matrix, the ith row is the [lower_bound, upper_bound] of xi
    xlimits: Array2<F>,
    skip: usize,
}

impl<F: Float> Halton<F> {
    /// Constructor given a design space given a (nx, 2) matrix \[\[lower bound, upper bound\], ...\]
    ///
    /// **Panics** if xlimits number of columns is different from 2.
    ///
    /// ```
    /// use bopt_doe::{Halton, SamplingMethod};
    /// use ndarray::arr2;
    ///
    /// let doe = Halton::new(&arr2(&[[0.0, 1.0]])).sample(3);
    /// assert_eq!(doe, arr2(&[[0.5], [0.25], [0.75]]));
    /// ```
    pub fn new(xlimits: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Self {
        if xlimits.ncols() != 2 {
            panic!("xlimits must have 2 columns (lower, upper)");
        }
        Halton {
            xlimits: xlimits.to_owned(),
            skip: 0,
        }
    }

    /// Skips the first `skip` points of the sequence
    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }
}

/// Radical inverse of `index` in the given `base`
fn radical_inverse(mut index: usize, base: usize) -> f64 {
    let inv_base = 1. / base as f64;
    let mut factor = inv_base;
    let mut res = 0.;
    while index > 0 {
        res += (index % base) as f64 * factor;
        index /= base;
        factor *= inv_base;
    }
    res
}

/// First `n` prime numbers
pub(crate) fn primes(n: usize) -> Vec<usize> {
    let mut primes: Vec<usize> = Vec::with_capacity(n);
    let mut candidate = 2;
    while primes.len() < n {
        if primes
            .iter()
            .take_while(|&&p| p * p <= candidate)
            .all(|&p| candidate % p != 0)
        {
            primes.push(candidate);
        }
        candidate += 1;
    }
    primes
}

impl<F: Float> SamplingMethod<F> for Halton<F> {
    fn sampling_space(&self) -> &Array2<F> {
        &self.xlimits
    }

    fn normalized_sample(&self, ns: usize) -> Array2<F> {
        let bases = primes(self.xlimits.nrows());
        Array2::from_shape_fn((ns, bases.len()), |(i, j)| {
            F::cast(radical_inverse(i + 1 + self.skip, bases[j]))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{arr2, array};

    #[test]
    fn test_primes() {
        assert_eq!(primes(6), vec![2, 3, 5, 7, 11, 13]);
    }

    #[test]
    fn test_halton_2d() {
        let xlimits = arr2(&[[0., 1.], [0., 1.]]);
        let expected = array![
            [0.5, 1. / 3.],
            [0.25, 2. / 3.],
            [0.75, 1. / 9.],
            [0.125, 4. / 9.]
        ];
        assert_abs_diff_eq!(Halton::new(&xlimits).sample(4), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_halton_skip_and_scaling() {
        let xlimits = arr2(&[[-2., 2.]]);
        let doe = Halton::new(&xlimits).skip(2).sample(2);
        // radical inverses 0.75 and 0.125 scaled to [-2, 2]
        assert_abs_diff_eq!(doe, array![[1.], [-1.5]], epsilon = 1e-12);
    }
}
