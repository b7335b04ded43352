use linfa::Float;
use ndarray::Array2;

/// A design of experiments able to draw `ns` points in its sampling space.
///
/// The sampling space is the box `[lower_bound_xi, upper_bound_xi]^nx`
/// where `nx` is the dimension of the samples.
pub trait SamplingMethod<F: Float> {
    /// Returns the (nx, 2) matrix of the sampling space bounds, the ith row
    /// being the interval `[lower, upper]` of the ith component.
    fn sampling_space(&self) -> &Array2<F>;

    /// Generates a (ns, nx) matrix of samples in the unit hypercube `[0., 1.]^nx`.
    fn normalized_sample(&self, ns: usize) -> Array2<F>;

    /// Generates a (ns, nx) matrix of samples in the sampling space, that is
    /// the normalized sample scaled to the bounds given by [SamplingMethod::sampling_space].
    fn sample(&self, ns: usize) -> Array2<F> {
        let xlimits = self.sampling_space();
        let lower = xlimits.column(0);
        let scaler = &xlimits.column(1) - &lower;
        self.normalized_sample(ns) * scaler + lower
    }

    /// Dimension of the samples
    fn dim(&self) -> usize {
        self.sampling_space().nrows()
    }
}
