use crate::errors::{GpError, Result};
use linfa::Float;
use ndarray::{aview1, Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};

/// Append-only set of samples `(x_i, y_i)` where every `x_i` has the same dimension
#[derive(Clone, Debug, PartialEq)]
pub struct SampleSet<F: Float> {
    x: Array2<F>,
    y: Array1<F>,
}

impl<F: Float> SampleSet<F> {
    /// Empty set of samples of dimension `dim`
    pub fn new(dim: usize) -> Self {
        SampleSet {
            x: Array2::zeros((0, dim)),
            y: Array1::zeros(0),
        }
    }

    /// Set of samples built from the rows of `x` and the values `y`
    pub fn from_data(
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
        y: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(GpError::DimensionMismatch(format!(
                "{} input samples for {} output values",
                x.nrows(),
                y.len()
            )));
        }
        Ok(SampleSet {
            x: x.to_owned(),
            y: y.to_owned(),
        })
    }

    pub fn dim(&self) -> usize {
        self.x.ncols()
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Appends the sample `(x, y)`
    pub fn push(&mut self, x: &ArrayBase<impl Data<Elem = F>, Ix1>, y: F) -> Result<()> {
        self.check_dim(x.len())?;
        self.x.push_row(x.view())?;
        self.y.append(Axis(0), aview1(&[y]))?;
        Ok(())
    }

    /// Fails with [GpError::DimensionMismatch] when `dim` differs from the sample dimension
    pub fn check_dim(&self, dim: usize) -> Result<()> {
        if dim != self.dim() {
            return Err(GpError::DimensionMismatch(format!(
                "sample of dimension {} for a set of dimension {}",
                dim,
                self.dim()
            )));
        }
        Ok(())
    }

    /// Input samples as a (n, dim) matrix
    pub fn x(&self) -> &Array2<F> {
        &self.x
    }

    /// Output values
    pub fn y(&self) -> &Array1<F> {
        &self.y
    }

    /// Index of the lowest output value, first one on ties
    pub fn argmin(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, &v) in self.y.iter().enumerate() {
            match best {
                Some(b) if !(v < self.y[b]) => {}
                _ => best = Some(i),
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_push_and_argmin() {
        let mut samples = SampleSet::new(2);
        assert!(samples.is_empty());
        assert_eq!(samples.argmin(), None);
        samples.push(&array![0., 1.], 3.).unwrap();
        samples.push(&array![0.5, 0.5], -1.).unwrap();
        samples.push(&array![1., 0.], -1.).unwrap();
        assert_eq!(samples.len(), 2 + 1);
        assert_eq!(samples.x().row(1), array![0.5, 0.5]);
        assert_eq!(samples.argmin(), Some(1));
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut samples = SampleSet::new(2);
        assert!(matches!(
            samples.push(&array![0.], 1.),
            Err(GpError::DimensionMismatch(_))
        ));
        assert!(matches!(
            SampleSet::from_data(&array![[0., 1.], [1., 0.]], &array![1.]),
            Err(GpError::DimensionMismatch(_))
        ));
        let samples = SampleSet::from_data(&array![[0., 1.], [1., 0.]], &array![1., 0.]).unwrap();
        assert_eq!(samples.argmin(), Some(1));
    }
}
