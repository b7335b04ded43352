//! Parametric mean functions `m(x) = f(x).w` where `f` are the features and
//! `w` the mean parameters.
//!
//! | name      | features       |
//! |-----------|----------------|
//! | `mZero`   | none           |
//! | `mOne`    | `1`, w = 1     |
//! | `mConst`  | `1`            |
//! | `mLinear` | `1, x_1...x_d` |
use crate::errors::{GpError, Result};
use linfa::Float;
use ndarray::{s, Array1, Array2, ArrayBase, Data, Ix1, Ix2};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of mean function
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum MeanKind {
    Zero,
    /// Constant mean fixed to one
    #[default]
    One,
    Constant,
    Linear,
}

impl fmt::Display for MeanKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            MeanKind::Zero => "mZero",
            MeanKind::One => "mOne",
            MeanKind::Constant => "mConst",
            MeanKind::Linear => "mLinear",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for MeanKind {
    type Err = GpError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mZero" => Ok(MeanKind::Zero),
            "mOne" => Ok(MeanKind::One),
            "mConst" => Ok(MeanKind::Constant),
            "mLinear" => Ok(MeanKind::Linear),
            _ => Err(GpError::UnsupportedName(format!("unknown mean function '{}'", s))),
        }
    }
}

impl MeanKind {
    /// Number of features for inputs of dimension `dim`
    pub fn n_features(&self, dim: usize) -> usize {
        match self {
            MeanKind::Zero => 0,
            MeanKind::One | MeanKind::Constant => 1,
            MeanKind::Linear => dim + 1,
        }
    }
}

/// Mean function with its current parameters
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct MeanModel<F: Float> {
    kind: MeanKind,
    dim: usize,
    params: Array1<F>,
}

impl<F: Float> MeanModel<F> {
    /// Mean function for inputs of dimension `dim`, parameters are zero
    /// except for `mOne`
    pub fn new(kind: MeanKind, dim: usize) -> Self {
        let params = match kind {
            MeanKind::One => Array1::ones(1),
            _ => Array1::zeros(kind.n_features(dim)),
        };
        MeanModel { kind, dim, params }
    }

    pub fn kind(&self) -> MeanKind {
        self.kind
    }

    /// Number of parameters, equal to the number of features
    pub fn n_parameters(&self) -> usize {
        self.params.len()
    }

    pub fn parameters(&self) -> &Array1<F> {
        &self.params
    }

    /// Sets the mean parameters. The parameter of `mOne` can only be one.
    pub fn set_parameters(&mut self, params: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<()> {
        if params.len() != self.params.len() {
            return Err(GpError::DimensionMismatch(format!(
                "mean function {} expects {} parameters, got {}",
                self.kind,
                self.params.len(),
                params.len()
            )));
        }
        if self.kind == MeanKind::One && params[0] != F::one() {
            return Err(GpError::InvalidValueError(
                "mOne mean parameter is fixed to 1".to_string(),
            ));
        }
        self.params.assign(params);
        Ok(())
    }

    /// Features `f(x)` of the point `x`
    pub fn features(&self, x: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Array1<F> {
        match self.kind {
            MeanKind::Zero => Array1::zeros(0),
            MeanKind::One | MeanKind::Constant => Array1::ones(1),
            MeanKind::Linear => {
                let mut f = Array1::ones(self.dim + 1);
                f.slice_mut(s![1..]).assign(x);
                f
            }
        }
    }

    /// Features of each row of `x` as a (n, n_parameters) matrix
    pub fn features_matrix(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array2<F> {
        let n = x.nrows();
        match self.kind {
            MeanKind::Zero => Array2::zeros((n, 0)),
            MeanKind::One | MeanKind::Constant => Array2::ones((n, 1)),
            MeanKind::Linear => Array2::from_shape_fn((n, self.dim + 1), |(i, j)| {
                if j == 0 {
                    F::one()
                } else {
                    x[[i, j - 1]]
                }
            }),
        }
    }

    /// Mean value `m(x) = f(x).w`
    pub fn mean(&self, x: &ArrayBase<impl Data<Elem = F>, Ix1>) -> F {
        self.features(x).dot(&self.params)
    }
}
