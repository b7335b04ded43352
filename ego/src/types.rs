use bopt_doe::LhsKind;
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// An interface for the objective function to be minimized
pub trait ObjectiveFunction {
    /// Objective value at `x`
    fn evaluate(&self, x: &ArrayView1<f64>) -> f64;

    /// Whether `x` may be evaluated, unreachable points are never proposed
    fn check_reachable(&self, _x: &ArrayView1<f64>) -> bool {
        true
    }
}

impl<T> ObjectiveFunction for T
where
    T: Fn(&ArrayView1<f64>) -> f64,
{
    fn evaluate(&self, x: &ArrayView1<f64>) -> f64 {
        self(x)
    }
}

/// Optimization result
#[derive(Clone, Debug)]
pub struct OptimResult {
    /// Optimum x value
    pub x_opt: Array1<f64>,
    /// Optimum y value (e.g. f(x_opt))
    pub y_opt: f64,
    /// History of successive x values
    pub x_doe: Array2<f64>,
    /// History of successive y values (e.g f(x_doe))
    pub y_doe: Array1<f64>,
}

/// Sampling method used to build the initial design of experiments
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitialDesign {
    /// Latin hypercube sampling
    Lhs(LhsKind),
    /// Halton low-discrepancy sequence
    Halton,
    /// Uniform random sampling
    Random,
}

impl Default for InitialDesign {
    fn default() -> Self {
        InitialDesign::Lhs(LhsKind::Maximin)
    }
}

/// Domain where the minimum is searched for
#[derive(Clone, Debug, PartialEq)]
pub enum SearchSpace {
    /// The unit hypercube of dimension `dim`, optionally mapped to the
    /// `(dim, 2)` bounds `xlimits` before objective evaluations
    Continuous {
        dim: usize,
        xlimits: Option<Array2<f64>>,
    },
    /// A finite set of candidate points given as matrix rows
    Discrete(Array2<f64>),
}

impl SearchSpace {
    /// Dimension of the points handled by the surrogate
    pub fn dim(&self) -> usize {
        match self {
            SearchSpace::Continuous { dim, .. } => *dim,
            SearchSpace::Discrete(candidates) => candidates.ncols(),
        }
    }

    /// Maps a point of the surrogate space to the objective space
    pub fn to_user_space(&self, x: &ArrayView1<f64>) -> Array1<f64> {
        match self {
            SearchSpace::Continuous {
                xlimits: Some(xlimits),
                ..
            } => {
                let lower = xlimits.column(0);
                let upper = xlimits.column(1);
                &lower + &(&(&upper - &lower) * x)
            }
            _ => x.to_owned(),
        }
    }
}

/// An enum to specify hot start mode
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Default, Serialize, Deserialize)]
pub enum HotStartMode {
    /// Hot start checkpoints are not saved
    #[default]
    Disabled,
    /// Hot start checkpoints are saved and used if the checkpoint file already exists
    Enabled,
    /// Hot start checkpoints are saved and used if the checkpoint file already exists,
    /// the iteration budget is then extended by the given number of iterations
    ExtendedIters(usize),
}

impl From<Option<usize>> for HotStartMode {
    fn from(value: Option<usize>) -> Self {
        match value {
            Some(0) => HotStartMode::Enabled,
            Some(ext_iters) => HotStartMode::ExtendedIters(ext_iters),
            None => HotStartMode::Disabled,
        }
    }
}

/// Stage of the optimization
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    /// No sample evaluated yet
    NotInitialized,
    /// Initial design evaluated, iterations remain
    Running,
    /// Iteration budget exhausted
    Done,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_hot_start_from_option() {
        assert_eq!(HotStartMode::from(None), HotStartMode::Disabled);
        assert_eq!(HotStartMode::from(Some(0)), HotStartMode::Enabled);
        assert_eq!(HotStartMode::from(Some(5)), HotStartMode::ExtendedIters(5));
    }

    #[test]
    fn test_search_space_scaling() {
        let space = SearchSpace::Continuous {
            dim: 2,
            xlimits: Some(array![[-5., 10.], [0., 15.]]),
        };
        assert_eq!(space.dim(), 2);
        assert_eq!(
            space.to_user_space(&array![0.5, 1.].view()),
            array![2.5, 15.]
        );
        let unit = SearchSpace::Continuous {
            dim: 1,
            xlimits: None,
        };
        assert_eq!(unit.to_user_space(&array![0.3].view()), array![0.3]);
        let discrete = SearchSpace::Discrete(array![[1., 2.], [3., 4.]]);
        assert_eq!(discrete.dim(), 2);
    }
}
