use linfa::Float;
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Normal prior `N(mean, std^2)` on a scalar parameter
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct NormalPrior<F: Float> {
    mean: F,
    std: F,
}

impl<F: Float> NormalPrior<F> {
    pub fn new(mean: F, std: F) -> Self {
        NormalPrior { mean, std }
    }

    pub fn mean(&self) -> F {
        self.mean
    }

    pub fn std(&self) -> F {
        self.std
    }

    /// Log of the probability density at `x`
    pub fn log_density(&self, x: F) -> F {
        let half = F::cast(0.5);
        let two_pi = F::cast(2. * std::f64::consts::PI);
        let z = (x - self.mean) / self.std;
        -half * two_pi.ln() - self.std.ln() - half * z * z
    }
}
