//! Acquisition criteria scoring the surrogate posterior at a candidate point,
//! the next point to evaluate being the one with the highest score.
use crate::errors::{EgoError, Result};
use crate::utils::{norm_cdf, norm_pdf};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Infill criterion used to select next promising point
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum InfillStrategy {
    /// Expected Improvement
    #[default]
    EI,
    /// Negated lower confidence bound `-(mean - beta.sigma)`
    LCB { beta: f64 },
    /// Probability of improvement
    POI,
    /// Negated posterior mean (pure exploitation)
    ExpReturn,
}

impl fmt::Display for InfillStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InfillStrategy::EI => "cEI",
            InfillStrategy::LCB { .. } => "cLCB",
            InfillStrategy::POI => "cPOI",
            InfillStrategy::ExpReturn => "cExpReturn",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for InfillStrategy {
    type Err = EgoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cEI" => Ok(InfillStrategy::EI),
            "cLCB" => Ok(InfillStrategy::LCB { beta: 1. }),
            "cPOI" => Ok(InfillStrategy::POI),
            "cExpReturn" => Ok(InfillStrategy::ExpReturn),
            _ => Err(EgoError::UnsupportedName(format!(
                "unknown criterion {}",
                s
            ))),
        }
    }
}

impl InfillStrategy {
    /// Criterion value given the posterior `mean` and `variance` at a point
    /// and the current minimum `fmin`, higher is more promising
    pub fn value(&self, mean: f64, variance: f64, fmin: f64) -> f64 {
        let sigma = variance.max(0.).sqrt();
        match self {
            InfillStrategy::EI => {
                if variance < f64::EPSILON {
                    0.0
                } else {
                    let u = (fmin - mean) / sigma;
                    sigma * (u * norm_cdf(u) + norm_pdf(u))
                }
            }
            InfillStrategy::LCB { beta } => -(mean - beta * sigma),
            InfillStrategy::POI => {
                if variance < f64::EPSILON {
                    if mean < fmin {
                        1.0
                    } else {
                        0.0
                    }
                } else {
                    norm_cdf((fmin - mean) / sigma)
                }
            }
            InfillStrategy::ExpReturn => -mean,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_names() {
        for name in ["cEI", "cLCB", "cPOI", "cExpReturn"] {
            let criterion: InfillStrategy = name.parse().unwrap();
            assert_eq!(criterion.to_string(), name);
        }
        assert!(matches!(
            "cThompson".parse::<InfillStrategy>(),
            Err(EgoError::UnsupportedName(_))
        ));
    }

    #[test]
    fn test_expected_improvement() {
        // u = 0: sigma * phi(0)
        assert_abs_diff_eq!(
            InfillStrategy::EI.value(1., 4., 1.),
            2. * norm_pdf(0.),
            epsilon = 1e-15
        );
        assert_eq!(InfillStrategy::EI.value(0., 0., 1.), 0.);
        // improvement grows as the mean decreases
        assert!(InfillStrategy::EI.value(0., 1., 1.) > InfillStrategy::EI.value(0.5, 1., 1.));
        // far below fmin, EI tends to the improvement
        assert_abs_diff_eq!(InfillStrategy::EI.value(-10., 1e-4, 0.), 10., epsilon = 1e-6);
    }

    #[test]
    fn test_other_criteria() {
        assert_abs_diff_eq!(
            InfillStrategy::LCB { beta: 2. }.value(1., 4., 0.),
            3.,
            epsilon = 1e-15
        );
        assert_abs_diff_eq!(InfillStrategy::POI.value(1., 1., 1.), 0.5, epsilon = 1e-15);
        assert_eq!(InfillStrategy::POI.value(0., 0., 1.), 1.);
        assert_eq!(InfillStrategy::ExpReturn.value(2., 1., 0.), -2.);
    }
}
