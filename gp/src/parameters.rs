use crate::errors::{GpError, Result};
use crate::mean_models::MeanKind;
use linfa::{Float, ParamGuard};
use ndarray::{array, Array1};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of surrogate models, i.e. how the posterior is computed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum SurrogateKind {
    /// Gaussian process with known mean parameters and signal variance
    #[default]
    GaussianProcess,
    /// Gaussian process with mean parameters and signal variance estimated
    /// by maximum likelihood
    GaussianProcessMl,
    /// Gaussian process with a normal prior on the mean parameters and a
    /// known signal variance
    GaussianProcessNormal,
    /// Student-t process: Jeffreys prior on mean parameters and signal variance
    StudentTProcessJef,
    /// Student-t process: Normal-Inverse-Gamma prior on mean parameters and
    /// signal variance
    StudentTProcessNig,
}

impl fmt::Display for SurrogateKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            SurrogateKind::GaussianProcess => "sGaussianProcess",
            SurrogateKind::GaussianProcessMl => "sGaussianProcessML",
            SurrogateKind::GaussianProcessNormal => "sGaussianProcessNormal",
            SurrogateKind::StudentTProcessJef => "sStudentTProcessJef",
            SurrogateKind::StudentTProcessNig => "sStudentTProcessNIG",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for SurrogateKind {
    type Err = GpError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sGaussianProcess" => Ok(SurrogateKind::GaussianProcess),
            "sGaussianProcessML" => Ok(SurrogateKind::GaussianProcessMl),
            "sGaussianProcessNormal" => Ok(SurrogateKind::GaussianProcessNormal),
            "sStudentTProcessJef" => Ok(SurrogateKind::StudentTProcessJef),
            "sStudentTProcessNIG" => Ok(SurrogateKind::StudentTProcessNig),
            _ => Err(GpError::UnsupportedName(format!("unknown surrogate '{}'", s))),
        }
    }
}

impl SurrogateKind {
    /// Whether the mean parameters have a normal prior
    pub fn has_mean_prior(&self) -> bool {
        matches!(
            self,
            SurrogateKind::GaussianProcessNormal | SurrogateKind::StudentTProcessNig
        )
    }

    /// Whether the posterior is a Student-t distribution
    pub fn is_student_t(&self) -> bool {
        matches!(
            self,
            SurrogateKind::StudentTProcessJef | SurrogateKind::StudentTProcessNig
        )
    }
}

/// How kernel hyperparameters are tuned from the samples
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum LearningType {
    /// Hyperparameters keep their configured values
    #[default]
    Fixed,
    /// Maximize the marginal likelihood
    MaximumLikelihood,
    /// Maximize the marginal likelihood times the hyperparameter priors
    MaximumPosterior,
}

/// Default lower bound of the hyperparameters during learning
pub const THETA_LEARNING_MIN: f64 = 1e-3;
/// Default upper bound of the hyperparameters during learning
pub const THETA_LEARNING_MAX: f64 = 1e3;

/// A set of validated surrogate parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct SurrogateValidParams<F: Float> {
    pub(crate) kind: SurrogateKind,
    /// Kernel expression
    pub(crate) kernel: String,
    /// Initial hyperparameters, also the means of their priors.
    /// A single value is broadcast to every hyperparameter.
    pub(crate) theta: Array1<F>,
    /// Standard deviations of the hyperparameter priors, zero means fixed
    pub(crate) theta_std: Array1<F>,
    pub(crate) mean: MeanKind,
    /// Mean parameters, also the means of their prior
    pub(crate) mu: Array1<F>,
    /// Standard deviations of the mean parameters prior
    pub(crate) mu_std: Array1<F>,
    /// Noise added to the correlation matrix diagonal
    pub(crate) noise: F,
    /// Known signal variance
    pub(crate) signal_variance: F,
    /// Inverse-Gamma shape of the signal variance prior
    pub(crate) alpha: F,
    /// Inverse-Gamma scale of the signal variance prior
    pub(crate) beta: F,
    pub(crate) learning: LearningType,
    /// Number of starting points when learning hyperparameters
    pub(crate) n_start: usize,
}

impl<F: Float> Default for SurrogateValidParams<F> {
    fn default() -> SurrogateValidParams<F> {
        SurrogateValidParams {
            kind: SurrogateKind::default(),
            kernel: "kMaternISO3".to_string(),
            theta: array![F::one()],
            theta_std: array![F::cast(10.)],
            mean: MeanKind::default(),
            mu: array![F::one()],
            mu_std: array![F::cast(1000.)],
            noise: F::cast(1e-4),
            signal_variance: F::one(),
            alpha: F::one(),
            beta: F::one(),
            learning: LearningType::default(),
            n_start: 5,
        }
    }
}

impl<F: Float> SurrogateValidParams<F> {
    pub fn kind(&self) -> SurrogateKind {
        self.kind
    }

    pub fn kernel(&self) -> &str {
        &self.kernel
    }

    pub fn theta(&self) -> &Array1<F> {
        &self.theta
    }

    pub fn theta_std(&self) -> &Array1<F> {
        &self.theta_std
    }

    pub fn mean(&self) -> MeanKind {
        self.mean
    }

    pub fn mu(&self) -> &Array1<F> {
        &self.mu
    }

    pub fn mu_std(&self) -> &Array1<F> {
        &self.mu_std
    }

    pub fn noise(&self) -> F {
        self.noise
    }

    pub fn signal_variance(&self) -> F {
        self.signal_variance
    }

    pub fn alpha(&self) -> F {
        self.alpha
    }

    pub fn beta(&self) -> F {
        self.beta
    }

    pub fn learning(&self) -> LearningType {
        self.learning
    }

    pub fn n_start(&self) -> usize {
        self.n_start
    }
}

/// The set of surrogate parameters that can be set by the user.
///
/// ```
/// use bopt_gp::{SurrogateKind, SurrogateParams};
/// use linfa::ParamGuard;
///
/// let params = SurrogateParams::<f64>::default()
///     .kind(SurrogateKind::StudentTProcessNig)
///     .kernel("kSum(kSEISO,kConst)")
///     .theta(&[1.0, 0.5])
///     .noise(1e-6);
/// assert!(params.check_ref().is_ok());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct SurrogateParams<F: Float>(SurrogateValidParams<F>);

impl<F: Float> SurrogateParams<F> {
    /// Set the kind of surrogate
    pub fn kind(mut self, kind: SurrogateKind) -> Self {
        self.0.kind = kind;
        self
    }

    /// Set the kernel expression, like `kSum(kSEARD,kConst)`
    pub fn kernel(mut self, expression: &str) -> Self {
        self.0.kernel = expression.to_string();
        self
    }

    /// Set initial kernel hyperparameters
    pub fn theta(mut self, theta: &[F]) -> Self {
        self.0.theta = Array1::from(theta.to_vec());
        self
    }

    /// Set the standard deviations of the kernel hyperparameter priors
    pub fn theta_std(mut self, std: &[F]) -> Self {
        self.0.theta_std = Array1::from(std.to_vec());
        self
    }

    /// Set the mean function
    pub fn mean(mut self, mean: MeanKind) -> Self {
        self.0.mean = mean;
        self
    }

    /// Set the mean parameters (or the means of their prior)
    pub fn mu(mut self, mu: &[F]) -> Self {
        self.0.mu = Array1::from(mu.to_vec());
        self
    }

    /// Set the standard deviations of the mean parameters prior
    pub fn mu_std(mut self, std: &[F]) -> Self {
        self.0.mu_std = Array1::from(std.to_vec());
        self
    }

    /// Set the noise added to the correlation matrix diagonal
    pub fn noise(mut self, noise: F) -> Self {
        self.0.noise = noise;
        self
    }

    /// Set the known signal variance
    pub fn signal_variance(mut self, signal_variance: F) -> Self {
        self.0.signal_variance = signal_variance;
        self
    }

    /// Set the Normal-Inverse-Gamma shape and scale parameters
    pub fn inverse_gamma(mut self, alpha: F, beta: F) -> Self {
        self.0.alpha = alpha;
        self.0.beta = beta;
        self
    }

    /// Set the hyperparameter learning strategy
    pub fn learning(mut self, learning: LearningType) -> Self {
        self.0.learning = learning;
        self
    }

    /// Set the number of starting points of hyperparameter learning
    pub fn n_start(mut self, n_start: usize) -> Self {
        self.0.n_start = n_start;
        self
    }
}

impl<F: Float> ParamGuard for SurrogateParams<F> {
    type Checked = SurrogateValidParams<F>;
    type Error = GpError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        let p = &self.0;
        if p.kernel.trim().is_empty() {
            return Err(GpError::InvalidValueError(
                "kernel expression cannot be empty".to_string(),
            ));
        }
        if p.theta.is_empty() || p.theta.iter().any(|&v| !(v > F::zero())) {
            return Err(GpError::InvalidValueError(format!(
                "kernel hyperparameters should be positive, got {}",
                p.theta
            )));
        }
        if p.theta_std.iter().any(|&v| !(v >= F::zero())) {
            return Err(GpError::InvalidValueError(format!(
                "hyperparameter prior standard deviations should be non negative, got {}",
                p.theta_std
            )));
        }
        if p.theta_std.len() != p.theta.len() && p.theta_std.len() != 1 {
            return Err(GpError::InvalidValueError(format!(
                "expected 1 or {} hyperparameter prior standard deviations, got {}",
                p.theta.len(),
                p.theta_std.len()
            )));
        }
        let invalid_mu_std = if p.kind.has_mean_prior() {
            p.mu_std.iter().any(|&v| !(v > F::zero()))
        } else {
            p.mu_std.iter().any(|&v| !(v >= F::zero()))
        };
        if invalid_mu_std {
            return Err(GpError::InvalidValueError(format!(
                "mean prior standard deviations are invalid for {}, got {}",
                p.kind, p.mu_std
            )));
        }
        if !(p.noise >= F::zero()) {
            return Err(GpError::InvalidValueError(format!(
                "noise should be non negative, got {}",
                p.noise
            )));
        }
        if !(p.signal_variance > F::zero()) || !(p.alpha > F::zero()) || !(p.beta > F::zero()) {
            return Err(GpError::InvalidValueError(
                "signal variance, alpha and beta should be positive".to_string(),
            ));
        }
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
