//! Sequential optimization configuration.
use crate::criteria::InfillStrategy;
use crate::errors::{EgoError, Result};
use crate::types::{HotStartMode, InitialDesign};
use bopt_gp::SurrogateParams;
use linfa::ParamGuard;
use serde::{Deserialize, Serialize};

/// Default checkpoint file used by hot start
pub const CHECKPOINT_FILE: &str = ".checkpoints/bopt_state.json";

/// Optimizer configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoptConfig {
    /// Number of iterations after the initial design, one objective evaluation each
    pub(crate) max_iters: usize,
    /// Number of points of the initial design
    pub(crate) n_doe: usize,
    pub(crate) initial_design: InitialDesign,
    /// Criterion to select next point to evaluate
    pub(crate) infill_criterion: InfillStrategy,
    /// Number of best candidates refined when maximizing the criterion
    pub(crate) n_start: usize,
    /// Number of candidates scored when maximizing the criterion,
    /// 100 per input dimension when unset
    pub(crate) n_candidates: Option<usize>,
    /// Max number of criterion evaluations per refinement
    pub(crate) n_inner_iterations: usize,
    /// Interval between two hyperparameter learnings (as iteration number modulo),
    /// 0 means hyperparameters are only learned on the initial design
    pub(crate) n_iter_relearn: usize,
    /// A random generator seed used to get reproducible results
    pub(crate) seed: Option<u64>,
    /// Number of times the noise is multiplied by 10 when the correlation
    /// matrix is not positive definite, 0 makes it a failure
    pub(crate) max_noise_retries: usize,
    pub(crate) hot_start: HotStartMode,
    pub(crate) checkpoint_file: String,
    pub(crate) surrogate: SurrogateParams<f64>,
}

impl Default for BoptConfig {
    fn default() -> Self {
        BoptConfig {
            max_iters: 100,
            n_doe: 10,
            initial_design: InitialDesign::default(),
            infill_criterion: InfillStrategy::EI,
            n_start: 5,
            n_candidates: None,
            n_inner_iterations: 500,
            n_iter_relearn: 0,
            seed: None,
            max_noise_retries: 3,
            hot_start: HotStartMode::Disabled,
            checkpoint_file: CHECKPOINT_FILE.to_string(),
            surrogate: SurrogateParams::default(),
        }
    }
}

impl BoptConfig {
    /// Sets max number of iterations after the initial design
    pub fn max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Sets the number of points of the initial design
    pub fn n_doe(mut self, n_doe: usize) -> Self {
        self.n_doe = n_doe;
        self
    }

    /// Sets the sampling method of the initial design
    pub fn initial_design(mut self, initial_design: InitialDesign) -> Self {
        self.initial_design = initial_design;
        self
    }

    /// Sets the infill criterion
    pub fn infill_criterion(mut self, infill_criterion: InfillStrategy) -> Self {
        self.infill_criterion = infill_criterion;
        self
    }

    /// Sets the number of candidates refined when maximizing the criterion
    pub fn n_start(mut self, n_start: usize) -> Self {
        self.n_start = n_start;
        self
    }

    /// Sets the number of candidates scored when maximizing the criterion
    pub fn n_candidates(mut self, n_candidates: usize) -> Self {
        self.n_candidates = Some(n_candidates);
        self
    }

    /// Sets the max number of criterion evaluations per refinement
    pub fn n_inner_iterations(mut self, n_inner_iterations: usize) -> Self {
        self.n_inner_iterations = n_inner_iterations;
        self
    }

    /// Sets the interval between two hyperparameter learnings
    pub fn n_iter_relearn(mut self, n_iter_relearn: usize) -> Self {
        self.n_iter_relearn = n_iter_relearn;
        self
    }

    /// Allows to specify a seed for random number generator to allow
    /// reproducible runs.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the number of noise escalations before giving up on a
    /// non positive definite correlation matrix
    pub fn max_noise_retries(mut self, max_noise_retries: usize) -> Self {
        self.max_noise_retries = max_noise_retries;
        self
    }

    /// Whether checkpointing is enabled allowing hot start from previous checkpointed iteration if any
    pub fn hot_start(mut self, hot_start: HotStartMode) -> Self {
        self.hot_start = hot_start;
        self
    }

    /// Sets the checkpoint file used by hot start
    pub fn checkpoint_file(mut self, checkpoint_file: impl Into<String>) -> Self {
        self.checkpoint_file = checkpoint_file.into();
        self
    }

    /// Sets the surrogate parameters
    pub fn surrogate(mut self, surrogate: SurrogateParams<f64>) -> Self {
        self.surrogate = surrogate;
        self
    }

    /// Updates the surrogate parameters in place
    ///
    /// ```
    /// use bopt_ego::BoptConfig;
    /// use bopt_gp::SurrogateKind;
    ///
    /// let config = BoptConfig::default()
    ///     .configure_surrogate(|p| p.kind(SurrogateKind::StudentTProcessJef).kernel("kSEARD"));
    /// assert!(config.check().is_ok());
    /// ```
    pub fn configure_surrogate(
        mut self,
        init: impl FnOnce(SurrogateParams<f64>) -> SurrogateParams<f64>,
    ) -> Self {
        self.surrogate = init(self.surrogate);
        self
    }

    pub fn get_max_iters(&self) -> usize {
        self.max_iters
    }

    pub fn get_n_doe(&self) -> usize {
        self.n_doe
    }

    pub fn get_infill_criterion(&self) -> InfillStrategy {
        self.infill_criterion
    }

    pub fn get_hot_start(&self) -> HotStartMode {
        self.hot_start
    }

    pub fn get_checkpoint_file(&self) -> &str {
        &self.checkpoint_file
    }

    pub fn get_surrogate(&self) -> &SurrogateParams<f64> {
        &self.surrogate
    }

    /// Number of candidates scored in dimension `dim`
    pub(crate) fn n_candidates_for(&self, dim: usize) -> usize {
        self.n_candidates.unwrap_or(100 * dim)
    }

    /// Checks option consistency, surrogate parameters included
    pub fn check(&self) -> Result<()> {
        if self.n_doe == 0 {
            return Err(EgoError::InvalidConfigError(
                "initial design needs at least one point".to_string(),
            ));
        }
        if self.n_candidates == Some(0) {
            return Err(EgoError::InvalidConfigError(
                "criterion maximization needs at least one candidate".to_string(),
            ));
        }
        if self.n_inner_iterations == 0 {
            return Err(EgoError::InvalidConfigError(
                "criterion refinement needs at least one evaluation".to_string(),
            ));
        }
        if let InfillStrategy::LCB { beta } = self.infill_criterion {
            if !(beta >= 0.) {
                return Err(EgoError::InvalidConfigError(format!(
                    "LCB exploration weight should be non negative, got {}",
                    beta
                )));
            }
        }
        if self.checkpoint_file.trim().is_empty() {
            return Err(EgoError::InvalidConfigError(
                "checkpoint file cannot be empty".to_string(),
            ));
        }
        self.surrogate.check_ref()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bopt_doe::LhsKind;
    use bopt_gp::GpError;

    #[test]
    fn test_default_config() {
        let config = BoptConfig::default();
        assert_eq!(config.get_max_iters(), 100);
        assert_eq!(config.get_n_doe(), 10);
        assert_eq!(config.initial_design, InitialDesign::Lhs(LhsKind::Maximin));
        assert_eq!(config.get_infill_criterion(), InfillStrategy::EI);
        assert_eq!(config.n_candidates_for(3), 300);
        assert_eq!(config.max_noise_retries, 3);
        assert_eq!(config.get_checkpoint_file(), CHECKPOINT_FILE);
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            BoptConfig::default().n_doe(0).check(),
            Err(EgoError::InvalidConfigError(_))
        ));
        assert!(matches!(
            BoptConfig::default()
                .infill_criterion(InfillStrategy::LCB { beta: -1. })
                .check(),
            Err(EgoError::InvalidConfigError(_))
        ));
        assert!(matches!(
            BoptConfig::default()
                .configure_surrogate(|p| p.noise(-1.))
                .check(),
            Err(EgoError::GpError(GpError::InvalidValueError(_)))
        ));
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = BoptConfig::default()
            .seed(42)
            .infill_criterion(InfillStrategy::LCB { beta: 2. })
            .hot_start(HotStartMode::ExtendedIters(5))
            .configure_surrogate(|p| p.kernel("kProd(kSEISO,kConst)"));
        let json = serde_json::to_string(&config).unwrap();
        let back: BoptConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
