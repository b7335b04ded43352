//! Sequential model-based optimizer.
//!
//! A [BayesOpt] instance goes through the following stages:
//!
//! * `NotInitialized`: [BayesOpt::initialize_optimization] evaluates the
//!   initial design, fits the surrogate and moves to `Running`,
//! * `Running`: each [BayesOpt::step_optimization] maximizes the infill
//!   criterion, evaluates the objective at the maximizer and appends the new
//!   sample to the surrogate without refactorizing it. The optimizer is
//!   `Done` once the iteration budget is exhausted.
//!
//! At any time after initialization the optimization can be saved as an
//! [OptimizationState] and restored in a fresh optimizer which then proceeds
//! exactly as the saved one would have.
//!
//! ```
//! use bopt_ego::{BoptBuilder, InitialDesign};
//! use ndarray::ArrayView1;
//!
//! // Forrester function: minimum -6.0207 at x = 0.7572
//! fn forrester(x: &ArrayView1<f64>) -> f64 {
//!     (6. * x[0] - 2.).powi(2) * (12. * x[0] - 4.).sin()
//! }
//!
//! let res = BoptBuilder::optimize(forrester)
//!     .configure(|config| {
//!         config
//!             .n_doe(5)
//!             .initial_design(InitialDesign::Halton)
//!             .max_iters(5)
//!             .seed(42)
//!     })
//!     .min_within_unit_cube(1)
//!     .optimize()
//!     .expect("Forrester minimized");
//! assert_eq!(res.x_doe.nrows(), 10);
//! ```
use crate::config::BoptConfig;
use crate::errors::{EgoError, Result};
use crate::optimizers::{maximize_over_set, LhsCobylaOptimizer};
use crate::state::OptimizationState;
use crate::types::*;
use bopt_doe::{Halton, Lhs, Random, SamplingMethod};
use bopt_gp::{GpError, Surrogate};
use env_logger::{Builder, Env};
use log::{debug, info, warn};
use ndarray::{Array1, Array2, ArrayBase, ArrayView1, Axis, Data, Ix1, Ix2};
use ndarray_rand::rand::seq::index;
use ndarray_rand::rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use std::path::PathBuf;

/// Environment variable holding the log filter
pub const BOPT_LOG: &str = "BOPT_LOG";

/// Noise used by the first escalation of a zero noise
const MIN_ESCALATED_NOISE: f64 = 1e-10;

/// Optimizer builder allowing to specify the function to be minimized
/// and the domain where the minimum is searched for.
pub struct BoptBuilder<O: ObjectiveFunction> {
    fobj: O,
    config: BoptConfig,
}

impl<O: ObjectiveFunction> BoptBuilder<O> {
    /// Function to be minimized
    pub fn optimize(fobj: O) -> Self {
        BoptBuilder {
            fobj,
            config: BoptConfig::default(),
        }
    }

    /// Updates the default configuration
    pub fn configure<F: FnOnce(BoptConfig) -> BoptConfig>(mut self, init: F) -> Self {
        self.config = init(self.config);
        self
    }

    /// Builds an optimizer searching the unit hypercube of dimension `dim`
    pub fn min_within_unit_cube(self, dim: usize) -> BayesOpt<O> {
        BayesOpt::new(self.fobj, self.config, SearchSpace::Continuous { dim, xlimits: None })
    }

    /// Builds an optimizer searching the box given by `xlimits` rows
    /// `[lower, upper]`. The surrogate works in the unit hypercube which is
    /// mapped to the box before objective evaluations.
    pub fn min_within(self, xlimits: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> BayesOpt<O> {
        let space = SearchSpace::Continuous {
            dim: xlimits.nrows(),
            xlimits: Some(xlimits.to_owned()),
        };
        BayesOpt::new(self.fobj, self.config, space)
    }

    /// Builds an optimizer searching the finite set of `candidates` rows
    pub fn min_within_set(self, candidates: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> BayesOpt<O> {
        BayesOpt::new(
            self.fobj,
            self.config,
            SearchSpace::Discrete(candidates.to_owned()),
        )
    }
}

/// Sequential model-based optimizer
pub struct BayesOpt<O: ObjectiveFunction> {
    fobj: O,
    config: BoptConfig,
    space: SearchSpace,
    rng: Xoshiro256Plus,
    surrogate: Option<Surrogate<f64>>,
    iter: usize,
    max_iters: usize,
    status: RunStatus,
}

impl<O: ObjectiveFunction> BayesOpt<O> {
    /// Optimizer of `fobj` over the given search space
    pub fn new(fobj: O, config: BoptConfig, space: SearchSpace) -> Self {
        let env = Env::new().filter_or(BOPT_LOG, "info");
        let mut builder = Builder::from_env(env);
        let builder = builder.target(env_logger::Target::Stdout);
        builder.try_init().ok();

        debug!("Optimizer configuration: {:?}", config);
        let rng = match config.seed {
            Some(seed) => Xoshiro256Plus::seed_from_u64(seed),
            None => Xoshiro256Plus::from_entropy(),
        };
        BayesOpt {
            fobj,
            max_iters: config.max_iters,
            config,
            space,
            rng,
            surrogate: None,
            iter: 0,
            status: RunStatus::NotInitialized,
        }
    }

    pub fn config(&self) -> &BoptConfig {
        &self.config
    }

    pub fn space(&self) -> &SearchSpace {
        &self.space
    }

    /// Number of iterations done after the initial design
    pub fn current_iter(&self) -> usize {
        self.iter
    }

    /// Iteration budget, may exceed the configured one after a hot start
    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Surrogate of the objective, none before initialization
    pub fn surrogate(&self) -> Option<&Surrogate<f64>> {
        self.surrogate.as_ref()
    }

    fn check_space(&self) -> Result<()> {
        match &self.space {
            SearchSpace::Continuous { dim, xlimits } => {
                if *dim == 0 {
                    return Err(EgoError::InvalidConfigError(
                        "search space dimension should be positive".to_string(),
                    ));
                }
                if let Some(xlimits) = xlimits {
                    if xlimits.ncols() != 2
                        || xlimits.rows().into_iter().any(|r| !(r[0] < r[1]))
                    {
                        return Err(EgoError::InvalidConfigError(format!(
                            "bounds should be given as [lower, upper] rows, got {}",
                            xlimits
                        )));
                    }
                }
            }
            SearchSpace::Discrete(candidates) => {
                if candidates.is_empty() {
                    return Err(EgoError::InvalidConfigError(
                        "candidate set cannot be empty".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    fn is_reachable(&self, x: &ArrayView1<f64>) -> bool {
        self.fobj
            .check_reachable(&self.space.to_user_space(x).view())
    }

    fn evaluate(&self, x: &ArrayView1<f64>) -> f64 {
        self.fobj.evaluate(&self.space.to_user_space(x).view())
    }

    /// Initial design in the surrogate space, consumes one draw of the generator
    fn initial_design(&mut self) -> Result<Array2<f64>> {
        let seed: u64 = self.rng.gen();
        let rng = Xoshiro256Plus::seed_from_u64(seed);
        let n_doe = self.config.n_doe;
        match &self.space {
            SearchSpace::Continuous { dim, .. } => {
                let unit = Array2::from_shape_fn((*dim, 2), |(_, j)| j as f64);
                let doe = match self.config.initial_design {
                    InitialDesign::Lhs(kind) => {
                        Lhs::new(&unit).kind(kind).with_rng(rng).sample(n_doe)
                    }
                    InitialDesign::Halton => Halton::new(&unit).sample(n_doe),
                    InitialDesign::Random => Random::new(&unit).with_rng(rng).sample(n_doe),
                };
                Ok(doe)
            }
            SearchSpace::Discrete(candidates) => {
                if n_doe > candidates.nrows() {
                    return Err(EgoError::InvalidConfigError(format!(
                        "initial design of {} points out of {} candidates",
                        n_doe,
                        candidates.nrows()
                    )));
                }
                let mut rng = rng;
                let indices = index::sample(&mut rng, candidates.nrows(), n_doe).into_vec();
                Ok(candidates.select(Axis(0), &indices))
            }
        }
    }

    /// Evaluates the initial design and fits the surrogate
    pub fn initialize_optimization(&mut self) -> Result<()> {
        self.config.check()?;
        self.check_space()?;
        let dim = self.space.dim();

        let doe = self.initial_design()?;
        let reachable: Vec<usize> = doe
            .rows()
            .into_iter()
            .enumerate()
            .filter(|(_, x)| self.is_reachable(x))
            .map(|(i, _)| i)
            .collect();
        if reachable.len() < doe.nrows() {
            warn!(
                "{} unreachable points removed from the initial design",
                doe.nrows() - reachable.len()
            );
        }
        if reachable.is_empty() {
            return Err(EgoError::NoReachablePoint(
                "every point of the initial design is unreachable".to_string(),
            ));
        }
        let x_data = doe.select(Axis(0), &reachable);
        let y_data: Array1<f64> = x_data.rows().into_iter().map(|x| self.evaluate(&x)).collect();

        let mut surrogate = Surrogate::new(self.config.surrogate.clone(), dim)?;
        surrogate.set_samples(&x_data, &y_data)?;
        let retries = self.config.max_noise_retries;
        fit_with_escalation(&mut surrogate, retries)?;
        learn_with_escalation(&mut surrogate, retries)?;

        let best = surrogate.best_index().unwrap_or(0);
        info!(
            "Initial design of {} points, best y = {} at x = {}",
            y_data.len(),
            y_data[best],
            self.space.to_user_space(&x_data.row(best))
        );
        self.surrogate = Some(surrogate);
        self.iter = 0;
        self.status = if self.max_iters == 0 {
            RunStatus::Done
        } else {
            RunStatus::Running
        };
        Ok(())
    }

    /// Next point to evaluate, `seed` feeds the candidate generation of continuous spaces
    fn propose(&self, surrogate: &Surrogate<f64>, seed: u64) -> Result<Array1<f64>> {
        let samples = surrogate.samples();
        let fmin = samples.y()[surrogate.best_index().unwrap_or(0)];
        let criterion = self.config.infill_criterion;
        let score = |x: &ArrayView1<f64>| -> f64 {
            if !self.is_reachable(x) {
                return f64::NEG_INFINITY;
            }
            match surrogate.predict(x) {
                Ok((mean, variance)) => {
                    let value = criterion.value(mean, variance, fmin);
                    if value.is_nan() {
                        f64::NEG_INFINITY
                    } else {
                        value
                    }
                }
                Err(_) => f64::NEG_INFINITY,
            }
        };

        match &self.space {
            SearchSpace::Continuous { dim, .. } => {
                let (x, value) = LhsCobylaOptimizer::new(*dim, &score)
                    .n_candidates(self.config.n_candidates_for(*dim))
                    .n_start(self.config.n_start)
                    .max_eval(self.config.n_inner_iterations)
                    .with_rng(Xoshiro256Plus::seed_from_u64(seed))
                    .maximize()
                    .ok_or_else(|| {
                        EgoError::NoReachablePoint(format!(
                            "no reachable candidate at iteration {}",
                            self.iter + 1
                        ))
                    })?;
                debug!("{} = {} at {}", criterion, value, x);
                Ok(x)
            }
            SearchSpace::Discrete(candidates) => {
                let unsampled_score = |x: &ArrayView1<f64>| -> f64 {
                    if samples.x().rows().into_iter().any(|r| r == *x) {
                        f64::NEG_INFINITY
                    } else {
                        score(x)
                    }
                };
                let (i, value) = maximize_over_set(&unsampled_score, candidates).ok_or_else(|| {
                    EgoError::NoReachablePoint(
                        "every candidate is either sampled or unreachable".to_string(),
                    )
                })?;
                debug!("{} = {} at candidate {}", criterion, value, i);
                Ok(candidates.row(i).to_owned())
            }
        }
    }

    /// Proposes, evaluates and adds one sample.
    ///
    /// On error the optimizer is left as it was before the call (surrogate,
    /// generator and iteration counter), so the step can be retried or the
    /// optimization saved consistently.
    pub fn step_optimization(&mut self) -> Result<()> {
        if self.status != RunStatus::Running {
            return Err(EgoError::InvalidState(format!(
                "cannot step an optimization in state {:?}",
                self.status
            )));
        }
        let retries = self.config.max_noise_retries;
        let mut surrogate = self.surrogate.take().ok_or_else(|| {
            EgoError::InvalidState("running optimization without surrogate".to_string())
        })?;
        let snapshot = (surrogate.clone(), self.rng.clone());
        match self.step_with(&mut surrogate, retries) {
            Ok(()) => self.surrogate = Some(surrogate),
            Err(err) => {
                warn!("Iteration {} failed: {}", self.iter + 1, err);
                let (surrogate, rng) = snapshot;
                self.surrogate = Some(surrogate);
                self.rng = rng;
                return Err(err);
            }
        }

        self.iter += 1;
        if self.iter >= self.max_iters {
            self.status = RunStatus::Done;
        }
        Ok(())
    }

    fn step_with(&mut self, surrogate: &mut Surrogate<f64>, retries: usize) -> Result<()> {
        let relearn = self.config.n_iter_relearn;
        if relearn > 0 && self.iter > 0 && self.iter % relearn == 0 {
            debug!("Relearn hyperparameters at iteration {}", self.iter);
            learn_with_escalation(surrogate, retries)?;
        }
        let seed = match self.space {
            SearchSpace::Continuous { .. } => self.rng.gen(),
            SearchSpace::Discrete(_) => 0,
        };
        let x = self.propose(surrogate, seed)?;
        let y = self.evaluate(&x.view());
        update_with_escalation(surrogate, &x, y, retries)?;

        let best = surrogate.best_index().unwrap_or(0);
        info!(
            "Iter {}/{}: y = {} at x = {} (best y = {})",
            self.iter + 1,
            self.max_iters,
            y,
            self.space.to_user_space(&x.view()),
            surrogate.samples().y()[best]
        );
        Ok(())
    }

    fn surrogate_or_err(&self) -> Result<&Surrogate<f64>> {
        self.surrogate.as_ref().ok_or_else(|| {
            EgoError::InvalidState("optimization is not initialized".to_string())
        })
    }

    /// Best sample found so far and the whole history, in the objective space
    pub fn final_result(&self) -> Result<OptimResult> {
        let surrogate = self.surrogate_or_err()?;
        let samples = surrogate.samples();
        let best = surrogate
            .best_index()
            .ok_or_else(|| EgoError::InvalidState("no sample evaluated".to_string()))?;
        let mut x_doe = samples.x().to_owned();
        for mut row in x_doe.rows_mut() {
            let x = self.space.to_user_space(&row.view());
            row.assign(&x);
        }
        Ok(OptimResult {
            x_opt: x_doe.row(best).to_owned(),
            y_opt: samples.y()[best],
            x_doe,
            y_doe: samples.y().to_owned(),
        })
    }

    /// Snapshot of the optimization allowing to resume it later
    pub fn save_optimization(&self) -> Result<OptimizationState> {
        let surrogate = self.surrogate_or_err()?;
        let samples = surrogate.samples();
        Ok(OptimizationState {
            iter: self.iter,
            n_samples: samples.len(),
            x_data: samples.x().to_owned(),
            y_data: samples.y().to_owned(),
            rng: self.rng.clone(),
            best_index: surrogate.best_index().unwrap_or(0),
            hyperparameters: surrogate.kernel().hyperparameters(),
            noise: surrogate.noise(),
        })
    }

    /// Resumes the optimization saved in `state`, the surrogate is rebuilt
    /// from the saved samples, hyperparameters and noise.
    pub fn restore_optimization(&mut self, state: &OptimizationState) -> Result<()> {
        self.config.check()?;
        self.check_space()?;
        let dim = self.space.dim();
        state.check(dim)?;

        let params = self.config.surrogate.clone().noise(state.noise);
        let mut surrogate = Surrogate::new(params, dim)?;
        surrogate.set_hyperparameters(&state.hyperparameters)?;
        surrogate.set_samples(&state.x_data, &state.y_data)?;
        surrogate.fit_surrogate_model()?;

        self.surrogate = Some(surrogate);
        self.iter = state.iter;
        self.rng = state.rng.clone();
        self.status = if self.iter >= self.max_iters {
            RunStatus::Done
        } else {
            RunStatus::Running
        };
        info!(
            "Optimization restored at iteration {} with {} samples",
            self.iter, state.n_samples
        );
        Ok(())
    }

    fn checkpoint(&self) -> Result<()> {
        if self.config.hot_start != HotStartMode::Disabled {
            self.save_optimization()?
                .save(&self.config.checkpoint_file)?;
        }
        Ok(())
    }

    /// Runs the optimization until the iteration budget is exhausted.
    ///
    /// With hot start enabled, the optimization resumes from the checkpoint
    /// file if any, and the checkpoint is written after initialization and
    /// after every iteration.
    pub fn optimize(&mut self) -> Result<OptimResult> {
        let hot_start = self.config.hot_start;
        let path = PathBuf::from(&self.config.checkpoint_file);
        if hot_start != HotStartMode::Disabled && path.exists() {
            let state = OptimizationState::load(&path)?;
            if let HotStartMode::ExtendedIters(n_iters) = hot_start {
                info!("Extending max iters by {} from {}", n_iters, self.max_iters);
                self.max_iters = self.config.max_iters + n_iters;
            }
            self.restore_optimization(&state)?;
        } else if self.status == RunStatus::NotInitialized {
            if hot_start != HotStartMode::Disabled {
                info!("No checkpoint found at {:?}", path);
            }
            self.initialize_optimization()?;
            self.checkpoint()?;
        }
        while self.status == RunStatus::Running {
            self.step_optimization()?;
            self.checkpoint()?;
        }
        let res = self.final_result()?;
        info!("Optimization done: y_opt = {} at x_opt = {}", res.y_opt, res.x_opt);
        Ok(res)
    }
}

/// Fits `surrogate`, multiplying its noise by 10 up to `retries` times while
/// the correlation matrix is not positive definite
fn fit_with_escalation(surrogate: &mut Surrogate<f64>, retries: usize) -> Result<()> {
    match surrogate.fit_surrogate_model() {
        Ok(()) => Ok(()),
        Err(err @ GpError::NotPositiveDefinite { .. }) => escalate_noise(surrogate, retries, err),
        Err(err) => Err(err.into()),
    }
}

fn learn_with_escalation(surrogate: &mut Surrogate<f64>, retries: usize) -> Result<()> {
    match surrogate.learn_hyperparameters() {
        Ok(()) => Ok(()),
        Err(err @ GpError::NotPositiveDefinite { .. }) => escalate_noise(surrogate, retries, err),
        Err(err) => Err(err.into()),
    }
}

/// Appends `(x, y)` to `surrogate`, on a non positive definite matrix the
/// sample is added anyway and the model refitted with an escalated noise
fn update_with_escalation(
    surrogate: &mut Surrogate<f64>,
    x: &ArrayBase<impl Data<Elem = f64>, Ix1>,
    y: f64,
    retries: usize,
) -> Result<()> {
    match surrogate.update_surrogate_model(x, y) {
        Ok(()) => Ok(()),
        Err(err @ GpError::NotPositiveDefinite { .. }) if retries > 0 => {
            surrogate.add_sample(x, y)?;
            escalate_noise(surrogate, retries, err)
        }
        Err(err) => Err(err.into()),
    }
}

fn escalate_noise(surrogate: &mut Surrogate<f64>, retries: usize, err: GpError) -> Result<()> {
    let mut last = err;
    for attempt in 1..=retries {
        let noise = (10. * surrogate.noise()).max(MIN_ESCALATED_NOISE);
        warn!(
            "{} (attempt {}/{}), refit with noise = {:e}",
            last, attempt, retries, noise
        );
        surrogate.set_noise(noise);
        match surrogate.fit_surrogate_model() {
            Ok(()) => return Ok(()),
            Err(err @ GpError::NotPositiveDefinite { .. }) => last = err,
            Err(err) => return Err(err.into()),
        }
    }
    Err(last.into())
}
