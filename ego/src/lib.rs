//! This library implements sequential model-based (bayesian) optimization of
//! expensive black-box functions.
//!
//! The objective is modeled by an incremental gaussian or Student-t process
//! surrogate (see [bopt_gp]) which is updated in `O(n^2)` after each new
//! evaluation. The next point to evaluate is the maximizer of an infill
//! criterion computed from the surrogate posterior.
//!
//! # Example
//!
//! ```no_run
//! use bopt_ego::{BoptBuilder, InfillStrategy};
//! use bopt_gp::{mean_models::MeanKind, LearningType, SurrogateKind};
//! use ndarray::{array, ArrayView1};
//!
//! // Branin function: minimum 0.397887 at (-pi, 12.275), (pi, 2.275), (9.42478, 2.475)
//! fn branin(x: &ArrayView1<f64>) -> f64 {
//!     let pi = std::f64::consts::PI;
//!     let t = x[1] - 5.1 / (4. * pi * pi) * x[0] * x[0] + 5. / pi * x[0] - 6.;
//!     t * t + 10. * (1. - 1. / (8. * pi)) * x[0].cos() + 10.
//! }
//!
//! let xlimits = array![[-5., 10.], [0., 15.]];
//! let res = BoptBuilder::optimize(branin)
//!     .configure(|config| {
//!         config
//!             .n_doe(10)
//!             .max_iters(50)
//!             .infill_criterion(InfillStrategy::EI)
//!             .n_iter_relearn(10)
//!             .configure_surrogate(|p| {
//!                 p.kind(SurrogateKind::StudentTProcessJef)
//!                     .kernel("kMaternARD5")
//!                     .mean(MeanKind::Constant)
//!                     .learning(LearningType::MaximumLikelihood)
//!             })
//!     })
//!     .min_within(&xlimits)
//!     .optimize()
//!     .expect("Branin minimized");
//! println!("min f(x) = {} at x = {}", res.y_opt, res.x_opt);
//! ```
//!
//! # Usage
//!
//! [BoptBuilder] takes the objective function, the configuration [BoptConfig]
//! and builds a [BayesOpt] optimizer over one of the following domains:
//!
//! * `min_within_unit_cube(dim)`: the unit hypercube, the objective is called
//!   with points of `[0, 1]^dim`,
//! * `min_within(&xlimits)`: a box, searched in the unit hypercube and mapped
//!   to the box before objective evaluations,
//! * `min_within_set(&candidates)`: a finite set of points, each one
//!   evaluated at most once.
//!
//! The optimization can be run at once with [BayesOpt::optimize] or step by
//! step with [BayesOpt::initialize_optimization] and
//! [BayesOpt::step_optimization]. A running optimization is saved with
//! [BayesOpt::save_optimization] as an [OptimizationState], written as json,
//! and resumed in another optimizer with [BayesOpt::restore_optimization]:
//! given the same seed, the resumed run proposes exactly the points the
//! uninterrupted run would have.
//!
//! * Hot start checkpointing can be enabled with `hot_start` option: the state
//!   is written after every iteration and reloaded if the checkpoint file
//!   exists when the optimization starts, optionally extending the iteration budget.
//!
//! ```no_run
//! # use bopt_ego::{BoptConfig, HotStartMode};
//! # let config = BoptConfig::default();
//!     config.hot_start(HotStartMode::ExtendedIters(10));
//! ```
//!
//! * When the correlation matrix is not positive definite, the surrogate noise
//!   is multiplied by 10 and the model refitted, at most `max_noise_retries` times.
//!
//! Logs are emitted with the `log` crate, the default logger is configured by
//! the `BOPT_LOG` environment variable (default `info`).
#![warn(rustdoc::broken_intra_doc_links)]

pub mod criteria;

mod bayesopt;
mod config;
mod errors;
mod optimizers;
mod state;
mod types;
mod utils;

pub use crate::bayesopt::*;
pub use crate::config::*;
pub use crate::criteria::InfillStrategy;
pub use crate::errors::*;
pub use crate::state::*;
pub use crate::types::*;
pub use crate::utils::{norm_cdf, norm_pdf};
