//! This library implements incremental [Gaussian Process](https://en.wikipedia.org/wiki/Gaussian_process)
//! and Student-t process regression, used as surrogate models in sequential
//! model-based optimization.
//!
//! Covariance functions are [kernels::Kernel] trees built from textual expressions
//! such as `kSum(kSEISO,kConst)` by the [kernels::KernelFactory]. Mean functions
//! are described in [mean_models].
//!
//! A [Surrogate] parameterized by [SurrogateParams] keeps the Cholesky factor of
//! its correlation matrix in a [CholeskyFactor] which grows by one row per new
//! sample, so that updating the model with a new sample costs `O(n^2)` instead
//! of the `O(n^3)` of a full fit.
#![warn(rustdoc::broken_intra_doc_links)]
mod cholesky;
mod errors;
pub mod kernels;
pub mod mean_models;
mod priors;
mod samples;

mod parameters;
mod surrogate;

mod optimization;

pub use cholesky::*;
pub use errors::*;
pub use parameters::*;
pub use priors::NormalPrior;
pub use samples::SampleSet;
pub use surrogate::*;
