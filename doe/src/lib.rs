//! This library implements the initial designs of experiments used to seed
//! a sequential optimization run.
//!
//! Every design implements the [SamplingMethod] trait: it knows its sampling
//! space and can draw `ns` points either in the unit hypercube
//! ([SamplingMethod::normalized_sample]) or in the original space
//! ([SamplingMethod::sample]).
//!
//! * [Lhs]: Latin Hypercube sampling (classic, centered or maximin)
//! * [Halton]: deterministic low-discrepancy Halton sequence
//! * [Random]: uniform random sampling
//!
//! ```
//! use bopt_doe::{Halton, Lhs, LhsKind, Random, SamplingMethod};
//! use ndarray::arr2;
//! use ndarray_rand::rand::SeedableRng;
//! use rand_xoshiro::Xoshiro256Plus;
//!
//! let xlimits = arr2(&[[0., 1.], [-10., 10.]]);
//!
//! let lhs = Lhs::new(&xlimits)
//!     .kind(LhsKind::Maximin)
//!     .with_rng(Xoshiro256Plus::seed_from_u64(42))
//!     .sample(10);
//! assert_eq!(lhs.shape(), &[10, 2]);
//!
//! let halton = Halton::new(&xlimits).sample(10);
//! assert_eq!(halton.shape(), &[10, 2]);
//!
//! let random = Random::new(&xlimits).sample(10);
//! assert_eq!(random.shape(), &[10, 2]);
//! ```
mod halton;
mod lhs;
mod random;
mod traits;
mod utils;

pub use halton::*;
pub use lhs::*;
pub use random::*;
pub use traits::*;
pub use utils::pdist;
