//! A toolbox for sequential model-based optimization of expensive black-box functions.
//!
//! The toolbox is split in three crates re-exported here:
//!
//! * [`doe`]: initial designs of experiments (Latin hypercube, Halton, random),
//! * [`gp`]: kernels built from a textual grammar, an incremental Cholesky engine
//!   and the Gaussian / Student-t process surrogates,
//! * [`ego`]: the optimization loop with its infill criteria, checkpoint and restore.
//!
//! ```no_run
//! use bopt::ego::BoptBuilder;
//! use ndarray::{array, ArrayView1};
//!
//! fn sphere(x: &ArrayView1<f64>) -> f64 {
//!     x.mapv(|v| (v - 0.3) * (v - 0.3)).sum()
//! }
//!
//! let res = BoptBuilder::optimize(sphere)
//!     .configure(|config| config.max_iters(20).seed(42))
//!     .min_within(&array![[-1., 1.], [-1., 1.]])
//!     .optimize()
//!     .expect("sphere minimized");
//! println!("f({}) = {}", res.x_opt, res.y_opt);
//! ```
#![warn(rustdoc::broken_intra_doc_links)]

pub use bopt_doe as doe;
pub use bopt_ego as ego;
pub use bopt_gp as gp;
