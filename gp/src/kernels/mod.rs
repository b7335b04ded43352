//! Composable covariance functions.
//!
//! A [Kernel] is a tree whose leaves are [PrimitiveKernel]s and whose inner
//! nodes are sums or products of two sub-kernels. Kernels are usually built
//! from a textual expression through the [KernelFactory]:
//!
//! ```
//! use bopt_gp::kernels::KernelFactory;
//! use ndarray::array;
//!
//! let factory = KernelFactory::new();
//! let kernel = factory.create::<f64>("kSum(kSEISO,kConst)", 2).unwrap();
//! assert_eq!(kernel.n_hyperparameters(), 2);
//! assert_eq!(kernel.to_string(), "kSum(kSEISO,kConst)");
//! let k = kernel.value(&array![0., 0.], &array![0., 0.]);
//! assert_eq!(k, 2.);
//! ```
mod factory;
mod parser;
mod primitives;

pub use factory::*;
pub use primitives::KernelFamily;

use crate::errors::{GpError, Result};
use crate::priors::NormalPrior;
use linfa::Float;
use ndarray::{s, Array1, Array2, ArrayBase, ArrayView1, Data, Ix1, Ix2};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// A primitive covariance function with its hyperparameters and their priors
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct PrimitiveKernel<F: Float> {
    family: KernelFamily,
    theta: Array1<F>,
    prior_mean: Array1<F>,
    /// A zero standard deviation marks a fixed hyperparameter
    prior_std: Array1<F>,
}

impl<F: Float> PrimitiveKernel<F> {
    /// Primitive kernel for inputs of dimension `dim` with unit hyperparameters
    pub fn new(family: KernelFamily, dim: usize) -> Self {
        let n = family.n_hyperparameters(dim);
        PrimitiveKernel {
            family,
            theta: Array1::ones(n),
            prior_mean: Array1::ones(n),
            prior_std: Array1::zeros(n),
        }
    }

    pub fn family(&self) -> KernelFamily {
        self.family
    }

    pub fn theta(&self) -> &Array1<F> {
        &self.theta
    }

    pub fn prior_std(&self) -> &Array1<F> {
        &self.prior_std
    }

    fn log_prior(&self) -> F {
        let mut res = F::zero();
        for ((&theta, &mean), &std) in self
            .theta
            .iter()
            .zip(self.prior_mean.iter())
            .zip(self.prior_std.iter())
        {
            if std > F::zero() {
                res += NormalPrior::new(mean, std).log_density(theta);
            }
        }
        res
    }
}

/// Covariance function tree
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum Kernel<F: Float> {
    Primitive(PrimitiveKernel<F>),
    /// `k(x1, x2) = left(x1, x2) + right(x1, x2)`
    Sum(Box<Kernel<F>>, Box<Kernel<F>>),
    /// `k(x1, x2) = left(x1, x2) * right(x1, x2)`
    Product(Box<Kernel<F>>, Box<Kernel<F>>),
}

impl<F: Float> From<PrimitiveKernel<F>> for Kernel<F> {
    fn from(primitive: PrimitiveKernel<F>) -> Self {
        Kernel::Primitive(primitive)
    }
}

impl<F: Float> fmt::Display for Kernel<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Kernel::Primitive(p) => write!(f, "{}", p.family),
            Kernel::Sum(a, b) => write!(f, "{}({},{})", SUM_NAME, a, b),
            Kernel::Product(a, b) => write!(f, "{}({},{})", PRODUCT_NAME, a, b),
        }
    }
}

impl<F: Float> Kernel<F> {
    /// Primitive kernel of the given family for inputs of dimension `dim`
    pub fn primitive(family: KernelFamily, dim: usize) -> Self {
        Kernel::Primitive(PrimitiveKernel::new(family, dim))
    }

    pub fn sum(left: Kernel<F>, right: Kernel<F>) -> Self {
        Kernel::Sum(Box::new(left), Box::new(right))
    }

    pub fn product(left: Kernel<F>, right: Kernel<F>) -> Self {
        Kernel::Product(Box::new(left), Box::new(right))
    }

    /// Total number of hyperparameters, left subtree first
    pub fn n_hyperparameters(&self) -> usize {
        match self {
            Kernel::Primitive(p) => p.theta.len(),
            Kernel::Sum(a, b) | Kernel::Product(a, b) => {
                a.n_hyperparameters() + b.n_hyperparameters()
            }
        }
    }

    /// Flat hyperparameter vector, concatenated from left to right
    pub fn hyperparameters(&self) -> Array1<F> {
        let mut res = Vec::with_capacity(self.n_hyperparameters());
        self.collect(&mut res, PrimitiveKernel::theta);
        Array1::from(res)
    }

    /// Standard deviations of the hyperparameter priors, concatenated from left to right
    pub fn prior_std(&self) -> Array1<F> {
        let mut res = Vec::with_capacity(self.n_hyperparameters());
        self.collect(&mut res, PrimitiveKernel::prior_std);
        Array1::from(res)
    }

    fn collect(&self, acc: &mut Vec<F>, field: fn(&PrimitiveKernel<F>) -> &Array1<F>) {
        match self {
            Kernel::Primitive(p) => acc.extend(field(p).iter().cloned()),
            Kernel::Sum(a, b) | Kernel::Product(a, b) => {
                a.collect(acc, field);
                b.collect(acc, field);
            }
        }
    }

    /// Distributes the flat `theta` vector across the primitives of the tree
    pub fn set_hyperparameters(&mut self, theta: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<()> {
        self.check_length("hyperparameters", theta.len())?;
        self.distribute(theta.view(), &mut |p, v| p.theta.assign(&v));
        Ok(())
    }

    /// Sets normal priors `N(mean_i, std_i)` on the hyperparameters,
    /// a zero `std_i` leaves the ith hyperparameter out of [Kernel::log_prior]
    pub fn set_priors(
        &mut self,
        mean: &ArrayBase<impl Data<Elem = F>, Ix1>,
        std: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Result<()> {
        self.check_length("prior means", mean.len())?;
        self.check_length("prior standard deviations", std.len())?;
        self.distribute(mean.view(), &mut |p, v| p.prior_mean.assign(&v));
        self.distribute(std.view(), &mut |p, v| p.prior_std.assign(&v));
        Ok(())
    }

    fn check_length(&self, what: &str, len: usize) -> Result<()> {
        let expected = self.n_hyperparameters();
        if len != expected {
            return Err(GpError::DimensionMismatch(format!(
                "kernel {} expects {} {}, got {}",
                self, expected, what, len
            )));
        }
        Ok(())
    }

    fn distribute(
        &mut self,
        values: ArrayView1<F>,
        assign: &mut impl FnMut(&mut PrimitiveKernel<F>, ArrayView1<F>),
    ) {
        match self {
            Kernel::Primitive(p) => assign(p, values),
            Kernel::Sum(a, b) | Kernel::Product(a, b) => {
                let n = a.n_hyperparameters();
                a.distribute(values.slice(s![..n]), assign);
                b.distribute(values.slice(s![n..]), assign);
            }
        }
    }

    /// Sum of the log densities of the hyperparameters under their priors
    pub fn log_prior(&self) -> F {
        match self {
            Kernel::Primitive(p) => p.log_prior(),
            Kernel::Sum(a, b) | Kernel::Product(a, b) => a.log_prior() + b.log_prior(),
        }
    }

    /// Covariance `k(x1, x2)`
    pub fn value(
        &self,
        x1: &ArrayBase<impl Data<Elem = F>, Ix1>,
        x2: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> F {
        self.eval(&x1.view(), &x2.view())
    }

    fn eval(&self, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> F {
        match self {
            Kernel::Primitive(p) => p.family.value(&p.theta, x1, x2),
            Kernel::Sum(a, b) => a.eval(x1, x2) + b.eval(x1, x2),
            Kernel::Product(a, b) => a.eval(x1, x2) * b.eval(x1, x2),
        }
    }

    /// Closed form derivative of `k(x1, x2)` with respect to the logarithm of
    /// the `index`th hyperparameter
    pub fn gradient(
        &self,
        x1: &ArrayBase<impl Data<Elem = F>, Ix1>,
        x2: &ArrayBase<impl Data<Elem = F>, Ix1>,
        index: usize,
    ) -> Result<F> {
        let n = self.n_hyperparameters();
        if index >= n {
            return Err(GpError::DimensionMismatch(format!(
                "hyperparameter index {} out of range for kernel {} with {} hyperparameters",
                index, self, n
            )));
        }
        Ok(self.eval_gradient(&x1.view(), &x2.view(), index))
    }

    fn eval_gradient(&self, x1: &ArrayView1<F>, x2: &ArrayView1<F>, index: usize) -> F {
        match self {
            Kernel::Primitive(p) => p.family.gradient(&p.theta, x1, x2, index),
            Kernel::Sum(a, b) => {
                let n = a.n_hyperparameters();
                if index < n {
                    a.eval_gradient(x1, x2, index)
                } else {
                    b.eval_gradient(x1, x2, index - n)
                }
            }
            Kernel::Product(a, b) => {
                let n = a.n_hyperparameters();
                if index < n {
                    a.eval_gradient(x1, x2, index) * b.eval(x1, x2)
                } else {
                    a.eval(x1, x2) * b.eval_gradient(x1, x2, index - n)
                }
            }
        }
    }

    /// Correlation matrix over the rows of `x` with `nugget` added to the diagonal.
    /// The entry `(i, j)` with `j < i` is `k(x_i, x_j)`.
    pub fn correlation_matrix(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>, nugget: F) -> Array2<F> {
        let n = x.nrows();
        let mut k = Array2::zeros((n, n));
        for i in 0..n {
            let xi = x.row(i);
            for j in 0..i {
                let v = self.eval(&xi, &x.row(j));
                k[[i, j]] = v;
                k[[j, i]] = v;
            }
            k[[i, i]] = self.eval(&xi, &xi) + nugget;
        }
        k
    }

    /// Correlations `k(q, x_j)` between the point `q` and the rows of `x`
    pub fn cross_correlation(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
        q: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Array1<F> {
        let q = q.view();
        Array1::from_iter(x.rows().into_iter().map(|xj| self.eval(&q, &xj)))
    }

    /// Self correlation `k(q, q)`
    pub fn self_correlation(&self, q: &ArrayBase<impl Data<Elem = F>, Ix1>) -> F {
        let q = q.view();
        self.eval(&q, &q)
    }

    /// Derivative of the correlation matrix over the rows of `x` with respect
    /// to the logarithm of the `index`th hyperparameter
    pub fn derivative_correlation_matrix(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
        index: usize,
    ) -> Result<Array2<F>> {
        let n = x.nrows();
        let mut dk = Array2::zeros((n, n));
        for i in 0..n {
            for j in 0..=i {
                let v = self.gradient(&x.row(i), &x.row(j), index)?;
                dk[[i, j]] = v;
                dk[[j, i]] = v;
            }
        }
        Ok(dk)
    }
}
