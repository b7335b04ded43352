//! Incremental surrogate models.
//!
//! Notations: `K + noise.I = L.Lt` is the factorized correlation matrix over
//! the samples, `F` the (n, p) matrix of mean features, `a_y = L^-1.y`,
//! `A_F = L^-1.F`. At a query point `x` with features `f`, correlations `k_n`
//! to the samples and self correlation `k_q`, let `v = L^-1.k_n` and
//! `r = f - A_Ft.v`. Every variant predicts
//!
//! ```text
//! mean     = f.w + v.e                      with e = a_y - A_F.w
//! variance = s2 * (k_q - v.v + r.M^-1.r)
//! ```
//!
//! where the weights `w`, the scale `s2` and the `p x p` matrix `M` depend
//! on the [SurrogateKind]:
//!
//! | kind                    | w                                  | s2          | M                 |
//! |-------------------------|------------------------------------|-------------|-------------------|
//! | `GaussianProcess`       | mean parameters                    | sigma_s^2   | none              |
//! | `GaussianProcessMl`     | `M^-1.A_Ft.a_y`                    | `e.e/n`     | `A_Ft.A_F`        |
//! | `GaussianProcessNormal` | `M^-1.(A_Ft.a_y + D^-1.mu)`        | sigma_s^2   | `A_Ft.A_F + D^-1` |
//! | `StudentTProcessJef`    | `M^-1.A_Ft.a_y`                    | `e.e/(n-p)` | `A_Ft.A_F`        |
//! | `StudentTProcessNig`    | `M^-1.(A_Ft.a_y + D^-1.mu)`        | `b_n/a_n`   | `A_Ft.A_F + D^-1` |
//!
//! with `D = diag(mu_std^2)`, `a_n = alpha + n/2` and
//! `b_n = beta + (a_y.a_y + mu.D^-1.mu - w.M.w)/2`. Student-t variants have
//! `n - p` and `2.a_n` degrees of freedom respectively, their predicted
//! variance is the squared scale of the Student-t distribution.
use crate::cholesky::CholeskyFactor;
use crate::errors::{GpError, Result};
use crate::kernels::{Kernel, KernelFactory};
use crate::mean_models::{MeanKind, MeanModel};
use crate::optimization::{optimize_params, prepare_multistart, CobylaParams};
use crate::parameters::{
    LearningType, SurrogateKind, SurrogateParams, SurrogateValidParams, THETA_LEARNING_MAX,
    THETA_LEARNING_MIN,
};
use crate::samples::SampleSet;
use linfa::{Float, ParamGuard};
use linfa_linalg::{cholesky::*, triangular::*};
use log::{debug, info};
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};
use rayon::prelude::*;

/// Minimum number of likelihood evaluations per learning start
const LEARNING_MIN_EVAL: usize = 25;

/// Prior std of the mean weight of `mOne`
const FIXED_MEAN_PRIOR_STD: f64 = 1e-10;

/// Posterior coefficients derived from the factor and the samples
#[derive(Clone, Debug)]
struct Posterior<F: Float> {
    weights: Array1<F>,
    residual: Array1<F>,
    whitened_features: Array2<F>,
    /// Lower Cholesky factor of `M`, none when mean parameters are known
    weights_factor: Option<Array2<F>>,
    scale2: F,
    dof: Option<F>,
}

/// A gaussian or student-t process surrogate updated sample after sample.
///
/// The model is either empty (samples loaded but not factorized) or fitted.
/// Appending a sample to a fitted model with [Surrogate::update_surrogate_model]
/// costs `O(n^2)` and yields the same posterior as a full
/// [Surrogate::fit_surrogate_model] over the extended sample set.
///
/// ```
/// use bopt_gp::{Surrogate, SurrogateKind, SurrogateParams};
/// use ndarray::array;
///
/// let params = SurrogateParams::default()
///     .kind(SurrogateKind::GaussianProcessMl)
///     .kernel("kSEISO")
///     .theta(&[0.2])
///     .noise(1e-8);
/// let mut surrogate = Surrogate::new(params, 1).unwrap();
/// surrogate
///     .set_samples(&array![[0.], [0.5], [1.]], &array![0f64, 0.25, 1.])
///     .unwrap();
/// surrogate.fit_surrogate_model().unwrap();
/// surrogate.update_surrogate_model(&array![0.25], 0.0625).unwrap();
/// let (mean, variance) = surrogate.predict(&array![0.5]).unwrap();
/// assert!((mean - 0.25).abs() < 1e-4);
/// assert!(variance < 1e-4);
/// ```
#[derive(Clone, Debug)]
pub struct Surrogate<F: Float> {
    params: SurrogateValidParams<F>,
    kernel: Kernel<F>,
    mean: MeanModel<F>,
    /// Means of the mean parameters prior
    mu: Array1<F>,
    /// Standard deviations of the mean parameters prior
    mu_std: Array1<F>,
    noise: F,
    samples: SampleSet<F>,
    /// Mean features of the samples, one row per sample
    features: Array2<F>,
    factor: CholeskyFactor<F>,
    posterior: Option<Posterior<F>>,
}

/// Broadcasts a single value to `n` values, checks the length otherwise
fn broadcast<F: Float>(what: &str, values: &Array1<F>, n: usize) -> Result<Array1<F>> {
    if values.len() == n {
        Ok(values.to_owned())
    } else if values.len() == 1 {
        Ok(Array1::from_elem(n, values[0]))
    } else {
        Err(GpError::DimensionMismatch(format!(
            "expected 1 or {} {}, got {}",
            n,
            what,
            values.len()
        )))
    }
}

impl<F: Float> Surrogate<F> {
    /// Surrogate for inputs of dimension `dim`.
    ///
    /// Fails when parameters are invalid, when the kernel expression cannot be
    /// built or when hyperparameter or mean parameter counts do not match.
    pub fn new(params: SurrogateParams<F>, dim: usize) -> Result<Self> {
        Self::new_with_factory(params, dim, &KernelFactory::new())
    }

    /// Surrogate whose kernel is resolved by the given factory
    pub fn new_with_factory(
        params: SurrogateParams<F>,
        dim: usize,
        factory: &KernelFactory,
    ) -> Result<Self> {
        let params = params.check()?;
        let mut kernel = factory.create::<F>(params.kernel(), dim)?;
        let n_hyper = kernel.n_hyperparameters();
        let theta = broadcast("hyperparameters", params.theta(), n_hyper)?;
        let theta_std = broadcast("hyperparameter prior std", params.theta_std(), n_hyper)?;
        kernel.set_hyperparameters(&theta)?;
        kernel.set_priors(&theta, &theta_std)?;

        let mut mean = MeanModel::new(params.mean(), dim);
        let p = mean.n_parameters();
        let (mu, mu_std) = match mean.kind() {
            MeanKind::Zero => (Array1::zeros(0), Array1::zeros(0)),
            // mOne keeps its weight at one whatever the variant: a point mass prior
            MeanKind::One => (
                Array1::ones(p),
                Array1::from_elem(p, F::cast(FIXED_MEAN_PRIOR_STD)),
            ),
            _ => {
                let mu = broadcast("mean parameters", params.mu(), p)?;
                mean.set_parameters(&mu)?;
                (mu, broadcast("mean prior std", params.mu_std(), p)?)
            }
        };

        debug!(
            "Create {} surrogate with kernel {} and mean {} in dimension {}",
            params.kind(),
            kernel,
            mean.kind(),
            dim
        );
        Ok(Surrogate {
            noise: params.noise(),
            params,
            kernel,
            mean,
            mu,
            mu_std,
            samples: SampleSet::new(dim),
            features: Array2::zeros((0, p)),
            factor: CholeskyFactor::new(),
            posterior: None,
        })
    }

    pub fn kind(&self) -> SurrogateKind {
        self.params.kind()
    }

    pub fn params(&self) -> &SurrogateValidParams<F> {
        &self.params
    }

    /// Input dimension
    pub fn dim(&self) -> usize {
        self.samples.dim()
    }

    pub fn kernel(&self) -> &Kernel<F> {
        &self.kernel
    }

    pub fn mean_model(&self) -> &MeanModel<F> {
        &self.mean
    }

    pub fn samples(&self) -> &SampleSet<F> {
        &self.samples
    }

    /// Index of the sample with the lowest output value
    pub fn best_index(&self) -> Option<usize> {
        self.samples.argmin()
    }

    pub fn noise(&self) -> F {
        self.noise
    }

    /// Whether the model is ready to predict
    pub fn is_fitted(&self) -> bool {
        self.posterior.is_some()
    }

    /// Read-only view of the current Cholesky factor
    pub fn factor(&self) -> &CholeskyFactor<F> {
        &self.factor
    }

    /// Degrees of freedom of the Student-t posterior, none for gaussian ones
    pub fn degrees_of_freedom(&self) -> Option<F> {
        if !self.kind().is_student_t() {
            return None;
        }
        self.posterior.as_ref().and_then(|p| p.dof)
    }

    /// Loads the samples `(x_i, y_i)` given as the rows of `x` and the values `y`,
    /// replacing any previous samples. The model has to be fitted afterwards.
    pub fn set_samples(
        &mut self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
        y: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Result<()> {
        self.samples.check_dim(x.ncols())?;
        let samples = SampleSet::from_data(x, y)?;
        self.features = self.mean.features_matrix(x);
        self.samples = samples;
        self.factor = CholeskyFactor::new();
        self.posterior = None;
        Ok(())
    }

    /// Appends a sample without updating the model, which has to be fitted afterwards
    pub fn add_sample(&mut self, x: &ArrayBase<impl Data<Elem = F>, Ix1>, y: F) -> Result<()> {
        self.samples.push(x, y)?;
        self.features.push_row(self.mean.features(x).view())?;
        self.posterior = None;
        Ok(())
    }

    /// Sets the noise added to the correlation matrix diagonal, the model has
    /// to be fitted afterwards
    pub fn set_noise(&mut self, noise: F) {
        self.noise = noise;
        self.posterior = None;
    }

    /// Sets the kernel hyperparameters, the model has to be fitted afterwards
    pub fn set_hyperparameters(&mut self, theta: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<()> {
        self.kernel.set_hyperparameters(theta)?;
        self.posterior = None;
        Ok(())
    }

    /// Log density of the kernel hyperparameters under their priors
    pub fn log_prior(&self) -> F {
        self.kernel.log_prior()
    }

    /// Factorizes the correlation matrix over every sample and computes the
    /// posterior coefficients
    pub fn fit_surrogate_model(&mut self) -> Result<()> {
        self.posterior = None;
        if self.samples.is_empty() {
            return Err(GpError::InvalidValueError(
                "cannot fit a surrogate model without samples".to_string(),
            ));
        }
        let k = self.kernel.correlation_matrix(self.samples.x(), self.noise);
        let factor = CholeskyFactor::factorize(&k)?;
        let posterior = self.compute_posterior(&factor)?;
        self.factor = factor;
        self.posterior = Some(posterior);
        Ok(())
    }

    /// Appends the sample `(x, y)` to a fitted model by extending its
    /// Cholesky factor. On failure the model is left unchanged.
    pub fn update_surrogate_model(&mut self, x: &ArrayBase<impl Data<Elem = F>, Ix1>, y: F) -> Result<()> {
        if self.posterior.is_none() {
            return Err(GpError::NotFitted);
        }
        self.samples.check_dim(x.len())?;
        let cross = self.kernel.cross_correlation(self.samples.x(), x);
        let self_correlation = self.kernel.self_correlation(x) + self.noise;
        self.factor.extend(&cross, self_correlation)?;

        self.samples.push(x, y)?;
        self.features.push_row(self.mean.features(x).view())?;
        match self.compute_posterior(&self.factor) {
            Ok(posterior) => {
                self.posterior = Some(posterior);
                Ok(())
            }
            Err(err) => {
                self.posterior = None;
                Err(err)
            }
        }
    }

    fn compute_posterior(&self, factor: &CholeskyFactor<F>) -> Result<Posterior<F>> {
        let n = self.samples.len();
        let p = self.features.ncols();
        let nf = F::cast(n);
        let half = F::cast(0.5);
        let kind = self.kind();
        if kind == SurrogateKind::StudentTProcessJef && n <= p {
            return Err(GpError::InvalidValueError(format!(
                "{} needs more than {} samples, got {}",
                kind, p, n
            )));
        }

        let a_y = factor.solve_lower(self.samples.y())?;
        let a_f = factor.solve_lower_matrix(&self.features)?;
        let gram = a_f.t().dot(&a_f);
        let b = a_f.t().dot(&a_y);

        let (weights, weights_factor) = match kind {
            SurrogateKind::GaussianProcess => (self.mean.parameters().to_owned(), None),
            SurrogateKind::GaussianProcessMl | SurrogateKind::StudentTProcessJef => {
                let (w, l) = solve_spd(&gram, &b)?;
                (w, Some(l))
            }
            SurrogateKind::GaussianProcessNormal | SurrogateKind::StudentTProcessNig => {
                let d_inv = self.mu_std.mapv(|s| F::one() / (s * s));
                let mut m = gram;
                m.diag_mut().zip_mut_with(&d_inv, |v, &d| *v += d);
                let rhs = &b + &(&d_inv * &self.mu);
                let (w, l) = solve_spd(&m, &rhs)?;
                (w, Some(l))
            }
        };
        let residual = &a_y - &a_f.dot(&weights);

        let (scale2, dof) = match kind {
            SurrogateKind::GaussianProcess | SurrogateKind::GaussianProcessNormal => {
                (self.params.signal_variance(), None)
            }
            SurrogateKind::GaussianProcessMl => (residual.dot(&residual) / nf, None),
            SurrogateKind::StudentTProcessJef => {
                let dof = F::cast(n - p);
                (residual.dot(&residual) / dof, Some(dof))
            }
            SurrogateKind::StudentTProcessNig => {
                let d_inv = self.mu_std.mapv(|s| F::one() / (s * s));
                let alpha_n = self.params.alpha() + half * nf;
                // a_y.a_y + mu.D-1.mu - w.M.w written as a sum of squares, which
                // stays accurate when D-1 is huge
                let shift = &weights - &self.mu;
                let beta_n = self.params.beta()
                    + half * (residual.dot(&residual) + (&shift * &d_inv).dot(&shift));
                (beta_n / alpha_n, Some(F::cast(2.) * alpha_n))
            }
        };

        Ok(Posterior {
            weights,
            residual,
            whitened_features: a_f,
            weights_factor,
            scale2,
            dof,
        })
    }

    /// Posterior mean and variance at `x`.
    ///
    /// For Student-t variants the variance is the squared scale of the
    /// Student-t distribution, see [Surrogate::degrees_of_freedom].
    pub fn predict(&self, x: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<(F, F)> {
        let posterior = self.posterior.as_ref().ok_or(GpError::NotFitted)?;
        self.samples.check_dim(x.len())?;

        let k_n = self.kernel.cross_correlation(self.samples.x(), x);
        let v = self.factor.solve_lower(&k_n)?;
        let k_q = self.kernel.self_correlation(x);
        let f = self.mean.features(x);

        let mean = f.dot(&posterior.weights) + v.dot(&posterior.residual);
        let mut spread = k_q - v.dot(&v);
        if let Some(l) = &posterior.weights_factor {
            let r = &f - &posterior.whitened_features.t().dot(&v);
            let z = solve_lower_vector(l, &r)?;
            spread += z.dot(&z);
        }
        let variance = posterior.scale2 * spread;
        Ok((mean, if variance > F::zero() { variance } else { F::zero() }))
    }

    /// Posterior means and variances at the rows of `x`
    pub fn predict_valvar(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<(Array1<F>, Array1<F>)> {
        let mut means = Array1::zeros(x.nrows());
        let mut variances = Array1::zeros(x.nrows());
        for (i, xi) in x.axis_iter(Axis(0)).enumerate() {
            let (m, v) = self.predict(&xi)?;
            means[i] = m;
            variances[i] = v;
        }
        Ok((means, variances))
    }

    /// Negative log marginal likelihood of the fitted model.
    ///
    /// Variants estimating the signal variance use the profile likelihood
    /// `n/2.log(s2) + log|K|/2`, others the gaussian likelihood given the
    /// mean weights. Additive constants are dropped.
    pub fn negative_log_likelihood(&self) -> Result<F> {
        let posterior = self.posterior.as_ref().ok_or(GpError::NotFitted)?;
        Ok(self.neg_log_likelihood_with(&self.factor, posterior))
    }

    fn neg_log_likelihood_with(&self, factor: &CholeskyFactor<F>, posterior: &Posterior<F>) -> F {
        let half = F::cast(0.5);
        let nf = F::cast(self.samples.len());
        let log_det = factor.log_det();
        match self.kind() {
            SurrogateKind::GaussianProcess | SurrogateKind::GaussianProcessNormal => {
                let sf2 = self.params.signal_variance();
                half * posterior.residual.dot(&posterior.residual) / sf2
                    + half * log_det
                    + half * nf * sf2.ln()
            }
            _ => half * nf * posterior.scale2.ln() + half * log_det,
        }
    }

    /// Learning objective at hyperparameters `theta`, infinite when the
    /// correlation matrix cannot be factorized
    fn learning_objective(&self, theta: &Array1<F>) -> f64 {
        if theta.iter().any(|v| v.is_nan()) {
            return f64::INFINITY;
        }
        let mut kernel = self.kernel.clone();
        if kernel.set_hyperparameters(theta).is_err() {
            return f64::INFINITY;
        }
        let k = kernel.correlation_matrix(self.samples.x(), self.noise);
        let objective = CholeskyFactor::factorize(&k).and_then(|factor| {
            let posterior = self.compute_posterior(&factor)?;
            Ok(self.neg_log_likelihood_with(&factor, &posterior))
        });
        match objective {
            Ok(mut obj) => {
                if self.params.learning() == LearningType::MaximumPosterior {
                    obj -= kernel.log_prior();
                }
                obj.to_f64().filter(|v| !v.is_nan()).unwrap_or(f64::INFINITY)
            }
            Err(_) => f64::INFINITY,
        }
    }

    /// Tunes the kernel hyperparameters according to the configured
    /// [LearningType] and refits the model. Nothing is done for fixed hyperparameters.
    pub fn learn_hyperparameters(&mut self) -> Result<()> {
        if self.params.learning() == LearningType::Fixed {
            return Ok(());
        }
        if self.samples.is_empty() {
            return Err(GpError::InvalidValueError(
                "cannot learn hyperparameters without samples".to_string(),
            ));
        }
        let theta0 = self.kernel.hyperparameters();
        let n = theta0.len();
        let bounds = vec![(THETA_LEARNING_MIN.log10(), THETA_LEARNING_MAX.log10()); n];
        let starts = prepare_multistart(self.params.n_start(), &theta0, &bounds);

        let base: f64 = 10.;
        let objfn = |x: &[f64], _params: &mut ()| -> f64 {
            let theta = x.iter().map(|v| F::cast(base.powf(*v))).collect::<Array1<F>>();
            self.learning_objective(&theta)
        };
        let (fmin, xmin) = (0..starts.nrows())
            .into_par_iter()
            .map(|i| {
                optimize_params(
                    objfn,
                    &starts.row(i).to_vec(),
                    &bounds,
                    CobylaParams {
                        maxeval: (10 * n).max(LEARNING_MIN_EVAL),
                        ..CobylaParams::default()
                    },
                )
            })
            .reduce(
                || (f64::INFINITY, starts.row(0).to_owned()),
                |a, b| if b.0 < a.0 { b } else { a },
            );

        if fmin.is_finite() {
            let theta = xmin.mapv(|v| F::cast(base.powf(v)));
            info!("Learned hyperparameters theta = {} (objective = {})", theta, fmin);
            self.kernel.set_hyperparameters(&theta)?;
        } else {
            log::warn!("Hyperparameter learning failed, keep theta = {}", theta0);
        }
        self.fit_surrogate_model()
    }
}

/// Solves `M.w = rhs` for a symmetric positive definite `M`, returns `w` and
/// the lower Cholesky factor of `M`
fn solve_spd<F: Float>(m: &Array2<F>, rhs: &Array1<F>) -> Result<(Array1<F>, Array2<F>)> {
    if m.nrows() == 0 {
        return Ok((Array1::zeros(0), Array2::zeros((0, 0))));
    }
    let l = m.cholesky()?;
    let z = l.solve_triangular(&rhs.to_owned().insert_axis(Axis(1)), UPLO::Lower)?;
    let w = l.t().solve_triangular(&z, UPLO::Upper)?;
    Ok((w.column(0).to_owned(), l))
}

/// Solves `L.z = r` for a lower triangular `L`
fn solve_lower_vector<F: Float>(l: &Array2<F>, r: &Array1<F>) -> Result<Array1<F>> {
    if l.nrows() == 0 {
        return Ok(Array1::zeros(0));
    }
    let z = l.solve_triangular(&r.to_owned().insert_axis(Axis(1)), UPLO::Lower)?;
    Ok(z.column(0).to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array};
    use ndarray_rand::rand::SeedableRng;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use paste::paste;
    use rand_xoshiro::Xoshiro256Plus;

    fn branin(x: &ArrayBase<impl Data<Elem = f64>, Ix1>) -> f64 {
        // normalized inputs mapped to [-5, 10] x [0, 15]
        let (x1, x2) = (15. * x[0] - 5., 15. * x[1]);
        let pi = std::f64::consts::PI;
        let t = x2 - 5.1 / (4. * pi * pi) * x1 * x1 + 5. / pi * x1 - 6.;
        t * t + 10. * (1. - 1. / (8. * pi)) * x1.cos() + 10.
    }

    fn training_data(n: usize, seed: u64) -> (Array2<f64>, Array1<f64>) {
        let mut rng = Xoshiro256Plus::seed_from_u64(seed);
        let x = Array::random_using((n, 2), Uniform::new(0., 1.), &mut rng);
        let y: Array1<f64> = x.rows().into_iter().map(|r| branin(&r)).collect();
        (x, y / 100.)
    }

    fn params(kind: SurrogateKind) -> SurrogateParams<f64> {
        SurrogateParams::default()
            .kind(kind)
            .kernel("kMaternARD5")
            .theta(&[0.3, 0.4])
            .mean(MeanKind::Linear)
            .mu(&[1., 0., 0.])
            .mu_std(&[100.])
            .inverse_gamma(2., 3.)
            .signal_variance(50.)
            .noise(1e-6)
    }

    macro_rules! test_surrogate {
        ($kind:ident) => {
            paste! {
                #[test]
                fn [<test_ $kind:snake _incremental_update_matches_full_fit>]() {
                    let (x, y) = training_data(25, 0);
                    let mut incremental = Surrogate::new(params(SurrogateKind::$kind), 2).unwrap();
                    incremental
                        .set_samples(&x.slice(ndarray::s![..8, ..]), &y.slice(ndarray::s![..8]))
                        .unwrap();
                    incremental.fit_surrogate_model().unwrap();
                    for i in 8..25 {
                        incremental.update_surrogate_model(&x.row(i), y[i]).unwrap();
                    }

                    let mut full = Surrogate::new(params(SurrogateKind::$kind), 2).unwrap();
                    full.set_samples(&x, &y).unwrap();
                    full.fit_surrogate_model().unwrap();

                    let (xq, _) = training_data(10, 1);
                    let (m1, v1) = incremental.predict_valvar(&xq).unwrap();
                    let (m2, v2) = full.predict_valvar(&xq).unwrap();
                    assert_abs_diff_eq!(m1, m2, epsilon = 1e-8);
                    assert_abs_diff_eq!(v1, v2, epsilon = 1e-8);
                    assert_eq!(
                        incremental.degrees_of_freedom(),
                        full.degrees_of_freedom()
                    );
                }

                #[test]
                fn [<test_ $kind:snake _interpolates_samples>]() {
                    let (x, y) = training_data(20, 2);
                    let params = params(SurrogateKind::$kind).noise(1e-8);
                    let mut surrogate = Surrogate::new(params, 2).unwrap();
                    surrogate.set_samples(&x, &y).unwrap();
                    surrogate.fit_surrogate_model().unwrap();
                    let (mean, variance) = surrogate.predict(&x.row(3)).unwrap();
                    assert_abs_diff_eq!(mean, y[3], epsilon = 1e-2);
                    assert!(variance >= 0.);
                    assert!(variance < 1e-2);
                    let (_, far_variance) = surrogate.predict(&array![1.5, -0.5]).unwrap();
                    assert!(far_variance > variance);
                }
            }
        };
    }

    test_surrogate!(GaussianProcess);
    test_surrogate!(GaussianProcessMl);
    test_surrogate!(GaussianProcessNormal);
    test_surrogate!(StudentTProcessJef);
    test_surrogate!(StudentTProcessNig);

    #[test]
    fn test_gaussian_process_closed_form() {
        // single sample at 0 with zero mean: mean = k(x, 0).y, var = 1 - k(x, 0)^2
        let params = SurrogateParams::default()
            .kernel("kSEISO")
            .mean(MeanKind::Zero)
            .noise(0.);
        let mut surrogate = Surrogate::new(params, 1).unwrap();
        surrogate.set_samples(&array![[0.]], &array![2.]).unwrap();
        surrogate.fit_surrogate_model().unwrap();
        let k = (-0.5f64 * 0.25).exp();
        let (mean, variance) = surrogate.predict(&array![0.5]).unwrap();
        assert_abs_diff_eq!(mean, 2. * k, epsilon = 1e-14);
        assert_abs_diff_eq!(variance, 1. - k * k, epsilon = 1e-14);
        assert_eq!(surrogate.degrees_of_freedom(), None);
    }

    #[test]
    fn test_one_mean_weight_stays_fixed() {
        // far from the samples the prediction falls back to the mean weight
        for kind in [
            SurrogateKind::GaussianProcess,
            SurrogateKind::GaussianProcessNormal,
            SurrogateKind::StudentTProcessNig,
        ] {
            let params = SurrogateParams::default()
                .kind(kind)
                .kernel("kSEISO")
                .theta(&[0.1])
                .mean(MeanKind::One)
                .mu_std(&[1000.])
                .noise(1e-6);
            let mut surrogate = Surrogate::new(params, 1).unwrap();
            surrogate
                .set_samples(&array![[0.], [0.5], [1.]], &array![5f64, 5., 5.])
                .unwrap();
            surrogate.fit_surrogate_model().unwrap();
            let (mean, variance) = surrogate.predict(&array![5.]).unwrap();
            assert_abs_diff_eq!(mean, 1., epsilon = 1e-6);
            assert!(variance > 0. && variance.is_finite());
            assert_eq!(surrogate.mean_model().parameters(), &array![1.]);
        }
    }

    #[test]
    fn test_student_t_degrees_of_freedom() {
        let (x, y) = training_data(10, 3);
        let mut jef = Surrogate::new(params(SurrogateKind::StudentTProcessJef), 2).unwrap();
        jef.set_samples(&x, &y).unwrap();
        jef.fit_surrogate_model().unwrap();
        assert_eq!(jef.degrees_of_freedom(), Some(10. - 3.));

        let mut nig = Surrogate::new(params(SurrogateKind::StudentTProcessNig), 2).unwrap();
        nig.set_samples(&x, &y).unwrap();
        nig.fit_surrogate_model().unwrap();
        assert_eq!(nig.degrees_of_freedom(), Some(2. * (2. + 5.)));
        nig.update_surrogate_model(&array![0.5, 0.5], 1.).unwrap();
        assert_eq!(nig.degrees_of_freedom(), Some(2. * (2. + 5.5)));
    }

    #[test]
    fn test_jeffreys_needs_more_samples_than_features() {
        let mut jef = Surrogate::new(params(SurrogateKind::StudentTProcessJef), 2).unwrap();
        jef.set_samples(&array![[0., 0.], [1., 1.]], &array![0., 1.])
            .unwrap();
        assert!(matches!(
            jef.fit_surrogate_model(),
            Err(GpError::InvalidValueError(_))
        ));
    }

    #[test]
    fn test_predict_before_fit() {
        let mut surrogate = Surrogate::<f64>::new(SurrogateParams::default(), 2).unwrap();
        assert!(matches!(
            surrogate.predict(&array![0.5, 0.5]),
            Err(GpError::NotFitted)
        ));
        surrogate
            .set_samples(&array![[0., 0.], [1., 1.]], &array![0., 1.])
            .unwrap();
        assert!(!surrogate.is_fitted());
        assert!(matches!(
            surrogate.predict(&array![0.5, 0.5]),
            Err(GpError::NotFitted)
        ));
        assert!(matches!(
            surrogate.update_surrogate_model(&array![0.5, 0.5], 0.),
            Err(GpError::NotFitted)
        ));
    }

    #[test]
    fn test_dimension_mismatches() {
        let mut surrogate = Surrogate::<f64>::new(SurrogateParams::default(), 2).unwrap();
        assert!(matches!(
            surrogate.set_samples(&array![[0., 0.], [1., 1.]], &array![0., 1., 2.]),
            Err(GpError::DimensionMismatch(_))
        ));
        assert!(matches!(
            surrogate.set_samples(&array![[0.], [1.]], &array![0., 1.]),
            Err(GpError::DimensionMismatch(_))
        ));
        surrogate
            .set_samples(&array![[0., 0.], [1., 1.]], &array![0., 1.])
            .unwrap();
        surrogate.fit_surrogate_model().unwrap();
        assert!(matches!(
            surrogate.update_surrogate_model(&array![0.5], 0.),
            Err(GpError::DimensionMismatch(_))
        ));
        assert!(matches!(
            surrogate.predict(&array![0.5, 0.5, 0.5]),
            Err(GpError::DimensionMismatch(_))
        ));
        assert_eq!(surrogate.samples().len(), 2);
    }

    #[test]
    fn test_configuration_errors() {
        assert!(matches!(
            Surrogate::<f64>::new(SurrogateParams::default().kernel("kUnknown"), 2),
            Err(GpError::ParseError(_))
        ));
        assert!(matches!(
            Surrogate::<f64>::new(SurrogateParams::default().kernel("kSum(kSEISO)"), 2),
            Err(GpError::StructureError(_))
        ));
        assert!(matches!(
            Surrogate::<f64>::new(
                SurrogateParams::default().kernel("kSEARD").theta(&[1., 2.]),
                3
            ),
            Err(GpError::DimensionMismatch(_))
        ));
        let surrogate =
            Surrogate::<f64>::new(SurrogateParams::default().kernel("kSEARD"), 3).unwrap();
        assert_eq!(surrogate.kernel().hyperparameters(), array![1., 1., 1.]);
    }

    #[test]
    fn test_duplicated_sample_is_not_positive_definite() {
        let params = SurrogateParams::default().kernel("kSEISO").noise(0.);
        let mut surrogate = Surrogate::<f64>::new(params, 1).unwrap();
        surrogate
            .set_samples(&array![[0.], [1.]], &array![0., 1.])
            .unwrap();
        surrogate.fit_surrogate_model().unwrap();
        assert!(matches!(
            surrogate.update_surrogate_model(&array![1.], 1.),
            Err(GpError::NotPositiveDefinite { pivot: 2 })
        ));
        // failed update leaves the model usable
        assert_eq!(surrogate.samples().len(), 2);
        assert!(surrogate.predict(&array![0.5]).is_ok());

        surrogate.add_sample(&array![1.], 1.).unwrap();
        surrogate.set_noise(1e-6);
        surrogate.fit_surrogate_model().unwrap();
        assert_eq!(surrogate.factor().len(), 3);
    }

    #[test]
    fn test_log_prior_skips_fixed_hyperparameters() {
        let params = SurrogateParams::default()
            .kernel("kSum(kSEISO,kConst)")
            .theta(&[2., 1.])
            .theta_std(&[0.5, 0.]);
        let mut surrogate = Surrogate::<f64>::new(params, 1).unwrap();
        // at the prior mean only the normalization term remains
        let expected = -0.5 * (2. * std::f64::consts::PI).ln() - 0.5f64.ln();
        assert_abs_diff_eq!(surrogate.log_prior(), expected, epsilon = 1e-12);
        surrogate.set_hyperparameters(&array![3., 5.]).unwrap();
        assert_abs_diff_eq!(surrogate.log_prior(), expected - 2., epsilon = 1e-12);
    }

    #[test]
    fn test_learn_hyperparameters_improves_likelihood() {
        let (x, y) = training_data(20, 4);
        let params = SurrogateParams::default()
            .kind(SurrogateKind::GaussianProcessMl)
            .kernel("kSEARD")
            .theta(&[5.])
            .mean(MeanKind::Constant)
            .noise(1e-6)
            .learning(LearningType::MaximumLikelihood)
            .n_start(2);
        let mut surrogate = Surrogate::new(params, 2).unwrap();
        surrogate.set_samples(&x, &y).unwrap();
        surrogate.fit_surrogate_model().unwrap();
        let before = surrogate.negative_log_likelihood().unwrap();
        surrogate.learn_hyperparameters().unwrap();
        let after = surrogate.negative_log_likelihood().unwrap();
        assert!(after < before, "{} should be lower than {}", after, before);
        assert!(surrogate.is_fitted());
    }

    #[test]
    fn test_fixed_learning_is_a_no_op() {
        let (x, y) = training_data(6, 5);
        let mut surrogate = Surrogate::new(params(SurrogateKind::GaussianProcess), 2).unwrap();
        surrogate.set_samples(&x, &y).unwrap();
        surrogate.learn_hyperparameters().unwrap();
        assert!(!surrogate.is_fitted());
        assert_eq!(surrogate.kernel().hyperparameters(), array![0.3, 0.4]);
    }
}
