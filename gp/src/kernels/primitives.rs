//! Primitive covariance functions.
//!
//! Hyperparameters are stored on their natural scale while gradients are
//! taken with respect to their logarithm, `dk/dlog(theta_i)`, which is the
//! quantity needed by hyperparameter learning in log space.
//!
//! Stationary families (Matérn, squared exponential, rational quadratic) are
//! expressed through a radial profile `k(r)` of the scaled distance `r`:
//! for the isotropic variant `r = c.|x1 - x2| / theta`, for the ARD variant
//! `r = c.|s|` with `s_i = (x1_i - x2_i) / theta_i`.
use linfa::Float;
use ndarray::{Array1, ArrayView1, Zip};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Families of primitive covariance functions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum KernelFamily {
    /// `k = theta`
    Constant,
    /// `k = x1.x2 / theta^2`
    Linear,
    /// `k = sum_i x1_i.x2_i / theta_i^2`
    LinearArd,
    MaternIso1,
    MaternIso3,
    MaternIso5,
    MaternArd1,
    MaternArd3,
    MaternArd5,
    SquaredExponentialIso,
    SquaredExponentialArd,
    /// Rational quadratic with `alpha = 1`
    RationalQuadraticIso,
    RationalQuadraticArd,
    /// `k = (1 + x1.x2 / theta^2)^p` with degree `p` in `1..=6`
    Polynomial(u8),
    /// `k = exp(-h / theta)` where `h` counts the differing components
    Hamming,
}

impl fmt::Display for KernelFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KernelFamily::Constant => write!(f, "kConst"),
            KernelFamily::Linear => write!(f, "kLinear"),
            KernelFamily::LinearArd => write!(f, "kLinearARD"),
            KernelFamily::MaternIso1 => write!(f, "kMaternISO1"),
            KernelFamily::MaternIso3 => write!(f, "kMaternISO3"),
            KernelFamily::MaternIso5 => write!(f, "kMaternISO5"),
            KernelFamily::MaternArd1 => write!(f, "kMaternARD1"),
            KernelFamily::MaternArd3 => write!(f, "kMaternARD3"),
            KernelFamily::MaternArd5 => write!(f, "kMaternARD5"),
            KernelFamily::SquaredExponentialIso => write!(f, "kSEISO"),
            KernelFamily::SquaredExponentialArd => write!(f, "kSEARD"),
            KernelFamily::RationalQuadraticIso => write!(f, "kRQISO"),
            KernelFamily::RationalQuadraticArd => write!(f, "kRQARD"),
            KernelFamily::Polynomial(p) => write!(f, "kPoly{}", p),
            KernelFamily::Hamming => write!(f, "kHamming"),
        }
    }
}

impl KernelFamily {
    /// Whether the family holds one hyperparameter per input dimension
    pub fn is_ard(&self) -> bool {
        matches!(
            self,
            KernelFamily::LinearArd
                | KernelFamily::MaternArd1
                | KernelFamily::MaternArd3
                | KernelFamily::MaternArd5
                | KernelFamily::SquaredExponentialArd
                | KernelFamily::RationalQuadraticArd
        )
    }

    /// Number of hyperparameters for inputs of dimension `dim`
    pub fn n_hyperparameters(&self, dim: usize) -> usize {
        if self.is_ard() {
            dim
        } else {
            1
        }
    }

    /// Distance scaling constant of stationary families
    fn radial_scale<F: Float>(&self) -> F {
        match self {
            KernelFamily::MaternIso3 | KernelFamily::MaternArd3 => F::cast(3.).sqrt(),
            KernelFamily::MaternIso5 | KernelFamily::MaternArd5 => F::cast(5.).sqrt(),
            _ => F::one(),
        }
    }

    /// Radial profile of stationary families: returns `k(r)` and `-r.dk/dr`
    fn radial_profile<F: Float>(&self, r: F) -> (F, F) {
        let one = F::one();
        let two = F::cast(2.);
        let three = F::cast(3.);
        match self {
            KernelFamily::MaternIso1 | KernelFamily::MaternArd1 => {
                let e = (-r).exp();
                (e, r * e)
            }
            KernelFamily::MaternIso3 | KernelFamily::MaternArd3 => {
                let e = (-r).exp();
                ((one + r) * e, r * r * e)
            }
            KernelFamily::MaternIso5 | KernelFamily::MaternArd5 => {
                let e = (-r).exp();
                (
                    (one + r + r * r / three) * e,
                    r * r * (one + r) / three * e,
                )
            }
            KernelFamily::SquaredExponentialIso | KernelFamily::SquaredExponentialArd => {
                let k = (-r * r / two).exp();
                (k, k * r * r)
            }
            KernelFamily::RationalQuadraticIso | KernelFamily::RationalQuadraticArd => {
                let k = one / (one + r * r / two);
                (k, r * r * k * k)
            }
            _ => (F::zero(), F::zero()),
        }
    }

    /// Scaled distance `r` of isotropic stationary families
    fn iso_radius<F: Float>(&self, theta: &Array1<F>, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> F {
        self.radial_scale::<F>() * squared_distance(x1, x2).sqrt() / theta[0]
    }

    /// Kernel value `k(x1, x2)`
    pub(crate) fn value<F: Float>(&self, theta: &Array1<F>, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> F {
        match self {
            KernelFamily::Constant => theta[0],
            KernelFamily::Linear => x1.dot(x2) / (theta[0] * theta[0]),
            KernelFamily::LinearArd => Zip::from(x1)
                .and(x2)
                .and(theta)
                .fold(F::zero(), |acc, &a, &b, &t| acc + a * b / (t * t)),
            KernelFamily::Polynomial(p) => {
                let u = x1.dot(x2) / (theta[0] * theta[0]);
                (F::one() + u).powi(*p as i32)
            }
            KernelFamily::Hamming => (-hamming_distance::<F>(x1, x2) / theta[0]).exp(),
            _ if self.is_ard() => {
                let rho2 = ard_scaled_differences(theta, x1, x2).mapv(|s| s * s).sum();
                self.radial_profile(self.radial_scale::<F>() * rho2.sqrt()).0
            }
            _ => self.radial_profile(self.iso_radius(theta, x1, x2)).0,
        }
    }

    /// Closed form derivative `dk(x1, x2)/dlog(theta_index)`, `index` being valid
    pub(crate) fn gradient<F: Float>(
        &self,
        theta: &Array1<F>,
        x1: &ArrayView1<F>,
        x2: &ArrayView1<F>,
        index: usize,
    ) -> F {
        let two = F::cast(2.);
        match self {
            KernelFamily::Constant => theta[0],
            KernelFamily::Linear => -two * self.value(theta, x1, x2),
            KernelFamily::LinearArd => {
                -two * x1[index] * x2[index] / (theta[index] * theta[index])
            }
            KernelFamily::Polynomial(p) => {
                let u = x1.dot(x2) / (theta[0] * theta[0]);
                -two * F::cast(*p) * u * (F::one() + u).powi(*p as i32 - 1)
            }
            KernelFamily::Hamming => {
                let h = hamming_distance::<F>(x1, x2);
                (-h / theta[0]).exp() * h / theta[0]
            }
            _ if self.is_ard() => {
                let s = ard_scaled_differences(theta, x1, x2);
                let rho2 = s.mapv(|v| v * v).sum();
                if rho2 == F::zero() {
                    return F::zero();
                }
                let (_, radial) = self.radial_profile(self.radial_scale::<F>() * rho2.sqrt());
                radial * s[index] * s[index] / rho2
            }
            _ => self.radial_profile(self.iso_radius(theta, x1, x2)).1,
        }
    }
}

fn squared_distance<F: Float>(x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> F {
    Zip::from(x1).and(x2).fold(F::zero(), |acc, &a, &b| {
        let d = a - b;
        acc + d * d
    })
}

fn ard_scaled_differences<F: Float>(theta: &Array1<F>, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> Array1<F> {
    Zip::from(x1)
        .and(x2)
        .and(theta)
        .map_collect(|&a, &b, &t| (a - b) / t)
}

fn hamming_distance<F: Float>(x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> F {
    let count = Zip::from(x1)
        .and(x2)
        .fold(0usize, |acc, a, b| if a != b { acc + 1 } else { acc });
    F::cast(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_names() {
        assert_eq!(KernelFamily::MaternArd5.to_string(), "kMaternARD5");
        assert_eq!(KernelFamily::Polynomial(4).to_string(), "kPoly4");
        assert_eq!(KernelFamily::SquaredExponentialIso.to_string(), "kSEISO");
    }

    #[test]
    fn test_hyperparameter_counts() {
        assert_eq!(KernelFamily::SquaredExponentialArd.n_hyperparameters(3), 3);
        assert_eq!(KernelFamily::MaternIso3.n_hyperparameters(3), 1);
        assert_eq!(KernelFamily::Polynomial(2).n_hyperparameters(3), 1);
        assert_eq!(KernelFamily::LinearArd.n_hyperparameters(2), 2);
    }

    #[test]
    fn test_stationary_values_at_zero_distance() {
        let x = array![0.3, 0.7];
        for family in [
            KernelFamily::MaternIso1,
            KernelFamily::MaternIso3,
            KernelFamily::MaternIso5,
            KernelFamily::SquaredExponentialIso,
            KernelFamily::RationalQuadraticIso,
        ] {
            assert_abs_diff_eq!(family.value(&array![0.5], &x.view(), &x.view()), 1.);
        }
        let theta = array![0.5, 2.];
        assert_abs_diff_eq!(
            KernelFamily::MaternArd5.value(&theta, &x.view(), &x.view()),
            1.
        );
    }

    #[test]
    fn test_known_values() {
        let x1 = array![0., 0.];
        let x2 = array![3., 4.];
        let theta = array![2.];
        let (a, b) = (x1.view(), x2.view());
        // r = 5 / 2
        assert_abs_diff_eq!(
            KernelFamily::SquaredExponentialIso.value(&theta, &a, &b),
            (-3.125f64).exp(),
            epsilon = 1e-14
        );
        assert_abs_diff_eq!(
            KernelFamily::MaternIso1.value(&theta, &a, &b),
            (-2.5f64).exp(),
            epsilon = 1e-14
        );
        assert_abs_diff_eq!(
            KernelFamily::RationalQuadraticIso.value(&theta, &a, &b),
            1. / (1. + 3.125),
            epsilon = 1e-14
        );
        let r = 3f64.sqrt() * 2.5;
        assert_abs_diff_eq!(
            KernelFamily::MaternIso3.value(&theta, &a, &b),
            (1. + r) * (-r).exp(),
            epsilon = 1e-14
        );
        assert_abs_diff_eq!(
            KernelFamily::Hamming.value(&theta, &a, &b),
            (-1f64).exp(),
            epsilon = 1e-14
        );
        let x3 = array![1., 2.];
        assert_abs_diff_eq!(
            KernelFamily::Polynomial(2).value(&theta, &x2.view(), &x3.view()),
            (1. + 11. / 4.) * (1. + 11. / 4.),
            epsilon = 1e-14
        );
        assert_abs_diff_eq!(
            KernelFamily::LinearArd.value(&array![1., 2.], &x2.view(), &x3.view()),
            3. + 2.,
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_ard_with_equal_scales_is_iso() {
        let x1 = array![0.1, 0.9, 0.4];
        let x2 = array![0.6, 0.2, 0.3];
        let pairs = [
            (KernelFamily::MaternIso1, KernelFamily::MaternArd1),
            (KernelFamily::MaternIso3, KernelFamily::MaternArd3),
            (KernelFamily::MaternIso5, KernelFamily::MaternArd5),
            (KernelFamily::SquaredExponentialIso, KernelFamily::SquaredExponentialArd),
            (KernelFamily::RationalQuadraticIso, KernelFamily::RationalQuadraticArd),
            (KernelFamily::Linear, KernelFamily::LinearArd),
        ];
        for (iso, ard) in pairs {
            let iso_value = iso.value(&array![0.7], &x1.view(), &x2.view());
            let ard_value = ard.value(&array![0.7, 0.7, 0.7], &x1.view(), &x2.view());
            assert_abs_diff_eq!(iso_value, ard_value, epsilon = 1e-12);
            let iso_grad = iso.gradient(&array![0.7], &x1.view(), &x2.view(), 0);
            let ard_grad: f64 = (0..3)
                .map(|i| ard.gradient(&array![0.7, 0.7, 0.7], &x1.view(), &x2.view(), i))
                .sum();
            assert_abs_diff_eq!(iso_grad, ard_grad, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_ard_gradient_at_zero_distance() {
        let x = array![0.3, 0.7];
        assert_eq!(
            KernelFamily::MaternArd1.gradient(&array![1., 1.], &x.view(), &x.view(), 1),
            0.
        );
    }
}
