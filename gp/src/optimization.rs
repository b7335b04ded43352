use bopt_doe::{Lhs, LhsKind, SamplingMethod};
use linfa::Float;
use ndarray::{arr1, s, Array1, Array2, Zip};
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

pub(crate) struct CobylaParams {
    pub rhobeg: f64,
    pub ftol_rel: f64,
    pub maxeval: usize,
}

impl Default for CobylaParams {
    fn default() -> Self {
        CobylaParams {
            rhobeg: 0.5,
            ftol_rel: 1e-4,
            maxeval: 200,
        }
    }
}

/// Starting points in log10 space: the given `theta0` first, then `n_start`
/// points of a maximin LHS over the bounds.
pub(crate) fn prepare_multistart<F: Float>(
    n_start: usize,
    theta0: &Array1<F>,
    bounds: &[(f64, f64)],
) -> Array2<f64> {
    let mut starts = Array2::zeros((n_start + 1, theta0.len()));
    Zip::from(starts.row_mut(0))
        .and(theta0)
        .and(bounds)
        .for_each(|s, &t, &(lo, up)| {
            *s = t.to_f64().map_or(0., f64::log10).clamp(lo, up);
        });
    if n_start > 0 {
        let mut xlimits = Array2::zeros((bounds.len(), 2));
        Zip::from(xlimits.rows_mut())
            .and(bounds)
            .for_each(|mut row, &(lo, up)| row.assign(&arr1(&[lo, up])));
        // fixed seed: starting points only need to be spread over the bounds
        let seeds = Lhs::new(&xlimits)
            .kind(LhsKind::Maximin)
            .with_rng(Xoshiro256Plus::seed_from_u64(42))
            .sample(n_start);
        starts.slice_mut(s![1.., ..]).assign(&seeds);
    }
    starts
}

/// Minimizes `objfn` with COBYLA from `param0` within `bounds`,
/// returns the best value and its location
pub(crate) fn optimize_params<ObjF>(
    objfn: ObjF,
    param0: &[f64],
    bounds: &[(f64, f64)],
    cobyla: CobylaParams,
) -> (f64, Array1<f64>)
where
    ObjF: Fn(&[f64], &mut ()) -> f64,
{
    use cobyla::{minimize, Func, StopTols};

    let cons: Vec<&dyn Func<()>> = vec![];
    match minimize(
        objfn,
        param0,
        bounds,
        &cons,
        (),
        cobyla.maxeval,
        cobyla::RhoBeg::All(cobyla.rhobeg),
        Some(StopTols {
            ftol_rel: cobyla.ftol_rel,
            ..StopTols::default()
        }),
    ) {
        Ok((_, x_opt, fval)) => {
            let fval = if f64::is_nan(fval) {
                f64::INFINITY
            } else {
                fval
            };
            (fval, arr1(&x_opt))
        }
        Err((status, x_opt, _)) => {
            log::warn!("Cobyla optimizer failed during hyperparameter learning: status={status:?}");
            (f64::INFINITY, arr1(&x_opt))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_prepare_multistart() {
        let starts = prepare_multistart(3, &array![1e-5, 10.], &[(-3., 3.), (-3., 3.)]);
        assert_eq!(starts.shape(), &[4, 2]);
        // first start is the clamped log10 initial guess
        assert_abs_diff_eq!(starts.row(0), array![-3., 1.], epsilon = 1e-12);
        assert!(starts.iter().all(|v| (-3. ..=3.).contains(v)));
    }

    #[test]
    fn test_optimize_params() {
        let objfn = |x: &[f64], _: &mut ()| (x[0] - 0.5).powi(2) + (x[1] + 1.).powi(2);
        let (fmin, xmin) = optimize_params(
            objfn,
            &[0., 0.],
            &[(-2., 2.), (-2., 2.)],
            CobylaParams {
                ftol_rel: 1e-10,
                ..CobylaParams::default()
            },
        );
        assert_abs_diff_eq!(fmin, 0., epsilon = 1e-6);
        assert_abs_diff_eq!(xmin, array![0.5, -1.], epsilon = 1e-3);
    }
}
