//! Inner optimizers maximizing an acquisition score over the search space.
use bopt_doe::{Lhs, LhsKind, SamplingMethod};
use cobyla::{minimize, Func, RhoBeg, StopTols};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use ndarray_rand::rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;

/// Initial trust region radius of the refinement in the unit hypercube
const RHOBEG: f64 = 0.1;

/// Score function, `-inf` flags a point which cannot be proposed
pub(crate) type ScoreFn<'a> = &'a dyn Fn(&ArrayView1<f64>) -> f64;

/// Maximizes a score over the unit hypercube: a classic LHS candidate set is
/// scored then the best `n_start` candidates are refined with COBYLA.
pub(crate) struct LhsCobylaOptimizer<'a, R: Rng + Clone> {
    dim: usize,
    n_candidates: usize,
    n_start: usize,
    max_eval: usize,
    score: ScoreFn<'a>,
    rng: R,
}

impl<'a> LhsCobylaOptimizer<'a, Xoshiro256Plus> {
    pub fn new(dim: usize, score: ScoreFn<'a>) -> Self {
        LhsCobylaOptimizer {
            dim,
            n_candidates: 100 * dim,
            n_start: 5,
            max_eval: 500,
            score,
            rng: Xoshiro256Plus::from_entropy(),
        }
    }
}

impl<'a, R: Rng + Clone> LhsCobylaOptimizer<'a, R> {
    pub fn n_candidates(mut self, n_candidates: usize) -> Self {
        self.n_candidates = n_candidates;
        self
    }

    pub fn n_start(mut self, n_start: usize) -> Self {
        self.n_start = n_start;
        self
    }

    pub fn max_eval(mut self, max_eval: usize) -> Self {
        self.max_eval = max_eval;
        self
    }

    pub fn with_rng<R2: Rng + Clone>(self, rng: R2) -> LhsCobylaOptimizer<'a, R2> {
        LhsCobylaOptimizer {
            dim: self.dim,
            n_candidates: self.n_candidates,
            n_start: self.n_start,
            max_eval: self.max_eval,
            score: self.score,
            rng,
        }
    }

    fn refine(&self, x0: &ArrayView1<f64>) -> Option<(Array1<f64>, f64)> {
        let bounds = vec![(0., 1.); self.dim];
        let cons: Vec<&dyn Func<()>> = vec![];
        let objfn = |x: &[f64], _: &mut ()| -> f64 {
            let score = (self.score)(&ArrayView1::from(x));
            if score.is_finite() {
                -score
            } else {
                f64::MAX
            }
        };
        let x_opt = match minimize(
            objfn,
            &x0.to_vec(),
            &bounds,
            &cons,
            (),
            self.max_eval,
            RhoBeg::All(RHOBEG),
            Some(StopTols {
                ftol_rel: 1e-8,
                ..StopTols::default()
            }),
        ) {
            Ok((_, x_opt, _)) => x_opt,
            Err((status, x_opt, _)) => {
                log::debug!("Criterion refinement stopped: {:?}", status);
                x_opt
            }
        };
        let x_opt = Array1::from(x_opt).mapv(|v| v.clamp(0., 1.));
        let score = (self.score)(&x_opt.view());
        (score > f64::NEG_INFINITY).then_some((x_opt, score))
    }

    /// Location and value of the best score found, none when every
    /// candidate is unreachable
    pub fn maximize(&self) -> Option<(Array1<f64>, f64)> {
        let xlimits = Array2::from_shape_fn((self.dim, 2), |(_, j)| j as f64);
        let candidates = Lhs::new(&xlimits)
            .kind(LhsKind::Classic)
            .with_rng(self.rng.clone())
            .sample(self.n_candidates);
        let scores = candidates.map_axis(Axis(1), |x| (self.score)(&x));

        // stable sort keeps the candidate order on ties
        let mut order: Vec<usize> = (0..scores.len())
            .filter(|&i| scores[i] > f64::NEG_INFINITY)
            .collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
        let &first = order.first()?;

        let mut best = (candidates.row(first).to_owned(), scores[first]);
        for &i in order.iter().take(self.n_start) {
            if let Some((x, score)) = self.refine(&candidates.row(i)) {
                if score > best.1 {
                    best = (x, score);
                }
            }
        }
        Some(best)
    }
}

/// Index and value of the best score among the rows of `candidates`, the
/// first one on ties, none when every candidate is unreachable
pub(crate) fn maximize_over_set(score: ScoreFn, candidates: &Array2<f64>) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, x) in candidates.rows().into_iter().enumerate() {
        let value = score(&x);
        if value > best.map_or(f64::NEG_INFINITY, |b| b.1) {
            best = Some((i, value));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_maximize_unit_cube() {
        let score = |x: &ArrayView1<f64>| -((x[0] - 0.3).powi(2) + (x[1] - 0.8).powi(2));
        let (x, value) = LhsCobylaOptimizer::new(2, &score)
            .with_rng(Xoshiro256Plus::seed_from_u64(42))
            .maximize()
            .unwrap();
        assert_abs_diff_eq!(x, array![0.3, 0.8], epsilon = 1e-3);
        assert_abs_diff_eq!(value, 0., epsilon = 1e-5);
    }

    #[test]
    fn test_maximize_is_reproducible() {
        let score = |x: &ArrayView1<f64>| (10. * x[0]).sin() * x[0];
        let run = || {
            LhsCobylaOptimizer::new(1, &score)
                .n_candidates(20)
                .n_start(2)
                .with_rng(Xoshiro256Plus::seed_from_u64(7))
                .maximize()
                .unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_unreachable_region_is_avoided() {
        let score = |x: &ArrayView1<f64>| {
            if x[0] > 0.5 {
                f64::NEG_INFINITY
            } else {
                x[0]
            }
        };
        let (x, _) = LhsCobylaOptimizer::new(1, &score)
            .with_rng(Xoshiro256Plus::seed_from_u64(0))
            .maximize()
            .unwrap();
        assert!(x[0] <= 0.5);

        let nowhere = |_: &ArrayView1<f64>| f64::NEG_INFINITY;
        assert!(LhsCobylaOptimizer::new(1, &nowhere)
            .n_candidates(10)
            .maximize()
            .is_none());
    }

    #[test]
    fn test_maximize_over_set() {
        let candidates = array![[0.], [0.4], [0.6], [0.4]];
        let score = |x: &ArrayView1<f64>| -(x[0] - 0.45).abs();
        assert_eq!(maximize_over_set(&score, &candidates).map(|b| b.0), Some(1));

        let nowhere = |_: &ArrayView1<f64>| f64::NEG_INFINITY;
        assert_eq!(maximize_over_set(&nowhere, &candidates), None);
    }
}
