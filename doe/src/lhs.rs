use crate::utils::pdist;
use crate::SamplingMethod;
use linfa::Float;
use ndarray::{s, Array, Array2, ArrayBase, Data, Ix2};
use ndarray_rand::{
    rand::seq::SliceRandom, rand::Rng, rand::SeedableRng, rand_distr::Uniform, RandomExt,
};
use rand_xoshiro::Xoshiro256Plus;

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Number of classic designs drawn to pick the maximin one
const MAXIMIN_TRIALS: usize = 5;

/// Kinds of Latin Hypercube Design
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum LhsKind {
    /// sample is chosen randomly within its latin hypercube interval
    #[default]
    Classic,
    /// sample is the middle of its latin hypercube interval
    Centered,
    /// among several classic designs, keep the one maximizing the minimal
    /// distance between points
    Maximin,
}

/// The LHS design is built as follows: each dimension is divided into `ns`
/// sections where `ns` is the number of sampling points, and one point is
/// selected in each section. The selection gives the different [LhsKind].
#[derive(Clone, Debug)]
pub struct Lhs<F: Float, R: Rng + Clone> {
    /// (nx, 2) matrix, the ith row is the [lower_bound, upper_bound] of xi
    xlimits: Array2<F>,
    kind: LhsKind,
    /// Random generator, cloned on each draw so that a design is reproducible
    rng: R,
}

impl<F: Float> Lhs<F, Xoshiro256Plus> {
    /// Constructor given a design space given a (nx, 2) matrix \[\[lower bound, upper bound\], ...\]
    ///
    /// ```
    /// use bopt_doe::Lhs;
    /// use ndarray::arr2;
    ///
    /// let doe = Lhs::new(&arr2(&[[0.0, 1.0], [5.0, 10.0]]));
    /// ```
    pub fn new(xlimits: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Self {
        Self::new_with_rng(xlimits, Xoshiro256Plus::from_entropy())
    }
}

impl<F: Float, R: Rng + Clone> Lhs<F, R> {
    /// Constructor with given design space and random generator.
    ///
    /// **Panics** if xlimits number of columns is different from 2.
    pub fn new_with_rng(xlimits: &ArrayBase<impl Data<Elem = F>, Ix2>, rng: R) -> Self {
        if xlimits.ncols() != 2 {
            panic!("xlimits must have 2 columns (lower, upper)");
        }
        Lhs {
            xlimits: xlimits.to_owned(),
            kind: LhsKind::default(),
            rng,
        }
    }

    /// Sets the kind of LHS
    pub fn kind(mut self, kind: LhsKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the random generator
    pub fn with_rng<R2: Rng + Clone>(self, rng: R2) -> Lhs<F, R2> {
        Lhs {
            xlimits: self.xlimits,
            kind: self.kind,
            rng,
        }
    }

    fn classic_lhs(&self, ns: usize, rng: &mut R) -> Array2<F> {
        let nx = self.xlimits.nrows();
        let cut = Array::linspace(0., 1., ns + 1);
        let lower = cut.slice(s![..ns]).to_owned();
        let width = &cut.slice(s![1..]) - &lower;

        let rnd = Array::random_using((ns, nx), Uniform::new(0., 1.), rng);
        let mut lhs = Array2::zeros((ns, nx));
        for j in 0..nx {
            let mut col = (&rnd.column(j) * &width + &lower).to_vec();
            col.shuffle(rng);
            lhs.column_mut(j).assign(&Array::from(col));
        }
        lhs.mapv(F::cast)
    }

    fn centered_lhs(&self, ns: usize, rng: &mut R) -> Array2<F> {
        let nx = self.xlimits.nrows();
        let mut centers: Vec<f64> = (0..ns).map(|i| (i as f64 + 0.5) / ns as f64).collect();
        let mut lhs = Array2::zeros((ns, nx));
        for j in 0..nx {
            centers.shuffle(rng);
            lhs.column_mut(j)
                .assign(&Array::from_iter(centers.iter().map(|&c| F::cast(c))));
        }
        lhs
    }

    fn maximin_lhs(&self, ns: usize, rng: &mut R) -> Array2<F> {
        let mut best = self.classic_lhs(ns, rng);
        if ns < 2 {
            return best;
        }
        let mut best_dist = min_distance(&best);
        for _ in 1..MAXIMIN_TRIALS {
            let lhs = self.classic_lhs(ns, rng);
            let d_min = min_distance(&lhs);
            if d_min > best_dist {
                best_dist = d_min;
                best = lhs;
            }
        }
        best
    }
}

fn min_distance<F: Float>(x: &Array2<F>) -> F {
    pdist(x).fold(F::infinity(), |m, &d| if d < m { d } else { m })
}

impl<F: Float, R: Rng + Clone> SamplingMethod<F> for Lhs<F, R> {
    fn sampling_space(&self) -> &Array2<F> {
        &self.xlimits
    }

    fn normalized_sample(&self, ns: usize) -> Array2<F> {
        let mut rng = self.rng.clone();
        match self.kind {
            LhsKind::Classic => self.classic_lhs(ns, &mut rng),
            LhsKind::Centered => self.centered_lhs(ns, &mut rng),
            LhsKind::Maximin => self.maximin_lhs(ns, &mut rng),
        }
    }
}
