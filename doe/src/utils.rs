use linfa::Float;
use ndarray::{Array1, ArrayBase, Data, Ix2};
use ndarray_stats::DeviationExt;
use rayon::prelude::*;

/// Condensed pairwise euclidean distances between the rows of `x`
/// ordered as (0,1), (0,2), ..., (1,2), ...
///
/// Distances are computed in parallel, the indexed collect keeps the order.
pub fn pdist<F: Float>(x: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>) -> Array1<F> {
    let nrows = x.nrows();
    let pairs: Vec<_> = (0..nrows)
        .flat_map(|i| ((i + 1)..nrows).map(move |j| (i, j)))
        .collect();

    let distances: Vec<F> = pairs
        .par_iter()
        .map(|&(i, j)| {
            // rows of a same matrix always share their length
            F::cast(x.row(i).l2_dist(&x.row(j)).unwrap_or(f64::NAN))
        })
        .collect();
    Array1::from_vec(distances)
}
