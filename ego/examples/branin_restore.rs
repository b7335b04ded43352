use bopt_ego::{BoptBuilder, BoptConfig, OptimizationState, RunStatus};
use bopt_gp::{mean_models::MeanKind, SurrogateKind};
use ndarray::ArrayView1;

/// Branin function over the unit square: min f(x) = 0.397887
fn branin(x: &ArrayView1<f64>) -> f64 {
    let pi = std::f64::consts::PI;
    let (x1, x2) = (15. * x[0] - 5., 15. * x[1]);
    let t = x2 - 5.1 / (4. * pi * pi) * x1 * x1 + 5. / pi * x1 - 6.;
    t * t + 10. * (1. - 1. / (8. * pi)) * x1.cos() + 10.
}

const MAX_ITERS: usize = 190;
const CHECKPOINT_ITER: usize = 95;

fn config(config: BoptConfig) -> BoptConfig {
    config
        .n_doe(10)
        .max_iters(MAX_ITERS)
        .seed(0)
        .configure_surrogate(|p| {
            p.kind(SurrogateKind::GaussianProcessMl)
                .kernel("kMaternARD5")
                .theta(&[0.5])
                .mean(MeanKind::Constant)
                .noise(1e-6)
        })
}

fn main() {
    println!("Uninterrupted run of {} iterations", MAX_ITERS);
    let expected = BoptBuilder::optimize(branin)
        .configure(config)
        .min_within_unit_cube(2)
        .optimize()
        .expect("Branin minimized");

    println!("Run checkpointed at iteration {}", CHECKPOINT_ITER);
    let path = std::env::temp_dir().join("bopt_branin_restore.json");
    let mut first = BoptBuilder::optimize(branin)
        .configure(config)
        .min_within_unit_cube(2);
    first.initialize_optimization().expect("initial design");
    for _ in 0..CHECKPOINT_ITER {
        first.step_optimization().expect("iteration");
    }
    first
        .save_optimization()
        .and_then(|state| state.save(&path))
        .expect("checkpoint saved");

    println!("Restored run");
    let state = OptimizationState::load(&path).expect("checkpoint loaded");
    let mut second = BoptBuilder::optimize(branin)
        .configure(config)
        .min_within_unit_cube(2);
    second.restore_optimization(&state).expect("restoration");
    while second.status() == RunStatus::Running {
        second.step_optimization().expect("iteration");
    }
    let res = second.final_result().expect("result");

    println!(
        "uninterrupted: f(x) = {} at x = {}",
        expected.y_opt, expected.x_opt
    );
    println!("restored:      f(x) = {} at x = {}", res.y_opt, res.x_opt);
    let gap = (&res.x_doe - &expected.x_doe)
        .mapv(f64::abs)
        .fold(0., |acc: f64, &v| acc.max(v));
    println!("max gap between the two histories: {:e}", gap);
    assert!((res.y_opt - expected.y_opt).abs() < 1e-9);
    assert!(gap < 1e-9);
    std::fs::remove_file(&path).ok();
}
