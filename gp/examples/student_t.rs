use bopt_gp::{mean_models::MeanKind, Surrogate, SurrogateKind, SurrogateParams};
use ndarray::{arr2, Array, Array1, Axis};

fn xsinx(x: f64) -> f64 {
    (x - 3.5) * ((x - 3.5) / std::f64::consts::PI).sin()
}

fn main() {
    let xt = arr2(&[[0.0], [5.0], [10.0], [15.0], [18.0]]);
    let yt: Array1<f64> = xt.column(0).mapv(xsinx);

    let params = SurrogateParams::default()
        .kind(SurrogateKind::StudentTProcessNig)
        .kernel("kMaternISO5")
        .theta(&[5.])
        .mean(MeanKind::Constant)
        .mu(&[0.])
        .mu_std(&[10.])
        .noise(1e-8);
    let mut surrogate = Surrogate::new(params, 1).expect("valid surrogate parameters");
    surrogate.set_samples(&xt, &yt).expect("consistent samples");
    surrogate.fit_surrogate_model().expect("surrogate fitting");

    println!("Add samples at 20 and 25 without refactorizing");
    for x in [20., 25.] {
        surrogate
            .update_surrogate_model(&ndarray::array![x], xsinx(x))
            .expect("surrogate update");
    }
    println!(
        "Student-t posterior with {} degrees of freedom",
        surrogate.degrees_of_freedom().unwrap_or(f64::INFINITY)
    );

    let xtest = Array::linspace(0., 25., 26).insert_axis(Axis(1));
    let (mean, variance) = surrogate.predict_valvar(&xtest).expect("prediction");
    println!("x, err(x), scale(x)");
    for ((x, m), v) in xtest.column(0).iter().zip(mean.iter()).zip(variance.iter()) {
        println!("{:5.1} {:+.4e} {:.4e}", x, m - xsinx(*x), v.sqrt());
    }
}
