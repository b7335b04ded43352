use bopt_doe::{Lhs, SamplingMethod};
use bopt_gp::kernels::KernelFactory;
use bopt_gp::{CholeskyFactor, Surrogate, SurrogateParams};
use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::{aview1, s, Array1};
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

fn criterion_cholesky(c: &mut Criterion) {
    let dim = 4;
    let sizes = [100, 400];

    let mut group = c.benchmark_group("cholesky");
    group.sample_size(10);
    let arr1 = aview1(&[0., 1.]);
    let xlimits = arr1.broadcast((dim, 2)).unwrap();
    let kernel = KernelFactory::new()
        .create::<f64>("kMaternISO5", dim)
        .unwrap();
    for size in sizes {
        let x = Lhs::new(&xlimits)
            .with_rng(Xoshiro256Plus::seed_from_u64(42))
            .sample(size + 1);
        let k = kernel.correlation_matrix(&x, 1e-6);
        let factor = CholeskyFactor::factorize(&k.slice(s![..size, ..size])).unwrap();

        group.bench_function(format!("factorize-{size}"), |b| {
            b.iter(|| std::hint::black_box(CholeskyFactor::factorize(&k).unwrap()))
        });
        group.bench_function(format!("extend-{size}"), |b| {
            b.iter(|| {
                let mut f = factor.clone();
                f.extend(&k.slice(s![size, ..size]), k[[size, size]]).unwrap();
                std::hint::black_box(f)
            })
        });
    }
    group.finish();
}

fn criterion_surrogate(c: &mut Criterion) {
    let dim = 2;
    let size = 200;

    let mut group = c.benchmark_group("surrogate");
    group.sample_size(10);
    let xlimits = aview1(&[0., 1.]).broadcast((dim, 2)).unwrap().to_owned();
    let x = Lhs::new(&xlimits)
        .with_rng(Xoshiro256Plus::seed_from_u64(0))
        .sample(size + 1);
    let y: Array1<f64> = x
        .rows()
        .into_iter()
        .map(|r| argmin_testfunctions::rosenbrock(&r.to_vec()))
        .collect();
    let params = SurrogateParams::default().kernel("kMaternARD5").noise(1e-6);
    let mut surrogate = Surrogate::new(params, dim).unwrap();
    surrogate
        .set_samples(&x.slice(s![..size, ..]), &y.slice(s![..size]))
        .unwrap();
    surrogate.fit_surrogate_model().unwrap();

    group.bench_function(format!("fit-{}", size + 1), |b| {
        b.iter(|| {
            let mut s = surrogate.clone();
            s.add_sample(&x.row(size), y[size]).unwrap();
            s.fit_surrogate_model().unwrap();
            std::hint::black_box(s)
        })
    });
    group.bench_function(format!("update-{}", size + 1), |b| {
        b.iter(|| {
            let mut s = surrogate.clone();
            s.update_surrogate_model(&x.row(size), y[size]).unwrap();
            std::hint::black_box(s)
        })
    });
    group.finish();
}

criterion_group!(benches, criterion_cholesky, criterion_surrogate);
criterion_main!(benches);
