use bopt_doe::{Halton, Lhs, LhsKind, Random, SamplingMethod};
use ndarray::arr2;

fn main() {
    let xlimits = arr2(&[[0., 1.], [-10., 10.], [5., 15.]]);
    let n = 10;

    println!("Take {} samples in", n);
    println!("{}\n", xlimits);

    println!("*** using random sampling");
    let samples = Random::new(&xlimits).sample(n);
    println!("{}\n", samples);

    println!("*** using halton sequence");
    let samples = Halton::new(&xlimits).sample(n);
    println!("{}\n", samples);

    println!("*** using centered latin hypercube sampling");
    let samples = Lhs::new(&xlimits).kind(LhsKind::Centered).sample(n);
    println!("{}\n", samples);

    println!("*** using maximin latin hypercube sampling");
    let samples = Lhs::new(&xlimits).kind(LhsKind::Maximin).sample(n);
    println!("{}\n", samples);
}
