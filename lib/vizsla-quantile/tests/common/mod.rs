use rand::rngs::SmallRng;
use rand::SeedableRng as _;
use rand_distr::{Distribution as _, Pareto};

/// Generates a set of samples that roughly correspond to the latency of a typical web service,
/// in microseconds: a big hump at the beginning with a long tail, bottoming out at 15
/// milliseconds and tailing off toward 10 seconds.
pub fn make_points(size: usize) -> Vec<i64> {
    let distribution = Pareto::new(1.0, 1.0).expect("pareto distribution should be valid");
    let seed = 0xC0FFEE;

    let mut rng = SmallRng::seed_from_u64(seed);
    distribution
        .sample_iter(&mut rng)
        // Scale by 10,000 to get microseconds.
        .map(|n: f64| (n * 10_000.0) as i64)
        .filter(|n| *n > 15_000 && *n < 10_000_000)
        .take(size)
        .collect::<Vec<_>>()
}
