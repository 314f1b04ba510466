use rand::rngs::SmallRng;
use rand::{Rng as _, SeedableRng as _};
use vizsla_quantile::Summary;

#[test]
fn text_round_trip_preserves_count_and_median() {
    let mut rng = SmallRng::seed_from_u64(0xC0FFEE);

    let mut summary = Summary::new();
    for span_id in 1..=1_000_u64 {
        summary.insert(rng.gen_range(0..1_000_000), span_id);
    }

    let payload = summary.to_json().expect("encoding should succeed");
    let decoded = Summary::from_json(&payload).expect("decoding should succeed");

    assert_eq!(decoded.n(), 1_000);

    let (original_median, _) = summary.quantile(0.5);
    let (decoded_median, _) = decoded.quantile(0.5);
    assert!(
        (original_median - decoded_median).abs() <= 1,
        "median drifted across the round trip: {} vs {}",
        original_median,
        decoded_median
    );
}
