use vizsla_common::collections::FastHashSet;
use vizsla_quantile::Summary;

#[test]
fn slices_carry_every_witnessing_span() {
    let observations = [(1, 11), (1, 12), (1, 13), (2, 21), (2, 22), (3, 31)];

    let mut summary = Summary::new();
    for (v, span_id) in observations {
        summary.insert(v, span_id);
    }

    let slices = summary.by_slices();
    assert!(!slices.is_empty());

    // The first slice starts at the zero-valued sentinel, and slices come out ascending.
    assert_eq!(slices[0].start, 0);
    for window in slices.windows(2) {
        assert!(window[0].end <= window[1].end);
    }

    let seen = slices
        .iter()
        .flat_map(|slice| slice.samples.iter().copied())
        .collect::<FastHashSet<_>>();
    let expected = observations.iter().map(|(_, span_id)| *span_id).collect::<FastHashSet<_>>();
    assert_eq!(seen, expected);
}
