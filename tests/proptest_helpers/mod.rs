#![allow(dead_code)]

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Up to `max_axes` axis lengths in `1..=max_len`.
pub fn arb_axis_lengths(max_axes: usize, max_len: u64) -> BoxedStrategy<Vec<u64>> {
    proptest::collection::vec(1u64..=max_len, 0..=max_axes).boxed()
}

/// Axis lengths with a valid `(offsets, lengths)` restriction inside them.
pub fn arb_restriction(
    max_axes: usize,
    max_len: u64,
) -> BoxedStrategy<(Vec<u64>, Vec<u64>, Vec<u64>)> {
    arb_axis_lengths(max_axes, max_len)
        .prop_flat_map(|full| {
            let seeds = proptest::collection::vec((any::<u64>(), any::<u64>()), full.len());
            (Just(full), seeds)
        })
        .prop_map(|(full, seeds)| {
            let mut offsets = Vec::with_capacity(full.len());
            let mut lengths = Vec::with_capacity(full.len());
            for (&len, (a, b)) in full.iter().zip(seeds) {
                let offset = a % len;
                let length = 1 + b % (len - offset);
                offsets.push(offset);
                lengths.push(length);
            }
            (full, offsets, lengths)
        })
        .boxed()
}
