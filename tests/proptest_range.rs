mod proptest_helpers;

use proptest::prelude::*;
use stackconv::axis::{resolve_range, AxisDescriptor, AxisKind, AxisRange};

use proptest_helpers::{arb_axis_lengths, proptest_config};

fn axes(lengths: &[u64]) -> Vec<AxisDescriptor> {
    lengths
        .iter()
        .map(|&l| AxisDescriptor::new(AxisKind::Unknown, l))
        .collect()
}

proptest! {
    #![proptest_config(proptest_config())]

    #[test]
    fn unset_pairs_default_to_full_axis(
        (lengths, values) in arb_axis_lengths(5, 64).prop_flat_map(|lengths| {
            let n = lengths.len();
            (Just(lengths), (0..=n).prop_flat_map(|pairs| {
                proptest::collection::vec(-8i64..64, pairs * 2)
            }))
        })
    ) {
        let resolved = resolve_range(&values, &lengths);
        prop_assert_eq!(resolved.offsets.len(), lengths.len());
        prop_assert_eq!(resolved.lengths.len(), lengths.len());

        let given = values.len() / 2;
        for i in 0..lengths.len() {
            if i < given {
                prop_assert_eq!(resolved.offsets[i], values[2 * i]);
                prop_assert_eq!(resolved.lengths[i], values[2 * i + 1]);
            } else {
                prop_assert_eq!(resolved.offsets[i], 0);
                prop_assert_eq!(resolved.lengths[i], lengths[i] as i64);
            }
        }
    }

    #[test]
    fn odd_trailing_offset_keeps_full_length(
        lengths in arb_axis_lengths(4, 32).prop_filter("need an axis", |l| !l.is_empty()),
        offset in 0i64..8,
    ) {
        let resolved = resolve_range(&[offset], &lengths);
        prop_assert_eq!(resolved.offsets[0], offset);
        prop_assert_eq!(resolved.lengths[0], lengths[0] as i64);
    }

    #[test]
    fn validation_accepts_exactly_in_bounds_ranges(
        length in 1u64..64,
        offset in -4i64..70,
        len in -4i64..70,
    ) {
        let axes = axes(&[length]);
        let result = AxisRange::for_axes(&[offset, len], &axes).validate(&axes);
        let fits = offset >= 0 && len > 0 && (offset + len) as u64 <= length;
        prop_assert_eq!(result.is_ok(), fits);
        if let Ok(valid) = result {
            prop_assert_eq!(valid.offsets, vec![offset as u64]);
            prop_assert_eq!(valid.lengths, vec![len as u64]);
        }
    }
}
