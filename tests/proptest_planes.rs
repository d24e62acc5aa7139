mod proptest_helpers;

use std::collections::HashSet;

use proptest::prelude::*;
use stackconv::axis::ValidRange;
use stackconv::plane::{position_to_raster, PlaneBounds, PlaneEnumerator};

use proptest_helpers::{arb_axis_lengths, arb_restriction, proptest_config};

/// Mixed-radix digits of `flat`, axis 0 first.
fn position_of(lengths: &[u64], flat: u64) -> Vec<u64> {
    let mut rest = flat;
    lengths
        .iter()
        .map(|&len| {
            let digit = rest % len;
            rest /= len;
            digit
        })
        .collect()
}

fn bounds() -> PlaneBounds {
    PlaneBounds {
        min: vec![0, 0],
        max: vec![3, 3],
    }
}

proptest! {
    #![proptest_config(proptest_config())]

    #[test]
    fn visits_every_selected_plane_once((full, offsets, lengths) in arb_restriction(4, 6)) {
        let planes = ValidRange { offsets: offsets.clone(), lengths: lengths.clone() };
        let tasks: Vec<_> = PlaneEnumerator::new(&full, &planes, bounds()).unwrap().collect();

        let expected: u64 = lengths.iter().product();
        prop_assert_eq!(tasks.len() as u64, expected);

        let flat: HashSet<u64> = tasks.iter().map(|t| t.flat_index).collect();
        prop_assert_eq!(flat.len(), tasks.len());

        for (i, task) in tasks.iter().enumerate() {
            prop_assert_eq!(task.sequential_no, i as u64);
            prop_assert_eq!(&task.bounds, &bounds());
            let pos = position_of(&full, task.flat_index);
            for axis in 0..full.len() {
                prop_assert!(pos[axis] >= offsets[axis]);
                prop_assert!(pos[axis] < offsets[axis] + lengths[axis]);
            }
        }
    }

    #[test]
    fn flat_indices_increase_along_storage_order((full, offsets, lengths) in arb_restriction(4, 6)) {
        let planes = ValidRange { offsets, lengths };
        let flat: Vec<u64> = PlaneEnumerator::new(&full, &planes, bounds())
            .unwrap()
            .map(|t| t.flat_index)
            .collect();
        prop_assert!(flat.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn raster_encoding_is_invertible(
        (lengths, seed) in arb_axis_lengths(5, 9).prop_flat_map(|l| (Just(l), any::<u64>()))
    ) {
        let space: u64 = lengths.iter().product();
        let raster = seed % space;
        let position = position_of(&lengths, raster);
        prop_assert_eq!(position_to_raster(&lengths, &position).unwrap(), raster);
    }
}
