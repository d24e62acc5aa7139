use stackconv::axis::{AxisDescriptor, AxisKind, ImageMetadata, PixelType};
use stackconv::conversion::{run_conversion, ConvertOptions};
use stackconv::dataset::memory::{MemoryDestination, MemorySource};
use stackconv::dataset::Source;
use stackconv::plane::TraversalPlan;

fn source(x: u64, y: u64, z: u64) -> MemorySource {
    let meta = ImageMetadata::new(
        vec![
            AxisDescriptor::new(AxisKind::X, x),
            AxisDescriptor::new(AxisKind::Y, y),
        ],
        vec![AxisDescriptor::new(AxisKind::Z, z)],
        PixelType::UInt8,
        true,
    );
    let planes = (0..z).map(|p| vec![p as u8; (x * y) as usize]).collect();
    MemorySource::new(meta, planes).unwrap()
}

#[test]
fn scenario_crop_every_plane_of_a_256_square_stack() {
    let mut src = source(256, 256, 4);
    let meta = src.metadata(0).unwrap().clone();
    let plan = TraversalPlan::resolve(&meta, &[0, 128, 0, 128], &[]).unwrap();

    let tasks: Vec<_> = plan.enumerator(&meta).unwrap().collect();
    assert_eq!(tasks.len(), 4);
    for (i, task) in tasks.iter().enumerate() {
        assert_eq!(task.flat_index, i as u64);
        assert_eq!(task.bounds.min, vec![0, 0]);
        assert_eq!(task.bounds.max, vec![127, 127]);
    }

    let mut dst = MemoryDestination::new(4);
    let report = run_conversion(
        &mut src,
        &mut dst,
        plan.enumerator(&meta).unwrap(),
        &ConvertOptions::default(),
        &mut |_| {},
    )
    .unwrap();
    assert_eq!(report.written_planes, 4);
    assert!(dst.planes().iter().all(|(_, b)| b.len() == 128 * 128));
    assert_eq!(dst.planes()[3].1[0], 3);
}

#[test]
fn scenario_capacity_two_of_four() {
    let mut src = source(2, 2, 4);
    let meta = src.metadata(0).unwrap().clone();
    let plan = TraversalPlan::full(&meta).unwrap();
    let mut dst = MemoryDestination::new(2);
    let mut last = None;
    let report = run_conversion(
        &mut src,
        &mut dst,
        plan.enumerator(&meta).unwrap(),
        &ConvertOptions::default(),
        &mut |p| last = Some(p),
    )
    .unwrap();

    let written: Vec<u64> = dst.planes().iter().map(|(s, _)| *s).collect();
    assert_eq!(written, vec![0, 1]);
    assert_eq!(report.total_planes, 4);
    assert_eq!(src.reads(), 2);
    let last = last.unwrap();
    assert_eq!((last.plane_no, last.total), (4, 4));
}
