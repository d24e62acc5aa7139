#![allow(dead_code)]

use std::path::Path;

use stackconv::axis::{AxisDescriptor, AxisKind, ImageMetadata, PixelType};
use stackconv::dataset::raw_stack::write_rawstack;
use stackconv::dataset::Compression;
use stackconv::plane::ColorTable;

/// X x Y planar, Z non-planar, u8 samples.
pub fn meta_xyz(x: u64, y: u64, z: u64) -> ImageMetadata {
    ImageMetadata::new(
        vec![
            AxisDescriptor::new(AxisKind::X, x),
            AxisDescriptor::new(AxisKind::Y, y),
        ],
        vec![AxisDescriptor::new(AxisKind::Z, z)],
        PixelType::UInt8,
        true,
    )
}

/// Plane `p` holds `(p * 100 + i) mod 256` at sample `i`.
pub fn numbered_planes(meta: &ImageMetadata) -> Vec<Vec<u8>> {
    let size = meta.plane_size_bytes().expect("plane size") as usize;
    let count = meta.plane_count().expect("plane count");
    (0..count)
        .map(|p| (0..size).map(|i| ((p as usize * 100 + i) % 256) as u8).collect())
        .collect()
}

pub fn write_stack(path: &Path, meta: &ImageMetadata, compression: Compression) -> Vec<Vec<u8>> {
    let planes = numbered_planes(meta);
    write_rawstack(path, meta, &planes, compression, None).expect("write rawstack fixture");
    planes
}

pub fn write_indexed_stack(path: &Path, meta: &ImageMetadata, table: ColorTable) {
    let planes = numbered_planes(meta);
    write_rawstack(path, meta, &planes, Compression::None, Some(table))
        .expect("write indexed rawstack fixture");
}

/// Planes of a rawstack file with their source metadata.
pub fn read_stack(path: &Path) -> (ImageMetadata, Vec<Vec<u8>>) {
    use stackconv::dataset::{open_source, Source, SourceOptions};
    use stackconv::plane::TraversalPlan;

    let mut source = open_source(path, &SourceOptions::default()).expect("open rawstack");
    let meta = source.metadata(0).expect("metadata").clone();
    let plan = TraversalPlan::full(&meta).expect("full plan");
    let planes = plan
        .enumerator(&meta)
        .expect("enumerator")
        .map(|t| {
            source
                .open_plane(0, t.flat_index, &t.bounds, None)
                .expect("read plane")
                .bytes
        })
        .collect();
    source.close().expect("close");
    (meta, planes)
}
