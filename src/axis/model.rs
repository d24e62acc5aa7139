//! Axis descriptors and per-image metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::pixel_type::PixelType;
use super::range::ValidRange;

/// Semantic identity of an axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    X,
    Y,
    Z,
    Channel,
    Time,
    /// Any axis the source format cannot name.
    Unknown,
}

impl AxisKind {
    pub fn name(&self) -> &'static str {
        match self {
            AxisKind::X => "X",
            AxisKind::Y => "Y",
            AxisKind::Z => "Z",
            AxisKind::Channel => "Channel",
            AxisKind::Time => "Time",
            AxisKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for AxisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One axis of a dataset image: what it is and how long it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisDescriptor {
    pub kind: AxisKind,
    pub length: u64,
}

impl AxisDescriptor {
    pub fn new(kind: AxisKind, length: u64) -> Self {
        Self { kind, length }
    }
}

/// Metadata for one image of a dataset.
///
/// `planar` and `non_planar` together hold every axis exactly once. The
/// order within each group defines both the raster encoding of plane
/// indices and the iteration order of a traversal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub planar: Vec<AxisDescriptor>,
    pub non_planar: Vec<AxisDescriptor>,
    pub pixel_type: PixelType,
    pub little_endian: bool,
    /// Samples are indices into a color table.
    #[serde(default)]
    pub indexed: bool,
}

impl ImageMetadata {
    pub fn new(
        planar: Vec<AxisDescriptor>,
        non_planar: Vec<AxisDescriptor>,
        pixel_type: PixelType,
        little_endian: bool,
    ) -> Self {
        Self {
            planar,
            non_planar,
            pixel_type,
            little_endian,
            indexed: false,
        }
    }

    /// Mark the samples as color-table indices.
    pub fn with_indexed(mut self, indexed: bool) -> Self {
        self.indexed = indexed;
        self
    }

    pub fn planar_lengths(&self) -> Vec<u64> {
        self.planar.iter().map(|a| a.length).collect()
    }

    pub fn non_planar_lengths(&self) -> Vec<u64> {
        self.non_planar.iter().map(|a| a.length).collect()
    }

    /// Number of samples in one full plane, `None` on overflow.
    pub fn samples_per_plane(&self) -> Option<u64> {
        self.planar
            .iter()
            .try_fold(1u64, |acc, a| acc.checked_mul(a.length))
    }

    /// Size of one full plane in bytes, `None` on overflow.
    pub fn plane_size_bytes(&self) -> Option<u64> {
        self.samples_per_plane()?
            .checked_mul(self.pixel_type.bytes_per_sample() as u64)
    }

    /// Number of planes in the image (empty product is 1), `None` on overflow.
    pub fn plane_count(&self) -> Option<u64> {
        self.non_planar
            .iter()
            .try_fold(1u64, |acc, a| acc.checked_mul(a.length))
    }

    /// Metadata of the region selected by a crop and a plane-range
    /// restriction: every axis length is replaced by its restricted length.
    pub fn restricted(&self, crop: &ValidRange, planes: &ValidRange) -> ImageMetadata {
        let restrict = |axes: &[AxisDescriptor], range: &ValidRange| {
            axes.iter()
                .zip(&range.lengths)
                .map(|(axis, &length)| AxisDescriptor::new(axis.kind, length))
                .collect::<Vec<_>>()
        };

        ImageMetadata {
            planar: restrict(&self.planar, crop),
            non_planar: restrict(&self.non_planar, planes),
            pixel_type: self.pixel_type,
            little_endian: self.little_endian,
            indexed: self.indexed,
        }
    }

    /// Human-readable axis summary such as `X=256 Y=256 | Z=4`.
    pub fn axes_summary(&self) -> String {
        let join = |axes: &[AxisDescriptor]| {
            axes.iter()
                .map(|a| format!("{}={}", a.kind, a.length))
                .collect::<Vec<_>>()
                .join(" ")
        };
        if self.non_planar.is_empty() {
            join(&self.planar)
        } else {
            format!("{} | {}", join(&self.planar), join(&self.non_planar))
        }
    }
}
