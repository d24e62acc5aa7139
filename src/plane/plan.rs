//! Turning `--crop` / `--range` values into a validated traversal.

use super::bounds::PlaneBounds;
use super::enumerator::PlaneEnumerator;
use crate::axis::{AxisRange, ImageMetadata, ValidRange};
use crate::error::StackError;

/// Validated crop and plane-range restriction for one image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraversalPlan {
    /// Offsets/lengths over the planar axes.
    pub crop: ValidRange,
    /// Offsets/lengths over the non-planar axes.
    pub planes: ValidRange,
}

impl TraversalPlan {
    /// Resolve flat `offset,length` lists against `meta` and validate them.
    ///
    /// # Errors
    /// Returns [`StackError::Range`] for negative, empty or out-of-bounds
    /// ranges.
    pub fn resolve(
        meta: &ImageMetadata,
        crop_values: &[i64],
        range_values: &[i64],
    ) -> Result<Self, StackError> {
        let crop = AxisRange::for_axes(crop_values, &meta.planar).validate(&meta.planar)?;
        let planes =
            AxisRange::for_axes(range_values, &meta.non_planar).validate(&meta.non_planar)?;
        Ok(Self { crop, planes })
    }

    /// Every plane, uncropped.
    pub fn full(meta: &ImageMetadata) -> Result<Self, StackError> {
        Self::resolve(meta, &[], &[])
    }

    pub fn bounds(&self) -> PlaneBounds {
        PlaneBounds::from_range(&self.crop)
    }

    /// Number of planes the traversal visits.
    pub fn total_planes(&self) -> u64 {
        self.planes.lengths.iter().product()
    }

    /// Fresh enumerator over the selected planes of `meta`.
    pub fn enumerator(&self, meta: &ImageMetadata) -> Result<PlaneEnumerator, StackError> {
        PlaneEnumerator::for_image(meta, &self.crop, &self.planes)
    }

    /// Metadata describing exactly the selected region, used to create a
    /// destination.
    pub fn destination_metadata(&self, meta: &ImageMetadata) -> ImageMetadata {
        meta.restricted(&self.crop, &self.planes)
    }

    pub fn is_cropped(&self, meta: &ImageMetadata) -> bool {
        !self.crop.is_full(&meta.planar)
    }

    pub fn is_restricted(&self, meta: &ImageMetadata) -> bool {
        !self.planes.is_full(&meta.non_planar)
    }
}
