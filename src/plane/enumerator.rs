//! Ordered enumeration of the planes selected by a plane-range restriction.

use serde::Serialize;

use super::bounds::PlaneBounds;
use super::raster::position_to_raster;
use crate::axis::{ImageMetadata, ValidRange};
use crate::error::StackError;

/// One plane to visit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlaneTask {
    /// Address of the plane in the source's storage order.
    pub flat_index: u64,
    /// 0-based position in the destination's write order.
    pub sequential_no: u64,
    /// Crop over the planar axes.
    pub bounds: PlaneBounds,
}

/// Read-once iterator over the planes of a restricted non-planar space.
///
/// The first non-planar axis increments first. When a coordinate passes
/// `offset + length - 1` it resets to its offset and carries into the next
/// axis; the sequence ends when the last axis carries over. With no
/// non-planar axes there is exactly one task, at flat index 0.
#[derive(Clone, Debug)]
pub struct PlaneEnumerator {
    full_lengths: Vec<u64>,
    offsets: Vec<u64>,
    lengths: Vec<u64>,
    bounds: PlaneBounds,
    position: Vec<u64>,
    next_sequential: u64,
    total: u64,
    exhausted: bool,
}

impl PlaneEnumerator {
    /// Create an enumerator over `planes` within `full_lengths`.
    ///
    /// # Errors
    /// Returns [`StackError::Range`] if the restriction does not match the
    /// axis count, leaves its axis, or the plane count overflows.
    pub fn new(
        full_lengths: &[u64],
        planes: &ValidRange,
        bounds: PlaneBounds,
    ) -> Result<Self, StackError> {
        if planes.offsets.len() != full_lengths.len() || planes.lengths.len() != full_lengths.len()
        {
            return Err(StackError::range(
                "<non-planar>",
                format!(
                    "restriction covers {} axes, image has {}",
                    planes.offsets.len(),
                    full_lengths.len()
                ),
            ));
        }
        for (i, ((&offset, &length), &full)) in planes
            .offsets
            .iter()
            .zip(&planes.lengths)
            .zip(full_lengths)
            .enumerate()
        {
            if length == 0 || offset.checked_add(length).map_or(true, |end| end > full) {
                return Err(StackError::range(
                    format!("non-planar #{}", i),
                    format!(
                        "offset {} + length {} does not fit axis length {}",
                        offset, length, full
                    ),
                ));
            }
        }

        let total = planes
            .lengths
            .iter()
            .try_fold(1u64, |acc, &l| acc.checked_mul(l))
            .ok_or_else(|| StackError::range("<non-planar>", "plane count overflows"))?;
        // The largest flat index must be representable as well.
        full_lengths
            .iter()
            .try_fold(1u64, |acc, &l| acc.checked_mul(l))
            .ok_or_else(|| StackError::range("<non-planar>", "raster index space overflows"))?;

        Ok(Self {
            full_lengths: full_lengths.to_vec(),
            offsets: planes.offsets.clone(),
            lengths: planes.lengths.clone(),
            bounds,
            position: planes.offsets.clone(),
            next_sequential: 0,
            total,
            exhausted: false,
        })
    }

    /// Enumerator for an image given a validated crop and plane range.
    pub fn for_image(
        meta: &ImageMetadata,
        crop: &ValidRange,
        planes: &ValidRange,
    ) -> Result<Self, StackError> {
        Self::new(
            &meta.non_planar_lengths(),
            planes,
            PlaneBounds::from_range(crop),
        )
    }

    /// Number of planes the full sequence visits.
    pub fn total_planes(&self) -> u64 {
        self.total
    }

    /// Position of the next task over the non-planar axes.
    pub fn position(&self) -> &[u64] {
        &self.position
    }

    /// Crop bounds shared by every task.
    pub fn bounds(&self) -> &PlaneBounds {
        &self.bounds
    }

    fn advance(&mut self) {
        for i in 0..self.position.len() {
            self.position[i] += 1;
            if self.position[i] < self.offsets[i] + self.lengths[i] {
                return;
            }
            self.position[i] = self.offsets[i];
        }
        self.exhausted = true;
    }
}

impl Iterator for PlaneEnumerator {
    type Item = PlaneTask;

    fn next(&mut self) -> Option<PlaneTask> {
        if self.exhausted {
            return None;
        }
        // The position always lies inside the validated restriction.
        let flat_index = position_to_raster(&self.full_lengths, &self.position).ok()?;
        let task = PlaneTask {
            flat_index,
            sequential_no: self.next_sequential,
            bounds: self.bounds.clone(),
        };
        self.next_sequential += 1;
        self.advance();
        Some(task)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.exhausted {
            return (0, Some(0));
        }
        let remaining = usize::try_from(self.total - self.next_sequential).ok();
        (remaining.unwrap_or(usize::MAX), remaining)
    }
}
