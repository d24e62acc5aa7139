//! Rectangular bounds over planar axes and N-d cropping of plane buffers.

use serde::Serialize;

use crate::axis::ValidRange;
use crate::error::StackError;

/// Inclusive `[min, max]` bounds per planar axis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlaneBounds {
    pub min: Vec<u64>,
    pub max: Vec<u64>,
}

impl PlaneBounds {
    /// Bounds covering `offset ..= offset + length - 1` on every axis.
    pub fn from_range(range: &ValidRange) -> Self {
        let max = range
            .offsets
            .iter()
            .zip(&range.lengths)
            .map(|(&o, &l)| o + l - 1)
            .collect();
        Self {
            min: range.offsets.clone(),
            max,
        }
    }

    /// Number of planar axes.
    pub fn dimensions(&self) -> usize {
        self.min.len()
    }

    /// Extent along each axis.
    pub fn lengths(&self) -> Vec<u64> {
        self.min
            .iter()
            .zip(&self.max)
            .map(|(&lo, &hi)| hi - lo + 1)
            .collect()
    }

    /// Number of samples inside the bounds.
    pub fn sample_count(&self) -> u64 {
        self.lengths().iter().product()
    }

    /// Whether the bounds cover `lengths` entirely.
    pub fn covers(&self, lengths: &[u64]) -> bool {
        self.dimensions() == lengths.len()
            && self.min.iter().all(|&m| m == 0)
            && self.max.iter().zip(lengths).all(|(&hi, &len)| hi + 1 == len)
    }
}

/// Copy the region `bounds` of a full plane into `out`.
///
/// `src` holds one plane of `full_lengths` samples with axis 0 varying
/// fastest. `out` is cleared first so a recycled buffer keeps its
/// allocation.
///
/// # Errors
/// Returns [`StackError::Format`] if the bounds do not fit the plane or
/// `src` has the wrong size.
pub fn crop_into(
    src: &[u8],
    full_lengths: &[u64],
    bounds: &PlaneBounds,
    bytes_per_sample: usize,
    out: &mut Vec<u8>,
) -> Result<(), StackError> {
    let dims = full_lengths.len();
    if bounds.dimensions() != dims {
        return Err(StackError::Format(format!(
            "bounds have {} axes but the plane has {}",
            bounds.dimensions(),
            dims
        )));
    }
    for d in 0..dims {
        if bounds.min[d] > bounds.max[d] || bounds.max[d] >= full_lengths[d] {
            return Err(StackError::Format(format!(
                "bounds [{}, {}] do not fit planar axis {} of length {}",
                bounds.min[d], bounds.max[d], d, full_lengths[d]
            )));
        }
    }
    let expected = full_lengths.iter().product::<u64>() * bytes_per_sample as u64;
    if src.len() as u64 != expected {
        return Err(StackError::Format(format!(
            "plane buffer holds {} bytes, expected {}",
            src.len(),
            expected
        )));
    }

    out.clear();
    if dims == 0 || bounds.covers(full_lengths) {
        out.extend_from_slice(src);
        return Ok(());
    }

    let lengths = bounds.lengths();
    let mut strides = vec![1u64; dims];
    for d in 1..dims {
        strides[d] = strides[d - 1] * full_lengths[d - 1];
    }

    let row_bytes = lengths[0] as usize * bytes_per_sample;
    let rows: u64 = lengths[1..].iter().product();
    out.reserve(row_bytes * rows as usize);

    // Coordinates relative to `bounds.min` for axes 1.. of the current row.
    let mut coord = vec![0u64; dims];
    for _ in 0..rows {
        let mut sample = bounds.min[0];
        for d in 1..dims {
            sample += (bounds.min[d] + coord[d]) * strides[d];
        }
        let start = sample as usize * bytes_per_sample;
        out.extend_from_slice(&src[start..start + row_bytes]);

        for d in 1..dims {
            coord[d] += 1;
            if coord[d] < lengths[d] {
                break;
            }
            coord[d] = 0;
        }
    }

    Ok(())
}
