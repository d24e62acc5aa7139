//! Resolution of user-supplied `offset,length` lists into per-axis ranges.
//!
//! The same resolver serves the planar crop (`--crop`) and the non-planar
//! plane-range restriction (`--range`). Values are read as alternating
//! offset/length pairs in axis order; missing trailing pairs default to the
//! full extent of their axis.

use super::model::AxisDescriptor;
use crate::error::StackError;

/// Raw per-axis offsets and lengths as the user supplied them.
///
/// Values are not checked here: negative or out-of-bounds entries survive
/// resolution and are rejected by [`AxisRange::validate`], which callers run
/// before the range is used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AxisRange {
    pub offsets: Vec<i64>,
    pub lengths: Vec<i64>,
}

/// A range checked against its axes: every offset/length pair selects a
/// non-empty span inside its axis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidRange {
    pub offsets: Vec<u64>,
    pub lengths: Vec<u64>,
}

/// Split a flat `offset,length,...` list into one pair per axis.
///
/// Axis `i` takes its offset from `values[2i]` and its length from
/// `values[2i + 1]` when present, otherwise offset 0 and the full axis
/// length. Both outputs always have `axis_lengths.len()` entries; extra
/// values beyond the last axis are ignored.
pub fn resolve_range(values: &[i64], axis_lengths: &[u64]) -> AxisRange {
    let offsets = (0..axis_lengths.len())
        .map(|i| values.get(2 * i).copied().unwrap_or(0))
        .collect();
    let lengths = axis_lengths
        .iter()
        .enumerate()
        .map(|(i, &len)| {
            values
                .get(2 * i + 1)
                .copied()
                .unwrap_or_else(|| i64::try_from(len).unwrap_or(i64::MAX))
        })
        .collect();

    AxisRange { offsets, lengths }
}

impl AxisRange {
    /// Resolve `values` against the lengths of `axes`.
    pub fn for_axes(values: &[i64], axes: &[AxisDescriptor]) -> Self {
        let lengths: Vec<u64> = axes.iter().map(|a| a.length).collect();
        resolve_range(values, &lengths)
    }

    /// The whole extent of every axis.
    pub fn full(axes: &[AxisDescriptor]) -> Self {
        Self::for_axes(&[], axes)
    }

    /// Check every pair against its axis.
    ///
    /// # Errors
    /// Returns [`StackError::Range`] naming the first offending axis when an
    /// offset is negative, a length is not positive, or the span runs past
    /// the end of the axis.
    pub fn validate(&self, axes: &[AxisDescriptor]) -> Result<ValidRange, StackError> {
        if self.offsets.len() != axes.len() || self.lengths.len() != axes.len() {
            return Err(StackError::range(
                "<all>",
                format!(
                    "expected {} offset/length pairs, got {}/{}",
                    axes.len(),
                    self.offsets.len(),
                    self.lengths.len()
                ),
            ));
        }

        let mut offsets = Vec::with_capacity(axes.len());
        let mut lengths = Vec::with_capacity(axes.len());

        for ((axis, &offset), &length) in axes.iter().zip(&self.offsets).zip(&self.lengths) {
            let name = axis.kind.name();
            let offset = u64::try_from(offset)
                .map_err(|_| StackError::range(name, format!("negative offset {}", offset)))?;
            let length = u64::try_from(length)
                .map_err(|_| StackError::range(name, format!("negative length {}", length)))?;
            if length == 0 {
                return Err(StackError::range(name, "length must be at least 1"));
            }
            let end = offset.checked_add(length).ok_or_else(|| {
                StackError::range(name, format!("offset {} + length {} overflows", offset, length))
            })?;
            if end > axis.length {
                return Err(StackError::range(
                    name,
                    format!(
                        "offset {} + length {} exceeds axis length {}",
                        offset, length, axis.length
                    ),
                ));
            }
            offsets.push(offset);
            lengths.push(length);
        }

        Ok(ValidRange { offsets, lengths })
    }
}

impl ValidRange {
    /// Whether this range covers every axis entirely.
    pub fn is_full(&self, axes: &[AxisDescriptor]) -> bool {
        self.offsets.iter().all(|&o| o == 0)
            && self.lengths.iter().zip(axes).all(|(&l, a)| l == a.length)
    }
}
