//! Mixed-radix encoding of non-planar positions as flat indices.
//!
//! Axis 0 is the fastest-varying digit: for lengths `L` and position `p`,
//! `raster = p[0] + L[0] * (p[1] + L[1] * (p[2] + ...))`.

use crate::error::StackError;

/// Flat plane index of `position` within an index space of `lengths`.
///
/// # Errors
/// Returns [`StackError::Range`] if the vectors differ in length or a
/// coordinate lies outside its axis.
pub fn position_to_raster(lengths: &[u64], position: &[u64]) -> Result<u64, StackError> {
    if lengths.len() != position.len() {
        return Err(StackError::range(
            "<non-planar>",
            format!(
                "position has {} coordinates for {} axes",
                position.len(),
                lengths.len()
            ),
        ));
    }

    let mut raster = 0u64;
    for (i, (&len, &pos)) in lengths.iter().zip(position).enumerate().rev() {
        if pos >= len {
            return Err(StackError::range(
                format!("non-planar #{}", i),
                format!("coordinate {} outside axis length {}", pos, len),
            ));
        }
        raster = raster
            .checked_mul(len)
            .and_then(|r| r.checked_add(pos))
            .ok_or_else(|| StackError::range("<non-planar>", "raster index overflows"))?;
    }
    Ok(raster)
}
