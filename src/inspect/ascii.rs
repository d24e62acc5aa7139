//! ASCII rendering of display planes, for terminals without a viewer.

const RAMP: &[u8] = b" .:-=+*#%@";

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f64 = 0.5;

/// Render the first X/Y slice of `values` as ASCII art.
///
/// `lengths` are the plane's planar lengths, axis 0 fastest. Brightness is
/// scaled between the slice's own minimum and maximum. The output is at
/// most `max_width` columns wide.
pub fn render(values: &[f64], lengths: &[u64], max_width: usize) -> String {
    let width = lengths.first().copied().unwrap_or(1).max(1) as usize;
    let height = lengths.get(1).copied().unwrap_or(1).max(1) as usize;
    let slice = &values[..values.len().min(width * height)];
    if slice.is_empty() || max_width == 0 {
        return String::new();
    }

    let (lo, hi) = slice
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = hi - lo;

    let cols = width.min(max_width);
    let scale = width as f64 / cols as f64;
    let rows = ((height as f64 / scale) * CELL_ASPECT).round().max(1.0) as usize;
    let row_step = height as f64 / rows as f64;

    let mut out = String::with_capacity((cols + 1) * rows);
    for r in 0..rows {
        let y = ((r as f64 + 0.5) * row_step) as usize;
        for c in 0..cols {
            let x = ((c as f64 + 0.5) * scale) as usize;
            let v = slice
                .get(y.min(height - 1) * width + x.min(width - 1))
                .copied()
                .unwrap_or(0.0);
            let level = if v.is_finite() && range > 0.0 {
                (v - lo) / range
            } else {
                0.0
            };
            let idx = (level * (RAMP.len() - 1) as f64).round() as usize;
            out.push(RAMP[idx.min(RAMP.len() - 1)] as char);
        }
        out.push('\n');
    }
    out
}
