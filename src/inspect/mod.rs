//! Display preparation for the `show` command.
//!
//! [`inspect_dataset`] walks the same traversal as a conversion but, in
//! place of a destination, runs every plane through the pixel codec:
//! decode with the source type, optionally normalize floats, map into the
//! display representation and re-encode. A [`Monitor`] observes progress
//! and may cancel between plane loads.

pub mod ascii;
pub mod report;

pub use report::{DisplayPlane, InspectReport};

use log::{info, warn};

use crate::dataset::Source;
use crate::error::StackError;
use crate::pixel::{
    decode_typed, display_pixel_type, encode, is_pixel_type_mismatch, to_display,
};
use crate::plane::{Plane, TraversalPlan};

/// Default column limit for ASCII rendering.
pub const DEFAULT_ASCII_WIDTH: usize = 72;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InspectOptions {
    /// Rescale floating-point planes into `[0, 1]`.
    pub normalize: bool,
    /// Render each plane as ASCII art.
    pub ascii: bool,
    pub ascii_width: usize,
    pub image_index: usize,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            normalize: false,
            ascii: false,
            ascii_width: DEFAULT_ASCII_WIDTH,
            image_index: 0,
        }
    }
}

/// Observer of the display loop.
pub trait Monitor {
    /// Called after each plane is loaded.
    fn progress(&mut self, done: u64, total: u64);

    /// Checked before each plane load.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// A monitor that ignores progress and never cancels.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoMonitor;

impl Monitor for NoMonitor {
    fn progress(&mut self, _done: u64, _total: u64) {}
}

/// Load every plane selected by `plan` and prepare it for display.
///
/// The source is closed before returning; a close failure is logged and
/// recorded as a warning.
///
/// # Errors
/// Returns [`StackError::PlaneRead`] if a plane cannot be read or decoded.
pub fn inspect_dataset(
    source: &mut dyn Source,
    plan: &TraversalPlan,
    opts: &InspectOptions,
    monitor: &mut dyn Monitor,
) -> Result<InspectReport, StackError> {
    let outcome = load_planes(source, plan, opts, monitor);
    let closed = source.close();
    let mut report = outcome?;
    if let Err(e) = closed {
        warn!("Failed to close {}: {}", source.location().display(), e);
        report
            .warnings
            .push(format!("closing {} failed: {}", source.location().display(), e));
    }
    Ok(report)
}

fn load_planes(
    source: &mut dyn Source,
    plan: &TraversalPlan,
    opts: &InspectOptions,
    monitor: &mut dyn Monitor,
) -> Result<InspectReport, StackError> {
    let meta = source.metadata(opts.image_index)?.clone();
    let tasks = plan.enumerator(&meta)?;
    let total = tasks.total_planes();
    let display_type = display_pixel_type(meta.pixel_type);

    let mut report = InspectReport {
        format: source.format_name().to_string(),
        location: source.location().to_path_buf(),
        image_index: opts.image_index,
        axes: meta.axes_summary(),
        pixel_type: meta.pixel_type,
        display_pixel_type: display_type,
        normalized: opts.normalize && meta.pixel_type.is_floating_point(),
        total_planes: total,
        planes: Vec::new(),
        notes: Vec::new(),
        warnings: Vec::new(),
        cancelled: false,
    };

    if is_pixel_type_mismatch(meta.pixel_type, display_type) {
        let note = format!(
            "Pixel type mismatch: display buffer is {}, source is {}",
            display_type, meta.pixel_type
        );
        info!("{}", note);
        report.notes.push(note);
    }

    let mut buffer: Option<Plane> = None;
    for task in tasks {
        if monitor.is_cancelled() {
            info!(
                "Cancelled after {} of {} plane(s)",
                report.planes.len(),
                total
            );
            report.cancelled = true;
            break;
        }

        let read_error = |e: StackError| StackError::PlaneRead {
            plane: task.flat_index,
            path: report.location.clone(),
            source: Box::new(e),
        };
        let plane = source
            .open_plane(opts.image_index, task.flat_index, &task.bounds, buffer.take())
            .map_err(read_error)?;

        if meta.indexed && !plane.has_color_table() {
            let message = format!("no LUT for plane #{}", task.sequential_no);
            warn!("{}", message);
            report.warnings.push(message);
        }

        let mut samples = decode_typed(&plane.bytes, meta.pixel_type, meta.little_endian)
            .map_err(read_error)?;
        if opts.normalize {
            samples = samples.normalize();
        }
        let display = to_display(samples);
        let values = display.to_f64_vec();
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let lengths = plane.bounds.lengths();
        let ascii = opts
            .ascii
            .then(|| ascii::render(&values, &lengths, opts.ascii_width));

        report.planes.push(DisplayPlane {
            flat_index: task.flat_index,
            sequential_no: task.sequential_no,
            lengths,
            pixel_type: display.pixel_type(),
            bytes: encode(&display, meta.little_endian),
            min: if values.is_empty() { 0.0 } else { min },
            max: if values.is_empty() { 0.0 } else { max },
            has_color_table: plane.has_color_table(),
            ascii,
        });
        monitor.progress(task.sequential_no + 1, total);
        buffer = Some(plane);
    }

    Ok(report)
}
