//! The conversion pipeline.
//!
//! [`run_conversion`] walks a [`PlaneEnumerator`], reading each selected
//! plane from a [`Source`] and handing it to a [`Destination`] at its
//! sequential number. Tasks past the destination's plane capacity are
//! skipped without being read. The first read or write failure ends the
//! run; source and destination are closed on every exit path.

pub mod report;

pub use report::{ConversionIssue, ConversionIssueCode, ConversionReport, ConversionSeverity};

use std::path::Path;

use log::{debug, info, warn};

use crate::dataset::{Destination, Source};
use crate::error::StackError;
use crate::plane::{Plane, PlaneEnumerator};

/// Pipeline settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Image of the source (and destination) to convert.
    pub image_index: usize,
}

/// Progress after one task, skipped or not.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    /// 1-based number of the task just handled.
    pub plane_no: u64,
    pub total: u64,
    /// Planes written so far.
    pub written: u64,
}

/// Copy the planes selected by `tasks` from `source` to `destination`.
///
/// `on_progress` is called after every task. Both collaborators are closed
/// before returning; a close failure is logged and recorded in the report
/// but never replaces an earlier error.
///
/// # Errors
/// Returns [`StackError::PlaneRead`] or [`StackError::PlaneWrite`] for the
/// first plane that fails.
pub fn run_conversion(
    source: &mut dyn Source,
    destination: &mut dyn Destination,
    tasks: PlaneEnumerator,
    opts: &ConvertOptions,
    on_progress: &mut dyn FnMut(Progress),
) -> Result<ConversionReport, StackError> {
    let mut report = ConversionReport::new(source.format_name(), destination.format_name());
    report.source = source.location().to_path_buf();
    report.destination = destination.location().to_path_buf();
    report.total_planes = tasks.total_planes();

    let outcome = copy_planes(source, destination, tasks, opts, &mut report, on_progress);

    let closed = source.close();
    close_best_effort("source", source.location(), closed, &mut report);
    let closed = destination.close();
    close_best_effort("destination", destination.location(), closed, &mut report);

    outcome?;

    if report.skipped_planes > 0 {
        let capacity = report.written_planes;
        report.add(ConversionIssue::warning(
            ConversionIssueCode::PlanesSkipped,
            format!(
                "{} plane(s) exceed the destination capacity of {} and were not written",
                report.skipped_planes, capacity
            ),
        ));
    }
    Ok(report)
}

fn copy_planes(
    source: &mut dyn Source,
    destination: &mut dyn Destination,
    tasks: PlaneEnumerator,
    opts: &ConvertOptions,
    report: &mut ConversionReport,
    on_progress: &mut dyn FnMut(Progress),
) -> Result<(), StackError> {
    let total = tasks.total_planes();
    let capacity = destination.plane_capacity(opts.image_index);
    let mut buffer: Option<Plane> = None;

    for task in tasks {
        if task.sequential_no >= capacity {
            debug!(
                "Skipping plane #{} (flat index {}): destination holds {} plane(s)",
                task.sequential_no, task.flat_index, capacity
            );
            report.skipped_planes += 1;
        } else {
            let plane = source
                .open_plane(opts.image_index, task.flat_index, &task.bounds, buffer.take())
                .map_err(|e| StackError::PlaneRead {
                    plane: task.flat_index,
                    path: source.location().to_path_buf(),
                    source: Box::new(e),
                })?;
            destination
                .write_plane(opts.image_index, task.sequential_no, &plane)
                .map_err(|e| StackError::PlaneWrite {
                    plane: task.sequential_no,
                    path: destination.location().to_path_buf(),
                    source: Box::new(e),
                })?;
            report.written_planes += 1;
            buffer = Some(plane);
        }

        let done = task.sequential_no + 1;
        info!("Processed: {}/{} planes.", done, total);
        on_progress(Progress {
            plane_no: done,
            total,
            written: report.written_planes,
        });
    }
    Ok(())
}

fn close_best_effort(
    side: &str,
    location: &Path,
    result: Result<(), StackError>,
    report: &mut ConversionReport,
) {
    if let Err(e) = result {
        warn!("Failed to close {} {}: {}", side, location.display(), e);
        report.add(ConversionIssue::warning(
            ConversionIssueCode::CloseFailed,
            format!("closing {} {} failed: {}", side, location.display(), e),
        ));
    }
}
