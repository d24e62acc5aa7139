//! Inspect report types and terminal formatting.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::axis::PixelType;

/// The result of preparing an image's planes for display.
#[derive(Clone, Debug, Serialize)]
pub struct InspectReport {
    /// Source format name.
    pub format: String,
    pub location: PathBuf,
    pub image_index: usize,
    /// Axis groups of the source, e.g. `X=64 Y=32 | Z=5`.
    pub axes: String,
    pub pixel_type: PixelType,
    /// Pixel type of the display buffers.
    pub display_pixel_type: PixelType,
    pub normalized: bool,
    /// Planes selected by the traversal.
    pub total_planes: u64,
    pub planes: Vec<DisplayPlane>,
    /// Informational notes, e.g. a display type mismatch.
    pub notes: Vec<String>,
    pub warnings: Vec<String>,
    /// The monitor cancelled before every plane was loaded.
    pub cancelled: bool,
}

/// One plane converted into a display buffer.
#[derive(Clone, Debug, Serialize)]
pub struct DisplayPlane {
    pub flat_index: u64,
    pub sequential_no: u64,
    /// Lengths of the cropped planar axes.
    pub lengths: Vec<u64>,
    pub pixel_type: PixelType,
    /// Encoded display samples.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub min: f64,
    pub max: f64,
    pub has_color_table: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ascii: Option<String>,
}

impl InspectReport {
    pub fn loaded_planes(&self) -> usize {
        self.planes.len()
    }
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Image #{}:", self.image_index)?;
        writeln!(f, "  Format:     {} ({})", self.format, self.location.display())?;
        writeln!(f, "  Axes:       {}", self.axes)?;
        writeln!(
            f,
            "  Pixel type: {} (displayed as {}{})",
            self.pixel_type,
            self.display_pixel_type,
            if self.normalized { ", normalized" } else { "" }
        )?;
        writeln!(
            f,
            "  Planes:     {} of {} loaded{}",
            self.planes.len(),
            self.total_planes,
            if self.cancelled { " (cancelled)" } else { "" }
        )?;

        for plane in &self.planes {
            writeln!(f)?;
            let dims: Vec<String> = plane.lengths.iter().map(|l| l.to_string()).collect();
            writeln!(
                f,
                "  Plane #{} (flat index {}): {}  min {}  max {}{}",
                plane.sequential_no,
                plane.flat_index,
                dims.join("x"),
                plane.min,
                plane.max,
                if plane.has_color_table { "  [LUT]" } else { "" }
            )?;
            if let Some(art) = &plane.ascii {
                for line in art.lines() {
                    writeln!(f, "    {}", line)?;
                }
            }
        }

        if !self.warnings.is_empty() {
            writeln!(f)?;
            writeln!(f, "Warnings ({}):", self.warnings.len())?;
            for w in &self.warnings {
                writeln!(f, "  - {}", w)?;
            }
        }
        if !self.notes.is_empty() {
            writeln!(f)?;
            writeln!(f, "Notes ({}):", self.notes.len())?;
            for n in &self.notes {
                writeln!(f, "  - {}", n)?;
            }
        }
        Ok(())
    }
}
