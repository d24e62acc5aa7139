//! Source and destination collaborators.
//!
//! The traversal and conversion code only talks to the [`Source`] and
//! [`Destination`] traits. Concrete collaborators:
//!
//! - [`raw_stack`]: the `.rst` container, readable and writable;
//! - [`raw_plane`]: headerless `.raw` single-plane output;
//! - [`memory`]: in-memory datasets for library callers and tests.
//!
//! [`open_source`] and [`create_destination`] pick a collaborator from the
//! file extension.

pub mod memory;
pub mod raw_plane;
pub mod raw_stack;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::axis::ImageMetadata;
use crate::error::StackError;
use crate::plane::{Plane, PlaneBounds};

/// A readable dataset.
pub trait Source {
    /// Short name of the format, e.g. `rawstack`.
    fn format_name(&self) -> &'static str;

    /// Where the dataset lives, for messages.
    fn location(&self) -> &Path;

    /// Axis groups, pixel type and byte order of one image.
    fn metadata(&self, image_index: usize) -> Result<&ImageMetadata, StackError>;

    /// Read plane `flat_index` of an image, cropped to `bounds`.
    ///
    /// `recycle` hands back a previously returned plane whose allocation
    /// may be reused.
    fn open_plane(
        &mut self,
        image_index: usize,
        flat_index: u64,
        bounds: &PlaneBounds,
        recycle: Option<Plane>,
    ) -> Result<Plane, StackError>;

    fn close(&mut self) -> Result<(), StackError>;
}

/// Optional, format-specific writer behaviour a destination may offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriterOption {
    /// 64-bit container offsets, for outputs beyond 4 GiB (BigTIFF-style).
    LargeFile,
}

impl fmt::Display for WriterOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriterOption::LargeFile => f.write_str("large-file"),
        }
    }
}

/// A writable dataset.
pub trait Destination {
    fn format_name(&self) -> &'static str;

    fn location(&self) -> &Path;

    /// How many planes of an image this destination can store.
    fn plane_capacity(&self, image_index: usize) -> u64;

    /// Whether `option` can be enabled on this destination.
    fn supports(&self, _option: WriterOption) -> bool {
        false
    }

    fn enable(&mut self, option: WriterOption) -> Result<(), StackError> {
        Err(StackError::UnsupportedOption(format!(
            "{} writer does not support {}",
            self.format_name(),
            option
        )))
    }

    /// Store `plane` as plane `sequential_no` of an image.
    fn write_plane(
        &mut self,
        image_index: usize,
        sequential_no: u64,
        plane: &Plane,
    ) -> Result<(), StackError>;

    fn close(&mut self) -> Result<(), StackError>;
}

/// Reader toggles passed through to the source collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceOptions {
    /// Stitch files with similar names into one dataset.
    pub stitch: bool,
    /// Split planar axes beyond X/Y into separate planes.
    pub separate: bool,
    /// Expand indexed color to RGB.
    pub expand: bool,
    /// Adjust brightness/contrast before reading.
    pub autoscale: bool,
    /// Group multi-file datasets (disabled by `--nogroup`).
    pub group_files: bool,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            stitch: false,
            separate: false,
            expand: false,
            autoscale: false,
            group_files: true,
        }
    }
}

/// Payload compression of a written dataset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    None,
    Gzip,
}

impl FromStr for Compression {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "raw" | "uncompressed" => Ok(Compression::None),
            "gzip" | "gz" => Ok(Compression::Gzip),
            other => Err(StackError::UnsupportedOption(format!(
                "compression '{}' (supported: none, gzip)",
                other
            ))),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::None => f.write_str("none"),
            Compression::Gzip => f.write_str("gzip"),
        }
    }
}

/// Writer settings from the command line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriterConfig {
    /// Requested codec; `None` leaves the choice to the writer.
    pub compression: Option<Compression>,
    /// Ask for 64-bit container offsets if the writer offers them.
    pub large_file: bool,
}

/// Formats known to the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatasetFormat {
    RawStack,
    RawPlane,
}

impl DatasetFormat {
    pub fn name(&self) -> &'static str {
        match self {
            DatasetFormat::RawStack => raw_stack::FORMAT_NAME,
            DatasetFormat::RawPlane => raw_plane::FORMAT_NAME,
        }
    }

    /// Format implied by a path's extension.
    pub fn from_path(path: &Path) -> Result<Self, StackError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("rst") => Ok(DatasetFormat::RawStack),
            Some("raw") => Ok(DatasetFormat::RawPlane),
            _ => Err(StackError::UnsupportedFormat(format!(
                "'{}' (supported extensions: .rst, .raw)",
                path.display()
            ))),
        }
    }
}

/// Open the dataset at `path` for reading.
///
/// # Errors
/// Returns [`StackError::UnsupportedFormat`] for unknown or write-only
/// formats, or the reader's own error if the file cannot be opened.
pub fn open_source(path: &Path, opts: &SourceOptions) -> Result<Box<dyn Source>, StackError> {
    match DatasetFormat::from_path(path)? {
        DatasetFormat::RawStack => Ok(Box::new(raw_stack::RawStackReader::open(path, opts)?)),
        DatasetFormat::RawPlane => Err(StackError::UnsupportedFormat(format!(
            "'{}': headerless raw planes cannot be read back",
            path.display()
        ))),
    }
}

/// Create a destination at `path` able to hold an image described by
/// `meta`.
///
/// Writer options the destination does not support are logged and ignored.
pub fn create_destination(
    path: &Path,
    meta: &ImageMetadata,
    config: &WriterConfig,
) -> Result<Box<dyn Destination>, StackError> {
    let mut destination: Box<dyn Destination> = match DatasetFormat::from_path(path)? {
        DatasetFormat::RawStack => Box::new(raw_stack::RawStackWriter::create(
            path,
            meta,
            config.compression.unwrap_or_default(),
        )?),
        DatasetFormat::RawPlane => Box::new(raw_plane::RawPlaneWriter::create(
            path,
            meta,
            config.compression.unwrap_or_default(),
        )?),
    };

    if config.large_file {
        if destination.supports(WriterOption::LargeFile) {
            destination.enable(WriterOption::LargeFile)?;
        } else {
            warn!(
                "{} writer has no {} variant; option ignored",
                destination.format_name(),
                WriterOption::LargeFile
            );
        }
    }

    Ok(destination)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compression_names() {
        assert_eq!("GZIP".parse::<Compression>().unwrap(), Compression::Gzip);
        assert_eq!("raw".parse::<Compression>().unwrap(), Compression::None);
        assert!("lzw".parse::<Compression>().is_err());
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(
            DatasetFormat::from_path(Path::new("a/b.RST")).unwrap(),
            DatasetFormat::RawStack
        );
        assert_eq!(
            DatasetFormat::from_path(Path::new("plane.raw")).unwrap(),
            DatasetFormat::RawPlane
        );
        assert!(DatasetFormat::from_path(Path::new("image.tif")).is_err());
        assert!(DatasetFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn raw_planes_are_write_only() {
        let err = open_source(Path::new("x.raw"), &SourceOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, StackError::UnsupportedFormat(_)));
    }
}
