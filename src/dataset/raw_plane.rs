//! Headerless single-plane output (`.raw`).
//!
//! The file holds the bytes of exactly one plane, as stored in memory.
//! Any further planes of the traversal exceed the capacity and are skipped
//! by the pipeline.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::{Compression, Destination};
use crate::axis::ImageMetadata;
use crate::error::StackError;
use crate::plane::Plane;

pub const FORMAT_NAME: &str = "raw";

pub struct RawPlaneWriter {
    path: PathBuf,
    plane_bytes: u64,
    file: Option<BufWriter<File>>,
    written: bool,
}

impl RawPlaneWriter {
    /// # Errors
    /// Returns [`StackError::UnsupportedOption`] for any compression other
    /// than `none`, and [`StackError::IoAt`] if the file cannot be created.
    pub fn create(
        path: &Path,
        meta: &ImageMetadata,
        compression: Compression,
    ) -> Result<Self, StackError> {
        if compression != Compression::None {
            return Err(StackError::UnsupportedOption(format!(
                "{} writer does not support compression '{}'",
                FORMAT_NAME, compression
            )));
        }
        let plane_bytes = meta
            .plane_size_bytes()
            .ok_or_else(|| StackError::Format("plane size overflows".into()))?;
        let file = File::create(path).map_err(|e| StackError::io_at(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            plane_bytes,
            file: Some(BufWriter::new(file)),
            written: false,
        })
    }
}

impl Destination for RawPlaneWriter {
    fn format_name(&self) -> &'static str {
        FORMAT_NAME
    }

    fn location(&self) -> &Path {
        &self.path
    }

    fn plane_capacity(&self, image_index: usize) -> u64 {
        u64::from(image_index == 0)
    }

    fn write_plane(
        &mut self,
        image_index: usize,
        sequential_no: u64,
        plane: &Plane,
    ) -> Result<(), StackError> {
        if image_index != 0 || sequential_no != 0 || self.written {
            return Err(StackError::Format(format!(
                "{} holds a single plane, got plane #{} of image #{}",
                self.path.display(),
                sequential_no,
                image_index
            )));
        }
        if plane.bytes.len() as u64 != self.plane_bytes {
            return Err(StackError::Format(format!(
                "plane holds {} bytes, expected {}",
                plane.bytes.len(),
                self.plane_bytes
            )));
        }
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| StackError::Format(format!("{} is closed", self.path.display())))?;
        file.write_all(&plane.bytes)
            .map_err(|e| StackError::io_at(&self.path, e))?;
        self.written = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), StackError> {
        match self.file.take() {
            Some(mut file) => file.flush().map_err(|e| StackError::io_at(&self.path, e)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{AxisDescriptor, AxisKind, PixelType};
    use crate::dataset::WriterOption;
    use crate::plane::PlaneBounds;

    fn meta() -> ImageMetadata {
        ImageMetadata::new(
            vec![
                AxisDescriptor::new(AxisKind::X, 2),
                AxisDescriptor::new(AxisKind::Y, 1),
            ],
            vec![AxisDescriptor::new(AxisKind::Z, 4)],
            PixelType::UInt16,
            false,
        )
    }

    fn plane(bytes: Vec<u8>) -> Plane {
        Plane {
            bytes,
            bounds: PlaneBounds {
                min: vec![0, 0],
                max: vec![1, 0],
            },
            color_table: None,
        }
    }

    #[test]
    fn stores_exactly_one_plane() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plane.raw");
        let mut writer = RawPlaneWriter::create(&path, &meta(), Compression::None).unwrap();
        assert_eq!(writer.plane_capacity(0), 1);
        assert_eq!(writer.plane_capacity(1), 0);
        assert!(!writer.supports(WriterOption::LargeFile));

        writer.write_plane(0, 0, &plane(vec![0, 1, 0, 2])).unwrap();
        assert!(writer.write_plane(0, 1, &plane(vec![0, 3, 0, 4])).is_err());
        writer.close().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![0, 1, 0, 2]);
    }

    #[test]
    fn rejects_compression() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plane.raw");
        let err = RawPlaneWriter::create(&path, &meta(), Compression::Gzip)
            .err()
            .unwrap();
        assert!(matches!(err, StackError::UnsupportedOption(_)));
        assert!(!path.exists());
    }
}
