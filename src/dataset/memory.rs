//! In-memory datasets.

use std::path::{Path, PathBuf};

use super::{Destination, Source};
use crate::axis::ImageMetadata;
use crate::error::StackError;
use crate::plane::{crop_into, ColorTable, Plane, PlaneBounds};

/// A single-image source holding every full plane in memory.
#[derive(Clone, Debug)]
pub struct MemorySource {
    location: PathBuf,
    meta: ImageMetadata,
    planes: Vec<Vec<u8>>,
    color_table: Option<ColorTable>,
    reads: usize,
    closed: bool,
    fail_at: Option<u64>,
    fail_close: bool,
}

impl MemorySource {
    /// Build a source from full planes in flat-index order.
    ///
    /// # Errors
    /// Returns [`StackError::Format`] if the plane count or a plane size
    /// does not match `meta`.
    pub fn new(meta: ImageMetadata, planes: Vec<Vec<u8>>) -> Result<Self, StackError> {
        let count = meta
            .plane_count()
            .ok_or_else(|| StackError::Format("plane count overflows".into()))?;
        let size = meta
            .plane_size_bytes()
            .ok_or_else(|| StackError::Format("plane size overflows".into()))?;
        if planes.len() as u64 != count {
            return Err(StackError::Format(format!(
                "{} plane(s) supplied, metadata describes {}",
                planes.len(),
                count
            )));
        }
        if let Some((i, p)) = planes
            .iter()
            .enumerate()
            .find(|(_, p)| p.len() as u64 != size)
        {
            return Err(StackError::Format(format!(
                "plane #{} holds {} bytes, expected {}",
                i,
                p.len(),
                size
            )));
        }

        Ok(Self {
            location: PathBuf::from("<memory>"),
            meta,
            planes,
            color_table: None,
            reads: 0,
            closed: false,
            fail_at: None,
            fail_close: false,
        })
    }

    /// Attach a color table to every returned plane.
    pub fn with_color_table(mut self, table: ColorTable) -> Self {
        self.color_table = Some(table);
        self
    }

    /// Fail when plane `flat_index` is requested.
    pub fn fail_at(mut self, flat_index: u64) -> Self {
        self.fail_at = Some(flat_index);
        self
    }

    /// Fail when closed.
    pub fn fail_on_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Number of `open_plane` calls so far.
    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Source for MemorySource {
    fn format_name(&self) -> &'static str {
        "memory"
    }

    fn location(&self) -> &Path {
        &self.location
    }

    fn metadata(&self, image_index: usize) -> Result<&ImageMetadata, StackError> {
        match image_index {
            0 => Ok(&self.meta),
            other => Err(StackError::Format(format!("no image #{}", other))),
        }
    }

    fn open_plane(
        &mut self,
        image_index: usize,
        flat_index: u64,
        bounds: &PlaneBounds,
        recycle: Option<Plane>,
    ) -> Result<Plane, StackError> {
        self.reads += 1;
        let meta = self.metadata(image_index)?;
        if self.fail_at == Some(flat_index) {
            return Err(StackError::Format(format!(
                "simulated decode failure at plane #{}",
                flat_index
            )));
        }
        let full = self
            .planes
            .get(flat_index as usize)
            .ok_or_else(|| StackError::Format(format!("no plane #{}", flat_index)))?;

        let mut plane = Plane::recycle(recycle, bounds);
        crop_into(
            full,
            &meta.planar_lengths(),
            bounds,
            meta.pixel_type.bytes_per_sample(),
            &mut plane.bytes,
        )?;
        plane.color_table = self.color_table.clone();
        Ok(plane)
    }

    fn close(&mut self) -> Result<(), StackError> {
        self.closed = true;
        if self.fail_close {
            return Err(StackError::Format("simulated close failure".into()));
        }
        Ok(())
    }
}

/// A destination recording every written plane.
#[derive(Clone, Debug, Default)]
pub struct MemoryDestination {
    location: PathBuf,
    capacity: u64,
    planes: Vec<(u64, Vec<u8>)>,
    closed: bool,
    large_file: bool,
    fail_at: Option<u64>,
    fail_close: bool,
}

impl MemoryDestination {
    pub fn new(capacity: u64) -> Self {
        Self {
            location: PathBuf::from("<memory>"),
            capacity,
            ..Default::default()
        }
    }

    /// Fail when plane `sequential_no` is written.
    pub fn fail_at(mut self, sequential_no: u64) -> Self {
        self.fail_at = Some(sequential_no);
        self
    }

    /// Fail when closed.
    pub fn fail_on_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Written `(sequential_no, bytes)` pairs in write order.
    pub fn planes(&self) -> &[(u64, Vec<u8>)] {
        &self.planes
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn large_file(&self) -> bool {
        self.large_file
    }
}

impl Destination for MemoryDestination {
    fn format_name(&self) -> &'static str {
        "memory"
    }

    fn location(&self) -> &Path {
        &self.location
    }

    fn plane_capacity(&self, _image_index: usize) -> u64 {
        self.capacity
    }

    fn supports(&self, option: super::WriterOption) -> bool {
        matches!(option, super::WriterOption::LargeFile)
    }

    fn enable(&mut self, option: super::WriterOption) -> Result<(), StackError> {
        match option {
            super::WriterOption::LargeFile => self.large_file = true,
        }
        Ok(())
    }

    fn write_plane(
        &mut self,
        _image_index: usize,
        sequential_no: u64,
        plane: &Plane,
    ) -> Result<(), StackError> {
        if self.fail_at == Some(sequential_no) {
            return Err(StackError::Format(format!(
                "simulated write failure at plane #{}",
                sequential_no
            )));
        }
        self.planes.push((sequential_no, plane.bytes.clone()));
        Ok(())
    }

    fn close(&mut self) -> Result<(), StackError> {
        self.closed = true;
        if self.fail_close {
            return Err(StackError::Format("simulated close failure".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{AxisDescriptor, AxisKind, PixelType};

    fn meta() -> ImageMetadata {
        ImageMetadata::new(
            vec![
                AxisDescriptor::new(AxisKind::X, 2),
                AxisDescriptor::new(AxisKind::Y, 2),
            ],
            vec![AxisDescriptor::new(AxisKind::Z, 2)],
            PixelType::UInt8,
            true,
        )
    }

    #[test]
    fn rejects_wrong_plane_count() {
        assert!(MemorySource::new(meta(), vec![vec![0; 4]]).is_err());
        assert!(MemorySource::new(meta(), vec![vec![0; 4], vec![0; 3]]).is_err());
    }

    #[test]
    fn open_plane_crops_and_counts() {
        let mut source =
            MemorySource::new(meta(), vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]]).unwrap();
        let bounds = PlaneBounds {
            min: vec![1, 0],
            max: vec![1, 1],
        };
        let plane = source.open_plane(0, 1, &bounds, None).unwrap();
        assert_eq!(plane.bytes, vec![5, 7]);
        assert_eq!(source.reads(), 1);
        assert!(source.open_plane(0, 2, &bounds, None).is_err());
        assert!(source.metadata(1).is_err());
    }
}
