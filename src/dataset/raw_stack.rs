//! The rawstack container (`.rst`).
//!
//! A rawstack file is a small JSON header followed by the raw planes of one
//! image:
//!
//! ```text
//! "RSTK"            magic
//! u8                version: 1 = u32 header length, 2 = u64 (large file)
//! u32 | u64 (LE)    header length in bytes
//! [u8]              JSON header (RawStackHeader)
//! [u8]              payload: planes in flat-index order, optionally one gzip stream
//! ```
//!
//! Within a plane, planar axis 0 varies fastest.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{Compression, Destination, Source, SourceOptions, WriterOption};
use crate::axis::{AxisDescriptor, AxisKind, ImageMetadata, PixelType};
use crate::error::StackError;
use crate::pixel::{decode_typed, SampleArray};
use crate::plane::{crop_into, ColorTable, Plane, PlaneBounds};

pub const FORMAT_NAME: &str = "rawstack";

const MAGIC: &[u8; 4] = b"RSTK";
const VERSION_SMALL: u8 = 1;
const VERSION_LARGE: u8 = 2;
/// Headers larger than this are rejected before allocation.
const MAX_HEADER_BYTES: u64 = 16 * 1024 * 1024;

/// JSON header of a rawstack file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawStackHeader {
    /// All axes, planar ones first.
    pub axes: Vec<AxisDescriptor>,
    /// How many leading axes are planar.
    pub planar_count: usize,
    pub pixel_type: PixelType,
    pub little_endian: bool,
    #[serde(default)]
    pub compression: Compression,
    #[serde(default)]
    pub indexed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_table: Option<ColorTable>,
}

impl RawStackHeader {
    pub fn from_metadata(meta: &ImageMetadata, compression: Compression) -> Self {
        let mut axes = meta.planar.clone();
        axes.extend_from_slice(&meta.non_planar);
        Self {
            axes,
            planar_count: meta.planar.len(),
            pixel_type: meta.pixel_type,
            little_endian: meta.little_endian,
            compression,
            indexed: meta.indexed,
            color_table: None,
        }
    }

    /// Image metadata described by the header.
    ///
    /// # Errors
    /// Returns [`StackError::Format`] if `planar_count` exceeds the number
    /// of axes.
    pub fn metadata(&self) -> Result<ImageMetadata, StackError> {
        if self.planar_count > self.axes.len() {
            return Err(StackError::Format(format!(
                "header declares {} planar axes but only {} axes",
                self.planar_count,
                self.axes.len()
            )));
        }
        let (planar, non_planar) = self.axes.split_at(self.planar_count);
        Ok(ImageMetadata::new(
            planar.to_vec(),
            non_planar.to_vec(),
            self.pixel_type,
            self.little_endian,
        )
        .with_indexed(self.indexed))
    }
}

/// Parse the magic, version and header from the start of a rawstack file.
///
/// Returns the header and the byte offset at which the payload starts.
///
/// # Errors
/// Returns [`StackError::Format`] for a bad magic, version or length and
/// [`StackError::HeaderParse`] for malformed JSON.
pub fn read_header<R: Read>(
    reader: &mut R,
    path: &Path,
) -> Result<(RawStackHeader, u64), StackError> {
    let mut magic = [0u8; 4];
    reader
        .read_exact(&mut magic)
        .map_err(|e| truncated_or_io(path, e))?;
    if &magic != MAGIC {
        return Err(StackError::Format(format!(
            "{} is not a rawstack file",
            path.display()
        )));
    }

    let version = reader.read_u8().map_err(|e| truncated_or_io(path, e))?;
    let (header_len, prefix_len) = match version {
        VERSION_SMALL => (
            reader
                .read_u32::<LittleEndian>()
                .map_err(|e| truncated_or_io(path, e))? as u64,
            9u64,
        ),
        VERSION_LARGE => (
            reader
                .read_u64::<LittleEndian>()
                .map_err(|e| truncated_or_io(path, e))?,
            13u64,
        ),
        other => {
            return Err(StackError::Format(format!(
                "{}: unknown rawstack version {}",
                path.display(),
                other
            )))
        }
    };
    if header_len > MAX_HEADER_BYTES {
        return Err(StackError::Format(format!(
            "{}: header of {} bytes is too large",
            path.display(),
            header_len
        )));
    }

    let mut json = vec![0u8; header_len as usize];
    reader
        .read_exact(&mut json)
        .map_err(|e| truncated_or_io(path, e))?;
    let header: RawStackHeader =
        serde_json::from_slice(&json).map_err(|source| StackError::HeaderParse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok((header, prefix_len + header_len))
}

/// Parse a header from an in-memory byte slice.
///
/// Useful for fuzzing and tests without file I/O.
pub fn header_from_slice(bytes: &[u8]) -> Result<(RawStackHeader, u64), StackError> {
    read_header(&mut io::Cursor::new(bytes), Path::new("<memory>"))
}

fn truncated_or_io(path: &Path, e: io::Error) -> StackError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        StackError::Format(format!("{}: truncated rawstack header", path.display()))
    } else {
        StackError::io_at(path, e)
    }
}

enum Payload {
    /// Uncompressed planes read on demand.
    File { file: File, offset: u64 },
    /// Inflated payload.
    Memory(Vec<u8>),
    Closed,
}

/// Reader for rawstack files.
pub struct RawStackReader {
    path: PathBuf,
    stored: ImageMetadata,
    exposed: ImageMetadata,
    color_table: Option<ColorTable>,
    payload: Payload,
    stored_plane_bytes: u64,
    /// Planes of the exposed image per stored plane (`separate`).
    split: u64,
    expand: bool,
    scratch: Vec<u8>,
    expanded: Vec<u8>,
}

impl RawStackReader {
    /// Open a rawstack file, applying the passthrough reader options.
    ///
    /// # Errors
    /// Returns [`StackError::IoAt`] if the file cannot be read and
    /// [`StackError::Format`] if the payload size does not match the header.
    pub fn open(path: &Path, opts: &SourceOptions) -> Result<Self, StackError> {
        let file = File::open(path).map_err(|e| StackError::io_at(path, e))?;
        let mut reader = BufReader::new(file);
        let (header, offset) = read_header(&mut reader, path)?;
        let stored = header.metadata()?;

        let stored_plane_bytes = stored
            .plane_size_bytes()
            .ok_or_else(|| StackError::Format(format!("{}: plane size overflows", path.display())))?;
        let expected = stored
            .plane_count()
            .and_then(|count| count.checked_mul(stored_plane_bytes))
            .ok_or_else(|| StackError::Format(format!("{}: payload size overflows", path.display())))?;

        let payload = match header.compression {
            Compression::None => {
                let file = reader.into_inner();
                let len = file
                    .metadata()
                    .map_err(|e| StackError::io_at(path, e))?
                    .len();
                check_payload_size(path, len.saturating_sub(offset), expected)?;
                Payload::File { file, offset }
            }
            Compression::Gzip => {
                let mut bytes = Vec::new();
                GzDecoder::new(reader)
                    .read_to_end(&mut bytes)
                    .map_err(|e| StackError::io_at(path, e))?;
                check_payload_size(path, bytes.len() as u64, expected)?;
                Payload::Memory(bytes)
            }
        };

        log_passthrough(opts);

        let mut exposed = stored.clone();
        let expand = opts.expand && can_expand(&stored, header.color_table.as_ref());
        if opts.expand && !expand {
            warn!(
                "--expand has no effect on {}: not an indexed 8/16-bit image with a color table",
                path.display()
            );
        }
        if expand {
            exposed.planar.push(AxisDescriptor::new(AxisKind::Channel, 3));
            exposed.pixel_type = PixelType::UInt8;
            exposed.indexed = false;
        }

        let mut split = 1;
        if opts.separate {
            if exposed.planar.len() > 2 {
                let moved = exposed.planar.split_off(2);
                split = moved.iter().map(|a| a.length).product();
                let mut non_planar = moved;
                non_planar.append(&mut exposed.non_planar);
                exposed.non_planar = non_planar;
            } else {
                debug!("--separate: {} has no extra planar axes", path.display());
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            stored,
            exposed,
            color_table: header.color_table,
            payload,
            stored_plane_bytes,
            split,
            expand,
            scratch: Vec::new(),
            expanded: Vec::new(),
        })
    }

    fn load_stored_plane(&mut self, stored_index: u64) -> Result<(), StackError> {
        let size = self.stored_plane_bytes as usize;
        let start = stored_index * self.stored_plane_bytes;
        self.scratch.resize(size, 0);
        match &mut self.payload {
            Payload::File { file, offset } => {
                file.seek(SeekFrom::Start(*offset + start))
                    .and_then(|_| file.read_exact(&mut self.scratch))
                    .map_err(|e| StackError::io_at(&self.path, e))?;
            }
            Payload::Memory(bytes) => {
                let start = start as usize;
                self.scratch.copy_from_slice(&bytes[start..start + size]);
            }
            Payload::Closed => {
                return Err(StackError::Format(format!(
                    "{} is closed",
                    self.path.display()
                )))
            }
        }
        Ok(())
    }
}

fn check_payload_size(path: &Path, actual: u64, expected: u64) -> Result<(), StackError> {
    if actual != expected {
        return Err(StackError::Format(format!(
            "{}: payload holds {} bytes, header describes {}",
            path.display(),
            actual,
            expected
        )));
    }
    Ok(())
}

fn log_passthrough(opts: &SourceOptions) {
    if opts.stitch {
        warn!("--stitch has no effect on single-file rawstack datasets");
    }
    if !opts.group_files {
        warn!("--nogroup has no effect on single-file rawstack datasets");
    }
    if opts.autoscale {
        warn!("--autoscale is not supported by the rawstack reader; samples are read as stored");
    }
}

fn can_expand(meta: &ImageMetadata, table: Option<&ColorTable>) -> bool {
    meta.indexed
        && table.is_some()
        && matches!(meta.pixel_type, PixelType::UInt8 | PixelType::UInt16)
}

/// Map indexed samples through `table` into three channel blocks (R, G, B).
fn expand_indexed(
    src: &[u8],
    pixel_type: PixelType,
    little_endian: bool,
    table: &ColorTable,
    out: &mut Vec<u8>,
) -> Result<(), StackError> {
    let indices: Vec<usize> = match decode_typed(src, pixel_type, little_endian)? {
        SampleArray::U8(v) => v.into_iter().map(usize::from).collect(),
        SampleArray::U16(v) => v.into_iter().map(usize::from).collect(),
        other => {
            return Err(StackError::Format(format!(
                "cannot expand {} samples",
                other.pixel_type()
            )))
        }
    };

    out.clear();
    out.resize(indices.len() * 3, 0);
    let n = indices.len();
    for (i, &index) in indices.iter().enumerate() {
        let rgb = table.lookup(index);
        out[i] = rgb[0];
        out[n + i] = rgb[1];
        out[2 * n + i] = rgb[2];
    }
    Ok(())
}

impl Source for RawStackReader {
    fn format_name(&self) -> &'static str {
        FORMAT_NAME
    }

    fn location(&self) -> &Path {
        &self.path
    }

    fn metadata(&self, image_index: usize) -> Result<&ImageMetadata, StackError> {
        match image_index {
            0 => Ok(&self.exposed),
            other => Err(StackError::Format(format!(
                "{} has no image #{}",
                self.path.display(),
                other
            ))),
        }
    }

    fn open_plane(
        &mut self,
        image_index: usize,
        flat_index: u64,
        bounds: &PlaneBounds,
        recycle: Option<Plane>,
    ) -> Result<Plane, StackError> {
        let count = self.metadata(image_index)?.plane_count().unwrap_or(0);
        if flat_index >= count {
            return Err(StackError::Format(format!(
                "plane #{} out of range ({} planes)",
                flat_index, count
            )));
        }

        // `separate` splits a stored plane into `split` contiguous slices.
        let stored_index = flat_index / self.split;
        let slice = flat_index % self.split;
        self.load_stored_plane(stored_index)?;

        let full: &[u8] = if self.expand {
            let table = self.color_table.as_ref().ok_or_else(|| {
                StackError::Format(format!("{} has no color table", self.path.display()))
            })?;
            expand_indexed(
                &self.scratch,
                self.stored.pixel_type,
                self.stored.little_endian,
                table,
                &mut self.expanded,
            )?;
            &self.expanded
        } else {
            &self.scratch
        };

        let slice_len = full.len() / self.split as usize;
        let start = slice as usize * slice_len;
        let full = &full[start..start + slice_len];

        let mut plane = Plane::recycle(recycle, bounds);
        crop_into(
            full,
            &self.exposed.planar_lengths(),
            bounds,
            self.exposed.pixel_type.bytes_per_sample(),
            &mut plane.bytes,
        )?;
        if self.exposed.indexed {
            plane.color_table = self.color_table.clone();
        }
        Ok(plane)
    }

    fn close(&mut self) -> Result<(), StackError> {
        self.payload = Payload::Closed;
        Ok(())
    }
}

enum Sink {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl Sink {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        match self {
            Sink::Plain(w) => w.write_all(bytes),
            Sink::Gzip(w) => w.write_all(bytes),
        }
    }

    fn finish(self) -> io::Result<()> {
        let mut inner = match self {
            Sink::Plain(w) => w,
            Sink::Gzip(w) => w.finish()?,
        };
        inner.flush()
    }
}

/// Writer for rawstack files.
///
/// Planes must arrive in sequential order starting at 0. The header is
/// written with the first plane (or on close) so that writer options can be
/// changed until then.
pub struct RawStackWriter {
    path: PathBuf,
    header: RawStackHeader,
    capacity: u64,
    plane_bytes: u64,
    large_file: bool,
    file: Option<BufWriter<File>>,
    sink: Option<Sink>,
    written: u64,
    closed: bool,
}

impl RawStackWriter {
    /// Create `path` for an image described by `meta`.
    ///
    /// # Errors
    /// Returns [`StackError::IoAt`] if the file cannot be created.
    pub fn create(
        path: &Path,
        meta: &ImageMetadata,
        compression: Compression,
    ) -> Result<Self, StackError> {
        let capacity = meta
            .plane_count()
            .ok_or_else(|| StackError::Format("plane count overflows".into()))?;
        let plane_bytes = meta
            .plane_size_bytes()
            .ok_or_else(|| StackError::Format("plane size overflows".into()))?;
        let file = File::create(path).map_err(|e| StackError::io_at(path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            header: RawStackHeader::from_metadata(meta, compression),
            capacity,
            plane_bytes,
            large_file: false,
            file: Some(BufWriter::new(file)),
            sink: None,
            written: 0,
            closed: false,
        })
    }

    /// Store a color table in the header.
    pub fn set_color_table(&mut self, table: Option<ColorTable>) {
        self.header.color_table = table;
    }

    fn start(&mut self) -> Result<&mut Sink, StackError> {
        if self.sink.is_none() {
            let mut file = self.file.take().ok_or_else(|| {
                StackError::Format(format!("{} is closed", self.path.display()))
            })?;
            let json =
                serde_json::to_vec(&self.header).map_err(|source| StackError::HeaderWrite {
                    path: self.path.clone(),
                    source,
                })?;

            let prefix = (|| -> io::Result<()> {
                file.write_all(MAGIC)?;
                if self.large_file {
                    file.write_u8(VERSION_LARGE)?;
                    file.write_u64::<LittleEndian>(json.len() as u64)?;
                } else {
                    file.write_u8(VERSION_SMALL)?;
                    file.write_u32::<LittleEndian>(json.len() as u32)?;
                }
                file.write_all(&json)
            })();
            prefix.map_err(|e| StackError::io_at(&self.path, e))?;

            self.sink = Some(match self.header.compression {
                Compression::None => Sink::Plain(file),
                Compression::Gzip => Sink::Gzip(GzEncoder::new(file, flate2::Compression::default())),
            });
        }
        self.sink
            .as_mut()
            .ok_or_else(|| StackError::Format(format!("{} is closed", self.path.display())))
    }
}

impl Destination for RawStackWriter {
    fn format_name(&self) -> &'static str {
        FORMAT_NAME
    }

    fn location(&self) -> &Path {
        &self.path
    }

    fn plane_capacity(&self, image_index: usize) -> u64 {
        if image_index == 0 {
            self.capacity
        } else {
            0
        }
    }

    fn supports(&self, option: WriterOption) -> bool {
        matches!(option, WriterOption::LargeFile)
    }

    fn enable(&mut self, option: WriterOption) -> Result<(), StackError> {
        if self.sink.is_some() || self.closed {
            return Err(StackError::UnsupportedOption(format!(
                "{} cannot change after the header is written",
                option
            )));
        }
        match option {
            WriterOption::LargeFile => self.large_file = true,
        }
        Ok(())
    }

    fn write_plane(
        &mut self,
        image_index: usize,
        sequential_no: u64,
        plane: &Plane,
    ) -> Result<(), StackError> {
        if self.closed {
            return Err(StackError::Format(format!(
                "{} is closed",
                self.path.display()
            )));
        }
        if image_index != 0 {
            return Err(StackError::Format(format!(
                "rawstack stores a single image, got image #{}",
                image_index
            )));
        }
        if sequential_no != self.written {
            return Err(StackError::Format(format!(
                "planes must be written in order: expected #{}, got #{}",
                self.written, sequential_no
            )));
        }
        if sequential_no >= self.capacity {
            return Err(StackError::Format(format!(
                "plane #{} exceeds capacity of {}",
                sequential_no, self.capacity
            )));
        }
        if plane.bytes.len() as u64 != self.plane_bytes {
            return Err(StackError::Format(format!(
                "plane holds {} bytes, expected {}",
                plane.bytes.len(),
                self.plane_bytes
            )));
        }

        // The header is still pending on the first plane, so an indexed
        // image can adopt the table the source attached to it.
        if self.sink.is_none() && self.header.indexed && self.header.color_table.is_none() {
            self.header.color_table = plane.color_table.clone();
        }

        let path = self.path.clone();
        self.start()?
            .write_all(&plane.bytes)
            .map_err(|e| StackError::io_at(path, e))?;
        self.written += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), StackError> {
        if self.closed {
            return Ok(());
        }
        let started = self.start().map(|_| ());
        self.closed = true;
        started?;

        if let Some(sink) = self.sink.take() {
            sink.finish().map_err(|e| StackError::io_at(&self.path, e))?;
        }
        if self.written < self.capacity {
            return Err(StackError::Format(format!(
                "{}: only {} of {} plane(s) written",
                self.path.display(),
                self.written,
                self.capacity
            )));
        }
        Ok(())
    }
}

/// Write a complete single-image rawstack file in one call.
pub fn write_rawstack(
    path: &Path,
    meta: &ImageMetadata,
    planes: &[Vec<u8>],
    compression: Compression,
    color_table: Option<ColorTable>,
) -> Result<(), StackError> {
    let mut writer = RawStackWriter::create(path, meta, compression)?;
    writer.set_color_table(color_table);
    let full = PlaneBounds {
        min: vec![0; meta.planar.len()],
        max: meta.planar_lengths().iter().map(|&l| l.saturating_sub(1)).collect(),
    };
    for (i, bytes) in planes.iter().enumerate() {
        let plane = Plane {
            bytes: bytes.clone(),
            bounds: full.clone(),
            color_table: None,
        };
        writer.write_plane(0, i as u64, &plane)?;
    }
    writer.close()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plane::TraversalPlan;

    fn meta_xyz(pixel_type: PixelType) -> ImageMetadata {
        ImageMetadata::new(
            vec![
                AxisDescriptor::new(AxisKind::X, 3),
                AxisDescriptor::new(AxisKind::Y, 2),
            ],
            vec![AxisDescriptor::new(AxisKind::Z, 2)],
            pixel_type,
            true,
        )
    }

    fn read_all(path: &Path, opts: &SourceOptions) -> (ImageMetadata, Vec<Vec<u8>>) {
        let mut reader = RawStackReader::open(path, opts).unwrap();
        let meta = reader.metadata(0).unwrap().clone();
        let plan = TraversalPlan::full(&meta).unwrap();
        let planes = plan
            .enumerator(&meta)
            .unwrap()
            .map(|t| reader.open_plane(0, t.flat_index, &t.bounds, None).unwrap().bytes)
            .collect();
        reader.close().unwrap();
        (meta, planes)
    }

    #[test]
    fn write_then_read_uncompressed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stack.rst");
        let meta = meta_xyz(PixelType::UInt8);
        let planes = vec![vec![0, 1, 2, 3, 4, 5], vec![6, 7, 8, 9, 10, 11]];
        write_rawstack(&path, &meta, &planes, Compression::None, None).unwrap();

        let (read_meta, read_planes) = read_all(&path, &SourceOptions::default());
        assert_eq!(read_meta, meta);
        assert_eq!(read_planes, planes);
    }

    #[test]
    fn write_then_read_gzip_large_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stack.rst");
        let meta = meta_xyz(PixelType::UInt16);
        let planes = vec![vec![1u8; 12], vec![2u8; 12]];

        let mut writer = RawStackWriter::create(&path, &meta, Compression::Gzip).unwrap();
        assert!(writer.supports(WriterOption::LargeFile));
        writer.enable(WriterOption::LargeFile).unwrap();
        for (i, bytes) in planes.iter().enumerate() {
            let plane = Plane {
                bytes: bytes.clone(),
                bounds: PlaneBounds {
                    min: vec![0, 0],
                    max: vec![2, 1],
                },
                color_table: None,
            };
            writer.write_plane(0, i as u64, &plane).unwrap();
        }
        assert!(writer.enable(WriterOption::LargeFile).is_err());
        writer.close().unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], MAGIC);
        assert_eq!(bytes[4], VERSION_LARGE);
        let (header, _) = header_from_slice(&bytes).unwrap();
        assert_eq!(header.compression, Compression::Gzip);

        let (_, read_planes) = read_all(&path, &SourceOptions::default());
        assert_eq!(read_planes, planes);
    }

    #[test]
    fn out_of_order_write_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stack.rst");
        let meta = meta_xyz(PixelType::UInt8);
        let mut writer = RawStackWriter::create(&path, &meta, Compression::None).unwrap();
        let plane = Plane {
            bytes: vec![0; 6],
            bounds: PlaneBounds {
                min: vec![0, 0],
                max: vec![2, 1],
            },
            color_table: None,
        };
        assert!(writer.write_plane(0, 1, &plane).is_err());
        writer.write_plane(0, 0, &plane).unwrap();
        // one plane missing
        assert!(writer.close().is_err());
        // second close is a no-op
        assert!(writer.close().is_ok());
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stack.rst");
        let meta = meta_xyz(PixelType::UInt8);
        write_rawstack(&path, &meta, &[vec![0; 6], vec![0; 6]], Compression::None, None).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 1]).unwrap();

        let err = RawStackReader::open(&path, &SourceOptions::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("payload holds"));
    }

    #[test]
    fn bad_magic_and_garbage_headers() {
        assert!(header_from_slice(b"NOPE").is_err());
        assert!(header_from_slice(b"RSTK").is_err());
        assert!(header_from_slice(b"RSTK\x09\x00\x00\x00\x00").is_err());
        let mut bytes = b"RSTK\x01".to_vec();
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(b"{}");
        assert!(matches!(
            header_from_slice(&bytes),
            Err(StackError::HeaderParse { .. })
        ));
    }

    #[test]
    fn separate_moves_extra_planar_axes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgb.rst");
        // X=2, Y=1, C=3 planar; Z=2
        let meta = ImageMetadata::new(
            vec![
                AxisDescriptor::new(AxisKind::X, 2),
                AxisDescriptor::new(AxisKind::Y, 1),
                AxisDescriptor::new(AxisKind::Channel, 3),
            ],
            vec![AxisDescriptor::new(AxisKind::Z, 2)],
            PixelType::UInt8,
            true,
        );
        let planes = vec![vec![1, 2, 3, 4, 5, 6], vec![7, 8, 9, 10, 11, 12]];
        write_rawstack(&path, &meta, &planes, Compression::None, None).unwrap();

        let opts = SourceOptions {
            separate: true,
            ..Default::default()
        };
        let (read_meta, read_planes) = read_all(&path, &opts);
        assert_eq!(read_meta.planar_lengths(), vec![2, 1]);
        assert_eq!(read_meta.non_planar_lengths(), vec![3, 2]);
        assert_eq!(read_meta.non_planar[0].kind, AxisKind::Channel);
        assert_eq!(
            read_planes,
            vec![
                vec![1, 2],
                vec![3, 4],
                vec![5, 6],
                vec![7, 8],
                vec![9, 10],
                vec![11, 12]
            ]
        );
    }

    #[test]
    fn expand_maps_indices_through_color_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("indexed.rst");
        let meta = ImageMetadata::new(
            vec![
                AxisDescriptor::new(AxisKind::X, 2),
                AxisDescriptor::new(AxisKind::Y, 1),
            ],
            vec![],
            PixelType::UInt8,
            true,
        )
        .with_indexed(true);
        let table = ColorTable::new(vec![[10, 20, 30], [40, 50, 60]]);
        write_rawstack(&path, &meta, &[vec![1, 0]], Compression::None, Some(table.clone()))
            .unwrap();

        // without expand, the plane carries the table
        let mut reader = RawStackReader::open(&path, &SourceOptions::default()).unwrap();
        let bounds = PlaneBounds {
            min: vec![0, 0],
            max: vec![1, 0],
        };
        let plane = reader.open_plane(0, 0, &bounds, None).unwrap();
        assert_eq!(plane.bytes, vec![1, 0]);
        assert_eq!(plane.color_table, Some(table));

        let opts = SourceOptions {
            expand: true,
            ..Default::default()
        };
        let (read_meta, read_planes) = read_all(&path, &opts);
        assert_eq!(read_meta.planar_lengths(), vec![2, 1, 3]);
        assert!(!read_meta.indexed);
        assert_eq!(read_planes, vec![vec![40, 10, 50, 20, 60, 30]]);
    }

    #[test]
    fn closed_reader_refuses_planes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stack.rst");
        let meta = meta_xyz(PixelType::UInt8);
        write_rawstack(&path, &meta, &[vec![0; 6], vec![0; 6]], Compression::None, None).unwrap();

        let mut reader = RawStackReader::open(&path, &SourceOptions::default()).unwrap();
        reader.close().unwrap();
        let bounds = PlaneBounds {
            min: vec![0, 0],
            max: vec![2, 1],
        };
        assert!(reader.open_plane(0, 0, &bounds, None).is_err());
    }
}
