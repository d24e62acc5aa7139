//! Conversion between raw plane bytes and typed sample arrays.
//!
//! Decoding honors sample width, float-ness and byte order and is exact for
//! every sample type: `decode(encode(a)) == a`. Float normalization is only
//! used on the display path, never during conversion.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::axis::PixelType;
use crate::error::StackError;

/// Typed samples of one plane.
#[derive(Clone, Debug, PartialEq)]
pub enum SampleArray {
    I8(Vec<i8>),
    U8(Vec<u8>),
    I16(Vec<i16>),
    U16(Vec<u16>),
    I32(Vec<i32>),
    U32(Vec<u32>),
    I64(Vec<i64>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

macro_rules! read_into {
    ($bytes:expr, $width:expr, $little:expr, $ty:ty, $read:ident, $variant:ident) => {{
        let mut out = vec![<$ty>::default(); $bytes.len() / $width];
        if $little {
            LittleEndian::$read($bytes, &mut out);
        } else {
            BigEndian::$read($bytes, &mut out);
        }
        SampleArray::$variant(out)
    }};
}

macro_rules! write_from {
    ($values:expr, $width:expr, $little:expr, $write:ident) => {{
        let mut out = vec![0u8; $values.len() * $width];
        if $little {
            LittleEndian::$write($values, &mut out);
        } else {
            BigEndian::$write($values, &mut out);
        }
        out
    }};
}

/// Decode `bytes` into signed integer or float samples.
///
/// Supported widths are 1, 2, 4 and 8 bytes; floats only at 4 and 8.
/// Integer samples come back signed: the bit pattern is preserved exactly,
/// use [`decode_typed`] to get unsigned arrays for unsigned pixel types.
///
/// # Errors
/// Returns [`StackError::Format`] for an unsupported width/float
/// combination or a buffer that is not a whole number of samples.
pub fn decode(
    bytes: &[u8],
    bytes_per_sample: usize,
    is_float: bool,
    little_endian: bool,
) -> Result<SampleArray, StackError> {
    let pixel_type = match (bytes_per_sample, is_float) {
        (1, false) => PixelType::Int8,
        (2, false) => PixelType::Int16,
        (4, false) => PixelType::Int32,
        (8, false) => PixelType::Int64,
        (4, true) => PixelType::Float32,
        (8, true) => PixelType::Float64,
        (width, float) => {
            return Err(StackError::Format(format!(
                "unsupported sample layout: {} byte(s){}",
                width,
                if float { ", floating point" } else { "" }
            )))
        }
    };
    decode_typed(bytes, pixel_type, little_endian)
}

/// Decode `bytes` into the array type matching `pixel_type`.
///
/// # Errors
/// Returns [`StackError::Format`] if `bytes` is not a whole number of
/// samples.
pub fn decode_typed(
    bytes: &[u8],
    pixel_type: PixelType,
    little_endian: bool,
) -> Result<SampleArray, StackError> {
    let width = pixel_type.bytes_per_sample();
    if bytes.len() % width != 0 {
        return Err(StackError::Format(format!(
            "{} bytes is not a whole number of {} samples",
            bytes.len(),
            pixel_type
        )));
    }

    let array = match pixel_type {
        PixelType::Int8 => SampleArray::I8(bytes.iter().map(|&b| b as i8).collect()),
        PixelType::UInt8 => SampleArray::U8(bytes.to_vec()),
        PixelType::Int16 => read_into!(bytes, width, little_endian, i16, read_i16_into, I16),
        PixelType::UInt16 => read_into!(bytes, width, little_endian, u16, read_u16_into, U16),
        PixelType::Int32 => read_into!(bytes, width, little_endian, i32, read_i32_into, I32),
        PixelType::UInt32 => read_into!(bytes, width, little_endian, u32, read_u32_into, U32),
        PixelType::Int64 => read_into!(bytes, width, little_endian, i64, read_i64_into, I64),
        PixelType::UInt64 => read_into!(bytes, width, little_endian, u64, read_u64_into, U64),
        PixelType::Float32 => read_into!(bytes, width, little_endian, f32, read_f32_into, F32),
        PixelType::Float64 => read_into!(bytes, width, little_endian, f64, read_f64_into, F64),
    };
    Ok(array)
}

/// Encode samples back to bytes in the requested byte order.
pub fn encode(samples: &SampleArray, little_endian: bool) -> Vec<u8> {
    match samples {
        SampleArray::I8(v) => v.iter().map(|&s| s as u8).collect(),
        SampleArray::U8(v) => v.clone(),
        SampleArray::I16(v) => write_from!(v, 2, little_endian, write_i16_into),
        SampleArray::U16(v) => write_from!(v, 2, little_endian, write_u16_into),
        SampleArray::I32(v) => write_from!(v, 4, little_endian, write_i32_into),
        SampleArray::U32(v) => write_from!(v, 4, little_endian, write_u32_into),
        SampleArray::I64(v) => write_from!(v, 8, little_endian, write_i64_into),
        SampleArray::U64(v) => write_from!(v, 8, little_endian, write_u64_into),
        SampleArray::F32(v) => write_from!(v, 4, little_endian, write_f32_into),
        SampleArray::F64(v) => write_from!(v, 8, little_endian, write_f64_into),
    }
}

impl SampleArray {
    pub fn len(&self) -> usize {
        match self {
            SampleArray::I8(v) => v.len(),
            SampleArray::U8(v) => v.len(),
            SampleArray::I16(v) => v.len(),
            SampleArray::U16(v) => v.len(),
            SampleArray::I32(v) => v.len(),
            SampleArray::U32(v) => v.len(),
            SampleArray::I64(v) => v.len(),
            SampleArray::U64(v) => v.len(),
            SampleArray::F32(v) => v.len(),
            SampleArray::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pixel type these samples are held as.
    pub fn pixel_type(&self) -> PixelType {
        match self {
            SampleArray::I8(_) => PixelType::Int8,
            SampleArray::U8(_) => PixelType::UInt8,
            SampleArray::I16(_) => PixelType::Int16,
            SampleArray::U16(_) => PixelType::UInt16,
            SampleArray::I32(_) => PixelType::Int32,
            SampleArray::U32(_) => PixelType::UInt32,
            SampleArray::I64(_) => PixelType::Int64,
            SampleArray::U64(_) => PixelType::UInt64,
            SampleArray::F32(_) => PixelType::Float32,
            SampleArray::F64(_) => PixelType::Float64,
        }
    }

    pub fn is_floating_point(&self) -> bool {
        self.pixel_type().is_floating_point()
    }

    /// Rescale float samples linearly into `[0, 1]`.
    ///
    /// Integer arrays are returned unchanged. Non-finite samples are ignored
    /// when finding the extremes and map to 0; a constant array maps to all
    /// zeros.
    pub fn normalize(self) -> SampleArray {
        match self {
            SampleArray::F32(mut v) => {
                let (lo, hi) = finite_extremes(v.iter().map(|&s| s as f64));
                for s in &mut v {
                    *s = rescale(*s as f64, lo, hi) as f32;
                }
                SampleArray::F32(v)
            }
            SampleArray::F64(mut v) => {
                let (lo, hi) = finite_extremes(v.iter().copied());
                for s in &mut v {
                    *s = rescale(*s, lo, hi);
                }
                SampleArray::F64(v)
            }
            other => other,
        }
    }

    /// Samples widened to `f64`, for rendering. Lossy for 64-bit integers.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self {
            SampleArray::I8(v) => v.iter().map(|&s| s as f64).collect(),
            SampleArray::U8(v) => v.iter().map(|&s| s as f64).collect(),
            SampleArray::I16(v) => v.iter().map(|&s| s as f64).collect(),
            SampleArray::U16(v) => v.iter().map(|&s| s as f64).collect(),
            SampleArray::I32(v) => v.iter().map(|&s| s as f64).collect(),
            SampleArray::U32(v) => v.iter().map(|&s| s as f64).collect(),
            SampleArray::I64(v) => v.iter().map(|&s| s as f64).collect(),
            SampleArray::U64(v) => v.iter().map(|&s| s as f64).collect(),
            SampleArray::F32(v) => v.iter().map(|&s| s as f64).collect(),
            SampleArray::F64(v) => v.clone(),
        }
    }
}

fn finite_extremes(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        })
}

fn rescale(value: f64, lo: f64, hi: f64) -> f64 {
    let range = hi - lo;
    if !value.is_finite() || !range.is_finite() || range <= 0.0 {
        return 0.0;
    }
    ((value - lo) / range).clamp(0.0, 1.0)
}

/// Pixel type of the buffer a source type is displayed through.
///
/// Display buffers hold unsigned integers or floats: signed integers move
/// one notch up to the unsigned type of the same width and 64-bit integers
/// fall back to `Float64`.
pub fn display_pixel_type(source: PixelType) -> PixelType {
    match source {
        PixelType::Int64 | PixelType::UInt64 => PixelType::Float64,
        other => other.next_notch().unwrap_or(other),
    }
}

/// Convert samples into the display buffer representation.
///
/// Signed integers are offset by half their range into the unsigned type of
/// the same width, which keeps their ordering. 64-bit integers become
/// `f64`. Unsigned and float samples pass through unchanged.
pub fn to_display(samples: SampleArray) -> SampleArray {
    match samples {
        SampleArray::I8(v) => SampleArray::U8(v.into_iter().map(|s| s as u8 ^ 0x80).collect()),
        SampleArray::I16(v) => {
            SampleArray::U16(v.into_iter().map(|s| s as u16 ^ 0x8000).collect())
        }
        SampleArray::I32(v) => {
            SampleArray::U32(v.into_iter().map(|s| s as u32 ^ 0x8000_0000).collect())
        }
        SampleArray::I64(v) => SampleArray::F64(v.into_iter().map(|s| s as f64).collect()),
        SampleArray::U64(v) => SampleArray::F64(v.into_iter().map(|s| s as f64).collect()),
        other => other,
    }
}

/// Whether a display buffer type differs from its source beyond the
/// expected one-notch widening.
pub fn is_pixel_type_mismatch(source: PixelType, display: PixelType) -> bool {
    display != source && Some(display) != source.next_notch()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_u16_both_orders() {
        let bytes = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(
            decode_typed(&bytes, PixelType::UInt16, true).unwrap(),
            SampleArray::U16(vec![0x0201, 0x0403])
        );
        assert_eq!(
            decode_typed(&bytes, PixelType::UInt16, false).unwrap(),
            SampleArray::U16(vec![0x0102, 0x0304])
        );
    }

    #[test]
    fn decode_by_width_is_signed() {
        let bytes = [0xff, 0xff];
        assert_eq!(
            decode(&bytes, 2, false, true).unwrap(),
            SampleArray::I16(vec![-1])
        );
        assert_eq!(
            decode(&bytes, 1, false, true).unwrap(),
            SampleArray::I8(vec![-1, -1])
        );
    }

    #[test]
    fn decode_float_big_endian() {
        let bytes = 1.5f32.to_be_bytes();
        assert_eq!(
            decode(&bytes, 4, true, false).unwrap(),
            SampleArray::F32(vec![1.5])
        );
    }

    #[test]
    fn float_requires_4_or_8_bytes() {
        assert!(decode(&[0, 0], 2, true, true).is_err());
        assert!(decode(&[0], 1, true, true).is_err());
        assert!(decode(&[0, 0, 0], 3, false, true).is_err());
    }

    #[test]
    fn partial_sample_fails() {
        assert!(decode_typed(&[0, 0, 0], PixelType::UInt16, true).is_err());
    }

    #[test]
    fn encode_matches_native_bytes() {
        let samples = SampleArray::I32(vec![-2, 70000]);
        let mut expected = Vec::new();
        expected.extend_from_slice(&(-2i32).to_be_bytes());
        expected.extend_from_slice(&70000i32.to_be_bytes());
        assert_eq!(encode(&samples, false), expected);
    }

    #[test]
    fn normalize_floats_into_unit_range() {
        let samples = SampleArray::F64(vec![-2.0, 0.0, 2.0]).normalize();
        assert_eq!(samples, SampleArray::F64(vec![0.0, 0.5, 1.0]));
    }

    #[test]
    fn normalize_constant_and_non_finite() {
        let samples = SampleArray::F32(vec![3.0, 3.0]).normalize();
        assert_eq!(samples, SampleArray::F32(vec![0.0, 0.0]));

        let samples = SampleArray::F32(vec![0.0, f32::NAN, 4.0]).normalize();
        assert_eq!(samples, SampleArray::F32(vec![0.0, 0.0, 1.0]));
    }

    #[test]
    fn normalize_leaves_integers_alone() {
        let samples = SampleArray::U16(vec![10, 20]);
        assert_eq!(samples.clone().normalize(), samples);
    }

    #[test]
    fn display_types() {
        assert_eq!(display_pixel_type(PixelType::Int16), PixelType::UInt16);
        assert_eq!(display_pixel_type(PixelType::UInt8), PixelType::UInt8);
        assert_eq!(display_pixel_type(PixelType::Int64), PixelType::Float64);

        assert!(!is_pixel_type_mismatch(PixelType::Int8, PixelType::UInt8));
        assert!(!is_pixel_type_mismatch(PixelType::Float32, PixelType::Float32));
        assert!(is_pixel_type_mismatch(PixelType::Int64, PixelType::Float64));
        assert!(is_pixel_type_mismatch(PixelType::UInt8, PixelType::UInt16));
    }

    #[test]
    fn display_keeps_signed_ordering() {
        let display = to_display(SampleArray::I8(vec![-128, -1, 0, 127]));
        assert_eq!(display, SampleArray::U8(vec![0, 127, 128, 255]));

        let display = to_display(SampleArray::I16(vec![i16::MIN, 0]));
        assert_eq!(display, SampleArray::U16(vec![0, 0x8000]));
        assert_eq!(display.pixel_type(), display_pixel_type(PixelType::Int16));
    }

    #[test]
    fn display_widens_64_bit_integers() {
        let display = to_display(SampleArray::U64(vec![7]));
        assert_eq!(display, SampleArray::F64(vec![7.0]));
    }
}
