//! Pixel sample types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric type of one pixel sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
}

impl PixelType {
    /// Width of one sample in bytes.
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            PixelType::Int8 | PixelType::UInt8 => 1,
            PixelType::Int16 | PixelType::UInt16 => 2,
            PixelType::Int32 | PixelType::UInt32 | PixelType::Float32 => 4,
            PixelType::Int64 | PixelType::UInt64 | PixelType::Float64 => 8,
        }
    }

    pub fn is_floating_point(&self) -> bool {
        matches!(self, PixelType::Float32 | PixelType::Float64)
    }

    /// The type one notch above this one: the unsigned type of the same
    /// width for signed integers, `None` otherwise.
    ///
    /// Display buffers cannot hold signed integer samples, so a signed source
    /// shows up one notch higher once rendered.
    pub fn next_notch(&self) -> Option<PixelType> {
        match self {
            PixelType::Int8 => Some(PixelType::UInt8),
            PixelType::Int16 => Some(PixelType::UInt16),
            PixelType::Int32 => Some(PixelType::UInt32),
            PixelType::Int64 => Some(PixelType::UInt64),
            _ => None,
        }
    }

    /// Stable lowercase name, also used in the rawstack header.
    pub fn name(&self) -> &'static str {
        match self {
            PixelType::Int8 => "int8",
            PixelType::UInt8 => "uint8",
            PixelType::Int16 => "int16",
            PixelType::UInt16 => "uint16",
            PixelType::Int32 => "int32",
            PixelType::UInt32 => "uint32",
            PixelType::Int64 => "int64",
            PixelType::UInt64 => "uint64",
            PixelType::Float32 => "float32",
            PixelType::Float64 => "float64",
        }
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
