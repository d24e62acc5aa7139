//! Axis metadata for N-dimensional image stacks.
//!
//! A dataset image is described by an ordered list of axes, split into two
//! groups:
//!
//! - **planar** axes (typically X and Y) are packed inside one 2-D plane
//!   buffer, axis 0 varying fastest;
//! - **non-planar** axes (depth, channel, time, ...) select which plane to
//!   fetch, the first one varying fastest in storage order.
//!
//! # Example
//!
//! ```
//! use stackconv::axis::{AxisDescriptor, AxisKind, ImageMetadata, PixelType};
//!
//! let meta = ImageMetadata::new(
//!     vec![AxisDescriptor::new(AxisKind::X, 256), AxisDescriptor::new(AxisKind::Y, 256)],
//!     vec![AxisDescriptor::new(AxisKind::Z, 4)],
//!     PixelType::UInt16,
//!     true,
//! );
//! assert_eq!(meta.plane_count(), Some(4));
//! ```

mod model;
mod pixel_type;
pub mod range;

pub use model::{AxisDescriptor, AxisKind, ImageMetadata};
pub use pixel_type::PixelType;
pub use range::{resolve_range, AxisRange, ValidRange};
