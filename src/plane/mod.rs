//! Planes, plane bounds and traversal of the non-planar index space.
//!
//! A traversal visits a (possibly restricted) subset of an image's planes in
//! storage order. Each visit is a [`PlaneTask`] carrying:
//!
//! - the plane's **flat index**: its mixed-radix address in the source,
//!   computed against the full, unrestricted non-planar axis lengths;
//! - its **sequential number**: the 0-based position in the destination's
//!   write order;
//! - the crop **bounds** over the planar axes, identical for every task.

mod bounds;
mod buffer;
mod enumerator;
mod plan;
pub mod raster;

pub use bounds::{crop_into, PlaneBounds};
pub use buffer::{ColorTable, Plane};
pub use enumerator::{PlaneEnumerator, PlaneTask};
pub use plan::TraversalPlan;
pub use raster::position_to_raster;
