//! Plane buffers exchanged between sources and destinations.

use serde::{Deserialize, Serialize};

use super::bounds::PlaneBounds;

/// RGB lookup table for indexed-color samples.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorTable {
    pub entries: Vec<[u8; 3]>,
}

impl ColorTable {
    pub fn new(entries: Vec<[u8; 3]>) -> Self {
        Self { entries }
    }

    /// RGB triple for an index; out-of-table indices map to black.
    pub fn lookup(&self, index: usize) -> [u8; 3] {
        self.entries.get(index).copied().unwrap_or([0, 0, 0])
    }
}

/// One (possibly cropped) plane of raw sample bytes.
///
/// `bytes` holds `bounds.sample_count()` samples in the source byte order,
/// planar axis 0 varying fastest.
#[derive(Clone, Debug, PartialEq)]
pub struct Plane {
    pub bytes: Vec<u8>,
    pub bounds: PlaneBounds,
    pub color_table: Option<ColorTable>,
}

impl Plane {
    /// A plane for `bounds`, reusing the allocation of `recycle` if given.
    ///
    /// The returned buffer is empty; the caller fills it.
    pub fn recycle(recycle: Option<Plane>, bounds: &PlaneBounds) -> Plane {
        match recycle {
            Some(mut plane) => {
                plane.bytes.clear();
                plane.bounds.clone_from(bounds);
                plane.color_table = None;
                plane
            }
            None => Plane {
                bytes: Vec::new(),
                bounds: bounds.clone(),
                color_table: None,
            },
        }
    }

    pub fn has_color_table(&self) -> bool {
        self.color_table.is_some()
    }
}
