//! Padded voxel occupancy fields, culling and terrain generation.
#![forbid(unsafe_code)]

mod cull;
mod palette;
pub mod terrain;

pub use cull::{CullMask, cull};
pub use palette::{Palette, PaletteConfig, PaletteEntry};
pub use terrain::{TerrainConfig, generate_terrain};

use serde::de::DeserializeOwned;
use std::error::Error;
use std::fs;
use std::path::Path;
use voxtrace_geom::{Box3i, IVec3};

/// Reads a TOML config file. Missing fields take their serde defaults.
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg: T = toml::from_str(&s)?;
    Ok(cfg)
}

/// Dense byte grid with one empty cell of padding on every side.
///
/// Cell value `0` is empty; any other value is a palette/material index. Interior
/// coordinates run over `[0, size)`; the padding cells at `-1` and `size` always
/// read as empty, so neighbour checks need no bounds branches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelField {
    pub sx: usize,
    pub sy: usize,
    pub sz: usize,
    data: Vec<u8>,
}

impl VoxelField {
    pub fn new(sx: usize, sy: usize, sz: usize) -> Self {
        Self {
            sx,
            sy,
            sz,
            data: vec![0; (sx + 2) * (sy + 2) * (sz + 2)],
        }
    }

    /// Builds a field from an unpadded `x`-fastest array (`(z * sy + y) * sx + x`).
    pub fn from_dense(sx: usize, sy: usize, sz: usize, cells: &[u8]) -> Self {
        let mut f = Self::new(sx, sy, sz);
        for z in 0..sz {
            for y in 0..sy {
                let row = (z * sy + y) * sx;
                let at = f.padded_idx(1, y + 1, z + 1);
                f.data[at..at + sx].copy_from_slice(&cells[row..row + sx]);
            }
        }
        f
    }

    /// Padded dimensions `(sx + 2, sy + 2, sz + 2)`.
    #[inline]
    pub fn padded_dims(&self) -> (usize, usize, usize) {
        (self.sx + 2, self.sy + 2, self.sz + 2)
    }

    #[inline]
    pub fn padded_idx(&self, px: usize, py: usize, pz: usize) -> usize {
        (pz * (self.sy + 2) + py) * (self.sx + 2) + px
    }

    /// Index of an interior cell inside the padded array.
    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        self.padded_idx(x + 1, y + 1, z + 1)
    }

    /// Raw padded storage, `x` fastest.
    #[inline]
    pub fn as_padded(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub(crate) fn as_padded_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[inline]
    pub fn contains(&self, p: IVec3) -> bool {
        p.x >= 0
            && p.y >= 0
            && p.z >= 0
            && (p.x as usize) < self.sx
            && (p.y as usize) < self.sy
            && (p.z as usize) < self.sz
    }

    /// Value at an interior coordinate; anything outside the interior reads as empty.
    #[inline]
    pub fn get(&self, p: IVec3) -> u8 {
        if !self.contains(p) {
            return 0;
        }
        self.data[self.idx(p.x as usize, p.y as usize, p.z as usize)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, v: u8) {
        let i = self.idx(x, y, z);
        self.data[i] = v;
    }

    /// Fills every interior cell of `b` (clipped to the field) with `v`.
    pub fn fill_box(&mut self, b: Box3i, v: u8) {
        for c in b.cells() {
            if self.contains(c) {
                self.set(c.x as usize, c.y as usize, c.z as usize, v);
            }
        }
    }

    #[inline]
    pub fn is_occupied(&self, p: IVec3) -> bool {
        self.get(p) != 0
    }

    pub fn occupied_count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Interior bounds `[0, size)`.
    #[inline]
    pub fn bounds(&self) -> Box3i {
        Box3i::new(
            IVec3::ZERO,
            IVec3::new(self.sx as i32, self.sy as i32, self.sz as i32),
        )
    }

    /// Iterates the occupied interior cells in z, y, x order with their values.
    pub fn occupied(&self) -> impl Iterator<Item = (IVec3, u8)> + '_ {
        self.bounds().cells().filter_map(move |c| match self.get(c) {
            0 => None,
            v => Some((c, v)),
        })
    }
}
