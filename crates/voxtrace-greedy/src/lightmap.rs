use serde::Deserialize;
use thiserror::Error;

use crate::Face;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PackError {
    #[error("face {index} needs {width} texels but the lightmap is {atlas_width} wide")]
    FaceTooWide {
        index: usize,
        width: u32,
        atlas_width: u32,
    },
    #[error("lightmap width must be positive")]
    ZeroWidth,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LightmapConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_texels_per_cell")]
    pub texels_per_cell: u32,
    /// Empty texels kept around every face so bilinear taps do not bleed.
    #[serde(default = "default_padding")]
    pub padding: u32,
}

fn default_width() -> u32 {
    1024
}
fn default_texels_per_cell() -> u32 {
    1
}
fn default_padding() -> u32 {
    1
}

impl Default for LightmapConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            texels_per_cell: default_texels_per_cell(),
            padding: default_padding(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LightmapLayout {
    pub width: u32,
    pub height: u32,
}

/// Assigns lightmap texel origins `(tx, ty)` to every face with shelf packing.
///
/// Faces are placed tallest first (ties broken by width, then input order) on
/// left-to-right shelves. Face order in `faces` is left untouched.
pub fn pack_lightmap(faces: &mut [Face], cfg: &LightmapConfig) -> Result<LightmapLayout, PackError> {
    if cfg.width == 0 {
        return Err(PackError::ZeroWidth);
    }
    let footprint = |f: &Face| {
        (
            f.width() as u32 * cfg.texels_per_cell + 2 * cfg.padding,
            f.height() as u32 * cfg.texels_per_cell + 2 * cfg.padding,
        )
    };

    let mut order: Vec<usize> = (0..faces.len()).collect();
    order.sort_by(|&a, &b| {
        let (wa, ha) = footprint(&faces[a]);
        let (wb, hb) = footprint(&faces[b]);
        hb.cmp(&ha).then(wb.cmp(&wa))
    });

    let (mut x, mut y, mut shelf) = (0u32, 0u32, 0u32);
    for i in order {
        let (w, h) = footprint(&faces[i]);
        if w > cfg.width {
            return Err(PackError::FaceTooWide {
                index: i,
                width: w,
                atlas_width: cfg.width,
            });
        }
        if x + w > cfg.width {
            y += shelf;
            x = 0;
            shelf = 0;
        }
        faces[i].tx = x + cfg.padding;
        faces[i].ty = y + cfg.padding;
        x += w;
        shelf = shelf.max(h);
    }

    let layout = LightmapLayout {
        width: cfg.width,
        height: y + shelf,
    };
    log::debug!(
        "lightmap: {} faces packed into {}x{}",
        faces.len(),
        layout.width,
        layout.height
    );
    Ok(layout)
}
