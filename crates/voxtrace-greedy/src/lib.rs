//! Greedy merging of a padded voxel field into boxes and face rectangles.
#![forbid(unsafe_code)]

mod lightmap;
mod meshing;
mod voxels;

pub use lightmap::{LightmapConfig, LightmapLayout, PackError, pack_lightmap};
pub use meshing::{Face, GreedyMeshing, neighbor_mask};
pub use voxels::GreedyVoxels;

use serde::Deserialize;

/// Merge rules shared by the box merger and the face mesher.
#[derive(Clone, Debug, Deserialize)]
pub struct GreedyConfig {
    /// Treat every non-zero value as the same material when merging.
    #[serde(default)]
    pub single_opaque: bool,
    /// Let enclosed cells join a neighbouring box regardless of their value.
    #[serde(default = "default_absorb_culled")]
    pub absorb_culled: bool,
    /// Longest run, in cells, a merged box may span on any axis.
    #[serde(default = "default_max_extent")]
    pub max_extent: usize,
    /// Only merge faces whose 8-cell neighbour masks match.
    #[serde(default = "default_ambient_occlusion")]
    pub ambient_occlusion: bool,
}

fn default_absorb_culled() -> bool {
    true
}
fn default_max_extent() -> usize {
    256
}
fn default_ambient_occlusion() -> bool {
    true
}

impl Default for GreedyConfig {
    fn default() -> Self {
        Self {
            single_opaque: false,
            absorb_culled: default_absorb_culled(),
            max_extent: default_max_extent(),
            ambient_occlusion: default_ambient_occlusion(),
        }
    }
}

/// Greedy 2D rectangle cover of `mask`, rows first then columns.
///
/// Cells with equal keys merge; `emit` receives `(u0, v0, w, h, seed)` where `seed`
/// is the flat index of the rectangle's first cell.
fn greedy_rects<K: Copy + Eq>(
    width: usize,
    height: usize,
    mask: &[Option<K>],
    mut emit: impl FnMut(usize, usize, usize, usize, usize),
) {
    let mut used = vec![false; width * height];
    for v in 0..height {
        for u in 0..width {
            let idx = v * width + u;
            let key = mask[idx];
            if key.is_none() || used[idx] {
                continue;
            }
            let mut w = 1;
            while u + w < width && mask[idx + w] == key && !used[idx + w] {
                w += 1;
            }
            let mut h = 1;
            'expand: while v + h < height {
                for i in 0..w {
                    let j = (v + h) * width + u + i;
                    if mask[j] != key || used[j] {
                        break 'expand;
                    }
                }
                h += 1;
            }
            for vv in 0..h {
                let row = (v + vv) * width + u;
                used[row..row + w].fill(true);
            }
            emit(u, v, w, h, idx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rects_cover_an_l_shape() {
        // ##.
        // #..
        let mask = [Some(1), Some(1), None, Some(1), None, None];
        let mut rects = Vec::new();
        greedy_rects(3, 2, &mask, |u, v, w, h, _| rects.push((u, v, w, h)));
        assert_eq!(rects, vec![(0, 0, 2, 1), (0, 1, 1, 1)]);
    }

    #[test]
    fn rects_split_on_key_change() {
        let mask = [Some(1), Some(2), Some(2), Some(2)];
        let mut rects = Vec::new();
        greedy_rects(2, 2, &mask, |u, v, w, h, seed| rects.push((u, v, w, h, seed)));
        assert_eq!(rects, vec![(0, 0, 1, 1, 0), (1, 0, 1, 2, 1), (0, 1, 1, 1, 2)]);
    }

    #[test]
    fn config_defaults_from_empty_table() {
        let cfg: GreedyConfig = toml::from_str("").unwrap();
        assert!(cfg.absorb_culled);
        assert!(!cfg.single_opaque);
        assert_eq!(cfg.max_extent, 256);
    }
}
