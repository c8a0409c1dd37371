use voxtrace_field::{CullMask, VoxelField};
use voxtrace_geom::{IVec3, Voxel};

use crate::GreedyConfig;

/// Merges the occupied cells of a field into non-overlapping boxes.
///
/// Scanning runs in z, y, x order. Each unvisited, occupied, non-culled cell seeds a
/// box that grows along x, then row by row along y, then slab by slab along z, as
/// long as every added cell is mergeable with the seed.
pub struct GreedyVoxels<'a> {
    field: &'a VoxelField,
    cull: &'a CullMask,
    cfg: &'a GreedyConfig,
}

struct Visited {
    bits: Vec<bool>,
    sx: usize,
    sy: usize,
}

impl Visited {
    fn new(field: &VoxelField) -> Self {
        Self {
            bits: vec![false; field.sx * field.sy * field.sz],
            sx: field.sx,
            sy: field.sy,
        }
    }

    #[inline]
    fn idx(&self, p: IVec3) -> usize {
        (p.z as usize * self.sy + p.y as usize) * self.sx + p.x as usize
    }

    #[inline]
    fn get(&self, p: IVec3) -> bool {
        self.bits[self.idx(p)]
    }

    #[inline]
    fn set(&mut self, p: IVec3) {
        let i = self.idx(p);
        self.bits[i] = true;
    }
}

impl<'a> GreedyVoxels<'a> {
    pub fn new(field: &'a VoxelField, cull: &'a CullMask, cfg: &'a GreedyConfig) -> Self {
        Self { field, cull, cfg }
    }

    #[inline]
    fn mergeable(&self, visited: &Visited, p: IVec3, seed_value: u8) -> bool {
        let v = self.field.get(p);
        if v == 0 || visited.get(p) {
            return false;
        }
        if self.cull.is_culled(p) {
            return self.cfg.absorb_culled;
        }
        self.cfg.single_opaque || v == seed_value
    }

    /// Runs the merge, handing every box to `emit`. Returns the number of boxes.
    pub fn merge(&self, mut emit: impl FnMut(Voxel)) -> usize {
        let f = self.field;
        let (sx, sy, sz) = (f.sx as i32, f.sy as i32, f.sz as i32);
        let cap = self.cfg.max_extent.max(1).min(i32::MAX as usize) as i32;
        let mut visited = Visited::new(f);
        let mut boxes = 0usize;
        let mut cells = 0usize;

        for z in 0..sz {
            for y in 0..sy {
                for x in 0..sx {
                    let seed = IVec3::new(x, y, z);
                    let value = f.get(seed);
                    if value == 0 || visited.get(seed) || self.cull.is_culled(seed) {
                        continue;
                    }

                    let mut ex = 1;
                    while ex < cap
                        && x + ex < sx
                        && self.mergeable(&visited, IVec3::new(x + ex, y, z), value)
                    {
                        ex += 1;
                    }

                    let mut ey = 1;
                    while ey < cap
                        && y + ey < sy
                        && (0..ex).all(|i| {
                            self.mergeable(&visited, IVec3::new(x + i, y + ey, z), value)
                        })
                    {
                        ey += 1;
                    }

                    let mut ez = 1;
                    while ez < cap
                        && z + ez < sz
                        && (0..ey).all(|j| {
                            (0..ex).all(|i| {
                                self.mergeable(&visited, IVec3::new(x + i, y + j, z + ez), value)
                            })
                        })
                    {
                        ez += 1;
                    }

                    for k in 0..ez {
                        for j in 0..ey {
                            for i in 0..ex {
                                visited.set(IVec3::new(x + i, y + j, z + k));
                            }
                        }
                    }
                    cells += (ex * ey * ez) as usize;
                    boxes += 1;
                    emit(Voxel::new(seed, IVec3::new(ex - 1, ey - 1, ez - 1), value));
                }
            }
        }

        log::debug!(
            "greedy voxels: {} cells -> {} boxes ({} culled)",
            cells,
            boxes,
            self.cull.culled_count()
        );
        boxes
    }

    pub fn merge_to_vec(&self) -> Vec<Voxel> {
        let mut out = Vec::new();
        self.merge(|v| out.push(v));
        out
    }
}
