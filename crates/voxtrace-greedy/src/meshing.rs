use voxtrace_field::VoxelField;
use voxtrace_geom::{Boundable, Box3i, IVec3, Side, Triangle, Vec3};

use crate::{GreedyConfig, greedy_rects};

/// A merged rectangle of visible cell faces.
///
/// The rectangle lies in the plane `p` along `side.axis()` and spans the half-open
/// range `[u0, u1) x [v0, v1)` on the side's tangent axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Face {
    pub side: Side,
    pub p: i32,
    pub u0: i32,
    pub v0: i32,
    pub u1: i32,
    pub v1: i32,
    pub value: u8,
    /// Occupancy of the eight cells around the face in the layer just outside it.
    pub neighbors: u8,
    /// Lightmap texel origin, filled by [`crate::pack_lightmap`].
    pub tx: u32,
    pub ty: u32,
}

impl Face {
    #[inline]
    pub fn width(&self) -> i32 {
        self.u1 - self.u0
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.v1 - self.v0
    }

    /// Coordinate of the layer of cells this face belongs to.
    #[inline]
    pub fn owner_layer(&self) -> i32 {
        if self.side.is_positive() {
            self.p - 1
        } else {
            self.p
        }
    }

    /// Rectangle corners, counter-clockwise seen from outside the solid.
    pub fn corners(&self) -> [Vec3; 4] {
        let axis = self.side.axis();
        let (u, v) = axis.tangents();
        let at = |cu, cv| {
            IVec3::ZERO
                .with(axis, self.p)
                .with(u, cu)
                .with(v, cv)
                .to_vec3()
        };
        let ring = [
            at(self.u0, self.v0),
            at(self.u1, self.v0),
            at(self.u1, self.v1),
            at(self.u0, self.v1),
        ];
        if self.side.is_positive() {
            ring
        } else {
            [ring[0], ring[3], ring[2], ring[1]]
        }
    }

    /// The face split along its `(u0, v0)-(u1, v1)` diagonal, material from `value`.
    pub fn triangles(&self) -> [Triangle; 2] {
        let [a, b, c, d] = self.corners();
        let m = self.value as u32;
        [Triangle::new(a, b, c, m), Triangle::new(a, c, d, m)]
    }
}

impl Boundable for Face {
    /// The cells that own the face, so the box is never flat.
    fn bounds(&self) -> Box3i {
        let axis = self.side.axis();
        let (u, v) = axis.tangents();
        let layer = self.owner_layer();
        let min = IVec3::ZERO
            .with(axis, layer)
            .with(u, self.u0)
            .with(v, self.v0);
        let max = IVec3::ZERO
            .with(axis, layer + 1)
            .with(u, self.u1)
            .with(v, self.v1);
        Box3i::new(min, max)
    }
}

/// Eight-bit occupancy ring around `outside`, the cell just past a face on `side`.
///
/// Bit order walks the ring: `-u-v, -v, +u-v, +u, +u+v, +v, -u+v, -u`.
pub fn neighbor_mask(field: &VoxelField, outside: IVec3, side: Side) -> u8 {
    const RING: [(i32, i32); 8] = [
        (-1, -1),
        (0, -1),
        (1, -1),
        (1, 0),
        (1, 1),
        (0, 1),
        (-1, 1),
        (-1, 0),
    ];
    let (u, v) = side.axis().tangents();
    let mut mask = 0u8;
    for (bit, (du, dv)) in RING.iter().enumerate() {
        let c = outside
            .with(u, outside.get(u) + du)
            .with(v, outside.get(v) + dv);
        if field.is_occupied(c) {
            mask |= 1 << bit;
        }
    }
    mask
}

/// Merges the visible faces of a field into maximal rectangles, one slice at a time.
pub struct GreedyMeshing<'a> {
    field: &'a VoxelField,
    cfg: &'a GreedyConfig,
}

impl<'a> GreedyMeshing<'a> {
    pub fn new(field: &'a VoxelField, cfg: &'a GreedyConfig) -> Self {
        Self { field, cfg }
    }

    pub fn mesh(&self, mut emit: impl FnMut(Face)) -> usize {
        let f = self.field;
        let dims = IVec3::new(f.sx as i32, f.sy as i32, f.sz as i32);
        let mut faces = 0usize;
        let mut cells = 0usize;

        for side in Side::ALL {
            let n = side.axis();
            let (u, v) = n.tangents();
            let (du, dv) = (dims.get(u) as usize, dims.get(v) as usize);
            let mut mask: Vec<Option<(u8, u8)>> = vec![None; du * dv];
            let mut values = vec![0u8; du * dv];

            for layer in 0..dims.get(n) {
                for j in 0..dv {
                    for i in 0..du {
                        let c = IVec3::ZERO
                            .with(n, layer)
                            .with(u, i as i32)
                            .with(v, j as i32);
                        let idx = j * du + i;
                        let value = f.get(c);
                        let outside = c + side.delta();
                        if value == 0 || f.is_occupied(outside) {
                            mask[idx] = None;
                            continue;
                        }
                        let key = if self.cfg.single_opaque { 1 } else { value };
                        let ring = if self.cfg.ambient_occlusion {
                            neighbor_mask(f, outside, side)
                        } else {
                            0
                        };
                        mask[idx] = Some((key, ring));
                        values[idx] = value;
                        cells += 1;
                    }
                }

                let p = if side.is_positive() { layer + 1 } else { layer };
                greedy_rects(du, dv, &mask, |u0, v0, w, h, seed| {
                    let neighbors = mask[seed].map_or(0, |(_, ring)| ring);
                    faces += 1;
                    emit(Face {
                        side,
                        p,
                        u0: u0 as i32,
                        v0: v0 as i32,
                        u1: (u0 + w) as i32,
                        v1: (v0 + h) as i32,
                        value: values[seed],
                        neighbors,
                        tx: 0,
                        ty: 0,
                    });
                });
            }
        }

        log::debug!("greedy meshing: {} cell faces -> {} rects", cells, faces);
        faces
    }

    pub fn mesh_to_vec(&self) -> Vec<Face> {
        let mut out = Vec::new();
        self.mesh(|face| out.push(face));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_cube_gives_one_face_per_side() {
        let mut f = VoxelField::new(4, 4, 4);
        f.fill_box(f.bounds(), 2);
        let cfg = GreedyConfig::default();
        let faces = GreedyMeshing::new(&f, &cfg).mesh_to_vec();
        assert_eq!(faces.len(), 6);
        for face in &faces {
            assert_eq!((face.width(), face.height()), (4, 4));
            assert_eq!(face.p, if face.side.is_positive() { 4 } else { 0 });
            assert_eq!(face.neighbors, 0);
            assert_eq!(face.value, 2);
        }
    }

    #[test]
    fn face_bounds_use_the_owning_cell() {
        let mut f = VoxelField::new(1, 1, 1);
        f.set(0, 0, 0, 1);
        let cfg = GreedyConfig::default();
        for face in GreedyMeshing::new(&f, &cfg).mesh_to_vec() {
            assert_eq!(face.bounds(), Box3i::cell(IVec3::ZERO));
        }
    }

    #[test]
    fn triangles_face_outwards() {
        let mut f = VoxelField::new(2, 3, 1);
        f.fill_box(f.bounds(), 4);
        let cfg = GreedyConfig::default();
        for face in GreedyMeshing::new(&f, &cfg).mesh_to_vec() {
            let outward = face.side.delta().to_vec3();
            let area: f32 = face
                .triangles()
                .iter()
                .map(|t| {
                    assert_eq!(t.material, 4);
                    let n = (t.v[1] - t.v[0]).cross(t.v[2] - t.v[0]);
                    assert!(n.dot(outward) > 0.0, "{face:?}");
                    n.length() * 0.5
                })
                .sum();
            assert_eq!(area, (face.width() * face.height()) as f32);
        }
    }

    #[test]
    fn neighbour_masks_break_merges() {
        // Floor of 3x1x3 with a post on the middle cell of the top face.
        let mut f = VoxelField::new(3, 2, 3);
        f.fill_box(Box3i::new(IVec3::ZERO, IVec3::new(3, 1, 3)), 1);
        f.set(1, 1, 1, 1);
        let cfg = GreedyConfig::default();
        let tops: Vec<Face> = GreedyMeshing::new(&f, &cfg)
            .mesh_to_vec()
            .into_iter()
            .filter(|face| face.side == Side::PosY && face.p == 1)
            .collect();
        // Eight floor cells around the post, each with a different ring.
        assert_eq!(tops.len(), 8);

        let flat = GreedyConfig {
            ambient_occlusion: false,
            ..GreedyConfig::default()
        };
        let tops = GreedyMeshing::new(&f, &flat)
            .mesh_to_vec()
            .into_iter()
            .filter(|face| face.side == Side::PosY && face.p == 1)
            .count();
        // The ring around the post needs four rectangles.
        assert_eq!(tops, 4);
    }

    #[test]
    fn ring_bits_follow_tangent_order() {
        let mut f = VoxelField::new(3, 2, 3);
        // PosY tangents are (Z, X); the -u-v neighbour of (1,1,1) is (0,1,0).
        f.set(0, 1, 0, 1);
        f.set(1, 1, 2, 1);
        let m = neighbor_mask(&f, IVec3::new(1, 1, 1), Side::PosY);
        // (x=0,z=0) is u=-1,v=-1 -> bit 0; (x=1,z=2) is u=+1,v=0 -> bit 3.
        assert_eq!(m, 0b0000_1001);
    }
}
