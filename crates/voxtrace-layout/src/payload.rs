use byteorder::{ByteOrder, LittleEndian};
use bytemuck::{Pod, Zeroable};
use serde::Deserialize;
use voxtrace_field::Palette;
use voxtrace_geom::{IVec3, Triangle, Voxel};
use voxtrace_greedy::Face;

use crate::{EncodingError, to_i16, to_u8, to_u16};

pub const VOXEL_SIZE: usize = 8;
pub const FACE_SIZE: usize = 20;
pub const TRIANGLE_SIZE: usize = 48;

/// Voxel record flavour, picked by whether the shader has 16-bit integers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoxelFormat {
    /// `i16 x, y, z, u16 rgb555`. Single cells only.
    Short,
    /// `u8 x, y, z, palette; u8 ex, ey, ez, pad`.
    #[default]
    Byte,
}

pub fn write_voxels(
    out: &mut Vec<u8>,
    voxels: &[Voxel],
    format: VoxelFormat,
    palette: &Palette,
) -> Result<(), EncodingError> {
    out.reserve(voxels.len() * VOXEL_SIZE);
    for v in voxels {
        let mut rec = [0u8; VOXEL_SIZE];
        let IVec3 { x, y, z } = v.origin;
        match format {
            VoxelFormat::Short => {
                if v.extents != IVec3::ZERO {
                    return Err(EncodingError::ExtentsInShortFormat { x, y, z });
                }
                LittleEndian::write_i16(&mut rec[0..2], to_i16("x", x)?);
                LittleEndian::write_i16(&mut rec[2..4], to_i16("y", y)?);
                LittleEndian::write_i16(&mut rec[4..6], to_i16("z", z)?);
                LittleEndian::write_u16(&mut rec[6..8], palette.rgb555(v.value));
            }
            VoxelFormat::Byte => {
                rec[0] = to_u8("x", x)?;
                rec[1] = to_u8("y", y)?;
                rec[2] = to_u8("z", z)?;
                rec[3] = v.value;
                rec[4] = to_u8("ex", v.extents.x)?;
                rec[5] = to_u8("ey", v.extents.y)?;
                rec[6] = to_u8("ez", v.extents.z)?;
            }
        }
        out.extend_from_slice(&rec);
    }
    Ok(())
}

/// `u8 side, neighbors, value, pad; u16 p, u0, v0, u1, v1, tx, ty, pad`.
pub fn write_faces(out: &mut Vec<u8>, faces: &[Face]) -> Result<(), EncodingError> {
    out.reserve(faces.len() * FACE_SIZE);
    for f in faces {
        let mut rec = [0u8; FACE_SIZE];
        rec[0] = f.side.index() as u8;
        rec[1] = f.neighbors;
        rec[2] = f.value;
        let words = [
            to_u16("p", f.p)?,
            to_u16("u0", f.u0)?,
            to_u16("v0", f.v0)?,
            to_u16("u1", f.u1)?,
            to_u16("v1", f.v1)?,
            to_u16("tx", f.tx)?,
            to_u16("ty", f.ty)?,
            0,
        ];
        LittleEndian::write_u16_into(&words, &mut rec[4..]);
        out.extend_from_slice(&rec);
    }
    Ok(())
}

/// GPU triangle (48 bytes): three vertices, each padded to 16 bytes, the first
/// pad slot holding the material id.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuTriangle {
    pub v0: [f32; 3],
    pub material: u32,
    pub v1: [f32; 3],
    pub _pad0: u32,
    pub v2: [f32; 3],
    pub _pad1: u32,
}

impl From<&Triangle> for GpuTriangle {
    fn from(t: &Triangle) -> Self {
        let [a, b, c] = t.v;
        Self {
            v0: [a.x, a.y, a.z],
            material: t.material,
            v1: [b.x, b.y, b.z],
            _pad0: 0,
            v2: [c.x, c.y, c.z],
            _pad1: 0,
        }
    }
}

pub fn write_triangles(out: &mut Vec<u8>, triangles: &[Triangle]) {
    let gpu: Vec<GpuTriangle> = triangles.iter().map(GpuTriangle::from).collect();
    out.extend_from_slice(bytemuck::cast_slice(&gpu));
}
