//! Flat little-endian GPU buffer layouts for the acceleration structures and
//! their primitive payloads.
//!
//! Every narrowing conversion is range-checked; a value that does not fit its
//! field fails with [`EncodingError::OutOfRange`] instead of wrapping.
#![forbid(unsafe_code)]

#[cfg(not(target_endian = "little"))]
compile_error!("GPU buffer layouts are written from little-endian hosts only");

mod bvh;
mod error;
mod kdtree;
mod payload;

pub use bvh::{BVH_NODE_SIZE, GpuBvhNode, gpu_bvh_nodes, write_bvh_nodes};
pub use error::EncodingError;
pub use kdtree::{KD_NODE_SIZE, RopeWidth, write_indices, write_kd_leaves, write_kd_nodes};
pub use payload::{
    FACE_SIZE, GpuTriangle, TRIANGLE_SIZE, VOXEL_SIZE, VoxelFormat, write_faces, write_triangles,
    write_voxels,
};

use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LayoutConfig {
    #[serde(default)]
    pub rope_width: RopeWidth,
    #[serde(default)]
    pub voxel_format: VoxelFormat,
}

impl LayoutConfig {
    /// Layout for a shader that can (or cannot) use 16-bit integers.
    pub fn for_shader_int16(int16: bool) -> Self {
        if int16 {
            Self {
                rope_width: RopeWidth::I16,
                voxel_format: VoxelFormat::Short,
            }
        } else {
            Self::default()
        }
    }
}

pub(crate) fn check(field: &'static str, value: i64, min: i64, max: i64) -> Result<i64, EncodingError> {
    if value < min || value > max {
        return Err(EncodingError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(value)
}

#[inline]
pub(crate) fn to_u8(field: &'static str, value: impl Into<i64>) -> Result<u8, EncodingError> {
    Ok(check(field, value.into(), 0, u8::MAX as i64)? as u8)
}

#[inline]
pub(crate) fn to_u16(field: &'static str, value: impl Into<i64>) -> Result<u16, EncodingError> {
    Ok(check(field, value.into(), 0, u16::MAX as i64)? as u16)
}

#[inline]
pub(crate) fn to_i16(field: &'static str, value: impl Into<i64>) -> Result<i16, EncodingError> {
    Ok(check(field, value.into(), i16::MIN as i64, i16::MAX as i64)? as i16)
}

#[inline]
pub(crate) fn to_i32(field: &'static str, value: impl Into<i64>) -> Result<i32, EncodingError> {
    Ok(check(field, value.into(), i32::MIN as i64, i32::MAX as i64)? as i32)
}

/// Index or `-1` for `None`.
#[inline]
pub(crate) fn index_or_neg(field: &'static str, index: Option<u32>) -> Result<i32, EncodingError> {
    index.map_or(Ok(-1), |i| to_i32(field, i))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrowing_reports_the_field() {
        assert_eq!(to_u8("x", 255).unwrap(), 255);
        assert_eq!(
            to_u8("x", 256),
            Err(EncodingError::OutOfRange {
                field: "x",
                value: 256,
                min: 0,
                max: 255
            })
        );
        assert_eq!(to_i16("rope", -1).unwrap(), -1);
        assert!(to_i16("rope", 40_000).is_err());
        assert!(to_u16("p", -1).is_err());
        assert_eq!(index_or_neg("rope", None).unwrap(), -1);
        assert!(index_or_neg("rope", Some(u32::MAX)).is_err());
    }

    #[test]
    fn layout_config_reads_lowercase_names() {
        let cfg: LayoutConfig = toml::from_str("rope_width = \"i16\"\nvoxel_format = \"short\"").unwrap();
        assert_eq!(cfg.rope_width, RopeWidth::I16);
        assert_eq!(cfg.voxel_format, VoxelFormat::Short);
        let cfg: LayoutConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.rope_width, RopeWidth::I32);
        assert_eq!(cfg.voxel_format, VoxelFormat::Byte);
    }
}
