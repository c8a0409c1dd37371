use bytemuck::{Pod, Zeroable};
use voxtrace_accel::{BvhNodeKind, MortonBvh};
use voxtrace_geom::IVec3;

use crate::{EncodingError, check, index_or_neg, to_i32};

pub const BVH_NODE_SIZE: usize = 48;

/// Largest grid coordinate an `f32` holds exactly.
const F32_EXACT: i64 = 1 << 24;

/// GPU BVH node (48 bytes).
///
/// Leaf: `left = right = -1`, `first`/`count` give the primitive range.
/// Internal: `first = -1`, `count = 0`. The root's `parent` is `-1`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuBvhNode {
    pub min: [f32; 3],
    pub left: i32,
    pub max: [f32; 3],
    pub right: i32,
    pub parent: i32,
    pub first: i32,
    pub count: i32,
    pub _pad: i32,
}

fn corner(p: IVec3) -> Result<[f32; 3], EncodingError> {
    let mut out = [0.0; 3];
    for (o, v) in out.iter_mut().zip([p.x, p.y, p.z]) {
        *o = check("bounds", v.into(), -F32_EXACT, F32_EXACT)? as f32;
    }
    Ok(out)
}

/// Converts a BVH into its GPU node array.
pub fn gpu_bvh_nodes<T>(bvh: &MortonBvh<T>) -> Result<Vec<GpuBvhNode>, EncodingError> {
    bvh.nodes
        .iter()
        .map(|n| {
            let (left, right, first, count) = match n.kind {
                BvhNodeKind::Internal { left, right } => {
                    (to_i32("left", left)?, to_i32("right", right)?, -1, 0)
                }
                BvhNodeKind::Leaf { first, count } => {
                    (-1, -1, to_i32("first", first)?, to_i32("count", count)?)
                }
            };
            Ok(GpuBvhNode {
                min: corner(n.bounds.min)?,
                left,
                max: corner(n.bounds.max)?,
                right,
                parent: index_or_neg("parent", n.parent)?,
                first,
                count,
                _pad: 0,
            })
        })
        .collect()
}

pub fn write_bvh_nodes<T>(out: &mut Vec<u8>, bvh: &MortonBvh<T>) -> Result<(), EncodingError> {
    let nodes = gpu_bvh_nodes(bvh)?;
    out.extend_from_slice(bytemuck::cast_slice(&nodes));
    log::debug!("bvh: wrote {} nodes ({} bytes)", nodes.len(), nodes.len() * BVH_NODE_SIZE);
    Ok(())
}
