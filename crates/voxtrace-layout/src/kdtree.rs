use byteorder::{ByteOrder, LittleEndian};
use serde::Deserialize;
use voxtrace_accel::{KdNodeKind, KdTree};

use crate::{EncodingError, check, index_or_neg, to_i16, to_i32, to_u8, to_u16};

pub const KD_NODE_SIZE: usize = 12;

/// Split word of a leaf node.
const LEAF_SPLIT: u16 = 0xFFFF;
const SPLIT_BITS: u32 = 14;

/// Integer width of the six ropes in a leaf record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RopeWidth {
    I16,
    #[default]
    I32,
}

impl RopeWidth {
    /// Bytes per leaf record: two `i32` plus six ropes.
    pub fn leaf_size(self) -> usize {
        match self {
            RopeWidth::I16 => 8 + 6 * 2,
            RopeWidth::I32 => 8 + 6 * 4,
        }
    }
}

/// Writes one 12-byte record per node.
///
/// `u8 min[3], pad, u8 (max - 1)[3], pad, u16 right child or leaf index,
/// u16 axis << 14 | split` (`0xFFFF` for leaves).
pub fn write_kd_nodes(out: &mut Vec<u8>, tree: &KdTree) -> Result<(), EncodingError> {
    out.reserve(tree.nodes.len() * KD_NODE_SIZE);
    for node in &tree.nodes {
        let b = node.bounds;
        let mut rec = [0u8; KD_NODE_SIZE];
        rec[0] = to_u8("min.x", b.min.x)?;
        rec[1] = to_u8("min.y", b.min.y)?;
        rec[2] = to_u8("min.z", b.min.z)?;
        rec[4] = to_u8("max.x", b.max.x - 1)?;
        rec[5] = to_u8("max.y", b.max.y - 1)?;
        rec[6] = to_u8("max.z", b.max.z - 1)?;
        let (link, split) = match node.kind {
            KdNodeKind::Internal { axis, split, left } => {
                let pos = check("split", split.into(), 0, (1 << SPLIT_BITS) - 1)? as u16;
                (
                    to_u16("right", left as i64 + 1)?,
                    ((axis.index() as u16) << SPLIT_BITS) | pos,
                )
            }
            KdNodeKind::Leaf { leaf } => (to_u16("leaf", leaf)?, LEAF_SPLIT),
        };
        LittleEndian::write_u16(&mut rec[8..10], link);
        LittleEndian::write_u16(&mut rec[10..12], split);
        out.extend_from_slice(&rec);
    }
    Ok(())
}

/// Writes one record per leaf: `i32 first, i32 count`, then the six ropes in
/// `-X, +X, -Y, +Y, -Z, +Z` order with `-1` for a missing neighbour.
pub fn write_kd_leaves(out: &mut Vec<u8>, tree: &KdTree, width: RopeWidth) -> Result<(), EncodingError> {
    out.reserve(tree.leaves.len() * width.leaf_size());
    for leaf in &tree.leaves {
        let mut head = [0u8; 8];
        LittleEndian::write_i32(&mut head[0..4], to_i32("first", leaf.first)?);
        LittleEndian::write_i32(&mut head[4..8], to_i32("count", leaf.count)?);
        out.extend_from_slice(&head);
        for rope in leaf.ropes {
            let r = index_or_neg("rope", rope)?;
            match width {
                RopeWidth::I16 => {
                    let mut b = [0u8; 2];
                    LittleEndian::write_i16(&mut b, to_i16("rope", r)?);
                    out.extend_from_slice(&b);
                }
                RopeWidth::I32 => {
                    let mut b = [0u8; 4];
                    LittleEndian::write_i32(&mut b, r);
                    out.extend_from_slice(&b);
                }
            }
        }
    }
    log::debug!(
        "kd-tree: wrote {} leaves with {:?} ropes ({} bytes each)",
        tree.leaves.len(),
        width,
        width.leaf_size()
    );
    Ok(())
}

/// Flattened primitive indices as `i32`.
pub fn write_indices(out: &mut Vec<u8>, indices: &[u32]) -> Result<(), EncodingError> {
    out.reserve(indices.len() * 4);
    for &i in indices {
        let mut b = [0u8; 4];
        LittleEndian::write_i32(&mut b, to_i32("index", i)?);
        out.extend_from_slice(&b);
    }
    Ok(())
}
