//! Acceleration structures over boundable primitives: a Morton-ordered BVH and a
//! stackless kd-tree whose leaves are linked by ropes.
#![forbid(unsafe_code)]

pub mod kdtree;
pub mod morton;
mod ray;

pub use kdtree::{KdHit, KdLeaf, KdNode, KdNodeKind, KdTree, KdTreeConfig};
pub use morton::{BvhConfig, BvhNode, BvhNodeKind, MortonBvh, expand_bits, morton_code};
pub use ray::Ray;
