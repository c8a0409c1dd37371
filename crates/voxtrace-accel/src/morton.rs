//! Linear BVH over primitives sorted along a Z-order curve.
//!
//! Primitives are keyed by the Morton code of their minimum corner, sorted, and
//! split recursively at the highest differing code bit. The resulting tree is
//! flattened breadth-first so siblings sit next to each other.

use std::collections::VecDeque;
use std::time::Instant;

use serde::Deserialize;
use voxtrace_geom::{Boundable, Box3i, IVec3};

#[derive(Clone, Debug, Deserialize)]
pub struct BvhConfig {
    /// Ranges of at most this many primitives become leaves.
    #[serde(default = "default_leaf_size")]
    pub leaf_size: usize,
}

fn default_leaf_size() -> usize {
    8
}

impl Default for BvhConfig {
    fn default() -> Self {
        Self {
            leaf_size: default_leaf_size(),
        }
    }
}

/// Spreads the low 21 bits of `v` so two zero bits separate each source bit.
#[inline]
pub fn expand_bits(v: u32) -> u64 {
    let mut v = v as u64 & 0x1F_FFFF;
    v = (v | (v << 32)) & 0x1F_0000_0000_FFFF;
    v = (v | (v << 16)) & 0x1F_0000_FF00_00FF;
    v = (v | (v << 8)) & 0x100F_00F0_0F00_F00F;
    v = (v | (v << 4)) & 0x10C3_0C30_C30C_30C3;
    v = (v | (v << 2)) & 0x1249_2492_4924_9249;
    v
}

/// 63-bit Morton code of a non-negative grid position. Bits above 21 per axis are dropped.
#[inline]
pub fn morton_code(p: IVec3) -> u64 {
    expand_bits(p.x as u32) | (expand_bits(p.y as u32) << 1) | (expand_bits(p.z as u32) << 2)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BvhNodeKind {
    /// Children are always adjacent: `right == left + 1`.
    Internal { left: u32, right: u32 },
    /// Range into [`MortonBvh::primitives`].
    Leaf { first: u32, count: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BvhNode {
    pub bounds: Box3i,
    pub parent: Option<u32>,
    pub kind: BvhNodeKind,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MortonBvh<T> {
    /// Breadth-first; the root is node 0.
    pub nodes: Vec<BvhNode>,
    /// `order[i]` is the input index of the i-th primitive in leaf order.
    pub order: Vec<u32>,
    pub primitives: Vec<T>,
}

enum BuildNode {
    Leaf {
        bounds: Box3i,
        first: usize,
        count: usize,
    },
    Internal {
        bounds: Box3i,
        left: Box<BuildNode>,
        right: Box<BuildNode>,
    },
}

impl BuildNode {
    fn bounds(&self) -> Box3i {
        match self {
            BuildNode::Leaf { bounds, .. } | BuildNode::Internal { bounds, .. } => *bounds,
        }
    }
}

struct Builder<'a> {
    keys: &'a [(u64, u32)],
    boxes: &'a [Box3i],
    leaf_size: usize,
}

impl Builder<'_> {
    fn build(&self, first: usize, last: usize) -> BuildNode {
        if last - first + 1 <= self.leaf_size {
            let bounds = self.keys[first..=last]
                .iter()
                .map(|&(_, i)| self.boxes[i as usize])
                .reduce(|a, b| a.union(&b))
                .unwrap_or(self.boxes[self.keys[first].1 as usize]);
            return BuildNode::Leaf {
                bounds,
                first,
                count: last - first + 1,
            };
        }
        let split = self.find_split(first, last);
        let left = self.build(first, split);
        let right = self.build(split + 1, last);
        BuildNode::Internal {
            bounds: left.bounds().union(&right.bounds()),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Last index of the left half of `[first, last]`.
    fn find_split(&self, first: usize, last: usize) -> usize {
        let first_code = self.keys[first].0;
        let last_code = self.keys[last].0;
        if first_code == last_code {
            return (first + last) / 2;
        }
        let prefix = (first_code ^ last_code).leading_zeros();
        let mut split = first;
        let mut step = last - first;
        loop {
            step = step.div_ceil(2);
            let probe = split + step;
            if probe < last && (first_code ^ self.keys[probe].0).leading_zeros() > prefix {
                split = probe;
            }
            if step <= 1 {
                break;
            }
        }
        split
    }
}

impl<T: Boundable + Clone> MortonBvh<T> {
    pub fn build(items: &[T], cfg: &BvhConfig) -> Self {
        let t0 = Instant::now();
        if items.is_empty() {
            return Self {
                nodes: Vec::new(),
                order: Vec::new(),
                primitives: Vec::new(),
            };
        }

        let boxes: Vec<Box3i> = items.iter().map(Boundable::bounds).collect();
        let origin = boxes
            .iter()
            .fold(boxes[0].min, |acc, b| acc.min(b.min));
        let mut keys: Vec<(u64, u32)> = boxes
            .iter()
            .enumerate()
            .map(|(i, b)| (morton_code(b.min - origin), i as u32))
            .collect();
        keys.sort_by_key(|&(code, _)| code);

        let builder = Builder {
            keys: &keys,
            boxes: &boxes,
            leaf_size: cfg.leaf_size.max(1),
        };
        let root = builder.build(0, keys.len() - 1);
        let nodes = linearize(&root);

        let order: Vec<u32> = keys.iter().map(|&(_, i)| i).collect();
        let primitives = order.iter().map(|&i| items[i as usize].clone()).collect();
        let bvh = Self {
            nodes,
            order,
            primitives,
        };
        log::info!(
            "morton bvh: {} primitives, {} nodes, {} leaves in {:.2?}",
            items.len(),
            bvh.nodes.len(),
            bvh.leaf_count(),
            t0.elapsed()
        );
        bvh
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n.kind, BvhNodeKind::Leaf { .. }))
            .count()
    }

    /// Primitives referenced by a leaf; empty for internal nodes.
    pub fn leaf_primitives(&self, node: u32) -> &[T] {
        match self.nodes[node as usize].kind {
            BvhNodeKind::Leaf { first, count } => {
                &self.primitives[first as usize..(first + count) as usize]
            }
            BvhNodeKind::Internal { .. } => &[],
        }
    }
}

fn linearize(root: &BuildNode) -> Vec<BvhNode> {
    let mut nodes = vec![BvhNode {
        bounds: root.bounds(),
        parent: None,
        kind: BvhNodeKind::Leaf { first: 0, count: 0 },
    }];
    let mut queue: VecDeque<(&BuildNode, usize)> = VecDeque::new();
    queue.push_back((root, 0));

    while let Some((node, index)) = queue.pop_front() {
        match node {
            BuildNode::Leaf { first, count, .. } => {
                nodes[index].kind = BvhNodeKind::Leaf {
                    first: *first as u32,
                    count: *count as u32,
                };
            }
            BuildNode::Internal { left, right, .. } => {
                let left_index = nodes.len();
                for child in [left, right] {
                    nodes.push(BvhNode {
                        bounds: child.bounds(),
                        parent: Some(index as u32),
                        kind: BvhNodeKind::Leaf { first: 0, count: 0 },
                    });
                }
                nodes[index].kind = BvhNodeKind::Internal {
                    left: left_index as u32,
                    right: left_index as u32 + 1,
                };
                queue.push_back((left.as_ref(), left_index));
                queue.push_back((right.as_ref(), left_index + 1));
            }
        }
    }
    nodes
}
