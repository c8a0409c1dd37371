//! Spatial kd-tree whose leaves carry ropes to their face neighbours.
//!
//! Node bounds are the cells of the subdivision, so two siblings always meet on
//! their split plane. Each leaf stores, per side, the smallest node whose cell
//! covers the whole leaf face on the far side of that plane. A GPU traversal
//! can then walk from leaf to leaf without a stack: exit the leaf through the
//! nearest face, follow the rope, and descend to the leaf holding the exit point.

use std::collections::VecDeque;
use std::time::Instant;

use serde::Deserialize;
use voxtrace_geom::{Aabb, Axis, Boundable, Box3i, Side, Vec3};

use crate::Ray;

#[derive(Clone, Debug, Deserialize)]
pub struct KdTreeConfig {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Cells holding at most this many primitives are not split further.
    #[serde(default = "default_max_leaf_primitives")]
    pub max_leaf_primitives: usize,
}

fn default_max_depth() -> usize {
    16
}
fn default_max_leaf_primitives() -> usize {
    4
}

impl Default for KdTreeConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_leaf_primitives: default_max_leaf_primitives(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KdNodeKind {
    /// Cells below `split` on `axis` go to `left`; the right child is `left + 1`.
    Internal { axis: Axis, split: i32, left: u32 },
    Leaf { leaf: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KdNode {
    pub bounds: Box3i,
    pub kind: KdNodeKind,
}

impl KdNode {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, KdNodeKind::Leaf { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KdLeaf {
    pub node: u32,
    pub first: u32,
    pub count: u32,
    /// Neighbour node per side, in [`Side`] order. `None` on the scene boundary.
    pub ropes: [Option<u32>; 6],
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KdHit {
    pub primitive: u32,
    pub t: f32,
    pub leaf: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KdTree {
    pub bounds: Box3i,
    /// Breadth-first; the root is node 0.
    pub nodes: Vec<KdNode>,
    /// Breadth-first leaf order.
    pub leaves: Vec<KdLeaf>,
    /// Input primitive indices, one contiguous range per leaf.
    pub indices: Vec<u32>,
}

enum BuildNode {
    Leaf {
        bounds: Box3i,
        prims: Vec<u32>,
    },
    Internal {
        bounds: Box3i,
        axis: Axis,
        split: i32,
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
    boxes: &'a [Box3i],
    cfg: &'a KdTreeConfig,
}

impl Builder<'_> {
    fn build(&self, cell: Box3i, prims: Vec<u32>, depth: usize) -> BuildNode {
        if prims.len() <= self.cfg.max_leaf_primitives || depth >= self.cfg.max_depth {
            return BuildNode::Leaf {
                bounds: cell,
                prims,
            };
        }
        for axis in cell.axes_by_extent() {
            let Some(split) = self.median_edge(cell, &prims, axis) else {
                continue;
            };
            let left: Vec<u32> = prims
                .iter()
                .copied()
                .filter(|&p| self.boxes[p as usize].min.get(axis) < split)
                .collect();
            let right: Vec<u32> = prims
                .iter()
                .copied()
                .filter(|&p| self.boxes[p as usize].max.get(axis) > split)
                .collect();
            if left.len() == prims.len() && right.len() == prims.len() {
                continue;
            }
            let (lc, rc) = cell.split(axis, split);
            return BuildNode::Internal {
                bounds: cell,
                axis,
                split,
                left: Box::new(self.build(lc, left, depth + 1)),
                right: Box::new(self.build(rc, right, depth + 1)),
            };
        }
        BuildNode::Leaf {
            bounds: cell,
            prims,
        }
    }

    /// Median primitive edge strictly inside the cell on `axis`.
    fn median_edge(&self, cell: Box3i, prims: &[u32], axis: Axis) -> Option<i32> {
        let (lo, hi) = (cell.min.get(axis), cell.max.get(axis));
        let mut edges: Vec<i32> = prims
            .iter()
            .flat_map(|&p| {
                let b = self.boxes[p as usize];
                [b.min.get(axis), b.max.get(axis)]
            })
            .filter(|&e| e > lo && e < hi)
            .collect();
        if edges.is_empty() {
            return None;
        }
        edges.sort_unstable();
        Some(edges[edges.len() / 2])
    }
}

impl KdTree {
    /// Builds over the primitives that overlap `bounds`; the rest are ignored.
    pub fn build<T: Boundable>(items: &[T], bounds: Box3i, cfg: &KdTreeConfig) -> Self {
        let t0 = Instant::now();
        let boxes: Vec<Box3i> = items.iter().map(Boundable::bounds).collect();
        let prims: Vec<u32> = (0..boxes.len() as u32)
            .filter(|&i| boxes[i as usize].overlaps(&bounds))
            .collect();
        if prims.len() < boxes.len() {
            log::warn!(
                "kd-tree: {} primitives lie outside the scene bounds",
                boxes.len() - prims.len()
            );
        }
        let root = Builder { boxes: &boxes, cfg }.build(bounds, prims, 0);
        let mut tree = linearize(&root);
        tree.connect_ropes();
        log::info!(
            "kd-tree: {} primitives, {} nodes, {} leaves, {} references in {:.2?}",
            items.len(),
            tree.nodes.len(),
            tree.leaves.len(),
            tree.indices.len(),
            t0.elapsed()
        );
        tree
    }

    /// Primitive indices referenced by a leaf.
    pub fn leaf_primitives(&self, leaf: u32) -> &[u32] {
        let l = &self.leaves[leaf as usize];
        &self.indices[l.first as usize..(l.first + l.count) as usize]
    }

    fn connect_ropes(&mut self) {
        let mut stack = vec![(0u32, [None::<u32>; 6])];
        while let Some((node, ropes)) = stack.pop() {
            match self.nodes[node as usize].kind {
                KdNodeKind::Internal { axis, left, .. } => {
                    let right = left + 1;
                    let mut left_ropes = ropes;
                    left_ropes[Side::new(axis, true).index()] = Some(right);
                    let mut right_ropes = ropes;
                    right_ropes[Side::new(axis, false).index()] = Some(left);
                    stack.push((right, right_ropes));
                    stack.push((left, left_ropes));
                }
                KdNodeKind::Leaf { leaf } => {
                    let face = self.nodes[node as usize].bounds;
                    let mut tight = [None; 6];
                    for side in Side::ALL {
                        tight[side.index()] =
                            ropes[side.index()].map(|target| self.tighten(target, side, face));
                    }
                    self.leaves[leaf as usize].ropes = tight;
                }
            }
        }
    }

    /// Walks down from `target` while a single child still covers the leaf face.
    fn tighten(&self, mut target: u32, side: Side, leaf: Box3i) -> u32 {
        loop {
            let KdNodeKind::Internal { axis, split, left } = self.nodes[target as usize].kind
            else {
                return target;
            };
            if axis == side.axis() {
                // The near child touches the face plane.
                target = if side.is_positive() { left } else { left + 1 };
            } else if leaf.max.get(axis) <= split {
                target = left;
            } else if leaf.min.get(axis) >= split {
                target = left + 1;
            } else {
                return target;
            }
        }
    }

    /// Descends from `node` to the leaf whose cell holds `p`. Points on a split
    /// plane go to the side `dir` points into.
    fn descend(&self, mut node: u32, p: Vec3, dir: Vec3) -> (u32, u32) {
        loop {
            match self.nodes[node as usize].kind {
                KdNodeKind::Leaf { leaf } => return (node, leaf),
                KdNodeKind::Internal { axis, split, left } => {
                    let s = split as f32;
                    let x = p.get(axis);
                    let go_right = x > s || (x == s && dir.get(axis) >= 0.0);
                    node = if go_right { left + 1 } else { left };
                }
            }
        }
    }

    /// Leaf whose half-open cell contains `p`, if `p` is inside the tree bounds.
    pub fn locate(&self, p: Vec3) -> Option<u32> {
        let b = Aabb::from(self.bounds);
        let inside = Axis::ALL
            .iter()
            .all(|&a| p.get(a) >= b.min.get(a) && p.get(a) < b.max.get(a));
        if !inside || self.nodes.is_empty() {
            return None;
        }
        Some(self.descend(0, p, Vec3::splat(1.0)).1)
    }

    /// Stackless rope traversal, as a GPU shader walks the serialized tree.
    ///
    /// `hit` is asked for the ray distance to a primitive (by input index). Only
    /// hits inside the current leaf's span of the ray are accepted, so the first
    /// leaf that reports one holds the nearest hit.
    pub fn trace(&self, ray: &Ray, mut hit: impl FnMut(u32) -> Option<f32>) -> Option<KdHit> {
        const EPS: f32 = 1e-4;
        if self.nodes.is_empty() {
            return None;
        }
        let (t_enter, t_leave) = ray.intersect_box(&Aabb::from(self.bounds))?;
        if t_leave < 0.0 {
            return None;
        }
        let mut t = t_enter.max(0.0);
        let (mut node, mut leaf) = self.descend(0, ray.at(t), ray.dir);
        // Each step crosses a leaf face in the ray direction; the cap only trips on
        // float drift near corners.
        let max_steps = 2 * self.leaves.len() + 8;

        for _ in 0..max_steps {
            let (t_exit, exit_side) = exit_face(ray, &self.nodes[node as usize].bounds);
            let mut best: Option<(u32, f32)> = None;
            for &prim in self.leaf_primitives(leaf) {
                if let Some(th) = hit(prim) {
                    let in_span = th >= t - EPS && th <= t_exit + EPS;
                    if in_span && best.is_none_or(|(_, bt)| th < bt) {
                        best = Some((prim, th));
                    }
                }
            }
            if let Some((primitive, t)) = best {
                return Some(KdHit { primitive, t, leaf });
            }
            let next = self.leaves[leaf as usize].ropes[exit_side?.index()]?;
            t = t.max(t_exit);
            (node, leaf) = self.descend(next, ray.at(t), ray.dir);
        }
        log::warn!("kd-tree trace: step limit reached");
        None
    }

    pub fn depth(&self) -> usize {
        fn walk(tree: &KdTree, node: u32) -> usize {
            match tree.nodes[node as usize].kind {
                KdNodeKind::Leaf { .. } => 1,
                KdNodeKind::Internal { left, .. } => 1 + walk(tree, left).max(walk(tree, left + 1)),
            }
        }
        if self.nodes.is_empty() { 0 } else { walk(self, 0) }
    }
}

/// Distance to and side of the face where `ray` leaves `cell`. `None` side for a
/// zero direction.
fn exit_face(ray: &Ray, cell: &Box3i) -> (f32, Option<Side>) {
    let b = Aabb::from(*cell);
    let mut best = (f32::INFINITY, None);
    for axis in Axis::ALL {
        let d = ray.dir.get(axis);
        let o = ray.origin.get(axis);
        let candidate = if d > 0.0 {
            ((b.max.get(axis) - o) / d, Side::new(axis, true))
        } else if d < 0.0 {
            ((b.min.get(axis) - o) / d, Side::new(axis, false))
        } else {
            continue;
        };
        if candidate.0 < best.0 {
            best = (candidate.0, Some(candidate.1));
        }
    }
    best
}

fn linearize(root: &BuildNode) -> KdTree {
    let mut tree = KdTree {
        bounds: root.bounds(),
        nodes: vec![KdNode {
            bounds: root.bounds(),
            kind: KdNodeKind::Leaf { leaf: 0 },
        }],
        leaves: Vec::new(),
        indices: Vec::new(),
    };
    let mut queue: VecDeque<(&BuildNode, usize)> = VecDeque::new();
    queue.push_back((root, 0));

    while let Some((node, index)) = queue.pop_front() {
        match node {
            BuildNode::Leaf { prims, .. } => {
                let leaf = tree.leaves.len() as u32;
                tree.leaves.push(KdLeaf {
                    node: index as u32,
                    first: tree.indices.len() as u32,
                    count: prims.len() as u32,
                    ropes: [None; 6],
                });
                tree.indices.extend_from_slice(prims);
                tree.nodes[index].kind = KdNodeKind::Leaf { leaf };
            }
            BuildNode::Internal {
                axis,
                split,
                left,
                right,
                ..
            } => {
                let left_index = tree.nodes.len();
                for child in [left, right] {
                    tree.nodes.push(KdNode {
                        bounds: child.bounds(),
                        kind: KdNodeKind::Leaf { leaf: 0 },
                    });
                }
                tree.nodes[index].kind = KdNodeKind::Internal {
                    axis: *axis,
                    split: *split,
                    left: left_index as u32,
                };
                queue.push_back((left.as_ref(), left_index));
                queue.push_back((right.as_ref(), left_index + 1));
            }
        }
    }
    tree
}
