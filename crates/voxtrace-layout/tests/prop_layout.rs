mod common;

use proptest::prelude::*;

use common::{read_kd_leaves, read_kd_nodes};
use voxtrace_accel::{BvhConfig, KdTree, KdTreeConfig, MortonBvh};
use voxtrace_geom::{Box3i, IVec3, Voxel};
use voxtrace_layout::{RopeWidth, write_bvh_nodes, write_indices, write_kd_leaves, write_kd_nodes};

fn cells() -> impl Strategy<Value = Vec<Voxel>> {
    prop::collection::btree_set((0i32..12, 0i32..12, 0i32..12), 1..64).prop_map(|set| {
        set.into_iter()
            .map(|(x, y, z)| Voxel::cell(IVec3::new(x, y, z), 1))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn written_ropes_index_face_adjacent_nodes(voxels in cells(), leaf_prims in 1usize..6) {
        let bounds = Box3i::new(IVec3::ZERO, IVec3::splat(12));
        let cfg = KdTreeConfig { max_leaf_primitives: leaf_prims, ..KdTreeConfig::default() };
        let tree = KdTree::build(&voxels, bounds, &cfg);

        let mut nodes = Vec::new();
        let mut leaves = Vec::new();
        write_kd_nodes(&mut nodes, &tree).unwrap();
        write_kd_leaves(&mut leaves, &tree, RopeWidth::I16).unwrap();
        let nodes = read_kd_nodes(&nodes);
        let leaves = read_kd_leaves(&leaves, true);
        prop_assert_eq!(leaves.len(), tree.leaves.len());

        let cell_box = |i: usize| {
            let n = &nodes[i];
            Box3i::new(
                IVec3::new(n.min[0] as i32, n.min[1] as i32, n.min[2] as i32),
                IVec3::new(n.max_incl[0] as i32 + 1, n.max_incl[1] as i32 + 1, n.max_incl[2] as i32 + 1),
            )
        };
        for (li, rec) in leaves.iter().enumerate() {
            let own = cell_box(tree.leaves[li].node as usize);
            for (face, &rope) in rec.ropes.iter().enumerate() {
                let side = voxtrace_geom::Side::from_index(face).unwrap();
                if rope < 0 {
                    prop_assert_eq!(own.plane(side), bounds.plane(side));
                } else {
                    prop_assert!((rope as usize) < nodes.len());
                    prop_assert!(own.is_face_adjacent(&cell_box(rope as usize), side));
                }
            }
        }
    }

    #[test]
    fn rebuilding_writes_identical_bytes(voxels in cells(), leaf_prims in 1usize..6) {
        let bounds = Box3i::new(IVec3::ZERO, IVec3::splat(12));
        let cfg = KdTreeConfig { max_leaf_primitives: leaf_prims, ..KdTreeConfig::default() };
        let serialize = || {
            let tree = KdTree::build(&voxels, bounds, &cfg);
            let bvh = MortonBvh::build(&voxels, &BvhConfig::default());
            let mut bytes = Vec::new();
            write_kd_nodes(&mut bytes, &tree).unwrap();
            write_kd_leaves(&mut bytes, &tree, RopeWidth::I32).unwrap();
            write_indices(&mut bytes, &tree.indices).unwrap();
            write_bvh_nodes(&mut bytes, &bvh).unwrap();
            bytes
        };
        prop_assert_eq!(serialize(), serialize());
    }
}
