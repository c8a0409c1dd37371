use voxtrace_accel::{BvhConfig, BvhNodeKind, KdNodeKind, KdTree, KdTreeConfig, MortonBvh};
use voxtrace_field::{VoxelField, cull};
use voxtrace_geom::{IVec3, Voxel};
use voxtrace_greedy::{GreedyConfig, GreedyVoxels};

fn solid_cube(n: usize) -> VoxelField {
    let mut field = VoxelField::new(n, n, n);
    field.fill_box(field.bounds(), 1);
    field
}

#[test]
fn solid_cube_builds_single_leaf_structures() {
    let field = solid_cube(4);
    let mask = cull(&field);
    let voxels = GreedyVoxels::new(&field, &mask, &GreedyConfig::default()).merge_to_vec();
    assert_eq!(voxels, vec![Voxel::new(IVec3::ZERO, IVec3::splat(3), 1)]);

    let kd = KdTree::build(&voxels, field.bounds(), &KdTreeConfig::default());
    assert_eq!(kd.nodes.len(), 1);
    assert_eq!(kd.nodes[0].kind, KdNodeKind::Leaf { leaf: 0 });
    assert_eq!(kd.leaves[0].ropes, [None; 6]);
    assert_eq!(kd.leaf_primitives(0), &[0]);

    let bvh = MortonBvh::build(&voxels, &BvhConfig::default());
    assert_eq!(bvh.nodes.len(), 1);
    assert_eq!(bvh.nodes[0].kind, BvhNodeKind::Leaf { first: 0, count: 1 });
    assert_eq!(bvh.nodes[0].parent, None);
}

#[test]
fn unmerged_cells_split_the_cube() {
    let field = solid_cube(4);
    let cells: Vec<Voxel> = field.occupied().map(|(p, v)| Voxel::cell(p, v)).collect();
    assert_eq!(cells.len(), 64);

    let kd = KdTree::build(&cells, field.bounds(), &KdTreeConfig::default());
    assert!(kd.leaves.len() >= 16);
    assert!(kd.leaves.iter().all(|l| l.count <= 4));

    let bvh = MortonBvh::build(&cells, &BvhConfig::default());
    // 64 cells in Morton order form eight 2x2x2 blocks.
    assert_eq!(bvh.leaf_count(), 8);
    for node in &bvh.nodes {
        if let BvhNodeKind::Leaf { .. } = node.kind {
            assert_eq!(node.bounds.size(), IVec3::splat(2));
        }
    }
}
