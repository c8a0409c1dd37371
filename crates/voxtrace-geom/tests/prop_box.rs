use proptest::prelude::*;
use proptest::strategy::Strategy;
use voxtrace_geom::{Aabb, Axis, Boundable, Box3i, IVec3, Side, Triangle, Vec3, Voxel};

fn coord() -> impl Strategy<Value = i32> {
    -64i32..64
}

fn arb_ivec3() -> impl Strategy<Value = IVec3> {
    (coord(), coord(), coord()).prop_map(|(x, y, z)| IVec3::new(x, y, z))
}

fn arb_box() -> impl Strategy<Value = Box3i> {
    (arb_ivec3(), 1i32..16, 1i32..16, 1i32..16)
        .prop_map(|(min, sx, sy, sz)| Box3i::new(min, min + IVec3::new(sx, sy, sz)))
}

fn arb_axis() -> impl Strategy<Value = Axis> {
    (0usize..3).prop_map(|i| Axis::from_index(i).unwrap())
}

proptest! {
    // Union contains both operands
    #[test]
    fn union_contains_operands(a in arb_box(), b in arb_box()) {
        let u = a.union(&b);
        prop_assert!(u.contains_box(&a));
        prop_assert!(u.contains_box(&b));
    }

    // Splitting preserves volume and the halves are face-adjacent across the plane
    #[test]
    fn split_preserves_volume(b in arb_box(), axis in arb_axis(), t in 0.0f64..1.0) {
        let lo = b.min.get(axis);
        let hi = b.max.get(axis);
        prop_assume!(hi - lo >= 2);
        let pos = lo + 1 + ((hi - lo - 2) as f64 * t) as i32;
        let (l, r) = b.split(axis, pos);
        prop_assert_eq!(l.volume() + r.volume(), b.volume());
        prop_assert!(l.is_face_adjacent(&r, Side::new(axis, true)));
        prop_assert!(r.is_face_adjacent(&l, Side::new(axis, false)));
        prop_assert!(!l.overlaps(&r));
    }

    // Every cell iterated lies inside the box and the count equals the volume
    #[test]
    fn cells_match_volume(b in arb_box()) {
        let mut n = 0i64;
        for c in b.cells() {
            prop_assert!(b.contains_cell(c));
            n += 1;
        }
        prop_assert_eq!(n, b.volume());
    }

    // Converting to float bounds and back to cells is lossless for integer boxes
    #[test]
    fn float_roundtrip_is_identity(b in arb_box()) {
        prop_assert_eq!(Aabb::from(b).to_cells(), b);
    }

    // Face adjacency is symmetric under the opposite side
    #[test]
    fn adjacency_is_symmetric(a in arb_box(), b in arb_box(), i in 0usize..6) {
        let side = Side::from_index(i).unwrap();
        prop_assert_eq!(a.is_face_adjacent(&b, side), b.is_face_adjacent(&a, side.opposite()));
    }
}

#[test]
fn triangle_bounds_enclose_vertices() {
    let tri = Triangle::new(
        Vec3::new(0.25, 1.0, 2.5),
        Vec3::new(3.0, 1.0, 2.0),
        Vec3::new(1.5, 1.0, -0.5),
        7,
    );
    assert_eq!(tri.bounds(), Box3i::new(IVec3::new(0, 1, -1), IVec3::new(3, 2, 3)));

    let mut a = Aabb::EMPTY;
    for p in [
        Vec3::new(0.25, 1.0, 2.5),
        Vec3::new(3.0, 1.0, 2.0),
        Vec3::new(1.5, 1.0, -0.5),
    ] {
        a.grow_point(p);
    }
    let cells = a.to_cells();
    assert_eq!(cells.min, IVec3::new(0, 1, -1));
    assert_eq!(cells.max, IVec3::new(3, 2, 3));
}

#[test]
fn voxel_extents_are_deltas() {
    let v = Voxel::new(IVec3::new(2, 0, -1), IVec3::new(1, 0, 3), 4);
    let b = v.bounds();
    assert_eq!(b.size(), IVec3::new(2, 1, 4));
    assert_eq!(b.volume(), 8);
    assert_eq!(Voxel::cell(IVec3::ZERO, 1).bounds().volume(), 1);
}
