//! Geometry types shared by the scene-build crates (no graphics dependency).
#![forbid(unsafe_code)]

use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }

    #[inline]
    pub fn get(self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    #[inline]
    pub fn dot(self, rhs: Vec3) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline]
    pub fn cross(self, rhs: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    #[inline]
    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len > 0.0 { self / len } else { self }
    }

    #[inline]
    pub fn min(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x.min(rhs.x), self.y.min(rhs.y), self.z.min(rhs.z))
    }

    #[inline]
    pub fn max(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x.max(rhs.x), self.y.max(rhs.y), self.z.max(rhs.z))
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vec3 {
    #[inline]
    fn sub_assign(&mut self, rhs: Vec3) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn div(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    #[inline]
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// Float axis-aligned box. Used for triangle bounds and for the float BVH layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn grow_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Smallest integer box enclosing this one.
    pub fn to_cells(self) -> Box3i {
        Box3i::new(
            IVec3::new(
                self.min.x.floor() as i32,
                self.min.y.floor() as i32,
                self.min.z.floor() as i32,
            ),
            IVec3::new(
                (self.max.x.ceil() as i32).max(self.min.x.floor() as i32 + 1),
                (self.max.y.ceil() as i32).max(self.min.y.floor() as i32 + 1),
                (self.max.z.ceil() as i32).max(self.min.z.floor() as i32 + 1),
            ),
        )
    }
}

impl From<Box3i> for Aabb {
    fn from(b: Box3i) -> Self {
        Aabb::new(b.min.to_vec3(), b.max.to_vec3())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Converts `[0..3)` back into an axis. Out-of-range values yield `None`.
    #[inline]
    pub fn from_index(i: usize) -> Option<Axis> {
        match i {
            0 => Some(Axis::X),
            1 => Some(Axis::Y),
            2 => Some(Axis::Z),
            _ => None,
        }
    }

    /// The two tangent axes `(u, v)` of a plane with this normal, in cyclic order.
    #[inline]
    pub fn tangents(self) -> (Axis, Axis) {
        match self {
            Axis::X => (Axis::Y, Axis::Z),
            Axis::Y => (Axis::Z, Axis::X),
            Axis::Z => (Axis::X, Axis::Y),
        }
    }
}

/// One of the six box faces, in GPU rope order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Side {
    NegX = 0,
    PosX = 1,
    NegY = 2,
    PosY = 3,
    NegZ = 4,
    PosZ = 5,
}

impl Side {
    pub const ALL: [Side; 6] = [
        Side::NegX,
        Side::PosX,
        Side::NegY,
        Side::PosY,
        Side::NegZ,
        Side::PosZ,
    ];

    /// Returns the `[0..6)` index of this side.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(i: usize) -> Option<Side> {
        Side::ALL.get(i).copied()
    }

    #[inline]
    pub fn new(axis: Axis, positive: bool) -> Side {
        Side::ALL[axis.index() * 2 + positive as usize]
    }

    #[inline]
    pub fn axis(self) -> Axis {
        match self {
            Side::NegX | Side::PosX => Axis::X,
            Side::NegY | Side::PosY => Axis::Y,
            Side::NegZ | Side::PosZ => Axis::Z,
        }
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        self.index() & 1 == 1
    }

    #[inline]
    pub fn opposite(self) -> Side {
        Side::ALL[self.index() ^ 1]
    }

    /// Returns the integer grid delta when stepping out through this side.
    #[inline]
    pub fn delta(self) -> IVec3 {
        let step = if self.is_positive() { 1 } else { -1 };
        IVec3::ZERO.with(self.axis(), step)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct IVec3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl IVec3 {
    pub const ZERO: IVec3 = IVec3 { x: 0, y: 0, z: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn splat(v: i32) -> Self {
        Self { x: v, y: v, z: v }
    }

    #[inline]
    pub fn get(self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Copy with one component replaced.
    #[inline]
    pub fn with(mut self, axis: Axis, v: i32) -> Self {
        match axis {
            Axis::X => self.x = v,
            Axis::Y => self.y = v,
            Axis::Z => self.z = v,
        }
        self
    }

    #[inline]
    pub fn min(self, rhs: IVec3) -> IVec3 {
        IVec3::new(self.x.min(rhs.x), self.y.min(rhs.y), self.z.min(rhs.z))
    }

    #[inline]
    pub fn max(self, rhs: IVec3) -> IVec3 {
        IVec3::new(self.x.max(rhs.x), self.y.max(rhs.y), self.z.max(rhs.z))
    }

    #[inline]
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

impl Add for IVec3 {
    type Output = IVec3;
    #[inline]
    fn add(self, rhs: IVec3) -> IVec3 {
        IVec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for IVec3 {
    type Output = IVec3;
    #[inline]
    fn sub(self, rhs: IVec3) -> IVec3 {
        IVec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Half-open integer box in cell units: covers `[min, max)` on every axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Box3i {
    pub min: IVec3,
    pub max: IVec3,
}

impl Box3i {
    #[inline]
    pub const fn new(min: IVec3, max: IVec3) -> Self {
        Self { min, max }
    }

    /// The box of a single cell.
    #[inline]
    pub fn cell(p: IVec3) -> Self {
        Self::new(p, p + IVec3::splat(1))
    }

    /// Box of a merged run starting at `origin` with `extents` stored as deltas
    /// (a single cell has extents `0,0,0`).
    #[inline]
    pub fn from_extents(origin: IVec3, extents: IVec3) -> Self {
        Self::new(origin, origin + extents + IVec3::splat(1))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y || self.max.z <= self.min.z
    }

    #[inline]
    pub fn size(&self) -> IVec3 {
        self.max - self.min
    }

    #[inline]
    pub fn volume(&self) -> i64 {
        if self.is_empty() {
            return 0;
        }
        let s = self.size();
        s.x as i64 * s.y as i64 * s.z as i64
    }

    #[inline]
    pub fn union(&self, other: &Box3i) -> Box3i {
        Box3i::new(self.min.min(other.min), self.max.max(other.max))
    }

    #[inline]
    pub fn contains_cell(&self, p: IVec3) -> bool {
        p.x >= self.min.x
            && p.x < self.max.x
            && p.y >= self.min.y
            && p.y < self.max.y
            && p.z >= self.min.z
            && p.z < self.max.z
    }

    #[inline]
    pub fn contains_box(&self, other: &Box3i) -> bool {
        Axis::ALL
            .iter()
            .all(|&a| other.min.get(a) >= self.min.get(a) && other.max.get(a) <= self.max.get(a))
    }

    /// True if the two boxes share interior on `axis` (open intervals intersect).
    #[inline]
    pub fn overlaps_on(&self, other: &Box3i, axis: Axis) -> bool {
        self.min.get(axis) < other.max.get(axis) && other.min.get(axis) < self.max.get(axis)
    }

    #[inline]
    pub fn overlaps(&self, other: &Box3i) -> bool {
        Axis::ALL.iter().all(|&a| self.overlaps_on(other, a))
    }

    /// Coordinate of the plane bounding this box on `side`.
    #[inline]
    pub fn plane(&self, side: Side) -> i32 {
        if side.is_positive() {
            self.max.get(side.axis())
        } else {
            self.min.get(side.axis())
        }
    }

    /// True if `other` lies across `side` of this box: it starts at the plane of that
    /// face and overlaps the face on the two remaining axes.
    pub fn is_face_adjacent(&self, other: &Box3i, side: Side) -> bool {
        let axis = side.axis();
        let (u, v) = axis.tangents();
        other.plane(side.opposite()) == self.plane(side)
            && self.overlaps_on(other, u)
            && self.overlaps_on(other, v)
    }

    /// Axes ordered from the longest extent to the shortest. Ties keep X, Y, Z order.
    pub fn axes_by_extent(&self) -> [Axis; 3] {
        let s = self.size();
        let mut axes = Axis::ALL;
        axes.sort_by(|a, b| s.get(*b).cmp(&s.get(*a)));
        axes
    }

    /// Splits at `pos` on `axis`; `pos` must lie strictly inside the box.
    pub fn split(&self, axis: Axis, pos: i32) -> (Box3i, Box3i) {
        debug_assert!(pos > self.min.get(axis) && pos < self.max.get(axis));
        let left = Box3i::new(self.min, self.max.with(axis, pos));
        let right = Box3i::new(self.min.with(axis, pos), self.max);
        (left, right)
    }

    /// Iterates every cell of the box in z, y, x order.
    pub fn cells(self) -> impl Iterator<Item = IVec3> {
        let b = self;
        (b.min.z..b.max.z).flat_map(move |z| {
            (b.min.y..b.max.y).flat_map(move |y| (b.min.x..b.max.x).map(move |x| IVec3::new(x, y, z)))
        })
    }
}

/// Anything that can be placed in a spatial index by its integer bounds.
pub trait Boundable {
    fn bounds(&self) -> Box3i;
}

impl Boundable for Box3i {
    #[inline]
    fn bounds(&self) -> Box3i {
        *self
    }
}

/// A grid voxel, possibly the result of merging a run of cells.
///
/// `extents` are deltas: a single cell has extents `0,0,0`, a 2x1x1 run has `1,0,0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Voxel {
    pub origin: IVec3,
    pub extents: IVec3,
    pub value: u8,
}

impl Voxel {
    #[inline]
    pub const fn cell(origin: IVec3, value: u8) -> Self {
        Self {
            origin,
            extents: IVec3::ZERO,
            value,
        }
    }

    #[inline]
    pub const fn new(origin: IVec3, extents: IVec3, value: u8) -> Self {
        Self {
            origin,
            extents,
            value,
        }
    }
}

impl Boundable for Voxel {
    #[inline]
    fn bounds(&self) -> Box3i {
        Box3i::from_extents(self.origin, self.extents)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub v: [Vec3; 3],
    pub material: u32,
}

impl Triangle {
    pub const fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: u32) -> Self {
        Self {
            v: [v0, v1, v2],
            material,
        }
    }

    pub fn aabb(&self) -> Aabb {
        let mut a = Aabb::EMPTY;
        for p in self.v {
            a.grow_point(p);
        }
        a
    }
}

impl Boundable for Triangle {
    /// Smallest cell box enclosing the triangle; flat triangles still get one cell of depth.
    fn bounds(&self) -> Box3i {
        self.aabb().to_cells()
    }
}
