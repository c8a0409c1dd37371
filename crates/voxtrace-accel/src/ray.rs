use voxtrace_geom::{Aabb, Axis, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub const fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }

    /// Slab test. Returns the parametric entry and exit distances, which may be
    /// negative when the origin is inside or past the box.
    pub fn intersect_box(&self, b: &Aabb) -> Option<(f32, f32)> {
        let mut t0 = f32::NEG_INFINITY;
        let mut t1 = f32::INFINITY;
        for axis in Axis::ALL {
            let o = self.origin.get(axis);
            let d = self.dir.get(axis);
            let (lo, hi) = (b.min.get(axis), b.max.get(axis));
            if d == 0.0 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let (a, c) = ((lo - o) * inv, (hi - o) * inv);
            let (near, far) = if a <= c { (a, c) } else { (c, a) };
            t0 = t0.max(near);
            t1 = t1.min(far);
            if t0 > t1 {
                return None;
            }
        }
        Some((t0, t1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_parallel_ray_hits_unit_box() {
        let r = Ray::new(Vec3::new(-1.0, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));
        let b = Aabb::new(Vec3::ZERO, Vec3::splat(1.0));
        assert_eq!(r.intersect_box(&b), Some((1.0, 2.0)));
        let miss = Ray::new(Vec3::new(-1.0, 1.5, 0.5), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(miss.intersect_box(&b), None);
    }
}
