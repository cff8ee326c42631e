use crate::{Ray, Vec3};

/// Axis-aligned bounding box used both for spatial acceleration and as the
/// extent of box-shaped geometry.
///
/// The empty box has `min = +INF, max = -INF` and is absorbing under
/// [`Aabb::union`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// A box that contains nothing.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    /// Create an AABB from two corner points (in any order).
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create an AABB that surrounds both boxes.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Grow the box to include a single point.
    pub fn grow(&self, point: Vec3) -> Aabb {
        Aabb {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// Returns true if `other` lies entirely inside this box.
    pub fn contains(&self, other: &Aabb) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && self.min.z <= other.min.z
            && self.max.x >= other.max.x
            && self.max.y >= other.max.y
            && self.max.z >= other.max.z
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    pub fn longest_axis(&self) -> usize {
        let size = self.max - self.min;
        if size.x > size.y && size.x > size.z {
            0
        } else if size.y > size.z {
            1
        } else {
            2
        }
    }

    /// Slab intersection test.
    ///
    /// Returns the entry distance on a hit, which is negative when the ray
    /// starts inside the box. Zero direction components divide to IEEE
    /// infinities and fall out of the min/max chains, which also ignore NaN.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let inv = ray.direction.recip();
        let u = (self.min - ray.origin) * inv;
        let v = (self.max - ray.origin) * inv;

        let t_min = u.x.min(v.x).max(u.y.min(v.y)).max(u.z.min(v.z));
        let t_max = u.x.max(v.x).min(u.y.max(v.y)).min(u.z.max(v.z));

        if t_max < 0.0 || t_min > t_max {
            None
        } else {
            Some(t_min)
        }
    }
}
