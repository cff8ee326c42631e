//! Axis-aligned box primitive.
//!
//! The same slab test backs both this shape and the kd-tree's node bounds;
//! here the box reports itself as the hit and derives a face normal.

use std::sync::Arc;

use helios_math::{Aabb, Ray, Vec3};

use crate::material::Material;
use crate::primitive::Surface;

/// An axis-aligned box defined by its minimum and maximum corners.
#[derive(Debug, Clone)]
pub struct Cuboid {
    min: Vec3,
    max: Vec3,
    material: Arc<Material>,
}

impl Cuboid {
    pub fn new(min: Vec3, max: Vec3, material: Arc<Material>) -> Self {
        Self { min, max, material }
    }

    pub fn midpoint(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn bounding_box(&self) -> Aabb {
        Aabb {
            min: self.min,
            max: self.max,
        }
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    pub fn intersect(&self, ray: &Ray) -> Option<Surface> {
        let distance = self.bounding_box().intersect(ray)?;
        let position = ray.at(distance);

        Some(Surface {
            distance,
            position,
            normal: self.face_normal(position),
        })
    }

    /// Outward normal of the face the point lies on, picked as the axis on
    /// which the point is proportionally furthest from the center.
    fn face_normal(&self, position: Vec3) -> Vec3 {
        let half = (self.max - self.min) * 0.5;
        let offset = (position - self.midpoint()) / half;

        let mut axis = 0;
        for i in 1..3 {
            if offset[i].abs() > offset[axis].abs() {
                axis = i;
            }
        }

        let mut normal = Vec3::ZERO;
        normal[axis] = offset[axis].signum();
        normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cuboid() -> Cuboid {
        Cuboid::new(
            Vec3::new(-1.0, -1.0, -6.0),
            Vec3::new(1.0, 1.0, -4.0),
            Arc::new(Material::fallback()),
        )
    }

    #[test]
    fn test_cuboid_hit_reports_entry_face() {
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let surface = cuboid().intersect(&ray).unwrap();

        assert!((surface.distance - 4.0).abs() < 1e-5);
        assert_eq!(surface.normal, Vec3::Z);
    }

    #[test]
    fn test_cuboid_face_normals() {
        let shape = cuboid();

        let from_left = Ray::new(Vec3::new(-5.0, 0.0, -5.0), Vec3::X);
        assert_eq!(shape.intersect(&from_left).unwrap().normal, Vec3::NEG_X);

        let from_above = Ray::new(Vec3::new(0.0, 5.0, -5.0), Vec3::NEG_Y);
        assert_eq!(shape.intersect(&from_above).unwrap().normal, Vec3::Y);
    }

    #[test]
    fn test_cuboid_miss() {
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::NEG_Z);
        assert!(cuboid().intersect(&ray).is_none());

        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(cuboid().intersect(&ray).is_none());
    }

    #[test]
    fn test_cuboid_midpoint() {
        assert_eq!(cuboid().midpoint(), Vec3::new(0.0, 0.0, -5.0));
    }
}
