//! Camera: viewport plus view and projection matrices.

use helios_math::{IVec4, Mat4, Ray, Vec2, Vec3, Vec4};

/// A camera capturing the scene through a viewport rectangle.
///
/// Cameras are immutable value types: every transform returns a new camera,
/// so a camera can be shared freely across render workers.
#[derive(Debug, Copy, Clone)]
pub struct Camera {
    /// Viewport rectangle `(x, y, w, h)`
    pub viewport: IVec4,
    view: Mat4,
    projection: Mat4,
}

impl Camera {
    /// Create a camera with identity view and projection matrices.
    pub fn new(viewport: IVec4) -> Self {
        Self {
            viewport,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        }
    }

    /// The camera position, derived from the translation column of the
    /// inverted view matrix.
    pub fn position(&self) -> Vec3 {
        self.view.inverse().w_axis.truncate()
    }

    /// Look into `direction` from `position`, replacing the view matrix.
    pub fn look_at(&self, position: Vec3, direction: Vec3, up: Vec3) -> Camera {
        Camera {
            view: Mat4::look_at_rh(position, position + direction, up),
            ..*self
        }
    }

    /// Replace the projection matrix with a perspective projection.
    pub fn perspective(&self, fov_y: f32, aspect: f32, near: f32, far: f32) -> Camera {
        Camera {
            projection: Mat4::perspective_rh_gl(fov_y, aspect, near, far),
            ..*self
        }
    }

    /// Replace the projection matrix with an orthographic projection.
    pub fn orthographic(
        &self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Camera {
        Camera {
            projection: Mat4::orthographic_rh_gl(left, right, bottom, top, near, far),
            ..*self
        }
    }

    /// Translate the view by `delta`.
    pub fn translate(&self, delta: Vec3) -> Camera {
        Camera {
            view: self.view * Mat4::from_translation(delta),
            ..*self
        }
    }

    /// Rotate the view by `angle` radians around `axis`.
    pub fn rotate(&self, angle: f32, axis: Vec3) -> Camera {
        Camera {
            view: self.view * Mat4::from_axis_angle(axis, angle),
            ..*self
        }
    }

    /// Create a ray for the given window coordinates.
    ///
    /// Unprojects the window point on the near and far plane and shoots a
    /// ray from the near point through the far one.
    pub fn ray_from(&self, win: Vec2) -> Ray {
        let origin = self.unproject(win.extend(0.0));
        let destination = self.unproject(win.extend(1.0));
        Ray::new(origin, destination - origin)
    }

    /// Map window coordinates (with a depth in [0, 1]) back into world
    /// space through the viewport, projection and view transforms.
    fn unproject(&self, win: Vec3) -> Vec3 {
        let viewport = self.viewport.as_vec4();
        let normalized = Vec4::new(
            (win.x - viewport.x) / viewport.z * 2.0 - 1.0,
            (win.y - viewport.y) / viewport.w * 2.0 - 1.0,
            win.z * 2.0 - 1.0,
            1.0,
        );

        let world = (self.projection * self.view).inverse() * normalized;
        world.truncate() / world.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn camera() -> Camera {
        Camera::new(IVec4::new(0, 0, 100, 100))
            .look_at(Vec3::new(0.0, 0.0, 0.0), Vec3::NEG_Z, Vec3::Y)
            .perspective(FRAC_PI_2, 1.0, 0.1, 100.0)
    }

    #[test]
    fn test_position_roundtrip() {
        let eye = Vec3::new(2.0, 2.0, 4.0);
        let camera = Camera::new(IVec4::new(0, 0, 800, 800)).look_at(
            eye,
            Vec3::new(0.0, 0.0, -1.0) - eye,
            Vec3::Y,
        );

        assert!((camera.position() - eye).length() < 1e-4);
    }

    #[test]
    fn test_center_ray_points_forward() {
        let ray = camera().ray_from(Vec2::new(50.0, 50.0));

        assert!((ray.origin.z - (-0.1)).abs() < 1e-4);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn test_corner_rays_diverge() {
        let camera = camera();
        let bottom_left = camera.ray_from(Vec2::new(0.0, 0.0));
        let top_right = camera.ray_from(Vec2::new(100.0, 100.0));

        assert!(bottom_left.direction.x < 0.0);
        assert!(bottom_left.direction.y < 0.0);
        assert!(top_right.direction.x > 0.0);
        assert!(top_right.direction.y > 0.0);
        // Both still look down the view axis
        assert!(bottom_left.direction.z < 0.0);
        assert!(top_right.direction.z < 0.0);
    }

    #[test]
    fn test_rays_are_normalized() {
        let camera = camera();
        for win in [Vec2::new(0.0, 0.0), Vec2::new(99.0, 1.0), Vec2::new(37.0, 81.0)] {
            let ray = camera.ray_from(win);
            assert!((ray.direction.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_translate_moves_position() {
        let camera = camera().translate(Vec3::new(0.0, 0.0, 5.0));
        // View-space translation moves the camera along its view axis
        assert!(camera.position().length() > 1.0);
    }
}
