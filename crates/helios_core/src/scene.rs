//! The scene: geometry plus lights.

use helios_math::Vec3;

use crate::graph::SceneGraph;

/// A renderable scene: a scene graph holding the geometry and an ordered
/// list of point light positions.
///
/// Scenes are built once by a loader or test harness and treated as
/// read-only by every render worker afterwards.
pub struct Scene {
    pub graph: Box<dyn SceneGraph>,
    pub lights: Vec<Vec3>,
}

impl Scene {
    pub fn new(graph: Box<dyn SceneGraph>, lights: Vec<Vec3>) -> Self {
        Self { graph, lights }
    }
}
