//! Render observers: progress and preview hooks.

use helios_core::Scene;
use helios_math::IVec2;

use crate::camera::Camera;
use crate::film::{DirectFilm, PartitionedFilm};

/// Observes a render driven by the [`Scheduler`](crate::Scheduler).
///
/// All hooks default to no-ops. Callbacks arrive synchronously on worker
/// threads and the scheduler provides no synchronisation between them:
/// observers that mutate shared state must synchronise internally. For one
/// tile, `partition_started` always precedes `partition_finished`; across
/// tiles the callbacks interleave arbitrarily.
///
/// Observers must not retain the film borrow past `render_finished`.
pub trait RenderObserver: Send + Sync {
    /// A render job started on the scheduler.
    fn render_started(&self, _scene: &Scene, _camera: &Camera, _partitions: usize) {}

    /// A worker started rendering the given tile.
    fn partition_started(&self, _id: usize, _tile: &DirectFilm, _offset: IVec2) {}

    /// A worker finished rendering the given tile.
    fn partition_finished(&self, _id: usize, _tile: &DirectFilm, _offset: IVec2) {}

    /// All tiles are assembled; the film is complete.
    fn render_finished(&self, _film: &PartitionedFilm) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;
    impl RenderObserver for Silent {}

    #[test]
    fn test_default_hooks_are_noops() {
        // Compiles and runs: the default methods must not require state
        let observer = Silent;
        observer.render_finished(&PartitionedFilm::new(4, 4, 1));
    }
}
