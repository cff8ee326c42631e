//! Console progress reporting for renders.

use indicatif::ProgressBar;

use helios_core::Scene;
use helios_math::IVec2;
use helios_renderer::{Camera, DirectFilm, PartitionedFilm, RenderObserver};

/// Drives an `indicatif` progress bar from scheduler callbacks.
///
/// The bar handles its own synchronisation, so ticks may arrive from any
/// worker thread.
pub struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self {
            bar: ProgressBar::new(0),
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderObserver for ProgressObserver {
    fn render_started(&self, _scene: &Scene, _camera: &Camera, partitions: usize) {
        self.bar.reset();
        self.bar.set_length(partitions as u64);
    }

    fn partition_finished(&self, _id: usize, _tile: &DirectFilm, _offset: IVec2) {
        self.bar.inc(1);
    }

    fn render_finished(&self, _film: &PartitionedFilm) {
        self.bar.finish_and_clear();
    }
}
