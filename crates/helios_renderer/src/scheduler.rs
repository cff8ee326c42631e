//! The tile scheduler: distributes pixel work across the worker pool.

use std::sync::mpsc;
use std::sync::Arc;

use thiserror::Error;

use helios_core::Scene;

use crate::camera::Camera;
use crate::film::PartitionedFilm;
use crate::kernel::Kernel;
use crate::observer::RenderObserver;
use crate::pool::WorkerPool;

/// Rejected configuration, raised before any pixel is rendered.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("viewport must have positive dimensions, got {width}x{height}")]
    InvalidViewport { width: i32, height: i32 },

    #[error("worker count must be at least 1")]
    NoWorkers,

    #[error("partition count must be at least 1")]
    NoPartitions,

    #[error("tile range ({lo}, {hi}) does not fit in 0..{partitions}")]
    InvalidRange {
        lo: usize,
        hi: usize,
        partitions: usize,
    },
}

/// Schedules a render as one job per film tile over a fixed worker pool.
///
/// The scheduler owns its pool for its entire lifetime; dropping the
/// scheduler joins the workers. The observer list is fixed at construction.
pub struct Scheduler {
    kernel: Arc<dyn Kernel>,
    partitions: u32,
    range: (usize, usize),
    observers: Vec<Arc<dyn RenderObserver>>,
    pool: WorkerPool,
}

impl Scheduler {
    pub fn new(
        kernel: Arc<dyn Kernel>,
        workers: usize,
        partitions: u32,
    ) -> Result<Self, ConfigError> {
        if workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if partitions == 0 {
            return Err(ConfigError::NoPartitions);
        }

        Ok(Self {
            kernel,
            partitions,
            range: (0, partitions as usize),
            observers: Vec::new(),
            pool: WorkerPool::new(workers),
        })
    }

    /// Restrict rendering to the tile index range `[lo, hi)`. Tiles outside
    /// the range stay black, which supports rendering a slice of the film
    /// on one machine and the rest elsewhere.
    pub fn with_range(mut self, lo: usize, hi: usize) -> Result<Self, ConfigError> {
        if lo > hi || hi > self.partitions as usize {
            return Err(ConfigError::InvalidRange {
                lo,
                hi,
                partitions: self.partitions as usize,
            });
        }
        self.range = (lo, hi);
        Ok(self)
    }

    /// Register an observer. Observers cannot be added once rendering has
    /// started.
    pub fn with_observer(mut self, observer: Arc<dyn RenderObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn partitions(&self) -> u32 {
        self.partitions
    }

    /// Render the scene through the camera into a partitioned film.
    ///
    /// One job is enqueued per tile in the configured range; each job fires
    /// `partition_started`, renders into a tile-local film and fires
    /// `partition_finished`. Completion order across tiles is unspecified.
    pub fn render(&self, scene: &Arc<Scene>, camera: &Camera) -> Result<PartitionedFilm, ConfigError> {
        let width = camera.viewport.z;
        let height = camera.viewport.w;
        if width <= 0 || height <= 0 {
            return Err(ConfigError::InvalidViewport { width, height });
        }

        for observer in &self.observers {
            observer.render_started(scene, camera, self.partitions as usize);
        }

        let mut film = PartitionedFilm::new(width as u32, height as u32, self.partitions);
        let (sender, receiver) = mpsc::channel();
        let (lo, hi) = self.range;
        log::debug!(
            "rendering {}x{} film, tiles {lo}..{hi} of {}",
            width,
            height,
            self.partitions
        );

        for id in lo..hi {
            let tile = film.blank_tile(id);
            let offset = film.offset(id);
            let kernel = Arc::clone(&self.kernel);
            let scene = Arc::clone(scene);
            let camera = *camera;
            let observers = self.observers.clone();
            let sender = sender.clone();

            self.pool.enqueue(move || {
                let mut tile = tile;
                for observer in &observers {
                    observer.partition_started(id, &tile, offset);
                }

                kernel.render_into(&scene, &camera, &mut tile, offset);

                for observer in &observers {
                    observer.partition_finished(id, &tile, offset);
                }

                // The driver may have given up if a previous send failed;
                // nothing to do about it from the worker side.
                let _ = sender.send((id, tile));
            });
        }
        drop(sender);

        for _ in lo..hi {
            let (id, tile) = receiver.recv().expect("render worker disconnected");
            film.set_tile(id, tile);
        }

        for observer in &self.observers {
            observer.render_finished(&film);
        }

        Ok(film)
    }
}
