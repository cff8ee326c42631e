//! Helios Renderer - CPU ray tracing.
//!
//! A recursive Whitted-style ray tracer with Phong local illumination,
//! soft shadows, reflection and refraction, scheduled as tile jobs over a
//! fixed worker pool.

mod camera;
mod film;
mod kernel;
mod observer;
mod pool;
pub mod ppm;
mod scheduler;

pub use camera::Camera;
pub use film::{DirectFilm, Film, PartitionedFilm};
pub use kernel::{Kernel, KernelConfig, TracingKernel};
pub use observer::RenderObserver;
pub use pool::WorkerPool;
pub use scheduler::{ConfigError, Scheduler};
