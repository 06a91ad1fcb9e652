//! Fork/join worker pool used by contour builds and viewport renders

mod pool;

pub use pool::{resolve_worker_count, WorkerPool};
