use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use std::num::NonZeroUsize;
use tracing::info;

/// Resolve a requested worker count against the hardware
///
/// Positive values are taken as is. Zero and `-1` mean one worker per
/// hardware thread, `-k` leaves `k - 1` hardware threads free. The result is
/// never less than one.
pub fn resolve_worker_count(requested: i32) -> usize {
    if let Ok(n) = usize::try_from(requested) {
        if n > 0 {
            return n;
        }
    }
    let hardware = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
    if requested == 0 {
        return hardware;
    }
    let spare = requested.unsigned_abs() as usize - 1;
    hardware.saturating_sub(spare).max(1)
}

/// Fixed-size pool running one closure invocation per worker index
///
/// Created once and shared; every [`WorkerPool::run`] blocks until all
/// invocations have returned.
#[derive(Debug)]
pub struct WorkerPool {
    pool: ThreadPool,
    thread_count: usize,
}

impl WorkerPool {
    /// Create a pool with `resolve_worker_count(worker_count)` threads
    ///
    /// # Errors
    /// Returns error if the OS refuses to spawn the worker threads
    pub fn new(worker_count: i32) -> Result<Self, ThreadPoolBuildError> {
        let thread_count = resolve_worker_count(worker_count);
        let pool = ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .thread_name(|i| format!("flowviz-worker-{i}"))
            .build()?;
        info!("Worker pool started with {} threads", thread_count);
        Ok(Self { pool, thread_count })
    }

    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    /// Call `work(i)` for every `i` in `0..thread_count` on the pool and wait
    ///
    /// `thread_count` may exceed the pool size; the extra invocations queue
    /// behind the running ones.
    pub fn run<F>(&self, thread_count: usize, work: F)
    where
        F: Fn(usize) + Sync,
    {
        let work = &work;
        self.pool.scope(|s| {
            for i in 0..thread_count {
                s.spawn(move |_| work(i));
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn test_resolve_worker_count() {
        let hw = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
        assert_eq!(resolve_worker_count(3), 3);
        assert_eq!(resolve_worker_count(-1), hw);
        assert_eq!(resolve_worker_count(0), hw);
        assert_eq!(resolve_worker_count(-2), (hw - 1).max(1));
        assert_eq!(resolve_worker_count(-10_000), 1);
    }

    #[test]
    fn test_run_visits_every_index_once() {
        let pool = WorkerPool::new(4).unwrap();
        assert_eq!(pool.thread_count(), 4);

        let seen = Mutex::new(Vec::new());
        pool.run(7, |i| seen.lock().unwrap().push(i));
        let mut seen = seen.into_inner().unwrap();
        seen.sort_unstable();
        assert_eq!(seen, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn test_run_blocks_until_done() {
        let pool = WorkerPool::new(2).unwrap();
        let counter = AtomicUsize::new(0);
        pool.run(2, |_| {
            for _ in 0..1000 {
                counter.fetch_add(1, Ordering::Relaxed);
            }
        });
        assert_eq!(counter.load(Ordering::Relaxed), 2000);
    }

    #[test]
    fn test_run_zero_is_noop() {
        let pool = WorkerPool::new(1).unwrap();
        pool.run(0, |_| panic!("no invocation expected"));
    }
}
