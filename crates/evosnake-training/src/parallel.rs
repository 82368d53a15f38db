//! Order-preserving parallel map used for fitness evaluation.

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder, prelude::*};

/// Applies a function to every item and returns the results in input order.
///
/// Implementations may run `f` concurrently; each call receives its own item
/// and nothing else is shared between calls.
pub trait ParallelMap {
    fn map<T, U, F>(&self, items: Vec<T>, f: F) -> Vec<U>
    where
        T: Send,
        U: Send,
        F: Fn(T) -> U + Sync + Send;
}

/// Runs everything on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

impl ParallelMap for Sequential {
    fn map<T, U, F>(&self, items: Vec<T>, f: F) -> Vec<U>
    where
        T: Send,
        U: Send,
        F: Fn(T) -> U + Sync + Send,
    {
        items.into_iter().map(f).collect()
    }
}

/// A fixed-size pool of worker threads.
#[derive(Debug)]
pub struct WorkerPool {
    pool: ThreadPool,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Result<Self, ThreadPoolBuildError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("evaluator-{i}"))
            .build()?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl ParallelMap for WorkerPool {
    fn map<T, U, F>(&self, items: Vec<T>, f: F) -> Vec<U>
    where
        T: Send,
        U: Send,
        F: Fn(T) -> U + Sync + Send,
    {
        self.pool.install(|| items.into_par_iter().map(f).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_sequential_preserves_order() {
        let out = Sequential.map(vec![1, 2, 3], |x| x * 10);
        assert_eq!(out, [10, 20, 30]);
    }

    #[test]
    fn test_worker_pool_preserves_order() {
        let pool = WorkerPool::new(3).unwrap();
        assert_eq!(pool.workers(), 3);
        let out = pool.map((0..1000).collect(), |x: u64| x * x);
        assert_eq!(out, (0..1000).map(|x: u64| x * x).collect::<Vec<_>>());
    }

    #[test]
    fn test_worker_pool_calls_once_per_item() {
        let pool = WorkerPool::new(2).unwrap();
        let calls = AtomicUsize::new(0);
        let out = pool.map(vec!["a", "bb", "ccc"], |s| {
            calls.fetch_add(1, Ordering::Relaxed);
            s.len()
        });
        assert_eq!(out, [1, 2, 3]);
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }
}
