//! Parallel processing strategies

use tracing::warn;

/// Processing mode for raster stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingMode {
    /// Single-threaded processing
    Sequential,
    /// Parallel processing using the global pool (all available cores)
    #[default]
    Parallel,
    /// Parallel with a dedicated pool of the given number of threads
    ParallelWith(usize),
}

impl ProcessingMode {
    /// Map a configured thread count onto a mode.
    ///
    /// `None` uses every core, `Some(0)` and `Some(1)` run sequentially.
    pub fn from_threads(threads: Option<usize>) -> Self {
        match threads {
            None => ProcessingMode::Parallel,
            Some(0) | Some(1) => ProcessingMode::Sequential,
            Some(n) => ProcessingMode::ParallelWith(n),
        }
    }

    pub fn is_parallel(&self) -> bool {
        !matches!(self, ProcessingMode::Sequential)
    }

    /// Number of worker threads this mode will use
    pub fn num_threads(&self) -> usize {
        match self {
            ProcessingMode::Sequential => 1,
            ProcessingMode::Parallel => rayon::current_num_threads(),
            ProcessingMode::ParallelWith(n) => *n,
        }
    }

    /// Run `op` inside the pool this mode selects.
    ///
    /// Called from a worker of a pool that already has the requested size,
    /// `op` runs in place, so a caller can install once around a sequence
    /// of stages and share one pool. A dedicated pool that cannot be built
    /// falls back to the global pool; results do not depend on the number
    /// of threads.
    pub fn install<R, F>(&self, op: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match self {
            ProcessingMode::Sequential | ProcessingMode::Parallel => op(),
            ProcessingMode::ParallelWith(threads) if Self::on_pool_of(*threads) => op(),
            ProcessingMode::ParallelWith(threads) => {
                match rayon::ThreadPoolBuilder::new().num_threads(*threads).build() {
                    Ok(pool) => pool.install(op),
                    Err(e) => {
                        warn!(threads, error = %e, "failed to build thread pool, using global pool");
                        op()
                    }
                }
            }
        }
    }

    fn on_pool_of(threads: usize) -> bool {
        rayon::current_thread_index().is_some() && rayon::current_num_threads() == threads
    }
}
