//! Parallel execution of independent work units
//!
//! Each unit is identified by its index and built by a closure, so results
//! come back in index order whatever the thread count.
//!
//! # Example
//!
//! ```rust
//! use strategic_lending::parallel::ParallelRunner;
//!
//! let squares = ParallelRunner::new(8, |i| i * i).num_threads(2).run();
//!
//! assert_eq!(squares.len(), 8);
//! assert_eq!(squares[3], Ok(9));
//! ```
//!
//! # Determinism
//!
//! Results are deterministic when:
//! 1. Each unit derives everything it needs from its index
//! 2. Units seed their own RNGs (e.g., `StdRng::seed_from_u64(seed)`)
//! 3. No mutable state is shared across units
//!
//! # Error Handling
//!
//! A panic in one unit is caught and returned as `Err(String)`; the
//! remaining units run to completion.

use rayon::prelude::*;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;

type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Executes `num_units` independent closures in parallel
///
/// The builder `F` must be `Fn(usize) -> R + Send + Sync`: it receives the
/// unit index and returns that unit's result.
pub struct ParallelRunner<R, F>
where
    F: Fn(usize) -> R + Send + Sync,
    R: Send,
{
    num_units: usize,
    builder: F,
    num_threads: Option<usize>,
    progress_callback: Option<ProgressCallback>,
    _result: PhantomData<fn() -> R>,
}

impl<R, F> ParallelRunner<R, F>
where
    F: Fn(usize) -> R + Send + Sync,
    R: Send,
{
    pub fn new(num_units: usize, builder: F) -> Self {
        ParallelRunner {
            num_units,
            builder,
            num_threads: None,
            progress_callback: None,
            _result: PhantomData,
        }
    }

    /// Run on a dedicated pool of `n` threads instead of rayon's global pool
    pub fn num_threads(mut self, n: usize) -> Self {
        self.num_threads = Some(n);
        self
    }

    /// Called with `(completed, total)` after each unit finishes
    pub fn progress<P>(mut self, callback: P) -> Self
    where
        P: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Execute all units and return results in index order
    pub fn run(self) -> Vec<Result<R, String>> {
        let progress_counter = AtomicUsize::new(0);

        let execute = || {
            (0..self.num_units)
                .into_par_iter()
                .map(|index| {
                    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                        (self.builder)(index)
                    }));

                    let completed = progress_counter.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(ref callback) = self.progress_callback {
                        callback(completed, self.num_units);
                    }

                    result.map_err(|panic| {
                        if let Some(s) = panic.downcast_ref::<&str>() {
                            s.to_string()
                        } else if let Some(s) = panic.downcast_ref::<String>() {
                            s.clone()
                        } else {
                            "Unknown panic".to_string()
                        }
                    })
                })
                .collect()
        };

        // A pool that fails to build falls back to the global pool
        match self
            .num_threads
            .map(|n| rayon::ThreadPoolBuilder::new().num_threads(n).build())
        {
            Some(Ok(pool)) => pool.install(execute),
            Some(Err(e)) => {
                tracing::warn!(error = %e, "could not build thread pool, using global pool");
                execute()
            }
            None => execute(),
        }
    }
}

/// Progress callback that logs every `interval` completed units and at the end
pub fn logging_progress_reporter(interval: usize) -> impl Fn(usize, usize) + Send + Sync {
    let interval = interval.max(1);
    move |completed, total| {
        if completed % interval == 0 || completed == total {
            info!("completed {}/{} units", completed, total);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_parallel_basic() {
        let results = ParallelRunner::new(10, |index| index * 2).run();

        assert_eq!(results.len(), 10);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result, &Ok(i * 2));
        }
    }

    #[test]
    fn test_parallel_determinism() {
        let builder = |index: usize| (index as f64).sqrt();

        let run1 = ParallelRunner::new(20, builder).run();
        let run2 = ParallelRunner::new(20, builder).num_threads(3).run();

        assert_eq!(run1, run2);
    }

    #[test]
    fn test_parallel_panic_isolation() {
        let results = ParallelRunner::new(10, |index| {
            if index == 5 {
                panic!("Test panic");
            }
            index
        })
        .run();

        assert_eq!(results.len(), 10);
        assert_eq!(results[5], Err("Test panic".to_string()));
        for (i, result) in results.iter().enumerate() {
            if i != 5 {
                assert!(result.is_ok());
            }
        }
    }

    #[test]
    fn test_parallel_progress_callback() {
        let completed = Arc::new(Mutex::new(0));
        let completed_clone = completed.clone();

        ParallelRunner::new(5, |index| index)
            .progress(move |count, _total| {
                let mut max = completed_clone.lock().unwrap();
                *max = (*max).max(count);
            })
            .run();

        assert_eq!(*completed.lock().unwrap(), 5);
    }

    #[test]
    fn test_logging_progress_reporter() {
        let reporter = logging_progress_reporter(0);
        reporter(1, 3);
        reporter(3, 3);
    }

    #[test]
    fn test_empty_units() {
        let results: Vec<Result<usize, String>> = ParallelRunner::new(0, |index| index).run();
        assert!(results.is_empty());
    }
}
