//! Order-preserving parallel map over scoped worker threads
//!
//! Parsing source units and running generators per declaration are both
//! embarrassingly parallel. Results always come back in input order so the
//! caller never has to re-sort to stay deterministic.

use std::num::NonZeroUsize;

/// Resolve a configured worker count; `0` means available parallelism.
pub fn resolve_jobs(jobs: usize) -> usize {
    if jobs > 0 {
        return jobs;
    }
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Apply `f` to every item on up to `jobs` workers, returning results in input order.
///
/// A panic in a worker is resumed on the calling thread.
pub fn map_ordered<T, R, F>(items: &[T], jobs: usize, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    let workers = resolve_jobs(jobs).min(items.len());
    if workers <= 1 {
        return items.iter().map(&f).collect();
    }

    let chunk_size = items.len().div_ceil(workers);
    let f = &f;

    std::thread::scope(|scope| {
        let handles: Vec<_> = items
            .chunks(chunk_size)
            .map(|chunk| scope.spawn(move || chunk.iter().map(f).collect::<Vec<R>>()))
            .collect();

        let mut results = Vec::with_capacity(items.len());
        for handle in handles {
            match handle.join() {
                Ok(chunk) => results.extend(chunk),
                Err(payload) => std::panic::resume_unwind(payload),
            }
        }
        results
    })
}

#[cfg(test)]
#[path = "parallel/parallel_tests.rs"]
mod parallel_tests;
