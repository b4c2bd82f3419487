//! Order-preserving parallel work scheduling.
//!
//! Per-region work (feature extraction plus classification) is split into at
//! most `max_workers` contiguous chunks and dispatched on a dedicated rayon
//! pool. Chunk results are reassembled in input order, so the parallel and
//! sequential paths produce identical output for the same input.

use crate::error::DetectError;

/// Runs closures over item lists, sequentially or on an owned thread pool.
pub struct ParallelScheduler {
    pool: Option<rayon::ThreadPool>,
    max_workers: usize,
}

impl ParallelScheduler {
    /// `parallel_enabled = false` or `max_workers <= 1` selects the
    /// sequential path without building a pool.
    pub fn new(parallel_enabled: bool, max_workers: usize) -> Result<Self, DetectError> {
        let pool = if parallel_enabled && max_workers > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(max_workers)
                .thread_name(|i| format!("recognizer-{i}"))
                .build()
                .map_err(|e| DetectError::InvalidParameter {
                    field: "performance.max_workers",
                    message: format!("failed to build thread pool: {e}"),
                })?;
            Some(pool)
        } else {
            None
        };
        Ok(Self {
            pool,
            max_workers: max_workers.max(1),
        })
    }

    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    /// Apply `f` to every item, returning results in input order.
    pub fn map_ordered<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync,
    {
        match &self.pool {
            None => items.into_iter().map(f).collect(),
            Some(pool) => {
                if items.is_empty() {
                    return Vec::new();
                }
                let chunk_len = items.len().div_ceil(self.max_workers);
                let chunks: Vec<Vec<T>> = {
                    let mut chunks = Vec::with_capacity(self.max_workers);
                    let mut rest = items;
                    while rest.len() > chunk_len {
                        let tail = rest.split_off(chunk_len);
                        chunks.push(rest);
                        rest = tail;
                    }
                    chunks.push(rest);
                    chunks
                };
                pool.install(|| {
                    use rayon::prelude::*;
                    chunks
                        .into_par_iter()
                        .map(|chunk| chunk.into_iter().map(&f).collect::<Vec<R>>())
                        .collect::<Vec<Vec<R>>>()
                })
                .into_iter()
                .flatten()
                .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_and_parallel_agree_on_order() {
        let items: Vec<u32> = (0..103).collect();
        let seq = ParallelScheduler::new(false, 4).unwrap();
        let par = ParallelScheduler::new(true, 4).unwrap();
        assert!(!seq.is_parallel());
        assert!(par.is_parallel());

        let a = seq.map_ordered(items.clone(), |x| x * 2 + 1);
        let b = par.map_ordered(items, |x| x * 2 + 1);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let par = ParallelScheduler::new(true, 4).unwrap();
        let out: Vec<u32> = par.map_ordered(Vec::<u32>::new(), |x| x);
        assert!(out.is_empty());
    }

    #[test]
    fn single_worker_runs_sequentially() {
        let sched = ParallelScheduler::new(true, 1).unwrap();
        assert!(!sched.is_parallel());
        let out = sched.map_ordered(vec![3, 1, 2], |x| x);
        assert_eq!(out, vec![3, 1, 2]);
    }

    #[test]
    fn fewer_items_than_workers_is_fine() {
        let par = ParallelScheduler::new(true, 8).unwrap();
        let out = par.map_ordered(vec![10, 20], |x| x + 1);
        assert_eq!(out, vec![11, 21]);
    }
}
