// Worker pool with a fixed, read-only context.
//
// Each training phase builds its own pool and hands it the shared state the
// tasks need (vectorizer and index, or relation matrices and statistics).
// Tasks receive that context by reference, so large structures are never
// copied per task and nothing is shared mutably. Dropping the pool shuts its
// threads down, which happens on every exit path of the owning phase.

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

pub struct WorkerPool<C> {
    pool: ThreadPool,
    context: C,
    chunk_size: usize,
}

impl<C: Sync> WorkerPool<C> {
    /// Start `jobs` worker threads sharing `context`. Work is split into
    /// pieces of at least `chunk_size` items.
    pub fn new(jobs: usize, chunk_size: usize, context: C) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(jobs.max(1))
            .thread_name(|i| format!("mllm-worker-{i}"))
            .build()
            .context("Failed to start worker pool")?;
        Ok(Self {
            pool,
            context,
            chunk_size: chunk_size.max(1),
        })
    }

    /// Run `task` on every item. Results come back in item order regardless
    /// of completion order. The first task error aborts the whole map.
    pub fn map<T, R, F>(&self, items: &[T], progress: &ProgressBar, task: F) -> Result<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&C, &T) -> Result<R> + Sync,
    {
        let context = &self.context;
        self.pool.install(|| {
            items
                .par_iter()
                .with_min_len(self.chunk_size)
                .map(|item| {
                    let result = task(context, item);
                    progress.inc(1);
                    result
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_preserves_item_order() {
        let pool = WorkerPool::new(4, 3, 10u64).unwrap();
        let items: Vec<u64> = (0..100).collect();
        let out = pool
            .map(&items, &ProgressBar::hidden(), |offset, item| Ok(item + offset))
            .unwrap();
        assert_eq!(out, (10..110).collect::<Vec<u64>>());
    }

    #[test]
    fn test_task_error_aborts_map() {
        let pool = WorkerPool::new(2, 1, ()).unwrap();
        let items: Vec<u32> = (0..20).collect();
        let result = pool.map(&items, &ProgressBar::hidden(), |_, &item| {
            if item == 13 {
                anyhow::bail!("task {item} failed");
            }
            Ok(item)
        });
        assert!(result.is_err());
    }
}
