//! Cooperative worker pool over a shared job list
//!
//! Workers are plain futures joined on the calling task, so they interleave
//! only at `.await` points. The job list is the only shared state; a claim is
//! a single `pop_front` under the lock, and the lock is never held across an
//! await.

use futures::future::join_all;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Fixed-size pool of cooperative workers
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    concurrency: usize,
    pause: Duration,
}

impl WorkerPool {
    /// Creates a pool; `concurrency` is raised to at least 1
    ///
    /// # Arguments
    ///
    /// * `concurrency` - Number of workers
    /// * `pause` - Delay each worker takes after finishing a job
    pub fn new(concurrency: usize, pause: Duration) -> Self {
        Self {
            concurrency: concurrency.max(1),
            pause,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn pause(&self) -> Duration {
        self.pause
    }

    /// Runs `job` once for every item and returns when all workers are done
    ///
    /// Each item is claimed by exactly one worker. Results are returned in
    /// completion order.
    pub async fn run<I, T, F, Fut>(&self, items: Vec<I>, job: F) -> Vec<T>
    where
        F: Fn(I) -> Fut,
        Fut: Future<Output = T>,
    {
        let total = items.len();
        let queue = Mutex::new(VecDeque::from(items));
        let results = Mutex::new(Vec::with_capacity(total));

        let workers = (0..self.concurrency).map(|id| self.worker(id, &queue, &results, &job));
        join_all(workers).await;

        results.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn worker<I, T, F, Fut>(
        &self,
        id: usize,
        queue: &Mutex<VecDeque<I>>,
        results: &Mutex<Vec<T>>,
        job: &F,
    ) where
        F: Fn(I) -> Fut,
        Fut: Future<Output = T>,
    {
        let mut handled = 0usize;

        loop {
            // Claim under the lock, then release it before awaiting
            let next = lock(queue).pop_front();
            let Some(item) = next else {
                break;
            };

            let result = job(item).await;
            lock(results).push(result);
            handled += 1;

            if !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
        }

        tracing::debug!("Worker {} finished after {} job(s)", id, handled);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
