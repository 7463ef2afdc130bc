//! Batch executor.

use futures::StreamExt;
use std::future::Future;

/// Runs one future per item with bounded concurrency and returns the results
/// in input order, whatever order they complete in.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchExecutor {
    concurrency_limit: Option<usize>,
}

impl BatchExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` runs every item at once.
    pub fn with_concurrency_limit(mut self, limit: Option<usize>) -> Self {
        self.concurrency_limit = limit;
        self
    }

    pub fn concurrency_limit(&self) -> Option<usize> {
        self.concurrency_limit
    }

    pub async fn run<T, R, F, Fut>(&self, items: Vec<T>, executor_fn: F) -> Vec<R>
    where
        F: Fn(T) -> Fut,
        Fut: Future<Output = R>,
    {
        let n = items.len();
        if n == 0 {
            return Vec::new();
        }
        let limit = self.concurrency_limit.unwrap_or(n).clamp(1, n);

        let mut results: Vec<(usize, R)> = futures::stream::iter(items.into_iter().enumerate())
            .map(|(idx, item)| {
                let fut = executor_fn(item);
                async move { (idx, fut.await) }
            })
            .buffer_unordered(limit)
            .collect()
            .await;

        results.sort_by_key(|(idx, _)| *idx);
        results.into_iter().map(|(_, r)| r).collect()
    }
}
