//! Concurrent batch processing with settle-all semantics.

use futures::future::join_all;
use std::future::Future;

/// Processes items in fixed-size batches.
///
/// Batches run sequentially; the items inside one batch run concurrently,
/// and a batch only completes once every one of its futures has resolved.
/// Results are appended per batch in input order, so the output order is
/// the input order. One slow or failing member of a batch delays the
/// batch; it never gets dropped or reordered.
///
/// # Arguments
///
/// * `items` - Vector of items to process
/// * `batch_size` - Number of items processed concurrently per batch
/// * `processor` - Async function applied to each item and its index
///
/// # Examples
///
/// ```
/// # use core_llmx::batch::process_in_batches;
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let doubled = process_in_batches(vec![1, 2, 3], 2, |n, _index| async move { n * 2 }).await;
/// assert_eq!(doubled, vec![2, 4, 6]);
/// # });
/// ```
pub async fn process_in_batches<T, F, Fut, R>(items: Vec<T>, batch_size: usize, processor: F) -> Vec<R>
where
    F: Fn(T, usize) -> Fut,
    Fut: Future<Output = R>,
{
    let batch_size = batch_size.max(1);
    let mut results = Vec::with_capacity(items.len());

    let mut items = items.into_iter().enumerate().peekable();
    while items.peek().is_some() {
        let batch: Vec<Fut> = items
            .by_ref()
            .take(batch_size)
            .map(|(index, item)| processor(item, index))
            .collect();
        results.extend(join_all(batch).await);
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_process_in_batches_preserves_order() {
        let items = vec![1, 2, 3, 4, 5];
        let results = process_in_batches(items, 2, |item, index| async move { (index, item * 2) }).await;

        assert_eq!(results, vec![(0, 2), (1, 4), (2, 6), (3, 8), (4, 10)]);
    }

    #[tokio::test]
    async fn test_process_in_batches_caps_concurrency() {
        let concurrent_count = Arc::new(AtomicUsize::new(0));
        let max_concurrent = Arc::new(AtomicUsize::new(0));

        let items = vec![1, 2, 3, 4, 5, 6, 7, 8];
        let concurrent_count_clone = concurrent_count.clone();
        let max_concurrent_clone = max_concurrent.clone();

        let results = process_in_batches(items, 3, move |item, _index| {
            let concurrent_count = concurrent_count_clone.clone();
            let max_concurrent = max_concurrent_clone.clone();

            async move {
                let current = concurrent_count.fetch_add(1, Ordering::SeqCst) + 1;
                max_concurrent.fetch_max(current, Ordering::SeqCst);

                sleep(Duration::from_millis(10)).await;

                concurrent_count.fetch_sub(1, Ordering::SeqCst);
                item
            }
        })
        .await;

        assert_eq!(results.len(), 8);
        let max = max_concurrent.load(Ordering::SeqCst);
        assert!(max <= 3, "Max concurrent was {}, expected <= 3", max);
    }

    #[tokio::test]
    async fn test_process_in_batches_settles_before_next_batch() {
        // A batch member that finishes early must still wait for the whole
        // batch before any later item starts.
        let started = Arc::new(AtomicUsize::new(0));
        let started_clone = started.clone();

        process_in_batches(vec![40u64, 5, 5], 2, move |delay_ms, index| {
            let started = started_clone.clone();
            async move {
                if index == 2 {
                    // third item belongs to the second batch; by the time it
                    // starts, both first-batch members must have finished
                    assert_eq!(started.load(Ordering::SeqCst), 2);
                }
                sleep(Duration::from_millis(delay_ms)).await;
                started.fetch_add(1, Ordering::SeqCst);
            }
        })
        .await;

        assert_eq!(started.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_batch_size_is_treated_as_one() {
        let results = process_in_batches(vec![1, 2], 0, |item, _| async move { item }).await;
        assert_eq!(results, vec![1, 2]);
    }
}
