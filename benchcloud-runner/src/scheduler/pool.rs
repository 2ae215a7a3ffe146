//! Bounded worker pool
//!
//! A fixed number of workers drain a shared queue. Each worker opens its
//! own service connection when it takes its first item and drops it when
//! the queue is empty. Cancellation is checked before every item, so items
//! not yet started are abandoned while running ones finish normally.

use benchcloud_client::RunService;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::connection::Connector;

/// What a pool run produced
#[derive(Debug)]
pub struct PoolOutcome<T, R> {
    /// Results of all items that were processed, in completion order
    pub results: Vec<R>,
    /// Items never started, because of cancellation or connection failures
    pub abandoned: Vec<T>,
}

type Queue<T> = Arc<Mutex<VecDeque<T>>>;

fn pop<T>(queue: &Queue<T>) -> Option<T> {
    queue.lock().unwrap_or_else(PoisonError::into_inner).pop_front()
}

/// Processes `items` with at most `workers` concurrent tasks
pub async fn run_pool<T, R, F, Fut>(
    connector: Arc<dyn Connector>,
    workers: usize,
    items: Vec<T>,
    cancel: CancellationToken,
    task: F,
) -> PoolOutcome<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(Arc<dyn RunService>, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
{
    let workers = workers.max(1).min(items.len());
    let queue: Queue<T> = Arc::new(Mutex::new(items.into()));
    let task = Arc::new(task);

    let handles: Vec<_> = (0..workers)
        .map(|worker| {
            let queue = Arc::clone(&queue);
            let connector = Arc::clone(&connector);
            let cancel = cancel.clone();
            let task = Arc::clone(&task);

            tokio::spawn(async move {
                let mut connection: Option<Arc<dyn RunService>> = None;
                let mut results = Vec::new();

                while !cancel.is_cancelled() {
                    let Some(item) = pop(&queue) else {
                        break;
                    };

                    let service = match &connection {
                        Some(service) => Arc::clone(service),
                        None => match connector.connect() {
                            Ok(service) => {
                                debug!("Worker {} connected", worker);
                                connection = Some(Arc::clone(&service));
                                service
                            }
                            Err(e) => {
                                error!("Worker {} could not connect: {}", worker, e);
                                queue
                                    .lock()
                                    .unwrap_or_else(PoisonError::into_inner)
                                    .push_front(item);
                                break;
                            }
                        },
                    };

                    results.push(task(service, item).await);
                }

                results
            })
        })
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        match handle.await {
            Ok(worker_results) => results.extend(worker_results),
            Err(e) => warn!("Worker task panicked: {}", e),
        }
    }

    let abandoned: Vec<T> = queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .drain(..)
        .collect();

    if !abandoned.is_empty() {
        debug!("{} item(s) were not started", abandoned.len());
    }

    PoolOutcome { results, abandoned }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedConnector, ScriptedService};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_processes_all_items_with_bounded_concurrency() {
        let service = ScriptedService::new();
        let connector = ScriptedConnector::new(service);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let outcome = {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            run_pool(
                connector.clone(),
                3,
                (0..10).collect::<Vec<u32>>(),
                CancellationToken::new(),
                move |_service, item| {
                    let running = Arc::clone(&running);
                    let peak = Arc::clone(&peak);
                    async move {
                        let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        running.fetch_sub(1, Ordering::SeqCst);
                        item * 2
                    }
                },
            )
            .await
        };

        let mut results = outcome.results;
        results.sort();
        assert_eq!(results, (0..10).map(|i| i * 2).collect::<Vec<u32>>());
        assert!(outcome.abandoned.is_empty());
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(connector.connections(), 3);
    }

    #[tokio::test]
    async fn test_cancelled_pool_starts_nothing() {
        let service = ScriptedService::new();
        let connector = ScriptedConnector::new(service);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = run_pool(connector.clone(), 2, vec![1, 2, 3], cancel, |_service, item| async move {
            item
        })
        .await;

        assert!(outcome.results.is_empty());
        assert_eq!(outcome.abandoned, vec![1, 2, 3]);
        assert_eq!(connector.connections(), 0);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let service = ScriptedService::new();
        let connector = ScriptedConnector::new(service);

        let outcome: PoolOutcome<u32, u32> =
            run_pool(connector.clone(), 5, Vec::new(), CancellationToken::new(), |_service, item| async move {
                item
            })
            .await;

        assert!(outcome.results.is_empty());
        assert_eq!(connector.connections(), 0);
    }
}
