//! Harvest coordination
//!
//! [`HarvestCoordinator`] fans one harvesting task per identifier out into a
//! bounded worker pool and collects completions into a [`HarvestOutcome`].
//!
//! - The pool never runs more than `concurrency` harvests simultaneously,
//!   regardless of how many identifiers are queued.
//! - Results are collected in completion order, not submission order.
//! - A task that fails or panics is recorded as a failure entry keyed by its
//!   identifier and never cancels sibling tasks: the coordinator always
//!   returns a best-effort outcome.

use crate::harvest::harvester::CommentHarvester;
use crate::harvest::{ContentId, ContentResult, HarvestFailure, HarvestOutcome};
use crate::{HarvestError, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Runs many harvests concurrently under a bounded worker pool
pub struct HarvestCoordinator {
    harvester: CommentHarvester,
    concurrency: usize,
}

impl HarvestCoordinator {
    /// Creates a new coordinator
    ///
    /// # Arguments
    ///
    /// * `harvester` - The per-identifier harvester; cloned into each worker
    /// * `concurrency` - Maximum simultaneous harvests (validated >= 1 at
    ///   configuration time)
    pub fn new(harvester: CommentHarvester, concurrency: usize) -> Self {
        Self {
            harvester,
            concurrency,
        }
    }

    /// Harvests every identifier and returns the aggregate outcome
    ///
    /// Never fails from the caller's perspective: per-identifier errors land
    /// in the failure tally and the caller inspects counts to decide whether
    /// the harvested volume is sufficient.
    pub async fn run(&self, identifiers: Vec<ContentId>) -> HarvestOutcome {
        let total = identifiers.len();
        tracing::info!(
            "Harvesting {} identifiers with concurrency {}",
            total,
            self.concurrency
        );

        let harvester = self.harvester.clone();
        let completions = run_bounded(identifiers, self.concurrency, move |id| {
            let harvester = harvester.clone();
            async move { harvester.harvest(id).await }
        })
        .await;

        let mut outcome = HarvestOutcome::default();
        for (id, result) in completions {
            match result {
                Ok(content) => outcome.results.push(content),
                Err(e) => {
                    tracing::warn!("Identifier {} failed: {}", id, e);
                    outcome.failures.push(HarvestFailure::from_error(id, &e));
                }
            }
        }

        tracing::info!(
            "Harvest complete: attempted {}, succeeded {}, failed {}, {} comments",
            outcome.attempted(),
            outcome.succeeded(),
            outcome.failed(),
            outcome.total_comments()
        );

        outcome
    }
}

/// Fans tasks out under a semaphore and collects completions as they finish
///
/// Each task runs on its own spawned task so that a panic is contained at
/// this boundary: the panicked identifier becomes a failure entry and sibling
/// tasks keep running. The returned vector is in completion order.
async fn run_bounded<F, Fut>(
    identifiers: Vec<ContentId>,
    concurrency: usize,
    task: F,
) -> Vec<(ContentId, Result<ContentResult>)>
where
    F: Fn(ContentId) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = Result<ContentResult>> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut workers = JoinSet::new();

    for id in identifiers {
        let semaphore = Arc::clone(&semaphore);
        let task = task.clone();

        workers.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    // The semaphore is never closed while workers exist
                    return (
                        id.clone(),
                        Err(HarvestError::TaskPanic {
                            id: id.to_string(),
                            message: "worker pool closed unexpectedly".to_string(),
                        }),
                    );
                }
            };

            // Inner spawn contains a panic to this identifier
            let inner = tokio::spawn(task(id.clone()));
            let result = match inner.await {
                Ok(result) => result,
                Err(join_error) => Err(HarvestError::TaskPanic {
                    id: id.to_string(),
                    message: join_error.to_string(),
                }),
            };

            (id, result)
        });
    }

    let mut completions = Vec::new();
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(pair) => completions.push(pair),
            // The outer worker holds no harvesting logic, so this branch is
            // only reachable through runtime shutdown
            Err(e) => tracing::error!("Worker join failed: {}", e),
        }
    }

    completions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::StreamId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn stub_result(id: &ContentId, comment_count: usize) -> ContentResult {
        ContentResult {
            id: id.clone(),
            title: format!("Video {}", id),
            author: "uploader".to_string(),
            streams: vec![StreamId::new(1)],
            failed_streams: vec![],
            comments: (0..comment_count).map(|i| format!("comment {}", i)).collect(),
        }
    }

    fn identifiers(count: usize) -> Vec<ContentId> {
        (0..count).map(|i| ContentId::new(format!("BV{:04}", i))).collect()
    }

    #[tokio::test]
    async fn test_pool_never_exceeds_concurrency() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_observed = Arc::new(AtomicUsize::new(0));

        let in_flight_probe = Arc::clone(&in_flight);
        let max_probe = Arc::clone(&max_observed);

        let completions = run_bounded(identifiers(20), 5, move |id| {
            let in_flight = Arc::clone(&in_flight_probe);
            let max_observed = Arc::clone(&max_probe);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max_observed.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(stub_result(&id, 1))
            }
        })
        .await;

        assert_eq!(completions.len(), 20);
        assert!(max_observed.load(Ordering::SeqCst) <= 5);
        // With 20 tasks and a pool of 5, the pool should actually fill
        assert!(max_observed.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_outcome_counts_with_mixed_results() {
        let harvester_results = move |id: ContentId| async move {
            // Two identifiers fail permanently, the rest succeed with 100
            // comments each
            if id.as_str() == "BV0003" || id.as_str() == "BV0007" {
                Err(HarvestError::Resolution {
                    id: id.to_string(),
                    reason: "metadata endpoint returned code -404".to_string(),
                })
            } else {
                Ok(stub_result(&id, 100))
            }
        };

        let completions = run_bounded(identifiers(10), 5, harvester_results).await;

        let mut outcome = HarvestOutcome::default();
        for (id, result) in completions {
            match result {
                Ok(r) => outcome.results.push(r),
                Err(e) => outcome.failures.push(HarvestFailure::from_error(id, &e)),
            }
        }

        assert_eq!(outcome.attempted(), 10);
        assert_eq!(outcome.succeeded(), 8);
        assert_eq!(outcome.failed(), 2);
        assert_eq!(outcome.total_comments(), 800);
    }

    #[tokio::test]
    async fn test_panic_contained_as_failure_entry() {
        let completions = run_bounded(identifiers(4), 2, move |id| async move {
            if id.as_str() == "BV0002" {
                panic!("worker exploded");
            }
            Ok(stub_result(&id, 1))
        })
        .await;

        assert_eq!(completions.len(), 4);
        let panicked: Vec<_> = completions
            .iter()
            .filter(|(_, r)| matches!(r, Err(HarvestError::TaskPanic { .. })))
            .collect();
        assert_eq!(panicked.len(), 1);
        assert_eq!(panicked[0].0.as_str(), "BV0002");

        // Siblings were unaffected
        let succeeded = completions.iter().filter(|(_, r)| r.is_ok()).count();
        assert_eq!(succeeded, 3);
    }

    #[tokio::test]
    async fn test_empty_identifier_set() {
        let completions =
            run_bounded(Vec::new(), 5, move |id| async move { Ok(stub_result(&id, 0)) }).await;
        assert!(completions.is_empty());
    }
}
