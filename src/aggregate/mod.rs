// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Ordered fan-out/fan-in over a bounded worker pool
//!
//! Each task is spawned onto the runtime and must first take a permit from
//! the aggregator's semaphore, so at most `workers` tasks of one aggregator
//! run at the same time across every in-flight request. Results come back
//! in submission order. A failed or panicked task contributes `R::default()`
//! and never disturbs its siblings.

use futures::future::join_all;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Outcome of one aggregation round
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateReport<R> {
    /// One entry per submitted task, in submission order
    pub results: Vec<R>,
    /// Indices of tasks that failed and were replaced by the default value
    pub failed: Vec<usize>,
}

/// Long-lived bounded worker pool
#[derive(Clone)]
pub struct Aggregator {
    label: &'static str,
    permits: Arc<Semaphore>,
    workers: usize,
}

impl Aggregator {
    /// Create a new aggregator
    ///
    /// # Arguments
    /// * `label` - Task kind, used in logs
    /// * `workers` - Maximum concurrently running tasks (at least 1)
    pub fn new(label: &'static str, workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            label,
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    /// Run every task and return their results in submission order
    pub async fn run<T, F, Fut, R, E>(&self, tasks: Vec<T>, work: F) -> Vec<R>
    where
        T: Send + 'static,
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        R: Default + Send + 'static,
        E: Display + Send + 'static,
    {
        self.run_detailed(tasks, work).await.results
    }

    /// Like [`Aggregator::run`], also reporting which slots failed
    pub async fn run_detailed<T, F, Fut, R, E>(&self, tasks: Vec<T>, work: F) -> AggregateReport<R>
    where
        T: Send + 'static,
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        R: Default + Send + 'static,
        E: Display + Send + 'static,
    {
        let start = Instant::now();
        let total = tasks.len();

        let handles: Vec<_> = tasks
            .into_iter()
            .map(|task| {
                let permits = Arc::clone(&self.permits);
                let fut = work(task);
                tokio::spawn(async move {
                    let _permit = permits
                        .acquire_owned()
                        .await
                        .map_err(|e| e.to_string())?;
                    fut.await.map_err(|e| e.to_string())
                })
            })
            .collect();

        let mut results = Vec::with_capacity(total);
        let mut failed = Vec::new();

        for (index, outcome) in join_all(handles).await.into_iter().enumerate() {
            match outcome {
                Ok(Ok(result)) => results.push(result),
                Ok(Err(e)) => {
                    warn!("{} task {} failed: {}", self.label, index, e);
                    failed.push(index);
                    results.push(R::default());
                }
                Err(e) => {
                    warn!("{} task {} aborted: {}", self.label, index, e);
                    failed.push(index);
                    results.push(R::default());
                }
            }
        }

        debug!(
            "{} aggregation: {} tasks on {} workers, {} failed, {}ms",
            self.label,
            total,
            self.workers,
            failed.len(),
            start.elapsed().as_millis()
        );

        AggregateReport { results, failed }
    }
}
