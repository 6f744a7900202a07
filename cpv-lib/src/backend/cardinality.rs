use super::{InstantVector, MetricsBackend};
use crate::context::RunContext;
use crate::promql::MetricName;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Semaphore;

const LOG_TARGET: &str = "cardinality";

/// Number of series currently held for a metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardinalityRecord {
    pub metric: MetricName,
    pub count: u64,
}

/// Count the series of every metric concurrently, highest count first.
///
/// One task is spawned per distinct metric, each issuing `count(<metric>)`.
/// A failed query yields a zero count for that metric. Tasks that observe the
/// run as cancelled before their query completes contribute nothing, so the
/// result may be shorter than the input. Ties are left in no particular order.
pub async fn evaluate_cardinality<B>(
    metrics: impl IntoIterator<Item = MetricName>,
    backend: Arc<B>,
    ctx: &RunContext,
) -> Vec<CardinalityRecord>
where
    B: MetricsBackend + 'static,
{
    let limiter = ctx.cardinality_concurrency().map(|n| Arc::new(Semaphore::new(n.get())));
    let now = Utc::now();

    let distinct: BTreeSet<_> = metrics.into_iter().collect();
    log::info!(target: LOG_TARGET, "Evaluating cardinality of {} metrics", distinct.len());

    let mut records: Vec<_> = join_all(distinct.into_iter().map(|metric| {
        let backend = Arc::clone(&backend);
        let ctx = ctx.clone();
        let limiter = limiter.clone();

        tokio::spawn(count_series(backend, metric, now, ctx, limiter))
    }))
    .await
    .into_iter()
    .filter_map(|task_result| task_result.expect("tasks must not panic"))
    .collect();

    records.sort_by(|a, b| b.count.cmp(&a.count));
    records
}

async fn count_series<B: MetricsBackend>(
    backend: Arc<B>,
    metric: MetricName,
    now: DateTime<Utc>,
    ctx: RunContext,
    limiter: Option<Arc<Semaphore>>,
) -> Option<CardinalityRecord> {
    let _permit = match limiter {
        Some(semaphore) => Some(tokio::select! {
            permit = semaphore.acquire_owned() => permit.ok()?,
            () = ctx.cancellation().cancelled() => return None,
        }),
        None => None,
    };

    if ctx.is_cancelled() {
        log::debug!(target: LOG_TARGET, "Skipping '{metric}', run was cancelled");
        return None;
    }

    let query = format!("count({metric})");
    match ctx.guard(&query, backend.query(&query, now)).await {
        Ok(vector) => Some(CardinalityRecord {
            count: total(&vector),
            metric,
        }),
        Err(_) if ctx.is_cancelled() => None,
        Err(e) => {
            log::warn!(target: LOG_TARGET, "Could not count series of '{metric}', assuming none: {e:#}");
            Some(CardinalityRecord { metric, count: 0 })
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the sum is clamped to a non-negative finite value before conversion"
)]
fn total(vector: &InstantVector) -> u64 {
    let sum: f64 = vector.iter().map(|s| s.value).filter(|v| v.is_finite()).sum();
    sum.max(0.0).round() as u64
}
