use super::{MetadataSelector, MetricsBackend};
use crate::Result;
use crate::promql::MetricName;
use ohno::EnrichableExt;
use std::collections::BTreeSet;

const LOG_TARGET: &str = "  universe";

/// Build the set of metric names currently scraped by the backend.
///
/// Issues a single unfiltered targets-metadata request. The result is a
/// snapshot and is not cached across calls.
///
/// # Errors
///
/// Returns the backend error unchanged apart from added context.
pub async fn loaded_metrics<B: MetricsBackend>(backend: &B) -> Result<BTreeSet<MetricName>> {
    let metadata = backend
        .targets_metadata(&MetadataSelector::default())
        .await
        .map_err(|e| e.enrich("fetching metadata of loaded metrics"))?;

    let loaded: BTreeSet<_> = metadata.into_iter().map(|md| md.metric).collect();
    log::info!(target: LOG_TARGET, "Backend currently loads {} distinct metrics", loaded.len());

    Ok(loaded)
}
