//! Prometheus metrics backend
//!
//! This module defines the [`MetricsBackend`] capability the audit consumes,
//! an HTTP implementation of it speaking the Prometheus v1 API ([`Client`]),
//! and the two computations built directly on top of it:
//!
//! - [`loaded_metrics`] builds the set of metric names currently scraped.
//! - [`evaluate_cardinality`] counts series per metric concurrently and
//!   orders the result by count, highest first.

mod cardinality;
mod client;
mod types;
mod universe;

#[cfg(test)]
pub mod testing;

pub use cardinality::{CardinalityRecord, evaluate_cardinality};
pub use client::Client;
pub use types::{InstantVector, MetadataSelector, Rule, RuleKind, Sample, TargetMetadata};
pub use universe::loaded_metrics;

use crate::Result;
use chrono::{DateTime, Utc};

/// The query capabilities of a Prometheus-compatible backend.
pub trait MetricsBackend: Send + Sync {
    /// Evaluate an instant query at `time`.
    fn query(&self, promql: &str, time: DateTime<Utc>) -> impl Future<Output = Result<InstantVector>> + Send;

    /// Fetch metric metadata from the backend's scrape targets.
    fn targets_metadata(&self, selector: &MetadataSelector) -> impl Future<Output = Result<Vec<TargetMetadata>>> + Send;

    /// Fetch every recording and alerting rule loaded by the backend.
    fn rules(&self) -> impl Future<Output = Result<Vec<Rule>>> + Send;
}
