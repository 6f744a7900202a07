//! Metric-name extraction from `PromQL` expressions
//!
//! Queries are parsed with the `promql-parser` grammar and the resulting tree
//! is walked in full, collecting the metric name of every vector selector
//! (including selectors wrapped by range vectors and subqueries).
//!
//! Two entry points are offered:
//!
//! - [`extract_metrics`] accepts only equality label matchers and fails the
//!   whole expression otherwise. It guards expressions that are handed to the
//!   backend as target matchers.
//! - [`referenced_metrics`] accepts every matcher operator and is used for
//!   rule queries, where regex and inequality matchers are routine.

mod extractor;

pub use extractor::{ExtractError, extract_metrics, referenced_metrics};

/// An exact-match time-series family name.
pub type MetricName = String;
