#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for cpv
//!
//! This library consolidates all functionality for the cpv tool, which audits
//! Prometheus metric-collection profiles: it cross-references the rules loaded
//! into a Prometheus instance against the metrics each profile's monitors keep,
//! and can derive a profile's minimal metric set from external constraints.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface and orchestration
//! - [`promql`]: Metric-name extraction from `PromQL` expressions
//! - [`monitors`]: Pod/Service monitor model, listing, and keep-regex aggregation
//! - [`backend`]: Prometheus HTTP API client, metric universe, cardinality evaluation
//! - [`profiles`]: Collection profiles, reconciliation, extraction, and status
//! - [`reports`]: Tabular report sink and output artifacts

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[cfg(any(debug_assertions, test))]
pub mod backend;
#[cfg(not(any(debug_assertions, test)))]
mod backend;

#[cfg(any(debug_assertions, test))]
pub mod commands;
#[cfg(not(any(debug_assertions, test)))]
mod commands;

#[cfg(any(debug_assertions, test))]
pub mod context;
#[cfg(not(any(debug_assertions, test)))]
mod context;

#[cfg(any(debug_assertions, test))]
pub mod monitors;
#[cfg(not(any(debug_assertions, test)))]
mod monitors;

#[cfg(any(debug_assertions, test))]
pub mod profiles;
#[cfg(not(any(debug_assertions, test)))]
mod profiles;

#[cfg(any(debug_assertions, test))]
pub mod promql;
#[cfg(not(any(debug_assertions, test)))]
mod promql;

#[cfg(any(debug_assertions, test))]
pub mod reports;
#[cfg(not(any(debug_assertions, test)))]
mod reports;

pub use crate::commands::{Host, run};
