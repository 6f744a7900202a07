//! Prometheus Operator monitor model and keep-regex aggregation
//!
//! Monitors are `PodMonitor` and `ServiceMonitor` objects. Each endpoint may
//! declare metric relabelings, and a `keep` relabeling on `__name__` defines
//! which metrics the monitor admits. [`aggregate`] collapses those into one
//! admission regex per monitor.
//!
//! Listing is abstracted behind [`MonitorSource`] so that the cluster-backed
//! [`KubeMonitorSource`] can be swapped for an in-memory source in tests.

mod aggregator;
mod kube_source;
mod monitor;
mod source;

#[cfg(test)]
pub mod testing;

pub use aggregator::{RegexIndex, aggregate};
pub use kube_source::KubeMonitorSource;
pub use monitor::{Endpoint, Monitor, MonitorKind, RelabelRule};
pub use source::{MonitorSource, label_selector};
