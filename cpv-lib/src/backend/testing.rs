//! In-memory backend for unit tests

use super::{InstantVector, MetadataSelector, MetricsBackend, Rule, RuleKind, Sample, TargetMetadata};
use crate::Result;
use chrono::{DateTime, Utc};
use core::sync::atomic::{AtomicUsize, Ordering};
use core::time::Duration;
use ohno::app_err;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct FakeBackend {
    pub metadata: Vec<TargetMetadata>,
    pub rules: Vec<Rule>,

    /// Result of `count(<metric>)` per metric; absent metrics fail the query.
    pub counts: HashMap<String, f64>,

    pub query_delay: Option<Duration>,
    pub calls: AtomicUsize,
    pub selectors: Mutex<Vec<MetadataSelector>>,
}

impl FakeBackend {
    pub fn with_loaded(metrics: &[&str]) -> Self {
        Self {
            metadata: metrics
                .iter()
                .map(|m| TargetMetadata {
                    target: BTreeMap::from([("job".to_string(), "test".to_string())]),
                    metric: (*m).to_string(),
                    metric_type: "gauge".to_string(),
                    help: String::new(),
                    unit: String::new(),
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn rule(name: &str, query: &str) -> Rule {
    Rule {
        name: name.to_string(),
        query: query.to_string(),
        kind: RuleKind::Alerting,
        group: "test-group".to_string(),
        file: "/etc/prometheus/rules/test.yaml".to_string(),
    }
}

impl MetricsBackend for FakeBackend {
    async fn query(&self, promql: &str, _time: DateTime<Utc>) -> Result<InstantVector> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.query_delay {
            tokio::time::sleep(delay).await;
        }

        let metric = promql
            .strip_prefix("count(")
            .and_then(|q| q.strip_suffix(')'))
            .ok_or_else(|| app_err!("unexpected query '{promql}'"))?;

        self.counts
            .get(metric)
            .map(|value| {
                vec![Sample {
                    labels: BTreeMap::new(),
                    value: *value,
                }]
            })
            .ok_or_else(|| app_err!("no series for '{metric}'"))
    }

    async fn targets_metadata(&self, selector: &MetadataSelector) -> Result<Vec<TargetMetadata>> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        self.selectors.lock().expect("lock not poisoned").push(selector.clone());
        Ok(self.metadata.clone())
    }

    async fn rules(&self) -> Result<Vec<Rule>> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.rules.clone())
    }
}
