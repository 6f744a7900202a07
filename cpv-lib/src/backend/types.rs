use crate::promql::MetricName;
use serde::Deserialize;
use std::collections::BTreeMap;

/// One element of an instant vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub labels: BTreeMap<String, String>,
    pub value: f64,
}

pub type InstantVector = Vec<Sample>;

/// Filters for a targets-metadata request. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataSelector {
    /// Label selector over target labels, e.g. `{job="node-exporter"}`.
    pub match_target: Option<String>,
    pub metric: Option<MetricName>,
    pub limit: Option<u32>,
}

/// Metadata about one metric exposed by one scrape target.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TargetMetadata {
    #[serde(default)]
    pub target: BTreeMap<String, String>,

    pub metric: MetricName,

    #[serde(default, rename = "type")]
    pub metric_type: String,

    #[serde(default)]
    pub help: String,

    #[serde(default)]
    pub unit: String,
}

/// Rule kinds reported by the rules API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    Recording,
    Alerting,

    /// A kind this tool does not know about, carrying the raw value.
    Unknown(String),
}

impl From<&str> for RuleKind {
    fn from(value: &str) -> Self {
        match value {
            "recording" => Self::Recording,
            "alerting" => Self::Alerting,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// A rule loaded by the backend, together with the group it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: String,
    pub query: String,
    pub kind: RuleKind,
    pub group: String,

    /// The rule file the group was loaded from.
    pub file: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_kind_from_str() {
        assert_eq!(RuleKind::from("recording"), RuleKind::Recording);
        assert_eq!(RuleKind::from("alerting"), RuleKind::Alerting);
        assert_eq!(RuleKind::from("silencing"), RuleKind::Unknown("silencing".into()));
    }

    #[test]
    fn test_target_metadata_deserialize() {
        let json = r#"{
            "target": {"instance": "127.0.0.1:9090", "job": "prometheus"},
            "metric": "prometheus_treecache_zookeeper_failures_total",
            "type": "counter",
            "help": "The total number of ZooKeeper failures.",
            "unit": ""
        }"#;

        let md: TargetMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(md.metric, "prometheus_treecache_zookeeper_failures_total");
        assert_eq!(md.metric_type, "counter");
        assert_eq!(md.target.get("job").map(String::as_str), Some("prometheus"));
    }

    #[test]
    fn test_target_metadata_optional_fields() {
        let md: TargetMetadata = serde_json::from_str(r#"{"metric": "up"}"#).unwrap();
        assert_eq!(md.metric, "up");
        assert!(md.target.is_empty());
    }
}
