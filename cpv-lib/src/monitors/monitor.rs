use crate::Result;
use ohno::IntoAppError;
use serde::Deserialize;
use serde_json::Value;

/// The two monitor resource kinds understood by the Prometheus Operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display, strum::EnumIter)]
pub enum MonitorKind {
    #[strum(serialize = "PodMonitor")]
    Pod,

    #[strum(serialize = "ServiceMonitor")]
    Service,
}

/// A single relabeling step as declared under `metricRelabelings`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelabelRule {
    #[serde(default)]
    pub action: Option<String>,

    #[serde(default)]
    pub source_labels: Vec<String>,

    #[serde(default)]
    pub regex: Option<String>,
}

impl RelabelRule {
    /// Returns the admission regex if this is a `keep` rule over `__name__` alone.
    #[must_use]
    pub fn keep_regex(&self) -> Option<&str> {
        let is_keep = self.action.as_deref().is_some_and(|a| a.eq_ignore_ascii_case("keep"));
        let on_name = matches!(self.source_labels.as_slice(), [label] if label == "__name__");

        // an absent regex means the relabel default, which admits everything
        (is_keep && on_name).then(|| self.regex.as_deref().unwrap_or("(.*)"))
    }
}

/// A scrape endpoint of a monitor, reduced to what the audit needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    #[serde(default)]
    pub metric_relabelings: Vec<RelabelRule>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceMonitorSpec {
    #[serde(default)]
    endpoints: Vec<Endpoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PodMonitorSpec {
    #[serde(default)]
    pod_metrics_endpoints: Vec<Endpoint>,
}

/// A monitor resource read from the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monitor {
    pub name: String,
    pub kind: MonitorKind,

    /// Value of the collection-profile label, if the monitor carries one.
    pub profile: Option<String>,

    pub endpoints: Vec<Endpoint>,
}

impl Monitor {
    /// Build a monitor from the raw `spec` object of a `PodMonitor` or `ServiceMonitor`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint list does not have the expected shape.
    pub fn from_spec(kind: MonitorKind, name: impl Into<String>, profile: Option<String>, spec: Value) -> Result<Self> {
        let name = name.into();
        let endpoints = match kind {
            MonitorKind::Pod => {
                serde_json::from_value::<PodMonitorSpec>(spec)
                    .into_app_err_with(|| format!("decoding spec of {kind} '{name}'"))?
                    .pod_metrics_endpoints
            }
            MonitorKind::Service => {
                serde_json::from_value::<ServiceMonitorSpec>(spec)
                    .into_app_err_with(|| format!("decoding spec of {kind} '{name}'"))?
                    .endpoints
            }
        };

        Ok(Self {
            name,
            kind,
            profile,
            endpoints,
        })
    }

    /// Admission regexes declared by this monitor, in declaration order.
    pub fn keep_regexes(&self) -> impl Iterator<Item = &str> {
        self.endpoints
            .iter()
            .flat_map(|e| e.metric_relabelings.iter())
            .filter_map(RelabelRule::keep_regex)
    }
}
