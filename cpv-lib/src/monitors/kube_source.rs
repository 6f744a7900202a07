use super::{Monitor, MonitorKind, MonitorSource};
use crate::Result;
use camino::Utf8Path;
use core::fmt;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, ApiResource, DynamicObject, GroupVersionKind, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use ohno::IntoAppError;
use serde_json::{Map, Value};

const LOG_TARGET: &str = "  monitors";

const MONITORING_GROUP: &str = "monitoring.coreos.com";
const MONITORING_VERSION: &str = "v1";

/// Lists `PodMonitor` and `ServiceMonitor` objects from a Kubernetes cluster.
#[derive(Clone)]
pub struct KubeMonitorSource {
    client: kube::Client,
    profile_label: String,
}

impl fmt::Debug for KubeMonitorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubeMonitorSource")
            .field("profile_label", &self.profile_label)
            .finish_non_exhaustive()
    }
}

impl KubeMonitorSource {
    /// Connect using an explicit kubeconfig file, or the inferred in-cluster/local configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read or the client cannot be created.
    pub async fn connect(kubeconfig: Option<&Utf8Path>, profile_label: impl Into<String>) -> Result<Self> {
        let config = match kubeconfig {
            Some(path) => {
                let kubeconfig = Kubeconfig::read_from(path).into_app_err_with(|| format!("reading kubeconfig '{path}'"))?;
                kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                    .await
                    .into_app_err_with(|| format!("loading kubeconfig '{path}'"))?
            }
            None => kube::Config::infer().await.into_app_err("inferring cluster configuration")?,
        };

        log::debug!(target: LOG_TARGET, "Using cluster at {}", config.cluster_url);

        Ok(Self {
            client: kube::Client::try_from(config).into_app_err("creating cluster client")?,
            profile_label: profile_label.into(),
        })
    }
}

impl MonitorSource for KubeMonitorSource {
    async fn list(&self, kind: MonitorKind, label_selector: &str) -> Result<Vec<Monitor>> {
        let gvk = GroupVersionKind::gvk(MONITORING_GROUP, MONITORING_VERSION, &kind.to_string());
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), &ApiResource::from_gvk(&gvk));

        let objects = api
            .list(&ListParams::default().labels(label_selector))
            .await
            .into_app_err_with(|| format!("listing {kind}s matching '{label_selector}'"))?;

        log::debug!(target: LOG_TARGET, "Found {} {kind}(s) matching '{label_selector}'", objects.items.len());

        objects
            .items
            .into_iter()
            .map(|object| monitor_from_object(kind, object, &self.profile_label))
            .collect()
    }
}

fn profile_of(metadata: &ObjectMeta, profile_label: &str) -> Option<String> {
    metadata.labels.as_ref().and_then(|labels| labels.get(profile_label)).cloned()
}

fn monitor_from_object(kind: MonitorKind, object: DynamicObject, profile_label: &str) -> Result<Monitor> {
    let profile = profile_of(&object.metadata, profile_label);
    let name = object.metadata.name.unwrap_or_default();
    let spec = object.data.get("spec").cloned().unwrap_or_else(|| Value::Object(Map::new()));

    Monitor::from_spec(kind, name, profile, spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    const LABEL: &str = "monitoring.openshift.io/collection-profile";

    fn object(name: &str, labels: &[(&str, &str)], data: Value) -> DynamicObject {
        DynamicObject {
            types: None,
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                labels: Some(labels.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect::<BTreeMap<_, _>>()),
                ..ObjectMeta::default()
            },
            data,
        }
    }

    #[test]
    fn test_monitor_from_labeled_object() {
        let obj = object(
            "kube-state-metrics-minimal",
            &[(LABEL, "minimal"), ("app", "ksm")],
            json!({"spec": {"endpoints": [{"metricRelabelings": [{"action": "keep", "sourceLabels": ["__name__"], "regex": "(a|b)"}]}]}}),
        );

        let monitor = monitor_from_object(MonitorKind::Service, obj, LABEL).unwrap();
        assert_eq!(monitor.name, "kube-state-metrics-minimal");
        assert_eq!(monitor.profile.as_deref(), Some("minimal"));
        assert_eq!(monitor.keep_regexes().collect::<Vec<_>>(), ["(a|b)"]);
    }

    #[test]
    fn test_monitor_from_object_without_spec() {
        let obj = object("bare", &[], json!({}));

        let monitor = monitor_from_object(MonitorKind::Pod, obj, LABEL).unwrap();
        assert_eq!(monitor.profile, None);
        assert!(monitor.endpoints.is_empty());
    }
}
