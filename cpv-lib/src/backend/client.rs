//! Prometheus HTTP API client
//!
//! Minimal client for the `/api/v1` endpoints the audit needs. No request is
//! retried; failures surface to the caller as-is.

use super::{InstantVector, MetadataSelector, MetricsBackend, Rule, RuleKind, Sample, TargetMetadata};
use crate::Result;
use chrono::{DateTime, Utc};
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use url::Url;

const LOG_TARGET: &str = "   backend";

const QUERY_PATH: &str = "api/v1/query";
const TARGETS_METADATA_PATH: &str = "api/v1/targets/metadata";
const RULES_PATH: &str = "api/v1/rules";

/// The response envelope shared by every v1 endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    status: String,
    data: Option<T>,
    #[serde(default)]
    error_type: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryData {
    result_type: String,
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct WireSample {
    #[serde(default)]
    metric: BTreeMap<String, String>,
    value: (f64, String),
}

#[derive(Debug, Deserialize)]
struct RulesData {
    #[serde(default)]
    groups: Vec<WireRuleGroup>,
}

#[derive(Debug, Deserialize)]
struct WireRuleGroup {
    name: String,
    #[serde(default)]
    file: String,
    #[serde(default)]
    rules: Vec<WireRule>,
}

#[derive(Debug, Deserialize)]
struct WireRule {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    query: String,
}

/// Prometheus HTTP API client
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
}

impl Client {
    /// Create a client for the backend at `address`, optionally authenticating with a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if `address` is not a valid URL or the HTTP client cannot be built.
    pub fn new(address: &str, bearer_token: Option<&str>, request_timeout: Duration) -> Result<Self> {
        use reqwest::header::{AUTHORIZATION, HeaderValue};

        // joining relative API paths requires a trailing slash
        let mut base_url = Url::parse(address).into_app_err_with(|| format!("parsing backend address '{address}'"))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut client_builder = reqwest::Client::builder().user_agent("cpv").timeout(request_timeout);

        if let Some(t) = bearer_token {
            let mut auth_val = HeaderValue::from_str(&format!("Bearer {t}")).into_app_err("invalid bearer token")?;
            auth_val.set_sensitive(true);

            let mut headers = HeaderMap::new();
            let _ = headers.insert(AUTHORIZATION, auth_val);

            client_builder = client_builder.default_headers(headers);
        }

        Ok(Self {
            http: client_builder.build().into_app_err("building HTTP client")?,
            base_url,
        })
    }

    /// Get the base URL for this client
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Probe the backend with a single request to its base URL.
    ///
    /// Any HTTP response counts as reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if no response could be obtained.
    pub async fn check_reachable(&self) -> Result<()> {
        let resp = self
            .http
            .get(self.base_url.clone())
            .send()
            .await
            .into_app_err_with(|| format!("backend at {} is unreachable", self.base_url))?;

        log::debug!(target: LOG_TARGET, "Backend at {} answered with {}", self.base_url, resp.status());
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
        let url = self.base_url.join(path).into_app_err_with(|| format!("building URL for {path}"))?;
        log::debug!(target: LOG_TARGET, "GET {url} {params:?}");

        let resp = self
            .http
            .get(url)
            .query(params)
            .send()
            .await
            .into_app_err_with(|| format!("requesting /{path}"))?;

        // error responses still carry the envelope, so decode regardless of status
        let status = resp.status();
        let body = resp.text().await.into_app_err_with(|| format!("reading response from /{path}"))?;
        let envelope: Envelope<T> =
            serde_json::from_str(&body).into_app_err_with(|| format!("decoding response from /{path} (HTTP {status})"))?;

        for warning in &envelope.warnings {
            log::warn!(target: LOG_TARGET, "/{path}: {warning}");
        }

        if envelope.status != "success" {
            return Err(app_err!(
                "/{path} failed with {}: {}",
                envelope.error_type.as_deref().unwrap_or("unknown error"),
                envelope.error.as_deref().unwrap_or("no details")
            ));
        }

        envelope.data.ok_or_else(|| app_err!("/{path} returned no data"))
    }
}

impl MetricsBackend for Client {
    async fn query(&self, promql: &str, time: DateTime<Utc>) -> Result<InstantVector> {
        let params = [("query", promql.to_string()), ("time", time.to_rfc3339())];
        let data: QueryData = self.get(QUERY_PATH, &params).await?;

        if data.result_type != "vector" {
            return Err(app_err!("query '{promql}' returned a {} instead of a vector", data.result_type));
        }

        let samples: Vec<WireSample> =
            serde_json::from_value(data.result).into_app_err_with(|| format!("decoding result of query '{promql}'"))?;

        samples
            .into_iter()
            .map(|s| -> Result<Sample> {
                let value = s
                    .value
                    .1
                    .parse::<f64>()
                    .into_app_err_with(|| format!("parsing sample value '{}' of query '{promql}'", s.value.1))?;
                Ok(Sample { labels: s.metric, value })
            })
            .collect()
    }

    async fn targets_metadata(&self, selector: &MetadataSelector) -> Result<Vec<TargetMetadata>> {
        let mut params = Vec::new();
        if let Some(m) = &selector.match_target {
            params.push(("match_target", m.clone()));
        }
        if let Some(m) = &selector.metric {
            params.push(("metric", m.clone()));
        }
        if let Some(l) = selector.limit {
            params.push(("limit", l.to_string()));
        }

        self.get(TARGETS_METADATA_PATH, &params).await
    }

    async fn rules(&self) -> Result<Vec<Rule>> {
        let data: RulesData = self.get(RULES_PATH, &[]).await?;

        Ok(data
            .groups
            .into_iter()
            .flat_map(|group| {
                group.rules.into_iter().map(move |rule| Rule {
                    name: rule.name,
                    query: rule.query,
                    kind: RuleKind::from(rule.kind.as_str()),
                    group: group.name.clone(),
                    file: group.file.clone(),
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = Client::new("http://localhost:9090/prometheus", None, Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:9090/prometheus/");
        assert_eq!(
            client.base_url().join(QUERY_PATH).unwrap().as_str(),
            "http://localhost:9090/prometheus/api/v1/query"
        );
    }

    #[test]
    fn test_invalid_address() {
        assert!(Client::new("not a url", None, Duration::from_secs(5)).is_err());
    }

    #[test]
    fn test_invalid_bearer_token() {
        assert!(Client::new("http://localhost:9090", Some("bad\ntoken"), Duration::from_secs(5)).is_err());
    }

    #[test]
    fn test_envelope_error_deserialize() {
        let json = r#"{"status":"error","errorType":"bad_data","error":"parse error at char 5"}"#;
        let envelope: Envelope<QueryData> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.status, "error");
        assert_eq!(envelope.error_type.as_deref(), Some("bad_data"));
        assert!(envelope.data.is_none());
    }

    #[test]
    fn test_wire_sample_deserialize() {
        let json = r#"{"metric":{"job":"node"},"value":[1700000000.123,"42"]}"#;
        let sample: WireSample = serde_json::from_str(json).unwrap();
        assert_eq!(sample.value.1, "42");
        assert_eq!(sample.metric.get("job").map(String::as_str), Some("node"));
    }

    #[test]
    fn test_rules_deserialize_unknown_kind() {
        let json = r#"{"groups":[{"name":"g","file":"/etc/rules.yaml","rules":[{"type":"silencing","name":"x","query":"up"}]}]}"#;
        let data: RulesData = serde_json::from_str(json).unwrap();
        assert_eq!(data.groups[0].rules[0].kind, "silencing");
    }
}
