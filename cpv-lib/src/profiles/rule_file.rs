use crate::Result;
use crate::promql::{MetricName, referenced_metrics};
use camino::Utf8Path;
use ohno::{IntoAppError, app_err};
use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};
use std::fs;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleFile {
    #[serde(default)]
    groups: Vec<RuleGroup>,
}

#[derive(Debug, Deserialize)]
struct RuleGroup {
    #[serde(default)]
    name: String,

    #[serde(default)]
    rules: Vec<FileRule>,
}

#[derive(Debug, Deserialize)]
struct FileRule {
    #[serde(default)]
    record: Option<String>,

    #[serde(default)]
    alert: Option<String>,

    #[serde(default)]
    expr: Option<Scalar>,
}

/// Rule expressions are YAML scalars, so `expr: 1` is as valid as `expr: "1"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_yaml::Number),
    Bool(bool),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }
}

/// Collect the metrics referenced by every rule of a Prometheus rule file.
///
/// The file must be a valid rule-group document: uniquely named groups, rules
/// that are either a `record` or an `alert`, and non-empty expressions that
/// parse. Any violation fails the whole call.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is malformed, or contains an invalid rule.
pub fn metrics_in_rule_file(path: &Utf8Path) -> Result<BTreeSet<MetricName>> {
    let text = fs::read_to_string(path).into_app_err_with(|| format!("reading rule file '{path}'"))?;
    let file: RuleFile = serde_yaml::from_str(&text).into_app_err_with(|| format!("parsing rule file '{path}'"))?;

    let mut seen_groups = HashSet::new();
    let mut metrics = BTreeSet::new();

    for group in file.groups {
        if group.name.is_empty() {
            return Err(app_err!("{path}: rule group without a name"));
        }
        if !seen_groups.insert(group.name.clone()) {
            return Err(app_err!("{path}: group '{}' is defined more than once", group.name));
        }

        for (i, rule) in group.rules.into_iter().enumerate() {
            let label = match (&rule.record, &rule.alert) {
                (Some(r), None) => r.clone(),
                (None, Some(a)) => a.clone(),
                (Some(_), Some(_)) => return Err(app_err!("{path}: group '{}', rule {}: only one of 'record' and 'alert' may be set", group.name, i + 1)),
                (None, None) => return Err(app_err!("{path}: group '{}', rule {}: one of 'record' or 'alert' must be set", group.name, i + 1)),
            };

            let expr = rule.expr.map(Scalar::into_text).unwrap_or_default();
            if expr.trim().is_empty() {
                return Err(app_err!("{path}: group '{}', rule '{label}': field 'expr' must be set", group.name));
            }

            let found = referenced_metrics(&expr).into_app_err_with(|| format!("{path}: group '{}', rule '{label}'", group.name))?;
            metrics.extend(found);
        }
    }

    Ok(metrics)
}
