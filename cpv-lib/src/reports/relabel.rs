use crate::Result;
use crate::promql::MetricName;
use ohno::IntoAppError;
use serde::{Deserialize, Serialize};

/// A `keep` relabeling on `__name__` admitting exactly a set of metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeepRelabelConfig {
    pub source_labels: Vec<String>,
    pub regex: String,
    pub action: String,
}

impl KeepRelabelConfig {
    /// Build the relabeling as `(m1|m2|...)` over the sorted, escaped metric names.
    pub fn for_metrics<'a>(metrics: impl IntoIterator<Item = &'a MetricName>) -> Self {
        let mut names: Vec<&str> = metrics.into_iter().map(String::as_str).collect();
        names.sort_unstable();
        names.dedup();

        let alternation = names.iter().map(|n| regex::escape(n)).collect::<Vec<_>>().join("|");

        Self {
            source_labels: vec!["__name__".to_string()],
            regex: format!("({alternation})"),
            action: "keep".to_string(),
        }
    }

    /// Serialize as a YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).into_app_err("serializing relabel config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use std::collections::BTreeSet;

    impl KeepRelabelConfig {
        /// Anchored the way Prometheus applies relabel regexes.
        fn compile(&self) -> Result<Regex, regex::Error> {
            Regex::new(&format!("^(?:{})$", self.regex))
        }
    }

    fn set(names: &[&str]) -> BTreeSet<MetricName> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn test_regex_is_sorted_alternation() {
        let config = KeepRelabelConfig::for_metrics(&set(&["up", "go_info"]));
        assert_eq!(config.regex, "(go_info|up)");
        assert_eq!(config.source_labels, ["__name__"]);
        assert_eq!(config.action, "keep");
    }

    #[test]
    fn test_admits_exactly_the_metric_set() {
        let config = KeepRelabelConfig::for_metrics(&set(&["up", "go_info"]));
        assert!(config.compile().unwrap().is_match("up"));
        assert!(config.compile().unwrap().is_match("go_info"));
        assert!(!config.compile().unwrap().is_match("upstream"));
        assert!(!config.compile().unwrap().is_match("go_infox"));
        assert!(!config.compile().unwrap().is_match("xup"));
    }

    #[test]
    fn test_names_are_escaped() {
        let config = KeepRelabelConfig::for_metrics(&set(&["a.b"]));
        assert!(config.compile().unwrap().is_match("a.b"));
        assert!(!config.compile().unwrap().is_match("axb"));
    }

    #[test]
    fn test_yaml_shape() {
        let yaml = KeepRelabelConfig::for_metrics(&set(&["up", "go_info"])).to_yaml().unwrap();
        assert!(yaml.starts_with("sourceLabels:\n- __name__\n"));
        assert!(yaml.contains("action: keep"));

        let parsed: KeepRelabelConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.regex, "(go_info|up)");
    }
}
