use super::Monitor;
use regex::Regex;
use std::collections::BTreeMap;

/// Monitor name to the admission regex of its `keep` relabeling.
pub type RegexIndex = BTreeMap<String, String>;

/// Collect one admission regex per monitor.
///
/// The regex of every `keep` rule on `__name__` is stripped of one enclosing
/// capture group, provided the outer parentheses pair with each other. When a monitor declares several such rules, the last one wins.
/// Monitors without any such rule are absent from the result.
#[must_use]
pub fn aggregate<'a>(monitors: impl IntoIterator<Item = &'a Monitor>) -> RegexIndex {
    let mut index = RegexIndex::new();
    for monitor in monitors {
        for regex in monitor.keep_regexes() {
            let _ = index.insert(monitor.name.clone(), strip_outer_group(regex).to_string());
        }
    }

    index
}

// `(a)|(b)` starts and ends with parentheses that belong to different groups.
// Its inner text `a)|(b` does not compile, which tells it apart from `(a|b)`.
fn strip_outer_group(regex: &str) -> &str {
    regex
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .filter(|inner| Regex::new(inner).is_ok())
        .unwrap_or(regex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitors::{Endpoint, MonitorKind, RelabelRule};

    fn keep(regex: &str) -> RelabelRule {
        RelabelRule {
            action: Some("keep".into()),
            source_labels: vec!["__name__".into()],
            regex: Some(regex.into()),
        }
    }

    fn monitor(name: &str, kind: MonitorKind, rules: Vec<RelabelRule>) -> Monitor {
        Monitor {
            name: name.into(),
            kind,
            profile: Some("minimal".into()),
            endpoints: vec![Endpoint { metric_relabelings: rules }],
        }
    }

    #[test]
    fn test_strips_one_outer_group() {
        let monitors = [monitor("m1", MonitorKind::Service, vec![keep("(foo|bar)")])];
        let index = aggregate(&monitors);
        assert_eq!(index.get("m1").map(String::as_str), Some("foo|bar"));
    }

    #[test]
    fn test_keeps_unwrapped_regex() {
        let monitors = [monitor("m1", MonitorKind::Pod, vec![keep("foo|bar")])];
        assert_eq!(aggregate(&monitors).get("m1").map(String::as_str), Some("foo|bar"));
    }

    #[test]
    fn test_only_strips_when_both_parens_present() {
        let monitors = [
            monitor("open", MonitorKind::Pod, vec![keep("(foo|bar")]),
            monitor("close", MonitorKind::Pod, vec![keep("foo|bar)")]),
            monitor("nested", MonitorKind::Pod, vec![keep("((a|b))")]),
        ];
        let index = aggregate(&monitors);
        assert_eq!(index.get("open").map(String::as_str), Some("(foo|bar"));
        assert_eq!(index.get("close").map(String::as_str), Some("foo|bar)"));
        assert_eq!(index.get("nested").map(String::as_str), Some("(a|b)"));
    }

    #[test]
    fn test_separate_groups_are_not_stripped() {
        let monitors = [monitor("m1", MonitorKind::Service, vec![keep("(up)|(go_info)")])];
        assert_eq!(aggregate(&monitors).get("m1").map(String::as_str), Some("(up)|(go_info)"));
    }

    #[test]
    fn test_last_rule_wins() {
        let mut m = monitor("m1", MonitorKind::Service, vec![keep("(first)")]);
        m.endpoints.push(Endpoint {
            metric_relabelings: vec![keep("(second)")],
        });
        assert_eq!(aggregate([&m]).get("m1").map(String::as_str), Some("second"));
    }

    #[test]
    fn test_monitors_without_keep_rule_are_absent() {
        let drop = RelabelRule {
            action: Some("drop".into()),
            source_labels: vec!["__name__".into()],
            regex: Some("foo".into()),
        };
        let monitors = [monitor("m1", MonitorKind::Service, vec![drop]), monitor("m2", MonitorKind::Pod, vec![])];
        assert!(aggregate(&monitors).is_empty());
    }
}
