use super::{Monitor, MonitorKind};
use crate::Result;

/// Lists monitors of one kind matching a label selector.
pub trait MonitorSource: Send + Sync {
    /// List all monitors of `kind` across namespaces whose labels match `label_selector`.
    fn list(&self, kind: MonitorKind, label_selector: &str) -> impl Future<Output = Result<Vec<Monitor>>> + Send;
}

/// Build the label selectors picking the monitors that implement a profile.
///
/// With a value the first selector is an equality (`label=value`). Without one
/// it only requires the label to exist. `include_unlabeled` adds a second
/// selector matching monitors that carry no such label at all. Terms within one
/// selector are conjunctive, so each selector must be listed on its own and
/// the results unioned.
#[must_use]
pub fn label_selector(label: &str, value: Option<&str>, include_unlabeled: bool) -> Vec<String> {
    let mut selectors = vec![match value {
        Some(v) => format!("{label}={v}"),
        None => label.to_string(),
    }];

    if include_unlabeled {
        selectors.push(format!("!{label}"));
    }

    selectors
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABEL: &str = "monitoring.openshift.io/collection-profile";

    #[test]
    fn test_selector_with_value() {
        assert_eq!(label_selector(LABEL, Some("minimal"), false), [format!("{LABEL}=minimal")]);
    }

    #[test]
    fn test_selector_without_value() {
        assert_eq!(label_selector(LABEL, None, false), [LABEL.to_string()]);
    }

    #[test]
    fn test_selector_including_unlabeled() {
        assert_eq!(label_selector(LABEL, Some("full"), true), [format!("{LABEL}=full"), format!("!{LABEL}")]);
    }
}
