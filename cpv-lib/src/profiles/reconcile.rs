use crate::backend::{Rule, RuleKind};
use crate::monitors::RegexIndex;
use crate::promql::{ExtractError, MetricName, referenced_metrics};
use core::fmt;
use regex::Regex;
use std::collections::BTreeSet;

/// What is wrong with a rule's dependency on a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindingKind {
    /// The metric is admitted by a monitor of the profile but is not loaded.
    NotLoaded,

    /// A default-profile monitor has no counterpart for the profile.
    NotImplemented,

    /// The rule query is not valid `PromQL`.
    ParseError(String),

    /// A monitor's admission regex could not be evaluated.
    RegexError { regex: String, message: String },

    /// The backend reported a rule kind this tool does not know.
    UnknownRuleKind(String),
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotLoaded => write!(f, "not loaded"),
            Self::NotImplemented => write!(f, "not implemented"),
            Self::ParseError(message) => write!(f, "failed to parse query: {message}"),
            Self::RegexError { regex, message } => write!(f, "failed to match regex {regex:?}: {message}"),
            Self::UnknownRuleKind(kind) => write!(f, "unknown rule kind {kind:?}"),
        }
    }
}

/// One reconciliation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub monitor: Option<String>,
    pub group: String,
    pub file: String,
    pub rule: String,
    pub query: String,
    pub metric: Option<MetricName>,
    pub kind: FindingKind,
}

impl Finding {
    fn for_rule(rule: &Rule, monitor: Option<&str>, metric: Option<&str>, kind: FindingKind) -> Self {
        Self {
            monitor: monitor.map(ToString::to_string),
            group: rule.group.clone(),
            file: rule.file.clone(),
            rule: rule.name.clone(),
            query: rule.query.clone(),
            metric: metric.map(ToString::to_string),
            kind,
        }
    }

    /// Report header for findings against `profile`.
    #[must_use]
    pub fn header(profile: &str) -> [String; 7] {
        [
            format!("{} MONITOR", profile.to_uppercase()),
            "GROUP".to_string(),
            "LOCATION".to_string(),
            "RULE".to_string(),
            "QUERY".to_string(),
            "METRIC".to_string(),
            "ERROR".to_string(),
        ]
    }

    /// Report row; the query is collapsed onto a single line.
    #[must_use]
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.monitor.clone().unwrap_or_default(),
            self.group.clone(),
            self.file.clone(),
            self.rule.clone(),
            self.query.split_whitespace().collect::<Vec<_>>().join(" "),
            self.metric.clone().unwrap_or_default(),
            self.kind.to_string(),
        ]
    }
}

/// Cross-reference rules against the loaded metrics and a profile's admission regexes.
///
/// For each rule, every distinct referenced metric that is not loaded is
/// tested against every monitor regex (fully anchored). Each match yields one
/// [`FindingKind::NotLoaded`] finding. A metric that is not loaded but that no
/// monitor admits is not reported. Unparseable queries, regexes that fail to
/// compile, and unknown rule kinds become findings rather than errors. Rules
/// with an empty query are skipped.
#[must_use]
pub fn reconcile(rules: &[Rule], loaded: &BTreeSet<MetricName>, index: &RegexIndex) -> Vec<Finding> {
    let matchers: Vec<_> = index
        .iter()
        .map(|(monitor, regex)| (monitor.as_str(), regex.as_str(), Regex::new(&format!("^(?:{regex})$"))))
        .collect();

    let mut findings = Vec::new();
    for rule in rules {
        if let RuleKind::Unknown(kind) = &rule.kind {
            findings.push(Finding::for_rule(rule, None, None, FindingKind::UnknownRuleKind(kind.clone())));
            continue;
        }

        if rule.query.trim().is_empty() {
            continue;
        }

        let metrics = match referenced_metrics(&rule.query) {
            Ok(metrics) => metrics,
            Err(e) => {
                let message = match e {
                    ExtractError::Parse(message) => message,
                    other => other.to_string(),
                };
                findings.push(Finding::for_rule(rule, None, None, FindingKind::ParseError(message)));
                continue;
            }
        };

        for metric in metrics.iter().filter(|m| !loaded.contains(*m)) {
            for (monitor, regex, compiled) in &matchers {
                let kind = match compiled {
                    Ok(re) if re.is_match(metric) => FindingKind::NotLoaded,
                    Ok(_) => continue,
                    Err(e) => FindingKind::RegexError {
                        regex: (*regex).to_string(),
                        message: e.to_string(),
                    },
                };
                findings.push(Finding::for_rule(rule, Some(monitor), Some(metric), kind));
            }
        }
    }

    findings
}
