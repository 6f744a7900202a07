use super::MetricName;
use core::convert::Infallible;
use promql_parser::label::MatchOp;
use promql_parser::parser::{self, Expr, VectorSelector};
use promql_parser::util::{ExprVisitor, walk_expr};
use std::collections::BTreeSet;

const NAME_LABEL: &str = "__name__";

/// Failure to extract metric names from an expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("failed to parse query: {0}")]
    Parse(String),

    #[error("unsupported matcher '{label}{operator}' in selector '{metric}', only '=' is supported")]
    UnsupportedMatcher { label: String, operator: String, metric: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatcherPolicy {
    EqualityOnly,
    Any,
}

#[derive(Debug)]
struct SelectorCollector {
    policy: MatcherPolicy,
    metrics: BTreeSet<MetricName>,
    violation: Option<ExtractError>,
}

impl SelectorCollector {
    const fn new(policy: MatcherPolicy) -> Self {
        Self {
            policy,
            metrics: BTreeSet::new(),
            violation: None,
        }
    }

    fn collect(&mut self, selector: &VectorSelector) {
        let name = selector.name.clone().or_else(|| {
            selector
                .matchers
                .matchers
                .iter()
                .find(|m| m.name == NAME_LABEL && matches!(m.op, MatchOp::Equal))
                .map(|m| m.value.clone())
        });

        // keep walking after a violation, only the first one is reported
        if self.policy == MatcherPolicy::EqualityOnly
            && self.violation.is_none()
            && let Some(m) = selector.matchers.matchers.iter().find(|m| !matches!(m.op, MatchOp::Equal))
        {
            self.violation = Some(ExtractError::UnsupportedMatcher {
                label: m.name.clone(),
                operator: m.op.to_string(),
                metric: name.clone().unwrap_or_default(),
            });
        }

        if let Some(name) = name {
            let _ = self.metrics.insert(name);
        }
    }

    fn finish(self) -> Result<BTreeSet<MetricName>, ExtractError> {
        match self.violation {
            Some(e) => Err(e),
            None => Ok(self.metrics),
        }
    }
}

impl ExprVisitor for SelectorCollector {
    type Error = Infallible;

    fn pre_visit(&mut self, expr: &Expr) -> Result<bool, Self::Error> {
        match expr {
            Expr::VectorSelector(vs) => self.collect(vs),
            Expr::MatrixSelector(ms) => self.collect(&ms.vs),
            _ => {}
        }

        Ok(true)
    }
}

fn walk(query: &str, policy: MatcherPolicy) -> Result<BTreeSet<MetricName>, ExtractError> {
    let expr = parser::parse(query).map_err(ExtractError::Parse)?;

    let mut collector = SelectorCollector::new(policy);
    if let Err(never) = walk_expr(&mut collector, &expr) {
        match never {}
    }

    collector.finish()
}

/// Returns the distinct metric names referenced by `query`.
///
/// Every selector must use equality label matchers only. The expression is
/// walked to completion before failing, and the error names the first
/// offending matcher. No partial result is returned on failure.
///
/// # Errors
///
/// Returns [`ExtractError::Parse`] if the query is not valid `PromQL`, or
/// [`ExtractError::UnsupportedMatcher`] if any selector uses `!=`, `=~` or `!~`.
pub fn extract_metrics(query: &str) -> Result<BTreeSet<MetricName>, ExtractError> {
    walk(query, MatcherPolicy::EqualityOnly)
}

/// Returns the distinct metric names referenced by `query`, accepting any matcher operator.
///
/// Selectors without a literal metric name contribute the value of their
/// `__name__` equality matcher, if any.
///
/// # Errors
///
/// Returns [`ExtractError::Parse`] if the query is not valid `PromQL`.
pub fn referenced_metrics(query: &str) -> Result<BTreeSet<MetricName>, ExtractError> {
    walk(query, MatcherPolicy::Any)
}
