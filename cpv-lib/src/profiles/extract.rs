use super::rule_file::metrics_in_rule_file;
use super::{CollectionProfile, ProfileSettings};
use crate::Result;
use crate::backend::{MetadataSelector, MetricsBackend, evaluate_cardinality};
use crate::context::RunContext;
use crate::promql::{MetricName, extract_metrics};
use crate::reports::{KeepRelabelConfig, generate_cardinality, report_path, write_artifact};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Local;
use ohno::IntoAppError;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::sync::Arc;

const LOG_TARGET: &str = " extractor";

/// The external constraints a metric set can be derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSources {
    /// YAML file with a `metrics` list, taken verbatim.
    pub allow_list_file: Option<Utf8PathBuf>,

    /// Prometheus rule file whose rules' metrics are collected.
    pub rule_file: Option<Utf8PathBuf>,

    /// Equality-only selector over target labels, e.g. `{job="kube-state-metrics"}`.
    pub target_selectors: Option<String>,
}

impl ExtractSources {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.allow_list_file.is_none() && self.rule_file.is_none() && self.target_selectors.is_none()
    }
}

#[derive(Debug, Deserialize)]
struct AllowList {
    #[serde(default)]
    metrics: Vec<MetricName>,
}

fn read_allow_list(path: &Utf8Path) -> Result<Vec<MetricName>> {
    let text = fs::read_to_string(path).into_app_err_with(|| format!("reading allow-list file '{path}'"))?;
    let list: AllowList = serde_yaml::from_str(&text).into_app_err_with(|| format!("parsing allow-list file '{path}'"))?;
    Ok(list.metrics)
}

/// Derive the union of the metric sets named by each configured source.
///
/// The target selector is checked before anything else is read or queried, so
/// a selector with a non-equality matcher fails without contacting the backend.
///
/// # Errors
///
/// Returns an error if any source is invalid or unreadable, or the backend query fails.
pub async fn extract_metric_set<B: MetricsBackend>(
    sources: &ExtractSources,
    backend: &B,
    ctx: &RunContext,
) -> Result<BTreeSet<MetricName>> {
    if let Some(selector) = &sources.target_selectors {
        let _ = extract_metrics(selector).into_app_err_with(|| format!("validating target selector '{selector}'"))?;
    }

    let mut metrics = BTreeSet::new();

    if let Some(path) = &sources.allow_list_file {
        let found = read_allow_list(path)?;
        log::info!(target: LOG_TARGET, "{} metric(s) listed in {path}", found.len());
        metrics.extend(found);
    }

    if let Some(path) = &sources.rule_file {
        let found = metrics_in_rule_file(path)?;
        log::info!(target: LOG_TARGET, "{} metric(s) referenced by the rules in {path}", found.len());
        metrics.extend(found);
    }

    if let Some(selector) = &sources.target_selectors {
        let request = MetadataSelector {
            match_target: Some(selector.clone()),
            ..MetadataSelector::default()
        };

        let metadata = ctx.guard("fetching target metadata", backend.targets_metadata(&request)).await?;
        let before = metrics.len();
        metrics.extend(metadata.into_iter().map(|md| md.metric));
        log::info!(
            target: LOG_TARGET,
            "{} new metric(s) exposed by targets matching {selector}",
            metrics.len() - before
        );
    }

    Ok(metrics)
}

/// Artifacts produced by an extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionOutcome {
    pub metrics: BTreeSet<MetricName>,
    pub relabel_config: Utf8PathBuf,
    pub cardinality_report: Option<Utf8PathBuf>,
}

/// Per-profile extraction strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileExtractor {
    Minimal,
}

impl ProfileExtractor {
    #[must_use]
    pub const fn profile(self) -> CollectionProfile {
        match self {
            Self::Minimal => CollectionProfile::Minimal,
        }
    }

    /// Derive the profile's metric set and write its keep-relabel artifact.
    ///
    /// With `output_cardinality`, the series count of every extracted metric is
    /// also evaluated and written as a table, highest count first.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction fails or an artifact cannot be written.
    pub async fn extract<B>(
        self,
        sources: &ExtractSources,
        backend: Arc<B>,
        settings: &ProfileSettings,
        output_cardinality: bool,
        ctx: &RunContext,
    ) -> Result<ExtractionOutcome>
    where
        B: MetricsBackend + 'static,
    {
        let profile = self.profile();
        let metrics = extract_metric_set(sources, backend.as_ref(), ctx).await?;
        log::info!(target: LOG_TARGET, "Extracted {} metric(s) for the {profile} profile", metrics.len());

        let now = Local::now();

        let cardinality_report = if output_cardinality {
            let records = evaluate_cardinality(metrics.iter().cloned(), backend, ctx).await;
            let mut table = String::new();
            generate_cardinality(&records, &mut table)?;

            let path = report_path(
                &settings.report_dir,
                &format!("{profile}-profile-extractor-cardinality-statistics"),
                "log",
                now,
            );
            write_artifact(&path, &table)?;
            log::info!(target: LOG_TARGET, "cardinality statistics written, refer: {path}");
            Some(path)
        } else {
            None
        };

        let relabel_config = report_path(&settings.report_dir, &format!("{profile}-profile-extractor-relabel-config"), "yaml", now);
        let relabel = KeepRelabelConfig::for_metrics(&metrics);
        write_artifact(&relabel_config, &relabel.to_yaml()?)?;
        log::info!(target: LOG_TARGET, "relabel config written, refer: {relabel_config}");

        Ok(ExtractionOutcome {
            metrics,
            relabel_config,
            cardinality_report,
        })
    }
}
