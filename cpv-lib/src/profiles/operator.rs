use super::{CollectionProfile, Finding, ProfileSettings, reconcile};
use crate::Result;
use crate::backend::{MetricsBackend, loaded_metrics};
use crate::context::RunContext;
use crate::monitors::{MonitorSource, aggregate};
use crate::reports::{ReportSink, report_path};
use camino::Utf8PathBuf;
use chrono::Local;

const LOG_TARGET: &str = "  operator";

/// Per-profile validation strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileOperator {
    Minimal,
}

impl ProfileOperator {
    #[must_use]
    pub const fn profile(self) -> CollectionProfile {
        match self {
            Self::Minimal => CollectionProfile::Minimal,
        }
    }

    /// Reconcile the backend's rules against the monitors implementing this profile.
    ///
    /// Returns the path of the discrepancy report, or `None` when there was
    /// nothing to report.
    ///
    /// # Errors
    ///
    /// Returns an error if the monitors, metadata, or rules cannot be fetched,
    /// or the report cannot be written.
    pub async fn validate<B, S>(self, backend: &B, source: &S, settings: &ProfileSettings, ctx: &RunContext) -> Result<Option<Utf8PathBuf>>
    where
        B: MetricsBackend,
        S: MonitorSource,
    {
        let profile = self.profile();
        let monitors = profile.monitors(source, settings, ctx).await?;
        let index = aggregate(&monitors);
        log::debug!(target: LOG_TARGET, "{} of {} {profile} monitor(s) declare a keep regex", index.len(), monitors.len());

        let loaded = ctx.guard("building the loaded metric set", loaded_metrics(backend)).await?;
        let rules = ctx.guard("fetching rules", backend.rules()).await?;
        log::info!(target: LOG_TARGET, "Reconciling {} rule(s) against {} loaded metric(s)", rules.len(), loaded.len());

        let sink = ReportSink::new(
            report_path(
                &settings.report_dir,
                &format!("{profile}-profile-operator-metric-discrepancies"),
                "log",
                Local::now(),
            ),
            Finding::header(profile.as_ref()),
        );

        for finding in reconcile(&rules, &loaded, &index) {
            sink.record(finding.to_row());
        }

        sink.finish()
    }
}
