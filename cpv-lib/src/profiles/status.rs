use super::{CollectionProfile, FindingKind, ProfileSettings};
use crate::Result;
use crate::context::RunContext;
use crate::monitors::{Monitor, MonitorKind, MonitorSource};
use crate::reports::{ReportSink, report_path};
use camino::Utf8PathBuf;
use chrono::Local;
use std::collections::BTreeMap;
use strum::IntoEnumIterator;

const LOG_TARGET: &str = "    status";

/// A default-profile monitor lacking a counterpart for another profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFinding {
    pub profile: CollectionProfile,
    pub kind: MonitorKind,
    pub monitor: String,
}

impl StatusFinding {
    fn to_row(&self) -> Vec<String> {
        let (service, pod) = match self.kind {
            MonitorKind::Service => (self.monitor.clone(), String::new()),
            MonitorKind::Pod => (String::new(), self.monitor.clone()),
        };

        vec![self.profile.to_string(), service, pod, FindingKind::NotImplemented.to_string()]
    }
}

/// Find default-profile monitors with no `<name>-<profile>` counterpart of the same kind.
///
/// Only `only` is checked when it names a non-default profile; otherwise every
/// non-default profile is.
#[must_use]
pub fn missing_implementations(
    monitors: &BTreeMap<CollectionProfile, Vec<Monitor>>,
    only: Option<CollectionProfile>,
) -> Vec<StatusFinding> {
    let Some(defaults) = monitors.get(&CollectionProfile::DEFAULT) else {
        return Vec::new();
    };

    let mut findings = Vec::new();
    for profile in CollectionProfile::non_default().filter(|p| only.is_none_or(|o| o.is_default() || o == *p)) {
        let implemented = monitors.get(&profile).map_or(&[][..], Vec::as_slice);

        for monitor in defaults {
            let counterpart = format!("{}-{profile}", monitor.name);
            if !implemented.iter().any(|m| m.kind == monitor.kind && m.name == counterpart) {
                findings.push(StatusFinding {
                    profile,
                    kind: monitor.kind,
                    monitor: monitor.name.clone(),
                });
            }
        }
    }

    findings
}

/// List the monitors of every profile and report missing implementations.
///
/// Returns the path of the status report, or `None` when every profile is
/// fully implemented.
///
/// # Errors
///
/// Returns an error if monitors cannot be listed or the report cannot be written.
pub async fn report_status<S: MonitorSource>(
    source: &S,
    settings: &ProfileSettings,
    only: Option<CollectionProfile>,
    ctx: &RunContext,
) -> Result<Option<Utf8PathBuf>> {
    let mut monitors = BTreeMap::new();
    for profile in CollectionProfile::iter() {
        let _ = monitors.insert(profile, profile.monitors(source, settings, ctx).await?);
    }

    let findings = missing_implementations(&monitors, only);
    log::info!(target: LOG_TARGET, "{} monitor(s) lack a profile implementation", findings.len());

    let sink = ReportSink::new(
        report_path(&settings.report_dir, "implementation-status", "log", Local::now()),
        ["PROFILE", "SERVICE MONITOR", "POD MONITOR", "ERROR"],
    );

    for finding in &findings {
        sink.record(finding.to_row());
    }

    sink.finish()
}
