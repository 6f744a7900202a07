use super::{ProfileExtractor, ProfileOperator, ProfileSettings};
use crate::Result;
use crate::context::RunContext;
use crate::monitors::{Monitor, MonitorKind, MonitorSource, label_selector};
use clap::ValueEnum;
use strum::IntoEnumIterator;

const LOG_TARGET: &str = "  profiles";

/// Label opting a monitor into a collection profile.
pub const PROFILE_LABEL: &str = "monitoring.openshift.io/collection-profile";

/// The supported collection profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum, strum::Display, strum::AsRefStr, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum CollectionProfile {
    /// Collect every metric (the default)
    Full,

    /// Collect only the metrics needed by alerts, recording rules, dashboards, and telemetry
    Minimal,
}

impl CollectionProfile {
    pub const DEFAULT: Self = Self::Full;

    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Full)
    }

    /// Every profile other than the default.
    pub fn non_default() -> impl Iterator<Item = Self> {
        Self::iter().filter(|p| !p.is_default())
    }

    /// The validation strategy of this profile, if it has one.
    #[must_use]
    pub const fn operator(self) -> Option<ProfileOperator> {
        match self {
            Self::Full => None,
            Self::Minimal => Some(ProfileOperator::Minimal),
        }
    }

    /// The extraction strategy of this profile, if it has one.
    #[must_use]
    pub const fn extractor(self) -> Option<ProfileExtractor> {
        match self {
            Self::Full => None,
            Self::Minimal => Some(ProfileExtractor::Minimal),
        }
    }

    /// Label selectors matching the monitors that implement this profile.
    #[must_use]
    pub fn selectors(self, profile_label: &str, noisy: bool) -> Vec<String> {
        label_selector(profile_label, Some(self.as_ref()), noisy && self.is_default())
    }

    /// List the pod and service monitors implementing this profile.
    ///
    /// # Errors
    ///
    /// Returns an error if listing fails, or the run is cancelled or times out.
    pub async fn monitors<S: MonitorSource>(self, source: &S, settings: &ProfileSettings, ctx: &RunContext) -> Result<Vec<Monitor>> {
        let mut monitors = Vec::new();
        for kind in MonitorKind::iter() {
            for selector in self.selectors(&settings.profile_label, settings.noisy) {
                let what = format!("listing {kind}s for the {self} profile");
                monitors.extend(ctx.guard(&what, source.list(kind, &selector)).await?);
            }
        }

        log::info!(target: LOG_TARGET, "Found {} monitor(s) implementing the {self} profile", monitors.len());
        Ok(monitors)
    }
}
