//! Collection profiles and the audits built on them
//!
//! A collection profile is opted into by labeling monitors with
//! [`PROFILE_LABEL`]. The default profile, `full`, keeps every metric; other
//! profiles keep only what their monitors' `keep` relabelings admit.
//!
//! # Implementation Model
//!
//! - [`reconcile`] cross-references backend rules against the loaded metric
//!   set and a profile's admission regexes, producing [`Finding`]s.
//! - [`ProfileOperator`] drives reconciliation end to end for one profile and
//!   persists the findings through a [`ReportSink`](crate::reports::ReportSink).
//! - [`extract_metric_set`] derives a candidate metric set from an allow-list
//!   file, a rule file, and a target selector, and [`ProfileExtractor`] turns
//!   that set into a keep-relabel artifact (plus cardinality statistics).
//! - [`report_status`] lists default-profile monitors lacking a counterpart
//!   for the other profiles.

mod extract;
mod operator;
mod profile;
mod reconcile;
mod rule_file;
mod status;

#[cfg(test)]
mod testing;

pub use extract::{ExtractSources, ExtractionOutcome, ProfileExtractor, extract_metric_set};
pub use operator::ProfileOperator;
pub use profile::{CollectionProfile, PROFILE_LABEL};
pub use reconcile::{Finding, FindingKind, reconcile};
pub use rule_file::metrics_in_rule_file;
pub use status::{StatusFinding, missing_implementations, report_status};

use camino::Utf8PathBuf;

/// Settings shared by the profile audits of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSettings {
    /// Label whose value names the profile a monitor implements.
    pub profile_label: String,

    /// Directory receiving reports and artifacts.
    pub report_dir: Utf8PathBuf,

    /// Count monitors without a profile label as implementing the default profile.
    pub noisy: bool,
}
