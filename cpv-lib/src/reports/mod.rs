//! Report generation for audit findings and extraction artifacts
//!
//! # Implementation Model
//!
//! All tabular output goes through one table writer, which aligns columns
//! the way `text/tabwriter`-style tools do: every column but the last is padded
//! to its widest cell plus two spaces.
//!
//! - [`ReportSink`]: shared, serialized collector of finding rows. The rows are
//!   written to disk only if at least one issue was recorded.
//! - [`cardinality::generate`]: `METRIC`/`CARDINALITY` table.
//! - [`KeepRelabelConfig`]: `keep` relabeling admitting exactly a metric set.

mod cardinality;
mod relabel;
mod sink;
mod table;

pub use cardinality::generate as generate_cardinality;
pub use relabel::KeepRelabelConfig;
pub use sink::ReportSink;

use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Local};
use ohno::IntoAppError;
use std::fs;

/// Build a timestamped report path such as `<dir>/<stem>-20240115T103000.<extension>`.
#[must_use]
pub fn report_path(dir: &Utf8Path, stem: &str, extension: &str, now: DateTime<Local>) -> Utf8PathBuf {
    dir.join(format!("{stem}-{}.{extension}", now.format("%Y%m%dT%H%M%S")))
}

/// Write an artifact, creating its parent directory if needed.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn write_artifact(path: &Utf8Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        fs::create_dir_all(parent).into_app_err_with(|| format!("creating report directory '{parent}'"))?;
    }

    fs::write(path, contents).into_app_err_with(|| format!("writing '{path}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_report_path() {
        let now = Local.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let path = report_path(Utf8Path::new("/tmp"), "minimal-profile-extractor-relabel-config", "yaml", now);
        assert_eq!(path.as_str(), "/tmp/minimal-profile-extractor-relabel-config-20240115T103000.yaml");
    }

    #[test]
    fn test_write_artifact_creates_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = Utf8PathBuf::from(temp_dir.path().to_string_lossy().to_string()).join("nested");
        let path = dir.join("artifact.yaml");

        write_artifact(&path, "action: keep\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "action: keep\n");
    }
}
