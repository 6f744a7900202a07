//! Helpers shared by the profile unit tests

use super::{PROFILE_LABEL, ProfileSettings};
use camino::Utf8PathBuf;

pub fn settings(report_dir: &str, noisy: bool) -> ProfileSettings {
    ProfileSettings {
        profile_label: PROFILE_LABEL.to_string(),
        report_dir: Utf8PathBuf::from(report_dir),
        noisy,
    }
}

pub fn temp_report_dir() -> (tempfile::TempDir, String) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().to_string_lossy().to_string();
    (temp_dir, path)
}
