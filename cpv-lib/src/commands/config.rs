use crate::Result;
use crate::profiles::PROFILE_LABEL;
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "cpv.toml";

const MAX_TIMEOUT_DAYS: u64 = 7;
const MAX_TIMEOUT: Duration = Duration::from_secs(MAX_TIMEOUT_DAYS * 86_400);

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Upper bound on a whole run
    #[serde(default = "default_run_timeout", with = "humantime_serde")]
    pub run_timeout: Duration,

    /// Timeout of each backend HTTP request
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Maximum number of concurrent cardinality queries (0 is unbounded)
    #[serde(default)]
    pub cardinality_concurrency: usize,

    /// Directory receiving reports and artifacts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_dir: Option<Utf8PathBuf>,

    /// Label whose value names the collection profile a monitor implements
    #[serde(default = "default_profile_label")]
    pub profile_label: String,
}

const fn default_run_timeout() -> Duration {
    Duration::from_mins(5)
}

const fn default_request_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_profile_label() -> String {
    PROFILE_LABEL.to_string()
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// Without an explicit path, `cpv.toml` in `base_dir` is used if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation
    pub fn load(base_dir: &Utf8Path, config_path: Option<&Utf8PathBuf>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading cpv configuration file '{path}'"))?;
            (path.clone(), text)
        } else {
            let path = base_dir.join(CONFIG_FILE_NAME);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
                Err(e) => return Err(e).into_app_err_with(|| format!("reading cpv configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config.validate()?;

        Ok(config)
    }

    /// Save the default configuration to a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.run_timeout.is_zero() {
            return Err(app_err!("run_timeout must be greater than zero"));
        }

        if self.request_timeout.is_zero() {
            return Err(app_err!("request_timeout must be greater than zero"));
        }

        if self.run_timeout > MAX_TIMEOUT {
            return Err(app_err!("run_timeout must not exceed {MAX_TIMEOUT_DAYS} days"));
        }

        if self.request_timeout > MAX_TIMEOUT {
            return Err(app_err!("request_timeout must not exceed {MAX_TIMEOUT_DAYS} days"));
        }

        if self.profile_label.trim().is_empty() {
            return Err(app_err!("profile_label must not be empty"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("default_config.toml should be valid TOML that deserializes to Config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root() -> (tempfile::TempDir, Utf8PathBuf) {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = Utf8PathBuf::from(temp_dir.path().to_string_lossy().to_string());
        (temp_dir, root)
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.run_timeout, Duration::from_mins(5));
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.cardinality_concurrency, 0);
        assert_eq!(config.report_dir, None);
        assert_eq!(config.profile_label, PROFILE_LABEL);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.run_timeout, Config::default().run_timeout);
        assert_eq!(config.profile_label, PROFILE_LABEL);
    }

    #[test]
    fn test_validate_zero_timeouts() {
        let config = Config {
            run_timeout: Duration::ZERO,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            request_timeout: Duration::ZERO,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_label() {
        let config = Config {
            profile_label: "  ".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_default_and_load() {
        let (_guard, root) = temp_root();
        let output_path = root.join("custom.toml");
        Config::save_default(&output_path).unwrap();

        let loaded = Config::load(&root, Some(&output_path)).unwrap();
        assert_eq!(loaded.profile_label, PROFILE_LABEL);
    }

    #[test]
    fn test_load_missing_config_uses_defaults() {
        let (_guard, root) = temp_root();
        let config = Config::load(&root, None).unwrap();
        assert_eq!(config.run_timeout, Duration::from_mins(5));
    }

    #[test]
    fn test_load_from_base_dir() {
        let (_guard, root) = temp_root();
        fs::write(root.join(CONFIG_FILE_NAME), "run_timeout = \"30s\"\nreport_dir = \"out\"\n").unwrap();

        let config = Config::load(&root, None).unwrap();
        assert_eq!(config.run_timeout, Duration::from_secs(30));
        assert_eq!(config.report_dir.as_deref(), Some(Utf8Path::new("out")));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let (_guard, root) = temp_root();
        let path = root.join("unknown.toml");
        fs::write(&path, "unknown_field = \"value\"\n").unwrap();

        let err = Config::load(&root, Some(&path)).unwrap_err();
        assert!(err.to_string().contains("parsing configuration file"));
    }

    #[test]
    fn test_invalid_duration_is_rejected() {
        let (_guard, root) = temp_root();
        let path = root.join("duration.toml");
        fs::write(&path, "request_timeout = \"soon\"\n").unwrap();

        assert!(Config::load(&root, Some(&path)).is_err());
    }

    #[test]
    fn test_zero_timeout_file_is_rejected() {
        let (_guard, root) = temp_root();
        let path = root.join("zero.toml");
        fs::write(&path, "run_timeout = \"0s\"\n").unwrap();

        let err = Config::load(&root, Some(&path)).unwrap_err();
        assert!(err.to_string().contains("run_timeout"));
    }

    #[test]
    fn test_huge_timeouts_are_rejected() {
        let (_guard, root) = temp_root();
        let path = root.join("huge.toml");

        fs::write(&path, "run_timeout = \"1000000y\"\n").unwrap();
        let err = Config::load(&root, Some(&path)).unwrap_err();
        assert!(err.to_string().contains("run_timeout must not exceed"));

        fs::write(&path, "request_timeout = \"8days\"\n").unwrap();
        let err = Config::load(&root, Some(&path)).unwrap_err();
        assert!(err.to_string().contains("request_timeout must not exceed"));
    }
}
