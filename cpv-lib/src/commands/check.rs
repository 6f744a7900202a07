use super::Host;
use super::common::{LogLevel, init_logging};
use super::config::Config;
use crate::Result;
use crate::backend::Client;
use crate::context::RunContext;
use crate::monitors::KubeMonitorSource;
use crate::profiles::{CollectionProfile, ExtractSources, ProfileSettings, report_status};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ohno::{IntoAppError, app_err};
use std::io::Write;
use std::sync::Arc;

const LOG_TARGET: &str = "       cpv";

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Base URL of the Prometheus-compatible backend
    #[arg(long, value_name = "URL", env = "PROMETHEUS_ADDRESS", default_value = "http://localhost:9090")]
    pub address: String,

    /// Bearer token sent to the backend
    #[arg(long, value_name = "TOKEN", env = "PROMETHEUS_BEARER_TOKEN", hide_env_values = true)]
    pub bearer_token: Option<String>,

    /// Path to a kubeconfig file (inferred from the environment when omitted)
    #[arg(long, value_name = "PATH")]
    pub kubeconfig: Option<Utf8PathBuf>,

    /// Collection profile to validate or extract
    #[arg(long, value_name = "NAME")]
    pub profile: Option<CollectionProfile>,

    /// Report rules depending on metrics the profile's monitors drop
    #[arg(long, requires = "profile", help_heading = "Operations")]
    pub validate: bool,

    /// Report default-profile monitors lacking a counterpart for the other profiles
    #[arg(long, help_heading = "Operations")]
    pub status: bool,

    /// YAML file with a `metrics` list to include in the extracted set
    #[arg(long, value_name = "PATH", requires = "profile", help_heading = "Extraction")]
    pub allow_list_file: Option<Utf8PathBuf>,

    /// Prometheus rule file whose rules' metrics are included in the extracted set
    #[arg(long, value_name = "PATH", requires = "profile", help_heading = "Extraction")]
    pub rule_file: Option<Utf8PathBuf>,

    /// Equality-only selector whose matching targets' metrics are included in the extracted set
    #[arg(long, value_name = "EXPR", requires = "profile", help_heading = "Extraction")]
    pub target_selectors: Option<String>,

    /// Also write the series count of every extracted metric
    #[arg(long, help_heading = "Extraction")]
    pub output_cardinality: bool,

    /// Count monitors without a profile label as implementing the default profile
    #[arg(long)]
    pub noisy: bool,

    /// Path to configuration file (default is `cpv.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Directory receiving reports and artifacts (overrides the configuration)
    #[arg(long, value_name = "PATH")]
    pub report_dir: Option<Utf8PathBuf>,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: LogLevel,
}

impl CheckArgs {
    fn extract_sources(&self) -> ExtractSources {
        ExtractSources {
            allow_list_file: self.allow_list_file.clone(),
            rule_file: self.rule_file.clone(),
            target_selectors: self.target_selectors.clone(),
        }
    }

    fn needs_cluster(&self) -> bool {
        self.validate || self.status
    }

    fn any_operation(&self) -> bool {
        self.needs_cluster() || !self.extract_sources().is_empty()
    }
}

/// Run every requested audit operation.
///
/// Operations are attempted independently: one failing is reported on the
/// host's error stream and does not prevent the others from running. The
/// returned result reflects whether the run could start, not whether the
/// audits found issues.
///
/// # Errors
///
/// Returns an error if no operation was requested, the configuration is
/// invalid, or the backend is unreachable.
pub async fn check_profiles<H: Host>(host: &mut H, args: &CheckArgs) -> Result<()> {
    init_logging(args.log_level);

    if !args.any_operation() {
        let _ = writeln!(
            host.error(),
            "Nothing to do: pass --validate, --status, or an extraction source \
             (--allow-list-file, --rule-file, --target-selectors) together with --profile"
        );
        host.exit(1);
        return Err(app_err!("no operation requested"));
    }

    let config = Config::load(Utf8Path::new("."), args.config.as_ref())?;
    let report_dir = match args.report_dir.clone().or_else(|| config.report_dir.clone()) {
        Some(dir) => dir,
        None => Utf8PathBuf::try_from(std::env::temp_dir()).into_app_err("system temp directory is not valid UTF-8")?,
    };

    let settings = ProfileSettings {
        profile_label: config.profile_label.clone(),
        report_dir,
        noisy: args.noisy,
    };

    let ctx = RunContext::new(config.run_timeout, config.cardinality_concurrency);
    let interrupt = {
        let ctx = ctx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!(target: LOG_TARGET, "Interrupted, cancelling outstanding work");
                ctx.cancel();
            }
        })
    };

    let outcome = run_operations(host, args, &config, &settings, &ctx).await;
    interrupt.abort();
    outcome
}

async fn run_operations<H: Host>(host: &mut H, args: &CheckArgs, config: &Config, settings: &ProfileSettings, ctx: &RunContext) -> Result<()> {
    let client = Client::new(&args.address, args.bearer_token.as_deref(), config.request_timeout)?;
    ctx.guard("probing the backend", client.check_reachable()).await?;
    log::info!(target: LOG_TARGET, "Using backend at {}", client.base_url());
    let backend = Arc::new(client);

    let source = if args.needs_cluster() {
        match KubeMonitorSource::connect(args.kubeconfig.as_deref(), settings.profile_label.clone()).await {
            Ok(source) => Some(source),
            Err(e) => {
                report_failure(host, "connecting to the cluster", &e);
                None
            }
        }
    } else {
        None
    };

    if args.validate
        && let Some(source) = &source
    {
        let outcome = match args.profile.and_then(CollectionProfile::operator) {
            Some(operator) => operator.validate(backend.as_ref(), source, settings, ctx).await,
            None => Err(app_err!("the {} profile has no validation", display_profile(args.profile))),
        };

        match outcome {
            Ok(Some(path)) => report_line(host, &format!("Validation found discrepancies, refer: {path}")),
            Ok(None) => report_line(host, "Validation found no discrepancies"),
            Err(e) => report_failure(host, "validation", &e),
        }
    }

    let sources = args.extract_sources();
    if !sources.is_empty() {
        let outcome = match args.profile.and_then(CollectionProfile::extractor) {
            Some(extractor) => {
                extractor
                    .extract(&sources, Arc::clone(&backend), settings, args.output_cardinality, ctx)
                    .await
            }
            None => Err(app_err!("the {} profile has no extraction", display_profile(args.profile))),
        };

        match outcome {
            Ok(outcome) => {
                report_line(
                    host,
                    &format!("Extracted {} metric(s), refer: {}", outcome.metrics.len(), outcome.relabel_config),
                );
                if let Some(path) = outcome.cardinality_report {
                    report_line(host, &format!("Cardinality statistics, refer: {path}"));
                }
            }
            Err(e) => report_failure(host, "extraction", &e),
        }
    }

    if args.status
        && let Some(source) = &source
    {
        match report_status(source, settings, args.profile, ctx).await {
            Ok(Some(path)) => report_line(host, &format!("Some profiles are not fully implemented, refer: {path}")),
            Ok(None) => report_line(host, "All profiles are fully implemented"),
            Err(e) => report_failure(host, "status", &e),
        }
    }

    Ok(())
}

fn display_profile(profile: Option<CollectionProfile>) -> String {
    profile.map_or_else(|| "unspecified".to_string(), |p| p.to_string())
}

fn report_line<H: Host>(host: &mut H, line: &str) {
    let _ = writeln!(host.output(), "{line}");
}

fn report_failure<H: Host>(host: &mut H, operation: &str, e: &ohno::AppError) {
    log::error!(target: LOG_TARGET, "{operation} failed: {e:#}");
    let _ = writeln!(host.error(), "{operation} failed: {e}");
}
