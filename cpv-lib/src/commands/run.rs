//! Command dispatch logic for cpv

use super::{CheckArgs, InitArgs, check_profiles, init_config};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "cpv", version, author, long_about = None)]
#[command(about = "Validate Prometheus metric-collection profiles")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: CpvSubcommand,
}

#[derive(Subcommand, Debug)]
enum CpvSubcommand {
    /// Validate, extract, or report the implementation status of collection profiles
    Check(Box<CheckArgs>),
    /// Generate a default configuration file
    Init(InitArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// # Errors
///
/// Returns an error if command parsing fails or if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    match &Cli::parse_from(args).command {
        CpvSubcommand::Check(check_args) => check_profiles(host, check_args).await,
        CpvSubcommand::Init(init_args) => init_config(host, init_args),
    }
}
