//! Command-line interface and orchestration for cpv
//!
//! # Implementation Model
//!
//! ## Commands
//!
//! - **check**: Run the requested audit operations against a backend and,
//!   for validation and status, the cluster's monitors
//! - **init**: Generate a default configuration file
//!
//! ## Execution Flow
//!
//! The `run` function parses command-line arguments using clap and routes to
//! the matching handler. `check` then:
//!
//! 1. Loads configuration and builds the run context (deadline and cancellation)
//! 2. Probes the backend once, aborting if it is unreachable
//! 3. Attempts each requested operation (validate, extract, status)
//!    independently. A failed operation is reported and the others still run.
//!
//! Configuration is a TOML file with timeouts, the cardinality concurrency
//! ceiling, the report directory, and the profile label.

mod check;
mod common;
mod config;
mod host;
mod init;
mod run;

#[cfg(debug_assertions)]
pub use config::Config;

pub use check::{CheckArgs, check_profiles};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use run::run;
