use clap::{Args, Subcommand};

use crate::exit::CliResult;

pub mod demo;
pub mod plan;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run an in-process loopback demo with two synchronized endpoints.
    Demo(DemoArgs),
    /// Print the scheduler slot rotation for a timing configuration.
    Plan(PlanArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command) -> CliResult<i32> {
    match command {
        Command::Demo(args) => demo::run(args),
        Command::Plan(args) => plan::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Number of ticks to drive each endpoint.
    #[arg(long, default_value = "24")]
    pub ticks: usize,
    /// Minimum send interval in milliseconds (one tick).
    #[arg(long, value_name = "MS", default_value = "50")]
    pub min_interval_ms: u64,
    /// Maximum full-sync interval in milliseconds.
    #[arg(long, value_name = "MS", default_value = "150")]
    pub max_interval_ms: u64,
    /// Connection timeout in milliseconds.
    #[arg(long, value_name = "MS", default_value = "2000")]
    pub timeout_ms: u64,
    /// Emit keep-alive traffic on event slots when nothing changed.
    #[arg(long)]
    pub output_idle: bool,
    /// Drop one endpoint's outbound traffic for this many ticks mid-run to
    /// demonstrate timeout and resync.
    #[arg(long, value_name = "TICKS", default_value = "0")]
    pub outage_ticks: usize,
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Minimum send interval in milliseconds.
    #[arg(long, value_name = "MS", default_value = "50")]
    pub min_interval_ms: u64,
    /// Maximum full-sync interval in milliseconds.
    #[arg(long, value_name = "MS", default_value = "100")]
    pub max_interval_ms: u64,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
