//! Clap derive structures for the `terraform-provider-nautobot` launcher.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// terraform-provider-nautobot -- run the Nautobot provider outside a host
#[derive(Debug, Parser)]
#[command(
    name = "terraform-provider-nautobot",
    version,
    about = "Inspect the Nautobot provider and run its data sources locally",
    long_about = "Drives the Nautobot provider the way a host would: configure it \
        from flags and NAUTOBOT_* environment variables, then read a data source \
        and print the published state as JSON.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log line format on stderr
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the provider and data source schemas as JSON
    Schema,

    /// Configure the provider and read one data source
    Read(ReadArgs),
}

#[derive(Debug, Args)]
pub struct ReadArgs {
    /// Data source type name, e.g. nautobot_manufacturers
    pub data_source: String,

    /// Nautobot base URL (otherwise NAUTOBOT_URL)
    #[arg(long)]
    pub url: Option<String>,

    /// Nautobot API token (otherwise NAUTOBOT_TOKEN)
    #[arg(long)]
    pub token: Option<String>,
}
