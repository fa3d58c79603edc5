//! Launcher error types with miette diagnostics.
//!
//! Provider diagnostics arrive pre-rendered; these variants add the exit
//! code and the help text for each stage that can fail.

use miette::Diagnostic;
use thiserror::Error;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const UPSTREAM: i32 = 4;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("Unknown data source '{name}'")]
    #[diagnostic(
        code(nautobot::unknown_data_source),
        help("Available data sources: {available}")
    )]
    UnknownDataSource { name: String, available: String },

    #[error("Provider configuration failed\n{diagnostics}")]
    #[diagnostic(
        code(nautobot::configure),
        help(
            "Pass --url/--token, or set NAUTOBOT_URL and NAUTOBOT_TOKEN.\n\
             TLS and paging are tuned with NAUTOBOT_INSECURE, NAUTOBOT_CA_CERT, \
             NAUTOBOT_TIMEOUT, NAUTOBOT_PAGE_SIZE and NAUTOBOT_MAX_PAGES."
        )
    )]
    Configure { diagnostics: String },

    #[error("Read of {data_source} failed\n{diagnostics}")]
    #[diagnostic(
        code(nautobot::read),
        help("Check that the Nautobot instance is reachable and the token is valid.")
    )]
    Read {
        data_source: String,
        diagnostics: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    #[diagnostic(code(nautobot::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UnknownDataSource { .. } => exit_code::USAGE,
            Self::Configure { .. } => exit_code::CONFIG,
            Self::Read { .. } => exit_code::UPSTREAM,
            Self::Io(_) | Self::Json(_) => exit_code::GENERAL,
        }
    }
}
