mod cli;
mod error;

use std::io::Write;

use clap::Parser;
use secrecy::SecretString;
use serde_json::{Map, Value, json};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use nautobot_core::{Diagnostics, HostConfig, Provider, ReadRequest};
use terraform_provider_nautobot::NautobotProvider;

use crate::cli::{Cli, Command, LogFormat, ReadArgs};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose, cli.global.log_format);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Logs go to stderr; stdout is reserved for JSON output.
fn init_tracing(verbosity: u8, format: LogFormat) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let provider = NautobotProvider::new(env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Schema => print_json(&schemas(&provider)),
        Command::Read(args) => read(&provider, args).await,
    }
}

fn schemas(provider: &NautobotProvider) -> Value {
    let metadata = provider.metadata();
    let data_sources: Map<String, Value> = provider
        .data_sources()
        .into_iter()
        .map(|factory| {
            let source = factory();
            (
                source.type_name(&metadata.type_name),
                json!(source.schema()),
            )
        })
        .collect();

    json!({
        "provider": {
            "type_name": metadata.type_name,
            "version": metadata.version,
            "schema": provider.schema(),
        },
        "data_sources": data_sources,
    })
}

async fn read(provider: &NautobotProvider, args: ReadArgs) -> Result<(), CliError> {
    let prefix = provider.metadata().type_name;
    let Some(mut source) = provider.data_source(&args.data_source, None) else {
        let available: Vec<String> = provider
            .data_sources()
            .into_iter()
            .map(|factory| factory().type_name(&prefix))
            .collect();
        return Err(CliError::UnknownDataSource {
            name: args.data_source,
            available: available.join(", "),
        });
    };

    // Flags map to Known values; an absent flag leaves the attribute Null.
    let host = HostConfig {
        url: args.url.into(),
        token: args.token.map(SecretString::from).into(),
    };
    let configured = provider.configure(host).await;
    report_warnings(&configured.diagnostics);
    if configured.diagnostics.has_error() {
        return Err(CliError::Configure {
            diagnostics: render(&configured.diagnostics),
        });
    }
    source.configure(configured.client);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    tracing::debug!(data_source = %args.data_source, "reading");
    let response = source.read(ReadRequest::with_cancel(cancel)).await;
    report_warnings(&response.diagnostics);

    match response.state {
        Some(state) if !response.diagnostics.has_error() => print_json(&json!(state)),
        _ => Err(CliError::Read {
            data_source: args.data_source,
            diagnostics: render(&response.diagnostics),
        }),
    }
}

fn render(diagnostics: &Diagnostics) -> String {
    diagnostics
        .errors()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn report_warnings(diagnostics: &Diagnostics) {
    for warning in diagnostics.warnings() {
        eprintln!("{warning}");
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}
