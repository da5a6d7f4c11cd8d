use std::process;
use std::sync::Arc;

use clap::Parser;
use ph::cli::args::Cli;
use ph::cli::commands::execute_command;
use ph::cli::output::{self, TerminalReporter};
use ph::cli::CliError;
use ph::config::Settings;
use ph::exitcode;
use ph::infrastructure::di::ServiceContainer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

fn main() {
    let cli = Cli::parse();

    let mut settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            output::error(&e);
            process::exit(exitcode::CONFIG);
        }
    };
    if let Some(endpoint) = &cli.endpoint {
        settings.endpoint = endpoint.clone();
    }

    setup_logging(cli.verbose, settings.log.as_deref());

    let container = match ServiceContainer::new(settings, Arc::new(TerminalReporter)) {
        Ok(c) => c,
        Err(e) => {
            let e = CliError::from(e);
            output::error(&e);
            process::exit(e.exit_code());
        }
    };

    if let Err(e) = execute_command(&cli, &container) {
        container.reporter.error(&e.to_string());
        process::exit(e.exit_code());
    }
}

/// `-v` count picks the level; a `log` setting (PH_LOG) takes precedence as a filter directive.
fn setup_logging(verbosity: u8, directive: Option<&str>) {
    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        3 => LevelFilter::TRACE,
        _ => {
            eprintln!("Don't be crazy, max is -v -v -v");
            LevelFilter::TRACE
        }
    };

    let env_filter = directive
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::default().add_directive(filter.into()));

    // Create a subscriber with formatted output directed to stderr
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr) // Set writer first
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(env_filter))
        .init();

    match filter {
        LevelFilter::INFO => tracing::info!("Debug mode: info"),
        LevelFilter::DEBUG => tracing::debug!("Debug mode: debug"),
        LevelFilter::TRACE => tracing::debug!("Debug mode: trace"),
        _ => {}
    }
}
