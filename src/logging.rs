use std::io;
use tracing_appender::rolling;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Installs the console and daily rolling file log layers.
///
/// `RUST_LOG` overrides the console filter when set. Console output goes to
/// stderr since stdout carries the topics when no output file is given.
pub fn configure_logging() {
    let stdout_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,llm_request=warn,enrichment=info,engine=info"));

    // Console log configuration
    let stdout_log = fmt::layer()
        .with_writer(io::stderr)
        .with_filter(stdout_filter);

    // File log configuration
    let file_appender = rolling::daily("logs", "minerva.log");
    let file_log = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_filter(EnvFilter::new(
            "info,llm_request=debug,enrichment=debug,engine=debug",
        ));

    tracing_subscriber::Registry::default()
        .with(stdout_log)
        .with(file_log)
        .init();
}
