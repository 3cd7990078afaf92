use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "warn";

/// Installs the stderr subscriber for the CLI.
///
/// stdout carries the progress line, the UI link and the JSON report, and
/// agents parse it, so every diagnostic goes to stderr. Without `RUST_LOG`
/// (or with one that does not parse) only warnings and errors are shown.
pub fn init_cli_tracing() {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(cli_filter(directives.as_deref()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .compact()
        .try_init();
}

fn cli_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}
