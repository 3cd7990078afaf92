mod output;
mod telemetry;

use std::ffi::OsString;
use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use hts_core::config::Config;
use hts_core::invocation::{InvocationParams, RawInvocation};
use hts_query::{HoneycombClient, PollPolicy, lookup_trace};

use crate::output::{print_failure, progress_line, render_lookup};
use crate::telemetry::init_cli_tracing;

const EXAMPLES: &str = "\
Examples:
  honeycomb-trace-spans --trace-id abcd1234
  honeycomb-trace-spans --trace-id abcd1234 --time-range 86400
  honeycomb-trace-spans --trace-id abcd1234 --start-time 1617235200 --end-time 1617321600";

const VALUE_FLAGS: [&str; 4] = ["trace-id", "time-range", "start-time", "end-time"];
const PASSTHROUGH: [&str; 4] = ["--help", "-h", "--version", "-V"];

// argv reaches clap already paired by pair_args; required-ness is checked by
// InvocationParams so failures exit 1.
#[derive(Parser, Debug)]
#[command(name = "honeycomb-trace-spans", version)]
#[command(about = "Retrieve all spans of a trace from Honeycomb")]
#[command(override_usage = "\
honeycomb-trace-spans --trace-id <trace_id> [--time-range <seconds>]
       honeycomb-trace-spans --trace-id <trace_id> --start-time <unix_timestamp> --end-time <unix_timestamp>")]
#[command(after_help = EXAMPLES)]
#[command(ignore_errors = true, args_override_self = true)]
struct Cli {
    #[arg(long)]
    trace_id: Option<String>,
    #[arg(long, help = "Relative window in seconds ending now (default 3600)")]
    time_range: Option<String>,
    #[arg(long, help = "Absolute window start, unix seconds")]
    start_time: Option<String>,
    #[arg(long, help = "Absolute window end, unix seconds")]
    end_time: Option<String>,
}

impl Cli {
    fn into_raw(self) -> RawInvocation {
        RawInvocation {
            trace_id: self.trace_id,
            time_range: self.time_range,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_from(pair_args(std::env::args_os()));
    init_cli_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let usage = format!("\n{}\n\n{EXAMPLES}", Cli::command().render_usage());
            print_failure(&err, &usage);
            ExitCode::FAILURE
        }
    }
}

/// Reads argv as consecutive `(flag, value)` pairs. Pairs whose flag is not
/// one of ours, or whose value is missing or empty, are dropped; a later pair
/// for the same flag replaces an earlier one. Help and version switches pass
/// through untouched.
fn pair_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<OsString>,
{
    let mut args = args
        .into_iter()
        .map(|a| a.into().to_string_lossy().into_owned());
    let bin = args
        .next()
        .unwrap_or_else(|| "honeycomb-trace-spans".to_string());
    let rest: Vec<String> = args.collect();

    let mut pairs: Vec<(&str, &str)> = Vec::new();
    for chunk in rest.chunks(2) {
        let [key, value] = chunk else {
            continue;
        };
        let key = key.strip_prefix("--").unwrap_or(key.as_str());
        let Some(flag) = VALUE_FLAGS.into_iter().find(|f| *f == key) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        match pairs.iter_mut().find(|(f, _)| *f == flag) {
            Some(slot) => slot.1 = value.as_str(),
            None => pairs.push((flag, value.as_str())),
        }
    }

    let mut out = vec![bin];
    out.extend(
        rest.iter()
            .filter(|t| PASSTHROUGH.contains(&t.as_str()))
            .cloned(),
    );
    out.extend(pairs.into_iter().map(|(flag, value)| format!("--{flag}={value}")));
    out
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let params = InvocationParams::from_raw(cli.into_raw())?;
    let cfg = Config::load()?;
    let client = HoneycombClient::new(cfg.api_key.as_str(), cfg.api_endpoint.as_str())?;
    tracing::debug!(endpoint = %client.endpoint(), "using honeycomb api");

    println!("{}", progress_line(&params));
    let lookup = lookup_trace(&client, &params, PollPolicy::default())
        .await
        .with_context(|| format!("trace {}", params.trace_id))?;

    print!("{}", render_lookup(lookup, &cfg.ui_endpoint)?);
    Ok(())
}
