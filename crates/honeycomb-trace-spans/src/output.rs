use std::io::IsTerminal;

use hts_core::HtsError;
use hts_core::invocation::{InvocationParams, TimeSpec};
use hts_core::summary::TraceReport;
use hts_core::time::format_unix;
use hts_query::TraceLookup;
use owo_colors::OwoColorize;

pub fn progress_line(params: &InvocationParams) -> String {
    match params.time {
        TimeSpec::Relative { seconds } => format!(
            "Retrieving spans for trace {} across all datasets (last {seconds} seconds)...",
            params.trace_id
        ),
        TimeSpec::Absolute { start, end } => format!(
            "Retrieving spans for trace {} across all datasets from {} to {}...",
            params.trace_id,
            format_unix(start),
            format_unix(end)
        ),
    }
}

/// Link line for humans, then the JSON document for agents.
pub fn render_lookup(lookup: TraceLookup, ui_endpoint: &str) -> anyhow::Result<String> {
    let url = lookup.trace_url(ui_endpoint);
    if lookup.spans.is_empty() && url.is_none() {
        return Ok(format!("No spans found for trace ID: {}\n", lookup.trace_id));
    }

    let mut out = String::new();
    if let Some(url) = &url {
        out.push_str(&format!("\nView trace in Honeycomb UI: {url}\n"));
    }
    let report = TraceReport::new(&lookup.trace_id, lookup.spans, lookup.window, url);
    out.push_str(&serde_json::to_string_pretty(&report)?);
    out.push('\n');
    Ok(out)
}

pub fn print_failure(err: &anyhow::Error, usage: &str) {
    let color = std::io::stderr().is_terminal();
    let label = |text: &str| {
        if color {
            text.red().bold().to_string()
        } else {
            text.to_string()
        }
    };

    match err.downcast_ref::<HtsError>() {
        Some(HtsError::InvalidArgument(msg)) => {
            eprintln!("{} {msg}", label("Error:"));
            eprintln!("{usage}");
        }
        Some(HtsError::Config(msg)) => {
            eprintln!("{} {msg}", label("Error:"));
        }
        other => {
            eprintln!("{} {err:#}", label("Error retrieving trace spans:"));
            let hints = other.and_then(HtsError::status).map(suggestions);
            if let Some(hints) = hints.filter(|h| !h.is_empty()) {
                eprintln!();
                eprintln!("{}", label("Suggestions:"));
                for (i, hint) in hints.iter().enumerate() {
                    eprintln!("{}. {hint}", i + 1);
                }
            }
        }
    }
}

fn suggestions(status: u16) -> Vec<&'static str> {
    match status {
        401 => vec![
            "Check that your Honeycomb API key is valid and has the necessary permissions",
            "Make sure you've set the HONEYCOMB_API_KEY environment variable",
        ],
        404 => vec![
            "Verify that the dataset exists",
            "Check that the trace ID is correct",
        ],
        _ => Vec::new(),
    }
}
