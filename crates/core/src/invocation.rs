use serde::Serialize;

use crate::error::{HtsError, Result};

pub const DEFAULT_TIME_RANGE_SECS: i64 = 3600;

/// Flag values as they arrived on the command line, before validation.
#[derive(Debug, Clone, Default)]
pub struct RawInvocation {
    pub trace_id: Option<String>,
    pub time_range: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSpec {
    Relative { seconds: i64 },
    Absolute { start: i64, end: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationParams {
    pub trace_id: String,
    pub time: TimeSpec,
}

/// Concrete unix-second bounds of the searched window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueryWindow {
    pub start: i64,
    pub end: i64,
}

impl InvocationParams {
    pub fn from_raw(raw: RawInvocation) -> Result<Self> {
        let trace_id = present(raw.trace_id)
            .ok_or_else(|| HtsError::InvalidArgument("missing required --trace-id".to_string()))?;

        let start = present(raw.start_time)
            .map(|v| parse_seconds("--start-time", &v))
            .transpose()?;
        let end = present(raw.end_time)
            .map(|v| parse_seconds("--end-time", &v))
            .transpose()?;

        let time = match (start, end) {
            (Some(start), Some(end)) => TimeSpec::Absolute { start, end },
            (None, None) => {
                let seconds = match present(raw.time_range) {
                    Some(v) => parse_seconds("--time-range", &v)?,
                    None => DEFAULT_TIME_RANGE_SECS,
                };
                if seconds <= 0 {
                    return Err(HtsError::InvalidArgument(format!(
                        "--time-range must be a positive number of seconds, got {seconds}"
                    )));
                }
                TimeSpec::Relative { seconds }
            }
            _ => {
                return Err(HtsError::InvalidArgument(
                    "both --start-time and --end-time must be provided together".to_string(),
                ));
            }
        };

        Ok(Self { trace_id, time })
    }

    pub fn window(&self, now: i64) -> QueryWindow {
        match self.time {
            TimeSpec::Relative { seconds } => QueryWindow {
                start: now - seconds,
                end: now,
            },
            TimeSpec::Absolute { start, end } => QueryWindow { start, end },
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_seconds(flag: &str, value: &str) -> Result<i64> {
    value.trim().parse::<i64>().map_err(|_| {
        HtsError::InvalidArgument(format!("{flag} expects whole seconds, got {value:?}"))
    })
}
