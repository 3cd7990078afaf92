use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::invocation::{InvocationParams, TimeSpec};

/// Dataset slug Honeycomb uses for environment-wide queries.
pub const ALL_DATASETS: &str = "__all__";
pub const QUERY_RESULT_LIMIT: u32 = 1000;
pub const TRACE_ID_COLUMN: &str = "trace.trace_id";
pub const SPAN_BREAKDOWNS: [&str; 5] = [
    "trace.span_id",
    "name",
    "trace.parent_id",
    "service.name",
    "duration_ms",
];

/// One row of a query result as returned by the API.
pub type RawRow = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calculation {
    pub op: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    pub op: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub calculations: Vec<Calculation>,
    pub filters: Vec<Filter>,
    pub breakdowns: Vec<String>,
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
}

impl QuerySpec {
    /// COUNT of every span carrying `trace_id`, broken down by the span
    /// identity columns.
    pub fn for_trace(params: &InvocationParams) -> Self {
        let (time_range, start_time, end_time) = match params.time {
            TimeSpec::Relative { seconds } => (Some(seconds), None, None),
            TimeSpec::Absolute { start, end } => (None, Some(start), Some(end)),
        };

        Self {
            calculations: vec![Calculation {
                op: "COUNT".to_string(),
            }],
            filters: vec![Filter {
                column: TRACE_ID_COLUMN.to_string(),
                op: "=".to_string(),
                value: params.trace_id.clone(),
            }],
            breakdowns: SPAN_BREAKDOWNS.iter().map(|c| c.to_string()).collect(),
            limit: QUERY_RESULT_LIMIT,
            time_range,
            start_time,
            end_time,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryHandle {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResultRequest {
    pub query_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResultResponse {
    #[serde(default)]
    pub data: Option<QueryResultData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResultData {
    #[serde(default)]
    pub results: Option<Vec<RawRow>>,
}

impl QueryResultResponse {
    /// Rows once the result has materialized; an empty list still counts.
    pub fn into_rows(self) -> Option<Vec<RawRow>> {
        self.data.and_then(|d| d.results)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthInfo {
    #[serde(default)]
    pub team: Option<Team>,
    #[serde(default)]
    pub environment: Option<Environment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl AuthInfo {
    pub fn team_slug(&self) -> Option<&str> {
        self.team
            .as_ref()
            .and_then(|t| t.slug.as_deref())
            .filter(|s| !s.is_empty())
    }

    pub fn environment_name(&self) -> &str {
        self.environment
            .as_ref()
            .and_then(|e| e.name.as_deref())
            .filter(|s| !s.is_empty())
            .unwrap_or("unknown")
    }
}
