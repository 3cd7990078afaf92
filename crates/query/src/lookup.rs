use std::time::Duration;

use hts_core::invocation::{InvocationParams, QueryWindow};
use hts_core::normalize::{SpanView, is_zero_count, normalize_rows};
use hts_core::query::{AuthInfo, QuerySpec, RawRow};
use hts_core::summary::trace_url;
use hts_core::time::unix_now;
use hts_core::{HtsError, Result};

use crate::client::HoneycombClient;

/// How long to wait for an asynchronous query result to materialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TraceLookup {
    pub trace_id: String,
    pub window: QueryWindow,
    pub spans: Vec<SpanView>,
    pub auth: AuthInfo,
}

impl TraceLookup {
    /// UI link for the trace, if the API key's team could be resolved.
    pub fn trace_url(&self, ui_endpoint: &str) -> Option<String> {
        let team = self.auth.team_slug()?;
        Some(trace_url(
            ui_endpoint,
            team,
            self.auth.environment_name(),
            &self.trace_id,
            self.window,
        ))
    }
}

/// Runs the whole lookup: query, poll, normalize, then resolve the team for
/// the UI link.
pub async fn lookup_trace(
    client: &HoneycombClient,
    params: &InvocationParams,
    policy: PollPolicy,
) -> Result<TraceLookup> {
    let window = params.window(unix_now());
    let spec = QuerySpec::for_trace(params);
    let rows = fetch_trace_rows(client, &spec, policy).await?;

    let spans = if rows.is_empty() || is_zero_count(&rows) {
        tracing::debug!(trace_id = %params.trace_id, "query matched no spans");
        Vec::new()
    } else {
        normalize_rows(rows)
    };

    let auth = client.auth().await?;
    Ok(TraceLookup {
        trace_id: params.trace_id.clone(),
        window,
        spans,
        auth,
    })
}

pub async fn fetch_trace_rows(
    client: &HoneycombClient,
    spec: &QuerySpec,
    policy: PollPolicy,
) -> Result<Vec<RawRow>> {
    let query = client.create_query(spec).await?;
    tracing::debug!(query_id = %query.id, "query created");
    let result = client.create_query_result(&query.id).await?;
    tracing::debug!(result_id = %result.id, "query result requested");
    poll_query_result(client, &result.id, policy).await
}

pub async fn poll_query_result(
    client: &HoneycombClient,
    result_id: &str,
    policy: PollPolicy,
) -> Result<Vec<RawRow>> {
    for attempt in 1..=policy.max_attempts {
        let response = client.query_result(result_id).await?;
        if let Some(rows) = response.into_rows() {
            tracing::debug!(attempt, rows = rows.len(), "query result ready");
            return Ok(rows);
        }

        tracing::debug!(attempt, "query result pending");
        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    Err(HtsError::Timeout {
        attempts: policy.max_attempts,
    })
}
