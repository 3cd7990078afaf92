use serde::{Deserialize, Serialize};

use crate::invocation::QueryWindow;
use crate::normalize::SpanView;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceSummary {
    pub trace_id: String,
    pub span_count: usize,
    pub services: Vec<String>,
    pub root_spans: usize,
    pub time_range: TimeRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

impl From<QueryWindow> for TimeRange {
    fn from(w: QueryWindow) -> Self {
        Self {
            start: w.start,
            end: w.end,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceReport {
    pub summary: TraceSummary,
    pub spans: Vec<SpanView>,
}

impl TraceReport {
    pub fn new(
        trace_id: &str,
        spans: Vec<SpanView>,
        window: QueryWindow,
        trace_url: Option<String>,
    ) -> Self {
        let mut services: Vec<String> = Vec::new();
        for name in spans.iter().filter_map(SpanView::service_name) {
            if !services.contains(&name) {
                services.push(name);
            }
        }

        Self {
            summary: TraceSummary {
                trace_id: trace_id.to_string(),
                span_count: spans.len(),
                services,
                root_spans: spans.iter().filter(|s| s.is_root()).count(),
                time_range: window.into(),
                trace_url,
            },
            spans,
        }
    }
}

/// Deep link into the Honeycomb trace view for `trace_id` over `window`.
pub fn trace_url(
    ui_endpoint: &str,
    team_slug: &str,
    environment: &str,
    trace_id: &str,
    window: QueryWindow,
) -> String {
    format!(
        "{}/{}/environments/{}/trace?trace_id={}&trace_start_ts={}&trace_end_ts={}",
        ui_endpoint.trim_end_matches('/'),
        team_slug,
        urlencoding::encode(environment),
        urlencoding::encode(trace_id),
        window.start,
        window.end
    )
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::normalize::normalize_rows;
    use crate::query::RawRow;

    fn rows(value: Value) -> Vec<RawRow> {
        serde_json::from_value(value).unwrap()
    }

    const WINDOW: QueryWindow = QueryWindow {
        start: 100,
        end: 200,
    };

    #[test]
    fn summarizes_two_span_trace() {
        let spans = normalize_rows(rows(json!([
            {"trace.span_id": "s1", "name": "GET /", "service.name": "web", "duration_ms": 12},
            {"trace.span_id": "s2", "trace.parent_id": "s1", "name": "SELECT", "service.name": "db", "duration_ms": 4}
        ])));
        let report = TraceReport::new("t1", spans, WINDOW, None);

        assert_eq!(report.summary.span_count, 2);
        assert_eq!(report.summary.root_spans, 1);
        assert_eq!(report.summary.services, vec!["web", "db"]);
        assert_eq!(report.spans[0].span_id, json!("s1"));
        assert_eq!(report.spans[0].parent_id, json!("ROOT"));
    }

    #[test]
    fn services_are_distinct_in_first_seen_order_without_sentinel() {
        let spans = normalize_rows(rows(json!([
            {"trace.span_id": "a", "service.name": "api"},
            {"trace.span_id": "b", "trace.parent_id": "a", "service": "db"},
            {"trace.span_id": "c", "trace.parent_id": "a", "service.name": "api"},
            {"trace.span_id": "d", "trace.parent_id": "a"}
        ])));
        let report = TraceReport::new("t1", spans, WINDOW, None);
        assert_eq!(report.summary.services, vec!["api", "db"]);
        assert_eq!(report.summary.span_count, report.spans.len());
    }

    #[test]
    fn empty_report_shape() {
        let report = TraceReport::new("t1", Vec::new(), WINDOW, Some("u".to_string()));
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "summary": {
                    "traceId": "t1",
                    "spanCount": 0,
                    "services": [],
                    "rootSpans": 0,
                    "timeRange": {"start": 100, "end": 200},
                    "traceUrl": "u"
                },
                "spans": []
            })
        );
    }

    #[test]
    fn omits_trace_url_when_unresolved() {
        let report = TraceReport::new("t1", Vec::new(), WINDOW, None);
        let value = serde_json::to_value(&report).unwrap();
        assert!(value["summary"].get("traceUrl").is_none());
    }

    #[test]
    fn builds_escaped_trace_url() {
        let url = trace_url(
            "https://ui.honeycomb.io/",
            "acme",
            "prod env",
            "a/b c",
            WINDOW,
        );
        assert_eq!(
            url,
            "https://ui.honeycomb.io/acme/environments/prod%20env/trace?trace_id=a%2Fb%20c&trace_start_ts=100&trace_end_ts=200"
        );
    }
}
