use std::time::Duration;

use hts_core::HtsError;
use hts_core::invocation::{InvocationParams, TimeSpec};
use hts_core::query::QuerySpec;
use hts_query::client::USER_AGENT_VALUE;
use hts_query::{HoneycombClient, PollPolicy, fetch_trace_rows, lookup_trace};
use serde_json::json;
use testkit::{FakeHoneycomb, Scenario, sample_rows, zero_count_rows};

const FAST: PollPolicy = PollPolicy {
    interval: Duration::from_millis(10),
    max_attempts: 10,
};

fn params() -> InvocationParams {
    InvocationParams {
        trace_id: "abcd1234".to_string(),
        time: TimeSpec::Relative { seconds: 3600 },
    }
}

#[tokio::test]
async fn stops_polling_at_first_ready_result() -> anyhow::Result<()> {
    let fake = FakeHoneycomb::start(Scenario {
        pending_polls: 2,
        ..Scenario::with_results(sample_rows())
    })
    .await?;
    let client = HoneycombClient::new("secret", fake.endpoint())?;

    let rows = fetch_trace_rows(&client, &QuerySpec::for_trace(&params()), FAST).await?;
    assert_eq!(rows.len(), 2);

    let rec = fake.recorded();
    assert_eq!(rec.polls, 3);
    assert_eq!(rec.query_result_body, Some(json!({"query_id": "q-1"})));
    assert_eq!(rec.team_header.as_deref(), Some("secret"));
    assert_eq!(rec.user_agent.as_deref(), Some(USER_AGENT_VALUE));
    assert_eq!(rec.content_type.as_deref(), Some("application/json"));

    let body = rec.query_body.expect("query body recorded");
    assert_eq!(body["filters"][0]["value"], "abcd1234");
    assert_eq!(body["time_range"], 3600);
    assert_eq!(body["limit"], 1000);
    Ok(())
}

#[tokio::test]
async fn empty_results_list_counts_as_ready() -> anyhow::Result<()> {
    let fake = FakeHoneycomb::start(Scenario::with_results(json!([]))).await?;
    let client = HoneycombClient::new("secret", fake.endpoint())?;

    let rows = fetch_trace_rows(&client, &QuerySpec::for_trace(&params()), FAST).await?;
    assert!(rows.is_empty());
    assert_eq!(fake.recorded().polls, 1);
    Ok(())
}

#[tokio::test]
async fn times_out_when_results_never_appear() -> anyhow::Result<()> {
    let fake = FakeHoneycomb::start(Scenario {
        pending_polls: usize::MAX,
        ..Scenario::default()
    })
    .await?;
    let client = HoneycombClient::new("secret", fake.endpoint())?;
    let policy = PollPolicy {
        interval: Duration::from_millis(5),
        max_attempts: 4,
    };

    let err = fetch_trace_rows(&client, &QuerySpec::for_trace(&params()), policy)
        .await
        .unwrap_err();
    assert!(matches!(err, HtsError::Timeout { attempts: 4 }));
    assert_eq!(err.status(), None);
    assert_eq!(fake.recorded().polls, 4);
    Ok(())
}

#[tokio::test]
async fn non_json_success_body_is_fatal() -> anyhow::Result<()> {
    let fake = FakeHoneycomb::start(Scenario {
        garbled_poll: Some("<html>gateway hiccup</html>".to_string()),
        ..Scenario::with_results(sample_rows())
    })
    .await?;
    let client = HoneycombClient::new("secret", fake.endpoint())?;

    let err = fetch_trace_rows(&client, &QuerySpec::for_trace(&params()), FAST)
        .await
        .unwrap_err();
    assert!(matches!(err, HtsError::MalformedResponse(_)), "{err:?}");
    assert_eq!(err.status(), None);
    assert_eq!(fake.recorded().polls, 1);
    Ok(())
}

#[tokio::test]
async fn api_rejection_carries_status() -> anyhow::Result<()> {
    let fake = FakeHoneycomb::start(Scenario {
        fail_create: Some((401, r#"{"error":"unknown API key"}"#.to_string())),
        ..Scenario::default()
    })
    .await?;
    let client = HoneycombClient::new("bad", fake.endpoint())?;

    let err = lookup_trace(&client, &params(), FAST).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.to_string(), "Honeycomb API error: unknown API key");
    assert_eq!(fake.recorded().polls, 0);
    Ok(())
}

#[tokio::test]
async fn lookup_normalizes_and_resolves_team() -> anyhow::Result<()> {
    let fake = FakeHoneycomb::start(Scenario::with_results(sample_rows())).await?;
    let client = HoneycombClient::new("secret", fake.endpoint())?;

    let lookup = lookup_trace(&client, &params(), FAST).await?;
    assert_eq!(lookup.spans.len(), 2);
    assert_eq!(lookup.spans[0].span_id, json!("s1"));
    assert_eq!(lookup.spans[0].parent_id, json!("ROOT"));
    assert_eq!(lookup.spans[1].parent_id, json!("s1"));
    assert_eq!(lookup.window.end - lookup.window.start, 3600);
    assert_eq!(fake.recorded().auth_calls, 1);

    let url = lookup.trace_url("https://ui.honeycomb.io").expect("team resolved");
    assert!(url.starts_with(
        "https://ui.honeycomb.io/acme/environments/prod/trace?trace_id=abcd1234&trace_start_ts="
    ));
    Ok(())
}

#[tokio::test]
async fn zero_count_row_is_an_empty_trace() -> anyhow::Result<()> {
    let fake = FakeHoneycomb::start(Scenario::with_results(zero_count_rows())).await?;
    let client = HoneycombClient::new("secret", fake.endpoint())?;

    let lookup = lookup_trace(&client, &params(), FAST).await?;
    assert!(lookup.spans.is_empty());
    Ok(())
}

#[tokio::test]
async fn missing_team_slug_leaves_no_link() -> anyhow::Result<()> {
    let fake = FakeHoneycomb::start(Scenario {
        auth: json!({"environment": {"name": "prod"}}),
        ..Scenario::with_results(sample_rows())
    })
    .await?;
    let client = HoneycombClient::new("secret", fake.endpoint())?;

    let lookup = lookup_trace(&client, &params(), FAST).await?;
    assert_eq!(lookup.trace_url("https://ui.honeycomb.io"), None);
    Ok(())
}
