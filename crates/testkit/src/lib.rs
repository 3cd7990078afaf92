use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Scripted behavior of the fake Honeycomb API.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Polls answered without `data.results` before the rows are served.
    pub pending_polls: usize,
    pub results: Value,
    pub auth: Value,
    /// Status and body returned from query creation instead of a handle.
    pub fail_create: Option<(u16, String)>,
    /// When set, every poll is answered `200 OK` with this raw body.
    pub garbled_poll: Option<String>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            pending_polls: 0,
            results: json!([]),
            auth: json!({
                "team": {"slug": "acme", "name": "Acme"},
                "environment": {"slug": "prod", "name": "prod"}
            }),
            fail_create: None,
            garbled_poll: None,
        }
    }
}

impl Scenario {
    pub fn with_results(results: Value) -> Self {
        Self {
            results,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Recorded {
    pub query_body: Option<Value>,
    pub query_result_body: Option<Value>,
    pub team_header: Option<String>,
    pub user_agent: Option<String>,
    pub content_type: Option<String>,
    pub polls: usize,
    pub auth_calls: usize,
}

#[derive(Clone)]
struct Shared {
    scenario: Arc<Scenario>,
    recorded: Arc<Mutex<Recorded>>,
}

pub struct FakeHoneycomb {
    addr: SocketAddr,
    recorded: Arc<Mutex<Recorded>>,
    task: JoinHandle<()>,
}

impl FakeHoneycomb {
    pub async fn start(scenario: Scenario) -> anyhow::Result<Self> {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let state = Shared {
            scenario: Arc::new(scenario),
            recorded: recorded.clone(),
        };
        let app = Router::new()
            .route("/1/queries/{dataset}", post(create_query))
            .route("/1/query_results/{dataset}", post(create_query_result))
            .route("/1/query_results/{dataset}/{id}", get(query_result))
            .route("/1/auth", get(auth))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            recorded,
            task,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn recorded(&self) -> Recorded {
        self.recorded.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl Drop for FakeHoneycomb {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn create_query(
    State(state): State<Shared>,
    Path(_dataset): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Ok(mut rec) = state.recorded.lock() {
        rec.query_body = Some(body);
        rec.team_header = header(&headers, "x-honeycomb-team");
        rec.user_agent = header(&headers, "user-agent");
        rec.content_type = header(&headers, "content-type");
    }

    if let Some((status, body)) = &state.scenario.fail_create {
        let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, body.clone()).into_response();
    }
    Json(json!({"id": "q-1"})).into_response()
}

async fn create_query_result(
    State(state): State<Shared>,
    Path(_dataset): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    if let Ok(mut rec) = state.recorded.lock() {
        rec.query_result_body = Some(body);
    }
    Json(json!({"id": "r-1"}))
}

async fn query_result(
    State(state): State<Shared>,
    Path((_dataset, _id)): Path<(String, String)>,
) -> Response {
    let polls = match state.recorded.lock() {
        Ok(mut rec) => {
            rec.polls += 1;
            rec.polls
        }
        Err(_) => usize::MAX,
    };

    if let Some(body) = &state.scenario.garbled_poll {
        return (StatusCode::OK, body.clone()).into_response();
    }
    if polls <= state.scenario.pending_polls {
        return Json(json!({"complete": false, "data": {}})).into_response();
    }
    Json(json!({
        "complete": true,
        "data": {"results": state.scenario.results.clone(), "series": []}
    }))
    .into_response()
}

async fn auth(State(state): State<Shared>) -> Json<Value> {
    if let Ok(mut rec) = state.recorded.lock() {
        rec.auth_calls += 1;
    }
    Json(state.scenario.auth.clone())
}

/// Two spans of a web request hitting the database, nested the way the
/// query result API returns breakdown rows.
pub fn sample_rows() -> Value {
    json!([
        {"data": {
            "trace.span_id": "s2",
            "trace.parent_id": "s1",
            "name": "SELECT",
            "service.name": "db",
            "duration_ms": 4,
            "COUNT": 1
        }},
        {"data": {
            "trace.span_id": "s1",
            "name": "GET /",
            "service.name": "web",
            "duration_ms": 12,
            "COUNT": 1
        }}
    ])
}

pub fn zero_count_rows() -> Value {
    json!([{"data": {"COUNT": 0}}])
}
