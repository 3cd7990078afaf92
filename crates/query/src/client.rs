use hts_core::query::{
    ALL_DATASETS, AuthInfo, QueryHandle, QueryResultRequest, QueryResultResponse, QuerySpec,
};
use hts_core::{HtsError, Result};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const TEAM_HEADER: &str = "x-honeycomb-team";
pub const USER_AGENT_VALUE: &str = concat!("honeycomb-trace-spans/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    /// Applied after the fixed headers, so a caller entry with the same name wins.
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            headers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HoneycombClient {
    http: Client,
    api_key: String,
    endpoint: String,
}

impl HoneycombClient {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| HtsError::Http(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn request<T: DeserializeOwned>(&self, path: &str, opts: RequestOptions) -> Result<T> {
        let url = format!("{}{path}", self.endpoint);
        let method = opts.method.clone();
        let headers = self.build_headers(&opts.headers)?;

        let mut req = self.http.request(method.clone(), &url).headers(headers);
        if let Some(body) = &opts.body {
            req = req.json(body);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| HtsError::Http(format!("{method} {path}: {e}")))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| HtsError::Http(format!("{method} {path}: read body: {e}")))?;
        tracing::debug!(%method, %path, status = status.as_u16(), "honeycomb api response");

        if !status.is_success() {
            return Err(api_error(status, &text));
        }

        serde_json::from_str(&text)
            .map_err(|e| HtsError::MalformedResponse(format!("{method} {path}: {e}")))
    }

    pub async fn create_query(&self, spec: &QuerySpec) -> Result<QueryHandle> {
        let body = serde_json::to_value(spec)
            .map_err(|e| HtsError::Encode(format!("query: {e}")))?;
        self.request(
            &format!("/1/queries/{ALL_DATASETS}"),
            RequestOptions::post(body),
        )
        .await
    }

    pub async fn create_query_result(&self, query_id: &str) -> Result<QueryHandle> {
        let body = serde_json::to_value(QueryResultRequest {
            query_id: query_id.to_string(),
        })
        .map_err(|e| HtsError::Encode(format!("query result request: {e}")))?;
        self.request(
            &format!("/1/query_results/{ALL_DATASETS}"),
            RequestOptions::post(body),
        )
        .await
    }

    pub async fn query_result(&self, result_id: &str) -> Result<QueryResultResponse> {
        self.request(
            &format!("/1/query_results/{ALL_DATASETS}/{result_id}"),
            RequestOptions::get(),
        )
        .await
    }

    pub async fn auth(&self) -> Result<AuthInfo> {
        self.request("/1/auth", RequestOptions::get()).await
    }

    fn build_headers(&self, extra: &[(String, String)]) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&self.api_key).map_err(|_| {
            HtsError::Config("HONEYCOMB_API_KEY contains characters not valid in a header".into())
        })?;
        headers.insert(HeaderName::from_static(TEAM_HEADER), key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        for (k, v) in extra {
            let name = HeaderName::try_from(k.as_str());
            let value = HeaderValue::try_from(v.as_str());
            match (name, value) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => {
                    tracing::warn!(header = %k, "ignored invalid request header");
                }
            }
        }
        Ok(headers)
    }
}

fn api_error(status: StatusCode, body: &str) -> HtsError {
    let detail = match serde_json::from_str::<Value>(body) {
        Ok(json) => json.get("error").and_then(error_text),
        Err(_) => Some(body.trim().to_string()).filter(|t| !t.is_empty()),
    };
    let detail = detail.unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string()
    });

    HtsError::Api {
        status: status.as_u16(),
        message: format!("Honeycomb API error: {detail}"),
    }
}

fn error_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
