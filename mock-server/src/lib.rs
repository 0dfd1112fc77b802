//! Fixture HTTP server for exercising the `semhttp` client over real sockets.
//!
//! Every route is stateless: responses are derived from the incoming request
//! alone, so a single server can be shared by tests running in parallel.

use std::time::Duration;

use axum::{
    extract::Query,
    http::{HeaderMap, Method, StatusCode, Uri},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// How long `/stall` sleeps when no `ms` parameter is given.
pub const DEFAULT_STALL: Duration = Duration::from_secs(30);

/// Description of a received request, returned by `/echo`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub raw_query: Option<String>,
    pub params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Echo {
    /// All values received for header `name`, in arrival order.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// All values received for query parameter `name`, in arrival order.
    pub fn param_values(&self, name: &str) -> Vec<&str> {
        self.params
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct Respond {
    pub status: Option<u16>,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct ByteCount {
    #[serde(default)]
    pub len: usize,
}

#[derive(Debug, Deserialize)]
pub struct Stall {
    pub ms: Option<u64>,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/respond", any(respond))
        .route("/bytes", get(bytes))
        .route("/stall", get(stall))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(
    method: Method,
    uri: Uri,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: String,
) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    tracing::debug!(%method, %uri, "echo");
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        raw_query: uri.query().map(str::to_string),
        params,
        headers,
        body,
    })
}

async fn respond(Query(input): Query<Respond>) -> Result<(StatusCode, String), StatusCode> {
    let status = StatusCode::from_u16(input.status.unwrap_or(200)).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, input.body))
}

async fn bytes(Query(input): Query<ByteCount>) -> Vec<u8> {
    (b'a'..=b'z').cycle().take(input.len).collect()
}

async fn stall(Query(input): Query<Stall>) -> StatusCode {
    let wait = input.ms.map(Duration::from_millis).unwrap_or(DEFAULT_STALL);
    tokio::time::sleep(wait).await;
    StatusCode::OK
}
