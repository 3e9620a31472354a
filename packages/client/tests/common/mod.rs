//! Mock transactional graph server for integration tests

#![allow(dead_code)]

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use cypherflow_client::ConnectorConfig;
use futures::StreamExt;
use serde_json::{Value, json};

/// What the autocommit request answers with
#[derive(Debug, Clone)]
pub enum Reply {
    /// A complete envelope with `n` rows
    Rows(usize),
    /// `n` rows, then the connection stays open without sending anything
    RowsThenHang(usize),
    /// No rows, then an `errors` entry
    Error(String),
    /// `n` rows, then an `errors` entry
    RowsThenError(usize, String),
    /// Raw body chunks
    Raw(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct Scenario {
    pub columns: Vec<String>,
    /// Whether transaction creation sends a `Location` header
    pub location: bool,
    pub reply: Reply,
    /// Error message returned by the `LIMIT 0` pre-flight
    pub preflight_error: Option<String>,
    /// Expected `Authorization` header; requests without it get 401
    pub authorization: Option<String>,
    /// Status answered to `DELETE <transaction>`
    pub delete_status: StatusCode,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            columns: vec!["n".to_string(), "name".to_string()],
            location: true,
            reply: Reply::Rows(3),
            preflight_error: None,
            authorization: None,
            delete_status: StatusCode::OK,
        }
    }
}

#[derive(Debug, Default)]
pub struct Counters {
    pub preflights: AtomicUsize,
    pub opens: AtomicUsize,
    pub autocommits: AtomicUsize,
    pub plain_commits: AtomicUsize,
    pub deletes: AtomicUsize,
    pub delete_paths: Mutex<Vec<String>>,
    pub statements: Mutex<Vec<Value>>,
}

struct ServerState {
    scenario: Scenario,
    base: String,
    counters: Arc<Counters>,
}

pub struct MockServer {
    pub url: String,
    pub counters: Arc<Counters>,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl MockServer {
    pub async fn start(scenario: Scenario) -> MockServer {
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("local addr");
        let base = format!("http://{addr}");
        let counters = Arc::new(Counters::default());

        let state = Arc::new(ServerState {
            scenario,
            base: base.clone(),
            counters: counters.clone(),
        });

        let app = Router::new()
            .route("/db/data", get(server_info))
            .route("/db/data/transaction", post(open_transaction))
            .route("/db/data/transaction/commit", post(commit))
            .route("/db/data/transaction/:id", axum::routing::delete(delete_transaction))
            .route("/db/data/transaction/:id/commit", post(autocommit))
            .with_state(state);

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        MockServer {
            url: base,
            counters,
            handle,
        }
    }

    pub fn config(&self) -> ConnectorConfig {
        ConnectorConfig::new(self.url.clone()).with_timeout(Duration::from_secs(5))
    }

    pub fn deletes(&self) -> usize {
        self.counters.deletes.load(Ordering::SeqCst)
    }

    pub fn autocommits(&self) -> usize {
        self.counters.autocommits.load(Ordering::SeqCst)
    }

    pub fn opens(&self) -> usize {
        self.counters.opens.load(Ordering::SeqCst)
    }

    pub fn preflights(&self) -> usize {
        self.counters.preflights.load(Ordering::SeqCst)
    }

    pub fn statements(&self) -> Vec<Value> {
        self.counters.statements.lock().expect("statements").clone()
    }

    /// Wait until `n` DELETEs arrived, or give up after two seconds
    pub async fn wait_for_deletes(&self, n: usize) -> usize {
        for _ in 0..200 {
            if self.deletes() >= n {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.deletes()
    }
}

pub fn row(i: usize) -> Value {
    json!({
        "row": [{"idx": i}, format!("name-{i}")],
        "graph": {
            "nodes": [
                {"id": i.to_string(), "labels": ["Person"], "properties": {"idx": i}},
                {"id": "0", "labels": ["Root"], "properties": {}}
            ],
            "relationships": [
                {"id": format!("r{i}"), "type": "CHILD_OF", "startNode": i.to_string(), "endNode": "0", "properties": {}}
            ]
        }
    })
}

fn envelope_head(columns: &[String]) -> String {
    format!(r#"{{"results":[{{"columns":{},"data":["#, json!(columns))
}

fn rows_text(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let text = row(i).to_string();
            if i == 0 { text } else { format!(",{text}") }
        })
        .collect()
}

/// Split into small pieces so every boundary case of the reader gets hit
fn chunked(text: &str) -> Vec<Bytes> {
    text.as_bytes()
        .chunks(7)
        .map(Bytes::copy_from_slice)
        .collect()
}

fn authorized(state: &ServerState, headers: &HeaderMap) -> bool {
    match &state.scenario.authorization {
        None => true,
        Some(expected) => headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            == Some(expected.as_str()),
    }
}

async fn server_info(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({"neo4j_version": "3.5.14", "transaction": format!("{}/db/data/transaction", state.base)}))
        .into_response()
}

async fn open_transaction(State(state): State<Arc<ServerState>>, Json(body): Json<Value>) -> Response {
    state.counters.opens.fetch_add(1, Ordering::SeqCst);
    assert_eq!(body, json!({"statements": []}));

    let payload = json!({
        "commit": format!("{}/db/data/transaction/1/commit", state.base),
        "results": [],
        "transaction": {"expires": "Fri, 01 Jan 2038 00:00:00 +0000"},
        "errors": []
    });
    let mut response = (StatusCode::CREATED, Json(payload)).into_response();
    if state.scenario.location {
        let location = format!("{}/db/data/transaction/1", state.base);
        response.headers_mut().insert(
            header::LOCATION,
            location.parse().expect("location header"),
        );
    }
    response
}

/// Commit endpoint: answers both `LIMIT 0` pre-flights and plain queries
async fn commit(State(state): State<Arc<ServerState>>, Json(body): Json<Value>) -> Response {
    let statement = body["statements"][0].clone();
    state.counters.statements.lock().expect("statements").push(statement.clone());
    let text = statement["statement"].as_str().unwrap_or_default();
    let columns = &state.scenario.columns;

    if text.ends_with("LIMIT 0") {
        state.counters.preflights.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &state.scenario.preflight_error {
            return Json(json!({
                "results": [],
                "errors": [{"code": "Neo.ClientError.Statement.SyntaxError", "message": message}]
            }))
            .into_response();
        }
        return Json(json!({"results": [{"columns": columns, "data": []}], "errors": []}))
            .into_response();
    }

    state.counters.plain_commits.fetch_add(1, Ordering::SeqCst);
    match &state.scenario.reply {
        Reply::Error(message) | Reply::RowsThenError(_, message) => Json(json!({
            "results": [],
            "errors": [{"code": "Neo.ClientError.Statement.SyntaxError", "message": message}]
        }))
        .into_response(),
        Reply::Rows(n) | Reply::RowsThenHang(n) => {
            let data: Vec<Value> = (0..*n).map(row).collect();
            Json(json!({"results": [{"columns": columns, "data": data}], "errors": []}))
                .into_response()
        }
        Reply::Raw(_) => StatusCode::NOT_IMPLEMENTED.into_response(),
    }
}

async fn autocommit(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    state.counters.autocommits.fetch_add(1, Ordering::SeqCst);
    assert_eq!(id, "1");
    state
        .counters
        .statements
        .lock()
        .expect("statements")
        .push(body["statements"][0].clone());

    let head = envelope_head(&state.scenario.columns);
    let chunks: Vec<Bytes> = match &state.scenario.reply {
        Reply::Rows(n) => {
            let mut text = head;
            text.extend(rows_text(*n));
            text.push_str(r#"]}],"errors":[]}"#);
            chunked(&text)
        }
        Reply::RowsThenHang(n) => {
            let mut text = head;
            text.extend(rows_text(*n));
            let stream = futures::stream::iter(chunked(&text))
                .chain(futures::stream::pending())
                .map(Ok::<_, Infallible>);
            return Response::new(Body::from_stream(stream));
        }
        Reply::Error(message) => {
            let mut text = head;
            text.push_str(&format!(
                r#"]}}],"errors":[{}]}}"#,
                json!({"code": "Neo.ClientError.Statement.SyntaxError", "message": message})
            ));
            chunked(&text)
        }
        Reply::RowsThenError(n, message) => {
            let mut text = head;
            text.extend(rows_text(*n));
            text.push_str(&format!(
                r#"]}}],"errors":[{}]}}"#,
                json!({"code": "Neo.DatabaseError.General.UnknownError", "message": message})
            ));
            chunked(&text)
        }
        Reply::Raw(parts) => parts.iter().map(|part| Bytes::from(part.clone())).collect(),
    };

    let stream = futures::stream::iter(chunks).map(Ok::<_, Infallible>);
    Response::new(Body::from_stream(stream))
}

async fn delete_transaction(State(state): State<Arc<ServerState>>, Path(id): Path<String>) -> StatusCode {
    state.counters.deletes.fetch_add(1, Ordering::SeqCst);
    state
        .counters
        .delete_paths
        .lock()
        .expect("delete paths")
        .push(format!("/db/data/transaction/{id}"));
    state.scenario.delete_status
}
