use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use cypherflow::{CypherFlow, GraphRecord};
use futures::StreamExt;
use serde_json::{Value, json};

#[derive(Default)]
struct Seen {
    statements: std::sync::Mutex<Vec<Value>>,
    deletes: AtomicUsize,
}

struct AppState {
    base: String,
    seen: Arc<Seen>,
}

fn body_for(statement: &Value) -> Value {
    let text = statement["statement"].as_str().unwrap_or_default();
    let data: Vec<Value> = if text.ends_with("LIMIT 0") {
        Vec::new()
    } else {
        let age = statement["parameters"]["age"].as_i64().unwrap_or(0);
        (0..2)
            .map(|i| {
                json!({
                    "row": [{"age": age + i}],
                    "graph": {
                        "nodes": [{"id": i, "labels": ["Person"], "properties": {"age": age + i}}],
                        "relationships": []
                    }
                })
            })
            .collect()
    };
    json!({"results": [{"columns": ["p"], "data": data}], "errors": []})
}

async fn commit(State(state): State<Arc<AppState>>, Json(body): Json<Value>) -> Json<Value> {
    let statement = body["statements"][0].clone();
    state.seen.statements.lock().unwrap().push(statement.clone());
    Json(body_for(&statement))
}

async fn open(State(state): State<Arc<AppState>>) -> Response {
    let mut response = (StatusCode::CREATED, Json(json!({"results": [], "errors": []}))).into_response();
    let location = format!("{}/db/data/transaction/7", state.base);
    response
        .headers_mut()
        .insert(header::LOCATION, location.parse().unwrap());
    response
}

async fn remove(State(state): State<Arc<AppState>>) -> StatusCode {
    state.seen.deletes.fetch_add(1, Ordering::SeqCst);
    StatusCode::OK
}

async fn start() -> (String, Arc<Seen>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let seen = Arc::new(Seen::default());
    let state = Arc::new(AppState {
        base: base.clone(),
        seen: seen.clone(),
    });

    let app = Router::new()
        .route("/db/data", get(|| async { Json(json!({"neo4j_version": "4.0.0"})) }))
        .route("/db/data/transaction", post(open))
        .route("/db/data/transaction/commit", post(commit))
        .route("/db/data/transaction/7/commit", post(commit))
        .route("/db/data/transaction/7", delete(remove))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (base, seen)
}

#[tokio::test]
async fn build_and_connect_reports_version() {
    let (base, _) = start().await;
    let (_, version) = CypherFlow::connect(base)
        .timeout(Duration::from_secs(5))
        .debug()
        .build_and_connect()
        .await
        .expect("connect");
    assert_eq!(version, "4.0.0");
}

#[tokio::test]
async fn stream_binds_parameters() {
    let (base, seen) = start().await;
    let connector = CypherFlow::connect(base).build().expect("connector");

    let stream = CypherFlow::with_connector(&connector)
        .query("MATCH (p:Person) WHERE p.age > $age RETURN p")
        .param("age", 30)
        .stream()
        .await
        .expect("stream");
    assert_eq!(stream.columns, vec!["p"]);

    let records: Vec<GraphRecord> = stream.records.map(|r| r.expect("record")).collect().await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].rows, vec![json!({"age": 31})]);
    assert_eq!(records[1].nodes[0].id, "1");

    let statements = seen.statements.lock().unwrap().clone();
    assert_eq!(statements.len(), 2);
    assert!(statements.iter().all(|s| s["parameters"] == json!({"age": 30})));
    assert_eq!(seen.deletes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn collect_and_keys_skip_the_transaction() {
    let (base, seen) = start().await;
    let connector = CypherFlow::connect(base).build().expect("connector");
    let query = CypherFlow::with_connector(&connector).query("MATCH (p) RETURN p");

    assert_eq!(query.clone().keys().await.expect("keys"), vec!["p"]);
    let result = query.collect().await.expect("collect");
    assert_eq!(result.columns, vec!["p"]);
    assert_eq!(result.records.len(), 2);

    let statements = seen.statements.lock().unwrap().clone();
    assert_eq!(statements[0]["statement"], json!("MATCH (p) RETURN p LIMIT 0"));
    assert!(statements[1].get("parameters").is_none());
}
