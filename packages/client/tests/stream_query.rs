mod common;

use std::time::Duration;

use common::{MockServer, Reply, Scenario};
use cypherflow_client::cypher::TransactionState;
use cypherflow_client::error::Kind;
use cypherflow_client::prelude::*;
use futures::StreamExt;
use serde_json::json;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

async fn start(scenario: Scenario) -> (MockServer, CypherConnector) {
    init_logging();
    let server = MockServer::start(scenario).await;
    let connector = CypherConnector::new(server.config()).expect("connector");
    (server, connector)
}

#[tokio::test]
async fn happy_path_streams_rows_in_order() {
    let (server, connector) = start(Scenario::default()).await;

    let QueryStream {
        columns,
        records,
        abort,
    } = connector
        .stream_query("MATCH (n) RETURN n, n.name AS name", None, false)
        .await
        .expect("stream");
    assert_eq!(columns, vec!["n", "name"]);

    let records: Vec<GraphRecord> = records.map(|record| record.expect("record")).collect().await;
    assert_eq!(records.len(), 3);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.rows, vec![json!({"idx": i}), json!(format!("name-{i}"))]);
        assert_eq!(record.nodes.len(), 2);
        assert_eq!(record.nodes[0].id, i.to_string());
        assert_eq!(record.nodes[0].categories, vec!["Person"]);
        assert_eq!(record.edges[0].source, i.to_string());
        assert_eq!(record.edges[0].target, "0");
        assert_eq!(record.edges[0].edge_type, "CHILD_OF");
    }

    assert_eq!(server.preflights(), 1);
    assert_eq!(server.opens(), 1);
    assert_eq!(server.autocommits(), 1);
    assert_eq!(server.deletes(), 0);
    assert!(!abort.is_aborted());

    let stats = connector.stats();
    assert_eq!(stats.transactions_committed, 1);
    assert_eq!(stats.records_streamed, 3);
}

#[tokio::test]
async fn preflight_uses_limit_zero_and_rows_only() {
    let (server, connector) = start(Scenario::default()).await;
    let mut parameters = Parameters::new();
    parameters.insert("min".to_string(), json!(3));

    let stream = connector
        .stream_query("MATCH (n) WHERE n.idx > $min RETURN n LIMIT 10;", Some(&parameters), false)
        .await
        .expect("stream");
    let _ = stream.records.collect::<Vec<_>>().await;

    let statements = server.statements();
    assert_eq!(statements.len(), 2);
    assert_eq!(
        statements[0],
        json!({
            "statement": "MATCH (n) WHERE n.idx > $min RETURN n LIMIT 0",
            "parameters": {"min": 3},
            "resultDataContents": ["row"]
        })
    );
    assert_eq!(
        statements[1],
        json!({
            "statement": "MATCH (n) WHERE n.idx > $min RETURN n LIMIT 10;",
            "parameters": {"min": 3},
            "resultDataContents": ["row", "graph"]
        })
    );
}

#[tokio::test]
async fn abort_mid_stream_deletes_once_and_stops() {
    let (server, connector) = start(Scenario {
        reply: Reply::RowsThenHang(3),
        ..Scenario::default()
    })
    .await;

    let QueryStream {
        mut records, abort, ..
    } = connector
        .stream_query("MATCH (n) RETURN n", None, false)
        .await
        .expect("stream");

    let first = records.next().await.expect("first").expect("record");
    assert_eq!(first.rows[1], json!("name-0"));

    abort.abort().await;
    assert!(abort.is_aborted());
    assert_eq!(server.deletes(), 1);
    assert_eq!(
        server.counters.delete_paths.lock().unwrap().as_slice(),
        ["/db/data/transaction/1"]
    );

    assert!(records.next().await.is_none());
    assert!(records.next().await.is_none());

    abort.abort().await;
    drop(records);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(server.deletes(), 1);
    assert_eq!(connector.stats().transactions_rolled_back, 1);
}

#[tokio::test]
async fn abort_from_another_task_ends_a_blocked_consumer() {
    let (server, connector) = start(Scenario {
        reply: Reply::RowsThenHang(1),
        ..Scenario::default()
    })
    .await;

    let QueryStream {
        mut records, abort, ..
    } = connector
        .stream_query("MATCH (n) RETURN n", None, false)
        .await
        .expect("stream");
    assert!(records.next().await.is_some());

    let watchdog = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        abort.abort().await;
    });

    let next = tokio::time::timeout(Duration::from_secs(2), records.next())
        .await
        .expect("consumer released");
    assert!(next.is_none());
    watchdog.await.expect("watchdog");
    assert_eq!(server.deletes(), 1);
}

#[tokio::test]
async fn abort_after_completion_sends_nothing() {
    let (server, connector) = start(Scenario::default()).await;

    let QueryStream { records, abort, .. } = connector
        .stream_query("MATCH (n) RETURN n", None, false)
        .await
        .expect("stream");
    assert_eq!(records.collect::<Vec<_>>().await.len(), 3);

    abort.abort().await;
    abort.abort().await;
    assert_eq!(server.deletes(), 0);
}

#[tokio::test]
async fn cancelled_call_before_first_row_rolls_back() {
    let (server, connector) = start(Scenario {
        reply: Reply::RowsThenHang(0),
        ..Scenario::default()
    })
    .await;

    let outcome = tokio::time::timeout(
        Duration::from_millis(300),
        connector.stream_query("MATCH (n) RETURN n", None, false),
    )
    .await;
    assert!(outcome.is_err(), "server never sends a row");

    assert_eq!(server.opens(), 1);
    assert_eq!(server.autocommits(), 1);
    assert_eq!(server.wait_for_deletes(1).await, 1);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(server.deletes(), 1);

    let stats = connector.stats();
    assert_eq!(stats.transactions_rolled_back, 1);
    assert_eq!(stats.transactions_committed, 0);
}

#[tokio::test]
async fn missing_location_fails_before_autocommit() {
    let (server, connector) = start(Scenario {
        location: false,
        ..Scenario::default()
    })
    .await;

    let error = connector
        .stream_query("MATCH (n) RETURN n", None, false)
        .await
        .expect_err("no transaction");
    assert!(error.is_protocol());
    assert_eq!(server.opens(), 1);
    assert_eq!(server.autocommits(), 0);
}

#[tokio::test]
async fn body_level_error_fails_the_call() {
    let (server, connector) = start(Scenario {
        reply: Reply::Error("Unknown function 'foo'".to_string()),
        ..Scenario::default()
    })
    .await;

    let error = connector
        .stream_query("MATCH (n) RETURN foo(n)", None, false)
        .await
        .expect_err("remote error");
    assert!(error.is_query());
    assert!(error.to_string().contains("Unknown function 'foo'"));
    assert_eq!(server.wait_for_deletes(1).await, 1);
}

#[tokio::test]
async fn error_after_rows_is_a_terminal_item() {
    let (server, connector) = start(Scenario {
        reply: Reply::RowsThenError(2, "Java heap space".to_string()),
        ..Scenario::default()
    })
    .await;

    let stream = connector
        .stream_query("MATCH (n) RETURN n", None, false)
        .await
        .expect("stream");
    let items: Vec<_> = stream.records.collect().await;
    assert_eq!(items.len(), 3);
    assert!(items[0].is_ok() && items[1].is_ok());
    let error = items[2].as_ref().expect_err("terminal error");
    assert!(error.to_string().contains("Java heap space"));
    assert_eq!(server.deletes(), 1);
}

#[tokio::test]
async fn truncated_body_is_a_terminal_error() {
    let (server, connector) = start(Scenario {
        reply: Reply::Raw(vec![
            r#"{"results":[{"columns":["n"],"data":[{"row":[1],"graph":{"nodes":[],"relationships":[]}},"#
                .to_string(),
            r#"{"row":[2],"gr"#.to_string(),
        ]),
        ..Scenario::default()
    })
    .await;

    let stream = connector
        .stream_query("MATCH (n) RETURN n", None, false)
        .await
        .expect("stream");
    let items: Vec<_> = stream.records.collect().await;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().expect("row").rows, vec![json!(1)]);
    let error = items[1].as_ref().expect_err("truncated");
    assert_eq!(error.kind(), &Kind::Decode);
    assert!(error.to_string().contains("not closed"));
    assert_eq!(server.deletes(), 1);
}

#[tokio::test]
async fn empty_result_commits_without_rollback() {
    let (server, connector) = start(Scenario {
        reply: Reply::Rows(0),
        ..Scenario::default()
    })
    .await;

    let QueryStream {
        columns,
        mut records,
        abort,
    } = connector
        .stream_query("MATCH (n:Nothing) RETURN n", None, false)
        .await
        .expect("stream");
    assert_eq!(columns, vec!["n", "name"]);
    assert!(records.next().await.is_none());
    abort.abort().await;
    assert_eq!(server.deletes(), 0);
}

#[tokio::test]
async fn dropping_the_stream_rolls_back() {
    let (server, connector) = start(Scenario {
        reply: Reply::RowsThenHang(3),
        ..Scenario::default()
    })
    .await;

    let QueryStream { mut records, .. } = connector
        .stream_query("MATCH (n) RETURN n", None, false)
        .await
        .expect("stream");
    assert!(records.next().await.is_some());
    drop(records);

    assert_eq!(server.wait_for_deletes(1).await, 1);
}

#[tokio::test]
async fn dropping_before_first_poll_rolls_back() {
    let (server, connector) = start(Scenario::default()).await;

    let stream = connector
        .stream_query("MATCH (n) RETURN n", None, false)
        .await
        .expect("stream");
    drop(stream);

    assert_eq!(server.wait_for_deletes(1).await, 1);
}

#[tokio::test]
async fn preflight_error_restores_caller_limit() {
    let (server, connector) = start(Scenario {
        preflight_error: Some(
            "Invalid input 'N': expected whitespace (line 1, column 10 (offset: 9))\n\"MATCH (n) RETURN N LIMIT 0\"".to_string(),
        ),
        ..Scenario::default()
    })
    .await;

    let error = connector
        .stream_query("MATCH (n) RETURN N LIMIT 25", None, false)
        .await
        .expect_err("syntax error");
    assert!(error.is_query());
    let message = error.to_string();
    assert!(message.contains("RETURN N LIMIT 25"), "{message}");
    assert!(!message.contains("LIMIT 0"), "{message}");
    assert_eq!(server.opens(), 0);
}

#[tokio::test]
async fn failed_rollback_is_only_logged() {
    let (server, connector) = start(Scenario {
        reply: Reply::RowsThenHang(1),
        delete_status: axum::http::StatusCode::METHOD_NOT_ALLOWED,
        ..Scenario::default()
    })
    .await;

    let QueryStream {
        mut records, abort, ..
    } = connector
        .stream_query("MATCH (n) RETURN n", None, false)
        .await
        .expect("stream");
    assert!(records.next().await.is_some());
    abort.abort().await;
    assert_eq!(server.deletes(), 1);
    assert_eq!(connector.stats().rollback_failures, 0);
}

#[tokio::test]
async fn concurrent_queries_own_their_transactions() {
    let (server, connector) = start(Scenario::default()).await;

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let connector = connector.clone();
            tokio::spawn(async move {
                let stream = connector
                    .stream_query("MATCH (n) RETURN n", None, false)
                    .await
                    .expect("stream");
                stream.records.collect::<Vec<_>>().await.len()
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.expect("task"), 3);
    }
    assert_eq!(server.opens(), 4);
    assert_eq!(server.deletes(), 0);
    assert_eq!(connector.stats().transactions_committed, 4);
}

#[tokio::test]
async fn transaction_state_is_final() {
    let (server, connector) = start(Scenario::default()).await;
    let transaction = connector.begin_transaction(false).await.expect("transaction");
    assert_eq!(transaction.state(), TransactionState::Open);
    assert!(transaction.url().as_str().ends_with("/db/data/transaction/1"));

    assert!(transaction.rollback().await);
    assert!(!transaction.rollback().await);
    assert_eq!(transaction.state(), TransactionState::RolledBack);
    assert_eq!(server.deletes(), 1);
}
