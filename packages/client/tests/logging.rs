//! Client events reach `log` loggers such as `env_logger`

mod common;

use std::sync::Mutex;

use common::{MockServer, Reply, Scenario};
use cypherflow_client::prelude::*;
use futures::StreamExt;

struct Recorder {
    records: Mutex<Vec<(String, String)>>,
}

impl log::Log for Recorder {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        self.records
            .lock()
            .expect("records")
            .push((record.target().to_string(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static RECORDER: Recorder = Recorder {
    records: Mutex::new(Vec::new()),
};

fn messages_for(target: &str) -> Vec<String> {
    RECORDER
        .records
        .lock()
        .expect("records")
        .iter()
        .filter(|(t, _)| t == target)
        .map(|(_, message)| message.clone())
        .collect()
}

#[tokio::test]
async fn connector_events_are_forwarded_to_log() {
    log::set_logger(&RECORDER).expect("single logger per test binary");
    log::set_max_level(log::LevelFilter::Trace);

    let server = MockServer::start(Scenario {
        reply: Reply::RowsThenHang(1),
        ..Scenario::default()
    })
    .await;
    let connector = CypherConnector::new(server.config()).expect("connector");
    connector.connect().await.expect("version");

    let QueryStream {
        mut records, abort, ..
    } = connector
        .stream_query("MATCH (n) RETURN n", None, false)
        .await
        .expect("stream");
    assert!(records.next().await.is_some());
    abort.abort().await;

    let cypher = messages_for("cypherflow::cypher");
    assert!(cypher.iter().any(|m| m.contains("connected")), "{cypher:?}");
    assert!(cypher.iter().any(|m| m.contains("transaction opened")), "{cypher:?}");
    assert!(cypher.iter().any(|m| m.contains("query stream aborted")), "{cypher:?}");

    let http = messages_for("cypherflow::http");
    assert!(http.iter().any(|m| m.contains("sending request")), "{http:?}");
}
