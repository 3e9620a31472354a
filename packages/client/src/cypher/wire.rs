//! JSON bodies exchanged with the transactional endpoint

use serde::de::{Deserializer, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Query parameters, sent as a JSON object
pub type Parameters = Map<String, Value>;

/// Rows only; enough to learn the column keys
pub const ROW: &[&str] = &["row"];

/// Rows plus the nodes and relationships they reference
pub const ROW_AND_GRAPH: &[&str] = &["row", "graph"];

#[derive(Debug, Serialize)]
pub struct StatementsRequest<'a> {
    pub statements: Vec<Statement<'a>>,
}

impl<'a> StatementsRequest<'a> {
    /// `{"statements": []}`, used to open a transaction
    #[must_use]
    pub fn empty() -> Self {
        Self {
            statements: Vec::new(),
        }
    }

    #[must_use]
    pub fn single(
        statement: &'a str,
        parameters: Option<&'a Parameters>,
        result_data_contents: &'a [&'a str],
    ) -> Self {
        Self {
            statements: vec![Statement {
                statement,
                parameters,
                result_data_contents,
            }],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Statement<'a> {
    pub statement: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<&'a Parameters>,
    #[serde(rename = "resultDataContents")]
    pub result_data_contents: &'a [&'a str],
}

/// Body of a commit-endpoint response read in one piece
#[derive(Debug, Default, Deserialize)]
pub struct CommitResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub results: Vec<StatementResult>,
    #[serde(default, deserialize_with = "nullable")]
    pub errors: Vec<ServerError>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatementResult {
    #[serde(default, deserialize_with = "nullable")]
    pub columns: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub data: Vec<WireRecord>,
}

/// One element of `results[0].data`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireRecord {
    #[serde(default, deserialize_with = "nullable")]
    pub row: Vec<Value>,
    #[serde(default, deserialize_with = "nullable")]
    pub graph: WireGraph,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireGraph {
    #[serde(default, deserialize_with = "nullable")]
    pub nodes: Vec<WireNode>,
    #[serde(default, deserialize_with = "nullable")]
    pub relationships: Vec<WireRelationship>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireNode {
    #[serde(deserialize_with = "entity_id")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub labels: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireRelationship {
    #[serde(deserialize_with = "entity_id")]
    pub id: String,
    #[serde(rename = "type", default)]
    pub rel_type: String,
    #[serde(rename = "startNode", deserialize_with = "entity_id")]
    pub start_node: String,
    #[serde(rename = "endNode", deserialize_with = "entity_id")]
    pub end_node: String,
    #[serde(default, deserialize_with = "nullable")]
    pub properties: Map<String, Value>,
}

/// An entry of the top-level `errors` array
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServerError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl ServerError {
    /// Lenient decoding of an `errors[*]` entry; unknown shapes keep their JSON text
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match serde_json::from_value::<ServerError>(value.clone()) {
            Ok(error) if !error.message.is_empty() || !error.code.is_empty() => error,
            _ => ServerError {
                code: String::new(),
                message: value.to_string(),
            },
        }
    }
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.code.is_empty(), self.message.is_empty()) {
            (_, false) => f.write_str(&self.message),
            (false, true) => f.write_str(&self.code),
            (true, true) => f.write_str("unknown error"),
        }
    }
}

/// Body of `GET /db/data`
#[derive(Debug, Default, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub neo4j_version: Option<String>,
}

/// Entity ids are strings over HTTP; older servers send numbers
fn entity_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(D::Error::custom(format!("invalid entity id: {other}"))),
    }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
