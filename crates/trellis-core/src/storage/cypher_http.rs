//! # Remote Cypher Executor
//!
//! Runs each query as one auto-committed transaction against a Neo4j-compatible
//! transactional HTTP endpoint (`POST {base}/db/{database}/tx/commit`).
//!
//! Request body:
//! ```json
//! {"statements": [{"statement": "<cypher>", "parameters": {...}}]}
//! ```
//!
//! A response carrying a non-empty `errors` array is a failure even when the
//! HTTP status is 200. Result rows are zipped with `columns` into records.

use super::backend_err;
use crate::StoreError;
use crate::config::Credentials;
use crate::executor::{QueryExecutor, Record};
use crate::query::Query;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};
use std::time::Duration;

/// Database name used when the endpoint does not name a commit path.
const DEFAULT_DATABASE: &str = "neo4j";

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Executor backed by a remote graph engine speaking Cypher over HTTP.
pub struct CypherHttp {
    agent: ureq::Agent,
    commit_url: String,
    authorization: Option<String>,
}

impl std::fmt::Debug for CypherHttp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CypherHttp")
            .field("commit_url", &self.commit_url)
            .field("authenticated", &self.authorization.is_some())
            .finish_non_exhaustive()
    }
}

impl CypherHttp {
    /// Create an executor for `endpoint`.
    ///
    /// `endpoint` may be a server base URL (`http://host:7474`) or a full
    /// commit URL ending in `/tx/commit`. No request is made here.
    pub fn new(endpoint: &str, credentials: Option<&Credentials>) -> Result<Self, StoreError> {
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(StoreError::Config(format!(
                "remote endpoint must be an http(s) URL, got '{}'",
                endpoint
            )));
        }
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Ok(Self {
            agent,
            commit_url: commit_url(endpoint),
            authorization: credentials.map(basic_auth),
        })
    }

    fn post(&self, body: &Value) -> Result<Value, StoreError> {
        let mut request = self
            .agent
            .post(&self.commit_url)
            .set("Accept", "application/json");
        if let Some(header) = &self.authorization {
            request = request.set("Authorization", header);
        }

        match request.send_json(body) {
            Ok(response) => response.into_json::<Value>().map_err(backend_err),
            Err(ureq::Error::Status(code, response)) => {
                let detail = response.into_string().unwrap_or_default();
                Err(StoreError::Backend(format!(
                    "graph endpoint returned HTTP {}: {}",
                    code, detail
                )))
            }
            Err(e) => Err(backend_err(e)),
        }
    }
}

impl QueryExecutor for CypherHttp {
    fn execute(&self, query: &Query) -> Result<Vec<Record>, StoreError> {
        let body = request_body(query);
        let response = self.post(&body)?;
        parse_response(&response)
    }

    fn backend_name(&self) -> &'static str {
        "cypher-http"
    }
}

// =============================================================================
// WIRE FORMAT
// =============================================================================

fn commit_url(endpoint: &str) -> String {
    let base = endpoint.trim_end_matches('/');
    if base.ends_with("/tx/commit") {
        base.to_string()
    } else {
        format!("{}/db/{}/tx/commit", base, DEFAULT_DATABASE)
    }
}

fn basic_auth(credentials: &Credentials) -> String {
    let pair = format!("{}:{}", credentials.username, credentials.password);
    format!("Basic {}", STANDARD.encode(pair))
}

fn request_body(query: &Query) -> Value {
    json!({
        "statements": [{
            "statement": query.text(),
            "parameters": Value::Object(query.parameters()),
        }]
    })
}

/// Turn a transactional response into records of the first result set.
fn parse_response(response: &Value) -> Result<Vec<Record>, StoreError> {
    if let Some(errors) = response.get("errors").and_then(Value::as_array)
        && let Some(first) = errors.first()
    {
        let code = first.get("code").and_then(Value::as_str).unwrap_or("unknown");
        let message = first
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("no message");
        return Err(StoreError::Backend(format!("{}: {}", code, message)));
    }

    let Some(result) = response
        .get("results")
        .and_then(Value::as_array)
        .and_then(|results| results.first())
    else {
        return Ok(Vec::new());
    };

    let columns: Vec<&str> = result
        .get("columns")
        .and_then(Value::as_array)
        .map(|cols| cols.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let rows = result
        .get("data")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    rows.iter()
        .map(|entry| {
            let values = entry.get("row").and_then(Value::as_array).ok_or_else(|| {
                StoreError::MalformedRecord("result entry has no 'row' array".to_string())
            })?;
            if values.len() != columns.len() {
                return Err(StoreError::MalformedRecord(format!(
                    "row has {} values for {} columns",
                    values.len(),
                    columns.len()
                )));
            }
            Ok(columns
                .iter()
                .zip(values)
                .map(|(column, value)| ((*column).to_string(), value.clone()))
                .collect())
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::StatementFilter;

    #[test]
    fn base_url_gets_default_commit_path() {
        assert_eq!(
            commit_url("http://localhost:7474/"),
            "http://localhost:7474/db/neo4j/tx/commit"
        );
        assert_eq!(
            commit_url("https://graph.example/db/facts/tx/commit"),
            "https://graph.example/db/facts/tx/commit"
        );
    }

    #[test]
    fn non_http_endpoint_is_rejected() {
        assert!(matches!(
            CypherHttp::new("bolt://localhost:7687", None),
            Err(StoreError::Config(_))
        ));
    }

    #[test]
    fn basic_auth_header_encodes_pair() {
        let credentials = Credentials {
            username: "neo4j".to_string(),
            password: "secret".to_string(),
        };
        assert_eq!(basic_auth(&credentials), "Basic bmVvNGo6c2VjcmV0");
    }

    #[test]
    fn request_body_carries_text_and_parameters() {
        let query = Query::CountStatements {
            filter: StatementFilter::Predicate("likes".into()),
        };
        let body = request_body(&query);
        let statement = &body["statements"][0];
        assert_eq!(statement["statement"], json!(query.text()));
        assert_eq!(statement["parameters"]["predicate"], json!("likes"));
    }

    #[test]
    fn rows_are_zipped_with_columns() {
        let response = json!({
            "results": [{
                "columns": ["value"],
                "data": [{"row": ["alice"], "meta": [null]}, {"row": ["bob"], "meta": [null]}]
            }],
            "errors": []
        });
        let records = parse_response(&response).expect("parse");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("value"), Some(&json!("bob")));
    }

    #[test]
    fn errors_array_fails_even_with_results() {
        let response = json!({
            "results": [],
            "errors": [{"code": "Neo.ClientError.Statement.SyntaxError", "message": "bad"}]
        });
        let err = parse_response(&response).expect_err("should fail");
        assert!(matches!(err, StoreError::Backend(msg) if msg.contains("SyntaxError")));
    }

    #[test]
    fn missing_results_is_empty() {
        let records = parse_response(&json!({"results": [], "errors": []})).expect("parse");
        assert!(records.is_empty());
    }

    #[test]
    fn ragged_row_is_malformed() {
        let response = json!({
            "results": [{"columns": ["a", "b"], "data": [{"row": [1]}]}],
            "errors": []
        });
        assert!(matches!(
            parse_response(&response),
            Err(StoreError::MalformedRecord(_))
        ));
    }
}
