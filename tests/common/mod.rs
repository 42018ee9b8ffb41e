//! Shared fixtures: a recording host and connections pointed at wiremock

#![allow(dead_code)]

use async_trait::async_trait;
use gcp_tables::{Connection, ConnectionConfig, Host, QueryData, Row, StaticCredentials};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use wiremock::MockServer;

pub const PROJECT: &str = "proj-1";
pub const TOKEN: &str = "test-token";

/// Host recording every streamed row
#[derive(Default)]
pub struct MockHost {
    rows: Mutex<Vec<Row>>,
    budget: Option<u64>,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl MockHost {
    pub fn unbounded() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Host whose query wants at most `budget` rows
    pub fn with_budget(budget: u64) -> Arc<Self> {
        Arc::new(Self {
            budget: Some(budget),
            ..Default::default()
        })
    }

    /// Host cancelling `token` once `rows` rows arrived
    pub fn cancel_after(rows: usize, token: CancellationToken) -> Arc<Self> {
        Arc::new(Self {
            cancel_after: Some((rows, token)),
            ..Default::default()
        })
    }

    pub fn rows(&self) -> Vec<Row> {
        self.rows.lock().unwrap().clone()
    }

    /// `name` of every streamed item, in arrival order
    pub fn names(&self) -> Vec<String> {
        self.rows()
            .iter()
            .filter_map(|row| row.item.get("name").and_then(|v| v.as_str()))
            .map(str::to_string)
            .collect()
    }
}

#[async_trait]
impl Host for MockHost {
    async fn stream_item(&self, row: Row) {
        let count = {
            let mut rows = self.rows.lock().unwrap();
            rows.push(row);
            rows.len()
        };
        if let Some((after, token)) = &self.cancel_after {
            if count >= *after {
                token.cancel();
            }
        }
    }

    fn rows_remaining(&self) -> u64 {
        match self.budget {
            Some(budget) => budget.saturating_sub(self.rows.lock().unwrap().len() as u64),
            None => u64::MAX,
        }
    }
}

/// Connection to `server` with project `proj-1` and a static token
pub fn connection(server: &MockServer) -> Arc<Connection> {
    connection_with(server, |_| {})
}

/// Like [`connection`], with the config adjusted by `tweak`
pub fn connection_with(server: &MockServer, tweak: impl FnOnce(&mut ConnectionConfig)) -> Arc<Connection> {
    let mut config = ConnectionConfig {
        project: Some(PROJECT.to_string()),
        endpoint: Some(server.uri()),
        ..Default::default()
    };
    tweak(&mut config);
    let conn = Connection::with_credentials(config, Arc::new(StaticCredentials::new(TOKEN)))
        .expect("valid test config");
    Arc::new(conn)
}

pub fn query(conn: &Arc<Connection>, host: &Arc<MockHost>) -> QueryData {
    QueryData::new(conn.clone(), host.clone())
}

/// Google API error body
pub fn api_error(code: u16, status: &str) -> Value {
    json!({
        "error": {
            "code": code,
            "message": format!("{} from test server", status),
            "status": status
        }
    })
}

/// `projects/proj-1/locations` response listing `ids`
pub fn locations(ids: &[&str]) -> Value {
    let locations: Vec<Value> = ids
        .iter()
        .map(|id| {
            json!({
                "name": format!("projects/{}/locations/{}", PROJECT, id),
                "locationId": id
            })
        })
        .collect();
    json!({ "locations": locations })
}
