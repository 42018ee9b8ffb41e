//! Host interface
//!
//! The host drives every list/get callback: it owns the row budget, receives
//! streamed rows and decides which matrix record each invocation runs under.

use crate::connection::Connection;
use crate::identity::Identity;
use crate::scope::ScopeRecord;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A streamed row: the API item verbatim plus its identity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub item: Value,
    pub identity: Identity,
}

impl Row {
    pub fn new(item: Value, identity: Identity) -> Self {
        Self { item, identity }
    }
}

/// Consumer of streamed rows
#[async_trait]
pub trait Host: Send + Sync {
    /// Accept a row; may wait on backpressure
    async fn stream_item(&self, row: Row);

    /// Rows the query still wants, `u64::MAX` when unbounded
    fn rows_remaining(&self) -> u64;
}

/// Per-invocation query context
#[derive(Clone)]
pub struct QueryData {
    connection: Arc<Connection>,
    host: Arc<dyn Host>,
    quals: HashMap<String, String>,
    matrix_item: Option<ScopeRecord>,
    limit: Option<u64>,
    cancel: CancellationToken,
}

impl QueryData {
    pub fn new(connection: Arc<Connection>, host: Arc<dyn Host>) -> Self {
        Self {
            connection,
            host,
            quals: HashMap::new(),
            matrix_item: None,
            limit: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Add an equality qual (`column = value`)
    pub fn with_qual(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.quals.insert(column.into(), value.into());
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_matrix_item(mut self, item: ScopeRecord) -> Self {
        self.matrix_item = Some(item);
        self
    }

    /// Same query bound to another matrix record
    pub fn for_matrix_item(&self, item: Option<ScopeRecord>) -> Self {
        Self {
            matrix_item: item,
            ..self.clone()
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn matrix_item(&self) -> Option<&ScopeRecord> {
        self.matrix_item.as_ref()
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Value of an equality qual; blank values read as unset
    pub fn equals_qual(&self, column: &str) -> Option<&str> {
        self.quals
            .get(column)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Value of a column of the current matrix record
    pub fn matrix_value(&self, column: &str) -> Option<&str> {
        self.matrix_item.as_ref().and_then(|item| item.get(column))
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub async fn stream_item(&self, row: Row) {
        self.host.stream_item(row).await;
    }

    pub fn rows_remaining(&self) -> u64 {
        self.host.rows_remaining()
    }
}
