//! In-process runner
//!
//! Drives list/get callbacks the way a host would: build the table's matrix,
//! run one invocation per matrix record with bounded concurrency and apply the
//! table's ignore policy to their errors.

use crate::error::{is_ignorable, Error, Result};
use crate::listing::ListOutcome;
use crate::query::{QueryData, Row};
use crate::scope::ScopeRecord;
use crate::tables::{self, Table};
use futures::stream::{self, StreamExt};
use std::sync::Arc;

pub struct Plugin {
    tables: Vec<Arc<dyn Table>>,
}

impl Default for Plugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin {
    pub fn new() -> Self {
        Self {
            tables: tables::tables(),
        }
    }

    pub fn table_names(&self) -> Vec<&'static str> {
        self.tables.iter().map(|t| t.name()).collect()
    }

    pub fn table(&self, name: &str) -> Result<Arc<dyn Table>> {
        self.tables
            .iter()
            .find(|t| t.name() == name)
            .cloned()
            .ok_or_else(|| Error::config(format!("unknown table: {}", name)))
    }

    /// Matrix records to invoke `table` under; `None` for unscoped tables
    async fn matrix_items(&self, table: &dyn Table, d: &QueryData) -> Vec<Option<ScopeRecord>> {
        match table.matrix() {
            Some(builder) => builder
                .build(d.connection())
                .await
                .into_iter()
                .map(Some)
                .collect(),
            None => vec![None],
        }
    }

    /// List `name`, streaming every row to the query's host
    pub async fn list(&self, name: &str, d: &QueryData) -> Result<ListOutcome> {
        let table = self.table(name)?;
        let table = table.as_ref();
        let items = self.matrix_items(table, d).await;
        if items.is_empty() {
            tracing::debug!("{}: empty matrix, nothing to list", name);
            return Ok(ListOutcome::Done);
        }

        let config = d.connection().config();
        let mut results = stream::iter(items)
            .map(|item| {
                let row_query = d.for_matrix_item(item);
                async move {
                    if row_query.is_cancelled() {
                        return Ok(ListOutcome::Cancelled);
                    }
                    if row_query.rows_remaining() == 0 {
                        return Ok(ListOutcome::BudgetExhausted);
                    }
                    table.list(&row_query).await
                }
            })
            .buffer_unordered(config.list_concurrency());

        let mut outcome = ListOutcome::Done;
        while let Some(result) = results.next().await {
            match result {
                Ok(ListOutcome::Done) => {},
                Ok(other) => outcome = other,
                Err(e) if is_ignorable(&e, table.list_ignored(), &config.ignore_error_codes) => {
                    tracing::warn!("{}: ignoring {} error: {}", name, e.kind(), e);
                },
                Err(e) => {
                    tracing::error!("{}: list failed: {}", name, e);
                    return Err(e);
                },
            }
        }

        if d.is_cancelled() {
            outcome = ListOutcome::Cancelled;
        }
        Ok(outcome)
    }

    /// Fetch a single row of `name` by its key quals
    pub async fn get(&self, name: &str, d: &QueryData) -> Result<Option<Row>> {
        let table = self.table(name)?;
        let table = table.as_ref();
        if let Some(missing) = table
            .get_key_columns()
            .iter()
            .find(|column| d.equals_qual(column).is_none())
        {
            return Err(Error::config(format!("{}: get requires a `{}` qual", name, missing)));
        }

        let config = d.connection().config();
        for item in self.matrix_items(table, d).await {
            if d.is_cancelled() {
                return Ok(None);
            }

            match table.get(&d.for_matrix_item(item)).await {
                Ok(Some(row)) => return Ok(Some(row)),
                Ok(None) => {},
                Err(e) if is_ignorable(&e, table.get_ignored(), &config.ignore_error_codes) => {
                    tracing::debug!("{}: ignoring {} error: {}", name, e.kind(), e);
                },
                Err(e) => {
                    tracing::error!("{}: get failed: {}", name, e);
                    return Err(e);
                },
            }
        }

        Ok(None)
    }
}
