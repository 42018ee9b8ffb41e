//! Listing adapter
//!
//! The steps every list callback goes through: reconcile the requested scope
//! with the matrix record, build the parent, then page through the API while
//! streaming rows and watching the row budget and the cancellation token.

use crate::error::Result;
use crate::gcp::client::ServiceClient;
use crate::identity::Identity;
use crate::query::{QueryData, Row};
use crate::scope::ScopeKey;
use serde_json::Value;
use std::future::Future;

/// Result of scope reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeResolution {
    /// List under this scope
    Resolved(String),
    /// The qual targets another matrix record; list nothing here
    Mismatch { requested: String, matrix: String },
    /// Neither qual, matrix nor default names a scope
    Missing,
}

/// Reconcile the scope qual with the matrix axis.
///
/// The matrix value wins when both agree; a differing qual short-circuits so
/// the host can serve it from the matching matrix record. With neither set the
/// service default applies.
pub fn resolve_scope(d: &QueryData, key: ScopeKey, default: Option<&str>) -> ScopeResolution {
    let column = key.column();
    let requested = d.equals_qual(column);
    let matrix = d.matrix_value(column);

    match (requested, matrix) {
        (Some(requested), Some(matrix)) if requested != matrix => ScopeResolution::Mismatch {
            requested: requested.to_string(),
            matrix: matrix.to_string(),
        },
        _ => match matrix.or(requested).or(default) {
            Some(scope) => ScopeResolution::Resolved(scope.to_string()),
            None => ScopeResolution::Missing,
        },
    }
}

/// How a listing ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOutcome {
    /// Every page consumed
    Done,
    /// The cancellation token fired
    Cancelled,
    /// The host wants no more rows
    BudgetExhausted,
}

impl ListOutcome {
    /// Whether an enclosing loop should keep going
    pub fn should_continue(self) -> bool {
        self == ListOutcome::Done
    }
}

/// Page size for an API capped at `max`, shrunk to the query limit
pub fn page_size_for(limit: Option<u64>, max: u32) -> u32 {
    match limit {
        Some(limit) if limit > 0 && limit < u64::from(max) => limit as u32,
        _ => max,
    }
}

/// One paginated list request
pub struct ListCall<'a> {
    client: &'a ServiceClient,
    url: String,
    items_key: &'a str,
    item_field: Option<&'a str>,
    page_size: Option<u32>,
    query: Vec<(&'a str, String)>,
}

impl<'a> ListCall<'a> {
    pub fn new(client: &'a ServiceClient, url: String, items_key: &'a str) -> Self {
        Self {
            client,
            url,
            items_key,
            item_field: None,
            page_size: None,
            query: Vec::new(),
        }
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn query(mut self, key: &'a str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    /// Stream `item[field]` instead of the page entry itself
    pub fn unwrap_item(mut self, field: &'a str) -> Self {
        self.item_field = Some(field);
        self
    }
}

/// Page through `call`, streaming each item with the identity `enrich`
/// derives for it.
///
/// Stops after the item that drains the host budget and at the first page
/// boundary or streamed item after cancellation.
pub async fn stream_pages<E>(
    d: &QueryData,
    tag: &str,
    call: ListCall<'_>,
    enrich: E,
) -> Result<ListOutcome>
where
    E: Fn(&Value) -> Identity,
{
    let mut page_token: Option<String> = None;

    loop {
        let fetch = call.client.list_page(
            &call.url,
            call.items_key,
            page_token.as_deref(),
            call.page_size,
            &call.query,
        );
        let page = tokio::select! {
            biased;
            _ = d.cancellation().cancelled() => {
                tracing::debug!("{}: cancelled before fetching {}", tag, call.url);
                return Ok(ListOutcome::Cancelled);
            }
            page = fetch => page.map_err(|e| {
                tracing::error!("{}: api_error: {}", tag, e);
                e
            })?,
        };

        for entry in page.items {
            let item = match call.item_field {
                Some(field) => match entry.get(field) {
                    Some(inner) => inner.clone(),
                    None => continue,
                },
                None => entry,
            };
            let identity = enrich(&item);
            let outcome = stream_row(d, Row::new(item, identity)).await;
            if !outcome.should_continue() {
                return Ok(outcome);
            }
        }

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => return Ok(ListOutcome::Done),
        }
    }
}

/// Stream one row and report whether the listing may go on
pub async fn stream_row(d: &QueryData, row: Row) -> ListOutcome {
    d.stream_item(row).await;

    if d.is_cancelled() {
        ListOutcome::Cancelled
    } else if d.rows_remaining() == 0 {
        ListOutcome::BudgetExhausted
    } else {
        ListOutcome::Done
    }
}

/// Run `visit` for every parent of a nested listing.
///
/// A parent whose inner call fails is logged and skipped; budget exhaustion
/// or cancellation inside one parent ends the whole listing.
pub async fn for_each_parent<I, F, Fut>(
    d: &QueryData,
    tag: &str,
    parents: I,
    mut visit: F,
) -> Result<ListOutcome>
where
    I: IntoIterator<Item = String>,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<ListOutcome>>,
{
    for parent in parents {
        if d.is_cancelled() {
            return Ok(ListOutcome::Cancelled);
        }

        match visit(parent.clone()).await {
            Ok(ListOutcome::Done) => {},
            Ok(outcome) => return Ok(outcome),
            Err(e) => {
                tracing::warn!("{}: skipping parent {}: {}", tag, parent, e);
            },
        }
    }

    Ok(ListOutcome::Done)
}

/// `name` fields of a bounded parent collection.
///
/// Pages are fetched until the collection ends; `None` when the query was
/// cancelled at a page boundary.
pub async fn parent_names(
    d: &QueryData,
    client: &ServiceClient,
    url: &str,
    items_key: &str,
) -> Result<Option<Vec<String>>> {
    let mut names = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let fetch = client.list_page(url, items_key, page_token.as_deref(), None, &[]);
        let page = tokio::select! {
            biased;
            _ = d.cancellation().cancelled() => {
                tracing::debug!("cancelled before fetching parents {}", url);
                return Ok(None);
            }
            page = fetch => page?,
        };

        names.extend(
            page.items
                .iter()
                .filter_map(|item| item.get("name").and_then(|v| v.as_str()))
                .map(str::to_string),
        );

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => return Ok(Some(names)),
        }
    }
}
