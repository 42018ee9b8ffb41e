//! Table definitions
//!
//! Every table exposes the matrix it fans out over, a list callback and
//! optionally a get callback, plus the error kinds it treats as "no rows".

mod apigee;
mod bigtable;
mod cloudbuild;
mod cloudtrace;
mod dataflow;
mod location_scoped;
mod privateca;
mod securitycenter;
mod workstations;

pub use apigee::ApigeeApiTable;
pub use bigtable::BigtableClusterTable;
pub use cloudbuild::{CloudBuildConnectionIamPolicyTable, CloudBuildTriggerTable};
pub use cloudtrace::CloudTraceTraceTable;
pub use dataflow::DataflowJobTable;
pub use location_scoped::{GetBy, LocationScopedTable};
pub use privateca::CertificateAuthorityTable;
pub use securitycenter::SecurityCommandCenterFindingTable;
pub use workstations::{WorkstationConfigTable, WorkstationTable};

use crate::error::{ErrorKind, Result};
use crate::gcp::client::ServiceClient;
use crate::gcp::services::ServiceKind;
use crate::identity::{Identity, ScopeContext};
use crate::listing::ListOutcome;
use crate::query::{QueryData, Row};
use crate::scope::MatrixBuilder;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

#[async_trait]
pub trait Table: Send + Sync {
    fn name(&self) -> &'static str;

    /// Scope builder the host fans out over; `None` runs once unscoped
    fn matrix(&self) -> Option<MatrixBuilder> {
        None
    }

    async fn list(&self, d: &QueryData) -> Result<ListOutcome>;

    /// Fetch a single row by the table's key quals
    async fn get(&self, _d: &QueryData) -> Result<Option<Row>> {
        Ok(None)
    }

    /// Key quals a get requires
    fn get_key_columns(&self) -> &'static [&'static str] {
        &[]
    }

    /// Error kinds a list swallows into an empty result
    fn list_ignored(&self) -> &'static [ErrorKind] {
        &[]
    }

    /// Error kinds a get swallows into "not found"
    fn get_ignored(&self) -> &'static [ErrorKind] {
        &[]
    }
}

/// Identity of an item carrying its canonical name in `field`.
///
/// Items without one still get the scope's location and project.
pub(crate) fn named_identity(
    service: ServiceKind,
    item: &Value,
    field: &str,
    scope: ScopeContext<'_>,
) -> Identity {
    match item.get(field).and_then(|v| v.as_str()).filter(|n| !n.is_empty()) {
        Some(name) => Identity::from_name(service, name, scope),
        None => Identity {
            location: scope.location.map(str::to_string),
            project: scope.project.map(str::to_string),
            organization: scope.organization.map(str::to_string),
            ..Default::default()
        },
    }
}

/// Active project, logged under `tag` on failure
pub(crate) async fn project_for(d: &QueryData, tag: &str) -> Result<String> {
    d.connection()
        .active_project()
        .await
        .map(|p| p.project)
        .map_err(|e| {
            tracing::error!("{}: project_error: {}", tag, e);
            e
        })
}

/// Service client, logged under `tag` on failure
pub(crate) async fn service_for(d: &QueryData, kind: ServiceKind, tag: &str) -> Result<ServiceClient> {
    d.connection().service(kind).await.map_err(|e| {
        tracing::error!("{}: connection_error: {}", tag, e);
        e
    })
}

/// Every table the plugin serves
pub fn tables() -> Vec<Arc<dyn Table>> {
    let mut tables: Vec<Arc<dyn Table>> = vec![
        Arc::new(ApigeeApiTable),
        Arc::new(CertificateAuthorityTable),
        Arc::new(CloudBuildTriggerTable),
        Arc::new(CloudBuildConnectionIamPolicyTable),
        Arc::new(WorkstationConfigTable),
        Arc::new(WorkstationTable),
        Arc::new(DataflowJobTable),
        Arc::new(CloudTraceTraceTable),
        Arc::new(BigtableClusterTable),
        Arc::new(SecurityCommandCenterFindingTable),
    ];
    tables.extend(
        location_scoped::definitions()
            .into_iter()
            .map(|table| Arc::new(table) as Arc<dyn Table>),
    );
    tables.sort_by_key(|table| table.name());
    tables
}

/// Look up a table by name
pub fn find(name: &str) -> Option<Arc<dyn Table>> {
    tables().into_iter().find(|table| table.name() == name)
}
