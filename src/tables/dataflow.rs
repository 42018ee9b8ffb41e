//! gcp_dataflow_job

use super::{project_for, service_for, Table};
use crate::error::Result;
use crate::gcp::services::ServiceKind;
use crate::identity::{aka, Identity};
use crate::listing::{
    page_size_for, resolve_scope, stream_pages, ListCall, ListOutcome, ScopeResolution,
};
use crate::naming::location_parent;
use crate::query::QueryData;
use crate::scope::{MatrixBuilder, ScopeKey, DEFAULT_LOCATION_US_CENTRAL1};
use async_trait::async_trait;
use serde_json::Value;

const TABLE: &str = "gcp_dataflow_job";

/// Largest page the jobs API accepts
const MAX_PAGE_SIZE: u32 = 300;

/// Dataflow jobs per Compute region
pub struct DataflowJobTable;

/// Jobs carry no canonical name; build one from their project, region and ID
fn job_identity(item: &Value, project: &str, location: &str) -> Identity {
    let field = |key: &str| item.get(key).and_then(|v| v.as_str()).filter(|s| !s.is_empty());
    let project = field("projectId").unwrap_or(project);
    let location = field("location").unwrap_or(location);
    let id = field("id").unwrap_or_default();

    Identity {
        akas: vec![aka(
            ServiceKind::Dataflow,
            &format!("{}/jobs/{}", location_parent(project, location), id),
        )],
        location: Some(location.to_string()),
        project: Some(project.to_string()),
        organization: None,
        title: field("name").map(str::to_string),
    }
}

#[async_trait]
impl Table for DataflowJobTable {
    fn name(&self) -> &'static str {
        TABLE
    }

    fn matrix(&self) -> Option<MatrixBuilder> {
        Some(MatrixBuilder::ComputeLocation)
    }

    async fn list(&self, d: &QueryData) -> Result<ListOutcome> {
        let tag = format!("{}.list", TABLE);
        let location =
            match resolve_scope(d, ScopeKey::Location, Some(DEFAULT_LOCATION_US_CENTRAL1)) {
                ScopeResolution::Resolved(location) => location,
                _ => return Ok(ListOutcome::Done),
            };
        let project = project_for(d, &tag).await?;
        let client = service_for(d, ServiceKind::Dataflow, &tag).await?;

        let url = client.url(&format!("{}/jobs", location_parent(&project, &location)));
        let call = ListCall::new(&client, url, "jobs")
            .page_size(page_size_for(d.limit(), MAX_PAGE_SIZE));
        stream_pages(d, &tag, call, |item| job_identity(item, &project, &location)).await
    }
}
