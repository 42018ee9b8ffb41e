//! gcp_security_command_center_finding

use super::{named_identity, project_for, service_for, Table};
use crate::error::Result;
use crate::gcp::services::ServiceKind;
use crate::identity::ScopeContext;
use crate::listing::{stream_pages, ListCall, ListOutcome};
use crate::query::QueryData;
use async_trait::async_trait;

const TABLE: &str = "gcp_security_command_center_finding";

/// Findings of every source of the active project
pub struct SecurityCommandCenterFindingTable;

#[async_trait]
impl Table for SecurityCommandCenterFindingTable {
    fn name(&self) -> &'static str {
        TABLE
    }

    async fn list(&self, d: &QueryData) -> Result<ListOutcome> {
        let tag = format!("{}.list", TABLE);
        let project = project_for(d, &tag).await?;
        let client = service_for(d, ServiceKind::SecurityCenter, &tag).await?;

        let parent = format!("projects/{}/sources/-", project);
        tracing::debug!("{}: parent {}", tag, parent);

        let url = client.url(&format!("{}/findings", parent));
        let call = ListCall::new(&client, url, "listFindingsResults").unwrap_item("finding");
        let scope = ScopeContext {
            project: Some(&project),
            ..Default::default()
        };
        stream_pages(d, &tag, call, |item| {
            named_identity(ServiceKind::SecurityCenter, item, "name", scope)
        })
        .await
    }
}
