//! gcp_cloud_build_trigger and gcp_cloud_build_connection_iam_policy

use super::{named_identity, project_for, service_for, Table};
use crate::error::Result;
use crate::gcp::services::ServiceKind;
use crate::identity::{aka, Identity, ScopeContext};
use crate::listing::{
    for_each_parent, parent_names, resolve_scope, stream_pages, stream_row, ListCall, ListOutcome,
    ScopeResolution,
};
use crate::naming::{location_parent, parse_location};
use crate::query::{QueryData, Row};
use crate::scope::{
    build_cloud_build_location_list, MatrixBuilder, ScopeKey, DEFAULT_LOCATION_GLOBAL,
    MATRIX_KEY_LOCATION,
};
use async_trait::async_trait;
use serde_json::json;

const TRIGGER_TABLE: &str = "gcp_cloud_build_trigger";
const IAM_POLICY_TABLE: &str = "gcp_cloud_build_connection_iam_policy";

/// Triggers live on the v1 surface; connections on v2
const TRIGGERS_VERSION: &str = "v1";
const CONNECTIONS_VERSION: &str = "v2";

/// Build triggers per Cloud Build location
pub struct CloudBuildTriggerTable;

#[async_trait]
impl Table for CloudBuildTriggerTable {
    fn name(&self) -> &'static str {
        TRIGGER_TABLE
    }

    fn matrix(&self) -> Option<MatrixBuilder> {
        Some(MatrixBuilder::CloudBuildLocation)
    }

    async fn list(&self, d: &QueryData) -> Result<ListOutcome> {
        let tag = format!("{}.list", TRIGGER_TABLE);
        let location = match resolve_scope(d, ScopeKey::Location, Some(DEFAULT_LOCATION_GLOBAL)) {
            ScopeResolution::Resolved(location) => location,
            _ => return Ok(ListOutcome::Done),
        };
        let project = project_for(d, &tag).await?;
        let client = service_for(d, ServiceKind::CloudBuild, &tag).await?;

        let parent = location_parent(&project, &location);
        tracing::debug!("{}: parent {}", tag, parent);
        let url = client.versioned_url(TRIGGERS_VERSION, &format!("{}/triggers", parent));

        let scope = ScopeContext {
            location: Some(&location),
            project: Some(&project),
            organization: None,
        };
        stream_pages(d, &tag, ListCall::new(&client, url, "triggers"), |item| {
            named_identity(ServiceKind::CloudBuild, item, "resourceName", scope)
        })
        .await
    }
}

/// Identity of a connection's IAM policy, distinct from the connection itself
fn iam_policy_identity(connection: &str, project: &str) -> Identity {
    Identity {
        akas: vec![aka(
            ServiceKind::CloudBuild,
            &format!("{}/{}/iamPolicy", CONNECTIONS_VERSION, connection),
        )],
        location: parse_location(connection).ok().map(str::to_string),
        project: Some(project.to_string()),
        organization: None,
        title: None,
    }
    .with_title(format!("{} Cloud Build Connection IAM Policy", project.to_uppercase()))
}

/// IAM policy of every Cloud Build repository connection.
///
/// Runs unscoped and walks the Cloud Build locations itself; a location or
/// connection that cannot be read is skipped.
pub struct CloudBuildConnectionIamPolicyTable;

#[async_trait]
impl Table for CloudBuildConnectionIamPolicyTable {
    fn name(&self) -> &'static str {
        IAM_POLICY_TABLE
    }

    async fn list(&self, d: &QueryData) -> Result<ListOutcome> {
        let tag = format!("{}.list", IAM_POLICY_TABLE);
        let client = service_for(d, ServiceKind::CloudBuild, &tag).await?;
        let project = project_for(d, &tag).await?;

        let locations = build_cloud_build_location_list(d.connection()).await;
        if locations.is_empty() {
            return Ok(ListOutcome::Done);
        }
        let parents = locations
            .iter()
            .filter_map(|record| record.get(MATRIX_KEY_LOCATION))
            .map(|location| location_parent(&project, location))
            .collect::<Vec<String>>();

        let client = &client;
        let tag = tag.as_str();
        let project = project.as_str();
        for_each_parent(d, tag, parents, move |parent| async move {
            let url = client.url(&format!("{}/connections", parent));
            let Some(connections) = parent_names(d, client, &url, "connections").await? else {
                return Ok(ListOutcome::Cancelled);
            };

            for_each_parent(d, tag, connections, move |connection| async move {
                let url = client.url(&format!("{}:getIamPolicy", connection));
                let policy = client.get(&url, &[]).await?;

                let identity = iam_policy_identity(&connection, project);
                let item = json!({ "name": connection, "policy": policy });
                Ok(stream_row(d, Row::new(item, identity)).await)
            })
            .await
        })
        .await
    }
}
