//! gcp_bigtable_cluster

use super::{named_identity, project_for, service_for, Table};
use crate::error::Result;
use crate::gcp::services::ServiceKind;
use crate::identity::ScopeContext;
use crate::listing::{for_each_parent, parent_names, stream_pages, ListCall, ListOutcome};
use crate::query::{QueryData, Row};
use async_trait::async_trait;

const TABLE: &str = "gcp_bigtable_cluster";

/// Segments of `projects/{p}/instances/{i}/clusters/{c}`
const CLUSTER_NAME_SEGMENTS: usize = 6;

/// Clusters of every Bigtable instance in the active project
pub struct BigtableClusterTable;

#[async_trait]
impl Table for BigtableClusterTable {
    fn name(&self) -> &'static str {
        TABLE
    }

    async fn list(&self, d: &QueryData) -> Result<ListOutcome> {
        let tag = format!("{}.list", TABLE);
        let client = service_for(d, ServiceKind::BigtableAdmin, &tag).await?;
        let project = project_for(d, &tag).await?;

        let url = client.url(&format!("projects/{}/instances", project));
        let instances = parent_names(d, &client, &url, "instances").await.map_err(|e| {
            tracing::error!("{}: instances_error: {}", tag, e);
            e
        })?;
        let Some(instances) = instances else {
            return Ok(ListOutcome::Cancelled);
        };

        let client = &client;
        let tag = tag.as_str();
        let scope = ScopeContext {
            project: Some(&project),
            ..Default::default()
        };
        for_each_parent(d, tag, instances, move |instance| async move {
            let url = client.url(&format!("{}/clusters", instance));
            stream_pages(d, tag, ListCall::new(client, url, "clusters"), |item| {
                named_identity(ServiceKind::BigtableAdmin, item, "name", scope)
            })
            .await
        })
        .await
    }

    async fn get(&self, d: &QueryData) -> Result<Option<Row>> {
        let tag = format!("{}.get", TABLE);
        let Some(name) = d.equals_qual("name") else {
            return Ok(None);
        };
        if name.split('/').count() != CLUSTER_NAME_SEGMENTS {
            tracing::debug!("{}: not a cluster name: {}", tag, name);
            return Ok(None);
        }

        let client = service_for(d, ServiceKind::BigtableAdmin, &tag).await?;
        let item = client.get(&client.url(name), &[]).await?;
        if item.is_null() {
            return Ok(None);
        }
        let identity = named_identity(ServiceKind::BigtableAdmin, &item, "name", ScopeContext::default());
        Ok(Some(Row::new(item, identity)))
    }

    fn get_key_columns(&self) -> &'static [&'static str] {
        &["name"]
    }
}
