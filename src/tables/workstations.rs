//! gcp_cloud_workstation_config and gcp_cloud_workstation
//!
//! Both walk `workstationClusters` of a location first; workstations go one
//! level deeper through their configs.

use super::{named_identity, project_for, service_for, Table};
use crate::error::Result;
use crate::gcp::client::ServiceClient;
use crate::gcp::services::ServiceKind;
use crate::identity::ScopeContext;
use crate::listing::{
    for_each_parent, parent_names, resolve_scope, stream_pages, ListCall, ListOutcome,
    ScopeResolution,
};
use crate::naming::location_parent;
use crate::query::QueryData;
use crate::scope::{MatrixBuilder, ScopeKey, DEFAULT_LOCATION_US_CENTRAL1};
use async_trait::async_trait;

const CONFIG_TABLE: &str = "gcp_cloud_workstation_config";
const WORKSTATION_TABLE: &str = "gcp_cloud_workstation";

/// Qual narrowing the listing to one cluster by short ID
const CLUSTER_QUAL: &str = "cluster";

/// Resolved location, project and service client of one invocation
struct Scope {
    location: String,
    project: String,
    client: ServiceClient,
}

impl Scope {
    async fn resolve(d: &QueryData, tag: &str) -> Result<Option<Self>> {
        let location =
            match resolve_scope(d, ScopeKey::Location, Some(DEFAULT_LOCATION_US_CENTRAL1)) {
                ScopeResolution::Resolved(location) => location,
                _ => return Ok(None),
            };
        let project = project_for(d, tag).await?;
        let client = service_for(d, ServiceKind::Workstations, tag).await?;
        Ok(Some(Self {
            location,
            project,
            client,
        }))
    }

    fn context(&self) -> ScopeContext<'_> {
        ScopeContext {
            location: Some(&self.location),
            project: Some(&self.project),
            organization: None,
        }
    }

    /// Cluster names to walk, narrowed by the `cluster` qual when present;
    /// `None` once cancelled
    async fn clusters(&self, d: &QueryData) -> Result<Option<Vec<String>>> {
        let parent = location_parent(&self.project, &self.location);
        if let Some(cluster) = d.equals_qual(CLUSTER_QUAL) {
            return Ok(Some(vec![format!("{}/workstationClusters/{}", parent, cluster)]));
        }

        let url = self.client.url(&format!("{}/workstationClusters", parent));
        parent_names(d, &self.client, &url, "workstationClusters").await
    }
}

/// Workstation configurations of every cluster in a location
pub struct WorkstationConfigTable;

#[async_trait]
impl Table for WorkstationConfigTable {
    fn name(&self) -> &'static str {
        CONFIG_TABLE
    }

    fn matrix(&self) -> Option<MatrixBuilder> {
        Some(MatrixBuilder::CloudWorkstationLocation)
    }

    async fn list(&self, d: &QueryData) -> Result<ListOutcome> {
        let tag = format!("{}.list", CONFIG_TABLE);
        let Some(scope) = Scope::resolve(d, &tag).await? else {
            return Ok(ListOutcome::Done);
        };
        let clusters = scope.clusters(d).await.map_err(|e| {
            tracing::error!("{}: clusters_error: {}", tag, e);
            e
        })?;
        let Some(clusters) = clusters else {
            return Ok(ListOutcome::Cancelled);
        };

        let client = &scope.client;
        let context = scope.context();
        let tag = tag.as_str();
        for_each_parent(d, tag, clusters, move |cluster| async move {
            let url = client.url(&format!("{}/workstationConfigs", cluster));
            let call = ListCall::new(client, url, "workstationConfigs");
            stream_pages(d, tag, call, |item| {
                named_identity(ServiceKind::Workstations, item, "name", context)
            })
            .await
        })
        .await
    }
}

/// Workstations of every config of every cluster in a location
pub struct WorkstationTable;

#[async_trait]
impl Table for WorkstationTable {
    fn name(&self) -> &'static str {
        WORKSTATION_TABLE
    }

    fn matrix(&self) -> Option<MatrixBuilder> {
        Some(MatrixBuilder::CloudWorkstationLocation)
    }

    async fn list(&self, d: &QueryData) -> Result<ListOutcome> {
        let tag = format!("{}.list", WORKSTATION_TABLE);
        let Some(scope) = Scope::resolve(d, &tag).await? else {
            return Ok(ListOutcome::Done);
        };
        let clusters = scope.clusters(d).await.map_err(|e| {
            tracing::error!("{}: clusters_error: {}", tag, e);
            e
        })?;
        let Some(clusters) = clusters else {
            return Ok(ListOutcome::Cancelled);
        };

        let client = &scope.client;
        let context = scope.context();
        let tag = tag.as_str();
        for_each_parent(d, tag, clusters, move |cluster| async move {
            let url = client.url(&format!("{}/workstationConfigs", cluster));
            let Some(configs) = parent_names(d, client, &url, "workstationConfigs").await? else {
                return Ok(ListOutcome::Cancelled);
            };

            for_each_parent(d, tag, configs, move |config| async move {
                let url = client.url(&format!("{}/workstations", config));
                let call = ListCall::new(client, url, "workstations");
                stream_pages(d, tag, call, |item| {
                    named_identity(ServiceKind::Workstations, item, "name", context)
                })
                .await
            })
            .await
        })
        .await
    }
}
