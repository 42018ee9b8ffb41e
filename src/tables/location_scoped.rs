//! Location-scoped tables
//!
//! Tables that list one collection directly under
//! `projects/{p}/locations/{l}` share a single definition-driven
//! implementation; each entry only names its service, matrix and collection.

use super::{named_identity, project_for, service_for, Table};
use crate::error::{ErrorKind, Result};
use crate::gcp::client::ServiceClient;
use crate::gcp::services::ServiceKind;
use crate::identity::{Identity, ScopeContext};
use crate::listing::{page_size_for, resolve_scope, stream_pages, ListCall, ListOutcome, ScopeResolution};
use crate::naming::{location_parent, parse_location};
use crate::query::{QueryData, Row};
use crate::scope::{
    MatrixBuilder, ScopeKey, VertexAiClientType, DEFAULT_LOCATION_US, DEFAULT_LOCATION_US_CENTRAL1,
    MATRIX_KEY_LOCATION,
};
use async_trait::async_trait;
use serde_json::Value;

/// Qual the get callbacks key on
const NAME_QUAL: &str = "name";

/// How a get callback turns the `name` qual into a resource URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GetBy {
    /// Short ID, appended to `{parent}/{collection}`
    ShortName,
    /// Full canonical name
    FullName,
}

/// A table listing `projects/{p}/locations/{l}/{collection}`
#[derive(Debug, Clone)]
pub struct LocationScopedTable {
    pub name: &'static str,
    pub service: ServiceKind,
    pub matrix: MatrixBuilder,
    /// Location used when neither qual nor matrix names one
    pub default_location: Option<&'static str>,
    /// Refuse to list outside a matrix record
    pub matrix_required: bool,
    /// Path segment and response key of the collection
    pub collection: &'static str,
    pub max_page_size: Option<u32>,
    pub get_by: Option<GetBy>,
    pub list_ignored: &'static [ErrorKind],
    pub get_ignored: &'static [ErrorKind],
}

impl LocationScopedTable {
    const fn new(
        name: &'static str,
        service: ServiceKind,
        matrix: MatrixBuilder,
        collection: &'static str,
    ) -> Self {
        Self {
            name,
            service,
            matrix,
            default_location: Some(DEFAULT_LOCATION_US_CENTRAL1),
            matrix_required: false,
            collection,
            max_page_size: None,
            get_by: None,
            list_ignored: &[],
            get_ignored: &[],
        }
    }

    /// Location this invocation lists under, or `None` to list nothing
    fn location(&self, d: &QueryData, tag: &str) -> Option<String> {
        if self.matrix_required && d.matrix_value(MATRIX_KEY_LOCATION).is_none() {
            tracing::error!("{}: invalid_location: matrix location is empty", tag);
            return None;
        }

        match resolve_scope(d, ScopeKey::Location, self.default_location) {
            ScopeResolution::Resolved(location) => Some(location),
            ScopeResolution::Mismatch { requested, matrix } => {
                tracing::debug!(
                    "{}: location_mismatch: requested {}, matrix {}",
                    tag,
                    requested,
                    matrix
                );
                None
            },
            ScopeResolution::Missing => {
                tracing::warn!("{}: no location to list", tag);
                None
            },
        }
    }

    fn identity(&self, item: &Value, location: &str, project: &str) -> Identity {
        let scope = ScopeContext {
            location: Some(location),
            project: Some(project),
            organization: None,
        };
        named_identity(self.service, item, "name", scope)
    }

    async fn client_and_project(&self, d: &QueryData, tag: &str) -> Result<(ServiceClient, String)> {
        let project = project_for(d, tag).await?;
        let client = service_for(d, self.service, tag).await?;
        Ok((client, project))
    }
}

#[async_trait]
impl Table for LocationScopedTable {
    fn name(&self) -> &'static str {
        self.name
    }

    fn matrix(&self) -> Option<MatrixBuilder> {
        Some(self.matrix)
    }

    async fn list(&self, d: &QueryData) -> Result<ListOutcome> {
        let tag = format!("{}.list", self.name);
        let Some(location) = self.location(d, &tag) else {
            return Ok(ListOutcome::Done);
        };
        let (client, project) = self.client_and_project(d, &tag).await?;

        let parent = location_parent(&project, &location);
        let url = client.url(&format!("{}/{}", parent, self.collection));
        let mut call = ListCall::new(&client, url, self.collection);
        if let Some(max) = self.max_page_size {
            call = call.page_size(page_size_for(d.limit(), max));
        }

        stream_pages(d, &tag, call, |item| self.identity(item, &location, &project)).await
    }

    async fn get(&self, d: &QueryData) -> Result<Option<Row>> {
        let tag = format!("{}.get", self.name);
        let Some(get_by) = self.get_by else {
            return Ok(None);
        };
        let Some(name) = d.equals_qual(NAME_QUAL) else {
            tracing::error!("{}: invalid_name: name is empty", tag);
            return Ok(None);
        };
        let Some(location) = self.location(d, &tag) else {
            return Ok(None);
        };
        let (client, project) = self.client_and_project(d, &tag).await?;

        let url = match get_by {
            GetBy::ShortName => client.url(&format!(
                "{}/{}/{}",
                location_parent(&project, &location),
                self.collection,
                name
            )),
            GetBy::FullName => {
                // another matrix record owns this name
                if parse_location(name)? != location {
                    return Ok(None);
                }
                client.url(name)
            },
        };

        let item = client.get(&url, &[]).await.map_err(|e| {
            tracing::error!("{}: api_error: {}", tag, e);
            e
        })?;
        if item.is_null() {
            return Ok(None);
        }
        let identity = self.identity(&item, &location, &project);
        Ok(Some(Row::new(item, identity)))
    }

    fn get_key_columns(&self) -> &'static [&'static str] {
        match self.get_by {
            Some(_) => &[NAME_QUAL],
            None => &[],
        }
    }

    fn list_ignored(&self) -> &'static [ErrorKind] {
        self.list_ignored
    }

    fn get_ignored(&self) -> &'static [ErrorKind] {
        self.get_ignored
    }
}

/// Every location-scoped table
pub(super) fn definitions() -> Vec<LocationScopedTable> {
    vec![
        LocationScopedTable::new(
            "gcp_cloud_data_fusion_instance",
            ServiceKind::DataFusion,
            MatrixBuilder::CloudDataFusionLocation,
            "instances",
        ),
        LocationScopedTable::new(
            "gcp_cloud_workstation_cluster",
            ServiceKind::Workstations,
            MatrixBuilder::CloudWorkstationLocation,
            "workstationClusters",
        ),
        LocationScopedTable {
            default_location: Some(DEFAULT_LOCATION_US),
            ..LocationScopedTable::new(
                "gcp_documentai_processor",
                ServiceKind::DocumentAi,
                MatrixBuilder::DocumentAiLocation,
                "processors",
            )
        },
        LocationScopedTable::new(
            "gcp_datastream_stream",
            ServiceKind::Datastream,
            MatrixBuilder::DatastreamLocation,
            "streams",
        ),
        LocationScopedTable::new(
            "gcp_datastream_connection_profile",
            ServiceKind::Datastream,
            MatrixBuilder::DatastreamLocation,
            "connectionProfiles",
        ),
        LocationScopedTable::new(
            "gcp_datastream_private_connection",
            ServiceKind::Datastream,
            MatrixBuilder::DatastreamLocation,
            "privateConnections",
        ),
        LocationScopedTable {
            default_location: None,
            matrix_required: true,
            get_by: Some(GetBy::ShortName),
            list_ignored: &[ErrorKind::AccessDenied],
            get_ignored: &[ErrorKind::NotFound, ErrorKind::AccessDenied],
            ..LocationScopedTable::new(
                "gcp_filestore_instance",
                ServiceKind::Filestore,
                MatrixBuilder::FilestoreLocation,
                "instances",
            )
        },
        LocationScopedTable {
            max_page_size: Some(100),
            get_by: Some(GetBy::FullName),
            list_ignored: &[ErrorKind::NotFound, ErrorKind::AccessDenied],
            get_ignored: &[ErrorKind::NotFound, ErrorKind::AccessDenied],
            ..LocationScopedTable::new(
                "gcp_vertex_ai_notebook_instance",
                ServiceKind::Notebooks,
                MatrixBuilder::VertexAiLocation(VertexAiClientType::Notebook),
                "instances",
            )
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(name: &str) -> LocationScopedTable {
        definitions()
            .into_iter()
            .find(|t| t.name == name)
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        assert_eq!(definition("gcp_documentai_processor").default_location, Some("us"));
        assert_eq!(
            definition("gcp_datastream_stream").default_location,
            Some("us-central1")
        );
        let filestore = definition("gcp_filestore_instance");
        assert_eq!(filestore.default_location, None);
        assert!(filestore.matrix_required);
    }

    #[test]
    fn test_notebook_page_cap() {
        let notebooks = definition("gcp_vertex_ai_notebook_instance");
        assert_eq!(notebooks.max_page_size, Some(100));
        assert_eq!(notebooks.get_key_columns(), &["name"]);
    }
}
