//! Scope builders
//!
//! Each builder enumerates the scopes valid for the active project, caches
//! the resulting [`Matrix`] in the connection cache and returns it. Builders
//! never fail: a disabled API or missing permission yields an empty matrix,
//! which is not cached so a later query retries.

use super::{Matrix, ScopeRecord};
use crate::connection::Connection;
use crate::error::Result;
use crate::gcp::services::ServiceKind;
use serde_json::Value;
use std::fmt;
use std::future::Future;

pub const APIGEE_ORGANIZATION_CACHE_KEY: &str = "ApigeeOrganization";
pub const CA_SERVICE_LOCATION_CACHE_KEY: &str = "CertificateAuthorityServiceLocation";
pub const CLOUD_BUILD_LOCATION_CACHE_KEY: &str = "CloudBuildLocation";
pub const DATA_FUSION_LOCATION_CACHE_KEY: &str = "CloudDataFusionLocation";
pub const WORKSTATION_LOCATION_CACHE_KEY: &str = "CloudWorkstationLocation";
pub const DOCUMENT_AI_LOCATION_CACHE_KEY: &str = "DocumentAILocation";
pub const FILESTORE_LOCATION_CACHE_KEY: &str = "FilestoreLocation";
pub const DATASTREAM_LOCATION_CACHE_KEY: &str = "DatastreamLocation";
pub const COMPUTE_LOCATION_CACHE_KEY: &str = "ComputeLocation";

/// Document AI lists a synthetic global endpoint among its locations
const DOCUMENT_AI_GLOBAL_ENDPOINT: &str = "cloud-regional";

/// Cloud Build locations are listed across all projects
const CLOUD_BUILD_LOCATIONS_PARENT: &str = "projects/-";

/// Keys Cloud Build records keep from the location resource
const CLOUD_BUILD_LOCATION_FIELDS: &[&str] = &["name", "displayName", "labels", "metadata"];

/// Vertex AI client families, each with its own location list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAiClientType {
    Notebook,
    AiPlatform,
}

impl VertexAiClientType {
    fn service(self) -> ServiceKind {
        match self {
            VertexAiClientType::Notebook => ServiceKind::Notebooks,
            VertexAiClientType::AiPlatform => ServiceKind::AiPlatform,
        }
    }
}

impl fmt::Display for VertexAiClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VertexAiClientType::Notebook => f.write_str("Notebook"),
            VertexAiClientType::AiPlatform => f.write_str("AIPlatform"),
        }
    }
}

/// Every scope builder, so tables can name theirs declaratively
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixBuilder {
    ApigeeOrganization,
    CertificateAuthorityServiceLocation,
    CloudBuildLocation,
    CloudDataFusionLocation,
    CloudWorkstationLocation,
    DocumentAiLocation,
    FilestoreLocation,
    DatastreamLocation,
    VertexAiLocation(VertexAiClientType),
    ComputeLocation,
}

impl MatrixBuilder {
    pub fn cache_key(self) -> String {
        match self {
            MatrixBuilder::ApigeeOrganization => APIGEE_ORGANIZATION_CACHE_KEY.to_string(),
            MatrixBuilder::CertificateAuthorityServiceLocation => {
                CA_SERVICE_LOCATION_CACHE_KEY.to_string()
            },
            MatrixBuilder::CloudBuildLocation => CLOUD_BUILD_LOCATION_CACHE_KEY.to_string(),
            MatrixBuilder::CloudDataFusionLocation => DATA_FUSION_LOCATION_CACHE_KEY.to_string(),
            MatrixBuilder::CloudWorkstationLocation => WORKSTATION_LOCATION_CACHE_KEY.to_string(),
            MatrixBuilder::DocumentAiLocation => DOCUMENT_AI_LOCATION_CACHE_KEY.to_string(),
            MatrixBuilder::FilestoreLocation => FILESTORE_LOCATION_CACHE_KEY.to_string(),
            MatrixBuilder::DatastreamLocation => DATASTREAM_LOCATION_CACHE_KEY.to_string(),
            MatrixBuilder::VertexAiLocation(client_type) => {
                format!("VertexAILocation{}", client_type)
            },
            MatrixBuilder::ComputeLocation => COMPUTE_LOCATION_CACHE_KEY.to_string(),
        }
    }

    pub async fn build(self, conn: &Connection) -> Matrix {
        match self {
            MatrixBuilder::ApigeeOrganization => build_apigee_organization_list(conn).await,
            MatrixBuilder::CertificateAuthorityServiceLocation => {
                build_certificate_authority_service_location_list(conn).await
            },
            MatrixBuilder::CloudBuildLocation => build_cloud_build_location_list(conn).await,
            MatrixBuilder::CloudDataFusionLocation => {
                build_cloud_data_fusion_location_list(conn).await
            },
            MatrixBuilder::CloudWorkstationLocation => {
                build_cloud_workstation_location_list(conn).await
            },
            MatrixBuilder::DocumentAiLocation => build_document_ai_location_list(conn).await,
            MatrixBuilder::FilestoreLocation => build_filestore_location_list(conn).await,
            MatrixBuilder::DatastreamLocation => build_datastream_location_list(conn).await,
            MatrixBuilder::VertexAiLocation(client_type) => {
                build_vertex_ai_location_list(conn, client_type).await
            },
            MatrixBuilder::ComputeLocation => build_compute_location_list(conn).await,
        }
    }
}

/// Apigee organizations visible to the credentials
pub async fn build_apigee_organization_list(conn: &Connection) -> Matrix {
    cached_matrix(conn, "BuildApigeeOrganizationList", APIGEE_ORGANIZATION_CACHE_KEY, || async {
        let client = conn.service(ServiceKind::Apigee).await?;
        let organizations = client
            .list_all(&client.url("organizations"), "organizations")
            .await?;

        Ok(organizations
            .iter()
            .filter_map(|org| {
                let organization = str_field(org, "organization")?;
                Some(ScopeRecord::organization(
                    organization,
                    str_field(org, "location").map(str::to_string),
                    str_field(org, "projectId").map(str::to_string),
                ))
            })
            .collect())
    })
    .await
}

pub async fn build_certificate_authority_service_location_list(conn: &Connection) -> Matrix {
    cached_matrix(
        conn,
        "BuildCertificateAuthorityServiceLocationList",
        CA_SERVICE_LOCATION_CACHE_KEY,
        || project_locations(conn, ServiceKind::PrivateCa, |_| true),
    )
    .await
}

/// Cloud Build locations, listed under the wildcard project and keeping the
/// location's `name`, `displayName`, `labels` and `metadata`
pub async fn build_cloud_build_location_list(conn: &Connection) -> Matrix {
    cached_matrix(conn, "BuildCloudBuildLocationList", CLOUD_BUILD_LOCATION_CACHE_KEY, || async {
        let client = conn.service(ServiceKind::CloudBuild).await?;
        let url = client.url(&format!("{}/locations", CLOUD_BUILD_LOCATIONS_PARENT));
        let locations = client.list_all(&url, "locations").await?;

        Ok(locations
            .iter()
            .filter_map(|location| {
                let mut record = ScopeRecord::location(location_id(location)?);
                for field in CLOUD_BUILD_LOCATION_FIELDS {
                    let value = location.get(*field).cloned().unwrap_or(Value::Null);
                    record.extra.insert(field.to_string(), value);
                }
                Some(record)
            })
            .collect())
    })
    .await
}

pub async fn build_cloud_data_fusion_location_list(conn: &Connection) -> Matrix {
    cached_matrix(
        conn,
        "BuildCloudDataFusionLocationList",
        DATA_FUSION_LOCATION_CACHE_KEY,
        || project_locations(conn, ServiceKind::DataFusion, |_| true),
    )
    .await
}

pub async fn build_cloud_workstation_location_list(conn: &Connection) -> Matrix {
    cached_matrix(
        conn,
        "BuildCloudWorkstationLocationList",
        WORKSTATION_LOCATION_CACHE_KEY,
        || project_locations(conn, ServiceKind::Workstations, |_| true),
    )
    .await
}

/// Document AI locations without the `cloud-regional` pseudo location
pub async fn build_document_ai_location_list(conn: &Connection) -> Matrix {
    cached_matrix(
        conn,
        "BuildDocumentAILocationList",
        DOCUMENT_AI_LOCATION_CACHE_KEY,
        || project_locations(conn, ServiceKind::DocumentAi, |id| id != DOCUMENT_AI_GLOBAL_ENDPOINT),
    )
    .await
}

pub async fn build_filestore_location_list(conn: &Connection) -> Matrix {
    cached_matrix(
        conn,
        "BuildFilestoreLocationList",
        FILESTORE_LOCATION_CACHE_KEY,
        || project_locations(conn, ServiceKind::Filestore, |_| true),
    )
    .await
}

pub async fn build_datastream_location_list(conn: &Connection) -> Matrix {
    cached_matrix(
        conn,
        "BuildDatastreamLocationList",
        DATASTREAM_LOCATION_CACHE_KEY,
        || project_locations(conn, ServiceKind::Datastream, |_| true),
    )
    .await
}

/// Locations served by one Vertex AI client family
pub async fn build_vertex_ai_location_list(
    conn: &Connection,
    client_type: VertexAiClientType,
) -> Matrix {
    let cache_key = MatrixBuilder::VertexAiLocation(client_type).cache_key();
    cached_matrix(conn, "BuildVertexAILocationListByClientType", &cache_key, || {
        project_locations(conn, client_type.service(), |_| true)
    })
    .await
}

/// Compute Engine regions; Dataflow region names follow them
pub async fn build_compute_location_list(conn: &Connection) -> Matrix {
    cached_matrix(conn, "BuildComputeLocationList", COMPUTE_LOCATION_CACHE_KEY, || async {
        let client = conn.service(ServiceKind::Compute).await?;
        let project = conn.active_project().await?.project;
        let url = client.url(&format!("projects/{}/regions", project));
        let regions = client.list_all(&url, "items").await?;

        Ok(regions
            .iter()
            .filter_map(|region| str_field(region, "name"))
            .map(ScopeRecord::location)
            .collect())
    })
    .await
}

/// Read-build-write-if-absent around a fallible enumeration.
///
/// Errors are logged and turned into an empty, uncached matrix.
async fn cached_matrix<F, Fut>(conn: &Connection, builder: &str, cache_key: &str, build: F) -> Matrix
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Matrix>>,
{
    if let Some(matrix) = conn.cache().get::<Matrix>(cache_key) {
        tracing::trace!("{}: returning {} cached scopes", builder, matrix.len());
        return matrix;
    }

    match build().await {
        Ok(matrix) => {
            tracing::debug!("{}: discovered {} scopes", builder, matrix.len());
            conn.cache().set_if_absent(cache_key, matrix)
        },
        Err(e) => {
            tracing::error!("{}: error building scope list: {}", builder, e);
            Matrix::new()
        },
    }
}

/// `projects/{p}/locations` of a service, as `{location: locationId}` records
async fn project_locations<P>(conn: &Connection, kind: ServiceKind, keep: P) -> Result<Matrix>
where
    P: Fn(&str) -> bool,
{
    let client = conn.service(kind).await?;
    let project = conn.active_project().await?.project;
    let url = client.url(&format!("projects/{}/locations", project));
    let locations = client.list_all(&url, "locations").await?;

    Ok(locations
        .iter()
        .filter_map(location_id)
        .filter(|id| keep(id))
        .map(ScopeRecord::location)
        .collect())
}

/// Short location ID, falling back to the last segment of `name`
fn location_id(location: &Value) -> Option<&str> {
    str_field(location, "locationId")
        .or_else(|| str_field(location, "name").and_then(|name| name.rsplit('/').next()))
        .filter(|id| !id.is_empty())
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(|v| v.as_str())
}
