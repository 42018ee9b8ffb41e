//! gcp_apigee_api

use super::{service_for, Table};
use crate::error::Result;
use crate::gcp::services::ServiceKind;
use crate::identity::{aka, Identity};
use crate::listing::{resolve_scope, stream_pages, ListCall, ListOutcome, ScopeResolution};
use crate::naming::organization_parent;
use crate::query::QueryData;
use crate::scope::{MatrixBuilder, ScopeKey, MATRIX_KEY_LOCATION, MATRIX_KEY_PROJECT};
use async_trait::async_trait;
use serde_json::Value;

const TABLE: &str = "gcp_apigee_api";

/// API proxies of every Apigee organization
pub struct ApigeeApiTable;

#[async_trait]
impl Table for ApigeeApiTable {
    fn name(&self) -> &'static str {
        TABLE
    }

    fn matrix(&self) -> Option<MatrixBuilder> {
        Some(MatrixBuilder::ApigeeOrganization)
    }

    async fn list(&self, d: &QueryData) -> Result<ListOutcome> {
        let tag = format!("{}.list", TABLE);
        let organization = match resolve_scope(d, ScopeKey::Organization, None) {
            ScopeResolution::Resolved(organization) => organization,
            ScopeResolution::Mismatch { .. } => return Ok(ListOutcome::Done),
            ScopeResolution::Missing => {
                tracing::warn!("{}: no organization to list", tag);
                return Ok(ListOutcome::Done);
            },
        };

        let client = service_for(d, ServiceKind::Apigee, &tag).await?;
        let parent = organization_parent(&organization);
        tracing::debug!("{}: parent {}", tag, parent);

        let url = client.url(&format!("{}/apis", parent));
        let location = d.matrix_value(MATRIX_KEY_LOCATION).map(str::to_string);
        let project = d.matrix_value(MATRIX_KEY_PROJECT).map(str::to_string);

        let enrich = |item: &Value| {
            let name = item.get("name").and_then(|v| v.as_str()).unwrap_or_default();
            Identity {
                akas: vec![aka(ServiceKind::Apigee, &format!("{}/apis/{}", parent, name))],
                location: location.clone(),
                project: project.clone(),
                organization: Some(organization.clone()),
                title: None,
            }
            .with_title(name)
        };
        stream_pages(d, &tag, ListCall::new(&client, url, "proxies"), enrich).await
    }
}
