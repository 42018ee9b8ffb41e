//! gcp_certificate_authority_service_ca

use super::{named_identity, project_for, service_for, Table};
use crate::error::Result;
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

const TABLE: &str = "gcp_certificate_authority_service_ca";

/// Certificate authorities of every CA pool in a location
pub struct CertificateAuthorityTable;

#[async_trait]
impl Table for CertificateAuthorityTable {
    fn name(&self) -> &'static str {
        TABLE
    }

    fn matrix(&self) -> Option<MatrixBuilder> {
        Some(MatrixBuilder::CertificateAuthorityServiceLocation)
    }

    async fn list(&self, d: &QueryData) -> Result<ListOutcome> {
        let tag = format!("{}.list", TABLE);
        let location =
            match resolve_scope(d, ScopeKey::Location, Some(DEFAULT_LOCATION_US_CENTRAL1)) {
                ScopeResolution::Resolved(location) => location,
                _ => return Ok(ListOutcome::Done),
            };
        let project = project_for(d, &tag).await?;
        let client = service_for(d, ServiceKind::PrivateCa, &tag).await?;

        let pools_url = client.url(&format!("{}/caPools", location_parent(&project, &location)));
        let pools = parent_names(d, &client, &pools_url, "caPools")
            .await
            .map_err(|e| {
                tracing::error!("{}: ca_pools_error: {}", tag, e);
                e
            })?;
        let Some(pools) = pools else {
            return Ok(ListOutcome::Cancelled);
        };

        let client = &client;
        let tag = tag.as_str();
        let scope = ScopeContext {
            location: Some(&location),
            project: Some(&project),
            organization: None,
        };
        for_each_parent(d, tag, pools, move |pool| async move {
            let url = client.url(&format!("{}/certificateAuthorities", pool));
            let call = ListCall::new(client, url, "certificateAuthorities");
            stream_pages(d, tag, call, |item| {
                named_identity(ServiceKind::PrivateCa, item, "name", scope)
            })
            .await
        })
        .await
    }
}
