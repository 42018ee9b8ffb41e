//! Active Project Resolver

use super::Connection;
use crate::error::{Error, Result};
use crate::gcp::projects::list_active_projects;
use crate::gcp::services::ServiceKind;
use serde::Serialize;

/// Cache key of the resolved project
pub const ACTIVE_PROJECT_CACHE_KEY: &str = "ActiveProject";

/// The single project a connection is authorized against
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActiveProject {
    pub project: String,
}

/// Resolve the active project: config, then the credentials' default, then
/// the first `ACTIVE` project from Cloud Resource Manager.
///
/// Failures are not cached.
pub async fn active_project(conn: &Connection) -> Result<ActiveProject> {
    if let Some(project) = conn.cache().get::<ActiveProject>(ACTIVE_PROJECT_CACHE_KEY) {
        return Ok(project);
    }

    let project = resolve(conn).await?;
    tracing::debug!("Active project for connection {}: {}", conn.id(), project);

    Ok(conn
        .cache()
        .set_if_absent(ACTIVE_PROJECT_CACHE_KEY, ActiveProject { project }))
}

async fn resolve(conn: &Connection) -> Result<String> {
    if let Some(project) = conn.config().effective_project() {
        return Ok(project);
    }

    let credentials = conn.credentials().await?;
    if let Some(project) = credentials.default_project().await {
        return Ok(project);
    }

    let client = conn.service(ServiceKind::ResourceManager).await?;
    let projects = list_active_projects(&client).await.map_err(|e| {
        tracing::error!("Failed to list projects: {}", e);
        e
    })?;

    projects
        .into_iter()
        .next()
        .map(|p| p.project_id)
        .ok_or(Error::NoActiveProject)
}
