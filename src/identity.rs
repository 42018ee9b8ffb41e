//! Identity enrichment
//!
//! Every row carries `{Akas, Location, Project[, Organization]}` next to the
//! raw API item.

use crate::gcp::services::ServiceKind;
use crate::naming::{parse_location, parse_project};
use serde::Serialize;

/// Globally unique identifier of a resource: `gcp://{service-host}/{name}`
pub fn aka(service: ServiceKind, canonical_name: &str) -> String {
    format!("gcp://{}/{}", service.host(), canonical_name)
}

/// Enrichment map streamed alongside each item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Identity {
    pub akas: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Current matrix context a row was listed under
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeContext<'a> {
    pub location: Option<&'a str>,
    pub organization: Option<&'a str>,
    pub project: Option<&'a str>,
}

impl Identity {
    /// Identity of a resource with a canonical name.
    ///
    /// Location and project come from the name when it carries them and from
    /// the scope context otherwise.
    pub fn from_name(service: ServiceKind, name: &str, scope: ScopeContext<'_>) -> Self {
        let location = parse_location(name).ok().or(scope.location);
        let project = parse_project(name).ok().or(scope.project);

        Self {
            akas: vec![aka(service, name)],
            location: location.map(str::to_string),
            project: project.map(str::to_string),
            organization: scope.organization.map(str::to_string),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_from_name() {
        let identity = Identity::from_name(
            ServiceKind::Filestore,
            "projects/proj-1/locations/us-central1-a/instances/nfs",
            ScopeContext::default(),
        );
        assert_eq!(
            identity.akas,
            vec!["gcp://file.googleapis.com/projects/proj-1/locations/us-central1-a/instances/nfs"]
        );
        assert_eq!(identity.location.as_deref(), Some("us-central1-a"));
        assert_eq!(identity.project.as_deref(), Some("proj-1"));
    }

    #[test]
    fn test_scope_fills_missing_parts() {
        let identity = Identity::from_name(
            ServiceKind::Apigee,
            "organizations/org-a/apis/petstore",
            ScopeContext {
                location: Some("eu"),
                organization: Some("org-a"),
                project: Some("proj-1"),
            },
        );
        assert_eq!(
            serde_json::to_value(&identity).unwrap(),
            json!({
                "Akas": ["gcp://apigee.googleapis.com/organizations/org-a/apis/petstore"],
                "Location": "eu",
                "Project": "proj-1",
                "Organization": "org-a"
            })
        );
    }
}
