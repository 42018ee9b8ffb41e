//! GCP Projects
//!
//! Cloud Resource Manager project listing, the last resort of the active
//! project resolver.

use super::client::ServiceClient;
use crate::error::Result;
use serde_json::Value;

/// Project information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub project_id: String,
    pub name: String,
    pub project_number: String,
    pub lifecycle_state: String,
}

impl From<&Value> for Project {
    fn from(value: &Value) -> Self {
        let field = |key: &str, default: &str| {
            value
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or(default)
                .to_string()
        };
        Self {
            project_id: field("projectId", "-"),
            name: field("name", "-"),
            project_number: field("projectNumber", "-"),
            lifecycle_state: field("lifecycleState", "UNKNOWN"),
        }
    }
}

impl Project {
    pub fn is_active(&self) -> bool {
        self.lifecycle_state == "ACTIVE"
    }
}

/// List all accessible projects that are `ACTIVE`
pub async fn list_active_projects(client: &ServiceClient) -> Result<Vec<Project>> {
    let url = client.url("projects");
    let projects = client.list_all(&url, "projects").await?;

    Ok(projects
        .iter()
        .map(Project::from)
        .filter(Project::is_active)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_project_from_value() {
        let project = Project::from(&json!({
            "projectId": "proj-1",
            "name": "Project One",
            "projectNumber": "123",
            "lifecycleState": "ACTIVE"
        }));
        assert_eq!(project.project_id, "proj-1");
        assert!(project.is_active());

        let deleted = Project::from(&json!({"projectId": "gone", "lifecycleState": "DELETE_REQUESTED"}));
        assert!(!deleted.is_active());
        assert_eq!(Project::from(&json!({})).lifecycle_state, "UNKNOWN");
    }
}
