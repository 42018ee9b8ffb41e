//! gcp_cloudtrace_trace

use super::{project_for, service_for, Table};
use crate::error::Result;
use crate::gcp::services::ServiceKind;
use crate::identity::{aka, Identity};
use crate::listing::{stream_pages, ListCall, ListOutcome};
use crate::query::QueryData;
use async_trait::async_trait;
use serde_json::Value;

const TABLE: &str = "gcp_cloudtrace_trace";

/// Traces of the active project
pub struct CloudTraceTraceTable;

fn trace_identity(item: &Value, project: &str) -> Identity {
    let project = item
        .get("projectId")
        .and_then(|v| v.as_str())
        .filter(|p| !p.is_empty())
        .unwrap_or(project);
    let trace_id = item.get("traceId").and_then(|v| v.as_str()).unwrap_or_default();

    Identity {
        akas: vec![aka(
            ServiceKind::CloudTrace,
            &format!("projects/{}/traces/{}", project, trace_id),
        )],
        project: Some(project.to_string()),
        ..Default::default()
    }
}

#[async_trait]
impl Table for CloudTraceTraceTable {
    fn name(&self) -> &'static str {
        TABLE
    }

    async fn list(&self, d: &QueryData) -> Result<ListOutcome> {
        let tag = format!("{}.list", TABLE);
        let project = project_for(d, &tag).await?;
        tracing::debug!("{}: project {}", tag, project);
        let client = service_for(d, ServiceKind::CloudTrace, &tag).await?;

        let url = client.url(&format!("projects/{}/traces", project));
        stream_pages(d, &tag, ListCall::new(&client, url, "traces"), |item| {
            trace_identity(item, &project)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trace_aka() {
        let identity = trace_identity(&json!({"projectId": "proj-1", "traceId": "abc123"}), "other");
        assert_eq!(
            identity.akas,
            vec!["gcp://cloudtrace.googleapis.com/projects/proj-1/traces/abc123"]
        );
        assert_eq!(identity.project.as_deref(), Some("proj-1"));
    }
}
