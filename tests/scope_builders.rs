//! Scope builder integration tests against a mocked GCP endpoint

mod common;

use common::{api_error, connection, connection_with, locations, PROJECT, TOKEN};
use gcp_tables::scope::{
    build_apigee_organization_list, build_cloud_build_location_list, build_compute_location_list,
    build_document_ai_location_list, build_filestore_location_list, build_vertex_ai_location_list,
    VertexAiClientType, APIGEE_ORGANIZATION_CACHE_KEY, FILESTORE_LOCATION_CACHE_KEY,
};
use gcp_tables::{Matrix, MatrixBuilder, ScopeRecord};
use serde_json::{json, Value};
use wiremock::matchers::{bearer_token, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn project_locations_path() -> String {
    format!("/v1/projects/{}/locations", PROJECT)
}

mod apigee {
    use super::*;

    /// Organizations map to {organization, location, project} and are
    /// enumerated once per connection
    #[tokio::test]
    async fn test_organizations_cached_after_first_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/organizations"))
            .and(bearer_token(TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "organizations": [
                    {"organization": "org-a", "location": "eu", "projectId": "proj-1"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let conn = connection(&server);
        let first = build_apigee_organization_list(&conn).await;
        assert_eq!(
            first,
            vec![ScopeRecord::organization(
                "org-a",
                Some("eu".to_string()),
                Some("proj-1".to_string())
            )]
        );
        assert_eq!(
            Value::Object(first[0].to_map()),
            json!({"organization": "org-a", "location": "eu", "project": "proj-1"})
        );

        let second = build_apigee_organization_list(&conn).await;
        assert_eq!(first, second);
        assert!(conn.cache().contains(APIGEE_ORGANIZATION_CACHE_KEY));
    }

    /// Caches are per connection
    #[tokio::test]
    async fn test_cache_not_shared_between_connections() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/organizations"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"organizations": [{"organization": "org-a"}]})),
            )
            .expect(2)
            .mount(&server)
            .await;

        assert_eq!(build_apigee_organization_list(&connection(&server)).await.len(), 1);
        assert_eq!(build_apigee_organization_list(&connection(&server)).await.len(), 1);
    }
}

mod location_lists {
    use super::*;

    /// Document AI drops the cloud-regional pseudo location
    #[tokio::test]
    async fn test_document_ai_filters_cloud_regional() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(project_locations_path()))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(locations(&["us", "eu", "cloud-regional"])),
            )
            .mount(&server)
            .await;

        let matrix = build_document_ai_location_list(&connection(&server)).await;
        assert_eq!(
            matrix,
            vec![ScopeRecord::location("us"), ScopeRecord::location("eu")]
        );
        assert!(matrix
            .iter()
            .all(|record| record.location.as_deref() != Some("cloud-regional")));
    }

    /// Records carry the short location ID, not the full name
    #[tokio::test]
    async fn test_locations_use_short_ids() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(project_locations_path()))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(locations(&["us-central1", "europe-west1"])),
            )
            .mount(&server)
            .await;

        let matrix =
            build_vertex_ai_location_list(&connection(&server), VertexAiClientType::Notebook).await;
        assert_eq!(
            matrix,
            vec![
                ScopeRecord::location("us-central1"),
                ScopeRecord::location("europe-west1")
            ]
        );
    }

    /// Errors yield an empty matrix that is not cached, so the next call retries
    #[tokio::test]
    async fn test_error_returns_empty_and_is_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(project_locations_path()))
            .respond_with(ResponseTemplate::new(403).set_body_json(api_error(403, "PERMISSION_DENIED")))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(project_locations_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(locations(&["us-east1"])))
            .mount(&server)
            .await;

        let conn = connection(&server);
        assert!(build_filestore_location_list(&conn).await.is_empty());
        assert!(!conn.cache().contains(FILESTORE_LOCATION_CACHE_KEY));

        let retried = build_filestore_location_list(&conn).await;
        assert_eq!(retried, vec![ScopeRecord::location("us-east1")]);
        assert!(conn.cache().contains(FILESTORE_LOCATION_CACHE_KEY));
    }

    /// An empty enumeration is a valid, cached result
    #[tokio::test]
    async fn test_empty_list_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(project_locations_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let conn = connection(&server);
        assert!(build_filestore_location_list(&conn).await.is_empty());
        assert!(build_filestore_location_list(&conn).await.is_empty());
        assert_eq!(
            conn.cache().get::<Matrix>(FILESTORE_LOCATION_CACHE_KEY),
            Some(Matrix::new())
        );
    }

    /// Location pages are followed to the end
    #[tokio::test]
    async fn test_locations_follow_pages() {
        use wiremock::matchers::{query_param, query_param_is_missing};

        let server = MockServer::start().await;
        let mut first = locations(&["us-central1"]);
        first["nextPageToken"] = json!("page-2");
        Mock::given(method("GET"))
            .and(path(project_locations_path()))
            .and(query_param_is_missing("pageToken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(first))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(project_locations_path()))
            .and(query_param("pageToken", "page-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(locations(&["asia-east1"])))
            .mount(&server)
            .await;

        let matrix = MatrixBuilder::DatastreamLocation
            .build(&connection(&server))
            .await;
        assert_eq!(
            matrix,
            vec![
                ScopeRecord::location("us-central1"),
                ScopeRecord::location("asia-east1")
            ]
        );
    }

    /// Without a resolvable project, builders return nothing
    #[tokio::test]
    async fn test_no_project_yields_empty_matrix() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"projects": [
                {"projectId": "old", "lifecycleState": "DELETE_REQUESTED"}
            ]})))
            .mount(&server)
            .await;

        let conn = connection_with(&server, |config| config.project = None);
        assert!(build_filestore_location_list(&conn).await.is_empty());
    }
}

mod cloud_build {
    use super::*;

    /// Cloud Build lists locations under the wildcard project and keeps
    /// name, displayName, labels and metadata
    #[tokio::test]
    async fn test_wildcard_parent_and_extra_keys() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/projects/-/locations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "locations": [{
                    "name": "projects/proj-1/locations/global",
                    "locationId": "global",
                    "displayName": "Global",
                    "labels": {"tier": "1"}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let matrix = build_cloud_build_location_list(&connection(&server)).await;
        assert_eq!(matrix.len(), 1);
        assert_eq!(
            Value::Object(matrix[0].to_map()),
            json!({
                "location": "global",
                "name": "projects/proj-1/locations/global",
                "displayName": "Global",
                "labels": {"tier": "1"},
                "metadata": null
            })
        );
    }
}

mod compute {
    use super::*;

    /// Compute regions become location records
    #[tokio::test]
    async fn test_regions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/compute/v1/projects/{}/regions", PROJECT)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"name": "us-central1"}, {"name": "europe-west4"}]
            })))
            .mount(&server)
            .await;

        let matrix = build_compute_location_list(&connection(&server)).await;
        assert_eq!(
            matrix,
            vec![
                ScopeRecord::location("us-central1"),
                ScopeRecord::location("europe-west4")
            ]
        );
    }
}
