//! GCP Client
//!
//! A service-bound client combining credentials, the shared HTTP client and
//! the service's base URL.

use super::auth::CredentialProvider;
use super::http::GcpHttpClient;
use super::services::ServiceKind;
use crate::error::Result;
use serde_json::Value;
use std::sync::Arc;

/// Query parameter carrying the page cursor
const PAGE_TOKEN_PARAM: &str = "pageToken";
const PAGE_SIZE_PARAM: &str = "pageSize";

/// One page of a list response
#[derive(Debug, Default)]
pub struct Page {
    pub items: Vec<Value>,
    pub next_page_token: Option<String>,
}

impl Page {
    /// Split a list response into items found under `items_key` and the cursor
    pub fn from_response(mut response: Value, items_key: &str) -> Self {
        let items = match response.get_mut(items_key).map(Value::take) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        let next_page_token = response
            .get("nextPageToken")
            .and_then(|v| v.as_str())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string());

        Self {
            items,
            next_page_token,
        }
    }
}

/// Client for one GCP API, bound to the connection's credentials
#[derive(Clone)]
pub struct ServiceClient {
    kind: ServiceKind,
    credentials: Arc<dyn CredentialProvider>,
    http: GcpHttpClient,
    base_url: String,
}

impl ServiceClient {
    pub fn new(
        kind: ServiceKind,
        credentials: Arc<dyn CredentialProvider>,
        http: GcpHttpClient,
        base_url: String,
    ) -> Self {
        Self {
            kind,
            credentials,
            http,
            base_url,
        }
    }

    pub fn kind(&self) -> ServiceKind {
        self.kind
    }

    /// URL of `path` under the service's default version
    pub fn url(&self, path: &str) -> String {
        self.versioned_url(self.kind.version(), path)
    }

    /// URL of `path` under an explicit version, for APIs split across versions
    pub fn versioned_url(&self, version: &str, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            version,
            path.trim_start_matches('/')
        )
    }

    /// Authenticated GET
    pub async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        let token = self.credentials.token().await?;
        self.http.get(self.kind.name(), url, &token, query).await
    }

    /// Fetch one page of a list call
    pub async fn list_page(
        &self,
        url: &str,
        items_key: &str,
        page_token: Option<&str>,
        page_size: Option<u32>,
        query: &[(&str, String)],
    ) -> Result<Page> {
        let mut params: Vec<(&str, String)> = query.to_vec();
        if let Some(size) = page_size {
            params.push((PAGE_SIZE_PARAM, size.to_string()));
        }
        if let Some(token) = page_token {
            params.push((PAGE_TOKEN_PARAM, token.to_string()));
        }

        let response = self.get(url, &params).await?;
        Ok(Page::from_response(response, items_key))
    }

    /// Fetch every page of a list call into memory.
    ///
    /// Only used for bounded parent collections (locations, pools, clusters)
    /// and never for rows streamed to the host.
    pub async fn list_all(&self, url: &str, items_key: &str) -> Result<Vec<Value>> {
        let mut all_items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .list_page(url, items_key, page_token.as_deref(), None, &[])
                .await?;
            all_items.extend(page.items);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(all_items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_from_response() {
        let page = Page::from_response(
            json!({"instances": [{"name": "a"}, {"name": "b"}], "nextPageToken": "t2"}),
            "instances",
        );
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_page_token.as_deref(), Some("t2"));
    }

    #[test]
    fn test_page_missing_items_and_empty_token() {
        let page = Page::from_response(json!({"nextPageToken": ""}), "instances");
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());
    }
}
