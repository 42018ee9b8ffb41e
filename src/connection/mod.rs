//! Per-connection state
//!
//! A [`Connection`] owns everything that must not outlive it or leak to
//! other connections: the [`ConnectionCache`], the lazily resolved
//! credential provider and the shared HTTP client.

mod cache;
mod project;

pub use cache::ConnectionCache;
pub use project::{active_project, ActiveProject, ACTIVE_PROJECT_CACHE_KEY};

use crate::config::ConnectionConfig;
use crate::error::{Error, Result};
use crate::gcp::auth::{CredentialProvider, GcpCredentials, StaticCredentials};
use crate::gcp::client::ServiceClient;
use crate::gcp::http::GcpHttpClient;
use crate::gcp::services::ServiceKind;
use std::sync::Arc;
use tokio::sync::OnceCell;
use uuid::Uuid;

pub struct Connection {
    id: Uuid,
    config: ConnectionConfig,
    cache: ConnectionCache,
    credentials: OnceCell<Arc<dyn CredentialProvider>>,
    http: GcpHttpClient,
}

impl Connection {
    /// Connection whose credentials are resolved on first use from the
    /// config (`access_token`, `credentials`) or Application Default
    /// Credentials.
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            config,
            cache: ConnectionCache::new(),
            credentials: OnceCell::new(),
            http: GcpHttpClient::new()?,
        })
    }

    /// Connection with an already constructed credential provider
    pub fn with_credentials(
        config: ConnectionConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self> {
        let conn = Self::new(config)?;
        // a fresh cell cannot be initialized yet
        let _ = conn.credentials.set(credentials);
        Ok(conn)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn cache(&self) -> &ConnectionCache {
        &self.cache
    }

    /// Credential provider, resolved once; failures are retried on next use
    pub async fn credentials(&self) -> Result<Arc<dyn CredentialProvider>> {
        self.credentials
            .get_or_try_init(|| resolve_credentials(&self.config))
            .await
            .cloned()
    }

    /// Client for `kind`, cached for the lifetime of the connection
    pub async fn service(&self, kind: ServiceKind) -> Result<ServiceClient> {
        let key = kind.cache_key();
        if let Some(client) = self.cache.get::<ServiceClient>(&key) {
            return Ok(client);
        }

        let credentials = self.credentials().await.map_err(|e| {
            tracing::error!("{}: failed to resolve credentials: {}", kind, e);
            e
        })?;
        let client = ServiceClient::new(
            kind,
            credentials,
            self.http.clone(),
            self.config.base_url(kind.host()),
        );

        Ok(self.cache.set_if_absent(&key, client))
    }

    /// The single project this connection queries
    pub async fn active_project(&self) -> Result<ActiveProject> {
        active_project(self).await
    }
}

async fn resolve_credentials(config: &ConnectionConfig) -> Result<Arc<dyn CredentialProvider>> {
    if let Some(token) = &config.access_token {
        let mut credentials = StaticCredentials::new(token.clone());
        if let Some(project) = config.effective_project() {
            credentials = credentials.with_project(project);
        }
        return Ok(Arc::new(credentials));
    }

    let credentials = match &config.credentials {
        Some(path) => GcpCredentials::from_key_file(path),
        None => GcpCredentials::new().await,
    }
    .map_err(|e| Error::credential(format!("{:#}", e)))?;

    Ok(Arc::new(credentials))
}
