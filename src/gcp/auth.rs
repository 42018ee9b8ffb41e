//! GCP Authentication
//!
//! Handles authentication using Application Default Credentials (ADC),
//! service account keys, or a pre-issued access token.

use crate::error::{Error, Result};
use anyhow::Context;
use async_trait::async_trait;
use gcp_auth::TokenProvider;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Default scopes for GCP API access
pub const DEFAULT_SCOPES: &[&str] = &["https://www.googleapis.com/auth/cloud-platform"];

/// Token expiry buffer - refresh tokens this much before they actually expire
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Default token TTL if we can't determine expiry (conservative: 30 minutes)
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// Source of bearer tokens and of the credentials' default project
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Access token for the `cloud-platform` scope
    async fn token(&self) -> Result<String>;

    /// Project the credentials belong to, if they carry one
    async fn default_project(&self) -> Option<String>;
}

/// `gcp_auth` backed credentials with token caching
#[derive(Clone)]
pub struct GcpCredentials {
    provider: Arc<dyn TokenProvider>,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

impl GcpCredentials {
    /// Application Default Credentials
    pub async fn new() -> anyhow::Result<Self> {
        let provider = gcp_auth::provider().await.context(
            "Failed to initialize GCP authentication. Run 'gcloud auth application-default login'",
        )?;

        Ok(Self::from_provider(provider))
    }

    /// Service account key file
    pub fn from_key_file(path: &Path) -> anyhow::Result<Self> {
        let account = gcp_auth::CustomServiceAccount::from_file(path)
            .with_context(|| format!("Failed to load service account key {}", path.display()))?;

        Ok(Self::from_provider(Arc::new(account)))
    }

    pub fn from_provider(provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            provider,
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    async fn fetch_token(&self) -> anyhow::Result<String> {
        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let token = self
            .provider
            .token(DEFAULT_SCOPES)
            .await
            .context("Failed to get access token")?;

        let token_str = token.as_str().to_string();
        let expires_at = Instant::now() + DEFAULT_TOKEN_TTL - TOKEN_EXPIRY_BUFFER;

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token_str.clone(),
                expires_at,
            });
        }

        tracing::debug!(
            "New token cached, expires in ~{} minutes",
            (DEFAULT_TOKEN_TTL - TOKEN_EXPIRY_BUFFER).as_secs() / 60
        );

        Ok(token_str)
    }
}

#[async_trait]
impl CredentialProvider for GcpCredentials {
    async fn token(&self) -> Result<String> {
        self.fetch_token()
            .await
            .map_err(|e| Error::credential(format!("{:#}", e)))
    }

    /// The provider's project, falling back to the gcloud CLI defaults
    async fn default_project(&self) -> Option<String> {
        match self.provider.project_id().await {
            Ok(project) => Some(project.to_string()),
            Err(e) => {
                tracing::debug!("Credentials carry no project: {}", e);
                get_default_project()
            },
        }
    }
}

/// A pre-issued access token
#[derive(Clone)]
pub struct StaticCredentials {
    token: String,
    project: Option<String>,
}

impl StaticCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            project: None,
        }
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn token(&self) -> Result<String> {
        if self.token.is_empty() {
            return Err(Error::credential("access token is empty"));
        }
        Ok(self.token.clone())
    }

    async fn default_project(&self) -> Option<String> {
        self.project.clone()
    }
}

/// Get the gcloud configuration directory
pub fn get_gcloud_config_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CLOUDSDK_CONFIG") {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir().map(|p| p.join("gcloud"))
}

/// Validate a GCP project ID format
/// Project IDs must be 6-30 characters, lowercase letters, digits, and hyphens
/// Must start with a letter and cannot end with a hyphen
pub fn validate_project_id(project: &str) -> bool {
    if project.len() < 6 || project.len() > 30 {
        return false;
    }

    match project.chars().next() {
        Some(c) if c.is_ascii_lowercase() => {},
        _ => return false,
    }

    if project.ends_with('-') {
        return false;
    }

    project
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Read the default project from the environment or gcloud configuration
pub fn get_default_project() -> Option<String> {
    for var in ["CLOUDSDK_CORE_PROJECT", "GOOGLE_CLOUD_PROJECT", "GCLOUD_PROJECT"] {
        if let Ok(project) = std::env::var(var) {
            if validate_project_id(&project) {
                return Some(project);
            }
            tracing::warn!("Invalid project ID format in {}", var);
        }
    }

    let config_dir = get_gcloud_config_dir()?;

    if let Ok(content) = std::fs::read_to_string(config_dir.join("properties")) {
        if let Some(project) = project_from_properties(&content, None) {
            return Some(project);
        }
    }

    let active_config = std::fs::read_to_string(config_dir.join("active_config")).ok()?;
    let config_name = active_config.trim();

    // Config names end up in a path
    if !config_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        tracing::warn!("Invalid characters in active_config name");
        return None;
    }

    let config_path = config_dir
        .join("configurations")
        .join(format!("config_{}", config_name));
    let content = std::fs::read_to_string(config_path).ok()?;
    project_from_properties(&content, Some("core"))
}

/// Find a `project = ...` line, optionally restricted to one `[section]`
fn project_from_properties(content: &str, section: Option<&str>) -> Option<String> {
    let mut in_section = section.is_none();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_section = section.map_or(true, |wanted| wanted == name);
            continue;
        }
        if !in_section {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if key.trim() == "project" {
            let project = value.trim();
            if validate_project_id(project) {
                return Some(project.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_project_id() {
        assert!(validate_project_id("my-project-1"));
        assert!(!validate_project_id("short"));
        assert!(!validate_project_id("Upper-case-id"));
        assert!(!validate_project_id("trailing-hyphen-"));
        assert!(!validate_project_id("1starts-with-digit"));
    }

    #[test]
    fn test_project_from_core_section() {
        let content = "[compute]\nproject = not-this-one\n[core]\naccount = me@example.com\nproject = my-project-1\n";
        assert_eq!(
            project_from_properties(content, Some("core")).as_deref(),
            Some("my-project-1")
        );
        assert_eq!(
            project_from_properties(content, None).as_deref(),
            Some("not-this-one")
        );
    }

    #[test]
    fn test_static_credentials() {
        let creds = StaticCredentials::new("abc").with_project("proj-123456");
        assert_eq!(tokio_test::block_on(creds.token()).unwrap(), "abc");
        assert_eq!(
            tokio_test::block_on(creds.default_project()).as_deref(),
            Some("proj-123456")
        );
        assert!(tokio_test::block_on(StaticCredentials::new("").token()).is_err());
    }
}
