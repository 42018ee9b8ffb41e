//! Connection Configuration
//!
//! Settings for one plugin connection, loaded from YAML or JSON.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default number of matrix rows evaluated at once by the in-process runner
pub const DEFAULT_LIST_CONCURRENCY: usize = 1;

/// Connection configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConnectionConfig {
    /// Explicit project ID; takes precedence over every other source
    #[serde(default)]
    pub project: Option<String>,
    /// Path to a service account key file
    #[serde(default)]
    pub credentials: Option<PathBuf>,
    /// Pre-issued OAuth2 access token
    #[serde(default)]
    pub access_token: Option<String>,
    /// Base URL replacing `https://{service-host}` for every API call
    #[serde(default)]
    pub endpoint: Option<String>,
    /// HTTP statuses or Google status names to treat as empty results
    #[serde(default)]
    pub ignore_error_codes: Vec<String>,
    /// Matrix rows listed at once by [`crate::plugin::Plugin`]
    #[serde(default)]
    pub list_concurrency: Option<usize>,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

/// Log output settings, see [`crate::logging::setup_logging`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `"gcp_tables=debug"`
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file; defaults to `<config dir>/gcp-tables/gcp-tables.log`
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl ConnectionConfig {
    /// Load configuration from a `.yaml`/`.yml` or `.json` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("failed to read {}: {}", path.display(), e)))?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let config = if is_json {
            Self::from_json(&content)?
        } else {
            Self::from_yaml(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::config(format!("invalid YAML: {}", e)))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::config(format!("invalid JSON: {}", e)))
    }

    /// Check option values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if let Some(endpoint) = &self.endpoint {
            let url = url::Url::parse(endpoint)
                .map_err(|e| Error::config(format!("invalid endpoint {:?}: {}", endpoint, e)))?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(Error::config(format!(
                    "endpoint must be http(s), got {:?}",
                    url.scheme()
                )));
            }
        }
        if self.list_concurrency == Some(0) {
            return Err(Error::config("list_concurrency must be at least 1"));
        }
        if self.credentials.is_some() && self.access_token.is_some() {
            return Err(Error::config(
                "credentials and access_token are mutually exclusive",
            ));
        }
        Ok(())
    }

    /// Explicitly configured project, ignoring blank values
    pub fn effective_project(&self) -> Option<String> {
        self.project.clone().filter(|p| !p.is_empty())
    }

    /// Base URL for a service host, honouring the endpoint override
    pub fn base_url(&self, host: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://{}", host),
        }
    }

    pub fn list_concurrency(&self) -> usize {
        self.list_concurrency.unwrap_or(DEFAULT_LIST_CONCURRENCY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml() {
        let config = ConnectionConfig::from_yaml(
            r#"
project: my-project
ignore_error_codes: ["403", "NOT_FOUND"]
list_concurrency: 4
logging:
  level: debug
"#,
        )
        .unwrap();

        assert_eq!(config.project.as_deref(), Some("my-project"));
        assert_eq!(config.ignore_error_codes, vec!["403", "NOT_FOUND"]);
        assert_eq!(config.list_concurrency(), 4);
        assert_eq!(config.logging.unwrap().level, "debug");
    }

    #[test]
    fn test_parse_json_defaults() {
        let config = ConnectionConfig::from_json(r#"{"endpoint": "http://127.0.0.1:9000/"}"#).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.list_concurrency(), DEFAULT_LIST_CONCURRENCY);
        assert_eq!(config.base_url("file.googleapis.com"), "http://127.0.0.1:9000");
    }

    #[test]
    fn test_base_url_without_override() {
        let config = ConnectionConfig::default();
        assert_eq!(
            config.base_url("apigee.googleapis.com"),
            "https://apigee.googleapis.com"
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ConnectionConfig {
            endpoint: Some("ftp://example.com".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ConnectionConfig {
            list_concurrency: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ConnectionConfig {
            credentials: Some(PathBuf::from("key.json")),
            access_token: Some("token".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_project_wins() {
        let config = ConnectionConfig {
            project: Some("explicit-project".to_string()),
            ..Default::default()
        };
        assert_eq!(config.effective_project().as_deref(), Some("explicit-project"));

        let blank = ConnectionConfig {
            project: Some(String::new()),
            ..Default::default()
        };
        assert!(blank.effective_project().is_none());
    }
}
