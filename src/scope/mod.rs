//! Scope matrices
//!
//! A matrix is the fan-out axis handed to the host: one [`ScopeRecord`] per
//! location (or Apigee organization) the current project can list from. Each
//! builder in [`builders`] discovers its records once per connection and
//! caches them.

pub mod builders;

pub use builders::*;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Matrix column carrying the location axis
pub const MATRIX_KEY_LOCATION: &str = "location";
/// Matrix column carrying the Apigee organization axis
pub const MATRIX_KEY_ORGANIZATION: &str = "organization";
/// Matrix column carrying the project, when a record has one
pub const MATRIX_KEY_PROJECT: &str = "project";

/// Default location of Cloud Build listings
pub const DEFAULT_LOCATION_GLOBAL: &str = "global";
/// Default location of most regional services
pub const DEFAULT_LOCATION_US_CENTRAL1: &str = "us-central1";
/// Default location of Document AI listings
pub const DEFAULT_LOCATION_US: &str = "us";

/// Which matrix column a table reconciles its scope against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKey {
    Location,
    Organization,
}

impl ScopeKey {
    /// The qual/matrix column name
    pub fn column(self) -> &'static str {
        match self {
            ScopeKey::Location => MATRIX_KEY_LOCATION,
            ScopeKey::Organization => MATRIX_KEY_ORGANIZATION,
        }
    }
}

/// One matrix row.
///
/// Exactly one of `location` / `organization` drives the fan-out; `extra`
/// carries service-specific keys such as Cloud Build's `displayName`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopeRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScopeRecord {
    pub fn location(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..Default::default()
        }
    }

    pub fn organization(
        organization: impl Into<String>,
        location: Option<String>,
        project: Option<String>,
    ) -> Self {
        Self {
            organization: Some(organization.into()),
            location,
            project,
            ..Default::default()
        }
    }

    /// Value of a matrix column, treating empty strings as unset
    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            MATRIX_KEY_LOCATION => self.location.as_deref(),
            MATRIX_KEY_ORGANIZATION => self.organization.as_deref(),
            MATRIX_KEY_PROJECT => self.project.as_deref(),
            other => self.extra.get(other).and_then(|v| v.as_str()),
        };
        value.filter(|v| !v.is_empty())
    }

    /// The record as the flat map the host consumes
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Ordered sequence of scope records, in API response order
pub type Matrix = Vec<ScopeRecord>;
