//! GCP resources as relational tables.
//!
//! A host (a SQL engine speaking a plugin protocol, or the in-process
//! [`Plugin`] runner) asks each table for its scope matrix, then invokes the
//! table's list callback once per matrix record. Callbacks page through the
//! GCP REST APIs and stream rows, each enriched with an [`Identity`].
//!
//! # Module Structure
//!
//! - [`connection`] - Per-connection cache, credentials and active project
//! - [`scope`] - Scope matrices and their cached builders
//! - [`listing`] - Scope reconciliation, pagination and nested listing
//! - [`tables`] - Table definitions
//! - [`naming`] - Canonical resource name parsing
//! - [`gcp`] - Authentication and REST clients

pub mod config;
pub mod connection;
pub mod error;
pub mod gcp;
pub mod identity;
pub mod listing;
pub mod logging;
pub mod naming;
pub mod plugin;
pub mod query;
pub mod scope;
pub mod tables;

pub use config::{ConnectionConfig, LoggingConfig};
pub use connection::Connection;
pub use error::{Error, ErrorKind, Result};
pub use gcp::auth::{CredentialProvider, GcpCredentials, StaticCredentials};
pub use gcp::services::ServiceKind;
pub use identity::Identity;
pub use listing::ListOutcome;
pub use plugin::Plugin;
pub use query::{Host, QueryData, Row};
pub use scope::{Matrix, MatrixBuilder, ScopeRecord};
pub use tables::Table;

