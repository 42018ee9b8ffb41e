//! GCP API interaction module
//!
//! Authentication, the HTTP layer and service-bound REST clients.
//!
//! # Module Structure
//!
//! - [`auth`] - Credential providers (ADC, key file, static token)
//! - [`client`] - Service-bound client with page iteration
//! - [`http`] - HTTP utilities and API error mapping
//! - [`projects`] - Project listing
//! - [`services`] - Catalogue of API hosts and versions
//!
//! # Example
//!
//! ```ignore
//! use gcp_tables::{Connection, ConnectionConfig, ServiceKind};
//!
//! async fn example() -> gcp_tables::Result<()> {
//!     let conn = Connection::new(ConnectionConfig::default())?;
//!     let client = conn.service(ServiceKind::Filestore).await?;
//!     let locations = client.list_all(&client.url("projects/my-project/locations"), "locations").await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
pub mod projects;
pub mod services;
