//! Service catalogue
//!
//! Every GCP API the tables talk to, with its canonical host (also used for
//! `Akas`), default REST version and client cache key.

use std::fmt;

/// A GCP API family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Apigee,
    PrivateCa,
    CloudBuild,
    DataFusion,
    Workstations,
    DocumentAi,
    Filestore,
    Datastream,
    Dataflow,
    CloudTrace,
    Notebooks,
    AiPlatform,
    BigtableAdmin,
    SecurityCenter,
    Compute,
    ResourceManager,
}

impl ServiceKind {
    /// Canonical API host
    pub fn host(self) -> &'static str {
        match self {
            ServiceKind::Apigee => "apigee.googleapis.com",
            ServiceKind::PrivateCa => "privateca.googleapis.com",
            ServiceKind::CloudBuild => "cloudbuild.googleapis.com",
            ServiceKind::DataFusion => "datafusion.googleapis.com",
            ServiceKind::Workstations => "workstations.googleapis.com",
            ServiceKind::DocumentAi => "documentai.googleapis.com",
            ServiceKind::Filestore => "file.googleapis.com",
            ServiceKind::Datastream => "datastream.googleapis.com",
            ServiceKind::Dataflow => "dataflow.googleapis.com",
            ServiceKind::CloudTrace => "cloudtrace.googleapis.com",
            ServiceKind::Notebooks => "notebooks.googleapis.com",
            ServiceKind::AiPlatform => "aiplatform.googleapis.com",
            ServiceKind::BigtableAdmin => "bigtableadmin.googleapis.com",
            ServiceKind::SecurityCenter => "securitycenter.googleapis.com",
            ServiceKind::Compute => "compute.googleapis.com",
            ServiceKind::ResourceManager => "cloudresourcemanager.googleapis.com",
        }
    }

    /// Default REST path prefix
    pub fn version(self) -> &'static str {
        match self {
            ServiceKind::CloudBuild => "v2",
            ServiceKind::Dataflow => "v1b3",
            ServiceKind::BigtableAdmin => "v2",
            ServiceKind::Compute => "compute/v1",
            _ => "v1",
        }
    }

    /// Short name used in log lines and error messages
    pub fn name(self) -> &'static str {
        self.host().trim_end_matches(".googleapis.com")
    }

    /// Connection cache key for the constructed client
    pub fn cache_key(self) -> String {
        format!("ServiceClient.{}", self.name())
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
