//! Canonical resource names
//!
//! GCP names look like `projects/{p}/locations/{l}/{kind}/{id}` or
//! `organizations/{o}/{kind}/{id}`. The parsers scan the `/`-separated
//! segments once, left to right, and return a slice of the input.

use crate::error::{Error, Result};

pub const PROJECTS: &str = "projects";
pub const LOCATIONS: &str = "locations";
pub const ORGANIZATIONS: &str = "organizations";

/// Segment following the first `projects` token
pub fn parse_project(name: &str) -> Result<&str> {
    parse_trailing(name, PROJECTS)
}

/// Segment following the first `locations` token
pub fn parse_location(name: &str) -> Result<&str> {
    parse_trailing(name, LOCATIONS)
}

/// Segment following the first `organizations` token
pub fn parse_organization(name: &str) -> Result<&str> {
    parse_trailing(name, ORGANIZATIONS)
}

/// Segment following the first `kind` token
pub fn parse_trailing<'a>(name: &'a str, kind: &str) -> Result<&'a str> {
    let mut segments = name.split('/');
    while let Some(segment) = segments.next() {
        if segment == kind {
            return match segments.next() {
                Some(id) if !id.is_empty() => Ok(id),
                _ => Err(Error::invalid_name(name, kind)),
            };
        }
    }
    Err(Error::invalid_name(name, kind))
}

/// Last segment of a name, e.g. the short ID of `.../instances/{id}`
pub fn short_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// `projects/{project}/locations/{location}`
pub fn location_parent(project: &str, location: &str) -> String {
    format!("{}/{}/{}/{}", PROJECTS, project, LOCATIONS, location)
}

/// `organizations/{organization}`
pub fn organization_parent(organization: &str) -> String {
    format!("{}/{}", ORGANIZATIONS, organization)
}
