//! Property-based tests using proptest
//!
//! These tests verify canonical name parsing and Aka construction using
//! randomized inputs.

use gcp_tables::identity::{aka, Identity, ScopeContext};
use gcp_tables::naming::{parse_location, parse_project, parse_trailing};
use gcp_tables::ServiceKind;
use proptest::prelude::*;

/// IDs never contain `/`; the digit keeps them apart from kind tokens
fn arb_id() -> impl Strategy<Value = String> {
    "[a-z][0-9][a-z0-9-]{0,28}"
}

/// Collection kinds that never collide with `projects` or `locations`
fn arb_kind() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("instances".to_string()),
        Just("workstationClusters".to_string()),
        Just("connections".to_string()),
        Just("caPools".to_string()),
        Just("processors".to_string()),
        "[a-z]{3,10}[A-Z][a-z]{2,8}",
    ]
}

fn arb_service() -> impl Strategy<Value = ServiceKind> {
    prop_oneof![
        Just(ServiceKind::Apigee),
        Just(ServiceKind::PrivateCa),
        Just(ServiceKind::CloudBuild),
        Just(ServiceKind::DataFusion),
        Just(ServiceKind::Workstations),
        Just(ServiceKind::DocumentAi),
        Just(ServiceKind::Filestore),
        Just(ServiceKind::Datastream),
        Just(ServiceKind::Dataflow),
        Just(ServiceKind::CloudTrace),
        Just(ServiceKind::Notebooks),
        Just(ServiceKind::BigtableAdmin),
        Just(ServiceKind::SecurityCenter),
    ]
}

proptest! {
    /// parse_* recover every component of a well-formed name
    #[test]
    fn name_parser_roundtrip(
        project in arb_id(),
        location in arb_id(),
        kind in arb_kind(),
        id in arb_id(),
    ) {
        let name = format!("projects/{}/locations/{}/{}/{}", project, location, kind, id);

        prop_assert_eq!(parse_project(&name).unwrap(), project.as_str());
        prop_assert_eq!(parse_location(&name).unwrap(), location.as_str());
        prop_assert_eq!(parse_trailing(&name, &kind).unwrap(), id.as_str());
    }

    /// A name without the requested kind never parses
    #[test]
    fn missing_kind_is_error(project in arb_id(), id in arb_id()) {
        let name = format!("projects/{}/instances/{}", project, id);
        prop_assert!(parse_location(&name).is_err());
    }

    /// Arbitrary strings never panic the parser
    #[test]
    fn parser_never_panics(s in ".*", kind in "[a-z]{1,12}") {
        let _ = parse_project(&s);
        let _ = parse_location(&s);
        let _ = parse_trailing(&s, &kind);
    }

    /// Every identity carries exactly one Aka of the form gcp://{host}/{name}
    #[test]
    fn aka_shape(
        service in arb_service(),
        project in arb_id(),
        location in arb_id(),
        kind in arb_kind(),
        id in arb_id(),
    ) {
        let name = format!("projects/{}/locations/{}/{}/{}", project, location, kind, id);
        let identity = Identity::from_name(service, &name, ScopeContext::default());

        prop_assert_eq!(identity.akas.len(), 1);
        prop_assert_eq!(&identity.akas[0], &aka(service, &name));
        prop_assert_eq!(
            identity.akas[0].clone(),
            format!("gcp://{}/{}", service.host(), name)
        );
        prop_assert_eq!(identity.project.as_deref(), Some(project.as_str()));
        prop_assert_eq!(identity.location.as_deref(), Some(location.as_str()));
    }
}
