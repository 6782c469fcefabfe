//! AsyncAPI channel comparison and cross-protocol dispatch.

use api_sign::canonical::{
    ApiDocument, ApiSpec, Endpoint, GraphqlSchema, Protocol, RequestBody, SchemaDefinition,
    SchemaKind, SchemaProperty,
};
use api_sign::compat::{ChangeCategory, ChangeType, ChangelogEngine, Severity};
use api_sign::spec::{Compatibility, Spec};
use api_sign::ApiSignError;

fn events(payload: &str) -> ApiSpec {
    ApiSpec::new("user-events", "1.0.0", Protocol::Async)
        .with_endpoint(
            Endpoint::new("SEND", "user/signedup")
                .with_request_body(RequestBody::new("application/json", Some(payload), true)),
        )
        .with_endpoint(Endpoint::new("RECEIVE", "user/deleted"))
        .with_schema(
            SchemaDefinition::new("UserSignedUp", SchemaKind::Object)
                .with_property(SchemaProperty::new("userId", "string"), true),
        )
}

#[test]
fn test_removed_channel_operation() {
    let old = events("#/components/messages/UserSignedUp");
    let mut new = events("#/components/messages/UserSignedUp");
    new.endpoints.retain(|e| e.path != "user/deleted");

    let changelog = ChangelogEngine::default()
        .compare_documents(&ApiDocument::Async(old), &ApiDocument::Async(new))
        .unwrap();

    assert_eq!(changelog.changes.len(), 1);
    assert_eq!(changelog.changes[0].change_type(), ChangeType::Removed);
    assert_eq!(changelog.changes[0].category(), ChangeCategory::Endpoint);
    assert_eq!(changelog.changes[0].path(), "RECEIVE user/deleted");
    assert!(changelog.has_breaking_changes());
}

#[test]
fn test_payload_and_schema_changes() {
    let old = events("#/components/messages/UserSignedUp");
    let mut new = events("#/components/messages/UserRegistered");
    new.schemas[0]
        .properties
        .push(SchemaProperty::new("referrer", "string"));

    let changelog = ChangelogEngine::default().compare_async(Some(&old), Some(&new));
    assert!(changelog.changes.len() >= 2);
    assert!(changelog.changes.iter().any(|c| c.path().starts_with("SEND user/signedup")));
    let added = changelog
        .changes
        .iter()
        .find(|c| c.path() == "UserSignedUp.referrer")
        .unwrap();
    assert_eq!(added.change_type(), ChangeType::Added);
    assert_eq!(added.severity(), Severity::Info);
}

#[test]
fn test_async_json_model() {
    let json = r#"{
        "kind": "async",
        "name": "user-events",
        "version": "1.0.0",
        "protocol": "ASYNC",
        "endpoints": [{"method": "SEND", "path": "user/signedup"}]
    }"#;
    let old = Spec::from_json(json).unwrap();
    let new = Spec::from_json(&json.replace("1.0.0", "1.1.0")).unwrap();
    assert_eq!(old.compare_with(&new), Compatibility::Green);
    assert!(old.changelog(&new, &ChangelogEngine::default()).unwrap().is_empty());
}

#[test]
fn test_protocol_mismatch() {
    let rest = ApiDocument::Rest(ApiSpec::new("users", "1.0.0", Protocol::Rest));
    let grpc = ApiDocument::Rest(ApiSpec::new("users", "1.0.0", Protocol::Grpc));
    let graphql = ApiDocument::Graphql(GraphqlSchema::new("users", "1.0.0"));
    let engine = ChangelogEngine::default();

    assert!(matches!(
        engine.compare_documents(&rest, &graphql),
        Err(ApiSignError::ProtocolMismatch {
            old: Protocol::Rest,
            new: Protocol::Graphql
        })
    ));
    assert!(matches!(
        engine.compare_documents(&rest, &grpc),
        Err(ApiSignError::ProtocolMismatch { .. })
    ));

    let old = Spec::from_document(rest).unwrap();
    let new = Spec::from_document(graphql).unwrap();
    assert_eq!(old.compare_with(&new), Compatibility::Red);
}
