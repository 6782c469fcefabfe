//! Protobuf comparison starting from `.proto` sources.

use api_sign::canonical::{ProtoField, ProtoFile, ProtoMessage};
use api_sign::compat::{ChangeCategory, ChangeType, ChangelogEngine, SemverRecommendation, Severity};
use api_sign::spec::{Compatibility, Spec};

const USER_V1: &str = r#"
syntax = "proto3";

package acme.users.v1;

enum Status {
  STATUS_UNKNOWN = 0;
  STATUS_ACTIVE = 1;
  STATUS_BANNED = 2;
}

message User {
  int64 id = 1;
  string name = 2;
  Status status = 3;
  repeated string tags = 4;
}

message GetUserRequest {
  int64 id = 1;
}

service UserService {
  rpc GetUser(GetUserRequest) returns (User);
  rpc ListUsers(GetUserRequest) returns (stream User);
}
"#;

fn changelog(old: &str, new: &str) -> api_sign::Changelog {
    let old = Spec::from_proto(old).unwrap();
    let new = Spec::from_proto(new).unwrap();
    old.changelog(&new, &ChangelogEngine::default()).unwrap()
}

#[test]
fn test_renumbered_field_scenario() {
    let renumbered = USER_V1.replace("string name = 2;", "string name = 5;");
    let changelog = changelog(USER_V1, &renumbered);

    assert_eq!(changelog.changes.len(), 1);
    let change = &changelog.changes[0];
    assert_eq!(change.category(), ChangeCategory::FieldNumber);
    assert_eq!(change.severity(), Severity::Breaking);
    assert_eq!(change.path(), "User.name");
}

#[test]
fn test_model_level_renumbering() {
    let user = |number: i32| {
        ProtoFile::new(Some("acme.v1")).with_message(
            ProtoMessage::new("User")
                .with_field(ProtoField::new("id", 1, "int64"))
                .with_field(ProtoField::new("name", number, "string")),
        )
    };
    let changelog = ChangelogEngine::default().compare_protobuf(Some(&user(2)), Some(&user(3)));
    assert_eq!(changelog.changes.len(), 1);
    assert_eq!(changelog.changes[0].category(), ChangeCategory::FieldNumber);
    assert_eq!(changelog.changes[0].severity(), Severity::Breaking);
}

#[test]
fn test_formatting_and_comments_are_not_changes() {
    let reformatted = format!("// User service contract\n{}", USER_V1.replace("  ", "    "));
    let old = Spec::from_proto(USER_V1).unwrap();
    let new = Spec::from_proto(&reformatted).unwrap();
    assert_eq!(old.compare_with(&new), Compatibility::Green);
    assert!(old.changelog(&new, &ChangelogEngine::default()).unwrap().is_empty());
}

#[test]
fn test_wire_compatible_type_change_is_a_warning() {
    let widened = USER_V1.replace(
        "message GetUserRequest {\n  int64 id = 1;",
        "message GetUserRequest {\n  uint64 id = 1;",
    );
    let changelog = changelog(USER_V1, &widened);

    assert_eq!(changelog.changes.len(), 1);
    assert_eq!(changelog.changes[0].severity(), Severity::Warning);
    assert_eq!(changelog.changes[0].path(), "GetUserRequest.id");
    assert_eq!(changelog.summary.semver_recommendation, SemverRecommendation::Minor);
}

#[test]
fn test_enum_field_to_int32_is_wire_compatible() {
    let relaxed = USER_V1.replace("Status status = 3;", "int32 status = 3;");
    let changelog = changelog(USER_V1, &relaxed);
    assert_eq!(changelog.changes.len(), 1);
    assert_eq!(changelog.changes[0].severity(), Severity::Warning);
}

#[test]
fn test_streaming_and_rpc_changes() {
    let changed = USER_V1
        .replace("returns (stream User);", "returns (User);")
        .replace("rpc GetUser(GetUserRequest) returns (User);\n", "");
    let changelog = changelog(USER_V1, &changed);

    let summary: Vec<_> = changelog
        .changes
        .iter()
        .map(|c| (c.change_type(), c.category(), c.path().to_string()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (
                ChangeType::Removed,
                ChangeCategory::RpcMethod,
                "/acme.users.v1.UserService/GetUser".to_string()
            ),
            (
                ChangeType::Modified,
                ChangeCategory::StreamingType,
                "/acme.users.v1.UserService/ListUsers".to_string()
            ),
        ]
    );
}

#[test]
fn test_enum_value_and_field_removal() {
    let changed = USER_V1
        .replace("  STATUS_BANNED = 2;\n", "")
        .replace("  repeated string tags = 4;\n", "");
    let changelog = changelog(USER_V1, &changed);

    let summary: Vec<_> = changelog
        .changes
        .iter()
        .map(|c| (c.category(), c.path().to_string()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (ChangeCategory::Field, "User.tags".to_string()),
            (ChangeCategory::EnumValue, "Status.STATUS_BANNED".to_string()),
        ]
    );
    assert_eq!(changelog.breaking_changes.len(), 2);
    assert!(changelog.breaking_changes.iter().all(|b| b.impact_score() > 0));
}

#[test]
fn test_package_change_is_breaking() {
    let moved = USER_V1.replace("package acme.users.v1;", "package acme.users.v2;");
    let old = Spec::from_proto(USER_V1).unwrap();
    let new = Spec::from_proto(&moved).unwrap();
    let changelog = old.changelog(&new, &ChangelogEngine::default()).unwrap();

    // Messages, enums and RPC types keep meaning the same local types.
    assert_eq!(changelog.changes.len(), 1);
    assert_eq!(changelog.changes[0].category(), ChangeCategory::Package);
    assert_eq!(changelog.changes[0].severity(), Severity::Breaking);
    assert_eq!(changelog.changes[0].path(), "acme.users.v2");
    assert_eq!(old.compare_with(&new), Compatibility::Red);
}

#[test]
fn test_imports_are_stubbed() {
    let with_import = USER_V1.replace(
        "package acme.users.v1;",
        "package acme.users.v1;\n\n\
         import \"acme/common/v1/paging.proto\";\n\
         import \"google/protobuf/timestamp.proto\";",
    );
    let changelog = changelog(USER_V1, &with_import);
    assert!(changelog.is_empty());
}

#[test]
fn test_renamed_field_keeps_cardinality_checks() {
    let renamed = USER_V1.replace("repeated string tags = 4;", "string tag = 4;");
    let changelog = changelog(USER_V1, &renamed);

    let summary: Vec<_> = changelog
        .changes
        .iter()
        .map(|c| (c.change_type(), c.severity(), c.path().to_string()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (ChangeType::Modified, Severity::Warning, "User.tag".to_string()),
            (ChangeType::Modified, Severity::Breaking, "User.tag".to_string()),
        ]
    );
    assert_eq!(changelog.summary.semver_recommendation, SemverRecommendation::Major);
}

#[test]
fn test_messages_added_and_removed() {
    let changed = USER_V1.replace(
        "message GetUserRequest {\n  int64 id = 1;\n}",
        "message GetUserRequest {\n  int64 id = 1;\n}\n\nmessage Team {\n  string id = 1;\n}",
    );
    let added = changelog(USER_V1, &changed);
    assert_eq!(added.changes.len(), 1);
    assert_eq!(added.changes[0].change_type(), ChangeType::Added);
    assert_eq!(added.changes[0].category(), ChangeCategory::Message);
    assert_eq!(added.changes[0].severity(), Severity::Info);
    assert_eq!(added.changes[0].path(), "Team");

    let removed = changelog(&changed, USER_V1);
    assert_eq!(removed.changes.len(), 1);
    assert_eq!(removed.changes[0].change_type(), ChangeType::Removed);
    assert_eq!(removed.changes[0].category(), ChangeCategory::Message);
    assert_eq!(removed.changes[0].severity(), Severity::Breaking);
}

#[test]
fn test_deprecated_field_is_a_warning() {
    let deprecated = USER_V1.replace("string name = 2;", "string name = 2 [deprecated = true];");
    let changelog = changelog(USER_V1, &deprecated);

    assert_eq!(changelog.changes.len(), 1);
    let change = &changelog.changes[0];
    assert_eq!(change.change_type(), ChangeType::Deprecated);
    assert_eq!(change.category(), ChangeCategory::Field);
    assert_eq!(change.severity(), Severity::Warning);
    assert_eq!(change.path(), "User.name");
}

#[test]
fn test_deprecated_rpc_is_a_warning() {
    let deprecated = USER_V1.replace(
        "rpc GetUser(GetUserRequest) returns (User);",
        "rpc GetUser(GetUserRequest) returns (User) {\n    option deprecated = true;\n  }",
    );
    let changelog = changelog(USER_V1, &deprecated);

    assert_eq!(changelog.changes.len(), 1);
    let change = &changelog.changes[0];
    assert_eq!(change.change_type(), ChangeType::Deprecated);
    assert_eq!(change.category(), ChangeCategory::RpcMethod);
    assert_eq!(change.severity(), Severity::Warning);
    assert_eq!(change.path(), "/acme.users.v1.UserService/GetUser");
    assert_eq!(changelog.summary.semver_recommendation, SemverRecommendation::Minor);
}
