//! GraphQL schema comparison through the changelog engine.

use api_sign::canonical::{
    ApiDocument, GraphqlArgument, GraphqlField, GraphqlOperation, GraphqlSchema, GraphqlType,
    OperationKind, TypeKind, TypeRef,
};
use api_sign::compat::{ChangeCategory, ChangeType, ChangelogEngine, SemverRecommendation, Severity};
use api_sign::spec::Spec;

fn schema_v1() -> GraphqlSchema {
    GraphqlSchema::new("accounts", "1.0.0")
        .with_type(
            GraphqlType::new("User", TypeKind::Object)
                .with_field(GraphqlField::new("id", TypeRef::non_null("ID")))
                .with_field(GraphqlField::new("email", TypeRef::non_null("String")))
                .with_field(GraphqlField::new("name", TypeRef::named("String"))),
        )
        .with_type(GraphqlType::new("Role", TypeKind::Enum).with_enum_values(&["ADMIN", "MEMBER"]))
        .with_operation(
            GraphqlOperation::new(
                "users",
                OperationKind::Query,
                TypeRef::list_of("User", true, true),
            )
            .with_argument(
                GraphqlArgument::new("first", TypeRef::named("Int")).with_default("20"),
            ),
        )
        .with_operation(
            GraphqlOperation::new("createUser", OperationKind::Mutation, TypeRef::non_null("User"))
                .with_argument(GraphqlArgument::new("email", TypeRef::non_null("String"))),
        )
}

#[test]
fn test_removed_field_scenario() {
    let old = schema_v1();
    let mut new = schema_v1();
    new.types[0].fields.retain(|f| f.name != "email");

    let changelog = ChangelogEngine::default().compare_graphql(Some(&old), Some(&new));

    assert_eq!(changelog.changes.len(), 1);
    let change = &changelog.changes[0];
    assert_eq!(change.change_type(), ChangeType::Removed);
    assert_eq!(change.category(), ChangeCategory::Field);
    assert_eq!(change.severity(), Severity::Breaking);
    assert!(change.path().contains("User.email"));
}

#[test]
fn test_self_comparison_is_empty() {
    let schema = schema_v1();
    let changelog = ChangelogEngine::default().compare_graphql(Some(&schema), Some(&schema));
    assert!(changelog.is_empty());
}

#[test]
fn test_additive_evolution_is_minor() {
    let old = schema_v1();
    let mut new = schema_v1();
    new.types[0]
        .fields
        .push(GraphqlField::new("avatar", TypeRef::named("String")));
    new.types[1].enum_values.push("GUEST".into());
    new.queries[0]
        .arguments
        .push(GraphqlArgument::new("after", TypeRef::named("String")));
    new.types.push(
        GraphqlType::new("Team", TypeKind::Object)
            .with_field(GraphqlField::new("id", TypeRef::non_null("ID"))),
    );

    let changelog = ChangelogEngine::default().compare_graphql(Some(&old), Some(&new));

    assert_eq!(changelog.changes.len(), 4);
    assert!(changelog.changes.iter().all(|c| c.severity() == Severity::Info));
    assert_eq!(changelog.summary.semver_recommendation, SemverRecommendation::Minor);
}

#[test]
fn test_argument_and_nullability_rules() {
    let old = schema_v1();
    let mut new = schema_v1();
    // nullable -> non-null output field
    new.types[0].fields[2].field_type = TypeRef::non_null("String");
    // new mandatory argument on an existing mutation
    new.mutations[0]
        .arguments
        .push(GraphqlArgument::new("role", TypeRef::non_null("Role")));
    // default dropped from an optional argument
    new.queries[0].arguments[0].default_value = None;

    let changelog = ChangelogEngine::default().compare_graphql(Some(&old), Some(&new));
    let summary: Vec<_> = changelog
        .changes
        .iter()
        .map(|c| (c.path().to_string(), c.severity()))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("Query.users(first)".to_string(), Severity::Dangerous),
            ("Mutation.createUser(role)".to_string(), Severity::Breaking),
            ("User.name".to_string(), Severity::Dangerous),
        ]
    );
}

#[test]
fn test_removed_operation_and_type() {
    let old = schema_v1();
    let mut new = schema_v1();
    new.mutations.clear();
    new.types.retain(|t| t.name != "Role");

    let changelog = ChangelogEngine::default().compare_graphql(Some(&old), Some(&new));
    let categories: Vec<_> = changelog.changes.iter().map(|c| c.category()).collect();

    assert_eq!(categories, vec![ChangeCategory::Endpoint, ChangeCategory::Type]);
    assert!(changelog.changes.iter().all(|c| c.is_breaking()));
}

#[test]
fn test_absent_schema() {
    let schema = schema_v1();
    let added = ChangelogEngine::default().compare_graphql(None, Some(&schema));
    assert_eq!(added.changes.len(), 1);
    assert_eq!(added.changes[0].category(), ChangeCategory::Type);
    assert_eq!(added.changes[0].severity(), Severity::Info);

    let removed = ChangelogEngine::default().compare_graphql(Some(&schema), None);
    assert_eq!(removed.changes.len(), 1);
    assert_eq!(removed.changes[0].severity(), Severity::Breaking);
}

#[test]
fn test_yaml_model() {
    let yaml = r#"
kind: graphql
name: accounts
version: 1.0.0
types:
  - name: User
    kind: OBJECT
    fields:
      - name: id
        type: { name: ID, required: true }
queries:
  - name: me
    kind: QUERY
    returnType: { name: User }
"#;
    let old = Spec::from_yaml(yaml).unwrap();
    let new = Spec::from_document(ApiDocument::Graphql(
        GraphqlSchema::new("accounts", "1.1.0")
            .with_type(
                GraphqlType::new("User", TypeKind::Object)
                    .with_field(GraphqlField::new("id", TypeRef::named("ID"))),
            )
            .with_operation(GraphqlOperation::new(
                "me",
                OperationKind::Query,
                TypeRef::named("User"),
            )),
    ))
    .unwrap();

    let changelog = old.changelog(&new, &ChangelogEngine::default()).unwrap();
    assert_eq!(changelog.changes.len(), 1);
    assert_eq!(changelog.changes[0].path(), "User.id");
    assert_eq!(changelog.changes[0].severity(), Severity::Warning);
}
