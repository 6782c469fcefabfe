use api_sign::canonical::{
    ApiDocument, ApiSpec, Endpoint, Protocol, SchemaDefinition, SchemaKind, SchemaProperty,
};
use api_sign::spec::Spec;
use api_sign::{ApiSignError, generate_fingerprint, generate_proto_fingerprint};
use std::fs;

const ORDER_PROTO: &str = r#"
syntax = "proto3";
package shop.v1;

message Order {
  string id = 1;
  int64 total_cents = 2;
  repeated string items = 3;
}

message Empty {}

service Orders {
  rpc Get(Order) returns (Order);
  rpc Ping(Empty) returns (Empty);
}
"#;

#[test]
fn test_proto_formatting_is_ignored() {
    let compact = "syntax=\"proto3\";package shop.v1;\
        message Order{string id=1;int64 total_cents=2;repeated string items=3;}\
        message Empty{}\
        service Orders{rpc Get(Order)returns(Order);rpc Ping(Empty)returns(Empty);}";
    let commented = format!("// orders API\n/* v1 */\n{ORDER_PROTO}");

    let base = generate_proto_fingerprint(ORDER_PROTO).unwrap();
    assert_eq!(base, generate_proto_fingerprint(compact).unwrap());
    assert_eq!(base, generate_proto_fingerprint(&commented).unwrap());
}

#[test]
fn test_proto_declaration_order_is_ignored() {
    let reordered = r#"
syntax = "proto3";
package shop.v1;

service Orders {
  rpc Ping(Empty) returns (Empty);
  rpc Get(Order) returns (Order);
}

message Empty {}

message Order {
  repeated string items = 3;
  int64 total_cents = 2;
  string id = 1;
}
"#;
    assert_eq!(
        generate_proto_fingerprint(ORDER_PROTO).unwrap(),
        generate_proto_fingerprint(reordered).unwrap()
    );
}

#[test]
fn test_semantic_changes_alter_the_fingerprint() {
    let base = generate_proto_fingerprint(ORDER_PROTO).unwrap();
    let variants = [
        ORDER_PROTO.replace("string id = 1;", "string id = 4;"),
        ORDER_PROTO.replace("int64 total_cents", "int32 total_cents"),
        ORDER_PROTO.replace("total_cents", "amount_cents"),
        ORDER_PROTO.replace("returns (Order);", "returns (stream Order);"),
    ];
    for variant in &variants {
        assert_ne!(base, generate_proto_fingerprint(variant).unwrap(), "{variant}");
    }
}

#[test]
fn test_json_and_yaml_models_agree() {
    let json = r#"{
        "kind": "rest",
        "name": "shop",
        "version": "1.0.0",
        "protocol": "REST",
        "endpoints": [
            {"method": "GET", "path": "/orders"},
            {"method": "POST", "path": "/orders"}
        ]
    }"#;
    let yaml = r#"
kind: rest
name: shop
version: "1.0.0"
protocol: REST
endpoints:
  - method: POST
    path: /orders
  - method: GET
    path: /orders
"#;
    let from_json = Spec::from_json(json).unwrap();
    let from_yaml = Spec::from_yaml(yaml).unwrap();
    assert_eq!(from_json.fingerprint, from_yaml.fingerprint);

    let built = ApiSpec::new("shop", "1.0.0", Protocol::Rest)
        .with_endpoint(Endpoint::new("GET", "/orders"))
        .with_endpoint(Endpoint::new("POST", "/orders"));
    assert_eq!(
        from_json.fingerprint,
        generate_fingerprint(&ApiDocument::Rest(built)).unwrap()
    );
}

#[test]
fn test_schema_property_order_is_ignored() {
    let a = ApiSpec::new("shop", "1.0.0", Protocol::Rest).with_schema(
        SchemaDefinition::new("Order", SchemaKind::Object)
            .with_property(SchemaProperty::new("id", "string"), true)
            .with_property(SchemaProperty::new("total", "integer"), true),
    );
    let b = ApiSpec::new("shop", "1.0.0", Protocol::Rest).with_schema(
        SchemaDefinition::new("Order", SchemaKind::Object)
            .with_property(SchemaProperty::new("total", "integer"), true)
            .with_property(SchemaProperty::new("id", "string"), true),
    );
    assert_eq!(
        generate_fingerprint(&ApiDocument::Rest(a)).unwrap(),
        generate_fingerprint(&ApiDocument::Rest(b)).unwrap()
    );
}

#[test]
fn test_from_path_dispatches_on_extension() {
    let dir = tempfile::tempdir().unwrap();

    let proto_path = dir.path().join("orders.proto");
    fs::write(&proto_path, ORDER_PROTO).unwrap();
    let spec = Spec::from_path(&proto_path).unwrap();
    assert_eq!(spec.document.name(), "shop.v1");
    assert_eq!(spec.fingerprint, generate_proto_fingerprint(ORDER_PROTO).unwrap());

    let yaml_path = dir.path().join("shop.yml");
    fs::write(&yaml_path, "kind: rest\nname: shop\nprotocol: REST\n").unwrap();
    let spec = Spec::from_path(&yaml_path).unwrap();
    assert!(matches!(spec.document, ApiDocument::Rest(_)));
}

#[test]
fn test_from_path_rejects_unknown_extensions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orders.txt");
    fs::write(&path, ORDER_PROTO).unwrap();

    let err = Spec::from_path(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ApiSignError>(),
        Some(ApiSignError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_invalid_proto_is_an_error() {
    assert!(Spec::from_proto("syntax = \"proto3\"; message {").is_err());
}

#[test]
fn test_malformed_model_reports_parse_error() {
    let err = Spec::from_json("{\"kind\": \"rest\"").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ApiSignError>(),
        Some(ApiSignError::Parse { .. })
    ));

    let dir = tempfile::tempdir().unwrap();
    let err = Spec::from_path(dir.path().join("missing.yaml")).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ApiSignError>(),
        Some(ApiSignError::Io(_))
    ));
}
