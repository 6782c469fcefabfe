//! Canonical in-memory models that every comparator reads.
//!
//! Parsers build these once; the comparison engine only ever borrows them.

pub mod graphql;
pub mod protobuf;
pub mod rest;

pub use graphql::{
    GraphqlArgument, GraphqlField, GraphqlOperation, GraphqlSchema, GraphqlType, OperationKind,
    TypeKind, TypeRef,
};
pub use protobuf::{
    FieldRule, ProtoEnum, ProtoEnumValue, ProtoField, ProtoFile, ProtoMessage, ProtoService,
    RpcMethod, StreamingMode,
};
pub use rest::{
    ApiSpec, Endpoint, Parameter, ParameterLocation, Protocol, RequestBody, Response,
    SchemaDefinition, SchemaKind, SchemaProperty,
};

use serde::{Deserialize, Serialize};

/// Any canonical model, tagged by the comparator it belongs to.
///
/// `rest` also carries the gRPC endpoint view; `async` carries AsyncAPI
/// channel operations in the same endpoint shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ApiDocument {
    Rest(ApiSpec),
    Async(ApiSpec),
    Graphql(GraphqlSchema),
    Protobuf(ProtoFile),
}

impl ApiDocument {
    pub fn name(&self) -> &str {
        match self {
            ApiDocument::Rest(spec) | ApiDocument::Async(spec) => &spec.name,
            ApiDocument::Graphql(schema) => &schema.name,
            ApiDocument::Protobuf(file) => file.label(),
        }
    }

    pub fn version(&self) -> &str {
        match self {
            ApiDocument::Rest(spec) | ApiDocument::Async(spec) => &spec.version,
            ApiDocument::Graphql(schema) => &schema.version,
            ApiDocument::Protobuf(file) => &file.version,
        }
    }

    pub fn protocol(&self) -> Protocol {
        match self {
            ApiDocument::Rest(spec) => spec.protocol,
            ApiDocument::Async(_) => Protocol::Async,
            ApiDocument::Graphql(_) => Protocol::Graphql,
            ApiDocument::Protobuf(_) => Protocol::Grpc,
        }
    }
}
