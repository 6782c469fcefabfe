//! Change categories: which kind of API element a change touches.

use serde::{Deserialize, Serialize};

/// Closed set of element categories every change is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeCategory {
    Endpoint,
    Parameter,
    RequestBody,
    Response,
    Schema,
    Field,
    Type,
    EnumValue,
    UnionMember,
    Interface,
    Service,
    RpcMethod,
    Message,
    FieldNumber,
    StreamingType,
    Package,
}

impl ChangeCategory {
    /// Get the string identifier for this category
    pub fn id(&self) -> &'static str {
        match self {
            ChangeCategory::Endpoint => "ENDPOINT",
            ChangeCategory::Parameter => "PARAMETER",
            ChangeCategory::RequestBody => "REQUEST_BODY",
            ChangeCategory::Response => "RESPONSE",
            ChangeCategory::Schema => "SCHEMA",
            ChangeCategory::Field => "FIELD",
            ChangeCategory::Type => "TYPE",
            ChangeCategory::EnumValue => "ENUM_VALUE",
            ChangeCategory::UnionMember => "UNION_MEMBER",
            ChangeCategory::Interface => "INTERFACE",
            ChangeCategory::Service => "SERVICE",
            ChangeCategory::RpcMethod => "RPC_METHOD",
            ChangeCategory::Message => "MESSAGE",
            ChangeCategory::FieldNumber => "FIELD_NUMBER",
            ChangeCategory::StreamingType => "STREAMING_TYPE",
            ChangeCategory::Package => "PACKAGE",
        }
    }

    /// Get the description for this category
    pub fn description(&self) -> &'static str {
        match self {
            ChangeCategory::Endpoint => {
                "Operations addressable by method and path, or GraphQL root fields."
            }
            ChangeCategory::Parameter => "Request parameters and GraphQL arguments.",
            ChangeCategory::RequestBody => "Request payloads and AsyncAPI message payloads.",
            ChangeCategory::Response => "Responses keyed by status code.",
            ChangeCategory::Schema => "Named component schemas.",
            ChangeCategory::Field => "Schema properties, GraphQL fields and protobuf fields.",
            ChangeCategory::Type => "GraphQL types and protobuf enum definitions.",
            ChangeCategory::EnumValue => "Members of an enumeration.",
            ChangeCategory::UnionMember => "Possible types of a GraphQL union.",
            ChangeCategory::Interface => "Interfaces implemented by a GraphQL type.",
            ChangeCategory::Service => "gRPC services.",
            ChangeCategory::RpcMethod => "gRPC methods and their request/response types.",
            ChangeCategory::Message => "Protobuf messages.",
            ChangeCategory::FieldNumber => "Protobuf field numbers, the wire identity of a field.",
            ChangeCategory::StreamingType => {
                "Unary/client/server/bidirectional streaming mode of an RPC."
            }
            ChangeCategory::Package => "Protobuf package and file-level settings.",
        }
    }

    /// Parse category from string ID, ignoring ASCII case
    pub fn from_id(id: &str) -> Option<Self> {
        Self::all().into_iter().find(|c| c.id().eq_ignore_ascii_case(id))
    }

    /// Get all available categories
    pub fn all() -> Vec<Self> {
        vec![
            ChangeCategory::Endpoint,
            ChangeCategory::Parameter,
            ChangeCategory::RequestBody,
            ChangeCategory::Response,
            ChangeCategory::Schema,
            ChangeCategory::Field,
            ChangeCategory::Type,
            ChangeCategory::EnumValue,
            ChangeCategory::UnionMember,
            ChangeCategory::Interface,
            ChangeCategory::Service,
            ChangeCategory::RpcMethod,
            ChangeCategory::Message,
            ChangeCategory::FieldNumber,
            ChangeCategory::StreamingType,
            ChangeCategory::Package,
        ]
    }
}

impl std::fmt::Display for ChangeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl std::str::FromStr for ChangeCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s).ok_or_else(|| format!("Unknown change category: {s}"))
    }
}
