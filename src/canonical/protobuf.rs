//! Protobuf file graph: services, messages, fields and enums.

use crate::canonical::rest::{ApiSpec, Endpoint, Protocol, RequestBody, Response};
use serde::{Deserialize, Serialize};

/// Represents the comparison-relevant content of a .proto file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProtoFile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub syntax: String, // "proto2", "proto3", "editions"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default)]
    pub services: Vec<ProtoService>,
    #[serde(default)]
    pub messages: Vec<ProtoMessage>,
    #[serde(default)]
    pub enums: Vec<ProtoEnum>,
}

impl ProtoFile {
    pub fn new(package: Option<&str>) -> Self {
        Self {
            syntax: "proto3".to_string(),
            package: package.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn with_message(mut self, message: ProtoMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_service(mut self, service: ProtoService) -> Self {
        self.services.push(service);
        self
    }

    pub fn with_enum(mut self, en: ProtoEnum) -> Self {
        self.enums.push(en);
        self
    }

    /// Display name of the file: its explicit name, else its package.
    pub fn label(&self) -> &str {
        match self.package.as_deref() {
            Some(pkg) if self.name.is_empty() => pkg,
            _ => &self.name,
        }
    }

    /// Resolves a type reference relative to this file's package, so
    /// `.acme.v1.User` in package `acme.v1` reads as `User`. References into
    /// other packages keep their qualified name without the leading dot.
    pub fn local_type_name<'a>(&self, type_name: &'a str) -> &'a str {
        let unrooted = type_name.strip_prefix('.').unwrap_or(type_name);
        match self.package.as_deref() {
            Some(pkg) if !pkg.is_empty() => unrooted
                .strip_prefix(pkg)
                .and_then(|rest| rest.strip_prefix('.'))
                .unwrap_or(unrooted),
            _ => unrooted,
        }
    }

    /// Fully qualified service name, e.g. `acme.v1.UserService`.
    pub fn qualify(&self, name: &str) -> String {
        match self.package.as_deref() {
            Some(pkg) if !pkg.is_empty() => format!("{pkg}.{name}"),
            _ => name.to_string(),
        }
    }

    /// Projects the services of this file onto the endpoint view, mapping
    /// every RPC to `POST /pkg.Service/Method`.
    pub fn to_api_spec(&self) -> ApiSpec {
        let mut spec = ApiSpec::new(self.label(), self.version.clone(), Protocol::Grpc);
        for service in &self.services {
            let service_name = self.qualify(&service.name);
            for method in &service.methods {
                let mut endpoint = Endpoint::new("POST", format!("/{service_name}/{}", method.name))
                    .with_request_body(RequestBody::new(
                        "application/grpc",
                        Some(&method.input_type),
                        true,
                    ))
                    .with_response(Response::new(
                        "200",
                        Some("application/grpc"),
                        Some(&method.output_type),
                    ));
                endpoint.operation_id = Some(method.name.clone());
                endpoint.deprecated = method.deprecated;
                spec.endpoints.push(endpoint);
            }
        }
        spec
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProtoService {
    pub name: String,
    #[serde(default)]
    pub methods: Vec<RpcMethod>,
}

impl ProtoService {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    pub fn with_method(mut self, method: RpcMethod) -> Self {
        self.methods.push(method);
        self
    }
}

/// Represents a method within a service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RpcMethod {
    pub name: String,
    pub input_type: String,
    pub output_type: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub client_streaming: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub server_streaming: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
}

impl RpcMethod {
    pub fn unary(
        name: impl Into<String>,
        input_type: impl Into<String>,
        output_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            input_type: input_type.into(),
            output_type: output_type.into(),
            ..Default::default()
        }
    }

    pub fn streaming(mut self, client: bool, server: bool) -> Self {
        self.client_streaming = client;
        self.server_streaming = server;
        self
    }

    pub fn streaming_mode(&self) -> StreamingMode {
        match (self.client_streaming, self.server_streaming) {
            (false, false) => StreamingMode::Unary,
            (true, false) => StreamingMode::ClientStreaming,
            (false, true) => StreamingMode::ServerStreaming,
            (true, true) => StreamingMode::Bidirectional,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamingMode {
    Unary,
    ClientStreaming,
    ServerStreaming,
    Bidirectional,
}

impl std::fmt::Display for StreamingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StreamingMode::Unary => "unary",
            StreamingMode::ClientStreaming => "client streaming",
            StreamingMode::ServerStreaming => "server streaming",
            StreamingMode::Bidirectional => "bidirectional streaming",
        };
        write!(f, "{s}")
    }
}

/// Represents a Protobuf message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProtoMessage {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<ProtoField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested_messages: Vec<ProtoMessage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested_enums: Vec<ProtoEnum>,
}

impl ProtoMessage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_field(mut self, field: ProtoField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_nested_message(mut self, message: ProtoMessage) -> Self {
        self.nested_messages.push(message);
        self
    }

    pub fn with_nested_enum(mut self, en: ProtoEnum) -> Self {
        self.nested_enums.push(en);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldRule {
    #[default]
    Singular,
    Optional,
    Required,
    Repeated,
}

impl std::fmt::Display for FieldRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FieldRule::Singular => "singular",
            FieldRule::Optional => "optional",
            FieldRule::Required => "required",
            FieldRule::Repeated => "repeated",
        };
        write!(f, "{s}")
    }
}

/// Represents a field within a Protobuf message.
/// The wire identity of a field is its `number`, not its name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProtoField {
    pub name: String,
    pub number: i32,
    pub type_name: String,
    #[serde(default)]
    pub rule: FieldRule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_key_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_value_type: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
}

impl ProtoField {
    pub fn new(name: impl Into<String>, number: i32, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number,
            type_name: type_name.into(),
            ..Default::default()
        }
    }

    pub fn with_rule(mut self, rule: FieldRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn map(name: impl Into<String>, number: i32, key: &str, value: &str) -> Self {
        Self {
            name: name.into(),
            number,
            type_name: format!("map<{key}, {value}>"),
            rule: FieldRule::Repeated,
            map_key_type: Some(key.to_string()),
            map_value_type: Some(value.to_string()),
            deprecated: false,
        }
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn is_map(&self) -> bool {
        self.map_key_type.is_some() || self.map_value_type.is_some()
    }
}

/// Represents a Protobuf enum.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProtoEnum {
    pub name: String,
    #[serde(default)]
    pub values: Vec<ProtoEnumValue>,
}

impl ProtoEnum {
    pub fn new(name: impl Into<String>, values: &[(&str, i32)]) -> Self {
        Self {
            name: name.into(),
            values: values
                .iter()
                .map(|(name, number)| ProtoEnumValue {
                    name: name.to_string(),
                    number: *number,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProtoEnumValue {
    pub name: String,
    pub number: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streaming_mode() {
        let m = RpcMethod::unary("Chat", "Msg", "Msg");
        assert_eq!(m.streaming_mode(), StreamingMode::Unary);
        assert_eq!(m.clone().streaming(true, true).streaming_mode(), StreamingMode::Bidirectional);
        assert_eq!(m.streaming(false, true).streaming_mode(), StreamingMode::ServerStreaming);
    }

    #[test]
    fn test_label_prefers_name_over_package() {
        let mut file = ProtoFile::new(Some("acme.v1"));
        assert_eq!(file.label(), "acme.v1");
        file.name = "users".into();
        assert_eq!(file.label(), "users");
        assert_eq!(ProtoFile::new(None).label(), "");
    }

    #[test]
    fn test_local_type_name() {
        let file = ProtoFile::new(Some("acme.v1"));
        assert_eq!(file.local_type_name(".acme.v1.User"), "User");
        assert_eq!(file.local_type_name(".acme.v1.User.Address"), "User.Address");
        assert_eq!(file.local_type_name(".acme.v10.User"), "acme.v10.User");
        assert_eq!(file.local_type_name(".google.protobuf.Timestamp"), "google.protobuf.Timestamp");
        assert_eq!(file.local_type_name("int64"), "int64");
        assert_eq!(ProtoFile::new(None).local_type_name(".User"), "User");
    }

    #[test]
    fn test_grpc_projection_uses_service_path() {
        let file = ProtoFile::new(Some("acme.v1")).with_service(
            ProtoService::new("UserService").with_method(RpcMethod::unary(
                "GetUser",
                ".acme.v1.GetUserRequest",
                ".acme.v1.User",
            )),
        );
        let spec = file.to_api_spec();
        assert_eq!(spec.protocol, Protocol::Grpc);
        assert_eq!(spec.endpoints.len(), 1);
        assert_eq!(spec.endpoints[0].key(), "POST:/acme.v1.UserService/GetUser");
        assert_eq!(
            spec.endpoints[0].responses[0].schema_ref.as_deref(),
            Some(".acme.v1.User")
        );
    }
}
