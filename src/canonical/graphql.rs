//! GraphQL schema graph: types, fields, arguments and root operations.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphqlSchema {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub types: Vec<GraphqlType>,
    #[serde(default)]
    pub queries: Vec<GraphqlOperation>,
    #[serde(default)]
    pub mutations: Vec<GraphqlOperation>,
    #[serde(default)]
    pub subscriptions: Vec<GraphqlOperation>,
}

impl GraphqlSchema {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, ty: GraphqlType) -> Self {
        self.types.push(ty);
        self
    }

    /// Adds an operation to the root list matching its kind.
    pub fn with_operation(mut self, operation: GraphqlOperation) -> Self {
        match operation.kind {
            OperationKind::Query => self.queries.push(operation),
            OperationKind::Mutation => self.mutations.push(operation),
            OperationKind::Subscription => self.subscriptions.push(operation),
        }
        self
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    #[default]
    Object,
    InputObject,
    Interface,
    Union,
    Enum,
    Scalar,
}

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TypeKind::Object => "OBJECT",
            TypeKind::InputObject => "INPUT_OBJECT",
            TypeKind::Interface => "INTERFACE",
            TypeKind::Union => "UNION",
            TypeKind::Enum => "ENUM",
            TypeKind::Scalar => "SCALAR",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlType {
    pub name: String,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub fields: Vec<GraphqlField>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub possible_types: Vec<String>,
    #[serde(default)]
    pub enum_values: Vec<String>,
}

impl GraphqlType {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    pub fn with_field(mut self, field: GraphqlField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_interfaces(mut self, interfaces: &[&str]) -> Self {
        self.interfaces = interfaces.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_possible_types(mut self, members: &[&str]) -> Self {
        self.possible_types = members.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_enum_values(mut self, values: &[&str]) -> Self {
        self.enum_values = values.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// A type reference such as `String`, `[User!]` or `ID!`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypeRef {
    pub name: String,
    /// Outer non-null marker.
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub list: bool,
    #[serde(default)]
    pub list_item_required: bool,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn non_null(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
            ..Default::default()
        }
    }

    pub fn list_of(name: impl Into<String>, item_required: bool, required: bool) -> Self {
        Self {
            name: name.into(),
            required,
            list: true,
            list_item_required: item_required,
        }
    }

    /// The type without its outer nullability, e.g. `[User!]` for `[User!]!`.
    pub fn shape(&self) -> String {
        if self.list {
            let bang = if self.list_item_required { "!" } else { "" };
            format!("[{}{bang}]", self.name)
        } else {
            self.name.clone()
        }
    }

    /// Full SDL signature including outer nullability.
    pub fn signature(&self) -> String {
        if self.required {
            format!("{}!", self.shape())
        } else {
            self.shape()
        }
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.signature())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: TypeRef,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub arguments: Vec<GraphqlArgument>,
}

impl GraphqlField {
    pub fn new(name: impl Into<String>, field_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            field_type,
            ..Default::default()
        }
    }

    pub fn with_argument(mut self, argument: GraphqlArgument) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlArgument {
    pub name: String,
    #[serde(rename = "type")]
    pub arg_type: TypeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl GraphqlArgument {
    pub fn new(name: impl Into<String>, arg_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            arg_type,
            default_value: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn required(&self) -> bool {
        self.arg_type.required
    }

    /// Callers must supply a value: non-null and nothing to fall back on.
    pub fn is_mandatory(&self) -> bool {
        self.required() && self.default_value.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    #[default]
    Query,
    Mutation,
    Subscription,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OperationKind::Query => "Query",
            OperationKind::Mutation => "Mutation",
            OperationKind::Subscription => "Subscription",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlOperation {
    pub name: String,
    #[serde(default)]
    pub kind: OperationKind,
    pub return_type: TypeRef,
    #[serde(default)]
    pub arguments: Vec<GraphqlArgument>,
    #[serde(default)]
    pub deprecated: bool,
}

impl GraphqlOperation {
    pub fn new(name: impl Into<String>, kind: OperationKind, return_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            kind,
            return_type,
            ..Default::default()
        }
    }

    pub fn with_argument(mut self, argument: GraphqlArgument) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ref_signatures() {
        assert_eq!(TypeRef::named("String").signature(), "String");
        assert_eq!(TypeRef::non_null("ID").signature(), "ID!");
        assert_eq!(TypeRef::list_of("User", true, true).signature(), "[User!]!");
        assert_eq!(TypeRef::list_of("User", true, true).shape(), "[User!]");
        assert_eq!(TypeRef::list_of("User", false, false).signature(), "[User]");
    }

    #[test]
    fn test_mandatory_argument() {
        let arg = GraphqlArgument::new("first", TypeRef::non_null("Int"));
        assert!(arg.is_mandatory());
        assert!(!arg.clone().with_default("10").is_mandatory());
        assert!(!GraphqlArgument::new("after", TypeRef::named("String")).is_mandatory());
    }
}
