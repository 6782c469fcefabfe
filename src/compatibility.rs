//! Wire-level compatibility of protobuf field types.
//!
//! Two field types are wire-compatible when bytes written with one can be read
//! with the other. That is decided by the wire encoding, not the declared type.

use crate::canonical::{ProtoEnum, ProtoFile, ProtoMessage};
use std::collections::HashSet;

/// Encoding family a protobuf field type is serialized with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WireGroup {
    /// int32, int64, uint32, uint64, bool and enum types
    Varint,
    /// sint32, sint64
    ZigZag,
    /// fixed32, sfixed32
    Fixed32,
    /// fixed64, sfixed64
    Fixed64,
    /// string, bytes
    LengthDelimited,
    Float,
    Double,
    /// Every message type is only compatible with itself.
    Message(String),
}

impl WireGroup {
    /// Classifies a field type. Names that are neither scalars nor known
    /// enums are treated as message types.
    pub fn of(type_name: &str, enums: &EnumIndex) -> Self {
        match type_name {
            "int32" | "int64" | "uint32" | "uint64" | "bool" => WireGroup::Varint,
            "sint32" | "sint64" => WireGroup::ZigZag,
            "fixed32" | "sfixed32" => WireGroup::Fixed32,
            "fixed64" | "sfixed64" => WireGroup::Fixed64,
            "string" | "bytes" => WireGroup::LengthDelimited,
            "float" => WireGroup::Float,
            "double" => WireGroup::Double,
            other if enums.contains(other) => WireGroup::Varint,
            other => WireGroup::Message(other.trim_start_matches('.').to_string()),
        }
    }
}

/// Every name an enum of a file can be referenced by: bare, scoped within
/// its enclosing messages, and fully qualified with the package.
#[derive(Debug, Default)]
pub struct EnumIndex {
    names: HashSet<String>,
}

impl EnumIndex {
    pub fn from_file(file: &ProtoFile) -> Self {
        let mut index = EnumIndex::default();
        let package = file.package.as_deref().unwrap_or_default();
        index.add_enums(package, "", &file.enums);
        for message in &file.messages {
            index.add_message(package, "", message);
        }
        index
    }

    fn add_message(&mut self, package: &str, scope: &str, message: &ProtoMessage) {
        let scope = join(scope, &message.name);
        self.add_enums(package, &scope, &message.nested_enums);
        for nested in &message.nested_messages {
            self.add_message(package, &scope, nested);
        }
    }

    fn add_enums(&mut self, package: &str, scope: &str, enums: &[ProtoEnum]) {
        for en in enums {
            let scoped = join(scope, &en.name);
            self.names.insert(en.name.clone());
            self.names.insert(join(package, &scoped));
            self.names.insert(scoped);
        }
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.names.contains(type_name.trim_start_matches('.'))
    }
}

fn join(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}.{name}")
    }
}

/// Resolves field types of two file versions, each against its own package
/// and enums, so a package rename does not change what a local type means.
#[derive(Debug)]
pub struct WireCompat<'a> {
    old_file: &'a ProtoFile,
    new_file: &'a ProtoFile,
    old: EnumIndex,
    new: EnumIndex,
}

impl<'a> WireCompat<'a> {
    pub fn between(old: &'a ProtoFile, new: &'a ProtoFile) -> Self {
        Self {
            old_file: old,
            new_file: new,
            old: EnumIndex::from_file(old),
            new: EnumIndex::from_file(new),
        }
    }

    /// Returns true when both references name the same type once resolved
    /// against their own file's package.
    pub fn same_type(&self, old_type: &str, new_type: &str) -> bool {
        self.old_file.local_type_name(old_type) == self.new_file.local_type_name(new_type)
    }

    /// Returns true when a field declared as `old_type` can be redeclared as
    /// `new_type` without invalidating already-serialized payloads.
    pub fn are_types_wire_compatible(&self, old_type: &str, new_type: &str) -> bool {
        if self.same_type(old_type, new_type) {
            return true;
        }
        let old_group = WireGroup::of(self.old_file.local_type_name(old_type), &self.old);
        let new_group = WireGroup::of(self.new_file.local_type_name(new_type), &self.new);
        old_group == new_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::{ProtoEnum, ProtoField, ProtoMessage};

    fn file() -> ProtoFile {
        ProtoFile::new(Some("acme.v1"))
            .with_enum(ProtoEnum::new("Status", &[("UNKNOWN", 0), ("ACTIVE", 1)]))
            .with_message(
                ProtoMessage::new("User")
                    .with_field(ProtoField::new("id", 1, "int64"))
                    .with_nested_enum(ProtoEnum::new("Role", &[("GUEST", 0)])),
            )
    }

    #[test]
    fn test_scalar_groups() {
        let enums = EnumIndex::default();
        assert_eq!(WireGroup::of("int32", &enums), WireGroup::of("uint64", &enums));
        assert_eq!(WireGroup::of("bool", &enums), WireGroup::Varint);
        assert_eq!(WireGroup::of("sint32", &enums), WireGroup::of("sint64", &enums));
        assert_ne!(WireGroup::of("sint32", &enums), WireGroup::of("int32", &enums));
        assert_eq!(WireGroup::of("string", &enums), WireGroup::of("bytes", &enums));
        assert_ne!(WireGroup::of("float", &enums), WireGroup::of("double", &enums));
        assert_ne!(WireGroup::of("fixed32", &enums), WireGroup::of("fixed64", &enums));
    }

    #[test]
    fn test_enums_are_varint() {
        let index = EnumIndex::from_file(&file());
        assert!(index.contains("Status"));
        assert!(index.contains(".acme.v1.Status"));
        assert!(index.contains(".acme.v1.User.Role"));
        assert!(index.contains("User.Role"));
        assert_eq!(WireGroup::of(".acme.v1.Status", &index), WireGroup::Varint);
    }

    #[test]
    fn test_messages_only_match_themselves() {
        let file = file();
        let compat = WireCompat::between(&file, &file);
        assert!(compat.are_types_wire_compatible(".acme.v1.User", ".acme.v1.User"));
        assert!(!compat.are_types_wire_compatible(".acme.v1.User", ".acme.v1.Account"));
        assert!(compat.are_types_wire_compatible("int32", "Status"));
        assert!(!compat.are_types_wire_compatible("string", "int32"));
    }

    #[test]
    fn test_types_resolve_against_their_own_package() {
        let old = file();
        let mut new = file();
        new.package = Some("acme.v2".into());
        let compat = WireCompat::between(&old, &new);

        assert!(compat.same_type(".acme.v1.User", ".acme.v2.User"));
        assert!(compat.are_types_wire_compatible(".acme.v1.User", ".acme.v2.User"));
        assert!(compat.are_types_wire_compatible(".acme.v1.Status", "int32"));
        assert!(!compat.same_type(".acme.v1.User", ".acme.v1.User"));
        assert!(!compat.are_types_wire_compatible(".acme.v1.User", ".acme.v2.Account"));
    }
}
