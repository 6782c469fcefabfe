//! Structural comparator for protobuf files.
//!
//! Fields are matched by name. The field number is the wire identity, so
//! renumbering is reported on its own, and a removed field whose number is
//! taken over by an added, wire-compatible field is reported as a rename.
//! Type references are resolved against each file's own package.

use crate::canonical::{
    FieldRule, ProtoEnum, ProtoEnumValue, ProtoField, ProtoFile, ProtoMessage, ProtoService,
    RpcMethod,
};
use crate::compat::categories::ChangeCategory;
use crate::compat::handlers::{
    deprecation_change, diff_by_key, display_opt, opt_text, presence_change, text,
};
use crate::compat::types::{Change, ChangeType, Severity};
use crate::compatibility::WireCompat;
use serde_json::Value;
use tracing::debug;

/// Compares two optional files; a missing side yields one synthetic change.
pub fn compare_proto_files(old: Option<&ProtoFile>, new: Option<&ProtoFile>) -> Vec<Change> {
    match (old, new) {
        (Some(old), Some(new)) => compare_proto(old, new),
        _ => presence_change(
            old.map(ProtoFile::label),
            new.map(ProtoFile::label),
            ChangeCategory::Package,
            "Protobuf file",
        )
        .into_iter()
        .collect(),
    }
}

/// Compares package and syntax, then services, messages and top-level enums.
pub fn compare_proto(old: &ProtoFile, new: &ProtoFile) -> Vec<Change> {
    let mut changes = Vec::new();

    if old.package != new.package {
        let path = display_opt(new.package.as_deref()).to_string();
        changes.push(
            Change::new(
                ChangeType::Modified,
                ChangeCategory::Package,
                Severity::Breaking,
                &path,
                format!(
                    "Package changed from '{}' to '{}'",
                    display_opt(old.package.as_deref()),
                    display_opt(new.package.as_deref())
                ),
            )
            .with_values(
                opt_text(old.package.as_deref()),
                opt_text(new.package.as_deref()),
            ),
        );
    }
    if old.syntax != new.syntax {
        changes.push(
            Change::new(
                ChangeType::Modified,
                ChangeCategory::Package,
                Severity::Warning,
                new.label(),
                format!("Syntax changed from '{}' to '{}'", old.syntax, new.syntax),
            )
            .with_values(Some(text(&old.syntax)), Some(text(&new.syntax))),
        );
    }

    let wire = WireCompat::between(old, new);
    changes.extend(compare_services(old, new, &wire));
    changes.extend(compare_messages("", &old.messages, &new.messages, &wire));
    changes.extend(compare_enums("", &old.enums, &new.enums));

    debug!(
        file = %new.label(),
        old_messages = old.messages.len(),
        new_messages = new.messages.len(),
        changes = changes.len(),
        "compared protobuf files"
    );
    changes
}

fn scoped(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}.{name}")
    }
}

// ========================================
// Services and RPCs
// ========================================

fn compare_services(
    old_file: &ProtoFile,
    new_file: &ProtoFile,
    wire: &WireCompat<'_>,
) -> Vec<Change> {
    let mut changes = Vec::new();
    let diff = diff_by_key(&old_file.services, &new_file.services, |s: &ProtoService| {
        s.name.clone()
    });

    for service in diff.added {
        let path = new_file.qualify(&service.name);
        changes.push(
            Change::new(
                ChangeType::Added,
                ChangeCategory::Service,
                Severity::Info,
                &path,
                format!("Service '{path}' added"),
            )
            .with_values(None, Some(text(&path))),
        );
    }

    for service in diff.removed {
        let path = old_file.qualify(&service.name);
        changes.push(
            Change::new(
                ChangeType::Removed,
                ChangeCategory::Service,
                Severity::Breaking,
                &path,
                format!("Service '{path}' removed"),
            )
            .with_values(Some(text(&path)), None),
        );
    }

    for (old_service, new_service) in diff.matched {
        let service_path = new_file.qualify(&new_service.name);
        changes.extend(compare_methods(
            &service_path,
            &old_service.methods,
            &new_service.methods,
            wire,
        ));
    }

    changes
}

fn compare_methods(
    service: &str,
    old: &[RpcMethod],
    new: &[RpcMethod],
    wire: &WireCompat<'_>,
) -> Vec<Change> {
    let mut changes = Vec::new();
    let diff = diff_by_key(old, new, |m: &RpcMethod| m.name.clone());

    for method in diff.added {
        let path = rpc_path(service, &method.name);
        changes.push(
            Change::new(
                ChangeType::Added,
                ChangeCategory::RpcMethod,
                Severity::Info,
                &path,
                format!("RPC '{path}' added"),
            )
            .with_values(None, Some(text(&signature(method)))),
        );
    }

    for method in diff.removed {
        let path = rpc_path(service, &method.name);
        changes.push(
            Change::new(
                ChangeType::Removed,
                ChangeCategory::RpcMethod,
                Severity::Breaking,
                &path,
                format!("RPC '{path}' removed"),
            )
            .with_values(Some(text(&signature(method))), None),
        );
    }

    for (old_method, new_method) in diff.matched {
        let path = rpc_path(service, &new_method.name);
        changes.extend(compare_method(&path, old_method, new_method, wire));
    }

    changes
}

fn compare_method(
    path: &str,
    old: &RpcMethod,
    new: &RpcMethod,
    wire: &WireCompat<'_>,
) -> Vec<Change> {
    let mut changes = Vec::new();

    if !wire.same_type(&old.input_type, &new.input_type) {
        changes.push(
            Change::new(
                ChangeType::Modified,
                ChangeCategory::RpcMethod,
                Severity::Breaking,
                path,
                format!(
                    "RPC '{path}' input type changed from '{}' to '{}'",
                    old.input_type, new.input_type
                ),
            )
            .with_values(Some(text(&old.input_type)), Some(text(&new.input_type))),
        );
    }
    if !wire.same_type(&old.output_type, &new.output_type) {
        changes.push(
            Change::new(
                ChangeType::Modified,
                ChangeCategory::RpcMethod,
                Severity::Breaking,
                path,
                format!(
                    "RPC '{path}' output type changed from '{}' to '{}'",
                    old.output_type, new.output_type
                ),
            )
            .with_values(Some(text(&old.output_type)), Some(text(&new.output_type))),
        );
    }

    let (old_mode, new_mode) = (old.streaming_mode(), new.streaming_mode());
    if old_mode != new_mode {
        changes.push(
            Change::new(
                ChangeType::Modified,
                ChangeCategory::StreamingType,
                Severity::Breaking,
                path,
                format!("RPC '{path}' changed from {old_mode} to {new_mode}"),
            )
            .with_values(
                Some(text(&old_mode.to_string())),
                Some(text(&new_mode.to_string())),
            ),
        );
    }

    if let Some(change) =
        deprecation_change(old.deprecated, new.deprecated, ChangeCategory::RpcMethod, path, "RPC")
    {
        changes.push(change);
    }

    changes
}

fn rpc_path(service: &str, method: &str) -> String {
    format!("/{service}/{method}")
}

fn signature(method: &RpcMethod) -> String {
    format!("({}) returns ({})", method.input_type, method.output_type)
}

// ========================================
// Messages and fields
// ========================================

fn compare_messages(
    scope: &str,
    old: &[ProtoMessage],
    new: &[ProtoMessage],
    wire: &WireCompat<'_>,
) -> Vec<Change> {
    let mut changes = Vec::new();
    let diff = diff_by_key(old, new, |m: &ProtoMessage| m.name.clone());

    for message in diff.added {
        let path = scoped(scope, &message.name);
        changes.push(
            Change::new(
                ChangeType::Added,
                ChangeCategory::Message,
                Severity::Info,
                &path,
                format!("Message '{path}' added"),
            )
            .with_values(None, Some(text(&path))),
        );
    }

    for message in diff.removed {
        let path = scoped(scope, &message.name);
        changes.push(
            Change::new(
                ChangeType::Removed,
                ChangeCategory::Message,
                Severity::Breaking,
                &path,
                format!("Message '{path}' removed"),
            )
            .with_values(Some(text(&path)), None),
        );
    }

    for (old_message, new_message) in diff.matched {
        let path = scoped(scope, &new_message.name);
        changes.extend(compare_fields(&path, &old_message.fields, &new_message.fields, wire));
        changes.extend(compare_messages(
            &path,
            &old_message.nested_messages,
            &new_message.nested_messages,
            wire,
        ));
        changes.extend(compare_enums(
            &path,
            &old_message.nested_enums,
            &new_message.nested_enums,
        ));
    }

    changes
}

fn compare_fields(
    message: &str,
    old: &[ProtoField],
    new: &[ProtoField],
    wire: &WireCompat<'_>,
) -> Vec<Change> {
    let mut changes = Vec::new();
    let diff = diff_by_key(old, new, |f: &ProtoField| f.name.clone());

    // Pair removed fields with added fields that took over their number.
    let mut renames: Vec<(&ProtoField, &ProtoField)> = Vec::new();
    let mut added = diff.added;
    let mut removed = Vec::new();
    for old_field in diff.removed {
        let successor = added.iter().position(|new_field| {
            new_field.number == old_field.number
                && wire.are_types_wire_compatible(&old_field.type_name, &new_field.type_name)
        });
        match successor {
            Some(index) => renames.push((old_field, added.remove(index))),
            None => removed.push(old_field),
        }
    }

    for field in added {
        let path = scoped(message, &field.name);
        changes.push(
            Change::new(
                ChangeType::Added,
                ChangeCategory::Field,
                Severity::Info,
                &path,
                format!("Field '{path}' ({} = {}) added", field.type_name, field.number),
            )
            .with_values(None, Some(text(&field.type_name))),
        );
    }

    for field in removed {
        let path = scoped(message, &field.name);
        changes.push(
            Change::new(
                ChangeType::Removed,
                ChangeCategory::Field,
                Severity::Breaking,
                &path,
                format!("Field '{path}' ({} = {}) removed", field.type_name, field.number),
            )
            .with_values(Some(text(&field.type_name)), None),
        );
    }

    // A rename keeps the number, but the rest of the declaration may still
    // have changed.
    for (old_field, new_field) in renames {
        let path = scoped(message, &new_field.name);
        changes.push(
            Change::new(
                ChangeType::Modified,
                ChangeCategory::Field,
                Severity::Warning,
                &path,
                format!(
                    "Field '{}' renamed to '{}' (number {})",
                    scoped(message, &old_field.name),
                    new_field.name,
                    new_field.number
                ),
            )
            .with_values(Some(text(&old_field.name)), Some(text(&new_field.name))),
        );
        changes.extend(compare_field_shape(&path, old_field, new_field, wire));
    }

    for (old_field, new_field) in diff.matched {
        let path = scoped(message, &new_field.name);
        changes.extend(compare_field(&path, old_field, new_field, wire));
    }

    changes
}

fn compare_field(
    path: &str,
    old: &ProtoField,
    new: &ProtoField,
    wire: &WireCompat<'_>,
) -> Vec<Change> {
    let mut changes = Vec::new();

    if old.number != new.number {
        changes.push(
            Change::new(
                ChangeType::Modified,
                ChangeCategory::FieldNumber,
                Severity::Breaking,
                path,
                format!(
                    "Field '{path}' number changed from {} to {}",
                    old.number, new.number
                ),
            )
            .with_values(Some(Value::from(old.number)), Some(Value::from(new.number))),
        );
    }

    changes.extend(compare_field_shape(path, old, new, wire));
    changes
}

/// Everything about a field declaration except its name and number: type,
/// map entry types, cardinality and deprecation.
fn compare_field_shape(
    path: &str,
    old: &ProtoField,
    new: &ProtoField,
    wire: &WireCompat<'_>,
) -> Vec<Change> {
    let mut changes = Vec::new();

    if old.is_map() && new.is_map() {
        changes.extend(map_entry_change(
            path,
            "key",
            old.map_key_type.as_deref(),
            new.map_key_type.as_deref(),
            wire,
        ));
        changes.extend(map_entry_change(
            path,
            "value",
            old.map_value_type.as_deref(),
            new.map_value_type.as_deref(),
            wire,
        ));
    } else {
        if !wire.same_type(&old.type_name, &new.type_name) {
            let severity = if old.is_map() == new.is_map()
                && wire.are_types_wire_compatible(&old.type_name, &new.type_name)
            {
                Severity::Warning
            } else {
                Severity::Breaking
            };
            let qualifier = if severity == Severity::Warning {
                "wire-compatible"
            } else {
                "wire-incompatible"
            };
            changes.push(
                Change::new(
                    ChangeType::Modified,
                    ChangeCategory::Field,
                    severity,
                    path,
                    format!(
                        "Field '{path}' type changed from '{}' to '{}' ({qualifier})",
                        old.type_name, new.type_name
                    ),
                )
                .with_values(Some(text(&old.type_name)), Some(text(&new.type_name))),
            );
        }
        if let Some(change) = cardinality_change(path, old.rule, new.rule) {
            changes.push(change);
        }
    }

    if let Some(change) =
        deprecation_change(old.deprecated, new.deprecated, ChangeCategory::Field, path, "Field")
    {
        changes.push(change);
    }

    changes
}

fn map_entry_change(
    path: &str,
    part: &str,
    old: Option<&str>,
    new: Option<&str>,
    wire: &WireCompat<'_>,
) -> Option<Change> {
    let unchanged = match (old, new) {
        (Some(old), Some(new)) => wire.same_type(old, new),
        (None, None) => true,
        _ => false,
    };
    if unchanged {
        return None;
    }
    Some(
        Change::new(
            ChangeType::Modified,
            ChangeCategory::Field,
            Severity::Breaking,
            path,
            format!(
                "Map {part} type of '{path}' changed from '{}' to '{}'",
                display_opt(old),
                display_opt(new)
            ),
        )
        .with_values(opt_text(old), opt_text(new)),
    )
}

/// Repeated and scalar encodings do not mix, and a reader that now requires
/// a field rejects payloads without it.
fn cardinality_change(path: &str, old: FieldRule, new: FieldRule) -> Option<Change> {
    if old == new {
        return None;
    }
    let severity = match (old, new) {
        (FieldRule::Repeated, _) | (_, FieldRule::Repeated) => Severity::Breaking,
        (_, FieldRule::Required) => Severity::Breaking,
        (FieldRule::Required, _) => Severity::Dangerous,
        // singular <-> optional only changes presence tracking
        _ => Severity::Warning,
    };
    Some(
        Change::new(
            ChangeType::Modified,
            ChangeCategory::Field,
            severity,
            path,
            format!("Field '{path}' cardinality changed from {old} to {new}"),
        )
        .with_values(Some(text(&old.to_string())), Some(text(&new.to_string()))),
    )
}

// ========================================
// Enums
// ========================================

fn compare_enums(scope: &str, old: &[ProtoEnum], new: &[ProtoEnum]) -> Vec<Change> {
    let mut changes = Vec::new();
    let diff = diff_by_key(old, new, |e: &ProtoEnum| e.name.clone());

    for en in diff.added {
        let path = scoped(scope, &en.name);
        changes.push(
            Change::new(
                ChangeType::Added,
                ChangeCategory::Type,
                Severity::Info,
                &path,
                format!("Enum '{path}' added"),
            )
            .with_values(None, Some(text(&path))),
        );
    }

    for en in diff.removed {
        let path = scoped(scope, &en.name);
        changes.push(
            Change::new(
                ChangeType::Removed,
                ChangeCategory::Type,
                Severity::Breaking,
                &path,
                format!("Enum '{path}' removed"),
            )
            .with_values(Some(text(&path)), None),
        );
    }

    for (old_enum, new_enum) in diff.matched {
        let path = scoped(scope, &new_enum.name);
        let values = diff_by_key(&old_enum.values, &new_enum.values, |v: &ProtoEnumValue| {
            v.name.clone()
        });

        for value in values.added {
            let value_path = scoped(&path, &value.name);
            changes.push(
                Change::new(
                    ChangeType::Added,
                    ChangeCategory::EnumValue,
                    Severity::Info,
                    &value_path,
                    format!("Enum value '{value_path}' = {} added", value.number),
                )
                .with_values(None, Some(Value::from(value.number))),
            );
        }
        for value in values.removed {
            let value_path = scoped(&path, &value.name);
            changes.push(
                Change::new(
                    ChangeType::Removed,
                    ChangeCategory::EnumValue,
                    Severity::Breaking,
                    &value_path,
                    format!("Enum value '{value_path}' = {} removed", value.number),
                )
                .with_values(Some(Value::from(value.number)), None),
            );
        }
        for (old_value, new_value) in values.matched {
            if old_value.number != new_value.number {
                let value_path = scoped(&path, &new_value.name);
                changes.push(
                    Change::new(
                        ChangeType::Modified,
                        ChangeCategory::EnumValue,
                        Severity::Breaking,
                        &value_path,
                        format!(
                            "Enum value '{value_path}' renumbered from {} to {}",
                            old_value.number, new_value.number
                        ),
                    )
                    .with_values(
                        Some(Value::from(old_value.number)),
                        Some(Value::from(new_value.number)),
                    ),
                );
            }
        }
    }

    changes
}
