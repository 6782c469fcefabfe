//! Structural comparator for GraphQL schema graphs.

use crate::canonical::{GraphqlArgument, GraphqlField, GraphqlOperation, GraphqlSchema, GraphqlType};
use crate::compat::categories::ChangeCategory;
use crate::compat::handlers::{
    deprecation_change, diff_by_key, diff_members, display_opt, opt_text, presence_change, text,
};
use crate::compat::types::{Change, ChangeType, Severity};
use serde_json::Value;
use tracing::debug;

/// Compares two optional schemas; a missing side yields one synthetic change.
pub fn compare_graphql_schemas(
    old: Option<&GraphqlSchema>,
    new: Option<&GraphqlSchema>,
) -> Vec<Change> {
    match (old, new) {
        (Some(old), Some(new)) => compare_schema(old, new),
        _ => presence_change(
            old.map(|s| s.name.as_str()),
            new.map(|s| s.name.as_str()),
            ChangeCategory::Type,
            "GraphQL schema",
        )
        .into_iter()
        .collect(),
    }
}

/// Compares root operations (queries, mutations, subscriptions) and then types.
pub fn compare_schema(old: &GraphqlSchema, new: &GraphqlSchema) -> Vec<Change> {
    let mut changes = Vec::new();
    changes.extend(compare_operations(&old.queries, &new.queries));
    changes.extend(compare_operations(&old.mutations, &new.mutations));
    changes.extend(compare_operations(&old.subscriptions, &new.subscriptions));
    changes.extend(compare_types(&old.types, &new.types));
    debug!(
        schema = %new.name,
        old_types = old.types.len(),
        new_types = new.types.len(),
        changes = changes.len(),
        "compared graphql schemas"
    );
    changes
}

// ========================================
// Operations
// ========================================

pub fn compare_operations(old: &[GraphqlOperation], new: &[GraphqlOperation]) -> Vec<Change> {
    let mut changes = Vec::new();
    let diff = diff_by_key(old, new, |op: &GraphqlOperation| op.name.clone());

    for op in diff.added {
        let path = operation_path(op);
        changes.push(
            Change::new(
                ChangeType::Added,
                ChangeCategory::Endpoint,
                Severity::Info,
                &path,
                format!("{} '{}' added", op.kind, op.name),
            )
            .with_values(None, Some(text(&op.return_type.signature()))),
        );
    }

    for op in diff.removed {
        let path = operation_path(op);
        changes.push(
            Change::new(
                ChangeType::Removed,
                ChangeCategory::Endpoint,
                Severity::Breaking,
                &path,
                format!("{} '{}' removed", op.kind, op.name),
            )
            .with_values(Some(text(&op.return_type.signature())), None),
        );
    }

    for (old_op, new_op) in diff.matched {
        let path = operation_path(new_op);
        let (old_sig, new_sig) = (old_op.return_type.signature(), new_op.return_type.signature());
        if old_sig != new_sig {
            changes.push(
                Change::new(
                    ChangeType::Modified,
                    ChangeCategory::Endpoint,
                    Severity::Breaking,
                    &path,
                    format!(
                        "{} '{}' return type changed from '{old_sig}' to '{new_sig}'",
                        new_op.kind, new_op.name
                    ),
                )
                .with_values(Some(text(&old_sig)), Some(text(&new_sig))),
            );
        }
        if let Some(change) = deprecation_change(
            old_op.deprecated,
            new_op.deprecated,
            ChangeCategory::Endpoint,
            &path,
            "Operation",
        ) {
            changes.push(change);
        }
        changes.extend(compare_arguments(&path, &old_op.arguments, &new_op.arguments));
    }

    changes
}

fn operation_path(op: &GraphqlOperation) -> String {
    format!("{}.{}", op.kind, op.name)
}

// ========================================
// Types
// ========================================

pub fn compare_types(old: &[GraphqlType], new: &[GraphqlType]) -> Vec<Change> {
    let mut changes = Vec::new();
    let diff = diff_by_key(old, new, |t: &GraphqlType| t.name.clone());

    for ty in diff.added {
        changes.push(
            Change::new(
                ChangeType::Added,
                ChangeCategory::Type,
                Severity::Info,
                &ty.name,
                format!("Type '{}' ({}) added", ty.name, ty.kind),
            )
            .with_values(None, Some(text(&ty.kind.to_string()))),
        );
    }

    for ty in diff.removed {
        changes.push(
            Change::new(
                ChangeType::Removed,
                ChangeCategory::Type,
                Severity::Breaking,
                &ty.name,
                format!("Type '{}' ({}) removed", ty.name, ty.kind),
            )
            .with_values(Some(text(&ty.kind.to_string())), None),
        );
    }

    for (old_ty, new_ty) in diff.matched {
        changes.extend(compare_type(old_ty, new_ty));
    }

    changes
}

/// Compares one type present in both versions.
pub fn compare_type(old: &GraphqlType, new: &GraphqlType) -> Vec<Change> {
    let name = &new.name;

    if old.kind != new.kind {
        return vec![
            Change::new(
                ChangeType::Modified,
                ChangeCategory::Type,
                Severity::Breaking,
                name,
                format!("Type '{name}' changed kind from {} to {}", old.kind, new.kind),
            )
            .with_values(
                Some(text(&old.kind.to_string())),
                Some(text(&new.kind.to_string())),
            ),
        ];
    }

    let mut changes = compare_fields(name, &old.fields, &new.fields);
    changes.extend(diff_members(
        &old.enum_values,
        &new.enum_values,
        ChangeCategory::EnumValue,
        name,
        "Enum value",
    ));
    changes.extend(diff_members(
        &old.possible_types,
        &new.possible_types,
        ChangeCategory::UnionMember,
        name,
        "Union member",
    ));
    changes.extend(diff_members(
        &old.interfaces,
        &new.interfaces,
        ChangeCategory::Interface,
        name,
        "Interface",
    ));
    changes
}

// ========================================
// Fields
// ========================================

pub fn compare_fields(type_name: &str, old: &[GraphqlField], new: &[GraphqlField]) -> Vec<Change> {
    let mut changes = Vec::new();
    let diff = diff_by_key(old, new, |f: &GraphqlField| f.name.clone());

    for field in diff.added {
        let path = format!("{type_name}.{}", field.name);
        changes.push(
            Change::new(
                ChangeType::Added,
                ChangeCategory::Field,
                Severity::Info,
                &path,
                format!("Field '{path}' ({}) added", field.field_type),
            )
            .with_values(None, Some(text(&field.field_type.signature()))),
        );
    }

    for field in diff.removed {
        let path = format!("{type_name}.{}", field.name);
        changes.push(
            Change::new(
                ChangeType::Removed,
                ChangeCategory::Field,
                Severity::Breaking,
                &path,
                format!("Field '{path}' ({}) removed", field.field_type),
            )
            .with_values(Some(text(&field.field_type.signature())), None),
        );
    }

    for (old_field, new_field) in diff.matched {
        let path = format!("{type_name}.{}", new_field.name);
        changes.extend(compare_field(&path, old_field, new_field));
    }

    changes
}

fn compare_field(path: &str, old: &GraphqlField, new: &GraphqlField) -> Vec<Change> {
    let mut changes = Vec::new();
    let (old_ty, new_ty) = (&old.field_type, &new.field_type);

    if old_ty.shape() != new_ty.shape() {
        changes.push(
            Change::new(
                ChangeType::Modified,
                ChangeCategory::Field,
                Severity::Breaking,
                path,
                format!("Field '{path}' type changed from '{old_ty}' to '{new_ty}'"),
            )
            .with_values(Some(text(&old_ty.signature())), Some(text(&new_ty.signature()))),
        );
    } else if old_ty.required != new_ty.required {
        let (severity, description) = if new_ty.required {
            (Severity::Dangerous, format!("Field '{path}' changed from nullable to non-null"))
        } else {
            (Severity::Warning, format!("Field '{path}' changed from non-null to nullable"))
        };
        changes.push(
            Change::new(ChangeType::Modified, ChangeCategory::Field, severity, path, description)
                .with_values(Some(text(&old_ty.signature())), Some(text(&new_ty.signature()))),
        );
    }

    if let Some(change) =
        deprecation_change(old.deprecated, new.deprecated, ChangeCategory::Field, path, "Field")
    {
        changes.push(change);
    }

    changes.extend(compare_arguments(path, &old.arguments, &new.arguments));
    changes
}

// ========================================
// Arguments
// ========================================

pub fn compare_arguments(
    owner: &str,
    old: &[GraphqlArgument],
    new: &[GraphqlArgument],
) -> Vec<Change> {
    let mut changes = Vec::new();
    let diff = diff_by_key(old, new, |a: &GraphqlArgument| a.name.clone());

    for arg in diff.added {
        let path = argument_path(owner, &arg.name);
        let change = if arg.is_mandatory() {
            Change::new(
                ChangeType::Added,
                ChangeCategory::Parameter,
                Severity::Breaking,
                &path,
                format!("Required argument '{}' ({}) added to '{owner}'", arg.name, arg.arg_type),
            )
        } else {
            Change::new(
                ChangeType::Added,
                ChangeCategory::Parameter,
                Severity::Info,
                &path,
                format!("Optional argument '{}' ({}) added to '{owner}'", arg.name, arg.arg_type),
            )
        };
        changes.push(change.with_values(None, Some(text(&arg.arg_type.signature()))));
    }

    for arg in diff.removed {
        changes.push(
            Change::new(
                ChangeType::Removed,
                ChangeCategory::Parameter,
                Severity::Dangerous,
                argument_path(owner, &arg.name),
                format!("Argument '{}' removed from '{owner}'", arg.name),
            )
            .with_values(Some(text(&arg.arg_type.signature())), None),
        );
    }

    for (old_arg, new_arg) in diff.matched {
        changes.extend(compare_argument(&argument_path(owner, &new_arg.name), old_arg, new_arg));
    }

    changes
}

fn compare_argument(path: &str, old: &GraphqlArgument, new: &GraphqlArgument) -> Vec<Change> {
    let mut changes = Vec::new();
    let (old_ty, new_ty) = (&old.arg_type, &new.arg_type);

    if old_ty.shape() != new_ty.shape() {
        changes.push(
            Change::new(
                ChangeType::Modified,
                ChangeCategory::Parameter,
                Severity::Breaking,
                path,
                format!("Argument '{path}' type changed from '{old_ty}' to '{new_ty}'"),
            )
            .with_values(Some(text(&old_ty.signature())), Some(text(&new_ty.signature()))),
        );
    }

    match (old.is_mandatory(), new.is_mandatory()) {
        (false, true) => changes.push(
            Change::new(
                ChangeType::Modified,
                ChangeCategory::Parameter,
                Severity::Breaking,
                path,
                format!("Argument '{path}' is now required"),
            )
            .with_values(Some(Value::Bool(false)), Some(Value::Bool(true))),
        ),
        (true, false) => changes.push(
            Change::new(
                ChangeType::Modified,
                ChangeCategory::Parameter,
                Severity::Info,
                path,
                format!("Argument '{path}' is now optional"),
            )
            .with_values(Some(Value::Bool(true)), Some(Value::Bool(false))),
        ),
        _ => {}
    }

    if old.default_value != new.default_value {
        changes.push(
            Change::new(
                ChangeType::Modified,
                ChangeCategory::Parameter,
                Severity::Dangerous,
                path,
                format!(
                    "Argument '{path}' default changed from '{}' to '{}'",
                    display_opt(old.default_value.as_deref()),
                    display_opt(new.default_value.as_deref())
                ),
            )
            .with_values(
                opt_text(old.default_value.as_deref()),
                opt_text(new.default_value.as_deref()),
            ),
        );
    }

    changes
}

fn argument_path(owner: &str, name: &str) -> String {
    format!("{owner}({name})")
}
