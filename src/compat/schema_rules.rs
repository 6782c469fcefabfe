//! Generic schema comparator over a named-object bag of component schemas.

use crate::canonical::{SchemaDefinition, SchemaProperty};
use crate::compat::categories::ChangeCategory;
use crate::compat::handlers::{
    deprecation_change, diff_by_key, diff_members, display_opt, opt_text, text,
};
use crate::compat::types::{Change, ChangeType, Severity};
use serde_json::Value;

/// Compares two bags of named schemas.
pub fn compare_schemas(old: &[SchemaDefinition], new: &[SchemaDefinition]) -> Vec<Change> {
    let mut changes = Vec::new();
    let diff = diff_by_key(old, new, |s: &SchemaDefinition| s.name.clone());

    for schema in diff.added {
        changes.push(
            Change::new(
                ChangeType::Added,
                ChangeCategory::Schema,
                Severity::Info,
                &schema.name,
                format!("Schema '{}' added", schema.name),
            )
            .with_values(None, Some(text(&schema.kind.to_string()))),
        );
    }

    for schema in diff.removed {
        changes.push(
            Change::new(
                ChangeType::Removed,
                ChangeCategory::Schema,
                Severity::Breaking,
                &schema.name,
                format!("Schema '{}' removed", schema.name),
            )
            .with_values(Some(text(&schema.kind.to_string())), None),
        );
    }

    for (old_schema, new_schema) in diff.matched {
        changes.extend(compare_schema(old_schema, new_schema));
    }

    changes
}

/// Compares one schema present in both versions.
pub fn compare_schema(old: &SchemaDefinition, new: &SchemaDefinition) -> Vec<Change> {
    let name = &new.name;

    // A kind change invalidates everything below it; reporting property
    // diffs on top would only add noise.
    if old.kind != new.kind {
        return vec![
            Change::new(
                ChangeType::Modified,
                ChangeCategory::Schema,
                Severity::Breaking,
                name,
                format!("Schema '{name}' changed kind from {} to {}", old.kind, new.kind),
            )
            .with_values(
                Some(text(&old.kind.to_string())),
                Some(text(&new.kind.to_string())),
            ),
        ];
    }

    let mut changes = Vec::new();

    if old.format != new.format {
        changes.push(format_change(
            ChangeCategory::Schema,
            name,
            old.format.as_deref(),
            new.format.as_deref(),
        ));
    }
    if old.reference != new.reference {
        changes.push(reference_change(
            ChangeCategory::Schema,
            name,
            old.reference.as_deref(),
            new.reference.as_deref(),
        ));
    }
    if let Some(change) =
        deprecation_change(old.deprecated, new.deprecated, ChangeCategory::Schema, name, "Schema")
    {
        changes.push(change);
    }

    changes.extend(compare_properties(old, new));
    changes.extend(diff_members(
        &old.enum_values,
        &new.enum_values,
        ChangeCategory::EnumValue,
        name,
        "Enum value",
    ));

    changes
}

fn compare_properties(old: &SchemaDefinition, new: &SchemaDefinition) -> Vec<Change> {
    let mut changes = Vec::new();
    let diff = diff_by_key(&old.properties, &new.properties, |p: &SchemaProperty| p.name.clone());

    for property in diff.added {
        let path = format!("{}.{}", new.name, property.name);
        let change = if new.is_required(&property.name) {
            Change::new(
                ChangeType::Added,
                ChangeCategory::Field,
                Severity::Breaking,
                path,
                format!("Required property '{}' added to schema '{}'", property.name, new.name),
            )
        } else {
            Change::new(
                ChangeType::Added,
                ChangeCategory::Field,
                Severity::Info,
                path,
                format!("Optional property '{}' added to schema '{}'", property.name, new.name),
            )
        };
        changes.push(change.with_values(None, Some(text(&property.type_name))));
    }

    for property in diff.removed {
        let path = format!("{}.{}", old.name, property.name);
        let change = if old.is_required(&property.name) {
            Change::new(
                ChangeType::Removed,
                ChangeCategory::Field,
                Severity::Breaking,
                path,
                format!("Required property '{}' removed from schema '{}'", property.name, old.name),
            )
        } else {
            Change::new(
                ChangeType::Removed,
                ChangeCategory::Field,
                Severity::Dangerous,
                path,
                format!("Optional property '{}' removed from schema '{}'", property.name, old.name),
            )
        };
        changes.push(change.with_values(Some(text(&property.type_name)), None));
    }

    for (old_property, new_property) in diff.matched {
        let path = format!("{}.{}", new.name, new_property.name);

        let was_required = old.is_required(&old_property.name);
        let is_required = new.is_required(&new_property.name);
        if was_required != is_required {
            let description = if is_required {
                format!("Property '{path}' is now required")
            } else {
                format!("Property '{path}' is no longer required")
            };
            changes.push(
                Change::new(
                    ChangeType::Modified,
                    ChangeCategory::Field,
                    Severity::Breaking,
                    &path,
                    description,
                )
                .with_values(Some(Value::Bool(was_required)), Some(Value::Bool(is_required))),
            );
        }

        changes.extend(compare_property(&path, old_property, new_property));
    }

    changes
}

fn compare_property(path: &str, old: &SchemaProperty, new: &SchemaProperty) -> Vec<Change> {
    let mut changes = Vec::new();

    if old.type_name != new.type_name {
        changes.push(
            Change::new(
                ChangeType::Modified,
                ChangeCategory::Field,
                Severity::Breaking,
                path,
                format!(
                    "Property '{path}' type changed from '{}' to '{}'",
                    old.type_name, new.type_name
                ),
            )
            .with_values(Some(text(&old.type_name)), Some(text(&new.type_name))),
        );
    }
    if old.format != new.format {
        changes.push(format_change(
            ChangeCategory::Field,
            path,
            old.format.as_deref(),
            new.format.as_deref(),
        ));
    }
    if old.reference != new.reference {
        changes.push(reference_change(
            ChangeCategory::Field,
            path,
            old.reference.as_deref(),
            new.reference.as_deref(),
        ));
    }
    if let Some(change) =
        deprecation_change(old.deprecated, new.deprecated, ChangeCategory::Field, path, "Property")
    {
        changes.push(change);
    }

    changes
}

fn format_change(
    category: ChangeCategory,
    path: &str,
    old: Option<&str>,
    new: Option<&str>,
) -> Change {
    Change::new(
        ChangeType::Modified,
        category,
        Severity::Warning,
        path,
        format!(
            "Format of '{path}' changed from '{}' to '{}'",
            display_opt(old),
            display_opt(new)
        ),
    )
    .with_values(opt_text(old), opt_text(new))
}

fn reference_change(
    category: ChangeCategory,
    path: &str,
    old: Option<&str>,
    new: Option<&str>,
) -> Change {
    Change::new(
        ChangeType::Modified,
        category,
        Severity::Dangerous,
        path,
        format!(
            "Reference of '{path}' changed from '{}' to '{}'",
            display_opt(old),
            display_opt(new)
        ),
    )
    .with_values(opt_text(old), opt_text(new))
}
