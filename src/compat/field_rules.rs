//! Field-level comparators for the pieces of an endpoint: parameters,
//! request bodies and responses.
//!
//! These hold the compatibility policy for request/response shapes; the
//! structural comparators only decide which pairs to hand over.

use crate::canonical::{Parameter, RequestBody, Response};
use crate::compat::categories::ChangeCategory;
use crate::compat::handlers::{diff_by_key, display_opt, opt_text, text};
use crate::compat::types::{Change, ChangeType, Severity};
use serde_json::Value;

// ========================================
// Parameters
// ========================================

/// Compares the parameter lists of one endpoint, matched by name.
pub fn compare_parameters(endpoint: &str, old: &[Parameter], new: &[Parameter]) -> Vec<Change> {
    let mut changes = Vec::new();
    let diff = diff_by_key(old, new, |p: &Parameter| p.name.clone());

    for param in diff.added {
        let path = parameter_path(endpoint, &param.name);
        let change = if param.required {
            Change::new(
                ChangeType::Added,
                ChangeCategory::Parameter,
                Severity::Breaking,
                path,
                format!(
                    "Required parameter '{}' ({}) added to {endpoint}",
                    param.name, param.location
                ),
            )
        } else {
            Change::new(
                ChangeType::Added,
                ChangeCategory::Parameter,
                Severity::Info,
                path,
                format!(
                    "Optional parameter '{}' ({}) added to {endpoint}",
                    param.name, param.location
                ),
            )
        };
        changes.push(change.with_values(None, Some(text(&param.type_name))));
    }

    for param in diff.removed {
        changes.push(
            Change::new(
                ChangeType::Removed,
                ChangeCategory::Parameter,
                Severity::Dangerous,
                parameter_path(endpoint, &param.name),
                format!("Parameter '{}' removed from {endpoint}", param.name),
            )
            .with_values(Some(text(&param.type_name)), None),
        );
    }

    for (old_param, new_param) in diff.matched {
        changes.extend(compare_parameter(endpoint, old_param, new_param));
    }

    changes
}

/// Compares one parameter present in both versions.
pub fn compare_parameter(endpoint: &str, old: &Parameter, new: &Parameter) -> Vec<Change> {
    let mut changes = Vec::new();
    let path = parameter_path(endpoint, &new.name);

    if old.type_name != new.type_name {
        changes.push(
            Change::new(
                ChangeType::Modified,
                ChangeCategory::Parameter,
                Severity::Breaking,
                &path,
                format!(
                    "Parameter '{}' type changed from '{}' to '{}'",
                    new.name, old.type_name, new.type_name
                ),
            )
            .with_values(Some(text(&old.type_name)), Some(text(&new.type_name))),
        );
    }

    match (old.required, new.required) {
        (false, true) => changes.push(
            Change::new(
                ChangeType::Modified,
                ChangeCategory::Parameter,
                Severity::Breaking,
                &path,
                format!("Parameter '{}' changed from optional to required", new.name),
            )
            .with_values(Some(Value::Bool(false)), Some(Value::Bool(true))),
        ),
        (true, false) => changes.push(
            Change::new(
                ChangeType::Modified,
                ChangeCategory::Parameter,
                Severity::Info,
                &path,
                format!("Parameter '{}' changed from required to optional", new.name),
            )
            .with_values(Some(Value::Bool(true)), Some(Value::Bool(false))),
        ),
        _ => {}
    }

    if old.location != new.location {
        changes.push(
            Change::new(
                ChangeType::Modified,
                ChangeCategory::Parameter,
                Severity::Breaking,
                &path,
                format!(
                    "Parameter '{}' moved from {} to {}",
                    new.name, old.location, new.location
                ),
            )
            .with_values(
                Some(text(&old.location.to_string())),
                Some(text(&new.location.to_string())),
            ),
        );
    }

    if old.default_value != new.default_value {
        changes.push(
            Change::new(
                ChangeType::Modified,
                ChangeCategory::Parameter,
                Severity::Warning,
                &path,
                format!(
                    "Parameter '{}' default changed from '{}' to '{}'",
                    new.name,
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

fn parameter_path(endpoint: &str, name: &str) -> String {
    format!("{endpoint}#parameters.{name}")
}

// ========================================
// Request Bodies
// ========================================

/// Compares the optional request bodies of one endpoint.
pub fn compare_request_body(
    endpoint: &str,
    old: Option<&RequestBody>,
    new: Option<&RequestBody>,
) -> Vec<Change> {
    compare_body(endpoint, "requestBody", "Request body", old, new)
}

/// Compares the message payloads of one AsyncAPI channel operation. Payloads
/// follow the request body policy.
pub fn compare_message_payload(
    operation: &str,
    old: Option<&RequestBody>,
    new: Option<&RequestBody>,
) -> Vec<Change> {
    compare_body(operation, "message", "Message payload", old, new)
}

fn compare_body(
    endpoint: &str,
    anchor: &str,
    label: &str,
    old: Option<&RequestBody>,
    new: Option<&RequestBody>,
) -> Vec<Change> {
    let path = format!("{endpoint}#{anchor}");
    match (old, new) {
        (None, None) => Vec::new(),
        (None, Some(body)) => {
            let (severity, kind) = if body.required {
                (Severity::Breaking, "Required")
            } else {
                (Severity::Info, "Optional")
            };
            vec![
                Change::new(
                    ChangeType::Added,
                    ChangeCategory::RequestBody,
                    severity,
                    path,
                    format!(
                        "{kind} {} ({}) added to {endpoint}",
                        label.to_lowercase(),
                        body.content_type
                    ),
                )
                .with_values(None, opt_text(body.schema_ref.as_deref())),
            ]
        }
        (Some(body), None) => vec![
            Change::new(
                ChangeType::Removed,
                ChangeCategory::RequestBody,
                Severity::Dangerous,
                path,
                format!("{label} removed from {endpoint}"),
            )
            .with_values(opt_text(body.schema_ref.as_deref()), None),
        ],
        (Some(old), Some(new)) => compare_request_body_pair(&path, label, old, new),
    }
}

fn compare_request_body_pair(
    path: &str,
    label: &str,
    old: &RequestBody,
    new: &RequestBody,
) -> Vec<Change> {
    let mut changes = Vec::new();

    match (old.required, new.required) {
        (false, true) => changes.push(
            Change::new(
                ChangeType::Modified,
                ChangeCategory::RequestBody,
                Severity::Breaking,
                path,
                format!("{label} changed from optional to required"),
            )
            .with_values(Some(Value::Bool(false)), Some(Value::Bool(true))),
        ),
        (true, false) => changes.push(
            Change::new(
                ChangeType::Modified,
                ChangeCategory::RequestBody,
                Severity::Info,
                path,
                format!("{label} changed from required to optional"),
            )
            .with_values(Some(Value::Bool(true)), Some(Value::Bool(false))),
        ),
        _ => {}
    }

    if old.schema_ref != new.schema_ref {
        changes.push(schema_ref_change(
            ChangeCategory::RequestBody,
            path,
            label,
            old.schema_ref.as_deref(),
            new.schema_ref.as_deref(),
        ));
    }

    if old.content_type != new.content_type {
        changes.push(content_type_change(
            ChangeCategory::RequestBody,
            path,
            label,
            Some(&old.content_type),
            Some(&new.content_type),
        ));
    }

    changes
}

// ========================================
// Responses
// ========================================

/// Compares the responses of one endpoint, matched by status code.
pub fn compare_responses(endpoint: &str, old: &[Response], new: &[Response]) -> Vec<Change> {
    let mut changes = Vec::new();
    let diff = diff_by_key(old, new, |r: &Response| r.status_code.clone());

    for response in diff.added {
        changes.push(
            Change::new(
                ChangeType::Added,
                ChangeCategory::Response,
                Severity::Info,
                response_path(endpoint, &response.status_code),
                format!("Response {} added to {endpoint}", response.status_code),
            )
            .with_values(None, opt_text(response.schema_ref.as_deref())),
        );
    }

    for response in diff.removed {
        changes.push(
            Change::new(
                ChangeType::Removed,
                ChangeCategory::Response,
                Severity::Dangerous,
                response_path(endpoint, &response.status_code),
                format!("Response {} removed from {endpoint}", response.status_code),
            )
            .with_values(opt_text(response.schema_ref.as_deref()), None),
        );
    }

    for (old_response, new_response) in diff.matched {
        let path = response_path(endpoint, &new_response.status_code);
        let label = format!("Response {}", new_response.status_code);

        if old_response.schema_ref != new_response.schema_ref {
            changes.push(schema_ref_change(
                ChangeCategory::Response,
                &path,
                &label,
                old_response.schema_ref.as_deref(),
                new_response.schema_ref.as_deref(),
            ));
        }
        if old_response.content_type != new_response.content_type {
            changes.push(content_type_change(
                ChangeCategory::Response,
                &path,
                &label,
                old_response.content_type.as_deref(),
                new_response.content_type.as_deref(),
            ));
        }
    }

    changes
}

fn response_path(endpoint: &str, status: &str) -> String {
    format!("{endpoint}#responses.{status}")
}

// ========================================
// Shared
// ========================================

fn schema_ref_change(
    category: ChangeCategory,
    path: &str,
    label: &str,
    old: Option<&str>,
    new: Option<&str>,
) -> Change {
    Change::new(
        ChangeType::Modified,
        category,
        Severity::Dangerous,
        path,
        format!(
            "{label} schema changed from '{}' to '{}'",
            display_opt(old),
            display_opt(new)
        ),
    )
    .with_values(opt_text(old), opt_text(new))
}

fn content_type_change(
    category: ChangeCategory,
    path: &str,
    label: &str,
    old: Option<&str>,
    new: Option<&str>,
) -> Change {
    Change::new(
        ChangeType::Modified,
        category,
        Severity::Warning,
        path,
        format!(
            "{label} content type changed from '{}' to '{}'",
            display_opt(old),
            display_opt(new)
        ),
    )
    .with_values(opt_text(old), opt_text(new))
}
