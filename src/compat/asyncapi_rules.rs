//! Structural comparator for AsyncAPI channel operations.
//!
//! Operations live in the endpoint view with the action (PUBLISH, SUBSCRIBE,
//! SEND, RECEIVE) as method and the channel as path. The message payload sits
//! where a REST request body would.

use crate::canonical::{ApiSpec, Endpoint};
use crate::compat::categories::ChangeCategory;
use crate::compat::endpoint_rules::endpoint_label;
use crate::compat::field_rules::{compare_message_payload, compare_parameters, compare_responses};
use crate::compat::handlers::{deprecation_change, diff_by_key, presence_change, text};
use crate::compat::schema_rules::compare_schemas;
use crate::compat::types::{Change, ChangeType, Severity};
use tracing::debug;

pub fn compare_async_specs(old: Option<&ApiSpec>, new: Option<&ApiSpec>) -> Vec<Change> {
    match (old, new) {
        (Some(old), Some(new)) => compare_async(old, new),
        _ => presence_change(
            old.map(|s| s.name.as_str()),
            new.map(|s| s.name.as_str()),
            ChangeCategory::Endpoint,
            "AsyncAPI",
        )
        .into_iter()
        .collect(),
    }
}

/// Compares channel operations, then component message schemas.
pub fn compare_async(old: &ApiSpec, new: &ApiSpec) -> Vec<Change> {
    let mut changes = compare_operations(&old.endpoints, &new.endpoints);
    changes.extend(compare_schemas(&old.schemas, &new.schemas));
    debug!(
        api = %new.name,
        old_operations = old.endpoints.len(),
        new_operations = new.endpoints.len(),
        changes = changes.len(),
        "compared asyncapi specs"
    );
    changes
}

fn compare_operations(old: &[Endpoint], new: &[Endpoint]) -> Vec<Change> {
    let mut changes = Vec::new();
    let diff = diff_by_key(old, new, Endpoint::key);

    for operation in diff.added {
        let label = endpoint_label(operation);
        changes.push(
            Change::new(
                ChangeType::Added,
                ChangeCategory::Endpoint,
                Severity::Info,
                &label,
                format!("Channel operation {label} added"),
            )
            .with_values(None, Some(text(&operation.key()))),
        );
    }

    for operation in diff.removed {
        let label = endpoint_label(operation);
        changes.push(
            Change::new(
                ChangeType::Removed,
                ChangeCategory::Endpoint,
                Severity::Breaking,
                &label,
                format!("Channel operation {label} removed"),
            )
            .with_values(Some(text(&operation.key())), None),
        );
    }

    for (old_operation, new_operation) in diff.matched {
        let label = endpoint_label(new_operation);
        if let Some(change) = deprecation_change(
            old_operation.deprecated,
            new_operation.deprecated,
            ChangeCategory::Endpoint,
            &label,
            "Channel operation",
        ) {
            changes.push(change);
        }
        changes.extend(compare_parameters(
            &label,
            &old_operation.parameters,
            &new_operation.parameters,
        ));
        changes.extend(compare_message_payload(
            &label,
            old_operation.request_body.as_ref(),
            new_operation.request_body.as_ref(),
        ));
        changes.extend(compare_responses(
            &label,
            &old_operation.responses,
            &new_operation.responses,
        ));
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::{Protocol, RequestBody};

    fn spec(endpoints: Vec<Endpoint>) -> ApiSpec {
        let mut spec = ApiSpec::new("events", "1.0.0", Protocol::Async);
        spec.endpoints = endpoints;
        spec
    }

    fn signed_up(schema: &str) -> Endpoint {
        Endpoint::new("SEND", "user/signedup").with_request_body(RequestBody::new(
            "application/json",
            Some(schema),
            true,
        ))
    }

    #[test]
    fn test_removed_channel_operation_is_breaking() {
        let old = spec(vec![signed_up("UserSignedUp"), Endpoint::new("RECEIVE", "user/deleted")]);
        let new = spec(vec![signed_up("UserSignedUp")]);
        let changes = compare_async(&old, &new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path(), "RECEIVE user/deleted");
        assert_eq!(changes[0].severity(), Severity::Breaking);
    }

    #[test]
    fn test_action_is_part_of_identity() {
        let old = spec(vec![Endpoint::new("SEND", "orders")]);
        let new = spec(vec![Endpoint::new("RECEIVE", "orders")]);
        let changes = compare_async(&old, &new);
        let kinds: Vec<_> = changes.iter().map(|c| c.change_type()).collect();
        assert_eq!(kinds, vec![ChangeType::Added, ChangeType::Removed]);
    }

    #[test]
    fn test_payload_schema_change_uses_body_policy() {
        let old = spec(vec![signed_up("UserSignedUp")]);
        let new = spec(vec![signed_up("UserRegistered")]);
        let changes = compare_async(&old, &new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].category(), ChangeCategory::RequestBody);
        assert_eq!(changes[0].severity(), Severity::Dangerous);
        assert_eq!(changes[0].path(), "SEND user/signedup#message");
    }
}
