//! Structural comparator for the endpoint view (REST and gRPC-as-endpoints).

use crate::canonical::{ApiSpec, Endpoint};
use crate::compat::categories::ChangeCategory;
use crate::compat::field_rules::{compare_parameters, compare_request_body, compare_responses};
use crate::compat::handlers::{deprecation_change, diff_by_key, presence_change, text};
use crate::compat::schema_rules::compare_schemas;
use crate::compat::types::{Change, ChangeType, Severity};
use tracing::debug;

/// Compares two optional specifications. A missing side yields a single
/// synthetic ADDED or REMOVED change for the whole API.
pub fn compare_api_specs(old: Option<&ApiSpec>, new: Option<&ApiSpec>) -> Vec<Change> {
    match (old, new) {
        (Some(old), Some(new)) => compare_specs(old, new),
        _ => presence_change(
            old.map(|s| s.name.as_str()),
            new.map(|s| s.name.as_str()),
            ChangeCategory::Endpoint,
            "API",
        )
        .into_iter()
        .collect(),
    }
}

/// Compares endpoints first, then component schemas.
pub fn compare_specs(old: &ApiSpec, new: &ApiSpec) -> Vec<Change> {
    let mut changes = compare_endpoints(&old.endpoints, &new.endpoints);
    changes.extend(compare_schemas(&old.schemas, &new.schemas));
    debug!(
        api = %new.name,
        old_endpoints = old.endpoints.len(),
        new_endpoints = new.endpoints.len(),
        changes = changes.len(),
        "compared endpoint specs"
    );
    changes
}

/// Emits added endpoints, then removed ones, then per-endpoint modifications
/// in new-spec order.
pub fn compare_endpoints(old: &[Endpoint], new: &[Endpoint]) -> Vec<Change> {
    let mut changes = Vec::new();
    let diff = diff_by_key(old, new, Endpoint::key);

    for endpoint in diff.added {
        let label = endpoint_label(endpoint);
        changes.push(
            Change::new(
                ChangeType::Added,
                ChangeCategory::Endpoint,
                Severity::Info,
                &label,
                format!("Endpoint {label} added"),
            )
            .with_values(None, Some(text(&endpoint.key()))),
        );
    }

    for endpoint in diff.removed {
        let label = endpoint_label(endpoint);
        changes.push(
            Change::new(
                ChangeType::Removed,
                ChangeCategory::Endpoint,
                Severity::Breaking,
                &label,
                format!("Endpoint {label} removed"),
            )
            .with_values(Some(text(&endpoint.key())), None),
        );
    }

    for (old_endpoint, new_endpoint) in diff.matched {
        changes.extend(compare_endpoint(old_endpoint, new_endpoint));
    }

    changes
}

/// Compares one endpoint present in both versions.
pub fn compare_endpoint(old: &Endpoint, new: &Endpoint) -> Vec<Change> {
    let mut changes = Vec::new();
    let label = endpoint_label(new);

    // Matching is keyed on method and path, so these two only fire if the
    // caller pairs endpoints some other way.
    if old.path != new.path {
        changes.push(
            Change::new(
                ChangeType::Modified,
                ChangeCategory::Endpoint,
                Severity::Breaking,
                &label,
                format!("Path changed from {} to {}", old.path, new.path),
            )
            .with_values(Some(text(&old.path)), Some(text(&new.path))),
        );
    }
    if !old.method.eq_ignore_ascii_case(&new.method) {
        changes.push(
            Change::new(
                ChangeType::Modified,
                ChangeCategory::Endpoint,
                Severity::Breaking,
                &label,
                format!("Method changed from {} to {} for {}", old.method, new.method, new.path),
            )
            .with_values(Some(text(&old.method)), Some(text(&new.method))),
        );
    }

    if let Some(change) = deprecation_change(
        old.deprecated,
        new.deprecated,
        ChangeCategory::Endpoint,
        &label,
        "Endpoint",
    ) {
        changes.push(change);
    }

    changes.extend(compare_parameters(&label, &old.parameters, &new.parameters));
    changes.extend(compare_request_body(
        &label,
        old.request_body.as_ref(),
        new.request_body.as_ref(),
    ));
    changes.extend(compare_responses(&label, &old.responses, &new.responses));

    changes
}

/// Human locator for an endpoint, e.g. `GET /api/users`.
pub fn endpoint_label(endpoint: &Endpoint) -> String {
    format!("{} {}", endpoint.method.to_uppercase(), endpoint.path)
}
