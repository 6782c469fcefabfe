//! Shared building blocks for every comparator: keyed matching and
//! set-membership diffs.

use crate::compat::categories::ChangeCategory;
use crate::compat::types::{Change, ChangeType, Severity};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Outcome of matching two collections by identity key.
///
/// `added` follows new-side order, `removed` follows old-side order and
/// `matched` follows new-side order, so emitted changes are deterministic.
#[derive(Debug)]
pub struct KeyedDiff<'a, T> {
    pub added: Vec<&'a T>,
    pub removed: Vec<&'a T>,
    pub matched: Vec<(&'a T, &'a T)>,
}

impl<T> KeyedDiff<'_, T> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.matched.is_empty()
    }
}

/// Matches `old` against `new` by the key `key` extracts.
///
/// When a key repeats on one side, the first occurrence wins and later ones
/// are ignored; canonical models are expected to have unique keys.
pub fn diff_by_key<'a, T, K, I, F>(old: I, new: I, key: F) -> KeyedDiff<'a, T>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let old: Vec<&T> = dedup_by_key(old, &key);
    let new: Vec<&T> = dedup_by_key(new, &key);

    let old_index: HashMap<K, &T> = old.iter().map(|&item| (key(item), item)).collect();
    let new_keys: HashSet<K> = new.iter().map(|&item| key(item)).collect();

    let mut diff = KeyedDiff {
        added: Vec::new(),
        removed: Vec::new(),
        matched: Vec::new(),
    };

    for &item in &new {
        match old_index.get(&key(item)) {
            Some(&previous) => diff.matched.push((previous, item)),
            None => diff.added.push(item),
        }
    }
    for &item in &old {
        if !new_keys.contains(&key(item)) {
            diff.removed.push(item);
        }
    }

    diff
}

fn dedup_by_key<'a, T, K, I, F>(items: I, key: &F) -> Vec<&'a T>
where
    I: IntoIterator<Item = &'a T>,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|&item| seen.insert(key(item)))
        .collect()
}

/// Diffs a list of plain names (enum values, union members, interfaces):
/// additions are INFO, removals BREAKING.
pub fn diff_members(
    old: &[String],
    new: &[String],
    category: ChangeCategory,
    container: &str,
    noun: &str,
) -> Vec<Change> {
    let diff = diff_by_key(old, new, |s: &String| s.clone());
    let mut changes = Vec::new();

    for value in diff.added {
        changes.push(
            Change::new(
                ChangeType::Added,
                category,
                Severity::Info,
                format!("{container}.{value}"),
                format!("{noun} '{value}' added to '{container}'"),
            )
            .with_values(None, Some(text(value))),
        );
    }
    for value in diff.removed {
        changes.push(
            Change::new(
                ChangeType::Removed,
                category,
                Severity::Breaking,
                format!("{container}.{value}"),
                format!("{noun} '{value}' removed from '{container}'"),
            )
            .with_values(Some(text(value)), None),
        );
    }

    changes
}

/// Emits the change for a deprecation flag flip, if any.
///
/// Newly deprecated is a WARNING; an element coming back from deprecation is
/// INFO.
pub fn deprecation_change(
    old: bool,
    new: bool,
    category: ChangeCategory,
    path: &str,
    noun: &str,
) -> Option<Change> {
    match (old, new) {
        (false, true) => Some(
            Change::new(
                ChangeType::Deprecated,
                category,
                Severity::Warning,
                path,
                format!("{noun} '{path}' is now deprecated"),
            )
            .with_values(Some(Value::Bool(false)), Some(Value::Bool(true))),
        ),
        (true, false) => Some(
            Change::new(
                ChangeType::Modified,
                category,
                Severity::Info,
                path,
                format!("{noun} '{path}' is no longer deprecated"),
            )
            .with_values(Some(Value::Bool(true)), Some(Value::Bool(false))),
        ),
        _ => None,
    }
}

/// The single synthetic change emitted when one side of a comparison does
/// not exist at all. Returns `None` when both sides are present or both
/// absent.
pub fn presence_change(
    old: Option<&str>,
    new: Option<&str>,
    category: ChangeCategory,
    noun: &str,
) -> Option<Change> {
    match (old, new) {
        (None, Some(name)) => Some(
            Change::new(
                ChangeType::Added,
                category,
                Severity::Info,
                name,
                format!("{noun} '{name}' added"),
            )
            .with_values(None, Some(text(name))),
        ),
        (Some(name), None) => Some(
            Change::new(
                ChangeType::Removed,
                category,
                Severity::Breaking,
                name,
                format!("{noun} '{name}' removed"),
            )
            .with_values(Some(text(name)), None),
        ),
        _ => None,
    }
}

/// Opaque JSON string value for `old_value`/`new_value`.
pub fn text(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn opt_text(s: Option<&str>) -> Option<Value> {
    s.map(text)
}

/// Renders an optional value for change descriptions.
pub fn display_opt(s: Option<&str>) -> &str {
    s.unwrap_or("<none>")
}
