//! Paths from a document root to a node, and the walks over them.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::Kind;

/// One step from a container to a child.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Key(key) => f.write_str(key),
            PathStep::Index(idx) => write!(f, "{idx}"),
        }
    }
}

impl From<&str> for PathStep {
    fn from(key: &str) -> Self {
        PathStep::Key(key.to_owned())
    }
}

impl From<String> for PathStep {
    fn from(key: String) -> Self {
        PathStep::Key(key)
    }
}

impl From<usize> for PathStep {
    fn from(idx: usize) -> Self {
        PathStep::Index(idx)
    }
}

/// Resolve `path` inside `value`.
///
/// A key step only matches an object and an index step only matches an
/// array; anything else is a miss.
pub fn value_at_path<'a>(value: &'a Value, path: &[PathStep]) -> Option<&'a Value> {
    let mut cur = value;
    for step in path {
        cur = match (step, cur) {
            (PathStep::Key(key), Value::Object(map)) => map.get(key)?,
            (PathStep::Index(idx), Value::Array(arr)) => arr.get(*idx)?,
            _ => return None,
        };
    }
    Some(cur)
}

/// Mutable counterpart of [`value_at_path`].
pub fn value_at_path_mut<'a>(value: &'a mut Value, path: &[PathStep]) -> Option<&'a mut Value> {
    let mut cur = value;
    for step in path {
        cur = match (step, cur) {
            (PathStep::Key(key), Value::Object(map)) => map.get_mut(key)?,
            (PathStep::Index(idx), Value::Array(arr)) => arr.get_mut(*idx)?,
            _ => return None,
        };
    }
    Some(cur)
}

/// Write `value` at `branch` below `node`, creating objects on the way.
///
/// `node` itself and every intermediate value that is not an object is
/// replaced by an empty object. An empty branch replaces `node`.
pub fn assign_path<S: AsRef<str>>(node: &mut Value, branch: &[S], value: Value) {
    let Some((leaf, parents)) = branch.split_last() else {
        *node = value;
        return;
    };
    let mut current = coerce_object(node, None);
    for step in parents {
        let step = step.as_ref();
        let child = current
            .entry(step.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        current = coerce_object(child, Some(step));
    }
    current.insert(leaf.as_ref().to_owned(), value);
}

fn coerce_object<'a>(value: &'a mut Value, key: Option<&str>) -> &'a mut Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => {
            tracing::debug!(
                key = key.unwrap_or(""),
                found = %Kind::of(other),
                "set_path overwriting non-object with an empty object"
            );
            *other = Value::Object(Map::new());
            coerce_object(other, key)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn steps(raw: &[&str]) -> Vec<PathStep> {
        raw.iter()
            .map(|s| match s.parse::<usize>() {
                Ok(idx) => PathStep::Index(idx),
                Err(_) => PathStep::from(*s),
            })
            .collect()
    }

    #[test]
    fn resolves_mixed_key_and_index_steps() {
        let doc = json!({"foo": {"bar": [10, 20, null]}});
        assert_eq!(value_at_path(&doc, &steps(&["foo", "bar", "0"])), Some(&json!(10)));
        assert_eq!(value_at_path(&doc, &steps(&["foo", "bar", "2"])), Some(&Value::Null));
        assert_eq!(value_at_path(&doc, &steps(&["foo", "bar", "3"])), None);
        assert_eq!(value_at_path(&doc, &[]), Some(&doc));
    }

    #[test]
    fn key_step_does_not_index_arrays() {
        let doc = json!({"arr": [1, 2, 3]});
        let path = vec![PathStep::from("arr"), PathStep::from("0")];
        assert_eq!(value_at_path(&doc, &path), None);
    }

    #[test]
    fn mutable_walk_edits_in_place() {
        let mut doc = json!({"a": [{"b": 1}]});
        let path = steps(&["a", "0", "b"]);
        *value_at_path_mut(&mut doc, &path).expect("present") = json!(2);
        assert_eq!(doc, json!({"a": [{"b": 2}]}));
    }

    #[test]
    fn assign_creates_intermediate_objects() {
        let mut doc = json!({});
        assign_path(&mut doc, &["a", "b", "c"], json!(1));
        assert_eq!(doc, json!({"a": {"b": {"c": 1}}}));
    }

    #[test]
    fn assign_overwrites_non_objects_on_the_way() {
        let mut doc = json!({"a": 5, "keep": true});
        assign_path(&mut doc, &["a", "b"], json!("x"));
        assert_eq!(doc, json!({"a": {"b": "x"}, "keep": true}));

        let mut scalar = json!([1, 2]);
        assign_path(&mut scalar, &["k"], json!(null));
        assert_eq!(scalar, json!({"k": null}));
    }

    #[test]
    fn assign_empty_branch_replaces_node() {
        let mut doc = json!({"a": 1});
        assign_path::<&str>(&mut doc, &[], json!([true]));
        assert_eq!(doc, json!([true]));
    }

    #[test]
    fn step_display() {
        assert_eq!(PathStep::from("k").to_string(), "k");
        assert_eq!(PathStep::from(3usize).to_string(), "3");
    }
}
