//! Path navigation and slot mutation shared by apply and revert.
//!
//! Containers are shared handles, so navigation clones handles and mutates
//! through them; the target root sees every change.

use deepdelta_types::{Key, Path, Value};
use tracing::debug;

use crate::error::{PatchError, PatchResult};

/// Walk `root` through every segment of `path` except the last and return
/// the container that owns the final slot.
///
/// A missing or undefined intermediate is created on the way: a sequence
/// when the following segment is positional, a mapping otherwise.
pub(crate) fn parent_of(root: &Value, path: &Path) -> PatchResult<Value> {
    let keys = path.keys();
    let mut current = root.clone();
    let mut at = Path::root();

    for (i, key) in keys.iter().enumerate().take(keys.len().saturating_sub(1)) {
        let next = match current.get(key) {
            Some(child) if !child.is_undefined() => child,
            _ => {
                let fresh = if keys[i + 1].is_index() {
                    Value::empty_seq()
                } else {
                    Value::empty_map()
                };
                set_slot(&current, key, fresh.clone(), &at)?;
                debug!(
                    path = %at.clone().with(key.clone()),
                    kind = %fresh.kind(),
                    "created intermediate"
                );
                fresh
            }
        };
        at.push(key.clone());
        current = next;
    }
    Ok(current)
}

fn position(key: &Key, at: &Path) -> PatchResult<usize> {
    key.as_index().ok_or_else(|| PatchError::InvalidKey {
        path: at.clone(),
        key: key.clone(),
    })
}

fn not_a_container(container: &Value, at: &Path) -> PatchError {
    PatchError::NotAContainer {
        path: at.clone(),
        kind: container.kind(),
    }
}

/// Write `value` into `container` at `key`. Sequences grow as needed, with
/// `Undefined` filling any gap.
pub(crate) fn set_slot(container: &Value, key: &Key, value: Value, at: &Path) -> PatchResult<()> {
    match container {
        Value::Sequence(items) => {
            let index = position(key, at)?;
            let mut items = items.borrow_mut();
            if index >= items.len() {
                items.resize(index + 1, Value::Undefined);
            }
            items[index] = value;
            Ok(())
        }
        Value::Mapping(members) => {
            members.borrow_mut().insert(key.to_member(), value);
            Ok(())
        }
        other => Err(not_a_container(other, at)),
    }
}

/// Remove the slot at `key`. A sequence keeps its length: the element
/// becomes `Undefined`.
pub(crate) fn delete_slot(container: &Value, key: &Key, at: &Path) -> PatchResult<()> {
    match container {
        Value::Sequence(items) => {
            let index = position(key, at)?;
            if let Some(slot) = items.borrow_mut().get_mut(index) {
                *slot = Value::Undefined;
            }
            Ok(())
        }
        Value::Mapping(members) => {
            members.borrow_mut().shift_remove(&key.to_member());
            Ok(())
        }
        other => Err(not_a_container(other, at)),
    }
}

/// Remove the element at `index`, shifting later elements left.
pub(crate) fn remove_element(sequence: &Value, index: usize, at: &Path) -> PatchResult<()> {
    match sequence {
        Value::Sequence(items) => {
            let mut items = items.borrow_mut();
            if index < items.len() {
                items.remove(index);
            }
            Ok(())
        }
        other => Err(PatchError::NotASequence {
            path: at.clone(),
            kind: other.kind(),
        }),
    }
}

/// The sequence held at `key` in `container`.
///
/// An absent or undefined slot is replaced by a new empty sequence.
pub(crate) fn sequence_slot(container: &Value, key: &Key, at: &Path) -> PatchResult<Value> {
    let slot_path = at.clone().with(key.clone());
    match container.get(key) {
        Some(seq @ Value::Sequence(_)) => Ok(seq),
        None | Some(Value::Undefined) => {
            let fresh = Value::empty_seq();
            set_slot(container, key, fresh.clone(), at)?;
            debug!(path = %slot_path, "coerced empty slot to sequence");
            Ok(fresh)
        }
        Some(other) => Err(PatchError::NotASequence {
            path: slot_path,
            kind: other.kind(),
        }),
    }
}

/// Make sure the root target itself is a sequence, coercing `Undefined`.
pub(crate) fn root_sequence(target: &mut Value) -> PatchResult<Value> {
    match target {
        Value::Sequence(_) => Ok(target.clone()),
        Value::Undefined => {
            *target = Value::empty_seq();
            debug!("coerced undefined root to sequence");
            Ok(target.clone())
        }
        other => Err(PatchError::NotASequence {
            path: Path::root(),
            kind: other.kind(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepdelta_types::Kind;
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn parent_of_existing_path() {
        let root = v(json!({"a": {"b": {"c": 1}}}));
        let path = Path::root().with("a").with("b").with("c");
        let parent = parent_of(&root, &path).unwrap();
        assert_eq!(parent, v(json!({"c": 1})));
    }

    #[test]
    fn parent_of_single_segment_is_root() {
        let root = v(json!({"a": 1}));
        let parent = parent_of(&root, &Path::root().with("a")).unwrap();
        assert!(parent.same_ref(&root));
    }

    #[test]
    fn parent_of_creates_by_next_segment() {
        let root = Value::empty_map();
        let path = Path::root().with("list").with(0usize).with("name");
        parent_of(&root, &path).unwrap();
        assert_eq!(root, v(json!({"list": [{}]})));
    }

    #[test]
    fn parent_of_refuses_scalars() {
        let root = v(json!({"a": 5}));
        let err = parent_of(&root, &Path::root().with("a").with("b").with("c")).unwrap_err();
        assert_eq!(
            err,
            PatchError::NotAContainer {
                path: Path::root().with("a"),
                kind: Kind::Number,
            }
        );
    }

    #[test]
    fn set_slot_extends_sequences() {
        let seq = v(json!([1]));
        set_slot(&seq, &Key::Index(3), v(json!(4)), &Path::root()).unwrap();
        assert_eq!(
            seq,
            Value::seq([v(json!(1)), Value::Undefined, Value::Undefined, v(json!(4))])
        );
    }

    #[test]
    fn set_slot_rejects_names_on_sequences() {
        let seq = v(json!([]));
        let err = set_slot(&seq, &Key::name("x"), Value::Null, &Path::root()).unwrap_err();
        assert!(matches!(err, PatchError::InvalidKey { .. }));
    }

    #[test]
    fn delete_slot_leaves_hole_in_sequences() {
        let seq = v(json!([1, 2, 3]));
        delete_slot(&seq, &Key::Index(1), &Path::root()).unwrap();
        assert_eq!(seq, Value::seq([v(json!(1)), Value::Undefined, v(json!(3))]));
        delete_slot(&seq, &Key::Index(9), &Path::root()).unwrap();
        assert_eq!(seq.len(), 3);
    }

    #[test]
    fn delete_slot_removes_mapping_member() {
        let map = v(json!({"a": 1, "b": 2}));
        delete_slot(&map, &Key::name("a"), &Path::root()).unwrap();
        assert_eq!(map, v(json!({"b": 2})));
    }

    #[test]
    fn remove_element_shifts() {
        let seq = v(json!(["a", "b", "c"]));
        remove_element(&seq, 0, &Path::root()).unwrap();
        assert_eq!(seq, v(json!(["b", "c"])));
    }

    #[test]
    fn sequence_slot_coerces_missing_but_not_scalars() {
        let map = v(json!({"n": 1}));
        let seq = sequence_slot(&map, &Key::name("xs"), &Path::root()).unwrap();
        assert!(seq.same_ref(&map.get(&Key::name("xs")).unwrap()));
        let err = sequence_slot(&map, &Key::name("n"), &Path::root()).unwrap_err();
        assert_eq!(
            err,
            PatchError::NotASequence {
                path: Path::root().with("n"),
                kind: Kind::Number,
            }
        );
    }

    #[test]
    fn root_sequence_coerces_undefined() {
        let mut target = Value::Undefined;
        root_sequence(&mut target).unwrap();
        assert_eq!(target, v(json!([])));
        let mut scalar = v(json!("x"));
        assert!(root_sequence(&mut scalar).is_err());
    }
}
