//! Replaying a change record forward.
//!
//! | Record  | Slot                         | Inside an array change         |
//! |---------|------------------------------|--------------------------------|
//! | New     | set to `rhs`                 | set element to `rhs`           |
//! | Deleted | delete                       | remove element, shifting left  |
//! | Edited  | set to `rhs`                 | set element to `rhs`           |
//! | Array   | recurse into the sequence    | recurse into the element       |

use deepdelta_types::{Diff, Key, Path, Value};

use crate::error::PatchResult;
use crate::navigate::{
    delete_slot, parent_of, remove_element, root_sequence, sequence_slot, set_slot,
};

/// Mutate `target` so that it incorporates `change`.
///
/// The record's path is interpreted against `target`'s current shape.
/// Missing intermediate containers are created; a record with an empty path
/// replaces the target itself.
pub fn apply_change(target: &mut Value, change: &Diff) -> PatchResult<()> {
    let path = change.path();
    let Some(last) = path.last() else {
        return apply_at_root(target, change);
    };
    let parent = parent_of(target, path)?;
    let at = parent_path(path);

    match change {
        Diff::New { rhs, .. } | Diff::Edited { rhs, .. } => {
            set_slot(&parent, last, rhs.deep_clone(), &at)
        }
        Diff::Deleted { .. } => delete_slot(&parent, last, &at),
        Diff::Array { index, item, .. } => {
            let sequence = sequence_slot(&parent, last, &at)?;
            apply_array_change(&sequence, *index, item, path)
        }
    }
}

/// Replay `changes` in order.
pub fn apply_all(target: &mut Value, changes: &[Diff]) -> PatchResult<()> {
    changes
        .iter()
        .try_for_each(|change| apply_change(target, change))
}

fn apply_at_root(target: &mut Value, change: &Diff) -> PatchResult<()> {
    match change {
        Diff::New { rhs, .. } | Diff::Edited { rhs, .. } => {
            *target = rhs.deep_clone();
            Ok(())
        }
        Diff::Deleted { .. } => {
            *target = Value::Undefined;
            Ok(())
        }
        Diff::Array { index, item, .. } => {
            let sequence = root_sequence(target)?;
            apply_array_change(&sequence, *index, item, &Path::root())
        }
    }
}

fn apply_array_change(sequence: &Value, index: usize, item: &Diff, at: &Path) -> PatchResult<()> {
    let element_path = at.clone().with(index);

    if !item.path().is_root() {
        let mut element = sequence.get(&Key::Index(index)).unwrap_or_default();
        return apply_change(&mut element, item);
    }

    match item {
        Diff::New { rhs, .. } | Diff::Edited { rhs, .. } => {
            set_slot(sequence, &Key::Index(index), rhs.deep_clone(), at)
        }
        Diff::Deleted { .. } => remove_element(sequence, index, at),
        Diff::Array {
            index: inner, item, ..
        } => {
            let nested = sequence_slot(sequence, &Key::Index(index), at)?;
            apply_array_change(&nested, *inner, item, &element_path)
        }
    }
}

pub(crate) fn parent_path(path: &Path) -> Path {
    path.keys()[..path.len().saturating_sub(1)].to_vec().into()
}
