//! Undoing a change record.
//!
//! Revert mirrors apply: `New` is removed, `Deleted` and `Edited` restore
//! `lhs`. Intermediates are created by the same rule as apply (sequence
//! before a positional segment, mapping otherwise).
//!
//! A deleted sequence element is restored by writing its index rather than
//! by inserting, which is exact for the tail-first deletions the diff
//! engine emits but does not reconstruct deletions from the middle of a
//! sequence.

use deepdelta_types::{Diff, Key, Path, Value};

use crate::apply::parent_path;
use crate::error::PatchResult;
use crate::navigate::{
    delete_slot, parent_of, remove_element, root_sequence, sequence_slot, set_slot,
};

/// Mutate `target` so that `change` is undone.
pub fn revert_change(target: &mut Value, change: &Diff) -> PatchResult<()> {
    let path = change.path();
    let Some(last) = path.last() else {
        return revert_at_root(target, change);
    };
    let parent = parent_of(target, path)?;
    let at = parent_path(path);

    match change {
        Diff::New { .. } => delete_slot(&parent, last, &at),
        Diff::Deleted { lhs, .. } | Diff::Edited { lhs, .. } => {
            set_slot(&parent, last, lhs.deep_clone(), &at)
        }
        Diff::Array { index, item, .. } => {
            let sequence = sequence_slot(&parent, last, &at)?;
            revert_array_change(&sequence, *index, item, path)
        }
    }
}

/// Undo `changes`, processing them in the order given.
///
/// Records produced by one diff can be undone in their emission order.
pub fn revert_all(target: &mut Value, changes: &[Diff]) -> PatchResult<()> {
    changes
        .iter()
        .try_for_each(|change| revert_change(target, change))
}

fn revert_at_root(target: &mut Value, change: &Diff) -> PatchResult<()> {
    match change {
        Diff::New { .. } => {
            *target = Value::Undefined;
            Ok(())
        }
        Diff::Deleted { lhs, .. } | Diff::Edited { lhs, .. } => {
            *target = lhs.deep_clone();
            Ok(())
        }
        Diff::Array { index, item, .. } => {
            let sequence = root_sequence(target)?;
            revert_array_change(&sequence, *index, item, &Path::root())
        }
    }
}

fn revert_array_change(sequence: &Value, index: usize, item: &Diff, at: &Path) -> PatchResult<()> {
    if !item.path().is_root() {
        let mut element = sequence.get(&Key::Index(index)).unwrap_or_default();
        return revert_change(&mut element, item);
    }

    match item {
        Diff::New { .. } => remove_element(sequence, index, at),
        Diff::Deleted { lhs, .. } | Diff::Edited { lhs, .. } => {
            set_slot(sequence, &Key::Index(index), lhs.deep_clone(), at)
        }
        Diff::Array {
            index: inner, item, ..
        } => {
            let nested = sequence_slot(sequence, &Key::Index(index), at)?;
            revert_array_change(&nested, *inner, item, &at.clone().with(index))
        }
    }
}
