//! Bring a target in line with a source value.

use deepdelta_diff::{observable_diff, DiffOptions};
use deepdelta_types::{Diff, Value};
use tracing::debug;

use crate::apply::apply_change;
use crate::error::PatchResult;

/// Decides whether one change is applied. Receives the target as it stands
/// at that moment, the source, and the change.
pub type ChangeFilter<'a> = &'a mut dyn FnMut(&Value, &Value, &Diff) -> bool;

/// Diff `target` against `source` and apply every change the filter accepts.
///
/// Without a filter all changes are applied and `target` ends up
/// structurally equal to `source`. Returns the number of changes applied.
pub fn apply_diff(
    target: &mut Value,
    source: &Value,
    mut filter: Option<ChangeFilter<'_>>,
) -> PatchResult<usize> {
    let changes = observable_diff(target, source, None, &DiffOptions::new());
    let mut applied = 0;

    for change in &changes {
        let accepted = match filter.as_mut() {
            Some(filter) => filter(target, source, change),
            None => true,
        };
        if accepted {
            apply_change(target, change)?;
            applied += 1;
        }
    }

    debug!(total = changes.len(), applied, "apply_diff complete");
    Ok(applied)
}
