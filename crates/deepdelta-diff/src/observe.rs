//! Top-level entry points over the recursive engine.
//!
//! [`observable_diff`] runs one full walk and then reports every record to
//! an optional observer. [`diff`] and [`accumulate_diff`] collect records
//! with the "no changes" conventions callers expect.

use deepdelta_types::{Diff, Value};

use crate::engine;
use crate::options::DiffOptions;

/// Observer notified once per change record, in emission order.
pub type Observer<'a> = &'a mut dyn FnMut(&Diff);

/// Compare `lhs` against `rhs`, report each record to `observer`, and
/// return all records.
///
/// The walk always completes before the first notification, so an observer
/// may freely mutate other values, including `lhs`.
pub fn observable_diff(
    lhs: &Value,
    rhs: &Value,
    observer: Option<Observer<'_>>,
    options: &DiffOptions<'_>,
) -> Vec<Diff> {
    let changes = engine::compute(lhs, rhs, options);
    if let Some(observer) = observer {
        for change in &changes {
            observer(change);
        }
    }
    changes
}

/// Compare `lhs` against `rhs`.
///
/// Returns `None` when the values do not differ.
pub fn diff(lhs: &Value, rhs: &Value, options: &DiffOptions<'_>) -> Option<Vec<Diff>> {
    let changes = observable_diff(lhs, rhs, None, options);
    if changes.is_empty() {
        None
    } else {
        Some(changes)
    }
}

/// Compare `lhs` against `rhs`, appending every record to `accumulator`.
///
/// The accumulator is returned even when nothing was appended.
pub fn accumulate_diff<A: Extend<Diff>>(
    lhs: &Value,
    rhs: &Value,
    options: &DiffOptions<'_>,
    mut accumulator: A,
) -> A {
    let mut append = |change: &Diff| accumulator.extend(std::iter::once(change.clone()));
    observable_diff(lhs, rhs, Some(&mut append), options);
    accumulator
}

/// Returns `true` if comparing the values yields no records.
pub fn is_equal(lhs: &Value, rhs: &Value, options: &DiffOptions<'_>) -> bool {
    engine::compute(lhs, rhs, options).is_empty()
}
