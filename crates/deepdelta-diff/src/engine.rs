//! The recursive walk that compares two values and emits change records.
//!
//! Each node is evaluated in a fixed precedence order: prefilter gate,
//! regexp normalization, definedness, type mismatch, date mismatch,
//! structural descent, leaf comparison.
//!
//! # Invariants
//!
//! - The cycle stack lives in one [`Walker`] and is discarded when the
//!   top-level call returns.
//! - No container borrow is held across a recursive call; children are
//!   snapshotted first.
//! - Values carried by emitted records are deep copies.

use std::collections::HashSet;

use deepdelta_types::{hash_order, sorted_by_hash, Diff, Key, Kind, Path, Value};
use tracing::{debug, trace};

use crate::options::DiffOptions;

/// A pair of containers currently being descended into.
struct Frame {
    lhs: Value,
    rhs: Value,
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

struct Walker<'o> {
    options: &'o DiffOptions<'o>,
    stack: Vec<Frame>,
    changes: Vec<Diff>,
}

/// Compare `lhs` against `rhs` and return every difference in emission order.
pub(crate) fn compute(lhs: &Value, rhs: &Value, options: &DiffOptions<'_>) -> Vec<Diff> {
    let mut walker = Walker {
        options,
        stack: Vec::new(),
        changes: Vec::new(),
    };
    let mut path = Path::root();
    walker.walk(Some(lhs.clone()), Some(rhs.clone()), &mut path, None);
    debug!(
        changes = walker.changes.len(),
        order_independent = options.order_independent,
        "diff complete"
    );
    walker.changes
}

/// Rearrange `right` so that every left position faces its partner in
/// hash order.
///
/// Elements are paired by rank: the k-th left element in hash order meets
/// the k-th right element in hash order. A left element that finds no
/// partner while sitting inside the shared prefix gives its slot to a
/// partner whose left element sits past the end of `right`, so removals
/// stay at the tail. Unpaired right elements go to the tail in hash order.
fn align_unordered(left: &[Value], right: &[Value]) -> Vec<Value> {
    let left_rank = hash_order(left);
    let shared = left.len().min(right.len());
    let mut aligned: Vec<Option<Value>> = vec![None; right.len()];
    let mut displaced = Vec::new();

    for (rank, item) in sorted_by_hash(right).into_iter().enumerate() {
        match left_rank.get(rank) {
            Some(&pos) if pos < shared => aligned[pos] = Some(item),
            Some(_) => displaced.push(item),
            None => aligned[rank] = Some(item),
        }
    }

    let mut displaced = displaced.into_iter();
    aligned
        .into_iter()
        .map(|slot| slot.or_else(|| displaced.next()).unwrap_or_default())
        .collect()
}

impl Walker<'_> {
    fn walk(&mut self, lhs: Option<Value>, rhs: Option<Value>, path: &mut Path, key: Option<Key>) {
        let (mut lhs, mut rhs) = (lhs, rhs);
        let keyed = match key {
            Some(key) => {
                if let Some(filter) = self.options.prefilter {
                    if filter.prefilter(path, &key) {
                        trace!(%path, %key, "node suppressed by prefilter");
                        return;
                    }
                    if let Some((l, r)) = filter.normalize(path, &key, lhs.as_ref(), rhs.as_ref()) {
                        lhs = Some(l);
                        rhs = Some(r);
                    }
                }
                path.push(key);
                true
            }
            None => false,
        };

        self.compare(lhs, rhs, path);

        if keyed {
            path.pop();
        }
    }

    /// A side is defined if it holds a value other than `Undefined`, or if
    /// the parent container owns the member even though its value is
    /// `Undefined`.
    fn is_defined(&self, value: Option<&Value>, side: Side, path: &Path) -> bool {
        if value.is_some_and(|v| !v.is_undefined()) {
            return true;
        }
        match (self.stack.last(), path.last()) {
            (Some(frame), Some(key)) => match side {
                Side::Left => frame.lhs.has_own(key),
                Side::Right => frame.rhs.has_own(key),
            },
            _ => false,
        }
    }

    fn compare(&mut self, lhs: Option<Value>, rhs: Option<Value>, path: &mut Path) {
        let (lhs, rhs) = match (lhs, rhs) {
            (Some(Value::RegExp(l)), Some(Value::RegExp(r))) => (
                Some(Value::String(l.to_string())),
                Some(Value::String(r.to_string())),
            ),
            other => other,
        };

        let left_defined = self.is_defined(lhs.as_ref(), Side::Left, path);
        let right_defined = self.is_defined(rhs.as_ref(), Side::Right, path);
        let lhs = lhs.unwrap_or_default();
        let rhs = rhs.unwrap_or_default();

        if !left_defined && right_defined {
            self.changes.push(Diff::new(path.clone(), rhs.deep_clone()));
        } else if left_defined && !right_defined {
            self.changes.push(Diff::deleted(path.clone(), lhs.deep_clone()));
        } else if lhs.kind() != rhs.kind() {
            self.push_edit(path, &lhs, &rhs);
        } else if let (Value::Date(l), Value::Date(r)) = (&lhs, &rhs) {
            if l != r {
                self.push_edit(path, &lhs, &rhs);
            }
        } else if lhs.kind().is_structural() {
            self.descend(lhs, rhs, path);
        } else if !lhs.is_identical(&rhs) {
            let both_nan = matches!(
                (&lhs, &rhs),
                (Value::Number(l), Value::Number(r)) if l.is_nan() && r.is_nan()
            );
            if !both_nan {
                self.push_edit(path, &lhs, &rhs);
            }
        }
    }

    fn push_edit(&mut self, path: &Path, lhs: &Value, rhs: &Value) {
        self.changes
            .push(Diff::edited(path.clone(), lhs.deep_clone(), rhs.deep_clone()));
    }

    fn descend(&mut self, lhs: Value, rhs: Value, path: &mut Path) {
        let revisit = self
            .stack
            .iter()
            .rev()
            .find(|frame| frame.lhs.same_ref(&lhs))
            .map(|frame| frame.rhs.same_ref(&rhs) || lhs.same_ref(&rhs));
        if let Some(closes_same_loop) = revisit {
            // Both sides closing a loop back to the same pair is not a difference.
            trace!(%path, closes_same_loop, "cycle detected");
            if !closes_same_loop {
                self.push_edit(path, &lhs, &rhs);
            }
            return;
        }

        self.stack.push(Frame {
            lhs: lhs.clone(),
            rhs: rhs.clone(),
        });
        match lhs.kind() {
            Kind::Array => self.diff_sequences(&lhs, &rhs, path),
            _ => self.diff_mappings(&lhs, &rhs, path),
        }
        self.stack.pop();
    }

    /// Trailing additions, then trailing removals, then shared positions,
    /// all from the highest index down.
    ///
    /// Indices always address the caller's left sequence. In order-independent
    /// mode the right side is rearranged to face the left (see
    /// [`align_unordered`]); the left is never reordered.
    fn diff_sequences(&mut self, lhs: &Value, rhs: &Value, path: &mut Path) {
        let left = lhs.elements().unwrap_or_default();
        let mut right = rhs.elements().unwrap_or_default();
        if self.options.order_independent {
            right = align_unordered(&left, &right);
        }

        for i in (left.len()..right.len()).rev() {
            let item = Diff::new(Path::root(), right[i].deep_clone());
            self.changes.push(Diff::array(path.clone(), i, item));
        }
        for j in (right.len()..left.len()).rev() {
            let item = Diff::deleted(Path::root(), left[j].deep_clone());
            self.changes.push(Diff::array(path.clone(), j, item));
        }

        for (i, (l, r)) in left.into_iter().zip(right).enumerate().rev() {
            self.walk(Some(l), Some(r), path, Some(Key::Index(i)));
        }
    }

    /// Left members in left order, then right-only members in right order.
    fn diff_mappings(&mut self, lhs: &Value, rhs: &Value, path: &mut Path) {
        let left = lhs.members().unwrap_or_default();
        let right = rhs.members().unwrap_or_default();
        let mut consumed: HashSet<Key> = HashSet::with_capacity(right.len());

        for (key, l) in left {
            match rhs.get(&key) {
                Some(r) => {
                    consumed.insert(key.clone());
                    self.walk(Some(l), Some(r), path, Some(key));
                }
                None => self.walk(Some(l), None, path, Some(key)),
            }
        }
        for (key, r) in right {
            if !consumed.contains(&key) {
                self.walk(None, Some(r), path, Some(key));
            }
        }
    }
}
