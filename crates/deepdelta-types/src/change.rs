//! Change records: immutable facts describing one structural difference.
//!
//! Records are produced by the diff engine and consumed by the patch engine
//! or by observers. Each record's path locates the change in the *left*
//! (origin) value's shape before any mutation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::key::Path;
use crate::value::Value;

/// The four kinds of change record, by their one-letter wire tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiffKind {
    #[serde(rename = "N")]
    New,
    #[serde(rename = "D")]
    Deleted,
    #[serde(rename = "E")]
    Edited,
    #[serde(rename = "A")]
    Array,
}

impl DiffKind {
    pub fn tag(&self) -> char {
        match self {
            DiffKind::New => 'N',
            DiffKind::Deleted => 'D',
            DiffKind::Edited => 'E',
            DiffKind::Array => 'A',
        }
    }
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// A single difference between a left and a right value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Diff {
    /// Present on the right, absent on the left.
    #[serde(rename = "N")]
    New {
        #[serde(default)]
        path: Path,
        #[serde(default)]
        rhs: Value,
    },
    /// Present on the left, absent on the right.
    #[serde(rename = "D")]
    Deleted {
        #[serde(default)]
        path: Path,
        #[serde(default)]
        lhs: Value,
    },
    /// A leaf or type-mismatched value differs.
    #[serde(rename = "E")]
    Edited {
        #[serde(default)]
        path: Path,
        #[serde(default)]
        lhs: Value,
        #[serde(default)]
        rhs: Value,
    },
    /// A change at `index` inside the sequence at `path`.
    ///
    /// `item` is a `New`, `Deleted` or `Edited` record; its own path is
    /// normally empty since `index` already localizes it.
    #[serde(rename = "A")]
    Array {
        #[serde(default)]
        path: Path,
        index: usize,
        item: Box<Diff>,
    },
}

impl Diff {
    pub fn new(path: Path, rhs: Value) -> Self {
        Diff::New { path, rhs }
    }

    pub fn deleted(path: Path, lhs: Value) -> Self {
        Diff::Deleted { path, lhs }
    }

    pub fn edited(path: Path, lhs: Value, rhs: Value) -> Self {
        Diff::Edited { path, lhs, rhs }
    }

    pub fn array(path: Path, index: usize, item: Diff) -> Self {
        Diff::Array {
            path,
            index,
            item: Box::new(item),
        }
    }

    pub fn kind(&self) -> DiffKind {
        match self {
            Diff::New { .. } => DiffKind::New,
            Diff::Deleted { .. } => DiffKind::Deleted,
            Diff::Edited { .. } => DiffKind::Edited,
            Diff::Array { .. } => DiffKind::Array,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Diff::New { path, .. }
            | Diff::Deleted { path, .. }
            | Diff::Edited { path, .. }
            | Diff::Array { path, .. } => path,
        }
    }

    /// The left-hand value, for `Deleted` and `Edited` records.
    pub fn lhs(&self) -> Option<&Value> {
        match self {
            Diff::Deleted { lhs, .. } | Diff::Edited { lhs, .. } => Some(lhs),
            _ => None,
        }
    }

    /// The right-hand value, for `New` and `Edited` records.
    pub fn rhs(&self) -> Option<&Value> {
        match self {
            Diff::New { rhs, .. } | Diff::Edited { rhs, .. } => Some(rhs),
            _ => None,
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            Diff::Array { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub fn item(&self) -> Option<&Diff> {
        match self {
            Diff::Array { item, .. } => Some(item),
            _ => None,
        }
    }
}

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diff::New { path, rhs } => write!(f, "N {}: {:?}", path, rhs),
            Diff::Deleted { path, lhs } => write!(f, "D {}: {:?}", path, lhs),
            Diff::Edited { path, lhs, rhs } => write!(f, "E {}: {:?} -> {:?}", path, lhs, rhs),
            Diff::Array { path, index, item } => {
                write!(f, "A {}[{}]: ", path, index)?;
                match item.as_ref() {
                    Diff::New { rhs, .. } => write!(f, "N {:?}", rhs),
                    Diff::Deleted { lhs, .. } => write!(f, "D {:?}", lhs),
                    Diff::Edited { lhs, rhs, .. } => write!(f, "E {:?} -> {:?}", lhs, rhs),
                    nested => write!(f, "{}", nested),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;
    use serde_json::json;

    #[test]
    fn accessors_follow_kind() {
        let d = Diff::edited(Path::root().with("a"), Value::from(1), Value::from(2));
        assert_eq!(d.kind(), DiffKind::Edited);
        assert_eq!(d.path().keys(), &[Key::name("a")]);
        assert_eq!(d.lhs(), Some(&Value::from(1)));
        assert_eq!(d.rhs(), Some(&Value::from(2)));
        assert_eq!(d.index(), None);

        let n = Diff::new(Path::root(), Value::from("x"));
        assert_eq!(n.lhs(), None);
        let del = Diff::deleted(Path::root(), Value::from("x"));
        assert_eq!(del.rhs(), None);
    }

    #[test]
    fn serializes_to_wire_shape() {
        let d = Diff::array(
            Path::root().with("items"),
            3,
            Diff::new(Path::root(), Value::from(json!({"id": 7}))),
        );
        let wire = serde_json::to_value(&d).unwrap();
        assert_eq!(
            wire,
            json!({
                "kind": "A",
                "path": ["items"],
                "index": 3,
                "item": {"kind": "N", "path": [], "rhs": {"id": 7}}
            })
        );
    }

    #[test]
    fn deserializes_wire_shape_without_nested_path() {
        let wire = json!({
            "kind": "A",
            "path": ["list", 0],
            "index": 1,
            "item": {"kind": "D", "lhs": "gone"}
        });
        let d: Diff = serde_json::from_value(wire).unwrap();
        assert_eq!(d.path(), &Path::root().with("list").with(0usize));
        let item = d.item().unwrap();
        assert_eq!(item.kind(), DiffKind::Deleted);
        assert!(item.path().is_root());
        assert_eq!(item.lhs(), Some(&Value::from("gone")));
    }

    #[test]
    fn display_is_one_line() {
        let d = Diff::edited(Path::root().with("a").with("b"), Value::from(1), Value::from(2));
        assert_eq!(d.to_string(), "E a.b: 1 -> 2");
        let a = Diff::array(Path::root().with("xs"), 0, Diff::deleted(Path::root(), Value::from(true)));
        assert_eq!(a.to_string(), "A xs[0]: D true");
    }
}
