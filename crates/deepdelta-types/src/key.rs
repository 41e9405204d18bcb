//! Property keys and paths locating a change relative to the compared root.
//!
//! A [`Path`] is an ordered sequence of [`Key`]s. Mapping members are
//! addressed by name (or by symbol), sequence elements by position.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// A unique symbolic key.
///
/// Two symbols are equal only if they were produced by the same call to
/// [`Symbol::new`] (or are clones of it); the description is informational.
#[derive(Clone)]
pub struct Symbol(Rc<str>);

impl Symbol {
    /// Create a fresh symbol with the given description.
    pub fn new(description: impl AsRef<str>) -> Self {
        Self(Rc::from(description.as_ref()))
    }

    /// The human-readable description.
    pub fn description(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as *const u8 as usize).hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

/// A single segment of a [`Path`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Mapping member name.
    Name(String),
    /// Position inside a sequence.
    Index(usize),
    /// Symbolic mapping member.
    Symbol(Symbol),
}

impl Key {
    /// Create a name key.
    pub fn name(name: impl Into<String>) -> Self {
        Key::Name(name.into())
    }

    /// Returns `true` if this key addresses a sequence position.
    pub fn is_index(&self) -> bool {
        matches!(self, Key::Index(_))
    }

    /// The position this key denotes inside a sequence, if any.
    ///
    /// Names made only of ASCII digits count as positions, so a key read back
    /// from text still addresses the right element.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Key::Index(i) => Some(*i),
            Key::Name(n) if !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()) => {
                n.parse().ok()
            }
            _ => None,
        }
    }

    /// The key as it is stored inside a mapping.
    ///
    /// Mappings keep positional keys under their decimal name.
    pub fn to_member(&self) -> Key {
        match self {
            Key::Index(i) => Key::Name(i.to_string()),
            other => other.clone(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(n) => f.write_str(n),
            Key::Index(i) => write!(f, "{}", i),
            Key::Symbol(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Name(s.to_owned())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Name(s)
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Index(i)
    }
}

impl From<Symbol> for Key {
    fn from(s: Symbol) -> Self {
        Key::Symbol(s)
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Key::Name(n) => serializer.serialize_str(n),
            Key::Index(i) => serializer.serialize_u64(*i as u64),
            Key::Symbol(s) => serializer.collect_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyVisitor;

        impl<'de> Visitor<'de> for KeyVisitor {
            type Value = Key;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a property name or a sequence index")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Key, E> {
                usize::try_from(v)
                    .map(Key::Index)
                    .map_err(|_| E::custom("index out of range"))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Key, E> {
                usize::try_from(v)
                    .map(Key::Index)
                    .map_err(|_| E::custom("negative index"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Key, E> {
                Ok(Key::Name(v.to_owned()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Key, E> {
                Ok(Key::Name(v))
            }
        }

        deserializer.deserialize_any(KeyVisitor)
    }
}

/// A location relative to the root of a compared value.
///
/// The empty path denotes the root itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<Key>);

impl Path {
    /// The empty path.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Append a segment (builder style).
    pub fn with(mut self, key: impl Into<Key>) -> Self {
        self.0.push(key.into());
        self
    }

    /// Append a segment in place.
    pub fn push(&mut self, key: Key) {
        self.0.push(key);
    }

    /// Remove and return the last segment.
    pub fn pop(&mut self) -> Option<Key> {
        self.0.pop()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> &[Key] {
        &self.0
    }

    pub fn last(&self) -> Option<&Key> {
        self.0.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Key> {
        self.0.iter()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        for (i, key) in self.0.iter().enumerate() {
            match key {
                Key::Index(n) => write!(f, "[{}]", n)?,
                other if i == 0 => write!(f, "{}", other)?,
                other => write!(f, ".{}", other)?,
            }
        }
        Ok(())
    }
}

impl From<Vec<Key>> for Path {
    fn from(keys: Vec<Key>) -> Self {
        Self(keys)
    }
}

impl FromIterator<Key> for Path {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Key;
    type IntoIter = std::slice::Iter<'a, Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_compare_by_identity() {
        let a = Symbol::new("tag");
        let b = Symbol::new("tag");
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn digit_names_act_as_indices() {
        assert_eq!(Key::name("12").as_index(), Some(12));
        assert_eq!(Key::Index(3).as_index(), Some(3));
        assert_eq!(Key::name("1a").as_index(), None);
        assert_eq!(Key::name("").as_index(), None);
    }

    #[test]
    fn member_form_of_index_is_name() {
        assert_eq!(Key::Index(4).to_member(), Key::name("4"));
        assert_eq!(Key::name("x").to_member(), Key::name("x"));
    }

    #[test]
    fn path_display() {
        let path = Path::root().with("users").with(0usize).with("name");
        assert_eq!(path.to_string(), "users[0].name");
        assert_eq!(Path::root().to_string(), "(root)");
    }

    #[test]
    fn path_serde_is_a_plain_array() {
        let path = Path::root().with("a").with(2usize);
        let json = serde_json::to_value(&path).unwrap();
        assert_eq!(json, serde_json::json!(["a", 2]));
        let back: Path = serde_json::from_value(json).unwrap();
        assert_eq!(back, path);
    }
}
