//! The dynamic value graph compared and patched by deepdelta.
//!
//! [`Value`] is a closed tagged union. Scalars are held inline; sequences and
//! mappings are shared, interior-mutable handles so that values have
//! reference identity and may contain cycles (`a.self = a`).
//!
//! # Invariants
//!
//! - Mapping keys are never [`Key::Index`]; positional keys are stored under
//!   their decimal name (see [`Key::to_member`]).
//! - Equality, `Debug` and the textual form terminate on cyclic graphs.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::error::{TypeError, TypeResult};
use crate::key::Key;

/// Shared, interior-mutable node of the value graph.
pub type Shared<T> = Rc<RefCell<T>>;

/// Ordered members of a mapping.
pub type Members = IndexMap<Key, Value>;

/// A regular-expression-like value, kept as its literal text.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RegExp {
    source: String,
    flags: String,
}

impl RegExp {
    pub fn new(source: impl Into<String>, flags: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            flags: flags.into(),
        }
    }

    /// Recognise a `/source/flags` literal.
    ///
    /// This is a textual heuristic, not a grammar check: any text that starts
    /// with `/` and contains a second `/` is accepted, and whatever follows
    /// the last `/` is taken as the flags.
    pub fn parse(text: &str) -> TypeResult<Self> {
        let body = text
            .strip_prefix('/')
            .ok_or_else(|| TypeError::InvalidRegExp(text.to_owned()))?;
        let end = body
            .rfind('/')
            .ok_or_else(|| TypeError::InvalidRegExp(text.to_owned()))?;
        Ok(Self::new(&body[..end], &body[end + 1..]))
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }
}

impl fmt::Display for RegExp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

/// A value the engine cannot look inside (functions, host handles).
///
/// Opaque values are equal only to clones of themselves.
#[derive(Clone)]
pub struct Opaque(Rc<str>);

impl Opaque {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Rc::from(name.as_ref()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({})", self.0)
    }
}

/// A dynamically shaped value.
#[derive(Clone, Default)]
pub enum Value {
    /// No value. At the root this means "absent".
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Date(DateTime<Utc>),
    RegExp(RegExp),
    /// The math namespace singleton: a recognised global with no members.
    Math,
    Opaque(Opaque),
    Sequence(Shared<Vec<Value>>),
    Mapping(Shared<Members>),
}

impl Value {
    /// A new sequence holding `items`.
    pub fn seq(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Sequence(Rc::new(RefCell::new(items.into_iter().collect())))
    }

    /// A new mapping holding `members`, in iteration order.
    pub fn map<K: Into<Key>>(members: impl IntoIterator<Item = (K, Value)>) -> Self {
        let members = members
            .into_iter()
            .map(|(k, v)| (k.into().to_member(), v))
            .collect();
        Value::Mapping(Rc::new(RefCell::new(members)))
    }

    pub fn empty_seq() -> Self {
        Value::seq(Vec::new())
    }

    pub fn empty_map() -> Self {
        Value::map(Vec::<(Key, Value)>::new())
    }

    /// Parse an RFC 3339 timestamp into a date value.
    pub fn parse_date(text: &str) -> TypeResult<Self> {
        DateTime::parse_from_rfc3339(text)
            .map(|d| Value::Date(d.with_timezone(&Utc)))
            .map_err(|e| TypeError::InvalidDate(format!("{text}: {e}")))
    }

    /// Parse a `/source/flags` literal into a regexp value.
    pub fn regexp_literal(text: &str) -> TypeResult<Self> {
        RegExp::parse(text).map(Value::RegExp)
    }

    pub fn opaque(name: impl AsRef<str>) -> Self {
        Value::Opaque(Opaque::new(name))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Returns `true` for sequences and mappings.
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Sequence(_) | Value::Mapping(_))
    }

    /// Address of the shared node, for containers.
    pub fn ref_id(&self) -> Option<usize> {
        match self {
            Value::Sequence(s) => Some(Rc::as_ptr(s) as *const () as usize),
            Value::Mapping(m) => Some(Rc::as_ptr(m) as *const () as usize),
            _ => None,
        }
    }

    /// Returns `true` if both values are the same container node.
    pub fn same_ref(&self, other: &Value) -> bool {
        match (self.ref_id(), other.ref_id()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Strict identity: scalars by value, containers by reference.
    ///
    /// NaN is not identical to itself.
    pub fn is_identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Math, Value::Math) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::RegExp(a), Value::RegExp(b)) => a == b,
            (Value::Opaque(a), Value::Opaque(b)) => a == b,
            (Value::Sequence(_), Value::Sequence(_)) | (Value::Mapping(_), Value::Mapping(_)) => {
                self.same_ref(other)
            }
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Number of elements or members; zero for scalars.
    pub fn len(&self) -> usize {
        match self {
            Value::Sequence(s) => s.borrow().len(),
            Value::Mapping(m) => m.borrow().len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the container owns a slot at `key`.
    pub fn has_own(&self, key: &Key) -> bool {
        match self {
            Value::Sequence(s) => key.as_index().is_some_and(|i| i < s.borrow().len()),
            Value::Mapping(m) => m.borrow().contains_key(&key.to_member()),
            _ => false,
        }
    }

    /// The value owned at `key`, if any. Containers are returned as handles.
    pub fn get(&self, key: &Key) -> Option<Value> {
        match self {
            Value::Sequence(s) => key.as_index().and_then(|i| s.borrow().get(i).cloned()),
            Value::Mapping(m) => m.borrow().get(&key.to_member()).cloned(),
            _ => None,
        }
    }

    /// Snapshot of a sequence's elements.
    pub fn elements(&self) -> Option<Vec<Value>> {
        match self {
            Value::Sequence(s) => Some(s.borrow().clone()),
            _ => None,
        }
    }

    /// Snapshot of a mapping's members, in enumeration order.
    pub fn members(&self) -> Option<Vec<(Key, Value)>> {
        match self {
            Value::Mapping(m) => Some(
                m.borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Copy the whole graph reachable from this value.
    ///
    /// Shared nodes stay shared in the copy, and cycles are reproduced.
    pub fn deep_clone(&self) -> Value {
        let mut copies: HashMap<usize, Value> = HashMap::new();
        deep_clone_into(self, &mut copies)
    }
}

fn deep_clone_into(value: &Value, copies: &mut HashMap<usize, Value>) -> Value {
    let Some(id) = value.ref_id() else {
        return value.clone();
    };
    if let Some(copy) = copies.get(&id) {
        return copy.clone();
    }
    match value {
        Value::Sequence(src) => {
            let node: Shared<Vec<Value>> = Rc::new(RefCell::new(Vec::new()));
            copies.insert(id, Value::Sequence(node.clone()));
            let items = src.borrow().clone();
            let copied: Vec<Value> = items.iter().map(|v| deep_clone_into(v, copies)).collect();
            *node.borrow_mut() = copied;
            Value::Sequence(node)
        }
        Value::Mapping(src) => {
            let node: Shared<Members> = Rc::new(RefCell::new(IndexMap::new()));
            copies.insert(id, Value::Mapping(node.clone()));
            let members: Vec<(Key, Value)> = src
                .borrow()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            let copied: Members = members
                .into_iter()
                .map(|(k, v)| (k, deep_clone_into(&v, copies)))
                .collect();
            *node.borrow_mut() = copied;
            Value::Mapping(node)
        }
        _ => value.clone(),
    }
}

// ---------------------------------------------------------------
// Structural equality
// ---------------------------------------------------------------

impl PartialEq for Value {
    /// Structural equality. NaN equals NaN, and a pair of nodes already being
    /// compared higher up counts as equal, so cyclic graphs terminate.
    fn eq(&self, other: &Value) -> bool {
        let mut active = Vec::new();
        structural_eq(self, other, &mut active)
    }
}

fn structural_eq(a: &Value, b: &Value, active: &mut Vec<(usize, usize)>) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y || (x.is_nan() && y.is_nan()),
        (Value::Sequence(_), Value::Sequence(_)) | (Value::Mapping(_), Value::Mapping(_)) => {
            if a.same_ref(b) {
                return true;
            }
            let pair = (a.ref_id().unwrap_or(0), b.ref_id().unwrap_or(0));
            if active.contains(&pair) {
                return true;
            }
            active.push(pair);
            let equal = match (a, b) {
                (Value::Sequence(_), Value::Sequence(_)) => {
                    let (xs, ys) = (a.elements().unwrap_or_default(), b.elements().unwrap_or_default());
                    xs.len() == ys.len()
                        && xs.iter().zip(&ys).all(|(x, y)| structural_eq(x, y, active))
                }
                _ => {
                    let (xs, ys) = (a.members().unwrap_or_default(), b.members().unwrap_or_default());
                    xs.len() == ys.len()
                        && xs.iter().all(|(k, x)| match b.get(k) {
                            Some(y) => structural_eq(x, &y, active),
                            None => false,
                        })
                }
            };
            active.pop();
            equal
        }
        _ => a.is_identical(b),
    }
}

// ---------------------------------------------------------------
// Textual forms
// ---------------------------------------------------------------

/// Format a number the way a dynamic language prints it: integral values
/// without a fractional part, non-finite values by name.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_owned()
    } else if n == 0.0 {
        "0".to_owned()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i128)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Value {
    /// The value's text form. Sequences join their elements with `,`;
    /// a sequence already being printed renders as empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut active = Vec::new();
        write_text(self, f, &mut active)
    }
}

fn write_text(value: &Value, f: &mut fmt::Formatter<'_>, active: &mut Vec<usize>) -> fmt::Result {
    match value {
        Value::Undefined => f.write_str("undefined"),
        Value::Null => f.write_str("null"),
        Value::Bool(b) => write!(f, "{}", b),
        Value::Number(n) => f.write_str(&format_number(*n)),
        Value::String(s) => f.write_str(s),
        Value::Date(d) => f.write_str(&d.to_rfc3339()),
        Value::RegExp(r) => write!(f, "{}", r),
        Value::Math => f.write_str("[object Math]"),
        Value::Opaque(o) => write!(f, "[function {}]", o.name()),
        Value::Mapping(_) => f.write_str("[object Object]"),
        Value::Sequence(_) => {
            let id = value.ref_id().unwrap_or(0);
            if active.contains(&id) {
                return Ok(());
            }
            active.push(id);
            for (i, item) in value.elements().unwrap_or_default().iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                if !matches!(item, Value::Undefined | Value::Null) {
                    write_text(item, f, active)?;
                }
            }
            active.pop();
            Ok(())
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut active = Vec::new();
        write_debug(self, f, &mut active)
    }
}

fn write_debug(value: &Value, f: &mut fmt::Formatter<'_>, active: &mut Vec<usize>) -> fmt::Result {
    match value {
        Value::String(s) => write!(f, "{:?}", s),
        Value::Date(d) => write!(f, "Date({})", d.to_rfc3339()),
        Value::Opaque(o) => write!(f, "{:?}", o),
        Value::Sequence(_) | Value::Mapping(_) => {
            let id = value.ref_id().unwrap_or(0);
            if active.contains(&id) {
                return f.write_str("[Circular]");
            }
            active.push(id);
            if let Some(items) = value.elements() {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_debug(item, f, active)?;
                }
                f.write_str("]")?;
            } else {
                f.write_str("{")?;
                for (i, (k, v)) in value.members().unwrap_or_default().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: ", k)?;
                    write_debug(v, f, active)?;
                }
                f.write_str("}")?;
            }
            active.pop();
            Ok(())
        }
        other => write_text(other, f, active),
    }
}

// ---------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::seq(items)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::Date(d)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::seq(items.into_iter().map(Value::from)),
            serde_json::Value::Object(members) => {
                Value::map(members.into_iter().map(|(k, v)| (Key::Name(k), Value::from(v))))
            }
        }
    }
}
