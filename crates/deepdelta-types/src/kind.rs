//! Value classification.
//!
//! Every comparison first classifies both sides. Two values of different
//! [`Kind`] are reported as an edit without descending into either.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// The classified type of a [`Value`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Date,
    RegExp,
    Math,
    Function,
    Array,
    Object,
}

impl Kind {
    /// Classify a value.
    pub fn of(value: &Value) -> Kind {
        match value {
            Value::Undefined => Kind::Undefined,
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Boolean,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Date(_) => Kind::Date,
            Value::RegExp(_) => Kind::RegExp,
            Value::Math => Kind::Math,
            Value::Opaque(_) => Kind::Function,
            Value::Sequence(_) => Kind::Array,
            Value::Mapping(_) => Kind::Object,
        }
    }

    /// The lowercase tag used in hash input strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Undefined => "undefined",
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Date => "date",
            Kind::RegExp => "regexp",
            Kind::Math => "math",
            Kind::Function => "function",
            Kind::Array => "array",
            Kind::Object => "object",
        }
    }

    /// Returns `true` for kinds the diff engine descends into.
    pub fn is_structural(&self) -> bool {
        matches!(self, Kind::Array | Kind::Object)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    /// Shorthand for [`Kind::of`].
    pub fn kind(&self) -> Kind {
        Kind::of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_every_variant() {
        assert_eq!(Value::Undefined.kind(), Kind::Undefined);
        assert_eq!(Value::Null.kind(), Kind::Null);
        assert_eq!(Value::from(true).kind(), Kind::Boolean);
        assert_eq!(Value::from(1.5).kind(), Kind::Number);
        assert_eq!(Value::from("x").kind(), Kind::String);
        assert_eq!(Value::parse_date("2020-01-01T00:00:00Z").unwrap().kind(), Kind::Date);
        assert_eq!(Value::regexp_literal("/x/").unwrap().kind(), Kind::RegExp);
        assert_eq!(Value::Math.kind(), Kind::Math);
        assert_eq!(Value::opaque("f").kind(), Kind::Function);
        assert_eq!(Value::from(json!([])).kind(), Kind::Array);
        assert_eq!(Value::from(json!({})).kind(), Kind::Object);
    }

    #[test]
    fn null_is_not_an_object() {
        assert_ne!(Value::Null.kind(), Kind::Object);
        assert!(!Kind::Null.is_structural());
        assert!(Kind::Array.is_structural());
    }

    #[test]
    fn tags_are_lowercase() {
        assert_eq!(Kind::RegExp.to_string(), "regexp");
        assert_eq!(serde_json::to_value(Kind::Array).unwrap(), json!("array"));
    }
}
