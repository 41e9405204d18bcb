//! Serde support for [`Value`].
//!
//! Values serialize to the self-describing data model:
//!
//! - `Undefined` and `Null` as unit (`null` in JSON)
//! - integral numbers as integers, other numbers as floats
//! - dates as RFC 3339 strings, regexps as their literal text
//! - `Math` as the string `"Math"`, opaque values as `"[function name]"`
//! - a container already being serialized higher up as `"[Circular]"`
//!
//! Deserialization accepts any self-describing format. Strings always come
//! back as strings: dates and regexps do not round-trip through text.

use std::cell::RefCell;
use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::key::Key;
use crate::value::Value;

/// Largest magnitude at which every integer is exactly representable in f64.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

struct Tracked<'a> {
    value: &'a Value,
    active: &'a RefCell<Vec<usize>>,
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let active = RefCell::new(Vec::new());
        Tracked {
            value: self,
            active: &active,
        }
        .serialize(serializer)
    }
}

impl Serialize for Tracked<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.value {
            Value::Undefined | Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Value::String(s) => serializer.serialize_str(s),
            Value::Date(d) => serializer.serialize_str(&d.to_rfc3339()),
            Value::RegExp(r) => serializer.collect_str(r),
            Value::Math => serializer.serialize_str("Math"),
            Value::Opaque(o) => serializer.serialize_str(&format!("[function {}]", o.name())),
            Value::Sequence(_) | Value::Mapping(_) => {
                let id = self.value.ref_id().unwrap_or(0);
                if self.active.borrow().contains(&id) {
                    return serializer.serialize_str("[Circular]");
                }
                self.active.borrow_mut().push(id);
                let result = self.serialize_container(serializer);
                self.active.borrow_mut().pop();
                result
            }
        }
    }
}

impl Tracked<'_> {
    fn serialize_container<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let Some(items) = self.value.elements() {
            let mut seq = serializer.serialize_seq(Some(items.len()))?;
            for item in &items {
                seq.serialize_element(&Tracked {
                    value: item,
                    active: self.active,
                })?;
            }
            seq.end()
        } else {
            let members = self.value.members().unwrap_or_default();
            let mut map = serializer.serialize_map(Some(members.len()))?;
            for (key, member) in &members {
                map.serialize_entry(
                    &key.to_string(),
                    &Tracked {
                        value: member,
                        active: self.active,
                    },
                )?;
            }
            map.end()
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any self-describing value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Number(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Number(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Number(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<Value>()? {
            items.push(item);
        }
        Ok(Value::seq(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut members = IndexMap::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, member)) = map.next_entry::<String, Value>()? {
            members.insert(Key::Name(key), member);
        }
        Ok(Value::map(members))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_round_trip() {
        let json = json!({"a": [1, 2.5, "x", null, true], "b": {"c": {}}});
        let value: Value = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(value, Value::from(json.clone()));
        assert_eq!(serde_json::to_value(&value).unwrap(), json);
    }

    #[test]
    fn rich_scalars_serialize_as_text() {
        let v = Value::seq([
            Value::parse_date("2024-05-06T07:08:09Z").unwrap(),
            Value::regexp_literal("/a+/i").unwrap(),
            Value::Math,
            Value::Undefined,
        ]);
        assert_eq!(
            serde_json::to_value(&v).unwrap(),
            json!(["2024-05-06T07:08:09+00:00", "/a+/i", "Math", null])
        );
    }

    #[test]
    fn cycles_serialize_as_marker() {
        let a = Value::map([("n", Value::from(1))]);
        if let Value::Mapping(m) = &a {
            m.borrow_mut().insert(Key::name("me"), a.clone());
        }
        assert_eq!(
            serde_json::to_value(&a).unwrap(),
            json!({"n": 1, "me": "[Circular]"})
        );
    }

    #[test]
    fn shared_but_acyclic_nodes_serialize_twice() {
        let shared = Value::from(json!([1]));
        let v = Value::seq([shared.clone(), shared]);
        assert_eq!(serde_json::to_value(&v).unwrap(), json!([[1], [1]]));
    }

    #[test]
    fn nan_serializes_as_null_in_json() {
        let out = serde_json::to_string(&Value::Number(f64::NAN)).unwrap();
        assert_eq!(out, "null");
    }
}
