//! Order-independent pseudo-hash.
//!
//! [`order_independent_hash`] yields a sort key such that two sequences with
//! the same elements in a different order hash identically. It is not
//! collision free and must never be used to prove equality; it only gives a
//! stable total order for sorting before comparison.

use crate::kind::Kind;
use crate::value::Value;

/// 32-bit rolling multiply-add string hash (`h = h * 31 + unit`), over
/// UTF-16 code units. The empty string hashes to 0.
pub fn hash_str(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Hash a value independently of sibling order.
///
/// Cyclic back-references contribute the hash of a fixed tag instead of
/// being followed.
pub fn order_independent_hash(value: &Value) -> i64 {
    let mut active = Vec::new();
    hash_value(value, &mut active)
}

fn hash_value(value: &Value, active: &mut Vec<usize>) -> i64 {
    if let Some(id) = value.ref_id() {
        if active.contains(&id) {
            return i64::from(hash_str("[ type: circular ]"));
        }
        active.push(id);
    }

    let hash = match value {
        Value::Sequence(_) => {
            let accum = value
                .elements()
                .unwrap_or_default()
                .iter()
                .fold(0i64, |acc, item| acc.wrapping_add(hash_value(item, active)));
            let tag = format!("[type: array, hash: {}]", accum);
            accum.wrapping_add(i64::from(hash_str(&tag)))
        }
        Value::Mapping(_) => value
            .members()
            .unwrap_or_default()
            .iter()
            .fold(0i64, |acc, (key, member)| {
                let tag = format!(
                    "[ type: object, key: {}, value hash: {}]",
                    key,
                    hash_value(member, active)
                );
                acc.wrapping_add(i64::from(hash_str(&tag)))
            }),
        other => {
            let tag = format!("[ type: {} ; value: {}]", Kind::of(other), other);
            i64::from(hash_str(&tag))
        }
    };

    if value.is_container() {
        active.pop();
    }
    hash
}

/// Positions of `items` in ascending order-independent hash order.
///
/// The sort is stable, so elements with equal hashes keep their relative
/// order.
pub fn hash_order(items: &[Value]) -> Vec<usize> {
    let hashes: Vec<i64> = items.iter().map(order_independent_hash).collect();
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by_key(|&i| hashes[i]);
    order
}

/// Sort a copy of `items` by ascending order-independent hash, with the
/// same tie-breaking as [`hash_order`].
pub fn sorted_by_hash(items: &[Value]) -> Vec<Value> {
    hash_order(items).into_iter().map(|i| items[i].clone()).collect()
}
