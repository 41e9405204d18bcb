//! Foundation types for deepdelta.
//!
//! This crate provides the value graph that the diff and patch engines work
//! on, together with the change-record model they share. Every other
//! deepdelta crate depends on `deepdelta-types`.
//!
//! # Key Types
//!
//! - [`Value`] -- Closed tagged union over scalars, dates, regexps, sequences and mappings
//! - [`Kind`] -- Classified type of a value
//! - [`Key`] / [`Path`] -- Location of a change relative to the compared root
//! - [`Diff`] -- Change record (`New`, `Deleted`, `Edited`, `Array`)
//! - [`order_independent_hash`] -- Sort key for order-independent comparison

pub mod change;
pub mod codec;
pub mod error;
pub mod hash;
pub mod key;
pub mod kind;
pub mod value;

pub use change::{Diff, DiffKind};
pub use error::{TypeError, TypeResult};
pub use hash::{hash_order, hash_str, order_independent_hash, sorted_by_hash};
pub use key::{Key, Path, Symbol};
pub use kind::Kind;
pub use value::{format_number, Members, Opaque, RegExp, Shared, Value};
