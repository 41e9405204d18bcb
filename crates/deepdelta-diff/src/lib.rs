//! Diff engine for deepdelta.
//!
//! Walks two values in lock-step and emits [`Diff`] records describing how
//! the left (origin) value differs from the right (comparand) value.
//! Sequences are compared position by position from the tail, or as
//! unordered collections when order independence is requested. Cyclic
//! graphs are handled by a per-call cycle stack.
//!
//! # Key Types
//!
//! - [`diff`] / [`observable_diff`] / [`accumulate_diff`] -- Entry points
//! - [`DiffOptions`] -- Per-call behavior (prefilter, order independence)
//! - [`Prefilter`] / [`FilterFns`] / [`IgnoreRules`] -- Caller hooks
//! - [`DiffConfig`] -- Declarative configuration loaded from TOML
//!
//! [`Diff`]: deepdelta_types::Diff

pub mod config;
mod engine;
pub mod error;
pub mod filter;
pub mod observe;
pub mod options;

pub use config::DiffConfig;
pub use error::{DiffError, DiffResult};
pub use filter::{FilterFns, IgnoreRules, Prefilter};
pub use observe::{accumulate_diff, diff, is_equal, observable_diff, Observer};
pub use options::DiffOptions;
