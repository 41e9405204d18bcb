//! Patch engine for deepdelta.
//!
//! Replays [`Diff`] records against a target value ([`apply_change`]) and
//! undoes them ([`revert_change`]). Paths are resolved against the target's
//! current shape; missing intermediate containers are created on demand.
//!
//! # Key Types
//!
//! - [`apply_change`] / [`apply_all`] -- Forward replay
//! - [`revert_change`] / [`revert_all`] -- Undo
//! - [`apply_diff`] -- Diff and replay in one step, with an optional filter
//! - [`PatchError`] -- Addressing failures
//!
//! [`Diff`]: deepdelta_types::Diff

pub mod apply;
pub mod error;
mod navigate;
pub mod replay;
pub mod revert;

pub use apply::{apply_all, apply_change};
pub use error::{PatchError, PatchResult};
pub use replay::{apply_diff, ChangeFilter};
pub use revert::{revert_all, revert_change};
