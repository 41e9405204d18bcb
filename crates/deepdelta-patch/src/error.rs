//! Error types for the patch crate.

use deepdelta_types::{Key, Kind, Path};

/// Errors that can occur while replaying a change record.
///
/// Replay is otherwise lenient: missing intermediate containers are
/// created and missing slots are simply written.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PatchError {
    /// The path runs through a value that has no members.
    #[error("cannot address a member of {kind} at {path}")]
    NotAContainer { path: Path, kind: Kind },

    /// A non-positional key was used on a sequence.
    #[error("key {key:?} does not address a sequence element at {path}")]
    InvalidKey { path: Path, key: Key },

    /// An array change targets a slot holding something other than a sequence.
    #[error("expected a sequence at {path}, found {kind}")]
    NotASequence { path: Path, kind: Kind },
}

/// Convenience alias for patch results.
pub type PatchResult<T> = Result<T, PatchError>;
