//! Per-call diff behavior.

use std::fmt;

use crate::filter::Prefilter;

/// Options for a single top-level diff.
#[derive(Clone, Copy, Default)]
pub struct DiffOptions<'a> {
    /// Hooks consulted at every non-root node.
    pub prefilter: Option<&'a dyn Prefilter>,
    /// Compare sequences as unordered collections.
    ///
    /// Elements are paired by rank in order-independent hash order. Indices
    /// in the resulting records address the left sequence as the caller
    /// holds it, so the records replay onto it; neither input is reordered.
    pub order_independent: bool,
}

impl<'a> DiffOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefilter(mut self, prefilter: &'a dyn Prefilter) -> Self {
        self.prefilter = Some(prefilter);
        self
    }

    pub fn with_order_independent(mut self, order_independent: bool) -> Self {
        self.order_independent = order_independent;
        self
    }
}

impl fmt::Debug for DiffOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffOptions")
            .field("prefilter", &self.prefilter.is_some())
            .field("order_independent", &self.order_independent)
            .finish()
    }
}
