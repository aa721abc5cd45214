//! Per-ancestor field counts
//!
//! Counting is a separate pass that finishes before any promotion is decided, so the
//! tree mutations done while promoting never change the numbers the decisions use.

use std::collections::HashMap;

use super::FieldKind;
use crate::xml::{Document, NodeId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldCounts {
    pub total: usize,
    pub variables: usize,
    pub blocks: usize,
}

/// Side table of [`FieldCounts`] keyed by node. Built for one tree only.
#[derive(Debug, Default)]
pub struct FieldCounter {
    counts: HashMap<NodeId, FieldCounts>,
}

impl FieldCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one field: its parent and every ancestor up to and including the root
    /// get their counts bumped. The field itself is not counted.
    pub fn record(&mut self, doc: &Document, field: NodeId, kind: FieldKind) {
        let Some(parent) = doc.parent(field) else {
            return;
        };
        for node in std::iter::once(parent).chain(doc.ancestors(parent)) {
            let counts = self.counts.entry(node).or_default();
            counts.total += 1;
            match kind {
                FieldKind::Variable => counts.variables += 1,
                FieldKind::Block => counts.blocks += 1,
            }
        }
    }

    /// Counts for a node; zero when no field sits below it
    pub fn get(&self, node: NodeId) -> FieldCounts {
        self.counts.get(&node).copied().unwrap_or_default()
    }

    pub fn total(&self, node: NodeId) -> usize {
        self.get(node).total
    }
}
