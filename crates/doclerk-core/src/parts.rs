/*
 * parts.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Part collections.

use indexmap::IndexSet;
use indexmap::set::Iter;

use crate::document::NodeRef;

/// An ordered set of nodes, deduplicated by node identity.
///
/// Two structurally identical nodes from different documents are distinct
/// parts. Iteration follows insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartSet<'d> {
    parts: IndexSet<NodeRef<'d>>,
}

impl<'d> PartSet<'d> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a part; returns `false` if it was already present.
    pub fn insert(&mut self, part: NodeRef<'d>) -> bool {
        self.parts.insert(part)
    }

    pub fn contains(&self, part: &NodeRef<'d>) -> bool {
        self.parts.contains(part)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, NodeRef<'d>> {
        self.parts.iter()
    }

    /// The first part with the given identifier.
    pub fn find(&self, id: &str) -> Option<NodeRef<'d>> {
        self.parts.iter().copied().find(|part| part.id() == Some(id))
    }

    /// Parts of `self` followed by the parts of `other` not already present.
    pub fn union(mut self, other: PartSet<'d>) -> PartSet<'d> {
        self.parts.extend(other.parts);
        self
    }
}

impl<'d> FromIterator<NodeRef<'d>> for PartSet<'d> {
    fn from_iter<I: IntoIterator<Item = NodeRef<'d>>>(iter: I) -> Self {
        Self {
            parts: iter.into_iter().collect(),
        }
    }
}

impl<'d> Extend<NodeRef<'d>> for PartSet<'d> {
    fn extend<I: IntoIterator<Item = NodeRef<'d>>>(&mut self, iter: I) {
        self.parts.extend(iter);
    }
}

impl<'d> IntoIterator for PartSet<'d> {
    type Item = NodeRef<'d>;
    type IntoIter = indexmap::set::IntoIter<NodeRef<'d>>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.into_iter()
    }
}

impl<'a, 'd> IntoIterator for &'a PartSet<'d> {
    type Item = &'a NodeRef<'d>;
    type IntoIter = Iter<'a, NodeRef<'d>>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.iter()
    }
}
