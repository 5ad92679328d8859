//! Tagged node pointers.
//!
//! A [`DdNode`] is what every operator passes around: a [`crate::node::NodeId`]
//! plus one bit of payload, the complement flag. Per the design notes, the
//! tag is never touched with a raw `^ 1` outside this module -- callers use
//! `is_complemented` / `regular` / `!` (which is `toggle`).
use std::fmt;

use crate::node::NodeId;

const COMPLEMENT_BIT: u32 = 1;

/// A (possibly complemented) reference to a node.
///
/// Equality and hashing are on the raw encoding, so two `DdNode`s compare
/// equal iff they name the same node *with the same polarity* -- which is
/// exactly the canonicity property the unique table is responsible for:
/// equal Boolean functions always produce bitwise-equal `DdNode`s.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DdNode(u32);

impl DdNode {
    #[inline]
    pub(crate) fn new(id: NodeId, complemented: bool) -> Self {
        let raw = (id.index() as u32) << 1;
        DdNode(if complemented { raw | COMPLEMENT_BIT } else { raw })
    }

    /// A regular (uncomplemented) pointer to a node already known to live
    /// in the unique table. Used by the reorder machinery, which reads
    /// `NodeId`s straight out of the table's per-level bucket lists.
    #[inline]
    pub(crate) fn regular_of(id: NodeId) -> Self {
        DdNode::new(id, false)
    }

    #[inline]
    pub(crate) fn id(self) -> NodeId {
        NodeId::from_index((self.0 >> 1) as usize)
    }

    #[inline]
    pub fn is_complemented(self) -> bool {
        self.0 & COMPLEMENT_BIT != 0
    }

    /// The same node, complement bit cleared. All of the unique-table
    /// invariants in spec.md §3 are stated in terms of this regular form.
    #[inline]
    pub fn regular(self) -> DdNode {
        DdNode(self.0 & !COMPLEMENT_BIT)
    }

    #[inline]
    pub(crate) fn to_raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn from_raw(raw: u32) -> Self {
        DdNode(raw)
    }

    /// Apply the given polarity on top of whatever this pointer already has.
    #[inline]
    pub(crate) fn with_inversion(self, invert: bool) -> Self {
        if invert {
            !self
        } else {
            self
        }
    }
}

impl std::ops::Not for DdNode {
    type Output = DdNode;
    /// Boolean complement: toggle the tag bit. O(1), no recursion -- this is
    /// the entire implementation of spec.md §4.5's "Complement" operator.
    #[inline]
    fn not(self) -> DdNode {
        DdNode(self.0 ^ COMPLEMENT_BIT)
    }
}

impl fmt::Debug for DdNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_complemented() {
            write!(f, "!{}", self.regular().id())
        } else {
            write!(f, "{}", self.id())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_is_involution() {
        let p = DdNode::new(NodeId::from_index(7), false);
        assert_eq!(!!p, p);
        assert!((!p).is_complemented());
        assert_eq!((!p).regular(), p);
    }

    #[test]
    fn regular_clears_tag_only() {
        let p = DdNode::new(NodeId::from_index(42), true);
        assert_eq!(p.regular().id(), NodeId::from_index(42));
        assert!(!p.regular().is_complemented());
    }
}
