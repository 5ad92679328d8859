//! Node storage: the arena that backs every subtable, and the saturating
//! reference count each slot carries.
use std::cell::Cell;
use std::fmt;

use crate::vid::{Level, Var};

/// Raw index into the manager's node arena. Never tagged with a complement
/// bit -- that's [`crate::ptr::DdNode`]'s job. Opaque outside the crate.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) fn from_index(i: usize) -> Self {
        NodeId(i as u32)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node's reference count. Saturates: once it reaches `u32::MAX` it never
/// decreases again, which makes the node permanent for the life of the
/// manager (this is the same trick CUDD uses to pin nodes referenced from C
/// globals that never call `Cudd_RecursiveDeref`).
pub const PERMANENT: u32 = u32::MAX;

/// The payload of a node. `Then`/`Else` are [`crate::ptr::DdNode`] values
/// (tagged pointers), stored untyped here (as raw `u32`s via
/// `crate::ptr::DdNode::to_raw`) to avoid a circular module dependency;
/// the accessors on [`crate::table::UniqueTable`] hand back typed pointers.
#[derive(Clone, Copy, Debug)]
pub(crate) enum NodeData {
    /// A terminal carrying a numeric value. The Boolean variant only ever
    /// materializes the value `1.0`; everything else is reached through the
    /// complement bit on the pointer. The arithmetic (ADD) variant
    /// materializes one terminal per distinct value.
    Terminal { value: f64 },
    /// An internal node: branches on `var` (equivalently, sits at `level`),
    /// with `then_raw`/`else_raw` the encoded child pointers.
    Internal {
        var: Var,
        level: Level,
        then_raw: u32,
        else_raw: u32,
    },
}

pub(crate) struct Slot {
    pub(crate) data: NodeData,
    /// Reference count. `Cell` because the manager mutates this in place
    /// through a shared `&Manager` during recursive deref/revive without
    /// threading `&mut` through every recursive helper.
    pub(crate) ref_count: Cell<u32>,
    /// Collision-chain link used by the unique table's bucket lists: an
    /// explicit open-chained hash set with no ordering guarantee across
    /// inserts or subtable growth, so a lookup must walk every entry in a
    /// bucket rather than assume anything about chain order.
    pub(crate) next_in_chain: Cell<Option<NodeId>>,
    /// `true` once the node has been unlinked by garbage collection and its
    /// slot is free for reuse. A freed slot is never touched by a live
    /// pointer: the arena never shrinks, so indices stay stable.
    pub(crate) dead: Cell<bool>,
}

impl Slot {
    pub(crate) fn is_dead(&self) -> bool {
        self.ref_count.get() == 0
    }

    pub(crate) fn incref(&self) {
        let rc = self.ref_count.get();
        if rc != PERMANENT {
            self.ref_count.set(rc.saturating_add(1));
        }
    }

    /// Saturating decrement. Returns `true` the moment the count transitions
    /// from 1 to 0 (i.e. the node just died), so the caller knows to recurse
    /// into the children.
    pub(crate) fn decref(&self) -> bool {
        let rc = self.ref_count.get();
        if rc == PERMANENT || rc == 0 {
            return false;
        }
        self.ref_count.set(rc - 1);
        rc == 1
    }
}
