//! The recursive-operator skeleton and the concrete operators built on it.
//!
//! Every operator here follows the same five-step shape from spec.md §4.4:
//! terminal cases, canonical argument form, cache probe, a limit check,
//! then a Shannon split on the topmost variable among the operands,
//! recursion, reconstruction through the unique table, and a cache
//! insert on the way back out. `ite` is the only operator that implements
//! this directly; everything else (`and`, `or`, `xor`, ...) is expressed
//! in terms of it, mirroring how the teacher's `BddBase::ite` is the one
//! primitive `Base`'s other methods are built from.
pub mod compose;
pub mod cube;
pub mod ite;
pub mod prime;
pub mod quant;
pub mod transfer;

use crate::error::Result;
use crate::manager::Manager;

/// Run auto-reorder if the manager is configured for it and has grown past
/// its threshold since the last check. Called once at the start of each
/// top-level operator entry point, never from inside the recursion --
/// see SPEC_FULL.md §4's note on retry-at-the-outermost-frame.
pub(crate) fn maybe_auto_reorder(manager: &Manager) -> Result<()> {
    if let Some(method) = manager.auto_reorder_method() {
        if manager.node_count() > manager.reorder_size_threshold() {
            manager.reduce_heap(method)?;
        }
    }
    Ok(())
}
