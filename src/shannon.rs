//! The Shannon-cofactor step shared by the recursive-operator skeleton
//! (`ops::*`) and the level-swap primitive (`reorder::swap_adjacent`):
//! given a node and the level being split on, return its (then, else)
//! pair if it actually branches there, or itself twice if it doesn't
//! depend on that level at all.
use crate::manager::Manager;
use crate::ptr::DdNode;
use crate::vid::Level;

#[inline]
pub(crate) fn cofactors(manager: &Manager, p: DdNode, level: Level) -> (DdNode, DdNode) {
    if manager.is_terminal(p) || manager.level_of_node(p) != level {
        (p, p)
    } else {
        let then_ = manager.then_child(p).expect("non-terminal has a then child");
        let else_ = manager.else_child(p).expect("non-terminal has an else child");
        (then_, else_)
    }
}
