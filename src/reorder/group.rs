//! Group sifting.
//!
//! spec.md's own Non-goals exclude the multiway-tree utility that lets an
//! external caller pin which variables must move together (variable
//! groups as a first-class, externally-populated tree). What's left in
//! scope is just the *method slot* in [`super::ReorderMethod`] -- CUDD
//! callers can ask for `GROUP_SIFT` even with no groups declared, in which
//! case every variable is its own singleton group and the method is
//! exactly classical sifting. That's the only case this crate implements;
//! [`VarGroup`] is kept as a placeholder for the one piece of the real
//! group API (naming a block of variables) that a caller might still
//! reasonably want without pulling in the full tree machinery.
use crate::error::Result;
use crate::manager::Manager;
use crate::vid::Var;

/// A block of variables that should be treated as a single sifting unit.
/// Not consulted by [`group_sift`] yet -- see the module doc comment.
#[derive(Clone, Debug)]
pub struct VarGroup {
    pub vars: Vec<Var>,
}

impl VarGroup {
    pub fn new(vars: Vec<Var>) -> Self {
        VarGroup { vars }
    }
}

pub(crate) fn group_sift(manager: &Manager) -> Result<i64> {
    super::sift_converge(manager)
}
