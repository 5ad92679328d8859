//! The cube builder: from an array of variables and a phase vector, produce
//! the conjunction (Boolean) or product (arithmetic) bottom-up, per
//! spec.md §4.5. Grounded on the teacher's pattern of building a BDD
//! path directly through `unique_inter`-equivalent calls rather than going
//! through the general `ite` skeleton, since a literal chain never needs
//! a Shannon split against anything else.
use crate::error::{ErrorKind, Result};
use crate::manager::Manager;
use crate::ptr::DdNode;
use crate::vid::Var;

/// Build the conjunction of the given literals (`vars[i]` in positive phase
/// if `phases[i]`, negative otherwise), as a path of same-phase internal
/// nodes terminating in `one`. Built bottom-up (deepest variable first) so
/// every intermediate node is already in reduced, canonical form.
pub fn cube(manager: &Manager, vars: &[Var], phases: &[bool]) -> Result<DdNode> {
    if vars.len() != phases.len() {
        return Err(manager.fail_with(
            ErrorKind::InvalidArgument,
            "cube: vars and phases must have the same length",
        ));
    }
    let mut literals: Vec<(Var, bool)> = vars.iter().copied().zip(phases.iter().copied()).collect();
    literals.sort_by_key(|(v, _)| std::cmp::Reverse(manager.level_of(*v).index()));

    let mut acc = manager.one();
    for (var, phase) in literals {
        let level = manager.level_of(var);
        let (then_, else_) = if phase { (acc, manager.zero()) } else { (manager.zero(), acc) };
        acc = manager.table_mut().unique_inter(level, var, then_, else_)?;
    }
    Ok(acc)
}

/// Whether `f` is a legal cube: every internal node has one child equal to
/// the constant-0 terminal and the other continuing the chain, with no
/// variable repeated. Used by [`crate::ops::compose::cofactor`] to reject
/// a non-cube restriction set per spec.md §4.5.
pub fn is_cube(manager: &Manager, f: DdNode) -> bool {
    let mut seen = hashbrown::HashSet::new();
    let mut cur = f;
    loop {
        if manager.is_terminal(cur) {
            return manager.terminal_value(cur) == Some(1.0);
        }
        let var = manager.var_of(cur).expect("non-terminal has a variable");
        if !seen.insert(var) {
            return false;
        }
        let then_ = manager.then_child(cur).expect("non-terminal has a then child");
        let else_ = manager.else_child(cur).expect("non-terminal has an else child");
        cur = if then_ == manager.zero() {
            else_
        } else if else_ == manager.zero() {
            then_
        } else {
            return false;
        };
    }
}

pub(crate) fn require_cube(manager: &Manager, f: DdNode, what: &str) -> Result<()> {
    if is_cube(manager, f) {
        Ok(())
    } else {
        Err(manager.fail_with(ErrorKind::InvalidArgument, format!("{what}: argument is not a cube")))
    }
}

/// The child of a cube node that continues the literal chain, regardless of
/// that variable's phase (the other child is always the constant-0
/// terminal). Shared by every recursion that walks a cube one variable at
/// a time: abstraction, cofactor-by-cube.
pub(crate) fn cube_rest(manager: &Manager, cube: DdNode) -> DdNode {
    let then_ = manager.then_child(cube).expect("non-terminal cube node has a then child");
    if then_ == manager.zero() {
        manager.else_child(cube).expect("non-terminal cube node has an else child")
    } else {
        then_
    }
}

/// Whether a cube node's current variable appears in positive phase.
pub(crate) fn cube_phase(manager: &Manager, cube: DdNode) -> bool {
    manager.then_child(cube).expect("non-terminal cube node has a then child") != manager.zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::Manager;

    #[test]
    fn cube_of_a_single_positive_literal_is_the_var_node() {
        let m = Manager::new();
        let a = m.declare_var();
        assert_eq!(cube(&m, &[a], &[true]).unwrap(), m.var_node(a).unwrap());
    }

    #[test]
    fn cube_builder_rejects_mismatched_lengths() {
        let m = Manager::new();
        let a = m.declare_var();
        assert!(cube(&m, &[a], &[]).is_err());
    }

    #[test]
    fn var_node_chain_is_a_cube_but_an_arbitrary_function_is_not() {
        let m = Manager::new();
        let a = m.declare_var();
        let b = m.declare_var();
        let na = m.var_node(a).unwrap();
        let nb = m.var_node(b).unwrap();
        let c = cube(&m, &[a, b], &[true, false]).unwrap();
        assert!(is_cube(&m, c));
        assert!(!is_cube(&m, super::super::ite::or(&m, na, nb).unwrap()));
    }
}
