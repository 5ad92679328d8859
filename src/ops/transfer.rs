//! Transfer, Swap, and Permute: the cross-manager and variable-permutation
//! family of spec.md §4.5, all expressed as a recursive rebuild backed by a
//! local node-to-node memo that outlives the single call (as opposed to the
//! manager's own computed cache, which is keyed for same-manager operators
//! and cleared on GC/reorder).
//!
//! Grounded on CUDD's `cuddBddTransfer.c` (a local hash table mapping
//! source nodes to destination nodes) and `cuddBddPermuteRecur` (the
//! permutation recursion, memoized the same way); this crate's version of
//! [`reorder::translate_ptr`](crate::reorder) uses the identical
//! regular-pointer-keyed memo shape for the same reason.
use hashbrown::HashMap;

use crate::error::{ErrorKind, Result};
use crate::manager::Manager;
use crate::ptr::DdNode;
use crate::vid::Var;

use super::maybe_auto_reorder;

/// Rebuild `f` (which lives in `src`) inside `dest`, assuming `dest` has at
/// least as many variables as `src` uses and the same level-ordering
/// semantics (variable `i` occupies the same level in both managers).
pub fn transfer(src: &Manager, f: DdNode, dest: &Manager) -> Result<DdNode> {
    if dest.num_vars() < src.num_vars() {
        return Err(dest.fail_with(
            ErrorKind::InvalidArgument,
            "transfer: destination manager has fewer variables than the source",
        ));
    }
    let mut memo: HashMap<DdNode, DdNode> = HashMap::new();
    transfer_rec(src, dest, f, &mut memo)
}

fn transfer_rec(
    src: &Manager,
    dest: &Manager,
    f: DdNode,
    memo: &mut HashMap<DdNode, DdNode>,
) -> Result<DdNode> {
    src.check_limits()?;
    let regular = f.regular();
    let mapped = if let Some(&cached) = memo.get(&regular) {
        cached
    } else if src.is_terminal(regular) {
        let value = src.terminal_value(regular).expect("terminal node has a value");
        let node = if value == 1.0 { dest.one() } else { dest.constant(value)? };
        memo.insert(regular, node);
        node
    } else {
        let level = src.level_of_node(regular);
        let var = dest.var_at_level(level);
        let then_ = src.then_child(regular).expect("non-terminal has a then child");
        let else_ = src.else_child(regular).expect("non-terminal has an else child");
        let t = transfer_rec(src, dest, then_, memo)?;
        let e = transfer_rec(src, dest, else_, memo)?;
        let node = dest.table_mut().unique_inter(level, var, t, e)?;
        memo.insert(regular, node);
        node
    };
    Ok(mapped.with_inversion(f.is_complemented()))
}

/// Rebuild `f` with every variable renamed according to `mapping`
/// (variables absent from `mapping` keep their identity).
pub fn permute(manager: &Manager, f: DdNode, mapping: &HashMap<Var, Var>) -> Result<DdNode> {
    maybe_auto_reorder(manager)?;
    let mut memo: HashMap<DdNode, DdNode> = HashMap::new();
    permute_rec(manager, f, mapping, &mut memo)
}

fn permute_rec(
    manager: &Manager,
    f: DdNode,
    mapping: &HashMap<Var, Var>,
    memo: &mut HashMap<DdNode, DdNode>,
) -> Result<DdNode> {
    manager.check_limits()?;
    let regular = f.regular();
    let mapped = if let Some(&cached) = memo.get(&regular) {
        cached
    } else if manager.is_terminal(regular) {
        regular
    } else {
        let var = manager.var_of(regular).expect("non-terminal has a variable");
        let new_var = *mapping.get(&var).unwrap_or(&var);
        let then_ = manager.then_child(regular).expect("non-terminal has a then child");
        let else_ = manager.else_child(regular).expect("non-terminal has an else child");
        let t = permute_rec(manager, then_, mapping, memo)?;
        let e = permute_rec(manager, else_, mapping, memo)?;
        let level = manager.level_of(new_var);
        let node = manager.table_mut().unique_inter(level, new_var, t, e)?;
        memo.insert(regular, node);
        node
    };
    Ok(mapped.with_inversion(f.is_complemented()))
}

/// Swap the roles of `a` and `b` throughout `f`: a two-variable permutation.
pub fn swap(manager: &Manager, f: DdNode, a: Var, b: Var) -> Result<DdNode> {
    let mut mapping = HashMap::with_capacity(2);
    mapping.insert(a, b);
    mapping.insert(b, a);
    permute(manager, f, &mapping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::Manager;
    use crate::ops::ite::and;

    #[test]
    fn transfer_round_trips_a_function_between_two_managers() {
        let src = Manager::new();
        let a = src.declare_var();
        let b = src.declare_var();
        let na = src.var_node(a).unwrap();
        let nb = src.var_node(b).unwrap();
        let f = and(&src, na, nb).unwrap();

        let dest = Manager::new();
        dest.declare_var();
        dest.declare_var();
        let transferred = transfer(&src, f, &dest).unwrap();

        let dna = dest.var_node(a).unwrap();
        let dnb = dest.var_node(b).unwrap();
        let expected = and(&dest, dna, dnb).unwrap();
        assert_eq!(transferred, expected);
    }

    #[test]
    fn transfer_rejects_a_destination_with_too_few_variables() {
        let src = Manager::new();
        let a = src.declare_var();
        let na = src.var_node(a).unwrap();
        let dest = Manager::new();
        assert!(transfer(&src, na, &dest).is_err());
    }

    #[test]
    fn swapping_a_variable_with_itself_is_identity() {
        let m = Manager::new();
        let a = m.declare_var();
        let na = m.var_node(a).unwrap();
        assert_eq!(swap(&m, na, a, a).unwrap(), na);
    }

    #[test]
    fn swapping_two_variables_exchanges_their_literals() {
        let m = Manager::new();
        let a = m.declare_var();
        let b = m.declare_var();
        let na = m.var_node(a).unwrap();
        let nb = m.var_node(b).unwrap();
        assert_eq!(swap(&m, na, a, b).unwrap(), nb);
        assert_eq!(swap(&m, nb, a, b).unwrap(), na);
    }
}
