//! Existential, universal, and OR-abstraction over a cube of variables.
//!
//! Grounded on CUDD's `cuddBddExistAbstractRecur`/`cuddBddUnivAbstractRecur`
//! (`original_source/cudd/cudd/cuddBddAbs.c`) for the three-way split on how
//! `f`'s top variable relates to the cube's, per spec.md §4.5.
use crate::error::Result;
use crate::manager::Manager;
use crate::ptr::DdNode;
use crate::vid::VarOrdering;

use super::cube::cube_rest;
use super::ite::{and, or};
use super::maybe_auto_reorder;

/// `combine_is_or` picks OR (existential/or-abstraction) vs AND (universal)
/// at each level where `f` and the cube agree on the top variable. `tag` is
/// an arbitrary sentinel (distinct between the two families) that keeps
/// their cache entries from colliding, per spec.md §4.3's tag-qualified key.
fn abstract_rec(
    manager: &Manager,
    f: DdNode,
    cube: DdNode,
    tag: DdNode,
    combine_is_or: bool,
) -> Result<DdNode> {
    manager.check_limits()?;

    if manager.is_terminal(cube) {
        return Ok(f);
    }
    if manager.is_terminal(f) {
        // Abstracting a variable out of a constant leaves it unchanged --
        // both AND(c,c) and OR(c,c) equal c for a constant `f`.
        return Ok(f);
    }
    if let Some(cached) = manager.cache_mut().lookup_abstract(tag, f, cube) {
        return Ok(cached);
    }

    let f_level = manager.level_of_node(f);
    let cube_level = manager.level_of_node(cube);
    let result = match f_level.cmp_depth(cube_level) {
        VarOrdering::Below => {
            // `f` doesn't depend on the cube's current top variable: skip
            // it in the cube and keep `f` as-is.
            abstract_rec(manager, f, cube_rest(manager, cube), tag, combine_is_or)?
        }
        VarOrdering::Level => {
            let rest = cube_rest(manager, cube);
            let then_ = manager.then_child(f).expect("non-terminal f has a then child");
            let else_ = manager.else_child(f).expect("non-terminal f has an else child");
            let t = abstract_rec(manager, then_, rest, tag, combine_is_or)?;
            let e = abstract_rec(manager, else_, rest, tag, combine_is_or)?;
            if combine_is_or { or(manager, t, e)? } else { and(manager, t, e)? }
        }
        VarOrdering::Above => {
            // `f` depends on a variable the cube hasn't reached yet: descend
            // `f` only, rebuilding its node once both cofactors are done.
            let var = manager.var_of(f).expect("non-terminal f has a variable");
            let then_ = manager.then_child(f).expect("non-terminal f has a then child");
            let else_ = manager.else_child(f).expect("non-terminal f has an else child");
            let t = abstract_rec(manager, then_, cube, tag, combine_is_or)?;
            let e = abstract_rec(manager, else_, cube, tag, combine_is_or)?;
            manager.table_mut().unique_inter(f_level, var, t, e)?
        }
    };

    manager.cache_mut().insert_abstract(tag, f, cube, result);
    Ok(result)
}

pub fn exist_abstract(manager: &Manager, f: DdNode, cube: DdNode) -> Result<DdNode> {
    maybe_auto_reorder(manager)?;
    manager.record_abstract_call();
    abstract_rec(manager, f, cube, manager.one(), true)
}

pub fn univ_abstract(manager: &Manager, f: DdNode, cube: DdNode) -> Result<DdNode> {
    maybe_auto_reorder(manager)?;
    manager.record_abstract_call();
    abstract_rec(manager, f, cube, manager.zero(), false)
}

/// OR-abstraction: the same combine rule as existential abstraction, kept
/// as a distinct name for ADD-valued diagrams where "exists" isn't the
/// natural reading but the combine operator (OR of the two branch values)
/// is the same recursion (see spec.md §4.5).
pub fn or_abstract(manager: &Manager, f: DdNode, cube: DdNode) -> Result<DdNode> {
    exist_abstract(manager, f, cube)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::Manager;
    use crate::ops::cube::cube;
    use crate::ops::ite::and;

    #[test]
    fn exist_abstracting_every_variable_of_a_satisfiable_function_is_one() {
        let m = Manager::new();
        let a = m.declare_var();
        let b = m.declare_var();
        let na = m.var_node(a).unwrap();
        let nb = m.var_node(b).unwrap();
        let f = and(&m, na, nb).unwrap();
        let c = cube(&m, &[a, b], &[true, true]).unwrap();
        assert_eq!(exist_abstract(&m, f, c).unwrap(), m.one());
    }

    #[test]
    fn univ_abstracting_a_variable_that_kills_satisfiability_is_zero() {
        let m = Manager::new();
        let a = m.declare_var();
        let na = m.var_node(a).unwrap();
        let c = cube(&m, &[a], &[true]).unwrap();
        // forall a. a  == false
        assert_eq!(univ_abstract(&m, na, c).unwrap(), m.zero());
    }

    #[test]
    fn abstracting_with_the_trivial_cube_is_identity() {
        let m = Manager::new();
        let a = m.declare_var();
        let na = m.var_node(a).unwrap();
        assert_eq!(exist_abstract(&m, na, m.one()).unwrap(), na);
    }
}
