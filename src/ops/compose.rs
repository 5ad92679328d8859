//! Compose, Cofactor, Restrict, and Constrain: the substitution and
//! generalized-cofactor family of spec.md §4.5.
//!
//! Grounded on CUDD's `cuddBddComposeRecur` (`cuddCompose.c`) for Compose,
//! and `cuddBddConstrainRecur`/`cuddBddRestrictRecur` (`cuddGenCof.c`) for
//! Constrain/Restrict's generalized-cofactor recursion. Restrict here
//! implements the same generalized-cofactor core as Constrain rather than
//! CUDD's full Coudert-Madre size-minimizing quotient search -- see
//! DESIGN.md for why that narrower scope was kept.
use crate::error::Result;
use crate::manager::Manager;
use crate::ptr::DdNode;
use crate::vid::{Var, VarOrdering};

use super::cube::{cube_phase, cube_rest, require_cube};
use super::ite::ite;
use super::maybe_auto_reorder;

/// Substitute `g` for variable `x` throughout `f`.
pub fn compose(manager: &Manager, f: DdNode, x: Var, g: DdNode) -> Result<DdNode> {
    maybe_auto_reorder(manager)?;
    let x_node = manager.var_node(x)?;
    compose_rec(manager, f, x, x_node, g)
}

fn compose_rec(manager: &Manager, f: DdNode, x: Var, x_node: DdNode, g: DdNode) -> Result<DdNode> {
    manager.check_limits()?;
    if manager.is_terminal(f) {
        return Ok(f);
    }
    let f_level = manager.level_of_node(f);
    let x_level = manager.level_of(x);
    if f_level.is_below(x_level) {
        // The diagram is ordered, so once we've passed `x`'s level without
        // meeting it, `f` never depended on `x` at all.
        return Ok(f);
    }
    if let Some(cached) = manager.cache_mut().lookup_compose(f, x_node, g) {
        return Ok(cached);
    }
    let result = if f_level == x_level {
        let then_ = manager.then_child(f).expect("non-terminal f has a then child");
        let else_ = manager.else_child(f).expect("non-terminal f has an else child");
        ite(manager, g, then_, else_)?
    } else {
        let var = manager.var_of(f).expect("non-terminal f has a variable");
        let then_ = manager.then_child(f).expect("non-terminal f has a then child");
        let else_ = manager.else_child(f).expect("non-terminal f has an else child");
        let t = compose_rec(manager, then_, x, x_node, g)?;
        let e = compose_rec(manager, else_, x, x_node, g)?;
        manager.table_mut().unique_inter(f_level, var, t, e)?
    };
    manager.cache_mut().insert_compose(f, x_node, g, result);
    Ok(result)
}

/// Simultaneous substitution: compose every `(var, image)` pair into `f` in
/// one pass, rather than one variable at a time (spec.md §4.5's
/// Vector-Compose, shared with [`crate::ops::transfer`]'s permutation
/// family since both rebuild a diagram under a variable-keyed mapping).
pub fn vector_compose(manager: &Manager, f: DdNode, images: &[(Var, DdNode)]) -> Result<DdNode> {
    maybe_auto_reorder(manager)?;
    let mut result = f;
    // Substituting in level order, deepest first, means each single
    // substitution only ever touches variables strictly above the ones
    // already replaced, so the pairwise compositions don't interfere.
    let mut sorted: Vec<&(Var, DdNode)> = images.iter().collect();
    sorted.sort_by_key(|(v, _)| std::cmp::Reverse(manager.level_of(*v).index()));
    for &(var, image) in sorted {
        let x_node = manager.var_node(var)?;
        result = compose_rec(manager, result, var, x_node, image)?;
    }
    Ok(result)
}

/// Restrict `f` to the cube `g`: substitute each cube literal's fixed value
/// into `f`. Rejects a non-cube `g`.
pub fn cofactor(manager: &Manager, f: DdNode, cube: DdNode) -> Result<DdNode> {
    maybe_auto_reorder(manager)?;
    require_cube(manager, cube, "cofactor")?;
    cofactor_rec(manager, f, cube)
}

fn cofactor_rec(manager: &Manager, f: DdNode, cube: DdNode) -> Result<DdNode> {
    manager.check_limits()?;
    if manager.is_terminal(cube) || manager.is_terminal(f) {
        return Ok(f);
    }
    if let Some(cached) = manager.cache_mut().lookup_cofactor(f, cube) {
        return Ok(cached);
    }
    let f_level = manager.level_of_node(f);
    let cube_level = manager.level_of_node(cube);
    let result = match f_level.cmp_depth(cube_level) {
        VarOrdering::Below => cofactor_rec(manager, f, cube_rest(manager, cube))?,
        VarOrdering::Level => {
            let branch = if cube_phase(manager, cube) {
                manager.then_child(f).expect("non-terminal f has a then child")
            } else {
                manager.else_child(f).expect("non-terminal f has an else child")
            };
            cofactor_rec(manager, branch, cube_rest(manager, cube))?
        }
        VarOrdering::Above => {
            let var = manager.var_of(f).expect("non-terminal f has a variable");
            let then_ = manager.then_child(f).expect("non-terminal f has a then child");
            let else_ = manager.else_child(f).expect("non-terminal f has an else child");
            let t = cofactor_rec(manager, then_, cube)?;
            let e = cofactor_rec(manager, else_, cube)?;
            manager.table_mut().unique_inter(f_level, var, t, e)?
        }
    };
    manager.cache_mut().insert_cofactor(f, cube, result);
    Ok(result)
}

/// Generalized cofactor of `f` against care-set `c`: `constrain(f,c) ∧ c ==
/// f ∧ c`, but the result is usually a smaller diagram than `f` itself
/// since don't-care regions (where `c` is false) are free to simplify away.
pub fn constrain(manager: &Manager, f: DdNode, c: DdNode) -> Result<DdNode> {
    maybe_auto_reorder(manager)?;
    generalized_cofactor(manager, f, c, false)
}

/// Restrict: the same generalized-cofactor recursion as `constrain`, kept
/// as a distinct entry point per spec.md §4.5's naming (CUDD's full
/// `cuddBddRestrict` additionally tries a quotient-minimizing heuristic on
/// top of this, which this crate doesn't implement -- see DESIGN.md).
pub fn restrict(manager: &Manager, f: DdNode, c: DdNode) -> Result<DdNode> {
    maybe_auto_reorder(manager)?;
    generalized_cofactor(manager, f, c, true)
}

fn generalized_cofactor(manager: &Manager, f: DdNode, c: DdNode, is_restrict: bool) -> Result<DdNode> {
    manager.check_limits()?;
    if c == manager.one() {
        return Ok(f);
    }
    if c == manager.zero() {
        // The care set is empty: any result satisfies the defining identity
        // vacuously. CUDD's convention is to return the constant 1.
        return Ok(manager.one());
    }
    if manager.is_terminal(f) {
        return Ok(f);
    }
    let cached = if is_restrict {
        manager.cache_mut().lookup_restrict(f, c)
    } else {
        manager.cache_mut().lookup_constrain(f, c)
    };
    if let Some(cached) = cached {
        return Ok(cached);
    }

    let top = crate::vid::topmost(manager.level_of_node(f), manager.level_of_node(c));
    let (f1, f0) = crate::shannon::cofactors(manager, f, top);
    let (c1, c0) = crate::shannon::cofactors(manager, c, top);

    let result = if c1 == manager.zero() {
        generalized_cofactor(manager, f0, c0, is_restrict)?
    } else if c0 == manager.zero() {
        generalized_cofactor(manager, f1, c1, is_restrict)?
    } else {
        let t = generalized_cofactor(manager, f1, c1, is_restrict)?;
        let e = generalized_cofactor(manager, f0, c0, is_restrict)?;
        let var = manager.var_at_level(top);
        manager.table_mut().unique_inter(top, var, t, e)?
    };

    if is_restrict {
        manager.cache_mut().insert_restrict(f, c, result);
    } else {
        manager.cache_mut().insert_constrain(f, c, result);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::Manager;
    use crate::ops::cube::cube;
    use crate::ops::ite::and;

    #[test]
    fn composing_a_constant_for_a_variable_cofactors() {
        let m = Manager::new();
        let a = m.declare_var();
        let b = m.declare_var();
        let na = m.var_node(a).unwrap();
        let nb = m.var_node(b).unwrap();
        let f = and(&m, na, nb).unwrap();
        assert_eq!(compose(&m, f, a, m.one()).unwrap(), nb);
        assert_eq!(compose(&m, f, a, m.zero()).unwrap(), m.zero());
    }

    #[test]
    fn cofactor_by_cube_fixes_the_named_literals() {
        let m = Manager::new();
        let a = m.declare_var();
        let b = m.declare_var();
        let na = m.var_node(a).unwrap();
        let nb = m.var_node(b).unwrap();
        let f = and(&m, na, nb).unwrap();
        let c = cube(&m, &[a], &[true]).unwrap();
        assert_eq!(cofactor(&m, f, c).unwrap(), nb);
    }

    #[test]
    fn cofactor_rejects_a_non_cube_argument() {
        let m = Manager::new();
        let a = m.declare_var();
        let b = m.declare_var();
        let na = m.var_node(a).unwrap();
        let nb = m.var_node(b).unwrap();
        let f = and(&m, na, nb).unwrap();
        assert!(cofactor(&m, na, f).is_err());
    }

    #[test]
    fn constrain_on_a_full_care_set_is_identity() {
        let m = Manager::new();
        let a = m.declare_var();
        let na = m.var_node(a).unwrap();
        assert_eq!(constrain(&m, na, m.one()).unwrap(), na);
    }
}
