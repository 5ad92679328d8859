//! `MaximallyExpand`: widen a care cube as far as possible while staying
//! inside an upper-bound cube and inside a function's onset, per spec.md
//! §8's sixth testable scenario.
//!
//! Grounded on the `Cudd_bddMaximallyExpand`/`Cudd_bddMakePrime` pair
//! declared in `cudd.h` (`extern DdNode * Cudd_bddMaximallyExpand(DdManager
//! *dd, DdNode *lb, DdNode *ub, DdNode *f)`); the implementation itself
//! isn't in the indexed CUDD sources, so the greedy literal-drop loop below
//! is derived directly from spec.md §8's worked example rather than a
//! line-for-line port -- see DESIGN.md.
use crate::error::Result;
use crate::manager::Manager;
use crate::ptr::DdNode;
use crate::vid::Var;

use super::cube::{cube, cube_phase, cube_rest, require_cube};
use super::ite::{and, not};

fn literals_of(manager: &Manager, mut cur: DdNode) -> Vec<(Var, bool)> {
    let mut out = Vec::new();
    while !manager.is_terminal(cur) {
        let var = manager.var_of(cur).expect("non-terminal has a variable");
        out.push((var, cube_phase(manager, cur)));
        cur = cube_rest(manager, cur);
    }
    out
}

fn build(manager: &Manager, literals: &[(Var, bool)]) -> Result<DdNode> {
    if literals.is_empty() {
        return Ok(manager.one());
    }
    let vars: Vec<Var> = literals.iter().map(|(v, _)| *v).collect();
    let phases: Vec<bool> = literals.iter().map(|(_, p)| *p).collect();
    cube(manager, &vars, &phases)
}

/// `a ⊆ b`, i.e. `a` implies `b`: true iff `a ∧ ¬b` is unsatisfiable.
fn implies(manager: &Manager, a: DdNode, b: DdNode) -> Result<bool> {
    let not_b = not(manager, b);
    Ok(and(manager, a, not_b)? == manager.zero())
}

/// Widen `lower` (a care cube known to imply `f`) by dropping as many of
/// its literals as possible while the result still implies both `upper`
/// and `f`. The search is greedy: each pass tries dropping every
/// remaining literal in turn, keeping any drop that stays valid, and
/// repeats until a full pass changes nothing.
pub fn maximally_expand(manager: &Manager, lower: DdNode, upper: DdNode, f: DdNode) -> Result<DdNode> {
    require_cube(manager, lower, "maximally_expand: lower bound")?;
    require_cube(manager, upper, "maximally_expand: upper bound")?;

    let mut literals = literals_of(manager, lower);
    let mut changed = true;
    while changed {
        changed = false;
        let mut i = 0;
        while i < literals.len() {
            let mut candidate = literals.clone();
            candidate.remove(i);
            let candidate_cube = build(manager, &candidate)?;
            if implies(manager, candidate_cube, upper)? && implies(manager, candidate_cube, f)? {
                literals = candidate;
                changed = true;
            } else {
                i += 1;
            }
        }
    }
    build(manager, &literals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::Manager;
    use crate::ops::ite::{and, not, or};

    #[test]
    fn maximally_expand_drops_the_literal_the_upper_bound_does_not_require() {
        let m = Manager::new();
        let x0 = m.declare_var();
        let x1 = m.declare_var();
        let x2 = m.declare_var();
        let x3 = m.declare_var();
        let n0 = m.var_node(x0).unwrap();
        let n1 = m.var_node(x1).unwrap();
        let n2 = m.var_node(x2).unwrap();
        let n3 = m.var_node(x3).unwrap();

        // f = (x1·x3) | (x0·¬x2·x3) | (¬x0·x1·¬x2)
        let term1 = and(&m, n1, n3).unwrap();
        let term2 = and(&m, and(&m, n0, not(&m, n2)).unwrap(), n3).unwrap();
        let term3 = and(&m, and(&m, not(&m, n0), n1).unwrap(), not(&m, n2)).unwrap();
        let f = or(&m, or(&m, term1, term2).unwrap(), term3).unwrap();

        let lower = cube(&m, &[x1, x2, x3], &[true, false, true]).unwrap();
        let upper = cube(&m, &[x3], &[true]).unwrap();

        let expanded = maximally_expand(&m, lower, upper, f).unwrap();
        let expected = and(&m, n1, n3).unwrap();
        assert_eq!(expanded, expected);
    }
}
