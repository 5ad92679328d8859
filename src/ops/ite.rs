//! The recursive ITE operator: the one primitive every other Boolean
//! operator in this crate is built from, the same way the teacher's
//! `BddBase::ite` anchors `and`/`xor`/`gt`/`lt` in `bdd.rs`.
//!
//! Grounded on `ITE::norm` in the teacher's `bdd.rs` (the standard-triples
//! normalization from Bryant's "Efficient Implementation of a BDD
//! Package") for which reductions apply before a split, and on CUDD's
//! `cuddBddIte.c` for the recursive Shannon-split shape: terminal cases,
//! canonical argument form, a cache probe, a limit check, then recursion
//! on both cofactors of the topmost variable among the three operands.
use crate::error::Result;
use crate::manager::Manager;
use crate::ptr::DdNode;
use crate::vid::topmost_of3;

use super::maybe_auto_reorder;

fn is_one(manager: &Manager, p: DdNode) -> bool {
    manager.terminal_value(p) == Some(1.0)
}

/// `if f then g else h`. Unreferenced: a caller that wants to keep the
/// result across a GC sweep or past the next top-level call must
/// `incref`/`protect` it, matching `Cudd_bddIte`'s own contract.
pub fn ite(manager: &Manager, f: DdNode, g: DdNode, h: DdNode) -> Result<DdNode> {
    maybe_auto_reorder(manager)?;
    manager.record_ite_call();
    ite_rec(manager, f, g, h)
}

fn ite_rec(manager: &Manager, f: DdNode, g: DdNode, h: DdNode) -> Result<DdNode> {
    manager.check_limits()?;

    // Canonical form: `f` is never complemented (ite(!f,g,h) == ite(f,h,g)),
    // and neither is `g` (ite(f,g,h) == !ite(f,!g,!h)), which roughly
    // doubles how often two syntactically different calls land on the same
    // cache entry.
    let (f, g, h) = if f.is_complemented() { (!f, h, g) } else { (f, g, h) };
    if g.is_complemented() {
        return Ok(!ite_rec(manager, f, !g, !h)?);
    }

    // Terminal cases.
    if manager.is_terminal(f) {
        return Ok(if is_one(manager, f) { g } else { h });
    }
    if g == h {
        return Ok(g);
    }
    if g == f {
        // ite(f, f, h) == ite(f, 1, h)
        return ite_rec(manager, f, manager.one(), h);
    }
    if h == f {
        // ite(f, g, f) == ite(f, g, 0)
        return ite_rec(manager, f, g, manager.zero());
    }
    if manager.is_terminal(g) && manager.is_terminal(h) {
        // Both const and g != h (checked above): g is 1, h is 0 (the only
        // other pairing), so this is just `f` itself.
        debug_assert!(is_one(manager, g) && !is_one(manager, h));
        return Ok(f);
    }

    if let Some(cached) = manager.cache_mut().lookup_ite(f, g, h) {
        return Ok(cached);
    }

    let level = topmost_of3(
        manager.level_of_node(f),
        manager.level_of_node(g),
        manager.level_of_node(h),
    );
    let var = manager.var_at_level(level);
    let (f_hi, f_lo) = split(manager, f, level);
    let (g_hi, g_lo) = split(manager, g, level);
    let (h_hi, h_lo) = split(manager, h, level);

    let then_ = ite_rec(manager, f_hi, g_hi, h_hi)?;
    let else_ = ite_rec(manager, f_lo, g_lo, h_lo)?;
    let result = manager.table_mut().unique_inter(level, var, then_, else_)?;

    manager.cache_mut().insert_ite(f, g, h, result);
    Ok(result)
}

fn split(manager: &Manager, p: DdNode, level: crate::vid::Level) -> (DdNode, DdNode) {
    crate::shannon::cofactors(manager, p, level)
}

/// `f AND g`, expressed as `ite(f, g, 0)` per the teacher's `and`.
pub fn and(manager: &Manager, f: DdNode, g: DdNode) -> Result<DdNode> {
    maybe_auto_reorder(manager)?;
    manager.record_and_call();
    and_rec(manager, f, g)
}

fn and_rec(manager: &Manager, f: DdNode, g: DdNode) -> Result<DdNode> {
    // `and` is commutative and this pairing canonicalizes it (raw id as an
    // arbitrary but stable tiebreak), so `and(a,b)` and `and(b,a)` always
    // share one cache entry instead of two.
    let (f, g) = if f.to_raw() <= g.to_raw() { (f, g) } else { (g, f) };
    if let Some(cached) = manager.cache_mut().lookup_and(f, g) {
        return Ok(cached);
    }
    let result = ite_rec(manager, f, g, manager.zero())?;
    manager.cache_mut().insert_and(f, g, result);
    Ok(result)
}

pub fn or(manager: &Manager, f: DdNode, g: DdNode) -> Result<DdNode> {
    maybe_auto_reorder(manager)?;
    ite_rec(manager, f, manager.one(), g)
}

pub fn xor(manager: &Manager, f: DdNode, g: DdNode) -> Result<DdNode> {
    maybe_auto_reorder(manager)?;
    ite_rec(manager, f, !g, g)
}

pub fn xnor(manager: &Manager, f: DdNode, g: DdNode) -> Result<DdNode> {
    maybe_auto_reorder(manager)?;
    ite_rec(manager, f, g, !g)
}

pub fn nand(manager: &Manager, f: DdNode, g: DdNode) -> Result<DdNode> {
    Ok(!and(manager, f, g)?)
}

pub fn nor(manager: &Manager, f: DdNode, g: DdNode) -> Result<DdNode> {
    Ok(!or(manager, f, g)?)
}

pub fn not(_manager: &Manager, f: DdNode) -> DdNode {
    !f
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::Manager;

    #[test]
    fn ite_on_constants_picks_a_branch() {
        let m = Manager::new();
        let g = m.constant(3.0).unwrap();
        let h = m.constant(4.0).unwrap();
        assert_eq!(ite(&m, m.one(), g, h).unwrap(), g);
        assert_eq!(ite(&m, m.zero(), g, h).unwrap(), h);
    }

    #[test]
    fn and_is_commutative_and_shares_cache_entries() {
        let m = Manager::new();
        let a = m.declare_var();
        let b = m.declare_var();
        let na = m.var_node(a).unwrap();
        let nb = m.var_node(b).unwrap();
        assert_eq!(and(&m, na, nb).unwrap(), and(&m, nb, na).unwrap());
    }

    #[test]
    fn xor_of_a_variable_with_itself_is_false() {
        let m = Manager::new();
        let a = m.declare_var();
        let na = m.var_node(a).unwrap();
        assert_eq!(xor(&m, na, na).unwrap(), m.zero());
    }

    #[test]
    fn or_of_and_differs_from_either_operand() {
        // (a AND b) OR c is neither `a AND b` nor `c` alone -- a cheap
        // sanity check that the Shannon-split reconstruction actually
        // builds a new function rather than collapsing to an input.
        let m = Manager::new();
        let a = m.declare_var();
        let b = m.declare_var();
        let c = m.declare_var();
        let na = m.var_node(a).unwrap();
        let nb = m.var_node(b).unwrap();
        let nc = m.var_node(c).unwrap();
        let ab = and(&m, na, nb).unwrap();
        let f = or(&m, ab, nc).unwrap();
        assert_ne!(f, ab);
        assert_ne!(f, nc);
        assert_ne!(f, m.one());
        assert_ne!(f, m.zero());
    }

    /// Regression for the unique table's collision-chain walk: build enough
    /// distinct (then, else) pairs under one top variable to force several
    /// bucket collisions by sheer volume (no hash value is computed by
    /// hand -- the point is that the chain walk must find an existing
    /// match no matter how deep in its bucket it sits), then rebuild every
    /// one of them a second time and confirm each rebuild returns the exact
    /// same node rather than minting a canonicity-violating duplicate.
    #[test]
    fn many_distinct_nodes_under_one_variable_stay_canonical_on_rebuild() {
        let m = Manager::new();
        let top = m.declare_var();
        let lower_vars: Vec<_> = (0..12).map(|_| m.declare_var()).collect();
        let top_lit = m.var_node(top).unwrap();

        let mut candidates = vec![m.zero(), m.one()];
        for &v in &lower_vars {
            let lit = m.var_node(v).unwrap();
            candidates.push(lit);
            candidates.push(!lit);
        }

        let mut pairs = Vec::new();
        for &a in &candidates {
            for &b in &candidates {
                if a != b {
                    pairs.push((a, b));
                }
            }
        }
        // 26 candidates => 650 ordered pairs, well past the default 256
        // slots at the table's default max density -- some bucket chains
        // are guaranteed to hold more than one live entry.
        assert!(pairs.len() > 256);

        let first_pass: Vec<DdNode> = pairs.iter().map(|&(a, b)| ite(&m, top_lit, a, b).unwrap()).collect();
        let second_pass: Vec<DdNode> = pairs.iter().map(|&(a, b)| ite(&m, top_lit, a, b).unwrap()).collect();

        for (i, (&first, &second)) in first_pass.iter().zip(second_pass.iter()).enumerate() {
            assert_eq!(first, second, "pair {i} rebuilt to a different node the second time");
        }

        let distinct: std::collections::HashSet<_> = first_pass.iter().map(|n| n.regular()).collect();
        assert_eq!(distinct.len(), first_pass.len(), "two distinct (then, else) pairs collapsed onto the same node");
    }
}
