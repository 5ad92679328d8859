//! `redd`: the core of a binary (and algebraic) decision-diagram package.
//!
//! A `redd` [`Manager`](manager::Manager) owns a hash-consed pool of
//! reduced, ordered decision-diagram nodes (BDDs when every terminal is
//! the canonical Boolean constant, ADDs when terminals carry arbitrary
//! `f64` values), a computed cache for memoizing recursive operators, and
//! a dynamic variable-reordering engine. It does not provide file-format
//! exporters beyond a minimal dot/blif writer, bignum minterm counting, a
//! multiway variable-group tree, symbol tables, or a command-line driver
//! -- see `DESIGN.md` for what was scoped out and why.
//!
//! Grounded throughout on the teacher repo (`examples/tangentstorm-bex` in
//! the retrieval pack this crate was built from) for its `BddBase`-centric
//! architecture, enriched with patterns from CUDD (`cudd/cudd/*.c`) and
//! `biodivine-lib-bdd` where the teacher didn't already cover a piece of
//! the surface; see `DESIGN.md` for the per-module grounding ledger.
//!
//! ```
//! use redd::Manager;
//! use redd::ops::ite::and;
//!
//! let m = Manager::new();
//! let a = m.declare_var();
//! let b = m.declare_var();
//! let na = m.var_node(a).unwrap();
//! let nb = m.var_node(b).unwrap();
//!
//! let f = and(&m, na, nb).unwrap();
//! assert_eq!(and(&m, na, na).unwrap(), na); // idempotent
//! assert_ne!(f, m.zero());
//! assert_eq!(redd::count_minterms(&m, f, 2), 1.0);
//! ```
mod cache;
mod hooks;
mod node;
mod ptr;
mod shannon;
mod stats;
mod table;
mod vid;

pub mod error;
pub mod export;
pub mod manager;
pub mod ops;
pub mod reorder;
pub mod traverse;

pub use error::{DdError, ErrorKind, Result};
pub use hooks::{HookFn, HookKind};
pub use manager::{DdRoot, Manager, ManagerConfig};
pub use ptr::DdNode;
pub use reorder::{ReorderMethod, VarGroup};
pub use stats::Stats;
pub use table::TableStats;
pub use vid::{Level, Var, VarOrdering};

/// Number of minterms over `num_vars` variables that `f` accepts, as a
/// float. Matches `Cudd_CountMinterm`'s common case; see `DESIGN.md`'s
/// Open Question on why this crate stops at `f64`/`u128` rather than
/// adding arbitrary-precision support.
pub fn count_minterms(manager: &Manager, f: DdNode, num_vars: usize) -> f64 {
    let rec = count_minterms_rec(manager, f, &mut hashbrown::HashMap::new());
    rec * 2f64.powi(top_level_width(manager, f, num_vars) as i32)
}

/// How many variables sit strictly above `f`'s own top level and so are
/// entirely unconstrained by it: `f`'s level if it's internal (the levels
/// `0..level` never get examined), or the full variable count if `f` is a
/// terminal (nothing constrains any variable at all).
fn top_level_width(manager: &Manager, f: DdNode, num_vars: usize) -> i64 {
    if manager.is_terminal(f) {
        num_vars as i64
    } else {
        manager.level_of_node(f).index() as i64
    }
}

fn count_minterms_rec(manager: &Manager, f: DdNode, memo: &mut hashbrown::HashMap<DdNode, f64>) -> f64 {
    if manager.is_terminal(f) {
        return if manager.terminal_value(f) == Some(1.0) { 1.0 } else { 0.0 };
    }
    if let Some(&cached) = memo.get(&f) {
        return cached;
    }
    let level = manager.level_of_node(f).index() as i64;
    let then_ = manager.then_child(f).expect("non-terminal has a then child");
    let else_ = manager.else_child(f).expect("non-terminal has an else child");
    let then_gap = (child_level(manager, then_) - level - 1) as i32;
    let else_gap = (child_level(manager, else_) - level - 1) as i32;
    let result = count_minterms_rec(manager, then_, memo) * 2f64.powi(then_gap.max(0))
        + count_minterms_rec(manager, else_, memo) * 2f64.powi(else_gap.max(0));
    memo.insert(f, result);
    result
}

fn child_level(manager: &Manager, p: DdNode) -> i64 {
    if manager.is_terminal(p) {
        manager.num_vars() as i64
    } else {
        manager.level_of_node(p).index() as i64
    }
}

/// Exact minterm count up to `u128`'s ceiling (2^127): the same recursion
/// as [`count_minterms`] but over exact integer arithmetic, for callers
/// who need a precise count and know it fits.
pub fn count_minterms_u128(manager: &Manager, f: DdNode, num_vars: usize) -> u128 {
    let mut memo = hashbrown::HashMap::new();
    let total = count_minterms_u128_rec(manager, f, &mut memo);
    total << (top_level_width(manager, f, num_vars) as u32)
}

fn count_minterms_u128_rec(manager: &Manager, f: DdNode, memo: &mut hashbrown::HashMap<DdNode, u128>) -> u128 {
    if manager.is_terminal(f) {
        return if manager.terminal_value(f) == Some(1.0) { 1 } else { 0 };
    }
    if let Some(&cached) = memo.get(&f) {
        return cached;
    }
    let level = manager.level_of_node(f).index() as u32;
    let then_ = manager.then_child(f).expect("non-terminal has a then child");
    let else_ = manager.else_child(f).expect("non-terminal has an else child");
    let then_gap = child_level_u32(manager, then_).saturating_sub(level + 1);
    let else_gap = child_level_u32(manager, else_).saturating_sub(level + 1);
    let result = (count_minterms_u128_rec(manager, then_, memo) << then_gap)
        + (count_minterms_u128_rec(manager, else_, memo) << else_gap);
    memo.insert(f, result);
    result
}

fn child_level_u32(manager: &Manager, p: DdNode) -> u32 {
    if manager.is_terminal(p) {
        manager.num_vars() as u32
    } else {
        manager.level_of_node(p).index() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_minterms_of_a_single_variable_is_half_the_space() {
        let m = Manager::new();
        let a = m.declare_var();
        m.declare_var();
        let na = m.var_node(a).unwrap();
        assert_eq!(count_minterms(&m, na, 2), 2.0);
        assert_eq!(count_minterms_u128(&m, na, 2), 2);
    }

    #[test]
    fn count_minterms_of_the_constant_one_is_the_full_space() {
        let m = Manager::new();
        m.declare_var();
        m.declare_var();
        m.declare_var();
        assert_eq!(count_minterms(&m, m.one(), 3), 8.0);
        assert_eq!(count_minterms_u128(&m, m.one(), 3), 8);
    }

    #[test]
    fn count_minterms_of_an_and_is_a_quarter_of_the_space() {
        let m = Manager::new();
        let a = m.declare_var();
        let b = m.declare_var();
        let na = m.var_node(a).unwrap();
        let nb = m.var_node(b).unwrap();
        let f = ops::ite::and(&m, na, nb).unwrap();
        assert_eq!(count_minterms(&m, f, 2), 1.0);
        assert_eq!(count_minterms_u128(&m, f, 2), 1);
    }
}
