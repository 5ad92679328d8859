//! The six end-to-end scenarios from spec.md §8, each exercised against the
//! public crate surface exactly as an application would use it (no
//! `pub(crate)` reach-through). Unit tests alongside each module cover the
//! narrower per-operator properties; these integration tests cover the
//! scenarios that string several operators together.

use std::time::Duration;

use redd::ops::ite::{and, ite, or};
use redd::ops::prime::maximally_expand;
use redd::ops::transfer::transfer;
use redd::reorder::ReorderMethod;
use redd::traverse::support;
use redd::{count_minterms, DdNode, Manager};

/// Builds the hidden-weight-bit function over `vars`: `f(x) = x_w` where `w`
/// is the number of set bits among `vars`, and `f = 0` when `w` falls
/// outside `vars`' own index range. A standard hard case for natural
/// variable order (Bollig & Wegener's exponential-blowup family), built here
/// as the threshold-function recurrence `weight[i][k] = "exactly k of the
/// first i variables are set"` rather than by enumerating assignments
/// (infeasible once `vars` crosses a couple dozen entries).
fn hidden_weight_bit(m: &Manager, vars: &[redd::Var]) -> redd::Result<DdNode> {
    let n = vars.len();
    let mut weight = vec![m.zero(); n + 1];
    weight[0] = m.one();
    for &v in vars {
        let lit = m.var_node(v)?;
        let mut next = vec![m.zero(); n + 1];
        for k in 0..=n {
            let stays = weight[k];
            let becomes = if k > 0 { weight[k - 1] } else { m.zero() };
            next[k] = ite(m, lit, becomes, stays)?;
        }
        weight = next;
    }
    let mut f = m.zero();
    for (k, &v) in vars.iter().enumerate() {
        let xk = m.var_node(v)?;
        let term = and(m, weight[k], xk)?;
        f = or(m, f, term)?;
    }
    Ok(f)
}

/// Scenario 1: a three-variable function with a known node count, satisfying
/// set, and cofactor structure.
#[test]
fn three_variable_function_has_the_expected_shape() {
    let m = Manager::new();
    let x = m.declare_var();
    let y = m.declare_var();
    let z = m.declare_var();
    let nx = m.var_node(x).unwrap();
    let ny = m.var_node(y).unwrap();
    let nz = m.var_node(z).unwrap();

    // f = (!x . !y . !z) | (x . y)
    let not_x_not_y_not_z = and(&m, and(&m, !nx, !ny).unwrap(), !nz).unwrap();
    let x_and_y = and(&m, nx, ny).unwrap();
    let f = or(&m, not_x_not_y_not_z, x_and_y).unwrap();

    // Protect f before sweeping: the plain `x`/`y`/`z` literal nodes created
    // above as building blocks aren't all still reachable from f once the
    // ITE identities above have canceled some of them out, and GC is
    // explicit in this crate -- an unprotected node's count is zero until
    // something references it structurally or a caller protects it.
    let root = m.protect(f);
    m.collect_garbage();
    let f = m.root_value(&root);
    assert_eq!(m.node_count(), 4);

    // Three satisfying assignments: 000, 110, 111.
    let satisfying: Vec<_> = redd::traverse::CubeGenerator::new(&m, f).collect();
    assert_eq!(satisfying.len(), 3);

    // f's top node sits on x; its then-branch is y, its else-branch is !y.!z.
    assert_eq!(m.var_of(f), Some(x));
    let expected_then = ny;
    let not_y_not_z = and(&m, !ny, !nz).unwrap();
    assert_eq!(m.then_child(f), Some(expected_then));
    assert_eq!(m.else_child(f), Some(not_y_not_z));
}

/// Scenario 2: the Achilles-heel function over 4 variables. Its support is
/// every declared variable, and cofactoring on `x0` (the BDD analogue of the
/// "characteristic vector" split the original C API names `char_to_vect`)
/// reconstructs it: `ite(x0, f|x0=1, f|x0=0) == f`.
#[test]
fn achilles_heel_function_has_full_support_and_cofactors_reconstruct_it() {
    let m = Manager::new();
    let x0 = m.declare_var();
    let x1 = m.declare_var();
    let x2 = m.declare_var();
    let x3 = m.declare_var();
    let n0 = m.var_node(x0).unwrap();
    let n1 = m.var_node(x1).unwrap();
    let n2 = m.var_node(x2).unwrap();
    let n3 = m.var_node(x3).unwrap();

    // f = x0.x2 | x1.x3
    let t0 = and(&m, n0, n2).unwrap();
    let t1 = and(&m, n1, n3).unwrap();
    let f = or(&m, t0, t1).unwrap();

    assert_eq!(support(&m, f), vec![x0, x1, x2, x3]);

    let f1 = redd::ops::compose::cofactor(&m, f, n0).unwrap();
    let f0 = redd::ops::compose::cofactor(&m, f, !n0).unwrap();
    let rebuilt = ite(&m, n0, f1, f0).unwrap();
    assert_eq!(rebuilt, f);
}

/// Scenario 3: Transfer round-trips a function between two managers with
/// identical variable counts.
#[test]
fn transfer_round_trips_through_a_second_manager() {
    let src = Manager::new();
    let x = src.declare_var();
    let y = src.declare_var();
    let nx = src.var_node(x).unwrap();
    let ny = src.var_node(y).unwrap();
    let f = and(&src, nx, ny).unwrap();

    let other = Manager::new();
    other.declare_var();
    other.declare_var();

    let transferred = transfer(&src, f, &other).unwrap();
    let back = transfer(&other, transferred, &src).unwrap();
    assert_eq!(back, f);
}

/// Scenario 4: the hidden-weight-bit function over `n + 32` variables, for
/// `n` in 0..=3, shrinks under sift-converge reordering relative to no
/// reorder at all, while its minterm count (a function of the Boolean
/// function alone, not of variable order) stays invariant.
#[test]
fn sift_converge_shrinks_the_hidden_weight_bit_function() {
    for n in 0..=3 {
        let num_vars = n + 32;

        let baseline = Manager::new();
        let baseline_vars: Vec<_> = (0..num_vars).map(|_| baseline.declare_var()).collect();
        let f_baseline = hidden_weight_bit(&baseline, &baseline_vars).unwrap();
        // Protect and sweep so the count reflects f's own reachable DAG, not
        // the unreferenced intermediate nodes the weight-table recurrence
        // left behind -- the same cleanup `reduce_heap` does for free on
        // the `reordered` manager below, via its own pre-reorder GC.
        let baseline_root = baseline.protect(f_baseline);
        baseline.collect_garbage();
        let f_baseline = baseline.root_value(&baseline_root);
        let baseline_count = baseline.node_count();
        let baseline_minterms = count_minterms(&baseline, f_baseline, num_vars);
        baseline.unprotect(baseline_root);

        let reordered = Manager::new();
        let reordered_vars: Vec<_> = (0..num_vars).map(|_| reordered.declare_var()).collect();
        let f_reordered = hidden_weight_bit(&reordered, &reordered_vars).unwrap();
        let root = reordered.protect(f_reordered);
        reordered.reduce_heap(ReorderMethod::SiftConverge).unwrap();
        let f_after = reordered.root_value(&root);
        let reordered_count = reordered.node_count();
        let reordered_minterms = count_minterms(&reordered, f_after, num_vars);
        reordered.unprotect(root);

        assert!(
            reordered_count < baseline_count,
            "n={n}: expected sift-converge ({reordered_count}) to beat no reorder ({baseline_count})"
        );
        assert_eq!(baseline_minterms, reordered_minterms, "n={n}: minterm count must be reorder-invariant");
    }
}

/// Scenario 5: a 1ms time limit aborts a build that would otherwise take far
/// longer than that (the classic exponential-blowup conjunction of ORs over
/// a deliberately bad variable order); clearing the limit lets the identical
/// build succeed.
#[test]
fn a_tight_time_limit_aborts_the_build_and_clearing_it_lets_the_retry_succeed() {
    fn build(m: &Manager) -> redd::Result<DdNode> {
        let vars: Vec<_> = (0..60).map(|_| m.declare_var()).collect();
        let mut f = m.one();
        for i in 0..30 {
            let a = m.var_node(vars[i]).unwrap();
            let b = m.var_node(vars[i + 30]).unwrap();
            let clause = or(m, a, b)?;
            f = and(m, f, clause)?;
        }
        Ok(f)
    }

    let m = Manager::new();
    m.set_time_limit(Duration::from_millis(1));
    let result = build(&m);
    assert!(result.is_err());
    assert_eq!(m.last_error(), redd::ErrorKind::TimeoutExpired);

    m.clear_error();
    m.clear_time_limit();
    assert!(build(&m).is_ok());
}

/// Scenario 6: MaximallyExpand grows a lower-bound cube up to (but not past)
/// an upper bound and the function it must stay inside.
#[test]
fn maximally_expand_matches_the_worked_example() {
    let m = Manager::new();
    let x0 = m.declare_var();
    let x1 = m.declare_var();
    let x2 = m.declare_var();
    let x3 = m.declare_var();
    let n0 = m.var_node(x0).unwrap();
    let n1 = m.var_node(x1).unwrap();
    let n2 = m.var_node(x2).unwrap();
    let n3 = m.var_node(x3).unwrap();

    // f = (x1.x3) | (x0.!x2.x3) | (!x0.x1.!x2)
    let t0 = and(&m, n1, n3).unwrap();
    let t1 = and(&m, and(&m, n0, !n2).unwrap(), n3).unwrap();
    let t2 = and(&m, and(&m, !n0, n1).unwrap(), !n2).unwrap();
    let f = or(&m, or(&m, t0, t1).unwrap(), t2).unwrap();

    let lower = redd::ops::cube::cube(&m, &[x1, x2, x3], &[true, false, true]).unwrap();
    let upper = redd::ops::cube::cube(&m, &[x3], &[true]).unwrap();

    let expanded = maximally_expand(&m, lower, upper, f).unwrap();
    let expected = and(&m, n1, n3).unwrap();
    assert_eq!(expanded, expected);
}
