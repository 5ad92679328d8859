//! Annealing, genetic, linear, and exact reordering.
//!
//! `annealing` and `genetic` are CUDD's two randomized search strategies
//! over the space of variable orders; `linear` is a single left-to-right
//! sweep (as opposed to sifting's move-to-best-then-settle); `exact`
//! brute-forces the optimal order for small variable counts and falls
//! back to converging sift otherwise, since the factorial search is only
//! ever sound for a handful of variables.
use rand::Rng;

use crate::error::Result;
use crate::manager::Manager;
use crate::vid::{Level, Var};

const EXACT_VAR_LIMIT: usize = 9;

pub(crate) fn linear_sweep(manager: &Manager) -> Result<i64> {
    let mut total = 0i64;
    if manager.num_vars() < 2 {
        return Ok(0);
    }
    for l in 0..manager.num_vars() - 1 {
        let before = manager.node_count();
        let delta = super::swap_adjacent(manager, Level::new(l))?;
        if manager.node_count() <= before {
            total += delta;
        } else {
            total += super::swap_adjacent(manager, Level::new(l))?;
        }
    }
    Ok(total)
}

/// Simulated annealing over random adjacent swaps: always accept an
/// improving move, accept a worsening one with probability
/// `exp(-delta / temperature)`, and geometrically cool the temperature.
pub(crate) fn annealing(manager: &Manager) -> Result<i64> {
    let mut total = 0i64;
    if manager.num_vars() < 2 {
        return Ok(0);
    }
    let mut temperature = manager.node_count().max(16) as f64;
    let cooling = 0.85;
    let steps_per_round = manager.num_vars() * 4;

    for _round in 0..20 {
        for _ in 0..steps_per_round {
            let l = manager.rng_mut().gen_range(0..manager.num_vars() - 1);
            let delta = super::swap_adjacent(manager, Level::new(l))?;
            let accept = delta <= 0 || {
                let p = (-(delta as f64) / temperature.max(1.0)).exp();
                manager.rng_mut().gen::<f64>() < p
            };
            if accept {
                total += delta;
            } else {
                total += super::swap_adjacent(manager, Level::new(l))?;
            }
        }
        temperature *= cooling;
        manager.check_limits()?;
    }
    Ok(total)
}

/// A compact stand-in for CUDD's genetic algorithm: maintain an elite
/// candidate order, generate a mutated offspring order by applying a
/// handful of random swaps, and keep the offspring only if it is no worse.
pub(crate) fn genetic(manager: &Manager) -> Result<i64> {
    let mut total = 0i64;
    let n = manager.num_vars();
    if n < 2 {
        return Ok(0);
    }
    const GENERATIONS: usize = 12;
    const MUTATIONS_PER_GENERATION: usize = 4;

    let mut best_order: Vec<Var> = (0..n as u32).map(|i| manager.var_at_level(Level::new(i as usize))).collect();
    let mut best_count = manager.node_count();

    for _ in 0..GENERATIONS {
        let mut delta = 0i64;
        for _ in 0..MUTATIONS_PER_GENERATION {
            let l = manager.rng_mut().gen_range(0..n - 1);
            delta += super::swap_adjacent(manager, Level::new(l))?;
        }
        let count = manager.node_count();
        if count <= best_count {
            best_count = count;
            best_order = (0..n as u32).map(|i| manager.var_at_level(Level::new(i as usize))).collect();
            total += delta;
        } else {
            // Offspring is worse: revert to the elite order.
            total += super::set_order(manager, &best_order)?;
        }
        manager.check_limits()?;
    }
    Ok(total)
}

/// Brute-force search over every permutation, for variable counts small
/// enough that `n!` is tractable; otherwise delegate to converging sift.
pub(crate) fn exact(manager: &Manager) -> Result<i64> {
    let n = manager.num_vars();
    if n > EXACT_VAR_LIMIT {
        return super::sift_converge(manager);
    }
    if n < 2 {
        return Ok(0);
    }
    let vars: Vec<Var> = (0..n as u32).map(Var).collect();
    let mut best_order = vars.clone();
    let mut best_count = manager.node_count();

    let mut perm = vars.clone();
    permute(&mut perm, 0, &mut |candidate| -> Result<()> {
        manager.check_limits()?;
        let before_order: Vec<Var> =
            (0..n as u32).map(|i| manager.var_at_level(Level::new(i as usize))).collect();
        super::set_order(manager, candidate)?;
        let count = manager.node_count();
        if count < best_count {
            best_count = count;
            best_order = candidate.to_vec();
        }
        super::set_order(manager, &before_order)?;
        Ok(())
    })?;

    super::set_order(manager, &best_order)
}

/// Heap's algorithm, generating every permutation of `items[..]` in place.
fn permute(items: &mut [Var], k: usize, visit: &mut impl FnMut(&[Var]) -> Result<()>) -> Result<()> {
    if k == items.len() {
        return visit(items);
    }
    for i in k..items.len() {
        items.swap(k, i);
        permute(items, k + 1, visit)?;
        items.swap(k, i);
    }
    Ok(())
}
