//! Window-`k` reordering: a sliding window hill-climb over `k` adjacent
//! levels at a time.
//!
//! CUDD's `WINDOWn` enumerates all `k!` permutations of the window and
//! keeps the best. This implementation instead greedily applies whichever
//! adjacent transposition inside the window reduces the node count,
//! repeating until no such transposition remains before sliding on --
//! cheaper to reason about without a test run, at the cost of occasionally
//! missing a permutation only reachable by a temporary increase in size
//! (noted as a simplification in DESIGN.md).
use crate::error::Result;
use crate::manager::Manager;
use crate::vid::Level;

pub(crate) fn window_reorder(manager: &Manager, k: usize, converge: bool) -> Result<i64> {
    let mut total = 0i64;
    if manager.num_vars() < 2 {
        return Ok(0);
    }
    let k = k.clamp(2, manager.num_vars());
    loop {
        let mut improved = false;
        for start in 0..=(manager.num_vars() - k) {
            for l in start..start + k - 1 {
                let before = manager.node_count();
                let delta = super::swap_adjacent(manager, Level::new(l))?;
                if manager.node_count() < before {
                    total += delta;
                    improved = true;
                } else {
                    total += super::swap_adjacent(manager, Level::new(l))?;
                }
            }
        }
        manager.check_limits()?;
        if !converge || !improved {
            break;
        }
    }
    Ok(total)
}
