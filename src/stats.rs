//! Ambient counters the manager accumulates over its lifetime: how many
//! times each operator ran, how many GC passes and reorders happened, and
//! how long the last reorder took. Exposed read-only via `Manager::stats`.
use std::time::Duration;

#[derive(Debug, Default, Clone)]
pub struct Stats {
    pub ite_calls: u64,
    pub and_calls: u64,
    pub abstract_calls: u64,
    pub gc_runs: u64,
    pub nodes_reclaimed: u64,
    pub reorder_runs: u64,
    pub last_reorder_duration: Duration,
    pub total_reorder_duration: Duration,
    pub peak_live_nodes: usize,
}

impl Stats {
    pub(crate) fn record_reorder(&mut self, elapsed: Duration) {
        self.reorder_runs += 1;
        self.last_reorder_duration = elapsed;
        self.total_reorder_duration += elapsed;
    }
}
