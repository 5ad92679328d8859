//! The central manager: owns the unique table, the computed cache, and
//! every piece of tunable/ambient state a diagram operation consults.
//!
//! Grounded on the teacher's `BddBase` (the struct that owns `tags` and
//! `swarm` and is threaded through every `Base` method) and on
//! `OBDDimal::DDManager` (the cleaner single-owner precedent for the
//! unique table + level bookkeeping this crate generalizes). Per
//! spec.md's Non-goals, a `Manager` is intentionally `!Sync`: concurrency
//! is achieved by running independent managers on independent threads,
//! never by sharing one manager.
use std::cell::{Cell, RefCell};
use std::time::{Duration, Instant};

use hashbrown::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cache::ComputedCache;
use crate::error::{DdError, ErrorKind, Result};
use crate::hooks::{HookFn, HookKind, HookTable};
use crate::ptr::DdNode;
use crate::reorder::ReorderMethod;
use crate::stats::Stats;
use crate::table::{UniqueTable, DEFAULT_SLOTS};
use crate::vid::{Level, Var};

/// Tunables fixed at construction time or adjustable later via the setters
/// on [`Manager`]. Mirrors the knobs `Cudd_Init` exposes as arguments plus
/// the handful of later `Cudd_Set*` calls, per SPEC_FULL.md §6.
#[derive(Clone, Debug)]
pub struct ManagerConfig {
    pub initial_vars: usize,
    pub initial_slots: usize,
    pub cache_slots: usize,
    pub max_density: usize,
    pub epsilon: f64,
    pub unique_table_growth: f64,
    pub auto_reorder: Option<ReorderMethod>,
    pub reorder_size_threshold: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        ManagerConfig {
            initial_vars: 0,
            initial_slots: DEFAULT_SLOTS,
            cache_slots: crate::cache::DEFAULT_SLOTS,
            max_density: crate::table::DEFAULT_MAX_DENSITY,
            epsilon: 1e-12,
            unique_table_growth: 2.0,
            auto_reorder: None,
            reorder_size_threshold: 1 << 20,
        }
    }
}

/// An opaque handle that keeps a node's *function identity* valid across
/// any number of reorder calls, independent of whatever raw [`DdNode`]
/// value the table happens to store it under afterward.
///
/// Plain `DdNode`s returned from operators stay valid for the remainder of
/// the top-level call that produced them (a reorder can only happen
/// *between* top-level calls -- see the retry-at-outermost-frame
/// discipline in `ops::skeleton`), so most code never needs this. It
/// exists for values a caller wants to hold across an explicit
/// `reduce_heap`.
#[derive(Debug)]
pub struct DdRoot(u64);

pub struct Manager {
    table: RefCell<UniqueTable>,
    cache: RefCell<ComputedCache>,
    stats: RefCell<Stats>,
    hooks: RefCell<HookTable>,
    config: ManagerConfig,

    level_of_var: RefCell<Vec<Level>>,
    var_at_level: RefCell<Vec<Var>>,

    one: DdNode,

    last_error: Cell<ErrorKind>,
    /// Set by a reorder that runs nested inside an operator's recursion (it
    /// never should, by construction, but the flag exists so the outermost
    /// frame of the recursive-operator skeleton can assert it and retry
    /// instead of returning a pointer computed against a stale order).
    reordered: Cell<bool>,

    rng: RefCell<StdRng>,

    deadline: Cell<Option<Instant>>,
    termination_callback: RefCell<Option<Box<dyn Fn() -> bool>>>,
    max_memory_bytes: Cell<Option<usize>>,
    max_nodes: Cell<Option<usize>>,

    protected_roots: RefCell<HashMap<u64, DdNode>>,
    next_root_id: Cell<u64>,
}

impl Manager {
    pub fn new() -> Self {
        Self::with_config(ManagerConfig::default())
    }

    pub fn with_config(config: ManagerConfig) -> Self {
        let mut table = UniqueTable::new(config.initial_slots, config.epsilon);
        table.set_max_density(config.max_density);
        let one = table
            .unique_const(1.0)
            .expect("allocating the constant terminal cannot fail");
        table.make_permanent(one);

        let m = Manager {
            table: RefCell::new(table),
            cache: RefCell::new(ComputedCache::new(config.cache_slots)),
            stats: RefCell::new(Stats::default()),
            hooks: RefCell::new(HookTable::default()),
            level_of_var: RefCell::new(Vec::new()),
            var_at_level: RefCell::new(Vec::new()),
            one,
            last_error: Cell::new(ErrorKind::NoError),
            reordered: Cell::new(false),
            rng: RefCell::new(StdRng::seed_from_u64(0xD00D_BEEF)),
            deadline: Cell::new(None),
            termination_callback: RefCell::new(None),
            max_memory_bytes: Cell::new(None),
            max_nodes: Cell::new(None),
            protected_roots: RefCell::new(HashMap::new()),
            next_root_id: Cell::new(0),
            config,
        };
        for _ in 0..m.config.initial_vars {
            m.declare_var();
        }
        m
    }

    // -- variables ----------------------------------------------------

    /// Create a new variable at the bottom of the current order. Returns
    /// its permanent identity; its level will change under reordering.
    pub fn declare_var(&self) -> Var {
        let mut level_of_var = self.level_of_var.borrow_mut();
        let mut var_at_level = self.var_at_level.borrow_mut();
        let var = Var(level_of_var.len() as u32);
        let level = Level::new(var_at_level.len());
        level_of_var.push(level);
        var_at_level.push(var);
        self.table.borrow_mut().ensure_level(level, self.config.initial_slots);
        var
    }

    pub fn num_vars(&self) -> usize {
        self.level_of_var.borrow().len()
    }

    pub fn level_of(&self, var: Var) -> Level {
        self.level_of_var.borrow()[var.index()]
    }

    pub fn var_at_level(&self, level: Level) -> Var {
        self.var_at_level.borrow()[level.index()]
    }

    /// A literal reference to `var`'s current position: `ite(var,1,0)`.
    pub fn var_node(&self, var: Var) -> Result<DdNode> {
        let level = self.level_of(var);
        self.table.borrow_mut().unique_inter(level, var, self.one, !self.one)
    }

    // -- terminals ------------------------------------------------------

    pub fn one(&self) -> DdNode {
        self.one
    }

    pub fn zero(&self) -> DdNode {
        !self.one
    }

    /// An arbitrary-value terminal, for ADD use. Boolean code never needs
    /// this beyond `one`/`zero`.
    pub fn constant(&self, value: f64) -> Result<DdNode> {
        self.table.borrow_mut().unique_const(value)
    }

    pub fn is_terminal(&self, node: DdNode) -> bool {
        self.table.borrow().is_terminal(node)
    }

    pub fn terminal_value(&self, node: DdNode) -> Option<f64> {
        self.table.borrow().terminal_value(node)
    }

    // -- structural accessors (crate + ops) -------------------------------

    pub(crate) fn table(&self) -> std::cell::Ref<'_, UniqueTable> {
        self.table.borrow()
    }

    pub(crate) fn table_mut(&self) -> std::cell::RefMut<'_, UniqueTable> {
        self.table.borrow_mut()
    }

    pub(crate) fn cache_mut(&self) -> std::cell::RefMut<'_, ComputedCache> {
        self.cache.borrow_mut()
    }

    pub(crate) fn rng_mut(&self) -> std::cell::RefMut<'_, StdRng> {
        self.rng.borrow_mut()
    }

    pub fn var_of(&self, node: DdNode) -> Option<Var> {
        self.table.borrow().var_of(node)
    }

    pub fn level_of_node(&self, node: DdNode) -> Level {
        self.table.borrow().level_of(node)
    }

    /// `node`'s `then` child, or `None` if `node` is a terminal (a terminal
    /// has no children to report) -- mirrors [`Manager::terminal_value`]'s
    /// `Option` treatment of the same internal/terminal distinction rather
    /// than panicking on an otherwise ordinary, publicly-constructible
    /// `DdNode`.
    pub fn then_child(&self, node: DdNode) -> Option<DdNode> {
        if self.table.borrow().is_terminal(node) {
            None
        } else {
            Some(self.table.borrow().then_of(node))
        }
    }

    /// `node`'s `else` child, or `None` if `node` is a terminal. See
    /// [`Manager::then_child`].
    pub fn else_child(&self, node: DdNode) -> Option<DdNode> {
        if self.table.borrow().is_terminal(node) {
            None
        } else {
            Some(self.table.borrow().else_of(node))
        }
    }

    // -- reference counting ------------------------------------------------

    pub fn incref(&self, node: DdNode) {
        self.table.borrow().incref(node);
    }

    pub fn decref(&self, node: DdNode) {
        self.table.borrow().recursive_deref(node);
    }

    pub fn ref_count(&self, node: DdNode) -> u32 {
        self.table.borrow().ref_count(node)
    }

    // -- protected roots --------------------------------------------------

    /// Register `node` so its function identity survives any number of
    /// subsequent `reduce_heap` calls, independent of address churn inside
    /// the rebuild. See [`DdRoot`].
    pub fn protect(&self, node: DdNode) -> DdRoot {
        self.incref(node);
        let id = self.next_root_id.get();
        self.next_root_id.set(id + 1);
        self.protected_roots.borrow_mut().insert(id, node);
        DdRoot(id)
    }

    pub fn root_value(&self, root: &DdRoot) -> DdNode {
        self.protected_roots.borrow()[&root.0]
    }

    pub fn unprotect(&self, root: DdRoot) {
        if let Some(node) = self.protected_roots.borrow_mut().remove(&root.0) {
            self.decref(node);
        }
    }

    pub(crate) fn retarget_protected_roots(&self, translate: &HashMap<DdNode, DdNode>) {
        for value in self.protected_roots.borrow_mut().values_mut() {
            let retargeted = crate::reorder::translate_ptr(translate, *value);
            if retargeted != *value {
                // The old node this root held a count on has already been
                // forcibly retired by the rebuild (its count zeroed, not
                // cascaded); the explicit reference it represented now
                // belongs to the replacement instead.
                self.incref(retargeted);
                *value = retargeted;
            }
        }
    }

    // -- garbage collection -------------------------------------------------

    /// Run a mark-free batch collection: unlink every node whose count has
    /// reached zero. Returns how many nodes were reclaimed.
    pub fn collect_garbage(&self) -> usize {
        self.run_hooks(HookKind::PreGc);
        let reclaimed = self.table.borrow_mut().collect_garbage();
        self.cache.borrow_mut().clear();
        {
            let mut stats = self.stats.borrow_mut();
            stats.gc_runs += 1;
            stats.nodes_reclaimed += reclaimed as u64;
        }
        self.run_hooks(HookKind::PostGc);
        reclaimed
    }

    pub fn has_dead_nodes(&self) -> bool {
        self.table.borrow().has_dead()
    }

    // -- reordering ---------------------------------------------------------

    /// Rebuild the diagram under `method`'s variable order, clearing the
    /// computed cache and firing the reorder hooks. See [`crate::reorder`].
    pub fn reduce_heap(&self, method: ReorderMethod) -> Result<i64> {
        // Always collect first: the level-swap primitive rebuilds whatever
        // it finds live at each level, and a dead-but-unswept node sitting
        // in a bucket chain would otherwise get rebuilt for nothing (or
        // worse, relabeled into a level it was about to be reclaimed from).
        // Mirrors CUDD's own practice of GCing immediately before a reorder.
        if self.has_dead_nodes() {
            self.collect_garbage();
        }
        self.run_hooks(HookKind::PreReorder);
        let start = Instant::now();
        let delta = crate::reorder::reduce_heap(self, method)?;
        self.cache.borrow_mut().clear();
        self.reordered.set(true);
        self.stats.borrow_mut().record_reorder(start.elapsed());
        self.run_hooks(HookKind::PostReorder);
        Ok(delta)
    }

    /// Whether a reorder has happened since the last call to this method,
    /// clearing the flag in the same step. Auto-reorder can fire from deep
    /// inside a recursive operator call; per spec.md §9's open question on
    /// when `reordered` resets, this is only meant to be polled from the
    /// outermost frame (after a top-level `ite`/`and`/... call returns),
    /// never from inside the recursion itself.
    pub fn take_reordered_flag(&self) -> bool {
        let was = self.reordered.get();
        self.reordered.set(false);
        was
    }

    /// Swap which variables occupy `level` and `level + 1` in the
    /// permutation tables. Called once the node rebuild for a level-swap
    /// has already happened; see `reorder::swap_adjacent`.
    pub(crate) fn swap_adjacent_permutation(&self, level: Level) {
        let l = level.index();
        let mut var_at_level = self.var_at_level.borrow_mut();
        let mut level_of_var = self.level_of_var.borrow_mut();
        let v_lo = var_at_level[l];
        let v_hi = var_at_level[l + 1];
        var_at_level[l] = v_hi;
        var_at_level[l + 1] = v_lo;
        level_of_var[v_lo.index()] = Level::new(l + 1);
        level_of_var[v_hi.index()] = Level::new(l);
    }

    pub fn auto_reorder_method(&self) -> Option<ReorderMethod> {
        self.config.auto_reorder
    }

    pub fn reorder_size_threshold(&self) -> usize {
        self.config.reorder_size_threshold
    }

    // -- hooks --------------------------------------------------------------

    pub fn add_hook(&self, kind: HookKind, hook: HookFn) {
        self.hooks.borrow_mut().add(kind, hook);
    }

    fn run_hooks(&self, kind: HookKind) {
        let mut hooks = self.hooks.borrow_mut().take(kind);
        for hook in hooks.iter_mut() {
            hook(self);
        }
        self.hooks.borrow_mut().restore(kind, hooks);
    }

    // -- limits ---------------------------------------------------------

    pub fn set_time_limit(&self, limit: Duration) {
        self.deadline.set(Some(Instant::now() + limit));
    }

    pub fn clear_time_limit(&self) {
        self.deadline.set(None);
    }

    pub fn set_termination_callback(&self, cb: impl Fn() -> bool + 'static) {
        *self.termination_callback.borrow_mut() = Some(Box::new(cb));
    }

    pub fn set_max_memory(&self, bytes: usize) {
        self.max_memory_bytes.set(Some(bytes));
    }

    pub fn set_max_node_limit(&self, nodes: usize) {
        self.max_nodes.set(Some(nodes));
    }

    /// Checked at every recursive-operator entry per spec.md §4.4's limit
    /// checks, in priority order: termination callback, timeout, node
    /// count, approximate memory.
    pub(crate) fn check_limits(&self) -> Result<()> {
        if let Some(cb) = self.termination_callback.borrow().as_ref() {
            if cb() {
                return Err(self.fail(ErrorKind::Termination));
            }
        }
        if let Some(deadline) = self.deadline.get() {
            if Instant::now() >= deadline {
                return Err(self.fail(ErrorKind::TimeoutExpired));
            }
        }
        if let Some(max_nodes) = self.max_nodes.get() {
            if self.node_count() > max_nodes {
                return Err(self.fail(ErrorKind::TooManyNodes));
            }
        }
        if let Some(max_bytes) = self.max_memory_bytes.get() {
            if self.approx_memory_bytes() > max_bytes {
                return Err(self.fail(ErrorKind::MaxMemoryExceeded));
            }
        }
        Ok(())
    }

    fn fail(&self, kind: ErrorKind) -> DdError {
        self.last_error.set(kind);
        DdError::new(kind)
    }

    pub(crate) fn fail_with(&self, kind: ErrorKind, context: impl Into<String>) -> DdError {
        self.last_error.set(kind);
        DdError::with_context(kind, context)
    }

    pub fn last_error(&self) -> ErrorKind {
        self.last_error.get()
    }

    pub fn clear_error(&self) {
        self.last_error.set(ErrorKind::NoError);
    }

    // -- introspection ----------------------------------------------------

    pub fn node_count(&self) -> usize {
        self.table.borrow().live_node_count()
    }

    pub fn peak_node_count(&self) -> usize {
        self.table.borrow().peak_nodes
    }

    fn approx_memory_bytes(&self) -> usize {
        self.table.borrow().arena_len() * std::mem::size_of::<crate::node::Slot>()
    }

    pub fn stats(&self) -> Stats {
        self.stats.borrow().clone()
    }

    pub(crate) fn record_ite_call(&self) {
        self.stats.borrow_mut().ite_calls += 1;
    }

    pub(crate) fn record_and_call(&self) {
        self.stats.borrow_mut().and_calls += 1;
    }

    pub(crate) fn record_abstract_call(&self) {
        self.stats.borrow_mut().abstract_calls += 1;
    }

    pub fn cache_stats(&self) -> crate::cache::CacheStats {
        self.cache.borrow().stats()
    }
}

impl Default for Manager {
    fn default() -> Self {
        Manager::new()
    }
}

// `Manager` is `!Sync` automatically (it's built entirely out of `RefCell`/
// `Cell` fields) -- see the module doc comment for why that's deliberate.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_manager_has_one_and_zero_distinct() {
        let m = Manager::new();
        assert_ne!(m.one(), m.zero());
        assert_eq!(m.terminal_value(m.one()), Some(1.0));
        assert_eq!(m.terminal_value(m.zero()), Some(0.0));
    }

    #[test]
    fn declaring_variables_assigns_increasing_levels() {
        let m = Manager::new();
        let a = m.declare_var();
        let b = m.declare_var();
        assert!(m.level_of(a).is_above(m.level_of(b)));
    }

    #[test]
    fn take_reordered_flag_is_set_by_reduce_heap_and_clears_on_read() {
        let m = Manager::new();
        m.declare_var();
        m.declare_var();
        assert!(!m.take_reordered_flag());
        m.reduce_heap(crate::reorder::ReorderMethod::Sift).unwrap();
        assert!(m.take_reordered_flag());
        assert!(!m.take_reordered_flag());
    }
}
