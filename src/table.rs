//! The unique table: a level-indexed hash-consing pool of internal nodes
//! plus a single constant subtable for terminals.
//!
//! Grounded on the same idea as the teacher's `vhl::HiLoCache` (a
//! content-addressed map from `(var, then, else)` to a single canonical
//! node) and on `OBDDimal`'s `level2nodes: Vec<HashSet<DDNode>>` layout,
//! adapted to the spec's chained-bucket subtable design with explicit
//! growth and canonical complementation.
//!
//! A node's `ref_count` tracks exactly its live structural parent edges
//! plus any explicit caller references (`Manager::incref`/`protect`). It
//! is bumped on a child the moment a *new* parent node is allocated over
//! it (never on a hash hit, since a hit reuses an existing edge rather
//! than creating one) and cascades down through `recursive_deref` on a
//! 1-to-0 transition. A node that reaches zero is left in its bucket
//! chain, findable and reusable by a later `unique_inter`/`unique_const`
//! call, until an explicit `collect_garbage` sweep unlinks it -- garbage
//! collection here is always a deliberate batch operation, never
//! incidental to a hash-cons lookup.
use fxhash::FxHasher;
use std::hash::{Hash, Hasher};

use crate::error::{DdError, ErrorKind, Result};
use crate::node::{NodeData, NodeId, Slot, PERMANENT};
use crate::ptr::DdNode;
use crate::vid::{Level, Var};

/// Default bucket count for a freshly allocated subtable. Matches §6's
/// stated manager default.
pub const DEFAULT_SLOTS: usize = 256;

/// A node's live content is rehashed into its subtable bucket whenever the
/// subtable grows; this load factor (live nodes per slot) is the trigger,
/// matching CUDD's `DD_MAX_SUBTABLE_DENSITY` notion (see SPEC_FULL.md §4).
pub const DEFAULT_MAX_DENSITY: usize = 4;

#[inline]
fn hash_pair(then_raw: u32, else_raw: u32) -> u64 {
    // Multiplicative hash on the child addresses, per spec.md §4.1.
    let mut h = FxHasher::default();
    (then_raw, else_raw).hash(&mut h);
    h.finish()
}

#[inline]
fn hash_value(bits: u64) -> u64 {
    let mut h = FxHasher::default();
    bits.hash(&mut h);
    h.finish()
}

/// One level's hash-consed bucket array. Bucket index is `hash >> shift`
/// (Fibonacci-style), recomputed whenever `slots` changes size.
struct Buckets {
    slots: Vec<Option<NodeId>>,
    shift: u32,
    live: usize,
    dead: usize,
}

impl Buckets {
    fn new(slot_count: usize) -> Self {
        let slot_count = slot_count.next_power_of_two().max(1);
        Buckets {
            slots: vec![None; slot_count],
            shift: 64 - slot_count.trailing_zeros(),
            live: 0,
            dead: 0,
        }
    }

    fn bucket_index(&self, hash: u64) -> usize {
        (hash >> self.shift) as usize
    }

    fn needs_growth(&self, max_density: usize) -> bool {
        self.live > self.slots.len() * max_density
    }
}

/// Per-level subtable: the chained hash set of internal nodes whose
/// variable currently occupies that level.
pub(crate) struct Subtable {
    buckets: Buckets,
}

impl Subtable {
    fn new(slot_count: usize) -> Self {
        Subtable { buckets: Buckets::new(slot_count) }
    }
}

/// The terminal pool: one entry per distinct value that has been
/// materialized (every BDD use only ever materializes `1.0`; ADD use may
/// materialize many).
pub(crate) struct ConstSubtable {
    buckets: Buckets,
}

impl ConstSubtable {
    fn new(slot_count: usize) -> Self {
        ConstSubtable { buckets: Buckets::new(slot_count) }
    }
}

/// Statistics a caller might want to inspect without reaching into the
/// manager's full `Stats` block (kept here since growth/revival are purely
/// table-local events).
#[derive(Debug, Default, Clone, Copy)]
pub struct TableStats {
    pub live_nodes: usize,
    pub dead_nodes: usize,
    pub peak_nodes: usize,
}

pub(crate) struct UniqueTable {
    arena: Vec<Slot>,
    subtables: Vec<Subtable>,
    consts: ConstSubtable,
    max_density: usize,
    epsilon: f64,
    pub(crate) peak_nodes: usize,
}

impl UniqueTable {
    pub(crate) fn new(initial_slots: usize, epsilon: f64) -> Self {
        UniqueTable {
            arena: Vec::new(),
            subtables: Vec::new(),
            consts: ConstSubtable::new(initial_slots.max(2)),
            max_density: DEFAULT_MAX_DENSITY,
            epsilon,
            peak_nodes: 0,
        }
    }

    pub(crate) fn set_max_density(&mut self, density: usize) {
        self.max_density = density.max(1);
    }

    /// Grow the level array so `level` is addressable. Called whenever a
    /// new variable is declared.
    pub(crate) fn ensure_level(&mut self, level: Level, slot_count: usize) {
        while self.subtables.len() <= level.index() {
            self.subtables.push(Subtable::new(slot_count));
        }
    }

    pub(crate) fn num_levels(&self) -> usize {
        self.subtables.len()
    }

    // -- accessors -----------------------------------------------------

    fn slot(&self, id: NodeId) -> &Slot {
        &self.arena[id.index()]
    }

    pub(crate) fn var_of(&self, p: DdNode) -> Option<Var> {
        match self.slot(p.id()).data {
            NodeData::Internal { var, .. } => Some(var),
            NodeData::Terminal { .. } => None,
        }
    }

    pub(crate) fn level_of(&self, p: DdNode) -> Level {
        match self.slot(p.id()).data {
            NodeData::Internal { level, .. } => level,
            NodeData::Terminal { .. } => Level::TERMINAL,
        }
    }

    pub(crate) fn is_terminal(&self, p: DdNode) -> bool {
        matches!(self.slot(p.id()).data, NodeData::Terminal { .. })
    }

    /// The value a terminal pointer reads as. The complement bit is only
    /// ever set on the canonical Boolean terminal (`value == 1.0`), where it
    /// means "false"; ADD terminals for other values never carry it.
    pub(crate) fn terminal_value(&self, p: DdNode) -> Option<f64> {
        match self.slot(p.id()).data {
            NodeData::Terminal { value } => {
                if p.is_complemented() {
                    debug_assert_eq!(value, 1.0, "complement bit set on a non-Boolean terminal");
                    Some(0.0)
                } else {
                    Some(value)
                }
            }
            NodeData::Internal { .. } => None,
        }
    }

    /// The `then` child, complement-adjusted for `p`'s own polarity.
    pub(crate) fn then_of(&self, p: DdNode) -> DdNode {
        match self.slot(p.id()).data {
            NodeData::Internal { then_raw, .. } => {
                DdNode::from_raw(then_raw).with_inversion(p.is_complemented())
            }
            NodeData::Terminal { .. } => panic!("then_of called on a terminal"),
        }
    }

    /// The `else` child, complement-adjusted for `p`'s own polarity.
    pub(crate) fn else_of(&self, p: DdNode) -> DdNode {
        match self.slot(p.id()).data {
            NodeData::Internal { else_raw, .. } => {
                DdNode::from_raw(else_raw).with_inversion(p.is_complemented())
            }
            NodeData::Terminal { .. } => panic!("else_of called on a terminal"),
        }
    }

    pub(crate) fn then_else(&self, p: DdNode) -> (DdNode, DdNode) {
        (self.then_of(p), self.else_of(p))
    }

    // -- reference counting ---------------------------------------------

    pub(crate) fn incref(&self, p: DdNode) {
        self.slot(p.id()).incref();
    }

    /// Recursive decrement: if the node's count reaches zero, recurse into
    /// its children. Matches the topological-descent discipline in
    /// spec.md §4.2.
    pub(crate) fn recursive_deref(&self, p: DdNode) {
        let id = p.id();
        let slot = self.slot(id);
        if slot.decref() {
            if let NodeData::Internal { then_raw, else_raw, .. } = slot.data {
                self.recursive_deref(DdNode::from_raw(then_raw));
                self.recursive_deref(DdNode::from_raw(else_raw));
            }
        }
    }

    /// Release the two structural edges a node held, without touching the
    /// node's own count. Used when reordering forcibly retires a node
    /// whose identity is being replaced by a rebuilt one, rather than
    /// reclaiming it because its own count naturally reached zero -- the
    /// edges to its old children still need to go away, or they'd leak.
    pub(crate) fn release_children(&self, id: NodeId) {
        if let NodeData::Internal { then_raw, else_raw, .. } = self.slot(id).data {
            self.recursive_deref(DdNode::from_raw(then_raw));
            self.recursive_deref(DdNode::from_raw(else_raw));
        }
    }

    pub(crate) fn ref_count(&self, p: DdNode) -> u32 {
        self.slot(p.id()).ref_count.get()
    }

    pub(crate) fn make_permanent(&self, p: DdNode) {
        self.slot(p.id()).ref_count.set(PERMANENT);
    }

    // -- insertion --------------------------------------------------------

    /// Find-or-create the canonical internal node for `(var, level, then, else)`.
    /// Implements spec.md §4.1's `unique_inter`: reduction, canonical
    /// complementation, revival of dead-but-present nodes.
    pub(crate) fn unique_inter(
        &mut self,
        level: Level,
        var: Var,
        then_: DdNode,
        else_: DdNode,
    ) -> Result<DdNode> {
        // Reduction.
        if then_ == else_ {
            return Ok(else_);
        }
        // Canonical complementation: store with a regular `then`, flip the
        // whole result (and both children) if `then` came in complemented.
        let (then_, else_, invert_result) = if then_.is_complemented() {
            (!then_, !else_, true)
        } else {
            (then_, else_, false)
        };

        self.ensure_level(level, DEFAULT_SLOTS);
        let then_raw = then_.to_raw();
        let else_raw = else_.to_raw();
        let hash = hash_pair(then_raw, else_raw);

        let bucket_idx = {
            let sub = &self.subtables[level.index()];
            sub.buckets.bucket_index(hash)
        };

        // Walk the whole collision chain: insertion is always head-prepend
        // (see `link_into_bucket`) and a subtable growth rehashes chains in
        // arbitrary order too, so nothing about chain order can be relied
        // on to stop early -- every node in the bucket has to be checked.
        let mut cursor = self.subtables[level.index()].buckets.slots[bucket_idx];
        while let Some(id) = cursor {
            let slot = &self.arena[id.index()];
            if let NodeData::Internal { then_raw: t, else_raw: e, .. } = slot.data {
                if t == then_raw && e == else_raw {
                    // Found, whether or not it's currently dead-but-present
                    // (ref count 0, not yet swept by `collect_garbage`): no
                    // new structural edge is being created here, so neither
                    // this node's nor its children's counts change. A dead
                    // one simply gets a fresh count the next time something
                    // actually references it (a parent build, or an
                    // explicit `Manager::incref`).
                    let found = DdNode::new(id, false);
                    return Ok(found.with_inversion(invert_result));
                }
            }
            cursor = slot.next_in_chain.get();
        }

        // Not found: allocate a fresh slot and link it at the head.
        let id = self.alloc_internal(var, level, then_raw, else_raw)?;
        self.link_into_bucket(level.index(), bucket_idx, id);
        self.subtables[level.index()].buckets.live += 1;
        self.maybe_grow_level(level.index());

        let created = DdNode::new(id, false);
        Ok(created.with_inversion(invert_result))
    }

    fn link_into_bucket(&mut self, level: usize, bucket_idx: usize, id: NodeId) {
        let head = self.subtables[level].buckets.slots[bucket_idx];
        self.arena[id.index()].next_in_chain.set(head);
        self.subtables[level].buckets.slots[bucket_idx] = Some(id);
    }

    fn alloc_internal(
        &mut self,
        var: Var,
        level: Level,
        then_raw: u32,
        else_raw: u32,
    ) -> Result<NodeId> {
        if self.arena.len() >= u32::MAX as usize - 1 {
            return Err(DdError::new(ErrorKind::TooManyNodes));
        }
        let id = NodeId::from_index(self.arena.len());
        self.arena.push(Slot {
            data: NodeData::Internal { var, level, then_raw, else_raw },
            // Starts unreferenced: nothing points at this node yet. The two
            // structural edges being established right now (to `then`/`else`)
            // are recorded on the *children*, immediately below, not here --
            // a fresh node only gains a count once something actually
            // references it (a parent's construction, or `Manager::incref`).
            ref_count: std::cell::Cell::new(0),
            next_in_chain: std::cell::Cell::new(None),
            dead: std::cell::Cell::new(false),
        });
        self.arena[DdNode::from_raw(then_raw).id().index()].incref();
        self.arena[DdNode::from_raw(else_raw).id().index()].incref();
        self.peak_nodes = self.peak_nodes.max(self.live_node_count());
        Ok(id)
    }

    /// Find-or-create the canonical terminal node for `value`. Equality of
    /// terminal values is tested within `epsilon`.
    pub(crate) fn unique_const(&mut self, value: f64) -> Result<DdNode> {
        let bits = value.to_bits();
        let hash = hash_value(bits);
        let bucket_idx = self.consts.buckets.bucket_index(hash);

        let mut cursor = self.consts.buckets.slots[bucket_idx];
        while let Some(id) = cursor {
            let slot = &self.arena[id.index()];
            if let NodeData::Terminal { value: v } = slot.data {
                if (v - value).abs() <= self.epsilon {
                    // As in `unique_inter`: found is found, dead or not. No
                    // new edge is created by a hash hit.
                    return Ok(DdNode::new(id, false));
                }
            }
            cursor = slot.next_in_chain.get();
        }

        if self.arena.len() >= u32::MAX as usize - 1 {
            return Err(DdError::new(ErrorKind::TooManyNodes));
        }
        let id = NodeId::from_index(self.arena.len());
        self.arena.push(Slot {
            data: NodeData::Terminal { value },
            // Same reasoning as `alloc_internal`: a terminal has no children
            // to bump, so it simply starts at zero.
            ref_count: std::cell::Cell::new(0),
            next_in_chain: std::cell::Cell::new(self.consts.buckets.slots[bucket_idx]),
            dead: std::cell::Cell::new(false),
        });
        self.consts.buckets.slots[bucket_idx] = Some(id);
        self.consts.buckets.live += 1;
        if self.consts.buckets.needs_growth(self.max_density) {
            self.grow_consts();
        }
        Ok(DdNode::new(id, false))
    }

    fn maybe_grow_level(&mut self, level: usize) {
        if self.subtables[level].buckets.needs_growth(self.max_density) {
            self.grow_level(level);
        }
    }

    fn grow_level(&mut self, level: usize) {
        let old_slots = self.subtables[level].buckets.live + self.subtables[level].buckets.dead;
        let new_count = (old_slots.max(self.subtables[level].buckets.slots.len()) * 2)
            .next_power_of_two()
            .max(self.subtables[level].buckets.slots.len() * 2);
        let mut fresh = Buckets::new(new_count);
        // Rehash every node still chained into the old array, dead-but-
        // present ones included: a node pending a `collect_garbage` sweep
        // must stay findable-for-revival across a growth exactly as it
        // would between two ordinary `unique_inter` calls, or growth would
        // silently strand it outside every bucket chain with no sweep
        // ever able to reach it.
        let old_heads: Vec<Option<NodeId>> = self.subtables[level].buckets.slots.clone();
        for head in old_heads {
            let mut cursor = head;
            while let Some(id) = cursor {
                let next = self.arena[id.index()].next_in_chain.get();
                if let NodeData::Internal { then_raw, else_raw, .. } = self.arena[id.index()].data {
                    let h = hash_pair(then_raw, else_raw);
                    let idx = fresh.bucket_index(h);
                    self.arena[id.index()].next_in_chain.set(fresh.slots[idx]);
                    fresh.slots[idx] = Some(id);
                    if self.arena[id.index()].is_dead() {
                        fresh.dead += 1;
                    } else {
                        fresh.live += 1;
                    }
                }
                cursor = next;
            }
        }
        self.subtables[level].buckets = fresh;
        log::debug!("unique table: grew level {} to {} slots", level, new_count);
    }

    fn grow_consts(&mut self) {
        let new_count = self.consts.buckets.slots.len() * 2;
        let mut fresh = Buckets::new(new_count);
        let old_heads: Vec<Option<NodeId>> = self.consts.buckets.slots.clone();
        for head in old_heads {
            let mut cursor = head;
            while let Some(id) = cursor {
                let next = self.arena[id.index()].next_in_chain.get();
                if let NodeData::Terminal { value } = self.arena[id.index()].data {
                    let h = hash_value(value.to_bits());
                    let idx = fresh.bucket_index(h);
                    self.arena[id.index()].next_in_chain.set(fresh.slots[idx]);
                    fresh.slots[idx] = Some(id);
                    if self.arena[id.index()].is_dead() {
                        fresh.dead += 1;
                    } else {
                        fresh.live += 1;
                    }
                }
                cursor = next;
            }
        }
        self.consts.buckets = fresh;
    }

    // -- reorder support --------------------------------------------------

    /// All currently-live nodes at `level`, in an arbitrary but stable order
    /// (snapshotted so the caller can mutate the table while iterating).
    pub(crate) fn live_ids_at(&self, level: usize) -> Vec<NodeId> {
        let mut out = Vec::new();
        if level >= self.subtables.len() {
            return out;
        }
        for &head in &self.subtables[level].buckets.slots {
            let mut cursor = head;
            while let Some(id) = cursor {
                let slot = &self.arena[id.index()];
                if !slot.is_dead() {
                    out.push(id);
                }
                cursor = slot.next_in_chain.get();
            }
        }
        out
    }

    pub(crate) fn live_count_at(&self, level: usize) -> usize {
        self.subtables.get(level).map(|s| s.buckets.live).unwrap_or(0)
    }

    /// Remove `id` from `level`'s chain entirely and mark it dead; used once
    /// a reorder has redirected every referrer away from `id`.
    pub(crate) fn unlink(&mut self, level: usize, id: NodeId) {
        let sub = &mut self.subtables[level];
        let bucket_idx = {
            if let NodeData::Internal { then_raw, else_raw, .. } = self.arena[id.index()].data {
                sub.buckets.bucket_index(hash_pair(then_raw, else_raw))
            } else {
                return;
            }
        };
        let mut cursor = sub.buckets.slots[bucket_idx];
        let mut prev: Option<NodeId> = None;
        while let Some(cur) = cursor {
            let next = self.arena[cur.index()].next_in_chain.get();
            if cur == id {
                match prev {
                    Some(p) => self.arena[p.index()].next_in_chain.set(next),
                    None => self.subtables[level].buckets.slots[bucket_idx] = next,
                }
                self.arena[id.index()].dead.set(true);
                self.arena[id.index()].ref_count.set(0);
                self.subtables[level].buckets.live -= 1;
                self.subtables[level].buckets.dead += 1;
                return;
            }
            prev = Some(cur);
            cursor = next;
        }
    }

    /// Move `id` (an internal node, content unchanged) from `from_level` to
    /// `to_level`, updating its stored `level` metadata and its chain
    /// membership. Used for the half of a level-swap whose function doesn't
    /// depend on the swapped-in variable (see reorder::swap_adjacent).
    pub(crate) fn relabel_level(&mut self, id: NodeId, from_level: usize, to_level: Level) {
        let saved_ref_count = self.arena[id.index()].ref_count.get();
        self.unlink(from_level, id);
        // `unlink` marked it dead and zeroed its count; undo both, since the
        // node is simply relocating to a new level, not actually dying.
        self.arena[id.index()].dead.set(false);
        self.arena[id.index()].ref_count.set(saved_ref_count);
        let (then_raw, else_raw, var) = match self.arena[id.index()].data {
            NodeData::Internal { then_raw, else_raw, var, .. } => (then_raw, else_raw, var),
            NodeData::Terminal { .. } => unreachable!("relabel_level on a terminal"),
        };
        self.ensure_level(to_level, DEFAULT_SLOTS);
        self.arena[id.index()].data = NodeData::Internal { var, level: to_level, then_raw, else_raw };
        let hash = hash_pair(then_raw, else_raw);
        let bucket_idx = self.subtables[to_level.index()].buckets.bucket_index(hash);
        self.link_into_bucket(to_level.index(), bucket_idx, id);
        self.subtables[to_level.index()].buckets.live += 1;
    }

    // -- garbage collection ------------------------------------------------

    /// Sweep every subtable (and the constant pool), unlinking any node
    /// whose count has reached zero. Children of a dead node are *not*
    /// decremented here -- that happened when the node itself died.
    pub(crate) fn collect_garbage(&mut self) -> usize {
        let mut reclaimed = 0;
        for level in 0..self.subtables.len() {
            let dead_ids: Vec<NodeId> = self
                .live_ids_at(level)
                .into_iter()
                .filter(|&id| self.arena[id.index()].is_dead())
                .collect();
            for id in dead_ids {
                self.unlink(level, id);
                reclaimed += 1;
            }
        }
        let dead_consts: Vec<NodeId> = {
            let mut out = Vec::new();
            for &head in &self.consts.buckets.slots {
                let mut cursor = head;
                while let Some(id) = cursor {
                    let slot = &self.arena[id.index()];
                    if slot.is_dead() {
                        out.push(id);
                    }
                    cursor = slot.next_in_chain.get();
                }
            }
            out
        };
        for id in dead_consts {
            self.unlink_const(id);
            reclaimed += 1;
        }
        reclaimed
    }

    fn unlink_const(&mut self, id: NodeId) {
        let bits = match self.arena[id.index()].data {
            NodeData::Terminal { value } => value.to_bits(),
            NodeData::Internal { .. } => return,
        };
        let bucket_idx = self.consts.buckets.bucket_index(hash_value(bits));
        let mut cursor = self.consts.buckets.slots[bucket_idx];
        let mut prev: Option<NodeId> = None;
        while let Some(cur) = cursor {
            let next = self.arena[cur.index()].next_in_chain.get();
            if cur == id {
                match prev {
                    Some(p) => self.arena[p.index()].next_in_chain.set(next),
                    None => self.consts.buckets.slots[bucket_idx] = next,
                }
                self.arena[id.index()].dead.set(true);
                self.consts.buckets.live -= 1;
                self.consts.buckets.dead += 1;
                return;
            }
            prev = Some(cur);
            cursor = next;
        }
    }

    /// Count nodes currently chained into `level` whose ref count has
    /// reached zero but that haven't yet been unlinked by a GC sweep.
    fn pending_sweep_count_at(&self, level: usize) -> usize {
        if level >= self.subtables.len() {
            return 0;
        }
        let mut count = 0;
        for &head in &self.subtables[level].buckets.slots {
            let mut cursor = head;
            while let Some(id) = cursor {
                let slot = &self.arena[id.index()];
                if slot.is_dead() {
                    count += 1;
                }
                cursor = slot.next_in_chain.get();
            }
        }
        count
    }

    fn pending_sweep_consts(&self) -> usize {
        let mut count = 0;
        for &head in &self.consts.buckets.slots {
            let mut cursor = head;
            while let Some(id) = cursor {
                let slot = &self.arena[id.index()];
                if slot.is_dead() {
                    count += 1;
                }
                cursor = slot.next_in_chain.get();
            }
        }
        count
    }

    /// Whether any resident node's count has reached zero and is awaiting
    /// a `collect_garbage` sweep. `Buckets.dead` only tracks nodes already
    /// unlinked (a one-way historical tally), so this scans the chains
    /// directly rather than trusting that field.
    pub(crate) fn has_dead(&self) -> bool {
        self.pending_sweep_consts() > 0
            || (0..self.subtables.len()).any(|lvl| self.pending_sweep_count_at(lvl) > 0)
    }

    /// Nodes currently resident in the table (ref count zero or not);
    /// matches CUDD's notion of "keys" -- the unique table's occupancy
    /// before a GC sweep reclaims anything.
    pub(crate) fn live_node_count(&self) -> usize {
        self.consts.buckets.live + self.subtables.iter().map(|s| s.buckets.live).sum::<usize>()
    }

    /// Nodes resident but unreferenced, awaiting `collect_garbage`.
    pub(crate) fn dead_node_count(&self) -> usize {
        self.pending_sweep_consts()
            + (0..self.subtables.len()).map(|lvl| self.pending_sweep_count_at(lvl)).sum::<usize>()
    }

    pub(crate) fn stats(&self) -> TableStats {
        TableStats {
            live_nodes: self.live_node_count(),
            dead_nodes: self.dead_node_count(),
            peak_nodes: self.peak_nodes,
        }
    }

    pub(crate) fn arena_len(&self) -> usize {
        self.arena.len()
    }
}
