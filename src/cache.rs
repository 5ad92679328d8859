//! The computed cache: a direct-mapped, lossy memo table keyed by operator
//! tag plus operand pointers.
//!
//! Grounded on the teacher's `NormIteKey`/`Norm` memo key in `bdd.rs` --
//! the same idea of hashing a small fixed-arity operator tuple -- but
//! implemented as a direct-mapped open table per spec.md §4.3 rather than
//! a `HashMap`, since entries here are explicitly allowed to be evicted on
//! collision (a cache miss, never a correctness problem).
use fxhash::FxHasher;
use std::hash::{Hash, Hasher};

use crate::ptr::DdNode;

/// Which recursive operator a cache entry belongs to. Distinguishing these
/// keeps, e.g., an `Ite` result from colliding with an `Abstract` result
/// that happens to hash to the same slot with unrelated operands.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) enum Tag {
    Ite,
    And,
    Xor,
    Abstract,
    Compose,
    Cofactor,
    Transfer,
    Constrain,
    Restrict,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
struct Key {
    tag: Tag,
    a: DdNode,
    b: DdNode,
    c: DdNode,
}

#[derive(Clone, Copy)]
struct Entry {
    key: Key,
    result: DdNode,
}

/// Default slot count, matching the manager's unique-table default so the
/// two structures grow on roughly the same schedule.
pub const DEFAULT_SLOTS: usize = 256;

#[derive(Debug, Default, Clone, Copy)]
pub struct CacheStats {
    pub lookups: u64,
    pub hits: u64,
    pub inserts: u64,
    pub collisions: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            self.hits as f64 / self.lookups as f64
        }
    }
}

pub(crate) struct ComputedCache {
    slots: Vec<Option<Entry>>,
    shift: u32,
    stats: CacheStats,
    /// Resize is triggered by a sustained low hit ratio rather than a fixed
    /// load factor, since the cache is lossy and "full" has no fixed
    /// meaning -- matching spec.md §4.3's soft-resize policy.
    min_hit_ratio: f64,
    min_lookups_before_resize: u64,
}

impl ComputedCache {
    pub(crate) fn new(initial_slots: usize) -> Self {
        let slot_count = initial_slots.next_power_of_two().max(1);
        ComputedCache {
            slots: vec![None; slot_count],
            shift: 64 - slot_count.trailing_zeros(),
            stats: CacheStats::default(),
            min_hit_ratio: 0.05,
            min_lookups_before_resize: 2048,
        }
    }

    fn index(&self, key: &Key) -> usize {
        let mut h = FxHasher::default();
        key.hash(&mut h);
        (h.finish() >> self.shift) as usize
    }

    fn lookup_raw(&mut self, key: Key) -> Option<DdNode> {
        self.stats.lookups += 1;
        let idx = self.index(&key);
        match self.slots[idx] {
            Some(entry) if entry.key == key => {
                self.stats.hits += 1;
                Some(entry.result)
            }
            _ => {
                self.maybe_resize();
                None
            }
        }
    }

    fn insert_raw(&mut self, key: Key, result: DdNode) {
        let idx = self.index(&key);
        if self.slots[idx].is_some() {
            self.stats.collisions += 1;
        }
        self.stats.inserts += 1;
        self.slots[idx] = Some(Entry { key, result });
    }

    fn maybe_resize(&mut self) {
        if self.stats.lookups >= self.min_lookups_before_resize
            && self.stats.hit_ratio() < self.min_hit_ratio
            && self.slots.len() < (1 << 24)
        {
            self.grow();
            self.stats = CacheStats::default();
        }
    }

    fn grow(&mut self) {
        let new_count = self.slots.len() * 2;
        self.slots = vec![None; new_count];
        self.shift = 64 - new_count.trailing_zeros();
        log::debug!("computed cache: grew to {} slots (low hit ratio)", new_count);
    }

    /// Drop every entry. Required after any operation that changes the
    /// manager's variable order (see reorder::swap_adjacent) or after
    /// garbage collection, since cached results may reference dead nodes.
    pub(crate) fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
    }

    pub(crate) fn stats(&self) -> CacheStats {
        self.stats
    }

    // -- typed accessors per operator -------------------------------------

    pub(crate) fn lookup_ite(&mut self, f: DdNode, g: DdNode, h: DdNode) -> Option<DdNode> {
        self.lookup_raw(Key { tag: Tag::Ite, a: f, b: g, c: h })
    }

    pub(crate) fn insert_ite(&mut self, f: DdNode, g: DdNode, h: DdNode, result: DdNode) {
        self.insert_raw(Key { tag: Tag::Ite, a: f, b: g, c: h }, result);
    }

    pub(crate) fn lookup_and(&mut self, f: DdNode, g: DdNode) -> Option<DdNode> {
        self.lookup_raw(Key { tag: Tag::And, a: f, b: g, c: f })
    }

    pub(crate) fn insert_and(&mut self, f: DdNode, g: DdNode, result: DdNode) {
        self.insert_raw(Key { tag: Tag::And, a: f, b: g, c: f }, result);
    }

    pub(crate) fn lookup_abstract(&mut self, op: DdNode, f: DdNode, cube: DdNode) -> Option<DdNode> {
        self.lookup_raw(Key { tag: Tag::Abstract, a: op, b: f, c: cube })
    }

    pub(crate) fn insert_abstract(&mut self, op: DdNode, f: DdNode, cube: DdNode, result: DdNode) {
        self.insert_raw(Key { tag: Tag::Abstract, a: op, b: f, c: cube }, result);
    }

    pub(crate) fn lookup_cofactor(&mut self, f: DdNode, cube: DdNode) -> Option<DdNode> {
        self.lookup_raw(Key { tag: Tag::Cofactor, a: f, b: cube, c: f })
    }

    pub(crate) fn insert_cofactor(&mut self, f: DdNode, cube: DdNode, result: DdNode) {
        self.insert_raw(Key { tag: Tag::Cofactor, a: f, b: cube, c: f }, result);
    }

    pub(crate) fn lookup_compose(&mut self, f: DdNode, x: DdNode, g: DdNode) -> Option<DdNode> {
        self.lookup_raw(Key { tag: Tag::Compose, a: f, b: x, c: g })
    }

    pub(crate) fn insert_compose(&mut self, f: DdNode, x: DdNode, g: DdNode, result: DdNode) {
        self.insert_raw(Key { tag: Tag::Compose, a: f, b: x, c: g }, result);
    }

    pub(crate) fn lookup_constrain(&mut self, f: DdNode, c: DdNode) -> Option<DdNode> {
        self.lookup_raw(Key { tag: Tag::Constrain, a: f, b: c, c: f })
    }

    pub(crate) fn insert_constrain(&mut self, f: DdNode, c: DdNode, result: DdNode) {
        self.insert_raw(Key { tag: Tag::Constrain, a: f, b: c, c: f }, result);
    }

    pub(crate) fn lookup_restrict(&mut self, f: DdNode, c: DdNode) -> Option<DdNode> {
        self.lookup_raw(Key { tag: Tag::Restrict, a: f, b: c, c: f })
    }

    pub(crate) fn insert_restrict(&mut self, f: DdNode, c: DdNode, result: DdNode) {
        self.insert_raw(Key { tag: Tag::Restrict, a: f, b: c, c: f }, result);
    }
}
