//! Typed hook taxonomy, replacing the C original's single untyped
//! function-pointer slot per hook kind with one `Vec` of boxed closures per
//! kind -- see SPEC_FULL.md's Design Notes for the rationale.
use crate::manager::Manager;

/// Which lifecycle event a hook fires on, mirroring `Cudd_HookType`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HookKind {
    PreGc,
    PostGc,
    PreReorder,
    PostReorder,
}

pub type HookFn = Box<dyn FnMut(&Manager) + 'static>;

#[derive(Default)]
pub(crate) struct HookTable {
    pre_gc: Vec<HookFn>,
    post_gc: Vec<HookFn>,
    pre_reorder: Vec<HookFn>,
    post_reorder: Vec<HookFn>,
}

impl HookTable {
    pub(crate) fn add(&mut self, kind: HookKind, hook: HookFn) {
        match kind {
            HookKind::PreGc => self.pre_gc.push(hook),
            HookKind::PostGc => self.post_gc.push(hook),
            HookKind::PreReorder => self.pre_reorder.push(hook),
            HookKind::PostReorder => self.post_reorder.push(hook),
        }
    }

    fn slot_mut(&mut self, kind: HookKind) -> &mut Vec<HookFn> {
        match kind {
            HookKind::PreGc => &mut self.pre_gc,
            HookKind::PostGc => &mut self.post_gc,
            HookKind::PreReorder => &mut self.pre_reorder,
            HookKind::PostReorder => &mut self.post_reorder,
        }
    }

    pub(crate) fn take(&mut self, kind: HookKind) -> Vec<HookFn> {
        std::mem::take(self.slot_mut(kind))
    }

    pub(crate) fn restore(&mut self, kind: HookKind, hooks: Vec<HookFn>) {
        *self.slot_mut(kind) = hooks;
    }
}
