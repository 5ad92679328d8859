//! Variable identifiers and the level ordering.
use std::cmp::Ordering;
use std::fmt;

/// Identifies one of the variables declared in a [`crate::manager::Manager`].
///
/// `Var` never changes once issued: the variable keeps the same identity
/// across reorders. What changes is the *level* it occupies, tracked
/// separately by the manager's permutation tables.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Var(pub(crate) u32);

impl Var {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// The position a variable currently occupies in the diagram, where level 0
/// is the root and higher levels sit closer to the terminals.
///
/// A reserved sentinel level, [`Level::TERMINAL`], is strictly below every
/// real variable's level and is what [`Level::of_terminal`] reports, so
/// ordering comparisons between an internal node and a terminal child never
/// need a special case at call sites.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Level(pub(crate) u32);

impl Level {
    /// Sentinel level for terminal nodes: deeper than any real variable.
    pub const TERMINAL: Level = Level(u32::MAX);

    #[inline]
    pub fn is_terminal(self) -> bool {
        self == Level::TERMINAL
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn new(i: usize) -> Self {
        Level(i as u32)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_terminal() {
            write!(f, "T")
        } else {
            write!(f, "L{}", self.0)
        }
    }
}

/// Relative depth of two levels, read "self is {Above,Level,Below} other".
/// `Above` means closer to the root (numerically smaller level).
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum VarOrdering {
    Above,
    Level,
    Below,
}

impl Level {
    pub fn cmp_depth(self, other: Level) -> VarOrdering {
        match self.cmp(&other) {
            Ordering::Less => VarOrdering::Above,
            Ordering::Equal => VarOrdering::Level,
            Ordering::Greater => VarOrdering::Below,
        }
    }

    pub fn is_above(self, other: Level) -> bool {
        self.cmp_depth(other) == VarOrdering::Above
    }

    pub fn is_below(self, other: Level) -> bool {
        self.cmp_depth(other) == VarOrdering::Below
    }
}

/// Return whichever of two levels is closer to the root.
pub fn topmost(x: Level, y: Level) -> Level {
    if x.is_above(y) {
        x
    } else {
        y
    }
}

/// Topmost of three levels (used by the ternary ITE skeleton).
pub fn topmost_of3(x: Level, y: Level, z: Level) -> Level {
    topmost(x, topmost(y, z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_is_deepest() {
        assert!(Level::TERMINAL.is_below(Level::new(0)));
        assert!(Level::new(5).is_above(Level::new(3)) == false);
        assert!(Level::new(3).is_above(Level::new(5)));
    }

    #[test]
    fn topmost_picks_smaller_level() {
        let a = Level::new(2);
        let b = Level::new(7);
        assert_eq!(topmost(a, b), a);
        assert_eq!(topmost_of3(b, a, Level::TERMINAL), a);
    }
}
