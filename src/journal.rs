use petgraph::graph::{EdgeIndex, NodeIndex};

/// One reversible change to a molecule during search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    /// A sigma bond was added. Sigma edits are always undone newest first,
    /// which keeps petgraph's edge indices stable.
    Sigma(EdgeIndex),
    /// A bond order was raised by one.
    Pi(EdgeIndex),
    /// A lone pair was placed on an atom.
    LonePair(NodeIndex),
    /// An atom was marked settled, contributing this formal charge to the bound.
    Settle(NodeIndex, i32),
}

/// Stack of edits applied since the search started.
///
/// Callers take a [`Journal::mark`] before exploring a branch and roll back to
/// it with `Molecule::rollback` before returning, so every frame leaves the
/// molecule exactly as it found it.
#[derive(Debug, Default, Clone)]
pub struct Journal {
    edits: Vec<Edit>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self) -> usize {
        self.edits.len()
    }

    pub fn record(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Pop the most recent edit, if it was made after `mark`.
    pub(crate) fn pop_since(&mut self, mark: usize) -> Option<Edit> {
        if self.edits.len() > mark {
            self.edits.pop()
        } else {
            None
        }
    }
}
