use crate::Element;
use std::cell::OnceCell;

/// Result of checking an atom's valence shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Octet {
    Complete,
    Over,
    Incomplete,
}

/// Node weight of a structure graph.
///
/// Bonds are the graph's edges, so an atom only keeps its lone pairs and the
/// running electron count. `electrons` is updated by every mutation instead of
/// being recomputed from the edges.
///
/// The canonical signature is cached until the next mutation. Every change to
/// a bond touching this atom goes through `gain` or `lose`, so clearing the
/// cache there keeps it exact.
#[derive(Debug, Clone)]
pub struct Atom {
    element: &'static Element,
    lone_pairs: u8,
    electrons: u8,
    expandable: bool,
    signature: OnceCell<String>,
}

impl Atom {
    pub fn new(element: &'static Element, expandable: bool) -> Self {
        Self {
            element,
            lone_pairs: 0,
            electrons: 0,
            expandable,
            signature: OnceCell::new(),
        }
    }

    pub fn element(&self) -> &'static Element {
        self.element
    }

    pub fn symbol(&self) -> &'static str {
        self.element.symbol
    }

    pub fn lone_pairs(&self) -> u8 {
        self.lone_pairs
    }

    pub fn electrons(&self) -> u8 {
        self.electrons
    }

    /// Whether this atom may hold more than eight electrons in this molecule.
    pub fn is_expandable(&self) -> bool {
        self.expandable
    }

    /// The cached signature, computing it with `compute` if there is none.
    pub(crate) fn signature_or(&self, compute: impl FnOnce() -> String) -> &str {
        self.signature.get_or_init(compute)
    }

    pub(crate) fn has_cached_signature(&self) -> bool {
        self.signature.get().is_some()
    }

    fn invalidate(&mut self) {
        self.signature.take();
    }

    pub fn add_lone_pair(&mut self) {
        self.lone_pairs += 1;
        self.electrons += 2;
        self.invalidate();
    }

    pub fn remove_lone_pair(&mut self) -> bool {
        if self.lone_pairs == 0 {
            return false;
        }
        self.lone_pairs -= 1;
        self.electrons -= 2;
        self.invalidate();
        true
    }

    pub(crate) fn gain(&mut self, electrons: u8) {
        self.electrons += electrons;
        self.invalidate();
    }

    pub(crate) fn lose(&mut self, electrons: u8) {
        self.electrons -= electrons;
        self.invalidate();
    }
}
