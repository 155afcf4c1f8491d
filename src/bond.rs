use std::fmt::{Display, Formatter, Result as FmtResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
}

impl BondOrder {
    /// Number of shared electron pairs.
    pub fn order(self) -> u8 {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        }
    }

    /// Number of electrons held in the bond.
    pub fn electrons(self) -> u8 {
        2 * self.order()
    }

    pub fn symbol(self) -> char {
        match self {
            BondOrder::Single => '-',
            BondOrder::Double => '=',
            BondOrder::Triple => '#',
        }
    }

    fn raised(self) -> Option<Self> {
        match self {
            BondOrder::Single => Some(BondOrder::Double),
            BondOrder::Double => Some(BondOrder::Triple),
            BondOrder::Triple => None,
        }
    }

    fn lowered(self) -> Option<Self> {
        match self {
            BondOrder::Single => None,
            BondOrder::Double => Some(BondOrder::Single),
            BondOrder::Triple => Some(BondOrder::Double),
        }
    }
}

impl Display for BondOrder {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.symbol())
    }
}

/// Edge weight of a structure graph.
///
/// The endpoints live in the graph; a bond only knows its order and how many
/// times the search has raised it on the current path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bond {
    order: BondOrder,
    modifications: u32,
}

impl Bond {
    pub fn single() -> Self {
        Self::with_order(BondOrder::Single)
    }

    pub fn with_order(order: BondOrder) -> Self {
        Self { order, modifications: 0 }
    }

    pub fn order(&self) -> BondOrder {
        self.order
    }

    pub fn electrons(&self) -> u8 {
        self.order.electrons()
    }

    pub fn modifications(&self) -> u32 {
        self.modifications
    }

    pub fn is_triple(&self) -> bool {
        self.order == BondOrder::Triple
    }

    /// Raise the order by one. Fails on a triple bond.
    ///
    /// Endpoint electron counts are the caller's responsibility; use
    /// `Molecule::add_pi` to keep them in step.
    pub fn add_pi(&mut self) -> bool {
        match self.order.raised() {
            Some(order) => {
                self.order = order;
                self.modifications += 1;
                true
            }
            None => false,
        }
    }

    /// Lower the order by one. Fails on a single bond.
    pub fn remove_pi(&mut self) -> bool {
        match self.order.lowered() {
            Some(order) => {
                self.order = order;
                self.modifications = self.modifications.saturating_sub(1);
                true
            }
            None => false,
        }
    }
}
