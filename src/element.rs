use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// How an element decides that its valence shell is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OctetRule {
    /// Exactly one single bond, nothing else.
    Hydrogen,
    /// Exactly `n` single bonds and no lone pairs (Be, B, Al).
    SingleBonds(u8),
    /// Eight electrons, or the widened range when expansion is allowed.
    Standard,
}

/// Per-element constants. These never change after the table is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub symbol: &'static str,
    pub molar_mass: f64,
    pub valence_electrons: u8,
    pub preferred_bonds: u8,
    pub atomic_number: u8,
    pub can_expand_octet: bool,
    pub electronegativity: f64,
    pub octet_rule: OctetRule,
}

impl Element {
    fn new(
        symbol: &'static str,
        molar_mass: f64,
        valence_electrons: u8,
        preferred_bonds: u8,
        atomic_number: u8,
        can_expand_octet: bool,
        electronegativity: f64,
    ) -> Self {
        let octet_rule = match atomic_number {
            1 => OctetRule::Hydrogen,
            4 => OctetRule::SingleBonds(2),
            5 | 13 => OctetRule::SingleBonds(3),
            _ => OctetRule::Standard,
        };
        Self {
            symbol,
            molar_mass,
            valence_electrons,
            preferred_bonds,
            atomic_number,
            can_expand_octet,
            electronegativity,
            octet_rule,
        }
    }

    /// Look up an element by its chemical symbol.
    pub fn lookup(symbol: &str) -> Option<&'static Element> {
        let table: &'static HashMap<&'static str, Element> = &ELEMENTS;
        table.get(symbol)
    }

    /// Number of electrons that count as a full shell for this element.
    pub fn octet_target(&self) -> u8 {
        match self.octet_rule {
            OctetRule::Hydrogen => 2,
            OctetRule::SingleBonds(n) => 2 * n,
            OctetRule::Standard => 8,
        }
    }

    /// Only elements following the standard octet rule ever hold lone pairs.
    pub fn accepts_lone_pairs(&self) -> bool {
        self.octet_rule == OctetRule::Standard
    }

    pub fn is_hydrogen(&self) -> bool {
        self.octet_rule == OctetRule::Hydrogen
    }

    pub fn is_carbon(&self) -> bool {
        self.atomic_number == 6
    }

    pub fn is_halogen(&self) -> bool {
        matches!(self.atomic_number, 9 | 17 | 35 | 53)
    }

    pub fn is_noble_gas(&self) -> bool {
        matches!(self.atomic_number, 2 | 10 | 18 | 36 | 54)
    }

    /// All symbols in the table, sorted by atomic number.
    pub fn all_symbols() -> Vec<&'static str> {
        let mut elements: Vec<&Element> = ELEMENTS.values().collect();
        elements.sort_by_key(|element| element.atomic_number);
        elements.into_iter().map(|element| element.symbol).collect()
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.symbol)
    }
}

lazy_static! {
    /// Only these elements take part in Lewis structures.
    static ref ELEMENTS: HashMap<&'static str, Element> = {
        let elements = [
            Element::new("H", 1.01, 1, 1, 1, false, 2.20),
            Element::new("C", 12.01, 4, 4, 6, false, 2.55),
            Element::new("N", 14.01, 5, 3, 7, false, 3.04),
            Element::new("O", 16.00, 6, 2, 8, false, 3.44),
            Element::new("S", 32.07, 6, 2, 16, true, 2.58),
            Element::new("F", 19.00, 7, 1, 9, false, 3.98),
            Element::new("Cl", 34.45, 7, 1, 17, true, 3.16),
            Element::new("Br", 79.70, 7, 1, 35, true, 2.96),
            Element::new("P", 30.97, 5, 3, 15, true, 2.19),
            Element::new("I", 126.90, 7, 1, 53, true, 2.66),
            Element::new("He", 4.00, 8, 4, 2, false, 0.0),
            Element::new("Ne", 20.18, 8, 4, 10, false, 0.0),
            Element::new("Ar", 39.95, 8, 4, 18, true, 0.0),
            Element::new("Kr", 83.80, 8, 4, 36, true, 3.0),
            Element::new("Xe", 131.29, 8, 4, 54, true, 2.6),
            Element::new("B", 10.81, 3, 3, 5, false, 2.04),
            Element::new("Be", 9.01, 2, 2, 4, false, 1.57),
            Element::new("Si", 28.09, 4, 4, 14, true, 1.90),
            Element::new("Al", 26.98, 3, 3, 13, true, 1.61),
        ];
        elements.into_iter().map(|element| (element.symbol, element)).collect()
    };
}
