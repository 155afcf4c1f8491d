//! Tunable knobs for the search. Every field has a default matching the
//! values the scoring heuristics were calibrated with.

/// Penalty constants added on top of the formal-charge terms of a score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub oxygen_oxygen_single: f64,
    pub nitrogen_nitrogen_single: f64,
    pub fluorine_fluorine_single: f64,
    pub oxygen_fluorine_single: f64,
    pub nitrogen_oxygen_single: f64,
    pub oxygen_triple: f64,
    pub fluorine_triple: f64,
    pub carbon_fluorine_double: f64,
    pub carbon_fluorine_triple: f64,
    /// Oxygen bonded to more than two atoms.
    pub oxygen_overbonded: f64,
    /// Noble gas carrying any formal charge. Large enough that such a
    /// structure never wins.
    pub charged_noble_gas: f64,
    /// Whether to add `Σ|fc| / (charged atoms)`.
    pub charge_sharing: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            oxygen_oxygen_single: 10.0,
            nitrogen_nitrogen_single: 10.0,
            fluorine_fluorine_single: 20.0,
            oxygen_fluorine_single: 7.0,
            nitrogen_oxygen_single: 5.0,
            oxygen_triple: 15.0,
            fluorine_triple: 15.0,
            carbon_fluorine_double: 10.0,
            carbon_fluorine_triple: 30.0,
            oxygen_overbonded: 15.0,
            charged_noble_gas: 1000.0,
            charge_sharing: true,
        }
    }
}

/// Which atoms of a molecule may hold more than eight electrons.
///
/// An atom qualifies when its element allows it, the molecule's size is within
/// `min_atoms..=max_atoms`, and (if `require_unique`) no other atom shares its element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionPolicy {
    pub min_atoms: usize,
    pub max_atoms: usize,
    pub require_unique: bool,
}

impl Default for ExpansionPolicy {
    fn default() -> Self {
        Self {
            min_atoms: 3,
            max_atoms: 8,
            require_unique: true,
        }
    }
}

impl ExpansionPolicy {
    /// A policy under which no atom ever expands.
    pub fn disabled() -> Self {
        Self {
            min_atoms: usize::MAX,
            max_atoms: 0,
            require_unique: true,
        }
    }

    pub fn allows(&self, can_expand: bool, element_count: usize, atom_count: usize) -> bool {
        can_expand
            && (!self.require_unique || element_count == 1)
            && (self.min_atoms..=self.max_atoms).contains(&atom_count)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub scoring: ScoringConfig,
    pub expansion: ExpansionPolicy,
    /// Results scoring above this are dropped even if nothing better exists.
    pub max_score: Option<f64>,
    /// Stop after visiting this many search states.
    pub node_budget: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            expansion: ExpansionPolicy::default(),
            max_score: Some(40.0),
            node_budget: None,
        }
    }
}

impl SearchConfig {
    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_expansion(mut self, expansion: ExpansionPolicy) -> Self {
        self.expansion = expansion;
        self
    }

    pub fn with_max_score(mut self, max_score: Option<f64>) -> Self {
        self.max_score = max_score;
        self
    }

    pub fn with_node_budget(mut self, node_budget: Option<usize>) -> Self {
        self.node_budget = node_budget;
        self
    }
}
