use crate::score::SCORE_EPSILON;
use tracing::warn;

/// Mutable state shared by every stage of one solver invocation.
///
/// Holds the best score accepted so far, which later skeletons prune
/// against, and the optional node budget.
#[derive(Debug, Clone)]
pub struct SearchContext {
    best: f64,
    nodes: usize,
    budget: Option<usize>,
    exhausted: bool,
}

impl SearchContext {
    pub fn new(budget: Option<usize>) -> Self {
        Self {
            best: f64::INFINITY,
            nodes: 0,
            budget,
            exhausted: false,
        }
    }

    pub fn best(&self) -> f64 {
        self.best
    }

    /// Lower the best score if `score` beats it.
    pub fn offer(&mut self, score: f64) {
        if score < self.best {
            self.best = score;
        }
    }

    /// Whether a structure with this score is still worth keeping.
    pub fn admits(&self, score: f64) -> bool {
        score <= self.best + SCORE_EPSILON
    }

    /// Count one visited search state. Returns `false` once the budget is spent.
    pub fn tick(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        self.nodes += 1;
        if let Some(budget) = self.budget {
            if self.nodes > budget {
                warn!("search budget of {} states exhausted, returning partial results", budget);
                self.exhausted = true;
                return false;
            }
        }
        true
    }

    pub fn nodes(&self) -> usize {
        self.nodes
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl Default for SearchContext {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_and_admit() {
        let mut context = SearchContext::default();
        assert!(context.admits(1000.0));
        context.offer(3.0);
        context.offer(5.0);
        assert_eq!(context.best(), 3.0);
        assert!(context.admits(3.0));
        assert!(!context.admits(3.5));
    }

    #[test]
    fn test_budget() {
        let mut context = SearchContext::new(Some(2));
        assert!(context.tick());
        assert!(context.tick());
        assert!(!context.tick());
        assert!(context.is_exhausted());
        assert!(!context.tick());
        assert_eq!(context.nodes(), 3);
    }
}
