//! Random tea selection and owner filtering

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeSet, HashSet};

use crate::domain::{CatalogError, EntityId, OwnerTeas, Tea};

/// Picks uniformly random candidates
pub struct SelectionEngine {
    rng: StdRng,
}

impl SelectionEngine {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic engine for tests and reproducible picks
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform random index in `[0, candidates.len())`
    pub fn pick<T>(&mut self, candidates: &[T]) -> Result<usize, CatalogError> {
        if candidates.is_empty() {
            return Err(CatalogError::EmptySelection);
        }
        Ok(self.rng.gen_range(0..candidates.len()))
    }

    /// Teas owned by every selected owner.
    ///
    /// With no owner selected the whole catalog is returned. An owner that
    /// is missing from `ownerships` owns nothing, so selecting it empties the
    /// result. Output keeps catalog order.
    pub fn filter_by_owners(
        ownerships: &[OwnerTeas],
        selected_owner_ids: &BTreeSet<EntityId>,
        catalog: &[Tea],
    ) -> Vec<Tea> {
        if selected_owner_ids.is_empty() {
            return catalog.to_vec();
        }

        let mut common: Option<HashSet<EntityId>> = None;
        for owner_id in selected_owner_ids {
            let owned: HashSet<EntityId> = ownerships
                .iter()
                .find(|o| o.owner.id == *owner_id)
                .map(|o| o.teas.iter().map(|t| t.id).collect())
                .unwrap_or_default();

            common = Some(match common {
                None => owned,
                Some(acc) => acc.intersection(&owned).copied().collect(),
            });
        }

        let common = common.unwrap_or_default();
        catalog
            .iter()
            .filter(|t| common.contains(&t.id))
            .cloned()
            .collect()
    }
}

impl Default for SelectionEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Home screen selection: candidates, the current pick and the owner filter.
///
/// `current` is either `None` (nothing picked yet) or a valid index into
/// `candidates`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    candidates: Vec<Tea>,
    current: Option<usize>,
    filter: BTreeSet<EntityId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn candidates(&self) -> &[Tea] {
        &self.candidates
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn filter(&self) -> &BTreeSet<EntityId> {
        &self.filter
    }

    pub fn selected(&self) -> Option<&Tea> {
        self.current.and_then(|i| self.candidates.get(i))
    }

    /// Replace the candidates; the previous pick no longer applies
    pub fn set_candidates(&mut self, candidates: Vec<Tea>) {
        self.candidates = candidates;
        self.current = None;
    }

    pub fn select(&mut self, index: usize) -> Result<(), CatalogError> {
        if index >= self.candidates.len() {
            return Err(CatalogError::InvalidState(format!(
                "index {} out of range for {} candidates",
                index,
                self.candidates.len()
            )));
        }
        self.current = Some(index);
        Ok(())
    }

    /// Flip an owner in or out of the filter. Returns true if now selected.
    pub fn toggle_owner(&mut self, owner_id: EntityId) -> bool {
        if self.filter.remove(&owner_id) {
            false
        } else {
            self.filter.insert(owner_id);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Owner, TeaType};

    fn tea(id: EntityId, name: &str) -> Tea {
        Tea::new(id, name, TeaType::new(1, "Any"))
    }

    fn catalog() -> Vec<Tea> {
        vec![tea(1, "Green"), tea(2, "Oolong"), tea(3, "Black"), tea(4, "White")]
    }

    fn ownerships() -> Vec<OwnerTeas> {
        vec![
            OwnerTeas::new(Owner::new(10, "A"), vec![tea(1, "Green"), tea(2, "Oolong")]),
            OwnerTeas::new(Owner::new(20, "B"), vec![tea(2, "Oolong"), tea(3, "Black")]),
            OwnerTeas::new(Owner::new(30, "C"), vec![]),
        ]
    }

    fn names(teas: &[Tea]) -> Vec<&str> {
        teas.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_pick_in_bounds() {
        let mut engine = SelectionEngine::with_seed(7);
        let teas = catalog();
        for _ in 0..1000 {
            let index = engine.pick(&teas).unwrap();
            assert!(index < teas.len());
        }
    }

    #[test]
    fn test_pick_roughly_uniform() {
        let mut engine = SelectionEngine::with_seed(42);
        let teas = catalog();
        let mut counts = [0usize; 4];
        let trials = 40_000;
        for _ in 0..trials {
            counts[engine.pick(&teas).unwrap()] += 1;
        }

        let expected = trials / teas.len();
        for count in counts {
            // within 5% of the expected share
            assert!(count.abs_diff(expected) < expected / 20, "counts: {:?}", counts);
        }
    }

    #[test]
    fn test_pick_empty_is_error() {
        let mut engine = SelectionEngine::new();
        let empty: Vec<Tea> = Vec::new();
        assert_eq!(engine.pick(&empty), Err(CatalogError::EmptySelection));
    }

    #[test]
    fn test_filter_no_owners_returns_catalog() {
        let filtered =
            SelectionEngine::filter_by_owners(&ownerships(), &BTreeSet::new(), &catalog());
        assert_eq!(filtered, catalog());
    }

    #[test]
    fn test_filter_single_owner() {
        let selected = BTreeSet::from([20]);
        let filtered = SelectionEngine::filter_by_owners(&ownerships(), &selected, &catalog());
        assert_eq!(names(&filtered), vec!["Oolong", "Black"]);
    }

    #[test]
    fn test_filter_is_intersection_not_union() {
        let selected = BTreeSet::from([10, 20]);
        let filtered = SelectionEngine::filter_by_owners(&ownerships(), &selected, &catalog());
        assert_eq!(names(&filtered), vec!["Oolong"]);
    }

    #[test]
    fn test_filter_owner_without_teas_empties_result() {
        let selected = BTreeSet::from([10, 30]);
        assert!(SelectionEngine::filter_by_owners(&ownerships(), &selected, &catalog()).is_empty());

        let unknown = BTreeSet::from([99]);
        assert!(SelectionEngine::filter_by_owners(&ownerships(), &unknown, &catalog()).is_empty());
    }

    #[test]
    fn test_state_select_checks_bounds() {
        let mut state = SelectionState::new();
        state.set_candidates(catalog());
        assert!(state.select(4).is_err());
        assert_eq!(state.current(), None);

        state.select(2).unwrap();
        assert_eq!(state.selected().map(|t| t.name.as_str()), Some("Black"));

        state.set_candidates(vec![tea(1, "Green")]);
        assert_eq!(state.current(), None);
    }

    #[test]
    fn test_state_toggle_owner() {
        let mut state = SelectionState::new();
        assert!(state.toggle_owner(10));
        assert!(state.filter().contains(&10));
        assert!(!state.toggle_owner(10));
        assert!(state.filter().is_empty());
    }
}
