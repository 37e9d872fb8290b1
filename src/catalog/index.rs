use std::collections::{HashMap, HashSet};

use super::store::ModuleCatalog;

/// Finds the modules worth scoring for an observed identifier set
pub struct CandidateFinder<'a> {
    catalog: &'a ModuleCatalog,
}

impl<'a> CandidateFinder<'a> {
    #[must_use]
    pub fn new(catalog: &'a ModuleCatalog) -> Self {
        Self { catalog }
    }

    /// Modules sharing at least one identifier with `observed`, with the number
    /// of shared identifiers. Sorted by catalog position.
    #[must_use]
    #[allow(clippy::implicit_hasher)]
    pub fn find_candidates_with_counts(&self, observed: &HashSet<String>) -> Vec<(usize, usize)> {
        let mut module_counts: HashMap<usize, usize> = HashMap::new();

        for label in observed {
            if let Some(indices) = self.catalog.label_to_modules.get(label) {
                for &idx in indices {
                    *module_counts.entry(idx).or_default() += 1;
                }
            }
        }

        let mut candidates: Vec<_> = module_counts.into_iter().collect();
        candidates.sort_unstable_by_key(|&(idx, _)| idx);
        candidates
    }

    /// Indices of modules whose vocabulary intersects `observed`, in catalog order
    #[must_use]
    #[allow(clippy::implicit_hasher)]
    pub fn find_candidates(&self, observed: &HashSet<String>) -> Vec<usize> {
        self.find_candidates_with_counts(observed)
            .into_iter()
            .map(|(idx, _)| idx)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::module::CompiledModule;
    use crate::core::types::ModuleId;
    use crate::parsing::definition::compile_definition;

    fn catalog() -> ModuleCatalog {
        let mut catalog = ModuleCatalog::new();
        for (id, def) in [("M1", "K1 K2"), ("M2", "K3"), ("M3", "K2,K4")] {
            let graph = compile_definition(id, def).unwrap();
            catalog.add_module(CompiledModule::new(ModuleId::new(id), def, graph));
        }
        catalog
    }

    fn observed(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_find_candidates() {
        let catalog = catalog();
        let finder = CandidateFinder::new(&catalog);
        assert_eq!(finder.find_candidates(&observed(&["K2"])), vec![0, 2]);
        assert_eq!(finder.find_candidates(&observed(&["K3", "K9"])), vec![1]);
    }

    #[test]
    fn test_no_intersection_no_candidates() {
        let catalog = catalog();
        let finder = CandidateFinder::new(&catalog);
        assert!(finder.find_candidates(&observed(&["K9"])).is_empty());
        assert!(finder.find_candidates(&HashSet::new()).is_empty());
    }

    #[test]
    fn test_counts() {
        let catalog = catalog();
        let finder = CandidateFinder::new(&catalog);
        let counts = finder.find_candidates_with_counts(&observed(&["K1", "K2", "K4"]));
        assert_eq!(counts, vec![(0, 2), (2, 2)]);
    }
}
