use std::collections::{BTreeMap, HashSet};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::index::CandidateFinder;
use crate::catalog::metadata::{MetadataTable, MissingDataError};
use crate::catalog::store::ModuleCatalog;
use crate::core::module::CompiledModule;
use crate::core::sample::SampleSet;
use crate::core::types::ModuleId;
use crate::matching::scoring::{score_pathway, ScoreError, ScoreOutcome};
use crate::utils::validation::DEFAULT_MAX_PATHS;

/// Name given to the union of all samples in the aggregate pass
pub const AGGREGATE_SAMPLE_NAME: &str = "all";

/// One emitted (sample, module) row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletenessRecord {
    /// `None` for the aggregate pass
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<String>,

    pub module: ModuleId,
    pub percentage: f64,
    pub name: String,
    pub class: String,

    /// Observed identifiers on the best path, sorted
    pub matching: Vec<String>,

    /// Required identifiers on the best path that were not observed, sorted
    pub missing: Vec<String>,

    /// Compiled weight of every identifier on the best path
    pub weights: BTreeMap<String, f64>,

    pub candidate_count: usize,
    pub path_count: usize,
}

/// A module whose scoring failed for one sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreFailure {
    pub module: ModuleId,
    pub sample: Option<String>,
    pub error: String,
}

/// Everything one completeness run produces
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompletenessReport {
    /// Aggregate rows over the union of all samples
    pub summary: Vec<CompletenessRecord>,

    /// Per-sample rows, samples in input order (empty unless enabled)
    pub per_sample: Vec<CompletenessRecord>,

    /// Module -> matching identifiers from the aggregate pass
    pub module_matching: BTreeMap<ModuleId, Vec<String>>,

    #[serde(skip)]
    pub missing_data: Vec<MissingDataError>,

    pub failures: Vec<ScoreFailure>,
}

/// Configuration for the completeness engine
#[derive(Debug, Clone)]
pub struct CompletenessConfig {
    /// Annotate identifiers with their compiled weight in TSV output
    pub include_weights: bool,
    /// Also score every sample on its own
    pub per_sample: bool,
    /// Path records any node may collect before a module is given up
    pub max_paths: usize,
}

impl Default for CompletenessConfig {
    fn default() -> Self {
        Self {
            include_weights: false,
            per_sample: false,
            max_paths: DEFAULT_MAX_PATHS,
        }
    }
}

/// Scores observed identifier sets against every relevant compiled module
pub struct CompletenessEngine<'a> {
    catalog: &'a ModuleCatalog,
    metadata: &'a MetadataTable,
    config: CompletenessConfig,
}

impl<'a> CompletenessEngine<'a> {
    #[must_use]
    pub fn new(
        catalog: &'a ModuleCatalog,
        metadata: &'a MetadataTable,
        config: CompletenessConfig,
    ) -> Self {
        Self {
            catalog,
            metadata,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &CompletenessConfig {
        &self.config
    }

    /// Run the aggregate pass and, if configured, the per-sample pass
    #[must_use]
    pub fn run(&self, samples: &SampleSet) -> CompletenessReport {
        let missing_data = self.metadata.check_against(self.catalog);
        for problem in &missing_data {
            warn!("{}", problem);
        }

        let all = samples.union(AGGREGATE_SAMPLE_NAME);
        let (summary, mut failures) = self.score_observed(&all.observed(), None);
        info!(
            "{} of {} modules matched {} distinct identifiers",
            summary.len(),
            self.catalog.len(),
            all.len()
        );

        let module_matching = summary
            .iter()
            .map(|r| (r.module.clone(), r.matching.clone()))
            .collect();

        let mut per_sample = Vec::new();
        if self.config.per_sample {
            let results: Vec<_> = samples
                .samples()
                .par_iter()
                .map(|s| self.score_observed(&s.observed(), Some(&s.name)))
                .collect();
            for (records, sample_failures) in results {
                per_sample.extend(records);
                failures.extend(sample_failures);
            }
            info!(
                "{} rows across {} samples",
                per_sample.len(),
                samples.len()
            );
        }

        CompletenessReport {
            summary,
            per_sample,
            module_matching,
            missing_data,
            failures,
        }
    }

    /// Score one observed set against every candidate module.
    ///
    /// Rows are sorted by percentage descending, then module id. Modules that
    /// share no identifier with `observed` are never scored.
    #[must_use]
    #[allow(clippy::implicit_hasher)]
    pub fn score_observed(
        &self,
        observed: &HashSet<String>,
        sample: Option<&str>,
    ) -> (Vec<CompletenessRecord>, Vec<ScoreFailure>) {
        let finder = CandidateFinder::new(self.catalog);
        let candidates = finder.find_candidates(observed);
        debug!(
            "{}: {} candidate modules",
            sample.unwrap_or(AGGREGATE_SAMPLE_NAME),
            candidates.len()
        );

        let outcomes: Vec<_> = candidates
            .par_iter()
            .map(|&idx| {
                let module = &self.catalog.modules[idx];
                (
                    module,
                    score_pathway(&module.graph, observed, self.config.max_paths),
                )
            })
            .collect();

        let mut records = Vec::new();
        let mut failures = Vec::new();
        for (module, outcome) in outcomes {
            match outcome {
                Ok(outcome) => {
                    if let Some(record) = self.to_record(module, outcome, sample) {
                        records.push(record);
                    }
                }
                Err(e) => {
                    warn!("Skipping module {}: {}", module.id, e);
                    failures.push(failure(module, sample, &e));
                }
            }
        }

        sort_records(&mut records);
        (records, failures)
    }

    fn to_record(
        &self,
        module: &CompiledModule,
        outcome: ScoreOutcome,
        sample: Option<&str>,
    ) -> Option<CompletenessRecord> {
        let percentage = outcome.percentage?;
        Some(CompletenessRecord {
            sample: sample.map(str::to_string),
            module: module.id.clone(),
            percentage,
            name: self.metadata.name(&module.id).unwrap_or_default().to_string(),
            class: self.metadata.class(&module.id).unwrap_or_default().to_string(),
            matching: outcome.matching.into_iter().collect(),
            missing: outcome.missing.into_iter().collect(),
            weights: outcome.path_weights,
            candidate_count: outcome.candidate_count,
            path_count: outcome.path_count,
        })
    }
}

fn failure(module: &CompiledModule, sample: Option<&str>, error: &ScoreError) -> ScoreFailure {
    ScoreFailure {
        module: module.id.clone(),
        sample: sample.map(str::to_string),
        error: error.to_string(),
    }
}

/// Percentage descending, then module id ascending
pub fn sort_records(records: &mut [CompletenessRecord]) {
    records.sort_by(|a, b| {
        b.percentage
            .total_cmp(&a.percentage)
            .then_with(|| a.module.cmp(&b.module))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builder::CatalogBuilder;
    use crate::parsing::ko_input::parse_ko_table;
    use crate::parsing::modules::parse_module_lines;

    fn catalog(definitions: &str) -> ModuleCatalog {
        let lines = parse_module_lines(definitions).unwrap();
        let mut builder = CatalogBuilder::default();
        builder.add_lines(&lines).unwrap();
        builder.build().0
    }

    fn metadata() -> MetadataTable {
        let names = parse_module_lines("M1:First\nM2:Second\nM3:Third\n").unwrap();
        let classes = parse_module_lines("M1:Class A\nM2:Class B\nM3:Class C\n").unwrap();
        MetadataTable::from_lines(&names, &classes)
    }

    fn observed(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_end_to_end_single_module() {
        let catalog = catalog("M1:K1 (K2,K3)\n");
        let metadata = metadata();
        let engine = CompletenessEngine::new(&catalog, &metadata, CompletenessConfig::default());

        let (records, failures) = engine.score_observed(&observed(&["K1", "K2"]), None);
        assert!(failures.is_empty());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].percentage, 100.0);
        assert_eq!(records[0].matching, vec!["K1", "K2"]);
        assert!(records[0].missing.is_empty());
        assert_eq!(records[0].name, "First");
        let json = serde_json::to_value(&records[0]).unwrap();
        assert!(json.get("completeness").is_none());
        assert_eq!(json["percentage"], 100.0);

        let (records, _) = engine.score_observed(&observed(&["K1"]), None);
        assert_eq!(records[0].percentage, 50.0);
        assert_eq!(records[0].missing, vec!["K2"]);
    }

    #[test]
    fn test_sorted_by_percentage_then_id() {
        let catalog = catalog("M3:K1 K2\nM1:K1 K9\nM2:K1\n");
        let metadata = metadata();
        let engine = CompletenessEngine::new(&catalog, &metadata, CompletenessConfig::default());

        let (records, _) = engine.score_observed(&observed(&["K1"]), None);
        let order: Vec<_> = records
            .iter()
            .map(|r| (r.module.as_str(), r.percentage))
            .collect();
        assert_eq!(order, vec![("M2", 100.0), ("M1", 50.0), ("M3", 50.0)]);
    }

    #[test]
    fn test_unrelated_modules_not_emitted() {
        let catalog = catalog("M1:K1\nM2:K2 K3\n");
        let metadata = metadata();
        let engine = CompletenessEngine::new(&catalog, &metadata, CompletenessConfig::default());

        let (records, _) = engine.score_observed(&observed(&["K1"]), None);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].module.as_str(), "M1");

        let (records, _) = engine.score_observed(&HashSet::new(), None);
        assert!(records.is_empty());
    }

    #[test]
    fn test_run_with_per_sample_pass() {
        let catalog = catalog("M1:K1 K2\nM2:K3\n");
        let metadata = metadata();
        let config = CompletenessConfig {
            per_sample: true,
            ..CompletenessConfig::default()
        };
        let engine = CompletenessEngine::new(&catalog, &metadata, config);
        let samples = parse_ko_table("c1\tK1\nc2\tK2\tK3\nc3\n").unwrap();

        let report = engine.run(&samples);

        // Aggregate: M1 complete via K1 (c1) + K2 (c2)
        assert_eq!(report.summary.len(), 2);
        assert!(report.summary.iter().all(|r| r.sample.is_none()));
        assert!(report.summary.iter().all(|r| r.percentage == 100.0));
        assert_eq!(
            report.module_matching.get(&ModuleId::new("M1")),
            Some(&vec!["K1".to_string(), "K2".to_string()])
        );

        let rows: Vec<_> = report
            .per_sample
            .iter()
            .map(|r| (r.sample.as_deref().unwrap(), r.module.as_str(), r.percentage))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("c1", "M1", 50.0),
                ("c2", "M2", 100.0),
                ("c2", "M1", 50.0),
            ]
        );
    }

    #[test]
    fn test_missing_metadata_does_not_abort() {
        let catalog = catalog("M1:K1\nM9:K1\n");
        let metadata = metadata();
        let engine = CompletenessEngine::new(&catalog, &metadata, CompletenessConfig::default());
        let samples = parse_ko_table("s\tK1\n").unwrap();

        let report = engine.run(&samples);
        assert_eq!(report.summary.len(), 2);
        let m9 = report
            .summary
            .iter()
            .find(|r| r.module.as_str() == "M9")
            .unwrap();
        assert_eq!(m9.name, "");
        assert!(report
            .missing_data
            .contains(&MissingDataError::NoMetadata(ModuleId::new("M9"))));
        assert!(report
            .missing_data
            .contains(&MissingDataError::NoGraph(ModuleId::new("M2"))));
    }

    #[test]
    fn test_path_limit_skips_module() {
        let catalog = catalog("M1:(K1,K2) (K3,K4)\nM2:K1\n");
        let metadata = metadata();
        let config = CompletenessConfig {
            max_paths: 2,
            ..CompletenessConfig::default()
        };
        let engine = CompletenessEngine::new(&catalog, &metadata, config);

        let (records, failures) = engine.score_observed(&observed(&["K1"]), Some("s1"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].module.as_str(), "M2");
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].module.as_str(), "M1");
        assert_eq!(failures[0].sample.as_deref(), Some("s1"));
    }

    #[test]
    fn test_parallel_matches_sequential_order() {
        let definitions: String = (0..50)
            .map(|i| format!("M{i:03}:K{} (K{},K{})\n", i % 7, i % 5, i % 3))
            .collect();
        let catalog = catalog(&definitions);
        let metadata = MetadataTable::new();
        let engine = CompletenessEngine::new(&catalog, &metadata, CompletenessConfig::default());
        let ids = observed(&["K0", "K1", "K2"]);

        let (first, _) = engine.score_observed(&ids, None);
        let (second, _) = engine.score_observed(&ids, None);
        assert_eq!(first, second);
        assert!(first.windows(2).all(|w| {
            w[0].percentage > w[1].percentage
                || (w[0].percentage == w[1].percentage && w[0].module < w[1].module)
        }));
    }
}
