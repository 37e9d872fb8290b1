use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::module::CompiledModule;
use crate::core::types::ModuleId;
use crate::parsing::modules::ModuleLine;
use crate::utils::validation::is_valid_md5;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read compiled graphs: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse compiled graphs: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Failed to decode compiled graphs: {0}")]
    DecodeError(#[from] bincode::Error),

    #[error("Unsupported compiled graph version {found} (expected {expected})")]
    UnsupportedVersion { found: String, expected: String },

    #[error("Module {0} has a malformed graph")]
    InvalidGraph(ModuleId),

    #[error("Module {0} has a malformed definition digest")]
    InvalidDigest(ModuleId),
}

/// Catalog version for compatibility checking
pub const CATALOG_VERSION: &str = "1.0.0";

/// Serializable compiled-graph set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogData {
    pub version: String,
    pub created_at: String,
    pub modules: Vec<CompiledModule>,
}

/// Compiled modules with lookup indexes
#[derive(Debug)]
pub struct ModuleCatalog {
    /// All compiled modules, in definition order
    pub modules: Vec<CompiledModule>,

    /// Index: module ID -> index in modules vec
    id_to_index: HashMap<ModuleId, usize>,

    /// Index: identifier -> indices of modules whose graph uses it
    pub label_to_modules: HashMap<String, Vec<usize>>,
}

impl ModuleCatalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
            id_to_index: HashMap::new(),
            label_to_modules: HashMap::new(),
        }
    }

    /// Load compiled graphs from a file: JSON if the name ends in `.json`,
    /// bincode otherwise
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the file cannot be read or decoded, has an
    /// unsupported version, or contains a malformed graph.
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        if is_json_path(path) {
            let content = std::fs::read_to_string(path)?;
            Self::from_json(&content)
        } else {
            let bytes = std::fs::read(path)?;
            Self::from_bincode(&bytes)
        }
    }

    /// Write compiled graphs to a file, format chosen as in [`Self::load_from_file`]
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if encoding or writing fails.
    pub fn save_to_file(&self, path: &Path) -> Result<(), CatalogError> {
        if is_json_path(path) {
            std::fs::write(path, self.to_json()?)?;
        } else {
            std::fs::write(path, self.to_bincode()?)?;
        }
        Ok(())
    }

    /// Decode the bincode form
    ///
    /// # Errors
    ///
    /// See [`Self::load_from_file`].
    pub fn from_bincode(bytes: &[u8]) -> Result<Self, CatalogError> {
        let data: CatalogData = bincode::deserialize(bytes)?;
        Self::from_data(data)
    }

    /// Parse the JSON form
    ///
    /// # Errors
    ///
    /// See [`Self::load_from_file`].
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let data: CatalogData = serde_json::from_str(json)?;
        Self::from_data(data)
    }

    fn from_data(data: CatalogData) -> Result<Self, CatalogError> {
        check_version(&data.version)?;
        debug!(
            "Loading {} compiled modules (created {})",
            data.modules.len(),
            data.created_at
        );

        let mut catalog = Self::new();
        for mut module in data.modules {
            module.graph.rebuild_indexes();
            if !module.graph.is_well_formed() {
                return Err(CatalogError::InvalidGraph(module.id));
            }
            if !is_valid_md5(&module.definition_md5) {
                return Err(CatalogError::InvalidDigest(module.id));
            }
            catalog.add_module(module);
        }

        Ok(catalog)
    }

    /// Encode as bincode
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DecodeError` if serialization fails.
    pub fn to_bincode(&self) -> Result<Vec<u8>, CatalogError> {
        Ok(bincode::serialize(&self.to_data())?)
    }

    /// Export as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ParseError` if serialization fails.
    pub fn to_json(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(&self.to_data())?)
    }

    fn to_data(&self) -> CatalogData {
        CatalogData {
            version: CATALOG_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            modules: self.modules.clone(),
        }
    }

    /// Add a compiled module. A module with the same id is replaced.
    pub fn add_module(&mut self, module: CompiledModule) {
        if let Some(&index) = self.id_to_index.get(&module.id) {
            warn!("Replacing compiled graph for module {}", module.id);
            self.modules[index] = module;
            self.rebuild_label_index();
            return;
        }

        let index = self.modules.len();
        self.id_to_index.insert(module.id.clone(), index);
        index_labels(&mut self.label_to_modules, &module, index);
        self.modules.push(module);
    }

    fn rebuild_label_index(&mut self) {
        self.label_to_modules.clear();
        for (index, module) in self.modules.iter().enumerate() {
            index_labels(&mut self.label_to_modules, module, index);
        }
    }

    /// Get a module by ID
    #[must_use]
    pub fn get(&self, id: &ModuleId) -> Option<&CompiledModule> {
        self.id_to_index.get(id).map(|&idx| &self.modules[idx])
    }

    #[must_use]
    pub fn contains(&self, id: &ModuleId) -> bool {
        self.id_to_index.contains_key(id)
    }

    /// Modules whose stored definition digest no longer matches `definitions`
    #[must_use]
    pub fn stale_modules(&self, definitions: &[ModuleLine]) -> Vec<ModuleId> {
        definitions
            .iter()
            .filter_map(|line| {
                self.get(&line.id)
                    .filter(|module| module.is_stale(&line.text))
                    .map(|module| module.id.clone())
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledModule> {
        self.modules.iter()
    }

    /// Number of modules in catalog
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Default for ModuleCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn index_labels(index: &mut HashMap<String, Vec<usize>>, module: &CompiledModule, position: usize) {
    for label in module.graph.labels() {
        index.entry(label.to_string()).or_default().push(position);
    }
}

fn is_json_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Same major version loads (with a warning on any other difference);
/// a different major version is rejected
fn check_version(found: &str) -> Result<(), CatalogError> {
    if found == CATALOG_VERSION {
        return Ok(());
    }

    let major = |v: &str| v.split('.').next().map(str::to_string);
    if major(found) != major(CATALOG_VERSION) {
        return Err(CatalogError::UnsupportedVersion {
            found: found.to_string(),
            expected: CATALOG_VERSION.to_string(),
        });
    }

    warn!(
        "Compiled graph version mismatch (expected {}, found {})",
        CATALOG_VERSION, found
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::definition::compile_definition;

    fn module(id: &str, definition: &str) -> CompiledModule {
        let graph = compile_definition(id, definition).unwrap();
        CompiledModule::new(ModuleId::new(id), definition, graph)
    }

    fn sample_catalog() -> ModuleCatalog {
        let mut catalog = ModuleCatalog::new();
        catalog.add_module(module("M1", "K1 (K2,K3)"));
        catalog.add_module(module("M2", "K3+K4 -K5"));
        catalog
    }

    #[test]
    fn test_get_by_id() {
        let catalog = sample_catalog();
        assert_eq!(catalog.len(), 2);
        let m1 = catalog.get(&ModuleId::new("M1")).unwrap();
        assert_eq!(m1.graph.edge_count(), 3);
        assert!(catalog.get(&ModuleId::new("M404")).is_none());
    }

    #[test]
    fn test_label_index() {
        let catalog = sample_catalog();
        assert_eq!(catalog.label_to_modules.get("K3"), Some(&vec![0, 1]));
        assert_eq!(catalog.label_to_modules.get("K5"), Some(&vec![1]));
        assert!(catalog.label_to_modules.get("K9").is_none());
    }

    #[test]
    fn test_bincode_round_trip_rebuilds_indexes() {
        let catalog = sample_catalog();
        let bytes = catalog.to_bincode().unwrap();
        let loaded = ModuleCatalog::from_bincode(&bytes).unwrap();

        assert_eq!(loaded.len(), 2);
        for (a, b) in catalog.iter().zip(loaded.iter()) {
            assert_eq!(a, b);
            assert_eq!(a.graph.topological_order(), b.graph.topological_order());
        }
        assert_eq!(loaded.label_to_modules.get("K3"), Some(&vec![0, 1]));
        let m2 = loaded.get(&ModuleId::new("M2")).unwrap();
        assert!(m2.graph.is_optional("K5"));
    }

    #[test]
    fn test_json_round_trip() {
        let catalog = sample_catalog();
        let json = catalog.to_json().unwrap();
        assert!(json.contains("\"version\": \"1.0.0\""));
        let loaded = ModuleCatalog::from_json(&json).unwrap();
        assert_eq!(loaded.modules, catalog.modules);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = sample_catalog();

        for name in ["graphs.bin", "graphs.json"] {
            let path = dir.path().join(name);
            catalog.save_to_file(&path).unwrap();
            let loaded = ModuleCatalog::load_from_file(&path).unwrap();
            assert_eq!(loaded.len(), catalog.len());
        }
    }

    #[test]
    fn test_unsupported_version() {
        let json = r#"{"version": "2.0.0", "created_at": "now", "modules": []}"#;
        assert!(matches!(
            ModuleCatalog::from_json(json),
            Err(CatalogError::UnsupportedVersion { .. })
        ));

        let json = r#"{"version": "1.1.0", "created_at": "now", "modules": []}"#;
        assert!(ModuleCatalog::from_json(json).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_graph_is_rejected() {
        let mut bad = module("M1", "K1");
        // Edge pointing past the last node
        let mut graph = crate::core::graph::PathwayGraph::new();
        graph.add_edge(0, 1, "K1", 1.0, false);
        let mut json = serde_json::to_value(&graph).unwrap();
        json["edges"][0]["to"] = serde_json::json!(7);
        bad.graph = serde_json::from_value(json).unwrap();

        let data = CatalogData {
            version: CATALOG_VERSION.to_string(),
            created_at: String::new(),
            modules: vec![bad],
        };
        let json = serde_json::to_string(&data).unwrap();
        assert!(matches!(
            ModuleCatalog::from_json(&json),
            Err(CatalogError::InvalidGraph(_))
        ));
    }

    #[test]
    fn test_malformed_digest_is_rejected() {
        let mut bad = module("M1", "K1");
        bad.definition_md5 = "not-a-digest".to_string();

        let data = CatalogData {
            version: CATALOG_VERSION.to_string(),
            created_at: String::new(),
            modules: vec![bad],
        };
        let bytes = bincode::serialize(&data).unwrap();
        assert!(matches!(
            ModuleCatalog::from_bincode(&bytes),
            Err(CatalogError::InvalidDigest(id)) if id.as_str() == "M1"
        ));
    }

    #[test]
    fn test_replacing_module_keeps_index_consistent() {
        let mut catalog = sample_catalog();
        catalog.add_module(module("M1", "K9"));
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.label_to_modules.get("K9"), Some(&vec![0]));
        assert_eq!(catalog.label_to_modules.get("K3"), Some(&vec![1]));
    }

    #[test]
    fn test_stale_modules() {
        let catalog = sample_catalog();
        let lines = crate::parsing::modules::parse_module_lines("M1:K1 (K2,K3)\nM2:K3+K4\nM3:K7\n")
            .unwrap();
        assert_eq!(catalog.stale_modules(&lines), vec![ModuleId::new("M2")]);
    }
}
