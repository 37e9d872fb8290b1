//! Display metadata (names and classes) joined with compiled modules by id.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use thiserror::Error;

use crate::catalog::store::ModuleCatalog;
use crate::core::module::ModuleMetadata;
use crate::core::types::ModuleId;
use crate::parsing::modules::{load_module_lines, ModuleLine};
use crate::parsing::InputError;

/// A module present on one side of the metadata/graph join but not the other
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MissingDataError {
    #[error("Module {0} has metadata but no compiled graph")]
    NoGraph(ModuleId),

    #[error("Module {0} has a compiled graph but no name or class")]
    NoMetadata(ModuleId),
}

impl MissingDataError {
    #[must_use]
    pub fn module(&self) -> &ModuleId {
        match self {
            Self::NoGraph(id) | Self::NoMetadata(id) => id,
        }
    }
}

/// Names and classes by module id
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
    names: HashMap<ModuleId, String>,
    classes: HashMap<ModuleId, String>,
}

impl MetadataTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from parsed `id:name` and `id:class` records
    #[must_use]
    pub fn from_lines(names: &[ModuleLine], classes: &[ModuleLine]) -> Self {
        let mut table = Self::new();
        for line in names {
            table.names.insert(line.id.clone(), line.text.clone());
        }
        for line in classes {
            table.classes.insert(line.id.clone(), line.text.clone());
        }
        table
    }

    /// Load the name and class files; either may be absent
    ///
    /// # Errors
    ///
    /// Returns `InputError` if a given file cannot be read or parsed.
    pub fn load(names: Option<&Path>, classes: Option<&Path>) -> Result<Self, InputError> {
        let names = names.map(load_module_lines).transpose()?.unwrap_or_default();
        let classes = classes.map(load_module_lines).transpose()?.unwrap_or_default();
        Ok(Self::from_lines(&names, &classes))
    }

    pub fn insert(&mut self, metadata: ModuleMetadata) {
        self.names.insert(metadata.id.clone(), metadata.name);
        self.classes.insert(metadata.id, metadata.class);
    }

    #[must_use]
    pub fn name(&self, id: &ModuleId) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    #[must_use]
    pub fn class(&self, id: &ModuleId) -> Option<&str> {
        self.classes.get(id).map(String::as_str)
    }

    /// Metadata for `id`, with empty strings for whichever part is unknown.
    /// `None` if neither name nor class is known.
    #[must_use]
    pub fn get(&self, id: &ModuleId) -> Option<ModuleMetadata> {
        if !self.contains(id) {
            return None;
        }
        Some(ModuleMetadata::new(
            id.as_str(),
            self.name(id).unwrap_or_default(),
            self.class(id).unwrap_or_default(),
        ))
    }

    #[must_use]
    pub fn contains(&self, id: &ModuleId) -> bool {
        self.names.contains_key(id) || self.classes.contains_key(id)
    }

    /// Every module id with a name or class
    #[must_use]
    pub fn ids(&self) -> BTreeSet<&ModuleId> {
        self.names.keys().chain(self.classes.keys()).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.classes.is_empty()
    }

    /// Modules missing on either side of the join, sorted by id.
    ///
    /// An empty table is treated as "no metadata supplied" and reports nothing.
    #[must_use]
    pub fn check_against(&self, catalog: &ModuleCatalog) -> Vec<MissingDataError> {
        if self.is_empty() {
            return Vec::new();
        }

        let mut problems: Vec<MissingDataError> = self
            .ids()
            .into_iter()
            .filter(|id| !catalog.contains(id))
            .map(|id| MissingDataError::NoGraph(id.clone()))
            .collect();

        problems.extend(
            catalog
                .iter()
                .filter(|m| !self.contains(&m.id))
                .map(|m| MissingDataError::NoMetadata(m.id.clone())),
        );

        problems.sort_by(|a, b| a.module().cmp(b.module()));
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::module::CompiledModule;
    use crate::parsing::definition::compile_definition;
    use crate::parsing::modules::parse_module_lines;

    fn table() -> MetadataTable {
        let names = parse_module_lines("M1:Glycolysis\nM3:Orphan\n").unwrap();
        let classes = parse_module_lines("M1:Pathway modules; Carbohydrate\n").unwrap();
        MetadataTable::from_lines(&names, &classes)
    }

    #[test]
    fn test_lookup() {
        let table = table();
        let m1 = table.get(&ModuleId::new("M1")).unwrap();
        assert_eq!(m1.name, "Glycolysis");
        assert_eq!(m1.class, "Pathway modules; Carbohydrate");

        let m3 = table.get(&ModuleId::new("M3")).unwrap();
        assert_eq!(m3.class, "");
        assert!(table.get(&ModuleId::new("M2")).is_none());
    }

    #[test]
    fn test_check_against_catalog() {
        let mut catalog = ModuleCatalog::new();
        for id in ["M1", "M2"] {
            let graph = compile_definition(id, "K1").unwrap();
            catalog.add_module(CompiledModule::new(ModuleId::new(id), "K1", graph));
        }

        let problems = table().check_against(&catalog);
        assert_eq!(
            problems,
            vec![
                MissingDataError::NoMetadata(ModuleId::new("M2")),
                MissingDataError::NoGraph(ModuleId::new("M3")),
            ]
        );
    }

    #[test]
    fn test_empty_table_reports_nothing() {
        let mut catalog = ModuleCatalog::new();
        let graph = compile_definition("M1", "K1").unwrap();
        catalog.add_module(CompiledModule::new(ModuleId::new("M1"), "K1", graph));
        assert!(MetadataTable::new().check_against(&catalog).is_empty());
    }

    #[test]
    fn test_insert_metadata() {
        let mut table = MetadataTable::new();
        table.insert(ModuleMetadata::new("M7", "Name", "Class"));
        assert_eq!(table.name(&ModuleId::new("M7")), Some("Name"));
        assert_eq!(table.ids().len(), 1);
    }
}
