use serde::{Deserialize, Serialize};

use crate::core::graph::PathwayGraph;
use crate::core::types::ModuleId;
use crate::utils::validation::definition_digest;

/// Display metadata for a module, joined by id with its compiled graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMetadata {
    pub id: ModuleId,

    /// Human-readable name (KEGG `NAME`)
    pub name: String,

    /// Classification (KEGG `CLASS`)
    pub class: String,

    /// Definition text the graph was compiled from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}

impl ModuleMetadata {
    pub fn new(id: impl Into<String>, name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            id: ModuleId::new(id),
            name: name.into(),
            class: class.into(),
            definition: None,
        }
    }

    #[must_use]
    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = Some(definition.into());
        self
    }
}

/// A module's compiled graph together with the definition it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledModule {
    pub id: ModuleId,

    /// Definition text as read from the input
    pub definition: String,

    /// MD5 of the definition text, used to detect stale graph files
    pub definition_md5: String,

    pub graph: PathwayGraph,
}

impl CompiledModule {
    pub fn new(id: ModuleId, definition: impl Into<String>, graph: PathwayGraph) -> Self {
        let definition = definition.into();
        let definition_md5 = definition_digest(&definition);
        Self {
            id,
            definition,
            definition_md5,
            graph,
        }
    }

    /// Does `definition` differ from the text this module was compiled from?
    #[must_use]
    pub fn is_stale(&self, definition: &str) -> bool {
        self.definition_md5 != definition_digest(definition)
    }
}
