//! Compile many module definitions into a [`ModuleCatalog`].
//!
//! Definitions are compiled in parallel; results are then applied in input
//! order, so the catalog and the report are the same as a sequential run.
//! A definition that fails to parse either skips that module or aborts the
//! whole build, depending on the [`ParseErrorPolicy`].

use std::collections::HashSet;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::store::ModuleCatalog;
use crate::core::module::CompiledModule;
use crate::core::types::ModuleId;
use crate::parsing::definition::{compile_definition, ParseError};
use crate::parsing::modules::ModuleLine;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Compilation aborted: {0}")]
    Parse(#[from] ParseError),

    #[error("Duplicate module id: {0}")]
    DuplicateModule(ModuleId),
}

/// What to do with a definition that fails to parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseErrorPolicy {
    /// Log the error, leave the module out, and continue
    #[default]
    Skip,
    /// Stop at the first error
    Abort,
}

/// Collects compiled modules under an error policy
#[derive(Debug)]
pub struct CatalogBuilder {
    policy: ParseErrorPolicy,
    catalog: ModuleCatalog,
    seen: HashSet<ModuleId>,
    report: BuildReport,
}

impl CatalogBuilder {
    #[must_use]
    pub fn new(policy: ParseErrorPolicy) -> Self {
        Self {
            policy,
            catalog: ModuleCatalog::new(),
            seen: HashSet::new(),
            report: BuildReport::default(),
        }
    }

    /// Compile and add one definition.
    ///
    /// Returns `Ok(true)` if the module was added, `Ok(false)` if it was skipped.
    ///
    /// # Errors
    ///
    /// Under `ParseErrorPolicy::Abort`, returns `BuildError::Parse` for a
    /// malformed definition and `BuildError::DuplicateModule` for a repeated id.
    pub fn add_definition(&mut self, id: &ModuleId, definition: &str) -> Result<bool, BuildError> {
        let compiled = compile_definition(id.as_str(), definition);
        self.apply(id, definition, compiled)
    }

    /// Compile and add every definition, in parallel
    ///
    /// # Errors
    ///
    /// See [`Self::add_definition`]; the first failing line in input order wins.
    pub fn add_lines(&mut self, lines: &[ModuleLine]) -> Result<(), BuildError> {
        let compiled: Vec<_> = lines
            .par_iter()
            .map(|line| compile_definition(line.id.as_str(), &line.text))
            .collect();

        for (line, result) in lines.iter().zip(compiled) {
            self.apply(&line.id, &line.text, result)?;
        }
        Ok(())
    }

    fn apply(
        &mut self,
        id: &ModuleId,
        definition: &str,
        compiled: Result<crate::core::graph::PathwayGraph, ParseError>,
    ) -> Result<bool, BuildError> {
        if self.seen.contains(id) {
            if self.policy == ParseErrorPolicy::Abort {
                return Err(BuildError::DuplicateModule(id.clone()));
            }
            warn!("Module {} defined more than once; keeping the last definition", id);
            self.report.duplicates.push(id.clone());
        }

        match compiled {
            Ok(graph) => {
                self.seen.insert(id.clone());
                self.catalog
                    .add_module(CompiledModule::new(id.clone(), definition, graph));
                self.report.compiled += 1;
                Ok(true)
            }
            Err(e) => {
                if self.policy == ParseErrorPolicy::Abort {
                    return Err(BuildError::Parse(e));
                }
                warn!("Skipping module: {}", e);
                self.report.skipped.push(e);
                Ok(false)
            }
        }
    }

    /// Finish, returning the catalog and a summary of what happened
    #[must_use]
    pub fn build(self) -> (ModuleCatalog, BuildReport) {
        info!(
            "Compiled {} modules ({} skipped)",
            self.report.compiled,
            self.report.skipped.len()
        );
        (self.catalog, self.report)
    }
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new(ParseErrorPolicy::default())
    }
}

/// Summary of a build
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Definitions compiled successfully (a replaced duplicate counts twice)
    pub compiled: usize,
    pub skipped: Vec<ParseError>,
    pub duplicates: Vec<ModuleId>,
}

impl BuildReport {
    #[must_use]
    pub fn has_problems(&self) -> bool {
        !self.skipped.is_empty() || !self.duplicates.is_empty()
    }
}

impl std::fmt::Display for BuildReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Compiled: {} modules", self.compiled)?;
        writeln!(f, "Skipped:  {} modules", self.skipped.len())?;
        for e in &self.skipped {
            writeln!(f, "  - {e}")?;
        }
        if !self.duplicates.is_empty() {
            writeln!(f, "Duplicates:")?;
            for id in &self.duplicates {
                writeln!(f, "  - {id}")?;
            }
        }
        Ok(())
    }
}
