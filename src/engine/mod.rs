//! Analysis engine - coordinates unit loading and rule execution.

mod context;
pub mod loader;

pub use context::AnalysisContext;

use crate::ast::{SourceFile, SourceUnit};
use crate::catalog::RuleCatalog;
use crate::discovery::discover_units;
use crate::error::{Error, Result};
use crate::layout::SizeOracle;
use crate::rules::{registry, Diagnostic, Rule};
use rayon::prelude::*;
use std::any::Any;
use std::path::Path;
use tracing::{debug, info, warn};

/// Runs registered rules over syntax-tree units.
///
/// The engine holds no mutable state; one instance can analyze any number of
/// units, concurrently.
pub struct Engine<'a> {
    catalog: &'a RuleCatalog,
    rules: Vec<Box<dyn Rule>>,
}

impl<'a> Engine<'a> {
    /// Engine running every built-in rule.
    pub fn new(catalog: &'a RuleCatalog) -> Self {
        Self::with_rules(catalog, registry::all_rules())
    }

    pub fn with_rules(catalog: &'a RuleCatalog, rules: Vec<Box<dyn Rule>>) -> Self {
        Self { catalog, rules }
    }

    /// Keep only the rules whose IDs are listed.
    pub fn restrict_to<S: AsRef<str>>(mut self, ids: &[S]) -> Result<Self> {
        for id in ids {
            let id = id.as_ref();
            if !self.rules.iter().any(|rule| rule.id() == id) {
                return Err(Error::config(format!("unknown rule '{}'", id)));
            }
        }
        self.rules
            .retain(|rule| ids.iter().any(|id| id.as_ref() == rule.id()));
        Ok(self)
    }

    pub fn catalog(&self) -> &'a RuleCatalog {
        self.catalog
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    /// Run every rule tagged for the unit's language over every file.
    ///
    /// A rule missing from the catalog fails the whole unit.
    pub fn analyze_unit(&self, unit: &SourceUnit) -> Result<Vec<Diagnostic>> {
        debug!(package = %unit.package, files = unit.files.len(), "analyzing unit");

        let mut active: Vec<&dyn Rule> = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            let record = self
                .catalog
                .get(rule.id())
                .ok_or_else(|| Error::missing_rule(rule.id()))?;
            if record.applies_to(&unit.language) {
                active.push(rule.as_ref());
            }
        }

        let mut diagnostics = Vec::new();
        for file in &unit.files {
            diagnostics.extend(self.analyze_file(file, &unit.layouts, &active)?);
        }
        sort_diagnostics(&mut diagnostics);
        Ok(diagnostics)
    }

    fn analyze_file(
        &self,
        file: &SourceFile,
        sizes: &dyn SizeOracle,
        rules: &[&dyn Rule],
    ) -> Result<Vec<Diagnostic>> {
        let ctx = AnalysisContext::new(file, sizes, self.catalog);
        let mut diagnostics = Vec::new();

        for rule in rules {
            // Catch panics in rule execution to prevent one bad rule from crashing analysis
            match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| rule.check(&ctx))) {
                Ok(found) => diagnostics.extend(found?),
                Err(payload) => {
                    warn!(
                        rule = rule.id(),
                        file = %file.path.display(),
                        panic = %extract_panic_message(&payload),
                        "rule panicked, skipping"
                    );
                }
            }
        }

        Ok(diagnostics)
    }

    /// Discover, load and analyze every unit under `path`.
    ///
    /// Units that cannot be read or decoded are logged and skipped;
    /// configuration errors abort the run.
    pub fn analyze_path(&self, path: &Path) -> Result<Vec<Diagnostic>> {
        let units = discover_units(path);
        info!(count = units.len(), root = %path.display(), "discovered units");

        let per_unit: Vec<Vec<Diagnostic>> = units
            .par_iter()
            .map(|unit_path| match loader::load_unit(unit_path) {
                Ok(unit) => self.analyze_unit(&unit),
                Err(e) => {
                    warn!(path = %unit_path.display(), error = %e, "skipping unit");
                    Ok(Vec::new())
                }
            })
            .collect::<Result<_>>()?;

        let mut diagnostics: Vec<Diagnostic> = per_unit.into_iter().flatten().collect();
        sort_diagnostics(&mut diagnostics);
        Ok(diagnostics)
    }
}

/// Order by file, line, column, then rule.
pub fn sort_diagnostics(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by(|a, b| {
        (&a.file_path, a.line, a.column, &a.rule_id).cmp(&(&b.file_path, b.line, b.column, &b.rule_id))
    });
}

/// Extract a human-readable message from a panic payload.
fn extract_panic_message(payload: &Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        return (*s).to_string();
    }
    if let Some(s) = payload.downcast_ref::<String>() {
        return s.clone();
    }
    "(unknown panic payload)".to_string()
}
