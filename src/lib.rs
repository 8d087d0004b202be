//! perfcheck: performance-by-default detectors for typed Go syntax trees
//!
//! A front end serialises each package into a [`SourceUnit`](ast::SourceUnit);
//! the engine runs the fourteen detectors over it and reports diagnostics
//! tagged with rule metadata from the [`RuleCatalog`].

pub mod ast;
pub mod catalog;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod layout;
pub mod reporter;
pub mod rules;
pub mod walk;

pub use catalog::{RuleCatalog, RuleRecord};
pub use config::Config;
pub use engine::{AnalysisContext, Engine};
pub use error::{CatalogError, Error};
pub use rules::{Diagnostic, Rule, Severity};

/// Run analysis on every unit under a path
///
/// Uses the bundle named in the configuration, falling back to the embedded
/// catalog.
pub fn analyze(path: &std::path::Path, config: &Config) -> anyhow::Result<Vec<Diagnostic>> {
    let diagnostics = match config.custom_catalog()? {
        Some(catalog) => Engine::new(&catalog).analyze_path(path)?,
        None => Engine::new(RuleCatalog::embedded()?).analyze_path(path)?,
    };
    Ok(diagnostics)
}
