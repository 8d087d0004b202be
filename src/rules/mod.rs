pub mod atomic_small_lock;
pub mod io_rules;
pub mod loop_rules;
pub mod memory_rules;
pub mod preallocate;
pub mod registry;
pub mod stack_alloc;

use crate::engine::AnalysisContext;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity levels for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" | "deny" => Ok(Severity::Error),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// A diagnostic reported by a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub rule_id: String,
    /// Stable numeric code of the rule.
    pub code: u32,
    pub severity: Severity,
    pub category: String,
    pub message: String,
    pub file_path: PathBuf,
    pub line: usize,
    pub column: usize,
}

/// The Rule trait - implement this to add new checks.
///
/// Metadata (description, severity, guidance) lives in the rule catalog;
/// an implementation only knows the ID it is bound to.
pub trait Rule: Send + Sync {
    /// Catalog identifier (e.g., "perf_no_defer_in_loop")
    fn id(&self) -> &'static str;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Run the check over one file.
    ///
    /// Fails with [`Error::MissingRule`](crate::Error::MissingRule) when the
    /// catalog does not carry [`id`](Rule::id).
    fn check(&self, ctx: &AnalysisContext) -> Result<Vec<Diagnostic>>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_parsing() {
        assert_eq!("warn".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!("Deny".parse::<Severity>().unwrap(), Severity::Error);
        assert_eq!("info".parse::<Severity>().unwrap(), Severity::Info);
        assert!("loud".parse::<Severity>().is_err());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }
}
