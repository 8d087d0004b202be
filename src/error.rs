//! Custom error types for perfcheck.
//!
//! Provides structured error handling with clear error categories.

use std::path::PathBuf;
use thiserror::Error;

/// A type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading a rule bundle.
///
/// `Clone` so the lazily cached result of the embedded bundle can be handed
/// out to every caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The bundle contained no bytes at all.
    #[error("rule bundle is empty")]
    EmptyBundle,

    /// A record line did not split into exactly five tab-separated fields.
    #[error("invalid field count on line {line}: expected 5, found {found}")]
    FieldCount {
        /// 1-based line number inside the bundle.
        line: usize,
        /// Number of fields found on that line.
        found: usize,
    },

    /// Parsing succeeded but produced no usable record.
    #[error("no rules defined in bundle")]
    NoRules,

    /// Two distinct identifiers hash to the same numeric code.
    #[error("rule code collision between {first} and {second} (code {code:#010x})")]
    CodeCollision {
        first: String,
        second: String,
        code: u32,
    },

    /// An external bundle file could not be read.
    #[error("cannot read rule bundle {path}: {message}")]
    Unreadable {
        path: PathBuf,
        message: String,
    },
}

/// Errors that can occur during perfcheck operation.
#[derive(Debug, Error)]
pub enum Error {
    /// The rule catalog could not be built.
    #[error("Rule catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// A detector's rule is absent from the loaded catalog.
    ///
    /// This is a packaging defect, never a finding about analyzed code.
    #[error("Configuration error: rule {rule_id} is not present in the rule catalog")]
    MissingRule {
        /// Identifier the detector is bound to.
        rule_id: String,
    },

    /// Failed to decode a syntax-tree unit produced by the front end.
    #[error("Failed to decode {path}: {message}")]
    Decode {
        /// Path to the unit file that failed to decode.
        path: PathBuf,
        /// Description of the decode error.
        message: String,
    },

    /// Failed to read or access a file.
    #[error("IO error for {path}: {source}")]
    Io {
        /// Path to the file that caused the error.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to load or parse configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Generic IO error without path context.
    #[error("IO error: {0}")]
    IoGeneric(#[from] std::io::Error),
}

impl Error {
    /// Create a decode error for a specific unit file.
    pub fn decode(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an IO error for a specific file.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create the error a detector raises when its rule is not catalogued.
    pub fn missing_rule(rule_id: impl Into<String>) -> Self {
        Self::MissingRule {
            rule_id: rule_id.into(),
        }
    }

    /// True for errors that abort a whole run instead of skipping one unit.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Catalog(_) | Self::MissingRule { .. } | Self::Config { .. })
    }
}
