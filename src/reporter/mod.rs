//! Diagnostic assembly and output formats.

pub mod console;
pub mod json;
pub mod sarif;

use crate::ast::Position;
use crate::catalog::RuleRecord;
use crate::rules::Diagnostic;
use std::path::Path;

/// Collects the diagnostics one detector emits for one file.
pub struct Reporter<'a> {
    rule: &'a RuleRecord,
    file_path: &'a Path,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Reporter<'a> {
    pub fn new(rule: &'a RuleRecord, file_path: &'a Path) -> Self {
        Self {
            rule,
            file_path,
            diagnostics: Vec::new(),
        }
    }

    /// Emit a diagnostic at `pos` with a one-sentence `detail`.
    pub fn report(&mut self, pos: Position, detail: &str) {
        self.diagnostics.push(Diagnostic {
            rule_id: self.rule.id.clone(),
            code: self.rule.code,
            severity: self.rule.severity_level(),
            category: self.rule.category.clone(),
            message: format_message(self.rule, detail),
            file_path: self.file_path.to_path_buf(),
            line: pos.line,
            column: pos.column,
        });
    }

    pub fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// `[<rule-id>] <detail> Why: <summary> Fix: <hint>`
pub fn format_message(rule: &RuleRecord, detail: &str) -> String {
    format!(
        "[{}] {} Why: {} Fix: {}",
        rule.id,
        normalize_sentence(detail),
        normalize_sentence(&rule.summary),
        normalize_sentence(&rule.fix_hint)
    )
}

/// Trim and make sure the text ends with `.`, `!` or `?`.
///
/// Empty input stays empty.
pub fn normalize_sentence(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() || text.ends_with(['.', '!', '?']) {
        text.to_string()
    } else {
        format!("{}.", text)
    }
}
