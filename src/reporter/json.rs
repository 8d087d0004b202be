use crate::rules::Diagnostic;
use anyhow::Result;

pub fn report(diagnostics: &[Diagnostic]) -> Result<()> {
    println!("{}", format(diagnostics)?);
    Ok(())
}

/// Format diagnostics as JSON string without printing.
pub fn format(diagnostics: &[Diagnostic]) -> Result<String> {
    Ok(serde_json::to_string_pretty(diagnostics)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Severity;
    use std::path::PathBuf;

    fn test_diagnostic(rule_id: &str, severity: Severity, line: usize) -> Diagnostic {
        Diagnostic {
            rule_id: rule_id.to_string(),
            code: crate::catalog::rule_code(rule_id),
            severity,
            category: "cpu".to_string(),
            message: "Test message".to_string(),
            file_path: PathBuf::from("main.go"),
            line,
            column: 5,
        }
    }

    #[test]
    fn test_format_empty_diagnostics() {
        assert_eq!(format(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_format_single_diagnostic() {
        let diag = test_diagnostic("perf_regex_compile_once", Severity::Warning, 10);
        let result = format(&[diag.clone()]).unwrap();

        assert!(result.contains(r#""rule_id": "perf_regex_compile_once""#));
        assert!(result.contains(&format!(r#""code": {}"#, diag.code)));
        assert!(result.contains(r#""severity": "warning""#));
        assert!(result.contains(r#""category": "cpu""#));
        assert!(result.contains(r#""line": 10"#));
        assert!(result.contains(r#""column": 5"#));
    }

    #[test]
    fn test_format_is_valid_json() {
        let diags = [
            test_diagnostic("rule-a", Severity::Error, 1),
            test_diagnostic("rule-b", Severity::Info, 2),
        ];
        let result = format(&diags).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        let items = parsed.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["severity"], "info");
    }
}
